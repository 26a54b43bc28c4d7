//! Once-per-session export trigger.
//!
//! The host calls [`ExportGate::on_graph_reloaded`] every time it rebuilds one
//! statistic's curves. The first time the final statistic arrives, the gate
//! asks the host to rebuild every metric (each rebuild comes back through the
//! same callback), writes the export and clears the aggregator. Callbacks
//! that arrive during that forced pass, or after the export, are merged and
//! nothing more.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::aggregator::TurnSampleAggregator;
use crate::config::ExportConfig;
use crate::error::{ExportError, HostError};
use crate::export::Exporter;
use crate::host::{GameSnapshot, GraphHost};
use crate::metric::{CurvePoint, MetricKind, StatisticType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Idle,
    ForcedCollectionInProgress,
    Dumped,
}

/// What a callback did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Curves were merged; no export was attempted.
    Merged,
    Exported {
        path: PathBuf,
        tech_database: Option<PathBuf>,
    },
    /// The export was attempted and abandoned; the gate is idle again.
    Failed { reason: String },
}

#[derive(Debug, thiserror::Error)]
enum CollectionError {
    #[error("reloading {stat:?} failed: {source}")]
    Reload {
        stat: StatisticType,
        #[source]
        source: HostError,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub struct ExportGate {
    state: GateState,
    aggregator: TurnSampleAggregator,
    exporter: Exporter,
    clock: fn() -> DateTime<Utc>,
}

impl ExportGate {
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self::with_exporter(Exporter::new(config))
    }

    #[must_use]
    pub fn with_exporter(exporter: Exporter) -> Self {
        Self {
            state: GateState::Idle,
            aggregator: TurnSampleAggregator::new(),
            exporter,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used to stamp exports.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    #[must_use]
    pub const fn aggregator(&self) -> &TurnSampleAggregator {
        &self.aggregator
    }

    #[must_use]
    pub const fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Start a new session: forget merged curves and cached names, and re-arm
    /// the export.
    pub fn reset(&mut self) {
        self.aggregator.clear();
        self.exporter.clear_caches();
        self.state = GateState::Idle;
    }

    /// Graph callback. Never fails; problems are logged and reported in the outcome.
    pub fn on_graph_reloaded<H, C>(
        &mut self,
        host: &mut H,
        stat: StatisticType,
        curves_per_empire: &[Option<C>],
    ) -> GateOutcome
    where
        H: GraphHost + GameSnapshot,
        C: AsRef<[CurvePoint]>,
    {
        self.aggregator.merge_curve(stat, curves_per_empire);

        match self.state {
            GateState::ForcedCollectionInProgress | GateState::Dumped => {
                return GateOutcome::Merged;
            }
            GateState::Idle if !stat.is_final() => return GateOutcome::Merged,
            GateState::Idle => {}
        }

        log::info!("final statistic received; collecting every end-game statistic");
        self.state = GateState::ForcedCollectionInProgress;
        match self.collect_and_export(host) {
            Ok((path, tech_database)) => {
                self.aggregator.clear();
                self.state = GateState::Dumped;
                GateOutcome::Exported {
                    path,
                    tech_database,
                }
            }
            Err(err) => {
                log::error!("end-game export abandoned: {err}");
                self.state = GateState::Idle;
                GateOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn force_collection<H>(&mut self, host: &mut H) -> Result<(), CollectionError>
    where
        H: GraphHost + GameSnapshot,
    {
        for kind in MetricKind::ALL {
            let stat = StatisticType::from(kind);
            let curves = host
                .reload_graph(stat)
                .map_err(|source| CollectionError::Reload { stat, source })?;
            match curves {
                Some(curves) => {
                    self.on_graph_reloaded(host, stat, &curves);
                }
                None => log::debug!("host produced no curves for {kind}"),
            }
        }
        Ok(())
    }

    fn collect_and_export<H>(
        &mut self,
        host: &mut H,
    ) -> Result<(PathBuf, Option<PathBuf>), CollectionError>
    where
        H: GraphHost + GameSnapshot,
    {
        self.force_collection(host)?;

        let generated_at = (self.clock)();
        let path = self.exporter.export(
            &self.aggregator,
            host.empire_statistics(),
            &*host,
            generated_at,
        )?;
        let tech_database = match self.exporter.dump_tech_database(&*host, generated_at) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("tech database dump failed: {err}");
                None
            }
        };
        Ok((path, tech_database))
    }
}
