//! Endless Legend 2 end-game statistics
//!
//! Platform-agnostic core of the end-game stats export. The host integration
//! implements the traits in [`host`], forwards graph callbacks to an
//! [`ExportGate`], and this crate does the rest: merging curves, resolving
//! identities, flattening city defenses and writing the JSON document.

pub mod aggregator;
pub mod city;
pub mod config;
pub mod constants;
pub mod era;
pub mod error;
pub mod export;
pub mod gate;
pub mod host;
pub mod metadata;
pub mod metric;
pub mod numbers;
pub mod record;
pub mod resolver;
pub mod tech;
pub mod tech_db;
pub mod text;
pub mod walker;

// Re-export commonly used types
pub use aggregator::{Leader, TurnSample, TurnSampleAggregator};
pub use city::{CityBreakdown, CitySummary, build_city_breakdown};
pub use config::ExportConfig;
pub use era::EraProgress;
pub use error::{ConfigError, ExportError, HostError, RecordError};
pub use export::{EmpireRecord, ExportDocument, ExportStamp, Exporter, TurnStatsEntry};
pub use gate::{ExportGate, GateOutcome, GateState};
pub use host::{
    EmpireDirectory, EmpireStatistics, EndGameConditionInfo, FactionTraitPrerequisite,
    GameSnapshot, GraphHost, Localizer, MetadataKey, PrerequisiteOperator, SessionMetadata,
    Settlement, SettlementSource, SettlementStatus, TechnologyInfo, TechnologySource,
    TitleAndDescription, UnlockInfo, UnlockedTechnology, VictorySnapshot, VictorySource,
};
pub use metadata::{GameSettings, VictorySettings};
pub use metric::{Curve, CurvePoint, EmpireCurves, MetricKind, StatisticType};
pub use record::{FieldValue, FixedScalar, Frame, Record};
pub use resolver::{FactionIdentity, FactionResolver, FactionStrategy};
pub use tech::{TechNameResolver, TechOrder, TechUnlockEvent};
pub use text::prettify;
pub use walker::{MilitiaUnit, TerritoryDefense};
