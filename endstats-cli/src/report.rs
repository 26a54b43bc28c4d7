use anyhow::Result;
use colored::Colorize;
use endstats_core::{GateOutcome, GateState, StatisticType};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// One replayed graph callback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep {
    pub statistic: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReplayStep {
    #[must_use]
    pub fn new(stat: StatisticType, outcome: &GateOutcome) -> Self {
        let statistic = match stat {
            StatisticType::Metric(kind) => kind.label().to_string(),
            StatisticType::Count => "count".to_string(),
            StatisticType::Unrecognized(code) => format!("unrecognized({code})"),
        };
        let (outcome, detail) = match outcome {
            GateOutcome::Merged => ("merged", None),
            GateOutcome::Exported { path, .. } => ("exported", Some(path.display().to_string())),
            GateOutcome::Failed { reason } => ("failed", Some(reason.clone())),
        };
        Self {
            statistic,
            outcome,
            detail,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == "failed"
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub session: String,
    pub steps: Vec<ReplayStep>,
    pub reload_count: usize,
    pub final_state: String,
    pub export_path: Option<PathBuf>,
    pub tech_database_path: Option<PathBuf>,
    #[serde(skip)]
    pub duration: Duration,
}

impl ReplayReport {
    #[must_use]
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            steps: Vec::new(),
            reload_count: 0,
            final_state: format!("{:?}", GateState::Idle),
            export_path: None,
            tech_database_path: None,
            duration: Duration::ZERO,
        }
    }

    pub fn record(&mut self, stat: StatisticType, outcome: &GateOutcome) {
        if let GateOutcome::Exported {
            path,
            tech_database,
        } = outcome
        {
            self.export_path = Some(path.clone());
            self.tech_database_path.clone_from(tech_database);
        }
        self.steps.push(ReplayStep::new(stat, outcome));
    }

    #[must_use]
    pub fn exported(&self) -> bool {
        self.export_path.is_some()
    }
}

pub fn generate_console_report(out: &mut dyn Write, report: &ReplayReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 End-Game Replay Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;
    writeln!(out, "Session: {}", report.session)?;
    writeln!(out, "Callbacks replayed: {}", report.steps.len())?;
    writeln!(out, "Graph reloads requested: {}", report.reload_count)?;
    writeln!(out, "Final gate state: {}", report.final_state)?;
    writeln!(out)?;

    for step in &report.steps {
        let status = match step.outcome {
            "exported" => "✅ EXPORT".green(),
            "failed" => "❌ FAILED".red(),
            _ => "· merged".normal(),
        };
        match &step.detail {
            Some(detail) => writeln!(out, "{status} {} - {detail}", step.statistic.bold())?,
            None => writeln!(out, "{status} {}", step.statistic.bold())?,
        }
    }
    writeln!(out)?;

    match &report.export_path {
        Some(path) => writeln!(out, "Export written to {}", path.display().to_string().green())?,
        None => writeln!(out, "{}", "No export was written.".yellow())?,
    }
    if let Some(path) = &report.tech_database_path {
        writeln!(out, "Tech database written to {}", path.display())?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &ReplayReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}
