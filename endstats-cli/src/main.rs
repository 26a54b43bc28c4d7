mod report;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use endstats_core::{ExportConfig, ExportGate};
use report::ReplayReport;
use session::ReplaySession;

#[derive(Debug, Parser)]
#[command(name = "endstats", version = "0.1.0")]
#[command(about = "Replay a recorded Endless Legend 2 end-game session through the stats exporter")]
struct Args {
    /// Recorded session (JSON)
    #[arg(long)]
    session: PathBuf,

    /// Directory the export is written to (overrides the config file)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Export configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also dump the technology database CSV
    #[arg(long)]
    tech_db: bool,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.report == "console" {
        announce_banner();
    }

    let config = load_config(&args)?;
    let mut session = ReplaySession::load(&args.session)?;
    let mut gate = ExportGate::new(config);

    let start_time = Instant::now();
    let mut report = replay(&mut gate, &mut session, &args.session.display().to_string());
    report.duration = start_time.elapsed();

    write_report(&args, &report)?;

    if report.steps.iter().any(report::ReplayStep::is_failure) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn announce_banner() {
    println!("{}", "🏛  Endless Legend 2 End-Game Stats".bright_cyan().bold());
    println!("{}", "===================================".cyan());
}

fn load_config(args: &Args) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ExportConfig::from_json(&json)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => ExportConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if args.tech_db {
        config.dump_tech_database = true;
    }
    if args.compact {
        config.pretty = false;
    }
    config.validate()?;
    log::debug!("export configuration: {config:?}");
    Ok(config)
}

fn replay(gate: &mut ExportGate, session: &mut ReplaySession, label: &str) -> ReplayReport {
    let mut report = ReplayReport::new(label);
    for stat in session.callbacks() {
        let curves = session.curves(stat);
        let outcome = gate.on_graph_reloaded(session, stat, &curves);
        report.record(stat, &outcome);
    }
    report.reload_count = session.reloads().len();
    report.final_state = format!("{:?}", gate.state());
    report
}

fn write_report(args: &Args, report: &ReplayReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => report::generate_json_report(&mut output_target, report)?,
        _ => {
            report::generate_console_report(&mut output_target, report)?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", report.duration)?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
