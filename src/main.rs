//! Portfolio projection CLI
//!
//! Command-line interface for projections, allocations, history charts,
//! batch runs and host message previews

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use portfolio_projection::{
    bridge::{confirmation_text, HostMessage},
    collaborators::{RenderSurface, TextSurface},
    plan::{load_plans, InvestmentPlan, RiskProfile},
    projection::{ChartFrame, ChartMode, Jitter, DEFAULT_JITTER_AMPLITUDE},
    scenario::ScenarioRunner,
    Assumptions, ProjectionSeries,
};

/// Growth forecasts and allocations for the portfolio Mini App
#[derive(Parser)]
#[command(name = "portfolio_projection", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Directory with risk_curves.csv / allocations.csv (built-in tables if omitted)
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project an amount over a term for one risk profile
    Project(ProjectArgs),
    /// Show the allocation template for a risk profile
    Allocation {
        #[arg(long)]
        risk: String,
    },
    /// Chart frame for a plan in future / Ny mode
    History(HistoryArgs),
    /// Project every plan in a CSV file (amount,term,riskProfile)
    Batch {
        #[arg(long)]
        input: PathBuf,
        /// Write per-year totals to this CSV instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render the host acknowledgement for a payload (reads stdin if --json is omitted)
    Message {
        #[arg(long)]
        json: Option<String>,
    },
}

#[derive(Args)]
struct ProjectArgs {
    #[arg(long)]
    amount: f64,
    #[arg(long, allow_hyphen_values = true)]
    term: i64,
    #[arg(long, default_value = "moderate")]
    risk: String,
    /// Compare all three profiles instead of one
    #[arg(long)]
    compare: bool,
}

#[derive(Args)]
struct HistoryArgs {
    #[arg(long)]
    amount: f64,
    #[arg(long)]
    term: u32,
    #[arg(long, default_value = "moderate")]
    risk: String,
    /// future, 1y, 5y ...
    #[arg(long, default_value = "5y")]
    mode: ChartMode,
    /// Seed for reproducible history noise
    #[arg(long)]
    seed: Option<u64>,
    /// Disable history noise
    #[arg(long)]
    exact: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
    Csv,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let runner = match &cli.assumptions {
        Some(dir) => ScenarioRunner::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => ScenarioRunner::with_assumptions(Assumptions::reference()),
    };
    let out = io::stdout();
    let mut out = out.lock();

    match cli.command {
        Commands::Project(args) => {
            let series = if args.compare {
                runner.compare_profiles(args.amount, args.term)?
            } else {
                vec![runner.engine().project_named(args.amount, args.term, &args.risk)?]
            };
            write_series(&runner, &series, cli.output, &mut out)?;
        }
        Commands::Allocation { risk } => {
            let template = runner.engine().allocation_for_name(&risk)?;
            match cli.output {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&template)?)?,
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(&mut out);
                    writer.write_record(["category", "percent"])?;
                    for entry in &template.entries {
                        writer.write_record([entry.category.code().to_string(), entry.percent.to_string()])?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => {
                    writeln!(out, "Allocation ({}):", template.profile.display_name())?;
                    for entry in &template.entries {
                        writeln!(out, "  {:<16} {:>3}%", entry.category.display_name(), entry.percent)?;
                    }
                }
            }
        }
        Commands::History(args) => {
            let plan = InvestmentPlan::new(args.amount, args.term, args.risk.parse::<RiskProfile>()?);
            let jitter = if args.exact {
                None
            } else {
                Some(Jitter {
                    amplitude: DEFAULT_JITTER_AMPLITUDE,
                    seed: args.seed,
                })
            };
            let frame = ChartFrame::for_mode(runner.engine(), &plan, args.mode, jitter)?;
            write_frame(&frame, cli.output, &mut out)?;
        }
        Commands::Batch { input, out: out_path } => {
            let plans = load_plans(&input)?;
            let start = Instant::now();
            let results = runner.run_batch(&plans);
            log::info!("Projected {} plans in {:?}", plans.len(), start.elapsed());

            for (plan, result) in plans.iter().zip(&results) {
                if let Err(e) = result {
                    log::warn!("Skipping plan {:?}: {}", plan, e);
                }
            }
            let totals = ScenarioRunner::aggregate(&results);

            match out_path {
                Some(path) => {
                    let mut writer = csv::Writer::from_writer(File::create(&path)?);
                    for row in &totals {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                    writeln!(out, "Output written to {}", path.display())?;
                }
                None => match cli.output {
                    OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&totals)?)?,
                    OutputFormat::Csv => {
                        let mut writer = csv::Writer::from_writer(&mut out);
                        for row in &totals {
                            writer.serialize(row)?;
                        }
                        writer.flush()?;
                    }
                    OutputFormat::Table => {
                        writeln!(out, "{:>4} {:>6} {:>18} {:>18} {:>18}", "Year", "Plans", "Min", "Avg", "Max")?;
                        writeln!(out, "{}", "-".repeat(68))?;
                        for row in &totals {
                            writeln!(
                                out,
                                "{:>4} {:>6} {:>18.2} {:>18.2} {:>18.2}",
                                row.year, row.plans, row.total_min, row.total_avg, row.total_max
                            )?;
                        }
                    }
                },
            }
        }
        Commands::Message { json } => {
            let raw = match json {
                Some(raw) => raw,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let message = HostMessage::from_json(&raw).context("parsing host payload")?;
            writeln!(out, "{}", confirmation_text(&message))?;
        }
    }
    Ok(())
}

fn write_series<W: Write>(
    runner: &ScenarioRunner,
    series: &[ProjectionSeries],
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let summaries: Vec<_> = series.iter().map(|s| s.summary()).collect();
            let value = serde_json::json!({ "series": series, "summaries": summaries });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(["riskProfile", "year", "min", "avg", "max"])?;
            for s in series {
                for p in s {
                    writer.write_record([
                        s.risk_profile.as_str().to_string(),
                        p.year.to_string(),
                        format!("{:.2}", p.min),
                        format!("{:.2}", p.avg),
                        format!("{:.2}", p.max),
                    ])?;
                }
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            let mut surface = TextSurface::new(out);
            for s in series {
                surface.render(s, &runner.engine().allocation_for(s.risk_profile))?;
            }
            let out = surface.into_inner();
            for s in series {
                let summary = s.summary();
                writeln!(
                    out,
                    "\n{} after {} years: min {:.2} / avg {:.2} / max {:.2} (profit {:.2} / {:.2} / {:.2})",
                    s.risk_profile.display_name(),
                    summary.term,
                    summary.final_min,
                    summary.final_avg,
                    summary.final_max,
                    summary.min_profit,
                    summary.avg_profit,
                    summary.max_profit
                )?;
            }
        }
    }
    Ok(())
}

fn write_frame<W: Write>(frame: &ChartFrame, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(frame)?)?,
        OutputFormat::Csv | OutputFormat::Table => {
            if frame.datasets.is_empty() {
                bail!("chart frame has no datasets");
            }
            let table = matches!(format, OutputFormat::Table);
            if table {
                writeln!(out, "{}", frame.x_title)?;
            }
            let mut writer = csv::WriterBuilder::new()
                .delimiter(if table { b'\t' } else { b',' })
                .from_writer(out);

            let mut header = vec!["label".to_string()];
            header.extend(frame.datasets.iter().map(|d| d.label.clone()));
            writer.write_record(&header)?;

            for (i, label) in frame.labels.iter().enumerate() {
                let mut record = vec![label.clone()];
                record.extend(
                    frame
                        .datasets
                        .iter()
                        .map(|d| d.data[i].map(|v| format!("{:.2}", v)).unwrap_or_default()),
                );
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
