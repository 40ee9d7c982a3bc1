//! CLI definition and dispatch.

use chrono::{Duration, FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_chain_adapter::CsvChainAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alpha::{AlphaSettings, ConstantContractAlpha};
use crate::domain::chain::ChainCriteria;
use crate::domain::config_validation::{
    validate_market_config, validate_pipeline_config, validate_universe_config,
};
use crate::domain::error::OptpipeError;
use crate::domain::insight::InsightDirection;
use crate::domain::pipeline::{Pipeline, RunConfig, SessionHours, TickReport};
use crate::domain::symbol::OptionRight;
use crate::domain::universe::{parse_schedule, UniverseSelector};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "optpipe", about = "Options strategy-composition pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline over the configured date range
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a pipeline configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the filtered universe for one session
    Chain {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        date: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            data,
            output,
        } => run_pipeline(&config, &data, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Chain { config, data, date } => run_chain(&config, &data, &date),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = OptpipeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_session_hours(adapter: &dyn ConfigPort) -> Result<SessionHours, OptpipeError> {
    let offset_hours = adapter.get_int("market", "utc_offset_hours", 0);
    let seconds = i32::try_from(offset_hours * 3600).map_err(|_| OptpipeError::ConfigInvalid {
        section: "market".into(),
        key: "utc_offset_hours".into(),
        reason: "utc_offset_hours out of range".into(),
    })?;
    let utc_offset =
        FixedOffset::east_opt(seconds).ok_or_else(|| OptpipeError::ConfigInvalid {
            section: "market".into(),
            key: "utc_offset_hours".into(),
            reason: "utc_offset_hours out of range".into(),
        })?;

    let open = parse_session_time(adapter, "open")?;
    let close = parse_session_time(adapter, "close")?;

    Ok(SessionHours {
        utc_offset,
        open,
        close,
    })
}

fn parse_session_time(
    adapter: &dyn ConfigPort,
    key: &str,
) -> Result<chrono::NaiveTime, OptpipeError> {
    let value = adapter
        .get_string("market", key)
        .ok_or_else(|| OptpipeError::ConfigMissing {
            section: "market".into(),
            key: key.into(),
        })?;
    chrono::NaiveTime::parse_from_str(&value, "%H:%M").map_err(|_| OptpipeError::ConfigInvalid {
        section: "market".into(),
        key: key.into(),
        reason: format!("invalid {} format (expected HH:MM)", key),
    })
}

pub fn build_criteria(adapter: &dyn ConfigPort) -> Result<ChainCriteria, OptpipeError> {
    let right = match adapter.get_string("universe", "right") {
        None => Some(OptionRight::Put),
        Some(s) if s.eq_ignore_ascii_case("any") => None,
        Some(s) => Some(
            OptionRight::parse(&s).ok_or_else(|| OptpipeError::ConfigInvalid {
                section: "universe".into(),
                key: "right".into(),
                reason: "right must be put, call, or any".into(),
            })?,
        ),
    };

    let strike_span = adapter.get_int("universe", "strike_span", 0);
    let strike_span =
        usize::try_from(strike_span).map_err(|_| OptpipeError::ConfigInvalid {
            section: "universe".into(),
            key: "strike_span".into(),
            reason: "strike_span must be non-negative".into(),
        })?;

    Ok(ChainCriteria {
        strike_span,
        min_expiry_days: adapter.get_int("universe", "min_expiry_days", 0),
        max_expiry_days: adapter.get_int("universe", "max_expiry_days", 7),
        weeklys_only: adapter.get_bool("universe", "weeklys_only", true),
        right,
    })
}

pub fn build_selector(adapter: &dyn ConfigPort) -> Result<UniverseSelector, OptpipeError> {
    let market = adapter
        .get_string("market", "name")
        .ok_or_else(|| OptpipeError::ConfigMissing {
            section: "market".into(),
            key: "name".into(),
        })?;
    let roots = adapter
        .get_string("universe", "roots")
        .ok_or_else(|| OptpipeError::ConfigMissing {
            section: "universe".into(),
            key: "roots".into(),
        })?;
    let schedule = parse_schedule(&roots)?;
    let criteria = build_criteria(adapter)?;
    let hours = build_session_hours(adapter)?;

    Ok(UniverseSelector::new(
        schedule,
        &market,
        criteria,
        hours.utc_offset,
    ))
}

pub fn build_alpha_settings(adapter: &dyn ConfigPort) -> Result<AlphaSettings, OptpipeError> {
    let direction = match adapter.get_string("alpha", "direction") {
        None => InsightDirection::Down,
        Some(s) => {
            InsightDirection::parse(&s).ok_or_else(|| OptpipeError::ConfigInvalid {
                section: "alpha".into(),
                key: "direction".into(),
                reason: "direction must be up, down, or flat".into(),
            })?
        }
    };

    Ok(AlphaSettings {
        direction,
        period: Duration::minutes(adapter.get_int("alpha", "insight_minutes", 30)),
    })
}

pub fn build_run_config(adapter: &dyn ConfigPort) -> Result<RunConfig, OptpipeError> {
    Ok(RunConfig {
        start_date: parse_run_date(adapter, "start_date")?,
        end_date: parse_run_date(adapter, "end_date")?,
        tick_minutes: adapter.get_int("run", "tick_minutes", 30),
    })
}

fn parse_run_date(adapter: &dyn ConfigPort, key: &str) -> Result<NaiveDate, OptpipeError> {
    let value = adapter
        .get_string("run", key)
        .ok_or_else(|| OptpipeError::ConfigMissing {
            section: "run".into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| OptpipeError::ConfigInvalid {
        section: "run".into(),
        key: key.into(),
        reason: format!("invalid {} format (expected YYYY-MM-DD)", key),
    })
}

fn run_pipeline(
    config_path: &PathBuf,
    data_path: &PathBuf,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_pipeline_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Build pipeline components
    let selector = match build_selector(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let hours = match build_session_hours(&adapter) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let alpha_settings = match build_alpha_settings(&adapter) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let run_config = match build_run_config(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let chain = CsvChainAdapter::new(data_path.clone());
    let mut pipeline = Pipeline::new(selector, ConstantContractAlpha::new(alpha_settings));

    // Stage 3: Open the target output
    let out: Box<dyn Write> = match output_path {
        Some(path) => match std::fs::File::create(path) {
            Ok(f) => Box::new(f),
            Err(e) => {
                let err = OptpipeError::from(e);
                eprintln!("error: {err}");
                return (&err).into();
            }
        },
        None => Box::new(std::io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(out);
    if let Err(e) = writer.write_record(["time", "symbol", "quantity"]) {
        eprintln!("error: failed to write output: {e}");
        return ExitCode::from(1);
    }

    // Stage 4: Tick loop
    eprintln!(
        "Running pipeline: {} to {}",
        run_config.start_date, run_config.end_date
    );

    let mut sessions = 0usize;
    let mut tick_count = 0usize;
    let mut insight_count = 0usize;
    let mut target_count = 0usize;

    let mut day = run_config.start_date;
    while day <= run_config.end_date {
        if !SessionHours::is_trading_day(day) {
            day += Duration::days(1);
            continue;
        }
        sessions += 1;

        for at in hours.session_ticks(day, run_config.tick_minutes) {
            let report = match pipeline.on_tick(at, &chain) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            tick_count += 1;
            insight_count += report.insights.len();
            target_count += report.targets.len();

            if let Err(e) = write_targets(&mut writer, &report) {
                eprintln!("error: failed to write output: {e}");
                return ExitCode::from(1);
            }
        }

        day += Duration::days(1);
    }

    if let Err(e) = writer.flush() {
        eprintln!("error: failed to write output: {e}");
        return ExitCode::from(1);
    }

    // Stage 5: Summary to stderr
    eprintln!("\n=== Run Summary ===");
    eprintln!("Sessions:  {}", sessions);
    eprintln!("Ticks:     {}", tick_count);
    eprintln!("Insights:  {}", insight_count);
    eprintln!("Targets:   {}", target_count);

    ExitCode::SUCCESS
}

fn write_targets<W: Write>(
    writer: &mut csv::Writer<W>,
    report: &TickReport,
) -> Result<(), csv::Error> {
    for target in &report.targets {
        writer.write_record([
            report.at.format("%Y-%m-%d %H:%M").to_string(),
            target.symbol.id().to_string(),
            target.quantity.to_string(),
        ])?;
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_pipeline_config(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_chain(config_path: &PathBuf, data_path: &PathBuf, date: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_market_config(&adapter).and_then(|()| validate_universe_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let session = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            eprintln!("error: invalid date '{}' (expected YYYY-MM-DD)", date);
            return ExitCode::from(2);
        }
    };

    let mut selector = match build_selector(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let hours = match build_session_hours(&adapter) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let chain = CsvChainAdapter::new(data_path.clone());
    let at = hours.tick_utc(session, hours.open);

    match selector.refresh(at, &chain) {
        Ok(universe) => {
            if universe.symbols.is_empty() {
                eprintln!("No contracts selected for {}", session);
            } else {
                for symbol in &universe.symbols {
                    println!("{}", symbol);
                }
                eprintln!("{} contracts selected", universe.symbols.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
