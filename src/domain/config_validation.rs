//! Configuration validation.
//!
//! Validates all config fields before a pipeline run starts.

use crate::domain::error::OptpipeError;
use crate::domain::insight::InsightDirection;
use crate::domain::symbol::OptionRight;
use crate::domain::universe::parse_schedule;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveTime};

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    validate_market_config(config)?;
    validate_universe_config(config)?;
    validate_alpha_config(config)?;
    validate_run_config(config)?;
    Ok(())
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    validate_market_name(config)?;
    validate_utc_offset(config)?;
    validate_session_times(config)?;
    Ok(())
}

pub fn validate_universe_config(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    validate_roots(config)?;
    validate_strike_span(config)?;
    validate_expiry_window(config)?;
    validate_right(config)?;
    Ok(())
}

pub fn validate_alpha_config(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    validate_direction(config)?;
    validate_insight_minutes(config)?;
    Ok(())
}

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    validate_run_dates(config)?;
    validate_tick_minutes(config)?;
    Ok(())
}

fn validate_market_name(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    match config.get_string("market", "name") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(OptpipeError::ConfigMissing {
            section: "market".to_string(),
            key: "name".to_string(),
        }),
    }
}

fn validate_utc_offset(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let value = config.get_int("market", "utc_offset_hours", 0);
    if !(-12..=14).contains(&value) {
        return Err(OptpipeError::ConfigInvalid {
            section: "market".to_string(),
            key: "utc_offset_hours".to_string(),
            reason: "utc_offset_hours must be between -12 and 14".to_string(),
        });
    }
    Ok(())
}

fn validate_session_times(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let open = parse_time(config, "open")?;
    let close = parse_time(config, "close")?;
    if open >= close {
        return Err(OptpipeError::ConfigInvalid {
            section: "market".to_string(),
            key: "open".to_string(),
            reason: "open must be before close".to_string(),
        });
    }
    Ok(())
}

fn parse_time(config: &dyn ConfigPort, key: &str) -> Result<NaiveTime, OptpipeError> {
    match config.get_string("market", key) {
        None => Err(OptpipeError::ConfigMissing {
            section: "market".to_string(),
            key: key.to_string(),
        }),
        Some(s) => {
            NaiveTime::parse_from_str(&s, "%H:%M").map_err(|_| OptpipeError::ConfigInvalid {
                section: "market".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected HH:MM", key),
            })
        }
    }
}

fn validate_roots(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let roots = match config.get_string("universe", "roots") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(OptpipeError::ConfigMissing {
                section: "universe".to_string(),
                key: "roots".to_string(),
            })
        }
    };
    parse_schedule(&roots).map_err(|e| OptpipeError::ConfigInvalid {
        section: "universe".to_string(),
        key: "roots".to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn validate_strike_span(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let value = config.get_int("universe", "strike_span", 0);
    if value < 0 {
        return Err(OptpipeError::ConfigInvalid {
            section: "universe".to_string(),
            key: "strike_span".to_string(),
            reason: "strike_span must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_expiry_window(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let min = config.get_int("universe", "min_expiry_days", 0);
    let max = config.get_int("universe", "max_expiry_days", 7);
    if min < 0 {
        return Err(OptpipeError::ConfigInvalid {
            section: "universe".to_string(),
            key: "min_expiry_days".to_string(),
            reason: "min_expiry_days must be non-negative".to_string(),
        });
    }
    if max < min {
        return Err(OptpipeError::ConfigInvalid {
            section: "universe".to_string(),
            key: "max_expiry_days".to_string(),
            reason: "max_expiry_days must not be less than min_expiry_days".to_string(),
        });
    }
    Ok(())
}

fn validate_right(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    match config.get_string("universe", "right") {
        None => Ok(()),
        Some(s) if s.eq_ignore_ascii_case("any") => Ok(()),
        Some(s) => match OptionRight::parse(&s) {
            Some(_) => Ok(()),
            None => Err(OptpipeError::ConfigInvalid {
                section: "universe".to_string(),
                key: "right".to_string(),
                reason: "right must be put, call, or any".to_string(),
            }),
        },
    }
}

fn validate_direction(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    match config.get_string("alpha", "direction") {
        None => Ok(()),
        Some(s) => match InsightDirection::parse(&s) {
            Some(_) => Ok(()),
            None => Err(OptpipeError::ConfigInvalid {
                section: "alpha".to_string(),
                key: "direction".to_string(),
                reason: "direction must be up, down, or flat".to_string(),
            }),
        },
    }
}

fn validate_insight_minutes(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let value = config.get_int("alpha", "insight_minutes", 30);
    if value < 1 {
        return Err(OptpipeError::ConfigInvalid {
            section: "alpha".to_string(),
            key: "insight_minutes".to_string(),
            reason: "insight_minutes must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_run_dates(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if start > end {
        return Err(OptpipeError::ConfigInvalid {
            section: "run".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, OptpipeError> {
    match config.get_string("run", key) {
        None => Err(OptpipeError::ConfigMissing {
            section: "run".to_string(),
            key: key.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| OptpipeError::ConfigInvalid {
                section: "run".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            })
        }
    }
}

fn validate_tick_minutes(config: &dyn ConfigPort) -> Result<(), OptpipeError> {
    let value = config.get_int("run", "tick_minutes", 30);
    if value < 1 {
        return Err(OptpipeError::ConfigInvalid {
            section: "run".to_string(),
            key: "tick_minutes".to_string(),
            reason: "tick_minutes must be at least 1".to_string(),
        });
    }
    Ok(())
}
