use crate::OutputFormat;
use crate::commands::format::resolve_format;
use crate::config::Config;
use crate::format::{format_with_units, parse_simple};
use crate::state::StopwatchStore;
use crate::stopwatch::{Stopwatch, SystemClock, TickUnit};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

/// One reading of the stopwatch, as printed by `time`.
#[derive(Debug, Serialize)]
pub struct Reading {
    pub elapsed_ms: i64,
    pub text: String,
    pub units: String,
    pub paused: bool,
}

fn ticks_from_text(unit: TickUnit, text: &str) -> Result<i64> {
    let duration =
        parse_simple(text).with_context(|| format!("Invalid duration '{}'", text))?;
    Ok(unit.ticks(&duration))
}

/// Start (or restart) the stopwatch, optionally from an initial elapsed time
pub fn start(
    config: &Config,
    at: Option<&str>,
    paused: bool,
    unit: Option<TickUnit>,
    output: OutputFormat,
) -> Result<()> {
    let store = StopwatchStore::for_config(config)?;
    let unit = unit.unwrap_or(config.stopwatch.unit);
    let initial = at.map(|text| ticks_from_text(unit, text)).transpose()?.unwrap_or(0);

    store.update(|saved| {
        if saved.is_some() {
            info!("restarting existing stopwatch");
        }

        let mut watch = Stopwatch::with_unit(unit);
        if paused {
            watch.start_paused(initial);
        } else {
            watch.start_at(initial);
        }
        debug!(?unit, initial, paused, "stopwatch started");
        *saved = Some(watch.into_state());

        match output {
            OutputFormat::Text if paused => println!("✓ Stopwatch started (paused)"),
            OutputFormat::Text => println!("✓ Stopwatch started"),
            OutputFormat::Json => println!("{}", json!({ "started": true, "paused": paused })),
        }
        Ok(())
    })
}

pub fn pause(config: &Config) -> Result<()> {
    update(config, "pause", |watch| {
        if watch.is_paused() {
            println!("Stopwatch already paused.");
        } else {
            watch.pause();
            println!("✓ Stopwatch paused");
        }
        Ok(())
    })
}

pub fn resume(config: &Config) -> Result<()> {
    update(config, "resume", |watch| {
        if watch.is_paused() {
            watch.resume();
            println!("✓ Stopwatch resumed");
        } else {
            println!("Stopwatch is already running.");
        }
        Ok(())
    })
}

/// Move the stopwatch forward (or back, with a leading `-`) by a duration
pub fn skip(config: &Config, amount: &str) -> Result<()> {
    update(config, "skip", |watch| {
        let ticks = ticks_from_text(watch.unit(), amount)?;
        watch.skip(ticks);
        println!("✓ Skipped {}", amount);
        Ok(())
    })
}

fn update<F>(config: &Config, action: &str, f: F) -> Result<()>
where
    F: FnOnce(&mut Stopwatch<SystemClock>) -> Result<()>,
{
    StopwatchStore::for_config(config)?.update(|saved| {
        let Some(state) = saved.clone() else {
            println!("No stopwatch to {}. Run 'durfmt start' first.", action);
            return Ok(());
        };
        let mut watch = Stopwatch::from_state(SystemClock, state);
        f(&mut watch)?;
        debug!(action, state = ?watch.state(), "stopwatch updated");
        *saved = Some(watch.into_state());
        Ok(())
    })
}

/// Read the stopwatch without modifying it
pub fn reading(config: &Config, pattern: Option<&str>) -> Result<Option<Reading>> {
    let format = resolve_format(config, pattern)?;
    let saved = StopwatchStore::for_config(config)?.load()?;

    Ok(saved.map(|state| {
        let watch = Stopwatch::from_state(SystemClock, state);
        let elapsed = watch.elapsed_duration();
        Reading {
            elapsed_ms: elapsed.num_milliseconds(),
            text: format.render(&elapsed),
            units: format_with_units(&elapsed, config.display.units_include_millis),
            paused: watch.is_paused(),
        }
    }))
}

/// Print the elapsed time
pub fn time(
    config: &Config,
    pattern: Option<&str>,
    units: bool,
    output: OutputFormat,
) -> Result<()> {
    let Some(reading) = reading(config, pattern)? else {
        println!("No stopwatch running.");
        return Ok(());
    };

    match output {
        OutputFormat::Text => {
            let shown = if units { &reading.units } else { &reading.text };
            if reading.paused {
                println!("{} (paused)", shown);
            } else {
                println!("{}", shown);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&reading).context("Failed to serialize reading")?
            );
        }
    }
    Ok(())
}

/// Discard the stopwatch
pub fn reset(config: &Config) -> Result<()> {
    StopwatchStore::for_config(config)?.update(|saved| {
        if saved.take().is_some() {
            println!("✓ Stopwatch reset");
        } else {
            println!("No stopwatch to reset.");
        }
        Ok(())
    })
}
