use crate::OutputFormat;
use crate::config::Config;
use crate::format::{DurationFormat, Field, derive_format, format_with_units};
use anyhow::{Context, Result};
use chrono::Duration;
use serde_json::json;
use tracing::debug;

/// The format named on the command line, or the configured display pattern.
pub fn resolve_format(config: &Config, pattern: Option<&str>) -> Result<DurationFormat> {
    match pattern {
        Some(p) => DurationFormat::new(p).with_context(|| format!("Invalid format '{}'", p)),
        None => config.display.format(),
    }
}

fn millis_duration(millis: i64) -> Result<Duration> {
    Duration::try_milliseconds(millis).context("Duration out of range")
}

/// Render a millisecond count through a format
pub fn render(
    config: &Config,
    millis: i64,
    pattern: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let format = resolve_format(config, pattern)?;
    let text = format.render(&millis_duration(millis)?);
    debug!(%format, millis, %text, "rendered duration");

    match output {
        OutputFormat::Text => println!("{}", text),
        OutputFormat::Json => println!(
            "{}",
            json!({ "format": format.to_string(), "millis": millis, "text": text })
        ),
    }
    Ok(())
}

/// Parse duration text, either with a given format or one derived from the text
pub fn parse(
    config: &Config,
    text: &str,
    pattern: Option<&str>,
    auto: bool,
    output: OutputFormat,
) -> Result<()> {
    let format = if auto {
        DurationFormat::derive(text).with_context(|| format!("Cannot derive a format from '{}'", text))?
    } else {
        resolve_format(config, pattern)?
    };
    let duration = format.parse(text)?;
    let millis = duration.num_milliseconds();
    debug!(%format, text, millis, "parsed duration");

    match output {
        OutputFormat::Text => println!("{}", millis),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "format": format.to_string(),
                "text": text,
                "millis": millis,
                "units": format_with_units(&duration, true),
            })
        ),
    }
    Ok(())
}

/// Print the pattern inferred from a sample
pub fn derive(sample: &str, output: OutputFormat) -> Result<()> {
    let pattern = derive_format(sample)?;

    match output {
        OutputFormat::Text => println!("{}", pattern),
        OutputFormat::Json => println!("{}", json!({ "sample": sample, "pattern": pattern })),
    }
    Ok(())
}

/// Print a millisecond count in the `1h 2m 3s` style
pub fn units(millis: i64, include_millis: bool, output: OutputFormat) -> Result<()> {
    let text = format_with_units(&millis_duration(millis)?, include_millis);

    match output {
        OutputFormat::Text => println!("{}", text),
        OutputFormat::Json => println!("{}", json!({ "millis": millis, "text": text })),
    }
    Ok(())
}

/// Show the fields, widths and delimiters of a format
pub fn describe(config: &Config, pattern: Option<&str>, output: OutputFormat) -> Result<()> {
    let format = resolve_format(config, pattern)?;

    match output {
        OutputFormat::Text => {
            println!("Format: {}", format);
            println!("{:<14} {:<6} {:<9}", "Field", "Width", "Delimiter");
            println!("{}", "-".repeat(31));
            for field in Field::ALL {
                let Some(width) = format.width(field) else {
                    continue;
                };
                let delimiter = format
                    .delimiter_after(field)
                    .map(|c| format!("'{}'", c))
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<14} {:<6} {:<9}", field.to_string(), width, delimiter);
            }
            println!("Zero renders as: {}", format.render(&Duration::zero()));
        }
        OutputFormat::Json => {
            let fields: Vec<_> = Field::ALL
                .into_iter()
                .filter_map(|field| {
                    format.width(field).map(|width| {
                        json!({
                            "field": field.to_string(),
                            "width": width,
                            "delimiter": format.delimiter_after(field).map(String::from),
                        })
                    })
                })
                .collect();
            println!("{}", json!({ "format": format.to_string(), "fields": fields }));
        }
    }
    Ok(())
}
