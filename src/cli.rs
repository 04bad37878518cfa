//! Pipeline entry point: parse parameters, run, write charts.

use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::svg_chart;
use crate::domain::pipeline::{self, PipelineConfig};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(
    name = "smoothcast",
    about = "Smooth and forecast one instrument's daily price series"
)]
pub struct Cli {
    /// Directory containing {SYMBOL}.csv price files
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Instrument identifier
    #[arg(long)]
    pub symbol: String,

    /// Inclusive range start, YYYY-MM-DD
    #[arg(long)]
    pub start: String,

    /// Inclusive range end, YYYY-MM-DD
    #[arg(long)]
    pub end: String,

    /// Forecast horizon in trading days
    #[arg(long, default_value_t = 20)]
    pub horizon: usize,

    /// Directory for the rendered charts
    #[arg(short, long, default_value = "charts")]
    pub output: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    let (start, end) = match parse_range(&cli.start, &cli.end) {
        Ok(range) => range,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };

    let symbol = cli.symbol.to_uppercase();
    eprintln!("Loading {} from {}", symbol, cli.data_dir.display());

    let adapter = CsvAdapter::new(cli.data_dir);
    let series = match adapter.fetch_prices(&symbol, start, end) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} trading days, {} to {}", series.len(), start, end);

    let config = PipelineConfig {
        horizon: cli.horizon,
        ..PipelineConfig::default()
    };

    eprintln!(
        "Running {} filters and a {}-step forecast",
        config.filters.len(),
        config.horizon
    );
    let result = pipeline::run(&series, &config);

    for (stage, error) in result.failures() {
        eprintln!("warning: skipping {} ({})", stage, error);
    }

    if let Err(e) = fs::create_dir_all(&cli.output) {
        eprintln!("error: failed to create {}: {}", cli.output.display(), e);
        return ExitCode::from(1);
    }

    let mut written = 0usize;
    for smoothed in result.smoothed() {
        let svg = svg_chart::render_overlay(&series, smoothed);
        let path = cli.output.join(chart_file_name(&smoothed.filter.to_string()));
        if let Err(e) = fs::write(&path, svg) {
            eprintln!("error: failed to write {}: {}", path.display(), e);
            return ExitCode::from(1);
        }
        written += 1;
    }

    match &result.forecast {
        Ok(forecast) => {
            let svg = svg_chart::render_forecast(&series, forecast);
            let path = cli.output.join("forecast.svg");
            if let Err(e) = fs::write(&path, svg) {
                eprintln!("error: failed to write {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
            written += 1;
            print!("{}", forecast.summary());
        }
        Err(e) => {
            eprintln!("warning: skipping forecast ({})", e);
        }
    }

    eprintln!(
        "{} charts written to {}",
        written,
        cli.output.display()
    );

    // Nothing rendered at all means the run was useless; fail loudly.
    if written == 0 {
        if let Some((_, error)) = result.failures().next() {
            return error.into();
        }
        if let Err(error) = &result.forecast {
            return error.into();
        }
    }

    ExitCode::SUCCESS
}

fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| format!("invalid start date {start} (expected YYYY-MM-DD)"))?;
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| format!("invalid end date {end} (expected YYYY-MM-DD)"))?;
    if end_date < start_date {
        return Err(format!("end date {end} precedes start date {start}"));
    }
    Ok((start_date, end_date))
}

/// `SMA(20)` -> `sma_20.svg`
fn chart_file_name(stage: &str) -> String {
    let slug: String = stage
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.svg", slug.trim_matches('_').replace("__", "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_accepts_iso_dates() {
        let (start, end) = parse_range("2024-01-01", "2024-06-30").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn parse_range_rejects_reversed_range() {
        assert!(parse_range("2024-06-30", "2024-01-01").is_err());
    }

    #[test]
    fn parse_range_rejects_garbage() {
        assert!(parse_range("yesterday", "2024-01-01").is_err());
    }

    #[test]
    fn chart_file_names_are_slugs() {
        assert_eq!(chart_file_name("SMA(20)"), "sma_20.svg");
        assert_eq!(chart_file_name("SAVGOL(3,21)"), "savgol_3_21.svg");
        assert_eq!(chart_file_name("LOWESS(0.1,3)"), "lowess_0_1_3.svg");
    }
}
