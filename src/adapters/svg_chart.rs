//! SVG chart rendering.
//!
//! Pure string building: each renderer maps series values onto a fixed
//! viewport and emits polylines (and interval polygons for forecasts).
//! Nothing here computes; inputs are taken by reference and never mutated.

use crate::domain::forecast::Forecast;
use crate::domain::series::{FilterType, PriceSeries, SmoothedSeries};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 40.0;

/// Raw series color: neutral gray.
pub const RAW_COLOR: &str = "#555555";
/// Forecast mean path color.
pub const FORECAST_COLOR: &str = "#e377c2";

/// Fixed series-to-color mapping, one documented color per filter.
pub fn filter_color(filter: &FilterType) -> &'static str {
    match filter {
        FilterType::Sma(_) => "#1f77b4",
        FilterType::Ema(_) => "#ff7f0e",
        FilterType::Wma(_) => "#2ca02c",
        FilterType::SavitzkyGolay { .. } => "#d62728",
        FilterType::Lowess { .. } => "#9467bd",
        FilterType::Kalman { .. } => "#8c564b",
    }
}

struct Viewport {
    min: f64,
    max: f64,
    count: usize,
}

impl Viewport {
    fn new(values: impl Iterator<Item = f64>, count: usize) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            min = min.min(v);
            max = max.max(v);
        }
        Self { min, max, count }
    }

    fn x(&self, i: usize) -> f64 {
        let plot_width = WIDTH - 2.0 * PADDING;
        let scale = if self.count > 1 {
            plot_width / (self.count - 1) as f64
        } else {
            0.0
        };
        PADDING + i as f64 * scale
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - 2.0 * PADDING;
        let range = self.max - self.min;
        let scale = if range > 0.0 { plot_height / range } else { 0.0 };
        HEIGHT - PADDING - (value - self.min) * scale
    }

    fn polyline(&self, points: impl Iterator<Item = (usize, f64)>, color: &str) -> String {
        let coords: Vec<String> = points
            .map(|(i, v)| format!("{:.1},{:.1}", self.x(i), self.y(v)))
            .collect();
        format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
            color,
            coords.join(" ")
        )
    }
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
<rect width="{w:.0}" height="{h:.0}" fill="white"/>
<text x="{tx:.0}" y="24" font-family="sans-serif" font-size="14">{title}</text>
{body}
</svg>
"#,
        w = WIDTH,
        h = HEIGHT,
        tx = PADDING,
        title = title,
        body = body,
    )
}

/// Raw series overlaid with one smoothed series.
pub fn render_overlay(raw: &PriceSeries, smoothed: &SmoothedSeries) -> String {
    if raw.is_empty() {
        return "No price data available.".to_string();
    }

    let prices = raw.prices();
    let viewport = Viewport::new(
        prices
            .iter()
            .copied()
            .chain(smoothed.values.iter().filter(|p| p.valid).map(|p| p.value)),
        raw.len(),
    );

    let raw_line = viewport.polyline(prices.iter().copied().enumerate(), RAW_COLOR);
    let smooth_line = viewport.polyline(
        smoothed
            .values
            .iter()
            .enumerate()
            .filter(|(_, p)| p.valid)
            .map(|(i, p)| (i, p.value)),
        filter_color(&smoothed.filter),
    );

    let title = format!("{} - {}", raw.symbol(), smoothed.filter);
    document(&title, &format!("{}\n{}", raw_line, smooth_line))
}

/// Raw series plus the forecast path with shaded 95% and 80% bands.
pub fn render_forecast(raw: &PriceSeries, forecast: &Forecast) -> String {
    if raw.is_empty() {
        return "No price data available.".to_string();
    }

    let prices = raw.prices();
    let history_len = prices.len();
    let total = history_len + forecast.points.len();

    let viewport = Viewport::new(
        prices
            .iter()
            .copied()
            .chain(forecast.points.iter().map(|p| p.lower_95))
            .chain(forecast.points.iter().map(|p| p.upper_95)),
        total,
    );

    // Wider band first so the 80% band draws on top of it.
    let band_95 = band_polygon(&viewport, forecast, history_len, |p| {
        (p.lower_95, p.upper_95)
    });
    let band_80 = band_polygon(&viewport, forecast, history_len, |p| {
        (p.lower_80, p.upper_80)
    });

    let raw_line = viewport.polyline(prices.iter().copied().enumerate(), RAW_COLOR);
    let mean_line = viewport.polyline(
        forecast
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (history_len + i, p.mean)),
        FORECAST_COLOR,
    );

    let title = format!("{} - {} forecast", raw.symbol(), forecast.order);
    document(
        &title,
        &format!("{}\n{}\n{}\n{}", band_95, band_80, raw_line, mean_line),
    )
}

fn band_polygon(
    viewport: &Viewport,
    forecast: &Forecast,
    offset: usize,
    bounds: impl Fn(&crate::domain::forecast::ForecastPoint) -> (f64, f64),
) -> String {
    let mut coords = Vec::with_capacity(forecast.points.len() * 2);
    for (i, point) in forecast.points.iter().enumerate() {
        let (_, upper) = bounds(point);
        coords.push(format!(
            "{:.1},{:.1}",
            viewport.x(offset + i),
            viewport.y(upper)
        ));
    }
    for (i, point) in forecast.points.iter().enumerate().rev() {
        let (lower, _) = bounds(point);
        coords.push(format!(
            "{:.1},{:.1}",
            viewport.x(offset + i),
            viewport.y(lower)
        ));
    }
    format!(
        r#"<polygon fill="{}" fill-opacity="0.15" stroke="none" points="{}"/>"#,
        FORECAST_COLOR,
        coords.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::{ArimaOrder, ForecastPoint};
    use crate::domain::pipeline::{self, PipelineConfig};
    use crate::domain::series::test_support::make_series;

    fn sample_forecast() -> Forecast {
        Forecast {
            order: ArimaOrder { p: 0, d: 1, q: 0 },
            ar: vec![],
            ma: vec![],
            constant: 0.0,
            sigma2: 1.0,
            aicc: 100.0,
            points: (1..=5)
                .map(|step| {
                    let se = (step as f64).sqrt();
                    ForecastPoint {
                        step,
                        mean: 100.0,
                        lower_80: 100.0 - 1.2816 * se,
                        upper_80: 100.0 + 1.2816 * se,
                        lower_95: 100.0 - 1.96 * se,
                        upper_95: 100.0 + 1.96 * se,
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn overlay_contains_both_polylines() {
        let series = make_series(&[100.0, 101.0, 102.0, 101.5, 103.0]);
        let smoothed =
            crate::domain::filter::calculate_sma(&series, 3).unwrap();
        let svg = render_overlay(&series, &smoothed);

        assert!(svg.contains("<svg"));
        assert!(svg.contains(RAW_COLOR));
        assert!(svg.contains(filter_color(&smoothed.filter)));
        assert!(svg.contains("SMA(3)"));
    }

    #[test]
    fn overlay_skips_warmup_points() {
        let series = make_series(&[100.0, 101.0, 102.0, 101.5, 103.0]);
        let smoothed =
            crate::domain::filter::calculate_sma(&series, 3).unwrap();
        let svg = render_overlay(&series, &smoothed);

        // Two polylines: raw has 5 coordinate pairs, smoothed only 3.
        let lines: Vec<&str> = svg
            .lines()
            .filter(|l| l.starts_with("<polyline"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches(',').count(), 5);
        assert_eq!(lines[1].matches(',').count(), 3);
    }

    #[test]
    fn forecast_chart_has_two_bands() {
        let series = make_series(&[100.0, 101.0, 102.0, 101.5, 103.0]);
        let svg = render_forecast(&series, &sample_forecast());

        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains(FORECAST_COLOR));
        assert!(svg.contains("ARIMA(0,1,0)"));
    }

    #[test]
    fn renderers_do_not_mutate_inputs() {
        let series = make_series(&vec![100.0; 60]);
        let before = series.prices();
        let run = pipeline::run(&series, &PipelineConfig::default());

        for smoothed in run.smoothed() {
            let _ = render_overlay(&series, smoothed);
        }
        if let Ok(forecast) = &run.forecast {
            let _ = render_forecast(&series, forecast);
        }

        assert_eq!(series.prices(), before);
    }

    #[test]
    fn filter_colors_are_distinct() {
        let colors = [
            filter_color(&FilterType::Sma(1)),
            filter_color(&FilterType::Ema(1)),
            filter_color(&FilterType::Wma(1)),
            filter_color(&FilterType::SavitzkyGolay {
                degree: 1,
                window: 3,
            }),
            filter_color(&FilterType::Lowess {
                fraction: 0.5,
                iterations: 1,
            }),
            filter_color(&FilterType::Kalman {
                measurement_var: 1.0,
                process_var: 1.0,
            }),
        ];
        let mut unique = colors.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), colors.len());
    }
}
