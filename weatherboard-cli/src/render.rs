//! Terminal rendering of the dashboard views.

use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use weatherboard_core::{
    CurrentView, DailyView, ErrorKind, HourlyView, Renderer, ResolvedPlace,
    projector::ChartSeries,
};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Writes views to `out` and problems to stderr.
pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<W>,
    interactive: bool,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(io::stdout()),
            interactive: io::stderr().is_terminal(),
        }
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    #[cfg(test)]
    fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            interactive: false,
        }
    }

    fn write(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write dashboard output");
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn show_current(&self, place: &ResolvedPlace, view: &CurrentView) {
        self.write(&format_current(place, view));
    }

    fn show_hourly(&self, view: &HourlyView) {
        self.write(&format_hourly(view));
    }

    fn show_daily(&self, view: &DailyView) {
        self.write(&format_daily(view));
    }

    fn show_not_found(&self, query: &str) {
        if query.is_empty() {
            eprintln!("{}", ErrorKind::NotFound.user_message());
        } else {
            eprintln!("No results found for \"{query}\".");
        }
    }

    fn show_error(&self, kind: ErrorKind) {
        eprintln!("Error: {}", kind.user_message());
    }

    fn set_loading(&self, active: bool) {
        if self.interactive && active {
            eprintln!("Loading...");
        }
    }
}

fn format_current(place: &ResolvedPlace, view: &CurrentView) -> String {
    let chips: Vec<String> = view.chips.iter().map(ToString::to_string).collect();

    format!(
        "{name}  [{source}]\n  {label}, {temp}  ({icon})\n  Observed {at} {tz}\n  {chips}\n\n",
        name = place.display_name(),
        source = place.source,
        label = view.descriptor.label,
        temp = view.temperature,
        icon = view.descriptor.icon,
        at = view.observed_at,
        tz = view.timezone,
        chips = chips.join(" · "),
    )
}

fn format_hourly(view: &HourlyView) -> String {
    let mut text = String::from("Next hours\n");
    if view.is_empty() {
        text.push_str("  (no upcoming hourly data)\n\n");
        return text;
    }

    for entry in &view.entries {
        text.push_str(&format!(
            "  {:<6} {:>6}  {:<14} {}\n",
            entry.time_label, entry.temperature, entry.descriptor.short_label, entry.wind
        ));
    }

    let chart = view.chart();
    text.push_str(&format!("\n  {}\n", sparkline(&chart)));
    if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
        text.push_str(&format!("  {first} .. {last}\n"));
    }
    text.push('\n');
    text
}

fn format_daily(view: &DailyView) -> String {
    let mut text = String::from("Forecast\n");
    for entry in &view.entries {
        text.push_str(&format!(
            "  {:<8} {:<12} {}\n",
            entry.day_label, entry.range, entry.condition
        ));
    }
    text
}

/// One bar per sample scaled between the series min and max; gaps stay blank.
fn sparkline(chart: &ChartSeries) -> String {
    let known: Vec<f64> = chart.temperatures.iter().flatten().copied().collect();
    let min = known.iter().copied().fold(f64::INFINITY, f64::min);
    let max = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    chart
        .temperatures
        .iter()
        .map(|t| match t {
            None => ' ',
            Some(_) if span <= f64::EPSILON => BARS[BARS.len() / 2],
            Some(v) => {
                let level = ((v - min) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}
