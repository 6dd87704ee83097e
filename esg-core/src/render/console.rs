// esg-core/src/render/console.rs
// Terminal dashboard: KPI tiles, series tails and a bounded record table

use async_trait::async_trait;
use std::fmt::Write as _;
use std::io::{self, Stdout, Write};

use esg_common::analytics::kpi::{display, NOT_AVAILABLE};
use esg_common::analytics::Snapshot;

use crate::render::errors::RenderError;
use crate::render::theme::Theme;
use crate::render::traits::Renderer;

const RULE: &str = "══════════════════════════════════════════════════════════════════════════";

pub struct ConsoleRenderer<W: Write + Send = Stdout> {
    writer: W,
    theme: Theme,
    table_rows: usize,
    name: String,
}

impl ConsoleRenderer<Stdout> {
    pub fn stdout(theme: Theme, table_rows: usize) -> Self {
        Self::new(io::stdout(), theme, table_rows)
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(writer: W, theme: Theme, table_rows: usize) -> Self {
        Self {
            writer,
            theme,
            table_rows,
            name: format!("console:{}", theme.category),
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

/// Lay out one frame. Writing into a `String` cannot fail.
pub fn render_frame(snapshot: &Snapshot, theme: &Theme, table_rows: usize) -> String {
    let mut out = String::new();
    let kpis = &snapshot.kpis;
    let deltas = &snapshot.deltas;

    let _ = writeln!(out, "╔{}", RULE);
    let _ = writeln!(
        out,
        "║ {} | {} | tick {} | {} [{}]",
        theme.category.title(),
        snapshot.selection,
        snapshot.tick,
        snapshot.published_at.format("%H:%M:%S"),
        theme.accent()
    );
    let _ = writeln!(out, "╠{}", RULE);

    let avg_delta = deltas
        .average
        .map(|d| format!("{:+.2}", d))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = writeln!(out, "║ Average Value            {:>14} ({})", display(kpis.average), avg_delta);

    let total = kpis
        .total
        .map(|t| format!("{}", t.trunc() as i64))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let total_delta = deltas
        .total
        .map(|d| format!("{:+}", d))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = writeln!(out, "║ Total Depletion          {:>14} ({})", total, total_delta);

    let latest_delta = deltas
        .latest_year
        .map(|d| format!("{} {}", d, d.trend.colour()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = writeln!(
        out,
        "║ Latest Year Data ({})  {:>14} ({})",
        kpis.latest_year.year,
        display(kpis.latest_year.value),
        latest_delta
    );

    let _ = writeln!(out, "╟{}", RULE);
    let rolling_tail = snapshot.rolling_mean.last().and_then(|p| p.value);
    let cumulative_tail = snapshot
        .cumulative_sum
        .as_ref()
        .and_then(|series| series.last())
        .map(|p| p.value);
    let _ = writeln!(
        out,
        "║ Rolling mean (last)      {:>14} | Cumulative (last) {:>14}",
        display(rolling_tail),
        display(cumulative_tail)
    );

    let _ = writeln!(out, "╟{}", RULE);
    if snapshot.is_empty() {
        let _ = writeln!(out, "║ No data for this selection ({})", NOT_AVAILABLE);
    } else {
        let _ = writeln!(
            out,
            "║ {:<6} | {:<28} | {:>12} | {:>12} | {:>12}",
            "Year", "Indicator", "Value", "Adjusted", "Depletion"
        );
        for row in snapshot.records.iter().take(table_rows) {
            let metric: String = row.record.metric.chars().take(28).collect();
            let _ = writeln!(
                out,
                "║ {:<6} | {:<28} | {:>12.2} | {:>12.2} | {:>12.2}",
                row.record.year, metric, row.record.value, row.adjusted, row.depletion
            );
        }
        if snapshot.records.len() > table_rows {
            let _ = writeln!(out, "║ ... {} more rows", snapshot.records.len() - table_rows);
        }
    }

    for failure in &snapshot.failures {
        let _ = writeln!(out, "║ ⚠ {}", failure);
    }
    let _ = writeln!(out, "╚{}", RULE);
    out
}

#[async_trait]
impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, snapshot: Snapshot) -> Result<(), RenderError> {
        let frame = render_frame(&snapshot, &self.theme, self.table_rows);
        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
