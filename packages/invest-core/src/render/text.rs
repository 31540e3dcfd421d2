//! Terminal charts drawn with ratatui widgets.
//!
//! Widgets render into an off-screen [`Buffer`] sized for the chart, and the
//! buffer rows are then written out as plain lines, so the same output works
//! on a terminal, in a pipe or in a test.

use super::{percent, RenderError, Renderer};
use crate::types::Allocation;
use chrono::NaiveDate;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Widget};
use std::io::{self, Write};

const DEFAULT_WIDTH: u16 = 72;
const DEFAULT_HEIGHT: u16 = 16;
const MIN_WIDTH: u16 = 24;
const MIN_HEIGHT: u16 = 6;
const BAR_WIDTH: u16 = 40;
const PERCENT_WIDTH: u16 = 8;

/// Draws charts into any writer.
#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    out: W,
    width: u16,
    height: u16,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Set the line chart size in cells, borders included.
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width.max(MIN_WIDTH);
        self.height = height.max(MIN_HEIGHT);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn no_data(&mut self, title: &str) -> Result<(), RenderError> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "  (no data)")?;
        Ok(())
    }

    /// Render `widget` into a fresh buffer and write its rows.
    fn flush(&mut self, widget: impl Widget, width: u16, height: u16) -> Result<(), RenderError> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        for y in area.top()..area.bottom() {
            let row: String = (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect();
            writeln!(self.out, "{}", row.trim_end())?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn line(&mut self, title: &str, series: &[(NaiveDate, f64)]) -> Result<(), RenderError> {
        let (Some((first, _)), Some((last, _))) = (series.first(), series.last()) else {
            return self.no_data(title);
        };

        let points: Vec<(f64, f64)> = series
            .iter()
            .enumerate()
            .map(|(i, (_, value))| (i as f64, *value))
            .collect();
        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
                (lo.min(*v), hi.max(*v))
            });
        // Keep the extremes off the border; a flat series still needs a span
        let pad = if max > min {
            (max - min) * 0.05
        } else {
            max.abs().max(1.0) * 0.05
        };

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")))
            .x_axis(
                Axis::default()
                    .bounds([0.0, (points.len() - 1).max(1) as f64])
                    .labels(vec![Span::raw(first.to_string()), Span::raw(last.to_string())]),
            )
            .y_axis(
                Axis::default()
                    .bounds([min - pad, max + pad])
                    .labels(vec![Span::raw(format!("{min:.2}")), Span::raw(format!("{max:.2}"))]),
            );

        self.flush(chart, self.width, self.height)
    }

    fn pie(&mut self, title: &str, weights: &Allocation) -> Result<(), RenderError> {
        if weights.is_empty() {
            return self.no_data(title);
        }

        let bars = AllocationBars::new(title, weights);
        let (width, height) = bars.size();
        self.flush(bars, width, height)
    }
}

/// One row per holding: ticker, a gauge filled to its weight, the percentage.
struct AllocationBars<'a> {
    title: &'a str,
    weights: &'a Allocation,
    name_width: u16,
}

impl<'a> AllocationBars<'a> {
    fn new(title: &'a str, weights: &'a Allocation) -> Self {
        let name_width = weights.keys().map(String::len).max().unwrap_or(0);
        Self {
            title,
            weights,
            name_width: u16::try_from(name_width).unwrap_or(u16::MAX),
        }
    }

    /// Outer size including the border.
    fn size(&self) -> (u16, u16) {
        let rows = u16::try_from(self.weights.len()).unwrap_or(u16::MAX);
        let content = self.name_width.saturating_add(1 + BAR_WIDTH + PERCENT_WIDTH);
        let title = u16::try_from(self.title.len()).unwrap_or(u16::MAX).saturating_add(2);
        (content.max(title).saturating_add(2), rows.saturating_add(2))
    }
}

impl Widget for AllocationBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::vertical(vec![Constraint::Length(1); self.weights.len()]).split(inner);
        for ((ticker, weight), row) in self.weights.iter().zip(rows.iter()) {
            let [name, bar, value] = Layout::horizontal([
                Constraint::Length(self.name_width.saturating_add(1)),
                Constraint::Length(BAR_WIDTH),
                Constraint::Length(PERCENT_WIDTH),
            ])
            .areas(*row);

            Paragraph::new(ticker.as_str()).render(name, buf);
            Gauge::default()
                .ratio(weight.clamp(0.0, 1.0))
                .label("")
                .gauge_style(Style::default().fg(Color::Green))
                .render(bar, buf);
            Paragraph::new(percent(*weight, 1))
                .alignment(Alignment::Right)
                .render(value, buf);
        }
    }
}
