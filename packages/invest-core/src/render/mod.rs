//! Chart rendering.
//!
//! Metrics code never draws anything itself; it hands a value series or a
//! weight map to a [`Renderer`].

mod text;

pub use text::TextRenderer;

use crate::types::Allocation;
use chrono::NaiveDate;

/// Failures while producing a chart.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can draw the two portfolio charts.
pub trait Renderer {
    /// Line chart of a dated value series.
    fn line(&mut self, title: &str, series: &[(NaiveDate, f64)]) -> Result<(), RenderError>;

    /// Pie-style breakdown of weights.
    fn pie(&mut self, title: &str, weights: &Allocation) -> Result<(), RenderError>;
}

/// Format a fraction as a percentage, e.g. `0.1234` → `"12.34%"`.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.1234, 2), "12.34%");
        assert_eq!(percent(0.5, 1), "50.0%");
        assert_eq!(percent(-0.0312, 2), "-3.12%");
        assert_eq!(percent(1.0, 0), "100%");
    }
}
