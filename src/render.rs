//! PNG rendering of the 2x2 comparison grid.
//!
//! Panel 1 holds the original counts; panels 2-4 overlay the original with the
//! display-clipped noisy series for one ε each.

use std::fmt::Display;
use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::register_font;
use tracing::{info, warn};

use crate::errors::{LaplaceError, LaplaceResult};
use crate::experiment::{ExperimentOutcome, NoisyPanel};

pub const FIGURE_TITLE: &str =
    "Effect of Laplace Noise on Synthetic Counts for Different Privacy Levels";

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

const ORIGINAL_COLOR: RGBColor = RGBColor(31, 119, 180);
const NOISY_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Anything that can turn an [`ExperimentOutcome`] into an image on disk.
pub trait ComparisonRenderer {
    fn render(&self, outcome: &ExperimentOutcome, path: &Path) -> LaplaceResult<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlottersRenderer {
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self::with_dpi(300)
    }
}

impl PlottersRenderer {
    /// Number of noisy panels the grid has room for.
    pub const NOISY_PANELS: usize = 3;

    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            width_in: 12.0,
            height_in: 8.0,
        }
    }

    /// Rejects a resolution or ε count the grid cannot draw, before any work is done.
    pub fn check_layout(&self, noisy_panels: usize) -> LaplaceResult<()> {
        if self.dpi == 0 {
            return Err(LaplaceError::invalid("dpi", "must be greater than zero"));
        }
        if noisy_panels > Self::NOISY_PANELS {
            return Err(LaplaceError::invalid(
                "epsilons",
                format!(
                    "the grid holds {} noisy panels, got {noisy_panels}",
                    Self::NOISY_PANELS
                ),
            ));
        }
        Ok(())
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Typographic points to pixels at this resolution.
    fn px(&self, points: f64) -> u32 {
        ((points * self.dpi as f64) / 72.0).round().max(1.0) as u32
    }

    fn draw(&self, outcome: &ExperimentOutcome, path: &Path) -> LaplaceResult<()> {
        let fail = |err: &dyn Display| LaplaceError::render(path, err);

        let root = BitMapBackend::new(path, self.pixel_size()).into_drawing_area();
        root.fill(&WHITE).map_err(|e| fail(&e))?;
        let body = root
            .titled(FIGURE_TITLE, (FONT_FAMILY, self.px(14.0)))
            .map_err(|e| fail(&e))?;
        let areas = body.split_evenly((2, 2));

        let y_max = self.y_upper_bound(outcome);
        let original: Vec<(f64, f64)> = outcome
            .time
            .as_slice()
            .iter()
            .map(|t| *t as f64)
            .zip(outcome.counts.iter_f64())
            .collect();

        self.draw_panel(&areas[0], "Original synthetic counts", &original, None, y_max)
            .map_err(|e| fail(&e))?;
        for (slot, area) in areas.iter().skip(1).enumerate() {
            match outcome.panels.get(slot) {
                Some(panel) => {
                    let title = format!("Original vs Laplace noisy (epsilon = {})", panel.epsilon);
                    self.draw_panel(area, &title, &original, Some(panel), y_max)
                        .map_err(|e| fail(&e))?;
                }
                None => warn!(slot = slot + 2, "no privacy budget for panel, leaving it empty"),
            }
        }

        root.present().map_err(|e| fail(&e))?;
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, plotters::coord::Shift>,
        title: &str,
        original: &[(f64, f64)],
        noisy: Option<&NoisyPanel>,
        y_max: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let x_max = original.len().saturating_sub(1).max(1) as f64;
        let stroke = self.px(1.5);
        let marker = self.px(2.5);

        let mut chart = ChartBuilder::on(area)
            .caption(title, (FONT_FAMILY, self.px(11.0)))
            .margin(self.px(8.0))
            .x_label_area_size(self.px(24.0))
            .y_label_area_size(self.px(30.0))
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Count")
            .label_style((FONT_FAMILY, self.px(8.0)))
            .axis_desc_style((FONT_FAMILY, self.px(9.0)))
            .light_line_style(WHITE)
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                original.iter().copied(),
                ORIGINAL_COLOR.stroke_width(stroke),
            ))?
            .label("Original")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], ORIGINAL_COLOR.stroke_width(stroke))
            });
        chart.draw_series(
            original
                .iter()
                .map(|point| Circle::new(*point, marker, ORIGINAL_COLOR.filled())),
        )?;

        let Some(panel) = noisy else {
            return Ok(());
        };

        let points: Vec<(f64, f64)> = original
            .iter()
            .map(|(t, _)| *t)
            .zip(panel.display.iter().copied())
            .collect();
        chart
            .draw_series(DashedLineSeries::new(
                points.clone(),
                self.px(4.0),
                self.px(2.0),
                NOISY_COLOR.stroke_width(stroke),
            ))?
            .label(format!("Noisy (epsilon = {})", panel.epsilon))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], NOISY_COLOR.stroke_width(stroke))
            });
        chart.draw_series(
            points
                .iter()
                .map(|point| Circle::new(*point, marker, NOISY_COLOR.filled())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT_FAMILY, self.px(8.0)))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    /// Shared y range so every panel is drawn on the same scale.
    fn y_upper_bound(&self, outcome: &ExperimentOutcome) -> f64 {
        let top = outcome
            .panels
            .iter()
            .take(Self::NOISY_PANELS)
            .flat_map(|panel| panel.display.iter().copied())
            .chain(outcome.counts.iter_f64())
            .fold(0.0, f64::max);
        (top * 1.1).max(1.0)
    }
}

impl ComparisonRenderer for PlottersRenderer {
    fn render(&self, outcome: &ExperimentOutcome, path: &Path) -> LaplaceResult<()> {
        self.check_layout(outcome.panels.len())?;
        ensure_font(path)?;
        self.draw(outcome, path)?;
        let (width, height) = self.pixel_size();
        info!(
            path = %path.display(),
            width,
            height,
            dpi = self.dpi,
            panels = outcome.panels.len() + 1,
            "wrote comparison grid"
        );
        Ok(())
    }
}

fn ensure_font(path: &Path) -> LaplaceResult<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if ok {
        Ok(())
    } else {
        Err(LaplaceError::render(path, "bundled font could not be loaded"))
    }
}
