mod bar_race;
mod scatter;

pub use bar_race::{Bar, BarChartRace, BarChartRaceOptions, BarFrame, BarRace};
pub use scatter::{AnimatedScatter, AnimatedScatterOptions, Bubble, ScatterAnimation, ScatterFrame};

use kurbo::Point;
use parley::FontWeight;
use peniko::Brush;

use crate::{
  error::{Result, VizuError},
  format,
  render::{Align, DrawText, Render, RenderConfig},
  theme,
};

const TITLE_SIZE: f32 = 36.0;
const PERIOD_SIZE: f32 = 72.0;

/// Checks the options every animation shares.
fn validate_timing(steps_per_period: u32, fps: u32, canvas: RenderConfig) -> Result<()> {
  if steps_per_period == 0 {
    return Err(VizuError::option("steps_per_period", "must be at least 1"));
  }
  if fps == 0 {
    return Err(VizuError::option("fps", "must be at least 1"));
  }
  canvas.validate()
}

fn draw_title(render: &mut Render, center_top: Point, title: &str) {
  if title.is_empty() {
    return;
  }

  render.draw_text(DrawText {
    text: title,
    size: TITLE_SIZE,
    weight: FontWeight::BOLD,
    position: center_top,
    horizontal_align: Align::Center,
    ..Default::default()
  });
}

/// The big period label in a corner of the plot, anchored by its bottom-right corner.
fn draw_period(render: &mut Render, bottom_right: Point, period: f64) {
  render.draw_text(DrawText {
    text: &format::period(period),
    size: PERIOD_SIZE,
    weight: FontWeight::new(800.0),
    brush: Brush::Solid(theme::MUTED),
    position: bottom_right,
    horizontal_align: Align::End,
    vertical_align: Align::End,
    ..Default::default()
  });
}
