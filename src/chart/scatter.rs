use std::path::Path;

use kurbo::{Affine, Cap, Circle, Line, Point, Stroke, Vec2};
use peniko::{Brush, Color};
use polars::prelude::*;
use serde::Deserialize;

use crate::{
  bounds::{Bounds, Range},
  error::{Result, VizuError},
  format,
  interpolate::keyframes,
  legend::{Corner, Legend},
  render::{Align, Animation, DrawText, Render, RenderConfig, export_gif},
  reshape::{FrameTable, GROUP, LongFields, Measure, NAME, column, floats, strings},
  theme::{self, GroupColors},
};

const X: &str = "x";
const Y: &str = "y";
const SIZE: &str = "size";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnimatedScatterOptions {
  pub title:            String,
  pub x_label:          Option<String>,
  pub y_label:          Option<String>,
  /// Column driving bubble area. Without one, every bubble has the same size.
  pub size_field:       Option<String>,
  pub size_scale:       f64,
  pub steps_per_period: u32,
  pub fps:              u32,
  pub width:            u32,
  pub height:           u32,
  pub show_names:       bool,
}

impl Default for AnimatedScatterOptions {
  fn default() -> Self {
    AnimatedScatterOptions {
      title:            "Animated Scatter".to_string(),
      x_label:          None,
      y_label:          None,
      size_field:       None,
      size_scale:       1.0,
      steps_per_period: 5,
      fps:              10,
      width:            1200,
      height:           1000,
      show_names:       true,
    }
  }
}

/// Builds a Gapminder-style scatter out of a long dataset: one row per entity and point in time.
pub struct AnimatedScatter<'a> {
  data:        &'a DataFrame,
  time_field:  String,
  x_field:     String,
  y_field:     String,
  name_field:  String,
  group_field: String,
  options:     AnimatedScatterOptions,
}

pub struct ScatterAnimation {
  table:   FrameTable,
  colors:  GroupColors,
  legend:  Legend,
  bounds:  Bounds,
  sized:   bool,
  options: AnimatedScatterOptions,
}

#[derive(Debug, Clone)]
pub struct ScatterFrame {
  pub time:    f64,
  pub period:  f64,
  /// Largest first, so smaller bubbles are drawn on top.
  pub bubbles: Vec<Bubble>,
}

#[derive(Debug, Clone)]
pub struct Bubble {
  pub name:   String,
  pub group:  String,
  pub x:      f64,
  pub y:      f64,
  pub radius: f64,
  pub color:  Color,
}

impl<'a> AnimatedScatter<'a> {
  pub(crate) fn new(
    data: &'a DataFrame,
    time_field: &str,
    x_field: &str,
    y_field: &str,
    name_field: &str,
    group_field: &str,
  ) -> Self {
    AnimatedScatter {
      data,
      time_field: time_field.to_string(),
      x_field: x_field.to_string(),
      y_field: y_field.to_string(),
      name_field: name_field.to_string(),
      group_field: group_field.to_string(),
      options: AnimatedScatterOptions::default(),
    }
  }

  pub fn title(&mut self, title: &str) -> &mut Self {
    self.options.title = title.to_string();
    self
  }

  pub fn x_label(&mut self, label: &str) -> &mut Self {
    self.options.x_label = Some(label.to_string());
    self
  }

  pub fn y_label(&mut self, label: &str) -> &mut Self {
    self.options.y_label = Some(label.to_string());
    self
  }

  pub fn size_field(&mut self, field: &str) -> &mut Self {
    self.options.size_field = Some(field.to_string());
    self
  }

  pub fn size_scale(&mut self, scale: f64) -> &mut Self {
    self.options.size_scale = scale;
    self
  }

  pub fn steps_per_period(&mut self, steps: u32) -> &mut Self {
    self.options.steps_per_period = steps;
    self
  }

  pub fn fps(&mut self, fps: u32) -> &mut Self {
    self.options.fps = fps;
    self
  }

  pub fn size(&mut self, width: u32, height: u32) -> &mut Self {
    self.options.width = width;
    self.options.height = height;
    self
  }

  pub fn show_names(&mut self, show: bool) -> &mut Self {
    self.options.show_names = show;
    self
  }

  pub fn options(&mut self, options: AnimatedScatterOptions) -> &mut Self {
    self.options = options;
    self
  }

  pub fn prepare(&self) -> Result<ScatterAnimation> {
    super::validate_timing(
      self.options.steps_per_period,
      self.options.fps,
      RenderConfig { width: self.options.width, height: self.options.height },
    )?;
    if !(self.options.size_scale.is_finite() && self.options.size_scale > 0.0) {
      return Err(VizuError::option("size_scale", "must be a positive number"));
    }

    let keys = keyframes(floats(column(self.data, &self.time_field)?)?.into_iter().flatten());
    if keys.is_empty() {
      return Err(VizuError::NoTimeValues(self.time_field.clone()));
    }

    let mut measures = vec![
      Measure { source: &self.x_field, output: X },
      Measure { source: &self.y_field, output: Y },
    ];
    if let Some(size_field) = &self.options.size_field {
      measures.push(Measure { source: size_field, output: SIZE });
    }

    let table = FrameTable::build(
      self.data,
      LongFields {
        name:  &self.name_field,
        group: &self.group_field,
        time:  &self.time_field,
        row:   None,
      },
      &measures,
      keys,
      self.options.steps_per_period,
    )?;

    // Fixed for the whole animation so motion reads as motion, not rescaling.
    let span = |name| -> Result<Range> {
      let values = floats(table.data().column(name)?)?;
      Ok(Range::from_values(values.into_iter().flatten()).unwrap_or(Range::new(0.0, 1.0)))
    };
    let bounds = Bounds::new(span(X)?, span(Y)?).expand_by(0.1);

    let colors = GroupColors::assign(table.groups()?);
    let legend = Legend::for_groups(Some(&format::title_case(&self.group_field)), &colors);

    Ok(ScatterAnimation {
      table,
      colors,
      legend,
      bounds,
      sized: self.options.size_field.is_some(),
      options: self.options.clone(),
    })
  }

  /// Renders the scatter and writes it as a GIF. Returns the number of frames written.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
    let animation = self.prepare()?;
    export_gif(&animation, path.as_ref())
  }
}

impl ScatterAnimation {
  const MIN_RADIUS: f64 = 3.0;
  const DEFAULT_RADIUS: f64 = 8.0;

  pub fn frame_count(&self) -> usize { self.table.frame_count() }
  pub fn bounds(&self) -> Bounds { self.bounds }
  pub fn colors(&self) -> &GroupColors { &self.colors }

  pub fn frame(&self, index: usize) -> Result<ScatterFrame> {
    let time = self.table.time(index)?;
    let period = self.table.period(index)?;
    let rows = self.table.frame(index).collect()?;

    let names = strings(rows.column(NAME)?)?;
    let groups = strings(rows.column(GROUP)?)?;
    let xs = floats(rows.column(X)?)?;
    let ys = floats(rows.column(Y)?)?;
    let sizes = if self.sized { floats(rows.column(SIZE)?)? } else { vec![None; rows.height()] };

    let mut bubbles = Vec::with_capacity(rows.height());
    for (i, (name, group)) in names.into_iter().zip(groups).enumerate() {
      let (Some(x), Some(y)) = (xs[i], ys[i]) else { continue };
      let radius = match sizes[i] {
        Some(size) => self.radius(size),
        None => Self::DEFAULT_RADIUS,
      };

      bubbles.push(Bubble { color: self.colors.get(&group), name, group, x, y, radius });
    }
    bubbles.sort_by(|a, b| b.radius.total_cmp(&a.radius));

    Ok(ScatterFrame { time, period, bubbles })
  }

  /// Bubble area grows linearly with size.
  fn radius(&self, size: f64) -> f64 {
    (size.max(0.0) * self.options.size_scale).sqrt().max(Self::MIN_RADIUS)
  }

  fn draw(&self, frame: &ScatterFrame, render: &mut Render) {
    const LEFT: f64 = 130.0;
    const RIGHT: f64 = 50.0;
    const TOP: f64 = 100.0;
    const BOTTOM: f64 = 110.0;

    let width = f64::from(self.options.width);
    let height = f64::from(self.options.height);
    let viewport =
      Bounds::new(Range::new(LEFT, width - RIGHT), Range::new(height - BOTTOM, TOP));
    let transform = self.bounds.transform_to(viewport);
    let center =
      Point::new((viewport.x.min + viewport.x.max) / 2.0, (viewport.y.min + viewport.y.max) / 2.0);

    super::draw_title(render, Point::new(width / 2.0, 30.0), &self.options.title);

    if let Some(x_label) = &self.options.x_label {
      render.draw_text(DrawText {
        text: x_label,
        size: 24.0,
        position: Point::new(center.x, viewport.y.min + 50.0),
        horizontal_align: Align::Center,
        ..Default::default()
      });
    }

    if let Some(y_label) = &self.options.y_label {
      render.draw_text(DrawText {
        text: y_label,
        size: 24.0,
        position: Point::new(viewport.x.min - 80.0, center.y),
        transform: Affine::rotate(-std::f64::consts::FRAC_PI_2),
        horizontal_align: Align::Center,
        vertical_align: Align::End,
        ..Default::default()
      });
    }

    let border = Stroke::new(2.0);
    let tick_stroke = border.clone().with_start_cap(Cap::Butt);
    render.stroke(
      &Line::new((viewport.x.min, viewport.y.min), (viewport.x.max, viewport.y.min)),
      Affine::IDENTITY,
      theme::AXIS,
      &border,
    );
    render.stroke(
      &Line::new((viewport.x.min, viewport.y.min), (viewport.x.min, viewport.y.max)),
      Affine::IDENTITY,
      theme::AXIS,
      &border,
    );

    let ticks = self.bounds.y.nice_ticks(8);
    let decimals = ticks.decimals();
    for (y, vy) in ticks
      .map(|v| (v, (transform * Point::new(0.0, v)).y))
      .filter(|(_, vy)| viewport.y.contains(vy))
    {
      render.stroke(
        &Line::new((viewport.x.min, vy), (viewport.x.max, vy)),
        Affine::IDENTITY,
        theme::GRID,
        &Stroke::new(1.0),
      );
      render.stroke(
        &Line::new((viewport.x.min, vy), (viewport.x.min - 10.0, vy)),
        Affine::IDENTITY,
        theme::AXIS,
        &tick_stroke,
      );
      render.draw_text(DrawText {
        text: &format::thousands(y, decimals),
        size: 14.0,
        position: Point::new(viewport.x.min - 15.0, vy),
        horizontal_align: Align::End,
        vertical_align: Align::Center,
        ..Default::default()
      });
    }

    let ticks = self.bounds.x.nice_ticks(8);
    let decimals = ticks.decimals();
    for (x, vx) in ticks
      .map(|v| (v, (transform * Point::new(v, 0.0)).x))
      .filter(|(_, vx)| viewport.x.contains(vx))
    {
      render.stroke(
        &Line::new((vx, viewport.y.min), (vx, viewport.y.max)),
        Affine::IDENTITY,
        theme::GRID,
        &Stroke::new(1.0),
      );
      render.stroke(
        &Line::new((vx, viewport.y.min), (vx, viewport.y.min + 10.0)),
        Affine::IDENTITY,
        theme::AXIS,
        &tick_stroke,
      );
      render.draw_text(DrawText {
        text: &format::thousands(x, decimals),
        size: 14.0,
        position: Point::new(vx, viewport.y.min + 15.0),
        horizontal_align: Align::Center,
        ..Default::default()
      });
    }

    let corner = Point::new(viewport.x.max - 10.0, viewport.y.min - 10.0);
    super::draw_period(render, corner, frame.period);

    let outline = Stroke::new(1.5);
    for bubble in &frame.bubbles {
      let center = transform * Point::new(bubble.x, bubble.y);
      let circle = Circle::new(center, bubble.radius);
      render.fill(&circle, Affine::IDENTITY, bubble.color.with_alpha(0.75));
      render.stroke(&circle, Affine::IDENTITY, Color::WHITE, &outline);

      if self.options.show_names {
        render.draw_text(DrawText {
          text: &bubble.name,
          size: 14.0,
          brush: Brush::Solid(theme::TEXT),
          position: center + Vec2::new(bubble.radius + 4.0, 0.0),
          vertical_align: Align::Center,
          ..Default::default()
        });
      }
    }

    self.legend.draw(
      render,
      Point::new(viewport.x.min + 16.0, viewport.y.max + 16.0),
      Corner::TopLeft,
    );
  }
}

impl Animation for ScatterAnimation {
  fn canvas(&self) -> RenderConfig {
    RenderConfig { width: self.options.width, height: self.options.height }
  }

  fn fps(&self) -> u32 { self.options.fps }
  fn frame_count(&self) -> usize { self.table.frame_count() }

  fn draw_frame(&self, frame: usize, render: &mut Render) -> Result<()> {
    let frame = self.frame(frame)?;
    self.draw(&frame, render);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Vizu;

  fn companies() -> Vizu {
    Vizu::new(
      df! {
        "year"         => [2010, 2015, 2020, 2010, 2015, 2020, 2010, 2020],
        "company"      => ["Alpha", "Alpha", "Alpha", "Beta", "Beta", "Beta", "Gamma", "Gamma"],
        "sector"       => ["Software", "Software", "Software", "Hardware", "Hardware", "Hardware", "Cloud", "Cloud"],
        "market_share" => [10.0, 15.0, 25.0, 30.0, 25.0, 22.0, 5.0, 30.0],
        "satisfaction" => [70.0, 75.0, 85.0, 90.0, 82.0, 80.0, 60.0, 92.0],
        "revenue"      => [500.0, 1200.0, 3000.0, 4000.0, 3500.0, 3200.0, 200.0, 4000.0],
      }
      .unwrap(),
    )
    .unwrap()
  }

  #[test]
  fn frames_between_keyframes() {
    let vizu = companies();
    let scatter = vizu
      .animated_scatter("year", "market_share", "satisfaction", "company", "sector")
      .steps_per_period(5)
      .prepare()
      .unwrap();

    assert_eq!(scatter.frame_count(), 2 * 5 + 1);
    assert_eq!(scatter.colors().len(), 3);

    let frame = scatter.frame(5).unwrap();
    assert_eq!(frame.time, 2015.0);
    assert_eq!(frame.bubbles.len(), 3);

    // Gamma has no 2015 row; it is interpolated across.
    let gamma = frame.bubbles.iter().find(|b| b.name == "Gamma").unwrap();
    assert_eq!((gamma.x, gamma.y), (17.5, 76.0));
    assert!(frame.bubbles.iter().all(|b| b.radius == 8.0));
  }

  #[test]
  fn bounds_cover_every_frame() {
    let vizu = companies();
    let scatter = vizu
      .animated_scatter("year", "market_share", "satisfaction", "company", "sector")
      .prepare()
      .unwrap();

    let bounds = scatter.bounds();
    for index in 0..scatter.frame_count() {
      for bubble in scatter.frame(index).unwrap().bubbles {
        assert!(bounds.contains(Point::new(bubble.x, bubble.y)));
      }
    }
    assert_eq!(bounds.x, Range::new(5.0, 30.0).expand_by(0.1));
  }

  #[test]
  fn sized_bubbles_largest_first() {
    let vizu = companies();
    let scatter = vizu
      .animated_scatter("year", "market_share", "satisfaction", "company", "sector")
      .size_field("revenue")
      .size_scale(0.1)
      .prepare()
      .unwrap();

    let first = scatter.frame(0).unwrap();
    let radii = first.bubbles.iter().map(|b| b.radius).collect::<Vec<_>>();
    assert_eq!(radii, vec![20.0, (500.0f64 * 0.1).sqrt(), (200.0f64 * 0.1).sqrt()]);
    assert_eq!(first.bubbles[0].name, "Beta");
  }

  #[test]
  fn rows_without_a_time_are_skipped() {
    let vizu = Vizu::new(
      df! {
        "year"    => [Some(2000), None, Some(2010)],
        "company" => ["Alpha", "Alpha", "Alpha"],
        "sector"  => ["Software", "Software", "Software"],
        "x"       => [1.0, 99.0, 3.0],
        "y"       => [10.0, 99.0, 30.0],
      }
      .unwrap(),
    )
    .unwrap();

    let scatter = vizu
      .animated_scatter("year", "x", "y", "company", "sector")
      .steps_per_period(2)
      .prepare()
      .unwrap();
    assert_eq!(scatter.frame_count(), 3);

    let xs = (0..scatter.frame_count())
      .map(|i| scatter.frame(i).unwrap().bubbles[0].x)
      .collect::<Vec<_>>();
    assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    assert_eq!(scatter.bounds().y, Range::new(10.0, 30.0).expand_by(0.1));
  }

  #[test]
  fn frame_index_out_of_range() {
    let vizu = companies();
    let scatter = vizu
      .animated_scatter("year", "market_share", "satisfaction", "company", "sector")
      .prepare()
      .unwrap();
    assert!(matches!(
      scatter.frame(scatter.frame_count()),
      Err(VizuError::FrameOutOfRange { .. })
    ));
  }

  #[test]
  fn rejects_bad_input() {
    let vizu = companies();
    assert!(matches!(
      vizu.animated_scatter("year", "share", "satisfaction", "company", "sector").prepare(),
      Err(VizuError::MissingColumn(c)) if c == "share"
    ));
    assert!(matches!(
      vizu
        .animated_scatter("year", "market_share", "satisfaction", "company", "sector")
        .size_scale(0.0)
        .prepare(),
      Err(VizuError::InvalidOption { name: "size_scale", .. })
    ));
    assert!(matches!(
      vizu.animated_scatter("company", "market_share", "satisfaction", "company", "sector").prepare(),
      Err(VizuError::NoTimeValues(_))
    ));
  }
}
