use std::path::Path;

use kurbo::{Affine, Line, Point, Rect, Stroke, Vec2};
use parley::FontWeight;
use peniko::{Brush, Color};
use polars::prelude::*;
use serde::Deserialize;

use crate::{
  bounds::{Bounds, Range},
  error::{Result, VizuError},
  format,
  legend::{Corner, Legend},
  render::{Align, Animation, DrawText, Render, RenderConfig, export_gif},
  reshape::{
    FrameTable, GROUP, LongFields, Measure, NAME, ROW, TIME, VALUE, floats, strings,
    wide_to_long,
  },
  theme::{self, GroupColors},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BarChartRaceOptions {
  pub title:            String,
  /// Bars shown per frame.
  pub top_n:            usize,
  /// Interpolated frames between consecutive periods.
  pub steps_per_period: u32,
  pub fps:              u32,
  pub width:            u32,
  pub height:           u32,
  /// Room left after the longest bar for its label, as a fraction of its length.
  pub x_margin:         f64,
}

impl Default for BarChartRaceOptions {
  fn default() -> Self {
    BarChartRaceOptions {
      title:            "Bar Chart Race".to_string(),
      top_n:            10,
      steps_per_period: 1,
      fps:              5,
      width:            1800,
      height:           960,
      x_margin:         0.15,
    }
  }
}

/// Builds a bar chart race out of a wide dataset: one row per entity, one column per period.
pub struct BarChartRace<'a> {
  data:        &'a DataFrame,
  name_field:  String,
  group_field: String,
  time_start:  i64,
  time_end:    i64,
  options:     BarChartRaceOptions,
}

/// A bar chart race with its frames interpolated, ready to draw.
pub struct BarRace {
  table:   FrameTable,
  colors:  GroupColors,
  legend:  Legend,
  options: BarChartRaceOptions,
}

/// What a single frame shows.
#[derive(Debug, Clone)]
pub struct BarFrame {
  pub time:   f64,
  pub period: f64,
  /// Largest first.
  pub bars:   Vec<Bar>,
  pub x:      Range,
}

#[derive(Debug, Clone)]
pub struct Bar {
  pub name:  String,
  pub group: String,
  pub value: f64,
  pub rank:  usize,
  pub color: Color,
}

impl<'a> BarChartRace<'a> {
  pub(crate) fn new(
    data: &'a DataFrame,
    name_field: &str,
    group_field: &str,
    time_start: i64,
    time_end: i64,
  ) -> Self {
    BarChartRace {
      data,
      name_field: name_field.to_string(),
      group_field: group_field.to_string(),
      time_start,
      time_end,
      options: BarChartRaceOptions::default(),
    }
  }

  pub fn title(&mut self, title: &str) -> &mut Self {
    self.options.title = title.to_string();
    self
  }

  pub fn top_n(&mut self, top_n: usize) -> &mut Self {
    self.options.top_n = top_n;
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

  pub fn options(&mut self, options: BarChartRaceOptions) -> &mut Self {
    self.options = options;
    self
  }

  /// Reshapes and interpolates the data without rendering anything.
  pub fn prepare(&self) -> Result<BarRace> {
    if self.time_start > self.time_end {
      return Err(VizuError::InvalidTimeRange { start: self.time_start, end: self.time_end });
    }
    if self.options.top_n == 0 {
      return Err(VizuError::option("top_n", "must be at least 1"));
    }
    super::validate_timing(
      self.options.steps_per_period,
      self.options.fps,
      RenderConfig { width: self.options.width, height: self.options.height },
    )?;

    let long = wide_to_long(self.data, &self.name_field, &self.group_field)?;
    let table = FrameTable::build(
      &long,
      LongFields { name: NAME, group: GROUP, time: TIME, row: Some(ROW) },
      &[Measure { source: VALUE, output: VALUE }],
      (self.time_start..=self.time_end).map(|t| t as f64).collect(),
      self.options.steps_per_period,
    )?;

    let colors = GroupColors::assign(table.groups()?);
    let legend = Legend::for_groups(Some(&format::title_case(&self.group_field)), &colors);

    Ok(BarRace { table, colors, legend, options: self.options.clone() })
  }

  /// Renders the race and writes it as a GIF. Returns the number of frames written.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
    let race = self.prepare()?;
    export_gif(&race, path.as_ref())
  }
}

impl BarRace {
  pub fn frame_count(&self) -> usize { self.table.frame_count() }
  pub fn colors(&self) -> &GroupColors { &self.colors }
  pub fn table(&self) -> &FrameTable { &self.table }

  pub fn frame(&self, index: usize) -> Result<BarFrame> {
    let time = self.table.time(index)?;
    let period = self.table.period(index)?;
    let rows = self
      .table
      .frame(index)
      .sort(
        [VALUE],
        SortMultipleOptions::default().with_order_descending(true).with_maintain_order(true),
      )
      .limit(IdxSize::try_from(self.options.top_n).unwrap_or(IdxSize::MAX))
      .collect()?;

    let names = strings(rows.column(NAME)?)?;
    let groups = strings(rows.column(GROUP)?)?;
    let values = floats(rows.column(VALUE)?)?;

    let bars = names
      .into_iter()
      .zip(groups)
      .zip(values)
      .filter_map(|((name, group), value)| Some((name, group, value?)))
      .enumerate()
      .map(|(rank, (name, group, value))| Bar {
        color: self.colors.get(&group),
        name,
        group,
        value,
        rank,
      })
      .collect::<Vec<_>>();

    let values = Range::from_values(bars.iter().map(|b| b.value)).unwrap_or(Range::empty());
    let scale = 1.0 + self.options.x_margin;
    let mut x = Range::new((values.min * scale).min(0.0), (values.max * scale).max(0.0));
    if x.size() == 0.0 {
      x.max = 1.0;
    }

    Ok(BarFrame { time, period, bars, x })
  }

  fn draw(&self, frame: &BarFrame, render: &mut Render) {
    const MARGIN: f64 = 40.0;
    const HEADER: f64 = 140.0;

    let width = f64::from(self.options.width);
    let height = f64::from(self.options.height);
    let plot = Rect::new(MARGIN, HEADER, width - MARGIN, height - MARGIN);

    // Rank 0 sits in the top slot.
    let slots = self.options.top_n as f64;
    let data = Bounds::new(frame.x, Range::new(0.0, slots));
    let viewport = Bounds::new(Range::new(plot.x0, plot.x1), Range::new(plot.y0, plot.y1));
    let transform = data.transform_to(viewport);

    super::draw_title(render, Point::new(width / 2.0, MARGIN / 2.0), &self.options.title);

    let ticks = frame.x.nice_ticks(5);
    let decimals = ticks.decimals();
    for tick in ticks.filter(|t| frame.x.contains(t)) {
      let x = (transform * Point::new(tick, 0.0)).x;
      render.stroke(
        &Line::new((x, plot.y0), (x, plot.y1)),
        Affine::IDENTITY,
        theme::GRID,
        &Stroke::new(1.0),
      );
      render.draw_text(DrawText {
        text: &format::thousands(tick, decimals),
        size: 16.0,
        brush: Brush::Solid(theme::MUTED),
        position: Point::new(x, plot.y0 - 8.0),
        horizontal_align: Align::Center,
        vertical_align: Align::End,
        ..Default::default()
      });
    }

    let label_size = (plot.height() / slots * 0.35).clamp(10.0, 22.0) as f32;
    for bar in &frame.bars {
      let rank = bar.rank as f64;
      let shape = Rect::new(0.0, rank + 0.1, bar.value, rank + 0.9).abs();
      render.fill(&shape, transform, bar.color);

      let end = transform * Point::new(bar.value, rank + 0.5);
      render.draw_text(DrawText {
        text: &bar.name,
        size: label_size,
        weight: FontWeight::BOLD,
        position: end + Vec2::new(8.0, 0.0),
        vertical_align: Align::Center,
        ..Default::default()
      });
      render.draw_text(DrawText {
        text: &format::thousands(bar.value, 0),
        size: label_size,
        brush: Brush::Solid(Color::WHITE),
        position: end - Vec2::new(8.0, 0.0),
        horizontal_align: Align::End,
        vertical_align: Align::Center,
        ..Default::default()
      });
    }

    let zero = (transform * Point::new(0.0, 0.0)).x;
    render.stroke(
      &Line::new((zero, plot.y0), (zero, plot.y1)),
      Affine::IDENTITY,
      theme::AXIS,
      &Stroke::new(2.0),
    );

    let corner = Point::new(plot.x1, plot.y1 - 8.0);
    super::draw_period(render, corner, frame.period);
    self.legend.draw(
      render,
      corner - Vec2::new(0.0, f64::from(super::PERIOD_SIZE) + 16.0),
      Corner::BottomRight,
    );
  }
}

impl Animation for BarRace {
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
