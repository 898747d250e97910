use kurbo::{Affine, Point, Rect, RoundedRect, Size, Stroke, Vec2};
use parley::FontWeight;
use peniko::{Brush, Color};

use crate::{
  render::{Align, DrawText, Render},
  theme::{self, GroupColors},
};

pub struct Legend {
  title: Option<String>,
  items: Vec<LegendItem>,
}

pub struct LegendItem {
  label: String,
  color: Color,
}

/// Which corner of the legend box sits on the anchor point.
#[derive(Clone, Copy)]
pub enum Corner {
  TopLeft,
  BottomRight,
}

impl Legend {
  pub fn for_groups(title: Option<&str>, colors: &GroupColors) -> Self {
    Legend {
      title: title.map(str::to_string),
      items: colors
        .iter()
        .map(|(label, color)| LegendItem { label: label.to_string(), color })
        .collect(),
    }
  }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub(crate) fn draw(&self, render: &mut Render, anchor: Point, corner: Corner) {
    if self.is_empty() {
      return;
    }

    const PADDING: f64 = 12.0;
    const FONT_SIZE: f32 = 18.0;
    const LINE_HEIGHT: f64 = 26.0;
    const SWATCH: f64 = 16.0;
    const SWATCH_GAP: f64 = 10.0;

    let title = self.title.as_deref().map(|title| {
      let text = DrawText {
        text: title,
        size: FONT_SIZE,
        weight: FontWeight::BOLD,
        vertical_align: Align::Center,
        ..Default::default()
      };
      (render.layout_text(&text), text)
    });

    let mut inner_width = title.as_ref().map_or(0.0, |(layout, _)| f64::from(layout.width()));
    let mut layouts = vec![];
    for item in &self.items {
      let text = DrawText {
        text: &item.label,
        size: FONT_SIZE,
        vertical_align: Align::Center,
        ..Default::default()
      };
      let layout = render.layout_text(&text);
      inner_width = inner_width.max(SWATCH + SWATCH_GAP + f64::from(layout.width()));
      layouts.push((layout, text));
    }

    let lines = layouts.len() + usize::from(title.is_some());
    let size = Size::new(inner_width + PADDING * 2.0, lines as f64 * LINE_HEIGHT + PADDING * 2.0);
    let origin = match corner {
      Corner::TopLeft => anchor,
      Corner::BottomRight => anchor - size.to_vec2(),
    };
    let rect = Rect::from_origin_size(origin, size);

    let background = RoundedRect::from_rect(rect, 5.0);
    render.fill(
      &background,
      Affine::IDENTITY,
      &Brush::Solid(Color::from_rgba8(255, 255, 255, 200)),
    );
    render.stroke(&background, Affine::IDENTITY, &Brush::Solid(theme::GRID), &Stroke::new(1.5));

    let mut line = 0;
    let mut next_line = || {
      let y = rect.y0 + PADDING + line as f64 * LINE_HEIGHT + LINE_HEIGHT / 2.0;
      line += 1;
      Point::new(rect.x0 + PADDING, y)
    };

    if let Some((layout, mut text)) = title {
      text.position = next_line();
      render.draw_text_layout(layout, text);
    }

    for (item, (layout, mut text)) in self.items.iter().zip(layouts) {
      let pos = next_line();

      let swatch =
        Rect::from_origin_size(pos - Vec2::new(0.0, SWATCH / 2.0), Size::new(SWATCH, SWATCH));
      render.fill(&swatch, Affine::IDENTITY, item.color);

      text.position = pos + Vec2::new(SWATCH + SWATCH_GAP, 0.0);
      render.draw_text_layout(layout, text);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_item_per_group() {
    let colors = GroupColors::assign(["Asia", "Africa"]);
    let legend = Legend::for_groups(Some("Continent"), &colors);

    assert_eq!(legend.items.len(), 2);
    assert_eq!(legend.items[1].label, "Africa");
    assert_eq!(legend.title.as_deref(), Some("Continent"));
    assert!(Legend::for_groups(None, &GroupColors::default()).is_empty());
  }
}
