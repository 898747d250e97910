use std::collections::HashMap;

use color::{HueDirection, Oklch, OpaqueColor, Srgb};
use peniko::Color;

pub const BACKGROUND: Color = Color::WHITE;
pub const TEXT: Color = Color::from_rgb8(32, 32, 32);
pub const MUTED: Color = Color::from_rgb8(119, 119, 119);
pub const AXIS: Color = Color::from_rgb8(128, 128, 128);
pub const GRID: Color = Color::from_rgb8(221, 221, 221);

pub struct LinearPalette {
  start: OpaqueColor<Oklch>,
  end:   OpaqueColor<Oklch>,
}

/// Sweeps most of the hue wheel at a fixed lightness, so neighbouring groups stay distinguishable.
pub const GROUPS: LinearPalette =
  LinearPalette::new(OpaqueColor::new([0.68, 0.15, 25.0]), OpaqueColor::new([0.68, 0.15, 325.0]));

impl LinearPalette {
  pub const fn new(start: OpaqueColor<Oklch>, end: OpaqueColor<Oklch>) -> Self {
    Self { start, end }
  }

  pub fn sample(&self, t: f32) -> OpaqueColor<Oklch> {
    let t = t.clamp(0.0, 1.0);
    self.start.lerp(self.end, t, HueDirection::Increasing)
  }

  pub fn sample_color(&self, t: f32) -> Color { self.sample(t).convert::<Srgb>().with_alpha(1.0) }
}

/// Colour per group, spread evenly over [`GROUPS`] in the given order.
#[derive(Clone, Default)]
pub struct GroupColors {
  order:  Vec<String>,
  colors: HashMap<String, Color>,
}

impl GroupColors {
  pub fn assign(groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
    let mut order = Vec::<String>::new();
    for group in groups {
      let group = group.into();
      if !order.contains(&group) {
        order.push(group);
      }
    }

    let span = order.len().saturating_sub(1).max(1) as f32;
    let colors = order
      .iter()
      .enumerate()
      .map(|(i, g)| (g.clone(), GROUPS.sample_color(i as f32 / span)))
      .collect();

    GroupColors { order, colors }
  }

  pub fn get(&self, group: &str) -> Color { self.colors.get(group).copied().unwrap_or(AXIS) }

  pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> + '_ {
    self.order.iter().map(|g| (g.as_str(), self.get(g)))
  }

  pub fn len(&self) -> usize { self.order.len() }
  pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn assignment_is_deterministic() {
    let a = GroupColors::assign(["Asia", "Africa", "Asia", "Europe"]);
    let b = GroupColors::assign(["Asia", "Africa", "Europe"]);

    assert_eq!(a.len(), 3);
    for (group, color) in a.iter() {
      assert_eq!(color.to_rgba8().to_u8_array(), b.get(group).to_rgba8().to_u8_array());
    }
    assert_eq!(a.iter().map(|(g, _)| g).collect::<Vec<_>>(), vec!["Asia", "Africa", "Europe"]);
  }

  #[test]
  fn groups_get_distinct_colors() {
    let colors = GroupColors::assign(["a", "b", "c", "d"]);
    let rgba = colors.iter().map(|(_, c)| c.to_rgba8().to_u8_array()).collect::<Vec<_>>();
    for (i, c) in rgba.iter().enumerate() {
      assert!(!rgba[i + 1..].contains(c));
    }
  }

  #[test]
  fn unknown_group_falls_back() {
    let colors = GroupColors::assign(["a"]);
    assert_eq!(colors.get("zzz").to_rgba8().to_u8_array(), AXIS.to_rgba8().to_u8_array());
  }
}
