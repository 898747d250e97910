use kurbo::{Affine, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  pub x: Range,
  pub y: Range,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
  pub min: f64,
  pub max: f64,
}

impl Bounds {
  pub const fn new(x: Range, y: Range) -> Self { Bounds { x, y } }

  pub const fn expand_by(self, fract: f64) -> Self {
    Bounds { x: self.x.expand_by(fract), y: self.y.expand_by(fract) }
  }

  /// Maps points in `self` onto `viewport`.
  pub(crate) fn transform_to(&self, viewport: Bounds) -> Affine {
    let scale_x = viewport.x.size() / self.x.size();
    let scale_y = viewport.y.size() / self.y.size();
    let translate_x = viewport.x.min - self.x.min * scale_x;
    let translate_y = viewport.y.min - self.y.min * scale_y;

    Affine::new([scale_x, 0.0, 0.0, scale_y, translate_x, translate_y])
  }

  pub fn contains(&self, point: Point) -> bool {
    self.x.contains(&point.x) && self.y.contains(&point.y)
  }
}

impl Default for Range {
  fn default() -> Self { Range::empty() }
}

impl Range {
  pub const fn empty() -> Self { Range { min: 0.0, max: 0.0 } }
  pub const fn new(min: f64, max: f64) -> Self { Range { min, max } }
  pub const fn size(&self) -> f64 { self.max - self.min }

  /// The span of the finite values, or `None` if there are none.
  pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Range> {
    values
      .into_iter()
      .filter(|v| v.is_finite())
      .fold(None, |acc: Option<Range>, v| match acc {
        None => Some(Range::new(v, v)),
        Some(r) => Some(Range::new(r.min.min(v), r.max.max(v))),
      })
  }

  pub const fn expand(self, amount: f64) -> Self {
    Range {
      min: self.min - amount * self.size().signum(),
      max: self.max + amount * self.size().signum(),
    }
  }

  /// Expands by a fraction of the size. A zero-width range is widened by one unit on each side so
  /// it can still be mapped onto a viewport.
  pub const fn expand_by(self, fract: f64) -> Self {
    if self.size() == 0.0 {
      Range { min: self.min - 1.0, max: self.max + 1.0 }
    } else {
      self.expand(self.size() * fract)
    }
  }

  pub const fn contains(&self, value: &f64) -> bool {
    (*value >= self.min && *value <= self.max) || (*value <= self.min && *value >= self.max)
  }

  pub fn nice_ticks(&self, count: u32) -> NiceTicksIter {
    let step = (self.max - self.min) / f64::from(count);
    if !step.is_finite() || step <= 0.0 {
      return NiceTicksIter::new(self.min, self.min, 1.0, 0);
    }

    let k = step.log10().floor();
    let base = step / 10f64.powf(k);

    let nice_base = match base {
      b if b < 1.0 => 1.0,
      b if b < 2.0 => 2.0,
      b if b < 2.5 => 2.5,
      b if b < 5.0 => 5.0,
      _ => 10.0,
    };

    let step = nice_base * 10f64.powf(k);
    let lo = (self.min / step).floor() * step;
    let hi = (self.max / step).ceil() * step;

    // 2.5 steps need one more digit than their magnitude suggests.
    let decimals = (-k as i32 + i32::from(nice_base == 2.5)).max(0) as usize;
    NiceTicksIter::new(lo, hi, step, decimals)
  }
}

pub struct NiceTicksIter {
  current:  f64,
  step:     f64,
  hi:       f64,
  decimals: usize,
}

impl NiceTicksIter {
  fn new(lo: f64, hi: f64, step: f64, decimals: usize) -> Self {
    NiceTicksIter { current: lo, step, hi, decimals }
  }

  /// Decimal places needed to tell the ticks apart.
  pub fn decimals(&self) -> usize { self.decimals }
}

impl Iterator for NiceTicksIter {
  type Item = f64;
  fn next(&mut self) -> Option<Self::Item> {
    if self.current < self.hi + self.step * 0.5 {
      let p = 10f64.powi(self.decimals as i32 + 3);
      let result = (self.current * p).round() / p;
      self.current += self.step;
      Some(result)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ticks_are_round() {
    let ticks = Range::new(0.0, 37393.0).nice_ticks(5).collect::<Vec<_>>();
    assert_eq!(ticks, vec![0.0, 10000.0, 20000.0, 30000.0, 40000.0]);
    assert_eq!(Range::new(0.0, 37393.0).nice_ticks(5).decimals(), 0);
  }

  #[test]
  fn fractional_ticks() {
    let iter = Range::new(0.0, 1.0).nice_ticks(5);
    assert_eq!(iter.decimals(), 2);
    assert_eq!(iter.collect::<Vec<_>>(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
  }

  #[test]
  fn degenerate_ticks() {
    assert_eq!(Range::new(3.0, 3.0).nice_ticks(5).collect::<Vec<_>>(), vec![3.0]);
  }

  #[test]
  fn range_from_values() {
    assert_eq!(Range::from_values([3.0, f64::NAN, -1.0, 7.5]), Some(Range::new(-1.0, 7.5)));
    assert_eq!(Range::from_values(Vec::<f64>::new()), None);
  }

  #[test]
  fn expand_zero_width() {
    assert_eq!(Range::new(5.0, 5.0).expand_by(0.1), Range::new(4.0, 6.0));
    assert_eq!(Range::new(0.0, 10.0).expand_by(0.1), Range::new(-1.0, 11.0));
  }

  #[test]
  fn transform_flips_y() {
    let data = Bounds::new(Range::new(0.0, 10.0), Range::new(0.0, 100.0));
    let viewport = Bounds::new(Range::new(0.0, 200.0), Range::new(100.0, 0.0));
    let t = data.transform_to(viewport);

    assert_eq!(t * Point::new(0.0, 0.0), Point::new(0.0, 100.0));
    assert_eq!(t * Point::new(10.0, 100.0), Point::new(200.0, 0.0));
  }
}
