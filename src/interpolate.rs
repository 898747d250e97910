//! Frame timelines and per-entity linear interpolation.

/// Sorts and deduplicates keyframe times, dropping non-finite values.
pub fn keyframes(times: impl IntoIterator<Item = f64>) -> Vec<f64> {
  let mut keys = times.into_iter().filter(|t| t.is_finite()).collect::<Vec<_>>();
  keys.sort_by(f64::total_cmp);
  keys.dedup();
  keys
}

/// Subdivides each interval between consecutive keyframes into `steps_per_period` equal steps.
///
/// The result always starts at the first key and ends at the last one, and has
/// `(keys.len() - 1) * steps_per_period + 1` samples. An empty `keys` gives no samples.
pub fn frame_times(keys: &[f64], steps_per_period: u32) -> Vec<f64> {
  let steps = steps_per_period.max(1);
  let Some(&last) = keys.last() else { return vec![] };

  let mut times = Vec::with_capacity((keys.len() - 1) * steps as usize + 1);
  for pair in keys.windows(2) {
    let (a, b) = (pair[0], pair[1]);
    for i in 0..steps {
      times.push(a + (b - a) * f64::from(i) / f64::from(steps));
    }
  }
  times.push(last);
  times
}

/// The latest keyframe at or before `t`, or the first keyframe if `t` precedes all of them.
pub fn period_of(keys: &[f64], t: f64) -> Option<f64> {
  // Interpolated samples can land a hair below a key.
  const EPSILON: f64 = 1e-9;

  match keys.partition_point(|&k| k <= t + EPSILON) {
    0 => keys.first().copied(),
    i => Some(keys[i - 1]),
  }
}

/// Evaluates the piecewise-linear curve through `observed` at every time in `at`.
///
/// Samples outside the observed span hold the nearest observed value. If two observations share a
/// time, the later one in `observed` wins. Returns `None` when nothing was observed.
pub fn interpolate_linear(observed: &[(f64, f64)], at: &[f64]) -> Option<Vec<f64>> {
  let mut points =
    observed.iter().copied().filter(|(t, v)| t.is_finite() && v.is_finite()).collect::<Vec<_>>();
  if points.is_empty() {
    return None;
  }

  // Stable sort keeps insertion order among equal times, so the last duplicate survives.
  points.sort_by(|a, b| a.0.total_cmp(&b.0));
  let mut deduped: Vec<(f64, f64)> = Vec::with_capacity(points.len());
  for p in points {
    match deduped.last_mut() {
      Some(last) if last.0 == p.0 => *last = p,
      _ => deduped.push(p),
    }
  }

  let first = deduped[0];
  let last = deduped[deduped.len() - 1];

  Some(
    at.iter()
      .map(|&t| {
        if t <= first.0 {
          return first.1;
        }
        if t >= last.0 {
          return last.1;
        }

        let i = deduped.partition_point(|p| p.0 <= t);
        let (t0, v0) = deduped[i - 1];
        let (t1, v1) = deduped[i];
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
      })
      .collect(),
  )
}
