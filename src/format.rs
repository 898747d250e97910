/// Formats `value` with `decimals` places and a comma between thousands, like `{:,.0f}`.
pub fn thousands(value: f64, decimals: usize) -> String {
  let text = format!("{:.*}", decimals, value.abs());
  let (int, frac) = match text.split_once('.') {
    Some((int, frac)) => (int, Some(frac)),
    None => (text.as_str(), None),
  };

  let mut out = String::with_capacity(text.len() + int.len() / 3 + 1);
  // Rounding can turn a tiny negative into "0", which shouldn't get a sign.
  if value.is_sign_negative() && text.bytes().any(|b| matches!(b, b'1'..=b'9')) {
    out.push('-');
  }
  for (i, c) in int.chars().enumerate() {
    if i > 0 && (int.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  if let Some(frac) = frac {
    out.push('.');
    out.push_str(frac);
  }
  out
}

/// Labels a point in time: whole numbers print without decimals (`2020`), others with two.
pub fn period(t: f64) -> String {
  if t.fract() == 0.0 { format!("{t:.0}") } else { format!("{t:.2}") }
}

/// Turns a field name like `continent` or `market_share` into a heading: `Continent`, `Market Share`.
pub fn title_case(field: &str) -> String {
  field
    .split(['_', ' '])
    .filter(|word| !word.is_empty())
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}
