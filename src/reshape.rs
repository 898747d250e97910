//! Wide-to-long reshaping and the dense per-frame table the charts draw from.

use std::collections::HashMap;

use polars::prelude::*;

use crate::{
  ResultExt,
  error::{Result, VizuError},
  interpolate::{frame_times, interpolate_linear, period_of},
};

pub const NAME: &str = "name";
pub const GROUP: &str = "group";
pub const TIME: &str = "time";
pub const VALUE: &str = "value";
pub const FRAME: &str = "frame";
pub const ROW: &str = "row";

/// Columns whose name is a run of ASCII digits, paired with their time and sorted by it.
pub fn time_columns(df: &DataFrame) -> Vec<(String, f64)> {
  let mut columns = df
    .get_column_names()
    .into_iter()
    .map(|name| name.as_str())
    .filter(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))
    .filter_map(|name| Some((name.to_string(), name.parse::<f64>().ok()?)))
    .collect::<Vec<_>>();
  columns.sort_by(|a, b| a.1.total_cmp(&b.1));
  columns
}

/// Melts every time column of `df` into `(name, group, row, time, value)` rows.
///
/// The output has `df.height() * time_columns(df).len()` rows, ordered by input row and then by
/// time. `row` is the index of the source row. Missing cells become null values.
pub fn wide_to_long(df: &DataFrame, name_field: &str, group_field: &str) -> Result<DataFrame> {
  let names = strings(column(df, name_field)?)?;
  let groups = strings(column(df, group_field)?)?;

  let periods = time_columns(df);
  if periods.is_empty() {
    return Err(VizuError::NoTimeColumns);
  }

  let values = periods
    .iter()
    .map(|(name, _)| floats(column(df, name)?))
    .collect::<Result<Vec<_>>>()?;

  let len = df.height() * periods.len();
  let mut out_names = Vec::with_capacity(len);
  let mut out_groups = Vec::with_capacity(len);
  let mut out_rows = Vec::with_capacity(len);
  let mut out_times = Vec::with_capacity(len);
  let mut out_values = Vec::with_capacity(len);

  for row in 0..df.height() {
    for (p, (_, time)) in periods.iter().enumerate() {
      out_names.push(names[row].clone());
      out_groups.push(groups[row].clone());
      out_rows.push(row as u32);
      out_times.push(*time);
      out_values.push(values[p][row]);
    }
  }

  Ok(DataFrame::new(vec![
    Column::new(NAME.into(), out_names),
    Column::new(GROUP.into(), out_groups),
    Column::new(ROW.into(), out_rows),
    Column::new(TIME.into(), out_times),
    Column::new(VALUE.into(), out_values),
  ])?)
}

/// Which columns of a long frame identify entities and time.
#[derive(Clone, Copy)]
pub struct LongFields<'a> {
  pub name:  &'a str,
  pub group: &'a str,
  pub time:  &'a str,
  /// Splits entities that share a name and group, such as the source rows of a melted frame.
  pub row:   Option<&'a str>,
}

/// A measured column of a long frame and the name it gets in the frame table.
#[derive(Clone, Copy)]
pub struct Measure<'a> {
  pub source: &'a str,
  pub output: &'a str,
}

/// One row per (entity, frame), with every measure interpolated. Never contains nulls.
pub struct FrameTable {
  df:    DataFrame,
  keys:  Vec<f64>,
  times: Vec<f64>,
}

struct Entity {
  name:         String,
  group:        String,
  observations: Vec<Vec<(f64, f64)>>,
}

impl FrameTable {
  /// Interpolates each entity of `long` over the frames between `keys`.
  ///
  /// Entities are keyed by (name, group, row) in first-seen order. An entity with no observation
  /// for some measure is dropped.
  pub fn build(
    long: &DataFrame,
    fields: LongFields,
    measures: &[Measure],
    keys: Vec<f64>,
    steps_per_period: u32,
  ) -> Result<FrameTable> {
    let names = strings(column(long, fields.name)?)?;
    let groups = strings(column(long, fields.group)?)?;
    let times = floats(column(long, fields.time)?)?;
    let rows = match fields.row {
      Some(row) => floats(column(long, row)?)?,
      None => vec![None; long.height()],
    };
    let values =
      measures.iter().map(|m| floats(column(long, m.source)?)).collect::<Result<Vec<_>>>()?;

    let mut index = HashMap::<(String, String, Option<u64>), usize>::new();
    let mut entities = Vec::<Entity>::new();
    for row in 0..long.height() {
      let key = (names[row].clone(), groups[row].clone(), rows[row].map(|r| r as u64));
      let i = *index.entry(key).or_insert_with(|| {
        entities.push(Entity {
          name:         names[row].clone(),
          group:        groups[row].clone(),
          observations: vec![vec![]; measures.len()],
        });
        entities.len() - 1
      });

      let Some(t) = times[row]
        .ok_or_else(|| format!("skipping row {row}: no `{}` value", fields.time))
        .log_err()
      else {
        continue;
      };
      for (m, column) in values.iter().enumerate() {
        if let Some(v) = column[row] {
          entities[i].observations[m].push((t, v));
        }
      }
    }

    let samples = frame_times(&keys, steps_per_period);
    let len = entities.len() * samples.len();
    let mut out_names = Vec::with_capacity(len);
    let mut out_groups = Vec::with_capacity(len);
    let mut out_frames = Vec::with_capacity(len);
    let mut out_times = Vec::with_capacity(len);
    let mut out_values = vec![Vec::with_capacity(len); measures.len()];

    'entities: for entity in &entities {
      let mut curves = Vec::with_capacity(measures.len());
      for (m, observed) in entity.observations.iter().enumerate() {
        let Some(curve) = interpolate_linear(observed, &samples) else {
          log::warn!(
            "dropping `{}` ({}): no values for `{}`",
            entity.name,
            entity.group,
            measures[m].source
          );
          continue 'entities;
        };
        curves.push(curve);
      }

      for (frame, &t) in samples.iter().enumerate() {
        out_names.push(entity.name.clone());
        out_groups.push(entity.group.clone());
        out_frames.push(frame as u32);
        out_times.push(t);
        for (m, curve) in curves.iter().enumerate() {
          out_values[m].push(curve[frame]);
        }
      }
    }

    let mut columns = vec![
      Column::new(NAME.into(), out_names),
      Column::new(GROUP.into(), out_groups),
      Column::new(FRAME.into(), out_frames),
      Column::new(TIME.into(), out_times),
    ];
    for (measure, values) in measures.iter().zip(out_values) {
      columns.push(Column::new(measure.output.into(), values));
    }

    Ok(FrameTable { df: DataFrame::new(columns)?, keys, times: samples })
  }

  pub fn data(&self) -> &DataFrame { &self.df }
  pub fn frame_count(&self) -> usize { self.times.len() }

  pub fn time(&self, frame: usize) -> Result<f64> {
    self
      .times
      .get(frame)
      .copied()
      .ok_or(VizuError::FrameOutOfRange { index: frame, count: self.times.len() })
  }

  /// The keyframe a frame belongs to, for labelling.
  pub fn period(&self, frame: usize) -> Result<f64> {
    let t = self.time(frame)?;
    Ok(period_of(&self.keys, t).unwrap_or(t))
  }

  /// Rows of a single frame, as a lazy query to refine further.
  pub fn frame(&self, frame: usize) -> LazyFrame {
    self.df.clone().lazy().filter(col(FRAME).eq(lit(frame as u32)))
  }

  /// Distinct groups in first-seen order.
  pub fn groups(&self) -> Result<Vec<String>> {
    strings(&self.df.column(GROUP)?.unique_stable()?)
  }
}

pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
  df.column(name).map_err(|_| VizuError::MissingColumn(name.to_string()))
}

pub(crate) fn strings(column: &Column) -> Result<Vec<String>> {
  let cast = column.cast(&DataType::String)?;
  Ok(
    cast
      .as_materialized_series()
      .str()?
      .into_iter()
      .map(|v| v.unwrap_or_default().to_string())
      .collect(),
  )
}

pub(crate) fn floats(column: &Column) -> Result<Vec<Option<f64>>> {
  let cast = column.cast(&DataType::Float64)?;
  Ok(cast.as_materialized_series().f64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cities() -> DataFrame {
    df! {
      "city"      => ["Tokyo", "Delhi", "Cairo"],
      "continent" => ["Asia", "Asia", "Africa"],
      "1990"      => [Some(32530.0), Some(12316.0), None],
      "1980"      => [28557.0, 10093.0, 8820.0],
      "2000"      => [34450.0, 15727.0, 12431.0],
    }
    .unwrap()
  }

  #[test]
  fn detects_time_columns() {
    let columns = time_columns(&cities());
    assert_eq!(
      columns,
      vec![("1980".to_string(), 1980.0), ("1990".to_string(), 1990.0), ("2000".to_string(), 2000.0)]
    );
  }

  #[test]
  fn wide_to_long_preserves_cells() {
    let df = cities();
    let long = wide_to_long(&df, "city", "continent").unwrap();
    assert_eq!(long.height(), df.height() * 3);
    let columns = long.get_column_names().into_iter().map(|c| c.as_str()).collect::<Vec<_>>();
    assert_eq!(columns, vec![NAME, GROUP, ROW, TIME, VALUE]);

    let values = floats(long.column(VALUE).unwrap()).unwrap();
    assert_eq!(values[0..3], [Some(28557.0), Some(32530.0), Some(34450.0)]);
    assert_eq!(values[7], None);
  }

  #[test]
  fn wide_to_long_errors() {
    let df = cities();
    assert!(matches!(
      wide_to_long(&df, "country", "continent"),
      Err(VizuError::MissingColumn(c)) if c == "country"
    ));

    let no_times = df! { "city" => ["A"], "continent" => ["B"] }.unwrap();
    assert!(matches!(wide_to_long(&no_times, "city", "continent"), Err(VizuError::NoTimeColumns)));
  }

  #[test]
  fn frame_table_is_dense() {
    let long = wide_to_long(&cities(), "city", "continent").unwrap();
    let table = FrameTable::build(
      &long,
      LongFields { name: NAME, group: GROUP, time: TIME, row: Some(ROW) },
      &[Measure { source: VALUE, output: VALUE }],
      (1980..=2000).map(f64::from).collect(),
      1,
    )
    .unwrap();

    assert_eq!(table.frame_count(), 21);
    assert_eq!(table.data().height(), 3 * 21);
    assert_eq!(table.data().column(VALUE).unwrap().null_count(), 0);
    assert_eq!(table.groups().unwrap(), vec!["Asia", "Africa"]);

    // Cairo's missing 1990 is bridged from 1980 to 2000.
    let cairo = table
      .frame(10)
      .filter(col(NAME).eq(lit("Cairo")))
      .collect()
      .unwrap();
    let value = floats(cairo.column(VALUE).unwrap()).unwrap();
    assert_eq!(value, vec![Some((8820.0 + 12431.0) / 2.0)]);
  }

  #[test]
  fn frame_samples_are_evenly_spaced() {
    let long = wide_to_long(&cities(), "city", "continent").unwrap();
    let table = FrameTable::build(
      &long,
      LongFields { name: NAME, group: GROUP, time: TIME, row: Some(ROW) },
      &[Measure { source: VALUE, output: VALUE }],
      vec![1980.0, 1990.0, 2000.0],
      4,
    )
    .unwrap();

    assert_eq!(table.frame_count(), 9);
    let times = (0..table.frame_count()).map(|f| table.time(f).unwrap()).collect::<Vec<_>>();
    assert!(times.windows(2).all(|w| (w[1] - w[0] - 2.5).abs() < 1e-9));
    assert_eq!(table.period(3).unwrap(), 1980.0);
    assert_eq!(table.period(4).unwrap(), 1990.0);
    assert!(matches!(
      table.period(9),
      Err(VizuError::FrameOutOfRange { index: 9, count: 9 })
    ));
  }

  #[test]
  fn rows_sharing_a_name_stay_apart() {
    let wide = df! {
      "city"  => ["A", "A"],
      "group" => ["x", "x"],
      "1980"  => [1.0, 5.0],
      "1990"  => [2.0, 6.0],
    }
    .unwrap();
    let long = wide_to_long(&wide, "city", "group").unwrap();
    let fields = LongFields { name: NAME, group: GROUP, time: TIME, row: Some(ROW) };
    let measures = [Measure { source: VALUE, output: VALUE }];

    let split = FrameTable::build(&long, fields, &measures, vec![1980.0, 1990.0], 1).unwrap();
    assert_eq!(split.data().height(), 2 * 2);
    let first = split.frame(0).collect().unwrap();
    assert_eq!(floats(first.column(VALUE).unwrap()).unwrap(), vec![Some(1.0), Some(5.0)]);

    let merged = LongFields { row: None, ..fields };
    let table = FrameTable::build(&long, merged, &measures, vec![1980.0, 1990.0], 1).unwrap();
    assert_eq!(table.data().height(), 2);
  }

  #[test]
  fn drops_entities_without_values() {
    let long = df! {
      "name"  => ["A", "A", "B"],
      "group" => ["x", "x", "y"],
      "year"  => [2000, 2010, 2000],
      "v"     => [Some(1.0), Some(2.0), None],
    }
    .unwrap();

    let table = FrameTable::build(
      &long,
      LongFields { name: "name", group: "group", time: "year", row: None },
      &[Measure { source: "v", output: "value" }],
      vec![2000.0, 2010.0],
      2,
    )
    .unwrap();

    assert_eq!(table.data().height(), 3);
    assert_eq!(strings(table.data().column(NAME).unwrap()).unwrap(), vec!["A", "A", "A"]);
  }
}
