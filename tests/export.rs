//! End-to-end exports. These need a wgpu adapter, so they only run with `--ignored`.

use polars::prelude::*;
use vizu::Vizu;

fn cities() -> Vizu {
  Vizu::new(
    df! {
      "city"      => ["Tokyo", "Delhi", "Shanghai", "Cairo"],
      "continent" => ["Asia", "Asia", "Asia", "Africa"],
      "1980"      => [28557, 10093, 11487, 8820],
      "2000"      => [34450, 15727, 16654, 12431],
    }
    .unwrap(),
  )
  .unwrap()
}

#[test]
#[ignore = "needs a GPU adapter"]
fn bar_chart_race_gif() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("race.gif");

  let frames = cities()
    .bar_chart_race("city", "continent", 1980, 2000)
    .title("Cities")
    .size(640, 360)
    .save(&path)
    .unwrap();

  assert_eq!(frames, 21);
  assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
#[ignore = "needs a GPU adapter"]
fn animated_scatter_gif() {
  let df = df! {
    "year"    => [2010, 2020, 2010, 2020],
    "company" => ["Alpha", "Alpha", "Beta", "Beta"],
    "sector"  => ["Software", "Software", "Hardware", "Hardware"],
    "share"   => [10.0, 25.0, 30.0, 22.0],
    "score"   => [70.0, 85.0, 90.0, 80.0],
  }
  .unwrap();

  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("scatter.gif");

  let frames = Vizu::new(df)
    .unwrap()
    .animated_scatter("year", "share", "score", "company", "sector")
    .steps_per_period(3)
    .size(480, 400)
    .save(&path)
    .unwrap();

  assert_eq!(frames, 4);
  assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
