use vizu::{BarChartRaceOptions, Vizu};

fn main() -> vizu::Result<()> {
  env_logger::init();

  let vizu = Vizu::from_csv("demos/data/cities.csv")?;
  vizu
    .bar_chart_race("city", "continent", 1980, 2020)
    .options(BarChartRaceOptions {
      title: "Cities, from CSV".to_string(),
      top_n: 6,
      steps_per_period: 4,
      fps: 12,
      ..Default::default()
    })
    .save("demos/files/csv_race.gif")?;

  Ok(())
}
