use polars::prelude::*;
use vizu::Vizu;

fn main() -> vizu::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let df = df! {
    "city"      => ["Tokyo", "Delhi", "Shanghai", "São Paulo", "Mumbai", "Mexico City", "Beijing", "Osaka", "Cairo", "New York", "Dhaka", "Karachi"],
    "continent" => ["Asia", "Asia", "Asia", "South America", "Asia", "North America", "Asia", "Asia", "Africa", "North America", "Asia", "Asia"],
    "1980"      => [28557, 10093, 11487, 12093, 9926, 13994, 9225, 16946, 8820, 15600, 4220, 5131],
    "1990"      => [32530, 12316, 13349, 14776, 12440, 15309, 10862, 18389, 10645, 16079, 6621, 7185],
    "2000"      => [34450, 15727, 16654, 17015, 16434, 17409, 13619, 18768, 12431, 17890, 10249, 10031],
    "2010"      => [36830, 21935, 20218, 19672, 18414, 19320, 16760, 19325, 16845, 19416, 14543, 13205],
    "2020"      => [37393, 29399, 26317, 21846, 20185, 21782, 20035, 19222, 20484, 20140, 20283, 16093],
  }?;

  let vizu = Vizu::new(df)?;
  vizu
    .bar_chart_race("city", "continent", 1980, 2020)
    .title("Top 10 Most Populous Cities")
    .steps_per_period(2)
    .save("demos/files/city_population_race.gif")?;

  Ok(())
}
