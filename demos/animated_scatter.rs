use polars::prelude::*;
use vizu::Vizu;

fn main() -> vizu::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let df = df! {
    "year"         => [2010, 2015, 2020, 2010, 2015, 2020, 2010, 2015, 2020, 2010, 2015, 2020],
    "company"      => ["Alpha", "Alpha", "Alpha", "Beta", "Beta", "Beta", "Gamma", "Gamma", "Gamma", "Delta", "Delta", "Delta"],
    "sector"       => ["Software", "Software", "Software", "Hardware", "Hardware", "Hardware", "Cloud", "Cloud", "Cloud", "Hardware", "Hardware", "Hardware"],
    "market_share" => [10, 15, 25, 30, 25, 22, 5, 15, 30, 20, 18, 15],
    "satisfaction" => [70, 75, 85, 90, 82, 80, 60, 80, 92, 85, 80, 75],
    "revenue"      => [500, 1200, 3000, 4000, 3500, 3200, 200, 1500, 4000, 2500, 2200, 1800],
  }?;

  let vizu = Vizu::new(df)?;
  vizu
    .animated_scatter("year", "market_share", "satisfaction", "company", "sector")
    .size_field("revenue")
    .size_scale(0.1)
    .title("Tech Company Growth (2010-2020)")
    .x_label("Market Share (%)")
    .y_label("Customer Satisfaction")
    .save("demos/files/tech_growth_scatter.gif")?;

  Ok(())
}
