use clap::Parser;

use crate::{
    api::Api,
    cli::RegionArgs,
    core::{
        aggregate::{Reducer, aggregate_by_month},
        record::EnergyType,
        series::Chart,
    },
    prelude::*,
    settings::Settings,
    tables::build_chart_table,
};

#[derive(Parser)]
pub struct ForecastArgs {
    #[clap(flatten)]
    pub region: RegionArgs,

    #[clap(long = "energy", value_enum, default_value = "electricity")]
    pub energy_type: EnergyType,
}

#[instrument(skip_all, fields(region = %args.region.region()))]
pub async fn forecast(args: &ForecastArgs, api: &Api, settings: &Settings) -> Result {
    let records = api.get_predicted_energy(args.region.region()).await?;
    let predicted = aggregate_by_month(
        records.iter().filter(|record| record.year_month >= settings.forecast_since),
        |record| record.usage(args.energy_type),
        Reducer::Sum,
    );
    let chart = Chart::new(predicted.keys().copied().collect())
        .with_series(format!("predicted {}", args.energy_type), &predicted);
    println!("{}", build_chart_table(&chart));
    Ok(())
}
