use clap::Parser;
use tokio::try_join;

use crate::{
    api::Api,
    cli::RegionArgs,
    core::{
        comparison::{Comparison, ComparisonData, Metric},
        record::EnergyType,
        region::Region,
    },
    prelude::*,
    settings::Settings,
    tables::build_chart_table,
};

#[derive(Parser)]
pub struct CompareArgs {
    #[clap(flatten)]
    pub region: RegionArgs,

    #[clap(long, value_enum, default_value = "usage")]
    pub metric: Metric,

    #[clap(long = "energy", value_enum, default_value = "electricity")]
    pub energy_type: EnergyType,
}

#[instrument(skip_all, fields(region = %args.region.region()))]
pub async fn compare(args: &CompareArgs, api: &Api, settings: &Settings) -> Result {
    let region = args.region.region();
    let data = match region {
        Region::Nation => ComparisonData {
            national: api.get_national_energy(None).await?,
            ..ComparisonData::default()
        },
        Region::City { city } => {
            let (national, city) =
                try_join!(api.get_national_energy(None), api.get_energy(Region::City { city }))?;
            ComparisonData { national, city, county: Vec::new() }
        }
        Region::County { city, .. } => {
            let (city, county) =
                try_join!(api.get_energy(Region::City { city }), api.get_energy(region))?;
            ComparisonData { city, county, ..ComparisonData::default() }
        }
    };

    let chart = Comparison::builder()
        .metric(args.metric)
        .energy_type(args.energy_type)
        .coefficients(settings.coefficients.standard)
        .region_count(settings.region_count)
        .months(settings.history_since..=settings.actual_until)
        .build()
        .chart(region, &data);
    println!("{}", build_chart_table(&chart));
    Ok(())
}
