use clap::Parser;

use crate::{
    api::Api,
    cli::YearArgs,
    core::emission::NationalEmissions,
    prelude::*,
    settings::Settings,
    tables::build_national_emissions_table,
};

#[derive(Parser)]
pub struct EmissionsArgs {
    #[clap(flatten)]
    pub year: YearArgs,
}

#[instrument(skip_all)]
pub async fn emissions(args: &EmissionsArgs, api: &Api, settings: &Settings) -> Result {
    let year = args.year.year()?;
    let records = api.get_national_energy(Some(year)).await?;
    let emissions = NationalEmissions::from_records(&records, year, settings.coefficients.standard);
    println!("{}", build_national_emissions_table(&emissions));
    Ok(())
}
