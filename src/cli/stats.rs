use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{
    api::Api,
    cli::YearArgs,
    core::{
        comparison::Metric,
        directory::RegionDirectory,
        pivot::{CellValue, RegionTable},
        record::EnergyType,
        region::Region,
    },
    prelude::*,
    settings::Settings,
    tables::build_region_table,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum EnergySelection {
    Electricity,
    Gas,

    /// Both energy types, only meaningful for emissions.
    All,
}

impl EnergySelection {
    const fn energy_type(self) -> Option<EnergyType> {
        match self {
            Self::Electricity => Some(EnergyType::Electricity),
            Self::Gas => Some(EnergyType::Gas),
            Self::All => None,
        }
    }
}

#[derive(Parser)]
pub struct StatsArgs {
    /// City (province) code, for example `11`.
    #[clap(long = "city", env = "NSE_CITY_ID")]
    pub city: u32,

    #[clap(flatten)]
    pub year: YearArgs,

    #[clap(long, value_enum, default_value = "usage")]
    pub metric: Metric,

    #[clap(long, value_enum, default_value = "electricity")]
    pub energy: EnergySelection,

    /// Region directory with the city districts.
    #[clap(long = "regions", env = "NSE_REGIONS", default_value = "data/regions.json")]
    pub regions_path: PathBuf,
}

impl StatsArgs {
    fn cell_value(&self, settings: &Settings) -> Result<CellValue> {
        match (self.metric, self.energy.energy_type()) {
            (Metric::Usage, Some(energy_type)) => Ok(CellValue::Usage(energy_type)),
            (Metric::Usage, None) => bail!("usage of different energy types cannot be summed"),
            (Metric::Emissions, energy_type) => {
                Ok(CellValue::Emissions(energy_type, settings.coefficients.statistics_table))
            }
        }
    }
}

#[instrument(skip_all, fields(city = args.city))]
pub async fn stats(args: &StatsArgs, api: &Api, settings: &Settings) -> Result {
    let cell_value = args.cell_value(settings)?;
    let directory = RegionDirectory::read_from(&args.regions_path)?;
    let region = Region::new(Some(args.city), None);
    let city_code = region.city().context("a non-zero city code is required")?;
    let city = directory.city(city_code)?;
    let year = args.year.year()?;

    let records = api.get_energy(region).await?;
    let table = RegionTable::build(
        city_code,
        city,
        records
            .iter()
            .filter(|record| record.city_id == city_code && record.year_month.year() == year),
        cell_value,
    );
    println!("{}", build_region_table(&table, cell_value.precision()));
    Ok(())
}
