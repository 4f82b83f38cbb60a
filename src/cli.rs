mod compare;
mod emissions;
mod forecast;
mod scenario;
mod stats;

use std::path::PathBuf;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{
    compare::{CompareArgs, compare},
    emissions::{EmissionsArgs, emissions},
    forecast::{ForecastArgs, forecast},
    scenario::{ScenarioArgs, scenario},
    stats::{StatsArgs, stats},
};
use crate::{
    api::{self, record::Strictness},
    core::region::Region,
    prelude::*,
    settings::Settings,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub api: ApiArgs,

    /// Settings file, defaults are used when it does not exist.
    #[clap(long = "settings", env = "NSE_SETTINGS", default_value = "nse.toml")]
    pub settings_path: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare a region's monthly usage or emissions against its parent average.
    #[clap(name = "compare")]
    Compare(CompareArgs),

    /// Explore the emission forecast under adjusted usage rates.
    #[clap(name = "scenario")]
    Scenario(ScenarioArgs),

    /// District-by-month statistics of a city.
    #[clap(name = "stats")]
    Stats(StatsArgs),

    /// Nationwide monthly emissions of a year.
    #[clap(name = "emissions")]
    Emissions(EmissionsArgs),

    /// Forecasted usage of a region.
    #[clap(name = "forecast")]
    Forecast(ForecastArgs),
}

#[derive(Parser)]
pub struct ApiArgs {
    /// Backend base URL, the `/api` suffix is optional.
    #[clap(long = "api-base-url", env = "NSE_API_BASE_URL", default_value = "http://localhost:8080/api")]
    pub base_url: Url,

    /// Reject malformed numbers in the responses instead of treating them as zero.
    #[clap(long, env = "NSE_STRICT")]
    pub strict: bool,
}

impl ApiArgs {
    pub fn new_client(&self, settings: &Settings) -> Result<api::Api> {
        api::Api::new(&self.base_url, Strictness::from(self.strict || settings.strict))
    }
}

#[derive(Copy, Clone, Parser)]
pub struct RegionArgs {
    /// City (province) code, for example `11` or `11000`. Omit for nationwide data.
    #[clap(long = "city", env = "NSE_CITY_ID")]
    pub city: Option<u32>,

    /// County (district) code, for example `11140`.
    #[clap(long = "county", env = "NSE_COUNTY_ID")]
    pub county: Option<u32>,
}

impl RegionArgs {
    pub fn region(self) -> Region {
        Region::new(self.city, self.county)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct YearArgs {
    /// Calendar year, defaults to the current one.
    #[clap(long)]
    pub year: Option<u16>,
}

impl YearArgs {
    pub fn year(self) -> Result<u16> {
        match self.year {
            Some(year) => Ok(year),
            None => Ok(u16::try_from(Local::now().year())?),
        }
    }
}
