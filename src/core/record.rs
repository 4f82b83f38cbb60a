use std::{
    fmt::{Display, Formatter},
    ops::RangeInclusive,
};

use bon::Builder;

use crate::{
    core::{emission::EmissionCoefficients, year_month::YearMonth},
    quantity::emission::TonnesCo2,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum EnergyType {
    Electricity,
    Gas,
}

impl Display for EnergyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Electricity => write!(f, "electricity"),
            Self::Gas => write!(f, "gas"),
        }
    }
}

/// Monthly usage of one region, either measured or forecasted.
///
/// Endpoints name the usage fields differently, the record does not care.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Builder)]
pub struct UsageRecord {
    #[builder(default)]
    pub city_id: u32,

    #[builder(default)]
    pub county_id: u32,

    pub year_month: YearMonth,

    #[builder(default)]
    pub electricity: f64,

    #[builder(default)]
    pub gas: f64,
}

impl UsageRecord {
    #[must_use]
    pub const fn usage(&self, energy_type: EnergyType) -> f64 {
        match energy_type {
            EnergyType::Electricity => self.electricity,
            EnergyType::Gas => self.gas,
        }
    }

    pub fn emissions(&self, coefficients: EmissionCoefficients) -> TonnesCo2 {
        coefficients.to_emissions(self.electricity, self.gas)
    }

    #[must_use]
    pub fn is_within(&self, months: &RangeInclusive<YearMonth>) -> bool {
        months.contains(&self.year_month)
    }
}
