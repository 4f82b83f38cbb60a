use serde::{Deserialize, Serialize};

use crate::{
    core::record::{EnergyType, UsageRecord},
    quantity::emission::{KilotonnesCo2, TonnesCo2},
};

/// Linear conversion factors from energy usage to tCO₂-equivalent.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionCoefficients {
    pub electricity: f64,
    pub gas: f64,
}

impl EmissionCoefficients {
    /// Coefficients used by the dashboards and the forecast scenario.
    pub const STANDARD: Self = Self { electricity: 0.4541, gas: 0.202 };

    /// Coefficients used by the regional emission statistics table.
    pub const STATISTICS_TABLE: Self = Self { electricity: 0.4541, gas: 0.204 };

    pub fn to_emissions(self, electricity: f64, gas: f64) -> TonnesCo2 {
        TonnesCo2(electricity.mul_add(self.electricity, gas * self.gas))
    }

    #[must_use]
    pub const fn coefficient(self, energy_type: EnergyType) -> f64 {
        match energy_type {
            EnergyType::Electricity => self.electricity,
            EnergyType::Gas => self.gas,
        }
    }

    pub fn for_energy(self, energy_type: EnergyType, usage: f64) -> TonnesCo2 {
        TonnesCo2(usage * self.coefficient(energy_type))
    }
}

/// Nationwide emissions per calendar month of a single year.
#[must_use]
pub struct NationalEmissions {
    pub electricity: [KilotonnesCo2; 12],
    pub gas: [KilotonnesCo2; 12],
}

impl NationalEmissions {
    /// Sum the national usage per month of `year` and convert it into emissions.
    ///
    /// Records from other years are skipped, months without records stay at zero.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a UsageRecord>,
        year: u16,
        coefficients: EmissionCoefficients,
    ) -> Self {
        let mut electricity = [0.0; 12];
        let mut gas = [0.0; 12];
        for record in records.into_iter().filter(|record| record.year_month.year() == year) {
            let index = record.year_month.month_index();
            electricity[index] += record.electricity;
            gas[index] += record.gas;
        }
        Self {
            electricity: electricity.map(|usage| {
                coefficients.for_energy(EnergyType::Electricity, usage).into()
            }),
            gas: gas.map(|usage| coefficients.for_energy(EnergyType::Gas, usage).into()),
        }
    }
}
