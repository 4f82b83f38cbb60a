use std::{collections::BTreeMap, ops::Add};

use bon::bon;

use crate::{
    core::{
        aggregate::MonthlyValues,
        emission::EmissionCoefficients,
        record::UsageRecord,
        series::{Chart, merge_series},
        year_month::YearMonth,
    },
    prelude::*,
    quantity::{emission::TonnesCo2, percent::Percent},
};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EnergyUsage {
    pub electricity: f64,
    pub gas: f64,
}

impl Add for EnergyUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self { electricity: self.electricity + rhs.electricity, gas: self.gas + rhs.gas }
    }
}

pub type MonthlyUsage = BTreeMap<YearMonth, EnergyUsage>;

/// Sum electricity and gas usage per month, for example over all counties of a city.
pub fn monthly_usage<'a>(records: impl IntoIterator<Item = &'a UsageRecord>) -> MonthlyUsage {
    let mut monthly = MonthlyUsage::new();
    for record in records {
        let usage = monthly.entry(record.year_month).or_default();
        *usage = *usage + EnergyUsage { electricity: record.electricity, gas: record.gas };
    }
    monthly
}

/// Usage change rates applied to the forecast, independently per energy type.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Adjustment {
    pub electricity: Percent,
    pub gas: Percent,
}

impl Adjustment {
    pub const MIN: Percent = Percent(-50);
    pub const MAX: Percent = Percent(50);

    pub fn try_new(electricity: Percent, gas: Percent) -> Result<Self> {
        for rate in [electricity, gas] {
            ensure!(
                (Self::MIN..=Self::MAX).contains(&rate),
                "rate {rate} is outside of {}..={}",
                Self::MIN,
                Self::MAX,
            );
        }
        Ok(Self { electricity, gas })
    }

    #[must_use]
    pub fn apply(self, usage: EnergyUsage) -> EnergyUsage {
        EnergyUsage {
            electricity: usage.electricity * self.electricity.to_factor(),
            gas: usage.gas * self.gas.to_factor(),
        }
    }
}

/// Actual history against the baseline and the adjusted forecast.
#[must_use]
pub struct Scenario {
    /// Actual monthly usage, up to and including the boundary month.
    actual: MonthlyUsage,

    predicted: MonthlyUsage,
    adjustment: Adjustment,
    coefficients: EmissionCoefficients,
}

#[bon]
impl Scenario {
    /// Actual records past `actual_until` are dropped, both sides are summed per month.
    #[builder]
    pub fn new(
        actual: &[UsageRecord],
        actual_until: YearMonth,
        predicted: &[UsageRecord],
        #[builder(default)] adjustment: Adjustment,
        #[builder(default = EmissionCoefficients::STANDARD)] coefficients: EmissionCoefficients,
    ) -> Self {
        Self {
            actual: monthly_usage(actual.iter().filter(|record| record.year_month <= actual_until)),
            predicted: monthly_usage(predicted),
            adjustment,
            coefficients,
        }
    }
}

impl Scenario {
    /// The boundary month: last month with actual data.
    #[must_use]
    pub fn last_actual(&self) -> Option<(YearMonth, EnergyUsage)> {
        self.actual.last_key_value().map(|(month, usage)| (*month, *usage))
    }

    #[must_use]
    pub fn n_actual(&self) -> usize {
        self.actual.len()
    }

    #[must_use]
    pub fn n_predicted(&self) -> usize {
        self.predicted.len()
    }

    #[must_use]
    pub fn actual_emissions(&self) -> MonthlyValues {
        self.emissions(&self.actual)
    }

    #[must_use]
    pub fn baseline_emissions(&self) -> MonthlyValues {
        self.emissions(&self.with_boundary(self.predicted.clone()))
    }

    /// Forecast usage with the adjustment applied.
    ///
    /// The boundary month, when missing from the forecast, carries the unadjusted actual usage.
    #[must_use]
    pub fn adjusted_usage(&self) -> MonthlyUsage {
        let adjusted = self
            .predicted
            .iter()
            .map(|(month, usage)| (*month, self.adjustment.apply(*usage)))
            .collect();
        self.with_boundary(adjusted)
    }

    #[must_use]
    pub fn adjusted_emissions(&self) -> MonthlyValues {
        self.emissions(&self.adjusted_usage())
    }

    pub fn chart(&self) -> Chart {
        merge_series(&self.actual_emissions(), &self.baseline_emissions(), &self.adjusted_emissions())
    }

    /// Compare the adjusted forecast against the reduction target of `target_year`.
    ///
    /// The target is the last actual month's emissions reduced by `target_reduction`.
    pub fn summary(&self, target_year: u16, target_reduction: f64) -> ScenarioSummary {
        let adjusted_usage = self.adjusted_usage();
        let adjusted_emissions = self.emissions(&adjusted_usage);
        let actual_emissions = self.actual_emissions();

        let total_predicted: TonnesCo2 = adjusted_emissions.values().copied().map(TonnesCo2).sum();
        let last_actual =
            actual_emissions.values().next_back().copied().map_or(TonnesCo2::ZERO, TonnesCo2);
        let target = last_actual * (1.0 - target_reduction);
        let predicted_in_target_year: TonnesCo2 = adjusted_emissions
            .iter()
            .filter(|(month, _)| month.year() == target_year)
            .map(|(_, emissions)| TonnesCo2(*emissions))
            .sum();
        let achievement = if target > TonnesCo2::ZERO {
            let predicted = if predicted_in_target_year == TonnesCo2::ZERO {
                target
            } else {
                predicted_in_target_year
            };
            target.0 / predicted.0
        } else {
            0.0
        };

        let total_usage =
            adjusted_usage.values().copied().fold(EnergyUsage::default(), |sum, usage| sum + usage);
        let total_energy = total_usage.electricity + total_usage.gas;
        let (electricity_share, gas_share) = if total_energy == 0.0 {
            (0.0, 0.0)
        } else {
            (total_usage.electricity / total_energy, total_usage.gas / total_energy)
        };

        ScenarioSummary {
            total_predicted,
            target_year,
            target,
            predicted_in_target_year,
            delta: predicted_in_target_year - target,
            achievement,
            electricity_share,
            gas_share,
        }
    }

    fn with_boundary(&self, mut predicted: MonthlyUsage) -> MonthlyUsage {
        if let Some((month, usage)) = self.last_actual() {
            predicted.entry(month).or_insert(usage);
        }
        predicted
    }

    fn emissions(&self, usage: &MonthlyUsage) -> MonthlyValues {
        usage
            .iter()
            .map(|(month, usage)| {
                (*month, self.coefficients.to_emissions(usage.electricity, usage.gas).0)
            })
            .collect()
    }
}

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct ScenarioSummary {
    /// Adjusted emissions over the whole forecast period.
    pub total_predicted: TonnesCo2,

    pub target_year: u16,
    pub target: TonnesCo2,
    pub predicted_in_target_year: TonnesCo2,

    /// Positive when the forecast exceeds the target.
    pub delta: TonnesCo2,

    /// Target over predicted emissions, as a proportion.
    pub achievement: f64,

    /// Proportion of electricity in the adjusted forecast usage.
    pub electricity_share: f64,

    pub gas_share: f64,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn month(key: u32) -> YearMonth {
        YearMonth::from_key(key).unwrap()
    }

    fn record(key: u32, electricity: f64, gas: f64) -> UsageRecord {
        UsageRecord::builder().year_month(month(key)).electricity(electricity).gas(gas).build()
    }

    fn scenario(adjustment: Adjustment) -> Scenario {
        let actual = [
            record(202_505, 1000.0, 500.0),
            record(202_506, 1000.0, 500.0),
            record(202_506, 1000.0, 500.0),
            record(202_507, 9999.0, 9999.0),
        ];
        let predicted = [record(202_507, 2000.0, 1000.0), record(203_001, 1000.0, 0.0)];
        Scenario::builder()
            .actual(&actual)
            .actual_until(month(202_506))
            .predicted(&predicted)
            .adjustment(adjustment)
            .build()
    }

    #[test]
    fn test_actual_is_cut_and_summed() {
        let scenario = scenario(Adjustment::default());
        let (boundary, usage) = scenario.last_actual().unwrap();
        assert_eq!(boundary, month(202_506));
        assert_abs_diff_eq!(usage.electricity, 2000.0);
        assert_eq!(scenario.n_actual(), 2);
    }

    #[test]
    fn test_zero_rates_keep_baseline() {
        let scenario = scenario(Adjustment::default());
        assert_eq!(scenario.adjusted_emissions(), scenario.baseline_emissions());
    }

    #[test]
    fn test_adjustment_scales_independently() {
        let adjustment = Adjustment::try_new(Percent(10), Percent(-50)).unwrap();
        let adjusted = scenario(adjustment).adjusted_usage();
        let usage = adjusted[&month(202_507)];
        assert_abs_diff_eq!(usage.electricity, 2200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(usage.gas, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boundary_keeps_actual_usage() {
        let adjustment = Adjustment::try_new(Percent(50), Percent(50)).unwrap();
        let adjusted = scenario(adjustment).adjusted_usage();
        assert_eq!(adjusted[&month(202_506)], EnergyUsage { electricity: 2000.0, gas: 1000.0 });
    }

    #[test]
    fn test_adjustment_range() {
        assert!(Adjustment::try_new(Percent(51), Percent(0)).is_err());
        assert!(Adjustment::try_new(Percent(0), Percent(-51)).is_err());
        assert!(Adjustment::try_new(Percent(-50), Percent(50)).is_ok());
    }

    #[test]
    fn test_chart() {
        let chart = scenario(Adjustment::default()).chart();
        let keys: Vec<_> = chart.labels.iter().map(|label| label.key()).collect();
        assert_eq!(keys, [202_505, 202_506, 202_507, 203_001]);
        assert_eq!(chart.series[0].values[2], None);
        assert!(chart.series[1].values[1].is_some());
    }

    #[test]
    fn test_summary() {
        let summary = scenario(Adjustment::default()).summary(2030, 0.3);
        // Last actual month: 2000 kWh and 1000 m³.
        let last_actual = 2000.0 * 0.4541 + 1000.0 * 0.202;
        assert_abs_diff_eq!(summary.target.0, last_actual * 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.predicted_in_target_year.0, 454.1, epsilon = 1e-9);
        assert_abs_diff_eq!(
            summary.delta.0,
            summary.predicted_in_target_year.0 - summary.target.0,
            epsilon = 1e-9,
        );
        assert_abs_diff_eq!(summary.achievement, summary.target.0 / 454.1, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.electricity_share + summary.gas_share, 1.0, epsilon = 1e-9);
        // Boundary plus two forecast months:
        assert_abs_diff_eq!(
            summary.total_predicted.0,
            last_actual + (2000.0 * 0.4541 + 1000.0 * 0.202) + 454.1,
            epsilon = 1e-9,
        );
    }

    #[test]
    fn test_summary_without_data() {
        let summary = Scenario::builder()
            .actual(&[])
            .actual_until(month(202_506))
            .predicted(&[])
            .build()
            .summary(2030, 0.3);
        assert_eq!(summary.total_predicted, TonnesCo2::ZERO);
        assert_abs_diff_eq!(summary.achievement, 0.0);
        assert_abs_diff_eq!(summary.electricity_share, 0.0);
    }
}
