use std::{num::NonZeroU32, ops::RangeInclusive};

use bon::Builder;

use crate::core::{
    aggregate::{MonthlyValues, Reducer, aggregate_by_month, divide_national_by_region_count},
    emission::EmissionCoefficients,
    record::{EnergyType, UsageRecord},
    region::Region,
    series::Chart,
    year_month::YearMonth,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Metric {
    /// Raw energy usage.
    Usage,

    /// Greenhouse-gas emissions derived from the usage.
    Emissions,
}

/// Records needed for a regional comparison; which ones are used depends on the region.
#[derive(Default)]
pub struct ComparisonData {
    /// National monthly totals.
    pub national: Vec<UsageRecord>,

    /// Records of every county in the selected city.
    pub city: Vec<UsageRecord>,

    /// Records of the selected county.
    pub county: Vec<UsageRecord>,
}

/// Selected region against its parent average.
///
/// - nation: monthly mean of the national records, nothing to compare with;
/// - city: monthly mean over the city's counties against the national per-region average;
/// - county: the county's own values against the city's monthly mean.
#[derive(Builder)]
pub struct Comparison {
    metric: Metric,
    energy_type: EnergyType,
    coefficients: EmissionCoefficients,
    region_count: NonZeroU32,
    months: RangeInclusive<YearMonth>,
}

impl Comparison {
    pub fn chart(&self, region: Region, data: &ComparisonData) -> Chart {
        let labels = self.months.start().iter_until(*self.months.end()).collect();
        let chart = Chart::new(labels);
        let value = |record: &UsageRecord| self.value(record);

        match region {
            Region::Nation => chart.with_series(
                "nationwide",
                &aggregate_by_month(self.within(&data.national), value, Reducer::Mean),
            ),
            Region::City { city } => chart
                .with_series(
                    "nationwide per-region average",
                    &divide_national_by_region_count(
                        self.within(&data.national),
                        self.region_count,
                        value,
                    ),
                )
                .with_series(
                    format!("city {city} average"),
                    &aggregate_by_month(self.within(&data.city), value, Reducer::Mean),
                ),
            Region::County { city, county } => {
                let own: MonthlyValues = self
                    .within(&data.county)
                    .filter(|record| record.county_id == county)
                    .map(|record| (record.year_month, value(record)))
                    .collect();
                chart
                    .with_series(
                        format!("city {city} average"),
                        &aggregate_by_month(self.within(&data.city), value, Reducer::Mean),
                    )
                    .with_series(format!("county {county}"), &own)
            }
        }
    }

    fn value(&self, record: &UsageRecord) -> f64 {
        let usage = record.usage(self.energy_type);
        match self.metric {
            Metric::Usage => usage,
            Metric::Emissions => self.coefficients.for_energy(self.energy_type, usage).0,
        }
    }

    fn within<'a>(
        &'a self,
        records: &'a [UsageRecord],
    ) -> impl Iterator<Item = &'a UsageRecord> + 'a {
        records.iter().filter(|record| record.is_within(&self.months))
    }
}
