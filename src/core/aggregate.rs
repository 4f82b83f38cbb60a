use std::{collections::BTreeMap, num::NonZeroU32};

use itertools::Itertools;

use crate::core::{record::UsageRecord, year_month::YearMonth};

/// Aggregated value per month. Iteration is always in ascending month order.
pub type MonthlyValues = BTreeMap<YearMonth, f64>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Reducer {
    Sum,
    Mean,
}

impl<T> AggregateByMonth for T where T: ?Sized {}

pub trait AggregateByMonth {
    /// Group `(month, value)` pairs by month and reduce every group.
    ///
    /// Months without values never appear in the result.
    fn aggregate_by_month(self, reducer: Reducer) -> MonthlyValues
    where
        Self: Sized + IntoIterator<Item = (YearMonth, f64)>,
    {
        self.into_iter()
            .into_grouping_map()
            .fold((0.0, 0_u32), |(sum, count), _, value| (sum + value, count + 1))
            .into_iter()
            .map(|(year_month, (sum, count))| {
                let value = match reducer {
                    Reducer::Sum => sum,
                    Reducer::Mean => sum / f64::from(count),
                };
                (year_month, value)
            })
            .collect()
    }
}

pub fn aggregate_by_month<'a>(
    records: impl IntoIterator<Item = &'a UsageRecord>,
    extract: impl Fn(&UsageRecord) -> f64,
    reducer: Reducer,
) -> MonthlyValues {
    records
        .into_iter()
        .map(|record| (record.year_month, extract(record)))
        .aggregate_by_month(reducer)
}

/// Approximate the per-region average by dividing national monthly totals by the region count.
///
/// The national endpoint yields one total per month, so the last record of a month wins.
pub fn divide_national_by_region_count<'a>(
    national_totals: impl IntoIterator<Item = &'a UsageRecord>,
    region_count: NonZeroU32,
    extract: impl Fn(&UsageRecord) -> f64,
) -> MonthlyValues {
    let region_count = f64::from(region_count.get());
    national_totals
        .into_iter()
        .map(|record| (record.year_month, extract(record) / region_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn month(key: u32) -> YearMonth {
        YearMonth::from_key(key).unwrap()
    }

    fn record(key: u32, electricity: f64) -> UsageRecord {
        UsageRecord::builder().year_month(month(key)).electricity(electricity).build()
    }

    #[test]
    fn test_mean() {
        let records = [record(202_001, 100.0), record(202_001, 300.0), record(202_002, 50.0)];
        let averages = aggregate_by_month(&records, |record| record.electricity, Reducer::Mean);
        assert_eq!(averages.len(), 2);
        assert_abs_diff_eq!(averages[&month(202_001)], 200.0);
        assert_abs_diff_eq!(averages[&month(202_002)], 50.0);
    }

    #[test]
    fn test_sum() {
        let records = [record(202_001, 100.0), record(202_001, 300.0)];
        let totals = aggregate_by_month(&records, |record| record.electricity, Reducer::Sum);
        assert_abs_diff_eq!(totals[&month(202_001)], 400.0);
    }

    #[test]
    fn test_empty() {
        assert!(aggregate_by_month(&[], |record| record.gas, Reducer::Mean).is_empty());
    }

    #[test]
    fn test_mean_equals_sum_over_count() {
        let values = [3.0, 7.5, -1.0, 0.0, 12.25];
        let records = values.map(|value| record(202_312, value));
        let mean = aggregate_by_month(&records, |record| record.electricity, Reducer::Mean);
        #[expect(clippy::cast_precision_loss)]
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert_abs_diff_eq!(mean[&month(202_312)], expected);
    }

    #[test]
    fn test_keys_are_sorted() {
        let averages = [(month(202_103), 1.0), (month(202_001), 2.0), (month(202_012), 3.0)]
            .aggregate_by_month(Reducer::Mean);
        let keys: Vec<_> = averages.keys().map(|month| month.key()).collect();
        assert_eq!(keys, [202_001, 202_012, 202_103]);
    }

    #[test]
    fn test_divide_national_by_region_count() {
        let national = [record(202_001, 50_000.0)];
        let averages = divide_national_by_region_count(
            &national,
            NonZeroU32::new(253).unwrap(),
            |record| record.electricity,
        );
        assert_abs_diff_eq!(averages[&month(202_001)], 197.628, epsilon = 0.001);
    }
}
