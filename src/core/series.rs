use std::collections::BTreeSet;

use crate::core::{aggregate::MonthlyValues, year_month::YearMonth};

/// Named values aligned with the labels of the owning [`Chart`].
///
/// `None` means «no data for this month», which is different from zero.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Several series sharing a common month axis.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chart {
    pub labels: Vec<YearMonth>,
    pub series: Vec<Series>,
}

impl Chart {
    pub const fn new(labels: Vec<YearMonth>) -> Self {
        Self { labels, series: Vec::new() }
    }

    /// Append a series, looking up every label in `values`.
    pub fn with_series(mut self, name: impl Into<String>, values: &MonthlyValues) -> Self {
        let values = self.labels.iter().map(|label| values.get(label).copied()).collect();
        self.series.push(Series { name: name.into(), values });
        self
    }
}

pub const ACTUAL: &str = "actual";
pub const BASELINE: &str = "predicted (baseline)";
pub const ADJUSTED: &str = "predicted (adjusted)";

/// Stitch the actual history and the two forecasts onto one month axis.
///
/// The boundary is the last actual month. Actual values past the boundary are never shown,
/// and forecasts missing the boundary month get the last actual value there, so that
/// the forecast lines start where the actual line ends.
pub fn merge_series(
    actual: &MonthlyValues,
    baseline: &MonthlyValues,
    adjusted: &MonthlyValues,
) -> Chart {
    let boundary = actual.last_key_value().map(|(month, value)| (*month, *value));
    let baseline = with_boundary(baseline, boundary);
    let adjusted = with_boundary(adjusted, boundary);

    let labels: BTreeSet<YearMonth> =
        actual.keys().chain(baseline.keys()).chain(adjusted.keys()).copied().collect();
    let labels: Vec<YearMonth> = labels.into_iter().collect();

    let actual_values = labels
        .iter()
        .map(|label| match boundary {
            Some((boundary, _)) if label.key() > boundary.key() => None,
            _ => actual.get(label).copied(),
        })
        .collect();

    Chart {
        series: vec![Series { name: ACTUAL.to_string(), values: actual_values }],
        labels,
    }
    .with_series(BASELINE, &baseline)
    .with_series(ADJUSTED, &adjusted)
}

fn with_boundary(predicted: &MonthlyValues, boundary: Option<(YearMonth, f64)>) -> MonthlyValues {
    let mut predicted = predicted.clone();
    if let Some((month, value)) = boundary {
        predicted.entry(month).or_insert(value);
    }
    predicted
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn monthly(values: &[(u32, f64)]) -> MonthlyValues {
        values.iter().map(|(key, value)| (YearMonth::from_key(*key).unwrap(), *value)).collect()
    }

    #[test]
    fn test_labels_are_sorted_union() {
        let actual = monthly(&[(202_505, 1.0), (202_506, 2.0)]);
        let baseline = monthly(&[(202_507, 3.0), (202_508, 4.0)]);
        let adjusted = monthly(&[(202_508, 5.0), (202_509, 6.0)]);
        let chart = merge_series(&actual, &baseline, &adjusted);
        let keys = chart.labels.iter().map(|label| label.key()).collect_vec();
        assert_eq!(keys, [202_505, 202_506, 202_507, 202_508, 202_509]);
        assert!(chart.series.iter().all(|series| series.values.len() == chart.labels.len()));
    }

    #[test]
    fn test_boundary_is_injected() {
        let actual = monthly(&[(202_505, 1.0), (202_506, 2.0)]);
        let baseline = monthly(&[(202_507, 3.0)]);
        let chart = merge_series(&actual, &baseline, &baseline);
        assert_eq!(chart.series[0].values, [Some(1.0), Some(2.0), None]);
        assert_eq!(chart.series[1].values, [None, Some(2.0), Some(3.0)]);
        assert_eq!(chart.series[2].values, [None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_existing_boundary_is_kept() {
        let actual = monthly(&[(202_506, 2.0)]);
        let baseline = monthly(&[(202_506, 9.0), (202_507, 3.0)]);
        let chart = merge_series(&actual, &baseline, &MonthlyValues::new());
        assert_eq!(chart.series[1].values, [Some(9.0), Some(3.0)]);
        assert_eq!(chart.series[2].values, [Some(2.0), None]);
    }

    #[test]
    fn test_actual_is_hidden_after_boundary() {
        let actual = monthly(&[(202_412, 1.0), (202_506, 2.0)]);
        let baseline = monthly(&[(202_507, 3.0), (202_601, 4.0)]);
        let chart = merge_series(&actual, &baseline, &baseline);
        for (label, value) in chart.labels.iter().zip(&chart.series[0].values) {
            if label.key() > 202_506 {
                assert_eq!(*value, None);
            }
        }
    }

    #[test]
    fn test_without_actual() {
        let baseline = monthly(&[(202_507, 3.0)]);
        let chart = merge_series(&MonthlyValues::new(), &baseline, &baseline);
        assert_eq!(chart.labels.len(), 1);
        assert_eq!(chart.series[0].values, [None]);
    }
}
