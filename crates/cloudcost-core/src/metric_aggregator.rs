//! Folding raw per-bucket metric samples into one aggregate value
//!
//! Both statistic kinds aggregate to the mean of the per-bucket values.
//! For `Sum` metrics each bucket already carries its own sum, so the mean is
//! the representative per-bucket rate ("average Sum per hour"). The cost
//! estimator multiplies it back by the bucket count to recover the window
//! total, so this must stay a mean and never become a sum of sums.

use crate::types::{AggregateResult, MetricSample, StatisticKind};

/// Aggregate `samples` fetched with statistic `kind`
///
/// Returns an absent value for an empty sequence. A sample whose own value
/// is missing folds as `0.0`.
///
/// # Examples
/// ```
/// use cloudcost_core::metric_aggregator::aggregate;
/// use cloudcost_core::types::{MetricSample, StatisticKind};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let samples = vec![MetricSample::new(now, 2.0), MetricSample::new(now, 4.0)];
/// assert_eq!(aggregate(&samples, StatisticKind::Average).value, Some(3.0));
/// assert_eq!(aggregate(&[], StatisticKind::Sum).value, None);
/// ```
pub fn aggregate(samples: &[MetricSample], kind: StatisticKind) -> AggregateResult {
    if samples.is_empty() {
        return AggregateResult::absent(kind);
    }

    let total: f64 = samples.iter().map(|s| s.value.unwrap_or(0.0)).sum();

    AggregateResult {
        kind,
        value: Some(total / samples.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn hourly(values: &[Option<f64>]) -> Vec<MetricSample> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSample {
                bucket_start: base + Duration::hours(i as i64),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn test_empty_is_absent() {
        let result = aggregate(&[], StatisticKind::Average);
        assert_eq!(result.value, None);
        assert_eq!(result.kind, StatisticKind::Average);
    }

    #[test]
    fn test_average_of_buckets() {
        let samples = hourly(&[Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(aggregate(&samples, StatisticKind::Average).value, Some(3.0));
    }

    #[test]
    fn test_sum_kind_still_averages_buckets() {
        let samples = hourly(&[Some(100.0), Some(300.0)]);
        let result = aggregate(&samples, StatisticKind::Sum);
        assert_eq!(result.kind, StatisticKind::Sum);
        assert_eq!(result.value, Some(200.0));
    }

    #[test]
    fn test_missing_values_fold_as_zero() {
        let samples = hourly(&[Some(6.0), None, None]);
        assert_eq!(aggregate(&samples, StatisticKind::Average).value, Some(2.0));
    }

    #[test]
    fn test_all_missing_is_zero_not_absent() {
        let samples = hourly(&[None, None]);
        assert_eq!(aggregate(&samples, StatisticKind::Average).value, Some(0.0));
    }

    proptest! {
        #[test]
        fn prop_aggregate_is_mean(values in prop::collection::vec(prop::option::of(0.0f64..1_000.0), 1..200)) {
            let samples = hourly(&values);
            let expected = values.iter().map(|v| v.unwrap_or(0.0)).sum::<f64>() / values.len() as f64;
            let result = aggregate(&samples, StatisticKind::Sum);
            prop_assert_eq!(result.value, Some(expected));
        }
    }
}
