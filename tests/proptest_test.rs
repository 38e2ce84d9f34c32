//! Property-based tests for cloudcost using proptest

use chrono::{Duration, TimeZone, Utc};
use cloudcost_core::CloudcostError;
use cloudcost_core::metric_aggregator::aggregate;
use cloudcost_core::report::{ReportSection, SectionFailure, assemble};
use cloudcost_core::tag_breakdown::{rank, tag_totals};
use cloudcost_core::time_window::{TimeWindow, WindowAlignment};
use cloudcost_core::types::{BillingBucket, BillingGroup, MetricSample, StatisticKind};
use cloudcost_core::utilization::{Utilization, classify_idle};
use cloudcost_pricing::{CostEstimator, PricingModel};
use proptest::prelude::*;

// Strategies for generating test data

prop_compose! {
    fn arb_samples()(values in prop::collection::vec(prop::option::of(0.0f64..100.0), 0..48))
        -> Vec<MetricSample> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| MetricSample {
                bucket_start: start + Duration::hours(i as i64),
                value,
            })
            .collect()
    }
}

prop_compose! {
    fn arb_buckets()(
        groups in prop::collection::vec(
            prop::collection::vec((prop::sample::select(vec!["web", "batch", "", "ml"]), 0.0f64..1000.0), 0..6),
            0..10,
        )
    ) -> Vec<BillingBucket> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        groups
            .into_iter()
            .enumerate()
            .map(|(day, groups)| BillingBucket {
                bucket_start: start + Duration::days(day as i64),
                groups: groups
                    .into_iter()
                    .map(|(value, amount)| BillingGroup::new(format!("Team${value}"), amount))
                    .collect(),
            })
            .collect()
    }
}

type SectionOutcome = Result<ReportSection, SectionFailure>;

fn arb_section_outcome() -> impl Strategy<Value = SectionOutcome> {
    prop_oneof![
        (prop::option::of(0.0f64..10_000.0), 0usize..50).prop_map(|(cost, n)| -> SectionOutcome {
            Ok(ReportSection::new(format!("section-{n}"), "narrative", cost).with_counts(n, 0))
        }),
        (0usize..50).prop_map(|n| -> SectionOutcome {
            Err(SectionFailure::new(
                format!("failed-{n}"),
                CloudcostError::collaborator("billing", "throttled"),
            ))
        }),
    ]
}

proptest! {
    #[test]
    fn test_aggregate_is_mean_with_missing_as_zero(samples in arb_samples()) {
        for kind in [StatisticKind::Average, StatisticKind::Sum] {
            let result = aggregate(&samples, kind);
            if samples.is_empty() {
                prop_assert!(result.value.is_none());
            } else {
                let expected = samples.iter().map(|s| s.value.unwrap_or(0.0)).sum::<f64>()
                    / samples.len() as f64;
                prop_assert!((result.value.unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_classification_is_strict(value in 0.0f64..100.0, threshold in 0.0f64..100.0) {
        let result = aggregate(
            &[MetricSample::new(Utc::now(), value)],
            StatisticKind::Average,
        );
        let utilization = classify_idle(&result, threshold);
        if value < threshold {
            prop_assert_eq!(utilization, Utilization::Idle);
        } else {
            prop_assert_eq!(utilization, Utilization::Active);
        }
    }

    #[test]
    fn test_rank_preserves_totals_and_order(buckets in arb_buckets()) {
        let totals = tag_totals(&buckets, "Team");
        let ranked = rank(&totals);

        prop_assert_eq!(ranked.len(), totals.len());
        let input_total: f64 = buckets
            .iter()
            .flat_map(|b| b.groups.iter())
            .map(|g| g.amount)
            .sum();
        prop_assert!((ranked.total() - input_total).abs() < 1e-6);

        for pair in ranked.entries().windows(2) {
            prop_assert!(
                pair[0].amount > pair[1].amount
                    || (pair[0].amount == pair[1].amount && pair[0].key < pair[1].key)
            );
        }
    }

    #[test]
    fn test_grand_total_is_sum_of_section_costs(
        outcomes in prop::collection::vec(arb_section_outcome(), 0..8)
    ) {
        let expected_sections = outcomes.len();
        let report = assemble(outcomes, Utc::now());

        prop_assert_eq!(report.sections.len(), expected_sections);
        prop_assert_eq!(report.service_totals.len(), expected_sections);
        let sum: f64 = report
            .sections
            .iter()
            .map(|s| s.estimated_monthly_cost.unwrap_or(0.0))
            .sum();
        prop_assert!((report.grand_total - sum).abs() < 1e-9);
        for section in report.sections.iter().filter(|s| s.is_failed()) {
            prop_assert!(section.estimated_monthly_cost.is_none());
        }
    }

    #[test]
    fn test_storage_cost_scales_with_price(
        size_gb in 0u64..10_000,
        price in 0.0f64..5.0,
        days in 1u32..90,
    ) {
        let anchor = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let window = TimeWindow::last_n_days(days, anchor, WindowAlignment::UtcDay).unwrap();
        let pricing = PricingModel::on_demand(0.25, 1.25, price).unwrap();
        let absent = aggregate(&[], StatisticKind::Sum);

        let cost = CostEstimator::estimate_monthly_cost(
            &window,
            &absent,
            &absent,
            window.bucket_count(3600),
            size_gb * 1024 * 1024 * 1024,
            &pricing,
        );

        prop_assert!(cost.total_cost >= 0.0);
        prop_assert!((cost.storage() - size_gb as f64 * price).abs() < 1e-6);
        prop_assert_eq!(cost.read(), 0.0);
        prop_assert_eq!(cost.write(), 0.0);
    }
}
