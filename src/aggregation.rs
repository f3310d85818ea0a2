// 🧮 Aggregation - bucket totals, net worth and year-over-year change
//
// Every item is reconciled, classified and then counted exactly once:
//   net_worth = Σ assets - Σ debt
// The Debt bucket total is kept as a positive magnitude for display.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::disclosure::{DisclosureRecord, Population, RawLineItem};
use crate::profiles::Labels;
use crate::reconciliation::reconcile_current_value;
use crate::rules::{self, Bucket, RuleEngine};

// ============================================================================
// ASSET BREAKDOWN
// ============================================================================

/// Numbers derived from one person's line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBreakdown {
    pub net_worth: i64,
    pub previous_net_worth: i64,
    pub change_amount: i64,
    pub change_rate_percent: f64,

    /// Every bucket is present, zero when empty
    pub bucket_totals: BTreeMap<Bucket, i64>,

    /// Reconciled items per bucket, largest current value first
    pub groups: BTreeMap<Bucket, Vec<RawLineItem>>,
}

impl AssetBreakdown {
    fn empty() -> Self {
        AssetBreakdown {
            net_worth: 0,
            previous_net_worth: 0,
            change_amount: 0,
            change_rate_percent: 0.0,
            bucket_totals: Bucket::ALL.iter().map(|b| (*b, 0)).collect(),
            groups: Bucket::ALL.iter().map(|b| (*b, Vec::new())).collect(),
        }
    }

    pub fn total(&self, bucket: Bucket) -> i64 {
        self.bucket_totals.get(&bucket).copied().unwrap_or(0)
    }

    pub fn items(&self, bucket: Bucket) -> &[RawLineItem] {
        self.groups.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn item_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Third summary card: virtual assets if any, else vehicles if any, else other
    pub fn highlight_bucket(&self) -> Bucket {
        if !self.items(Bucket::VirtualAsset).is_empty() {
            Bucket::VirtualAsset
        } else if !self.items(Bucket::Vehicle).is_empty() {
            Bucket::Vehicle
        } else {
            Bucket::Other
        }
    }
}

/// Rate in percent; a zero base reports 0 instead of dividing
pub fn change_rate(change_amount: i64, previous_net_worth: i64) -> f64 {
    if previous_net_worth == 0 {
        0.0
    } else {
        change_amount as f64 / previous_net_worth as f64 * 100.0
    }
}

/// Aggregate with the built-in rule set
pub fn aggregate(items: &[RawLineItem]) -> AssetBreakdown {
    aggregate_items(items, rules::classify)
}

/// Aggregate with a caller-supplied rule set
pub fn aggregate_with(engine: &RuleEngine, items: &[RawLineItem]) -> AssetBreakdown {
    aggregate_items(items, |item| engine.classify(item))
}

fn aggregate_items<F>(items: &[RawLineItem], classify: F) -> AssetBreakdown
where
    F: Fn(&RawLineItem) -> Bucket,
{
    let mut breakdown = AssetBreakdown::empty();

    for raw in items {
        let mut item = raw.clone();
        reconcile_current_value(&mut item);
        let bucket = classify(&item);

        if bucket.is_debt() {
            breakdown.net_worth = breakdown.net_worth.saturating_sub(item.current_value);
            breakdown.previous_net_worth = breakdown.previous_net_worth.saturating_sub(item.previous_value);
        } else {
            breakdown.net_worth = breakdown.net_worth.saturating_add(item.current_value);
            breakdown.previous_net_worth = breakdown.previous_net_worth.saturating_add(item.previous_value);
        }

        let total = breakdown.bucket_totals.entry(bucket).or_insert(0);
        *total = total.saturating_add(item.current_value);
        breakdown.groups.entry(bucket).or_default().push(item);
    }

    // sort_by is stable, so equal values keep filing order
    for group in breakdown.groups.values_mut() {
        group.sort_by(|a, b| b.current_value.cmp(&a.current_value));
    }

    breakdown.change_amount = breakdown.net_worth.saturating_sub(breakdown.previous_net_worth);
    breakdown.change_rate_percent = change_rate(breakdown.change_amount, breakdown.previous_net_worth);
    breakdown
}

// ============================================================================
// PERSON SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    pub population: Population,
    /// Party for legislators, ministry or agency for officials
    pub affiliation_label: String,
    /// District for legislators, position for officials
    pub secondary_label: String,
    pub image_url: String,

    #[serde(flatten)]
    pub breakdown: AssetBreakdown,
}

impl PersonSummary {
    pub fn build(
        record: &DisclosureRecord,
        population: Population,
        labels: Labels,
        engine: &RuleEngine,
    ) -> Self {
        PersonSummary {
            name: record.name.clone(),
            population,
            affiliation_label: labels.affiliation,
            secondary_label: labels.secondary,
            image_url: labels.image_url,
            breakdown: aggregate_with(engine, &record.assets),
        }
    }

    pub fn net_worth(&self) -> i64 {
        self.breakdown.net_worth
    }

    pub fn is_government(&self) -> bool {
        self.population == Population::Government
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(t: &str, d: &str, previous: i64, current: i64) -> RawLineItem {
        RawLineItem {
            relationship: "본인".to_string(),
            item_type: t.to_string(),
            description: d.to_string(),
            previous_value: previous,
            current_value: current,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_list_is_all_zero() {
        let breakdown = aggregate(&[]);

        assert_eq!(breakdown.net_worth, 0);
        assert_eq!(breakdown.change_amount, 0);
        assert_eq!(breakdown.change_rate_percent, 0.0);
        assert_eq!(breakdown.bucket_totals.len(), Bucket::ALL.len());
        assert!(breakdown.bucket_totals.values().all(|v| *v == 0));
        assert_eq!(breakdown.item_count(), 0);
    }

    #[test]
    fn test_debt_subtracts_but_displays_positive() {
        let breakdown = aggregate(&[item("채무", "", 1000, 1000)]);

        assert_eq!(breakdown.net_worth, -1000);
        assert_eq!(breakdown.total(Bucket::Debt), 1000);
    }

    #[test]
    fn test_financial_minus_debt() {
        let breakdown = aggregate(&[item("예금", "", 0, 300), item("채무", "", 0, 100)]);
        assert_eq!(breakdown.net_worth, 200);
        assert_eq!(breakdown.total(Bucket::Financial), 300);
    }

    #[test]
    fn test_reconstructed_apartment_counts_as_real_estate() {
        let mut apartment = item("", "The apartment is 84.98㎡", 0, 0);
        apartment.increase = Some(500000);

        let breakdown = aggregate(&[apartment]);

        assert_eq!(breakdown.total(Bucket::RealEstate), 500000);
        assert_eq!(breakdown.items(Bucket::RealEstate)[0].current_value, 500000);
        assert_eq!(breakdown.total(Bucket::Financial), 0);
    }

    #[test]
    fn test_zero_base_change_rate_is_zero() {
        let breakdown = aggregate(&[item("예금", "", 0, 5000)]);

        assert_eq!(breakdown.change_amount, 5000);
        assert_eq!(breakdown.change_rate_percent, 0.0);
        assert!(breakdown.change_rate_percent.is_finite());
    }

    #[test]
    fn test_change_rate() {
        let breakdown = aggregate(&[item("예금", "", 1000, 1100), item("채무", "", 200, 100)]);

        // 800 -> 1000
        assert_eq!(breakdown.previous_net_worth, 800);
        assert_eq!(breakdown.change_amount, 200);
        assert!((breakdown.change_rate_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_item_dropped_and_sorted_descending() {
        let items = vec![
            item("예금", "A", 0, 10),
            item("골동품", "", 0, 5),
            item("예금", "B", 0, 30),
            item("예금", "C", 0, 10),
            item("자동차", "", 0, 20),
        ];
        let breakdown = aggregate(&items);

        assert_eq!(breakdown.item_count(), items.len());

        let financial: Vec<&str> = breakdown
            .items(Bucket::Financial)
            .iter()
            .map(|i| i.description.as_str())
            .collect();
        assert_eq!(financial, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let items = vec![item("토지", "", 100, 0), item("채무", "", 50, 40), item("", "", 0, 7)];
        assert_eq!(aggregate(&items), aggregate(&items));
    }

    #[test]
    fn test_highlight_bucket() {
        assert_eq!(aggregate(&[]).highlight_bucket(), Bucket::Other);
        assert_eq!(aggregate(&[item("자동차", "", 0, 1)]).highlight_bucket(), Bucket::Vehicle);
        assert_eq!(
            aggregate(&[item("자동차", "", 0, 1), item("가상자산", "", 0, 1)]).highlight_bucket(),
            Bucket::VirtualAsset
        );
    }

    #[test]
    fn test_person_summary_build() {
        let record = DisclosureRecord {
            name: "김공직".to_string(),
            affiliation: Some("국토교통부".to_string()),
            assets: vec![item("예금", "", 0, 10)],
        };
        let summary = PersonSummary::build(
            &record,
            Population::Government,
            Labels::for_official(record.affiliation.as_deref()),
            &RuleEngine::with_defaults(),
        );

        assert_eq!(summary.affiliation_label, "국토교통부");
        assert_eq!(summary.net_worth(), 10);
        assert!(summary.is_government());
    }

    #[test]
    fn test_extreme_values_saturate() {
        let json = r#"[{"type":"예금","previous_value":9223372036854775807,"current_value":0,"increase":1}]"#;
        let items: Vec<RawLineItem> = serde_json::from_str(json).unwrap();
        let breakdown = aggregate(&items);

        assert_eq!(breakdown.net_worth, i64::MAX);
        assert_eq!(breakdown.previous_net_worth, i64::MAX);
        assert_eq!(breakdown.change_amount, 0);

        let stacked = aggregate(&[item("예금", "", 0, i64::MAX), item("예금", "", 0, 1)]);
        assert_eq!(stacked.total(Bucket::Financial), i64::MAX);
        assert_eq!(stacked.net_worth, i64::MAX);

        let debt = aggregate(&[item("채무", "", 0, i64::MAX), item("채무", "", 0, i64::MAX)]);
        assert_eq!(debt.net_worth, i64::MIN);
        assert_eq!(debt.total(Bucket::Debt), i64::MAX);
    }
}
