// 🏷️ Classification Rules - Rules as Data
// Ordered phrase rules that put every disclosure line item into one bucket.
//
// Precedence is the list order and it matters: an item with an empty `type`
// but "㎡" in its description must land in RealEstate, so the real-estate rule
// sits above the financial rule that claims empty types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::disclosure::RawLineItem;

// ============================================================================
// BUCKETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    RealEstate,
    Financial,
    VirtualAsset,
    Vehicle,
    Other,
    Debt,
}

impl Bucket {
    /// Display order of the detail sections
    pub const ALL: [Bucket; 6] = [
        Bucket::RealEstate,
        Bucket::Financial,
        Bucket::VirtualAsset,
        Bucket::Vehicle,
        Bucket::Other,
        Bucket::Debt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::RealEstate => "real_estate",
            Bucket::Financial => "financial",
            Bucket::VirtualAsset => "virtual_asset",
            Bucket::Vehicle => "vehicle",
            Bucket::Other => "other",
            Bucket::Debt => "debt",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Bucket::RealEstate => "🏢 부동산",
            Bucket::Financial => "💰 금융",
            Bucket::VirtualAsset => "🪙 가상자산",
            Bucket::Vehicle => "🚗 자동차",
            Bucket::Other => "💎 기타",
            Bucket::Debt => "📉 채무",
        }
    }

    /// Debt subtracts from net worth; everything else adds
    pub fn is_debt(&self) -> bool {
        matches!(self, Bucket::Debt)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Rule ID for tracking
    pub id: String,

    /// Bucket assigned on match
    pub bucket: Bucket,

    /// Phrases searched for in the item's `type`
    #[serde(default)]
    pub type_phrases: Vec<String>,

    /// Phrases searched for in the item's `description`
    #[serde(default)]
    pub description_phrases: Vec<String>,

    /// Also match items whose `type` is empty
    #[serde(default)]
    pub match_empty_type: bool,

    /// Description/notes about this rule
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClassificationRule {
    pub fn new(id: &str, bucket: Bucket) -> Self {
        ClassificationRule {
            id: id.to_string(),
            bucket,
            type_phrases: Vec::new(),
            description_phrases: Vec::new(),
            match_empty_type: false,
            notes: None,
        }
    }

    pub fn on_type(mut self, phrases: &[&str]) -> Self {
        self.type_phrases.extend(phrases.iter().map(|p| p.to_string()));
        self
    }

    pub fn on_description(mut self, phrases: &[&str]) -> Self {
        self.description_phrases.extend(phrases.iter().map(|p| p.to_string()));
        self
    }

    pub fn when_type_empty(mut self) -> Self {
        self.match_empty_type = true;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Case-sensitive substring test against `type` and `description`
    pub fn matches(&self, item: &RawLineItem) -> bool {
        let t = item.item_type.as_str();
        let d = item.description.as_str();

        if self.match_empty_type && t.is_empty() {
            return true;
        }

        // An empty phrase would match everything; ignore it
        let hit = |text: &str, phrases: &[String]| {
            phrases.iter().any(|p| !p.is_empty() && text.contains(p.as_str()))
        };

        hit(t, self.type_phrases.as_slice()) || hit(d, self.description_phrases.as_slice())
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub bucket: Bucket,
    /// `None` when no rule matched and the item fell through to Other
    pub rule_id: Option<String>,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        ClassificationResult {
            bucket: Bucket::Other,
            rule_id: None,
        }
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<ClassificationRule>,
}

impl RuleEngine {
    /// Create a new empty rule engine (everything classifies as Other)
    pub fn new() -> Self {
        RuleEngine { rules: Vec::new() }
    }

    /// Load rules from JSON file. File order is precedence order.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let rules: Vec<ClassificationRule> =
            serde_json::from_str(&content).context("Failed to parse rules JSON")?;

        Ok(RuleEngine::from_rules(rules))
    }

    /// Create engine from an ordered list of rules
    pub fn from_rules(rules: Vec<ClassificationRule>) -> Self {
        RuleEngine { rules }
    }

    /// The current rule set for asset disclosures
    pub fn with_defaults() -> Self {
        RuleEngine::from_rules(default_rules())
    }

    /// Append a rule at the lowest precedence
    pub fn add_rule(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// First matching rule wins; no match means Other
    pub fn classify_with_rule(&self, item: &RawLineItem) -> ClassificationResult {
        self.rules
            .iter()
            .find(|rule| rule.matches(item))
            .map(|rule| ClassificationResult {
                bucket: rule.bucket,
                rule_id: Some(rule.id.clone()),
            })
            .unwrap_or_default()
    }

    pub fn classify(&self, item: &RawLineItem) -> Bucket {
        self.classify_with_rule(item).bucket
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Classify with the built-in rule set
pub fn classify(item: &RawLineItem) -> Bucket {
    static ENGINE: OnceLock<RuleEngine> = OnceLock::new();
    ENGINE.get_or_init(RuleEngine::with_defaults).classify(item)
}

// ============================================================================
// DEFAULT RULES
// ============================================================================

/// Built-in rules, highest precedence first
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new("debt", Bucket::Debt)
            .on_type(&["채무"])
            .on_description(&["채무"])
            .with_notes("Liabilities of any kind"),
        ClassificationRule::new("vehicle", Bucket::Vehicle)
            .on_type(&["자동차", "승용차", "선박"]),
        ClassificationRule::new("virtual_asset", Bucket::VirtualAsset)
            .on_type(&["가상자산", "암호화폐"])
            .on_description(&["가상자산"]),
        ClassificationRule::new("real_estate", Bucket::RealEstate)
            .on_type(&[
                "토지", "건물", "주택", "아파트", "대지", "임야", "전", "답", "도로",
                "과수원", "잡종지", "목장", "오피스텔", "상가", "빌라", "전세", "임차",
                "권리", "창고",
            ])
            .on_description(&["건물", "대지", "임야", "아파트", "창고", "주택", "㎡"])
            .with_notes("Area units in the description win even when type is empty"),
        ClassificationRule::new("financial", Bucket::Financial)
            .when_type_empty()
            .on_type(&[
                "예금", "증권", "채권", "회사채", "국채", "공채", "현금", "신탁", "펀드",
                "주식", "보험", "예탁", "사인간", "대여금",
            ])
            .on_description(&[
                "은행", "농협", "수협", "신협", "금융", "증권", "보험", "생명", "화재",
                "사인간", "채권", "대여금", "현금",
            ])
            .with_notes("Empty type is the filer's default deposit category"),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(t: &str, d: &str) -> RawLineItem {
        RawLineItem {
            item_type: t.to_string(),
            description: d.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_debt_wins_over_everything() {
        assert_eq!(classify(&item("채무", "")), Bucket::Debt);
        assert_eq!(classify(&item("", "금융채무(국민은행)")), Bucket::Debt);
        assert_eq!(classify(&item("건물", "임대보증금 채무")), Bucket::Debt);
    }

    #[test]
    fn test_vehicle_only_looks_at_type() {
        assert_eq!(classify(&item("자동차", "2021년식 그랜저")), Bucket::Vehicle);
        assert_eq!(classify(&item("선박", "")), Bucket::Vehicle);
        assert_eq!(classify(&item("기타", "승용차 판매대금")), Bucket::Other);
    }

    #[test]
    fn test_virtual_asset() {
        assert_eq!(classify(&item("암호화폐", "비트코인")), Bucket::VirtualAsset);
        assert_eq!(classify(&item("", "가상자산(업비트)")), Bucket::VirtualAsset);
    }

    #[test]
    fn test_area_unit_beats_empty_type() {
        let apartment = item("", "The apartment is 84.98㎡");
        assert_eq!(classify(&apartment), Bucket::RealEstate);
    }

    #[test]
    fn test_empty_type_defaults_to_financial() {
        assert_eq!(classify(&item("", "")), Bucket::Financial);
        assert_eq!(classify(&item("", "정기적금")), Bucket::Financial);
    }

    #[test]
    fn test_financial_phrases() {
        assert_eq!(classify(&item("예금", "국민은행")), Bucket::Financial);
        assert_eq!(classify(&item("상장주식", "삼성전자 100주")), Bucket::Financial);
        assert_eq!(classify(&item("기타", "농협 정기예금")), Bucket::Financial);
    }

    #[test]
    fn test_fallback_is_other() {
        let result = RuleEngine::with_defaults().classify_with_rule(&item("골동품", "고려청자"));
        assert_eq!(result.bucket, Bucket::Other);
        assert_eq!(result.rule_id, None);
    }

    #[test]
    fn test_classification_reports_rule_id() {
        let engine = RuleEngine::with_defaults();
        let result = engine.classify_with_rule(&item("토지", "경기도 파주시 답 1,200㎡"));
        assert_eq!(result.bucket, Bucket::RealEstate);
        assert_eq!(result.rule_id.as_deref(), Some("real_estate"));
    }

    #[test]
    fn test_list_order_is_precedence() {
        let mut engine = RuleEngine::new();
        engine.add_rule(ClassificationRule::new("first", Bucket::Vehicle).on_type(&["A"]));
        engine.add_rule(ClassificationRule::new("second", Bucket::Debt).on_type(&["A"]));

        assert_eq!(engine.classify(&item("A", "")), Bucket::Vehicle);
        assert_eq!(engine.rule_count(), 2);
    }

    #[test]
    fn test_empty_phrase_never_matches() {
        let rule = ClassificationRule::new("blank", Bucket::Debt).on_type(&[""]);
        assert!(!rule.matches(&item("예금", "")));
    }

    #[test]
    fn test_rules_load_from_json() {
        let json = serde_json::to_string(&default_rules()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, json.as_bytes()).unwrap();

        let engine = RuleEngine::from_file(file.path()).unwrap();
        assert_eq!(engine.rule_count(), default_rules().len());
        assert_eq!(engine.classify(&item("", "84㎡")), Bucket::RealEstate);
    }
}
