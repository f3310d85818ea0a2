// 📄 Disclosure Sources - raw line items and the JSON documents they come from
//
// Three static documents feed the system:
//   assembly_assets.json    → [{ name, assets }]
//   officials_property.json → [{ name, affiliation, assets }] or { officials: [...] }
//   members_info.json       → legislator profiles (see profiles.rs)
//
// Every loader normalizes into one canonical shape (DisclosureRecord) before
// anything is classified.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::profiles::ProfileRow;

/// Reason text meaning the value did not move between periods
pub const NO_CHANGE_REASON: &str = "변동없음";

// ============================================================================
// RAW LINE ITEM
// ============================================================================

/// One reported asset or liability entry, exactly as filed.
/// Values are in thousands of won.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawLineItem {
    /// Whose asset this is (본인, 배우자, ...). Never interpreted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship: String,

    /// Filer-assigned category label; empty means absent
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub item_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub previous_value: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub current_value: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increase: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decrease: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

impl RawLineItem {
    /// Reason worth showing next to the value, if any
    pub fn display_reason(&self) -> Option<&str> {
        let reason = self.reason.trim();
        if reason.is_empty() || reason == NO_CHANGE_REASON {
            None
        } else {
            Some(reason)
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// POPULATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Population {
    /// National legislators
    Assembly,
    /// Government officials
    Government,
}

impl Population {
    pub fn as_str(&self) -> &'static str {
        match self {
            Population::Assembly => "assembly",
            Population::Government => "government",
        }
    }

    /// Parse a `view`/`type` parameter. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "assembly" => Some(Population::Assembly),
            "government" | "gov" => Some(Population::Government),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Population::Assembly => Population::Government,
            Population::Government => Population::Assembly,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Population::Assembly => "국회의원",
            Population::Government => "고위공직자",
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CANONICAL RECORD
// ============================================================================

/// One person's filing after boundary normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureRecord {
    pub name: String,

    /// Only officials carry an affiliation in the source data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,

    #[serde(default)]
    pub assets: Vec<RawLineItem>,
}

/// The officials document ships in two shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum OfficialsDocument {
    Bare(Vec<DisclosureRecord>),
    Wrapped {
        #[serde(default)]
        officials: Vec<DisclosureRecord>,
    },
}

impl OfficialsDocument {
    fn into_records(self) -> Vec<DisclosureRecord> {
        match self {
            OfficialsDocument::Bare(records) => records,
            OfficialsDocument::Wrapped { officials } => officials,
        }
    }
}

// ============================================================================
// LOADERS
// ============================================================================

/// Parse the legislator disclosure document
pub fn parse_assembly(json: &str) -> Result<Vec<DisclosureRecord>> {
    serde_json::from_str(json).context("Failed to parse assembly disclosure JSON")
}

/// Parse the officials disclosure document (bare array or `{ officials }`)
pub fn parse_officials(json: &str) -> Result<Vec<DisclosureRecord>> {
    let document: OfficialsDocument =
        serde_json::from_str(json).context("Failed to parse officials disclosure JSON")?;
    Ok(document.into_records())
}

pub fn load_assembly<P: AsRef<Path>>(path: P) -> Result<Vec<DisclosureRecord>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read assembly file: {:?}", path.as_ref()))?;
    parse_assembly(&content)
}

pub fn load_officials<P: AsRef<Path>>(path: P) -> Result<Vec<DisclosureRecord>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read officials file: {:?}", path.as_ref()))?;
    parse_officials(&content)
}

/// Swallow a load failure: report it once and carry on with nothing
pub fn or_empty<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => {
            info!(source = what, count = rows.len(), "loaded");
            rows
        }
        Err(e) => {
            warn!(source = what, error = %format!("{:#}", e), "load failed, using empty set");
            Vec::new()
        }
    }
}

// ============================================================================
// DATA SOURCES
// ============================================================================

/// Everything the aggregator needs, already normalized
#[derive(Debug, Clone, Default)]
pub struct DataSources {
    pub assembly: Vec<DisclosureRecord>,
    pub officials: Vec<DisclosureRecord>,
    pub profiles: Vec<ProfileRow>,
}

impl DataSources {
    /// Load all three documents. Missing or broken files degrade to empty lists.
    pub fn load(config: &Config) -> Self {
        DataSources {
            assembly: or_empty("assembly", load_assembly(config.assembly_path())),
            officials: or_empty("officials", load_officials(config.officials_path())),
            profiles: or_empty("profiles", crate::profiles::load_profiles(config.profiles_path())),
        }
    }

    pub fn records(&self, population: Population) -> &[DisclosureRecord] {
        match population {
            Population::Assembly => &self.assembly,
            Population::Government => &self.officials,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assembly.is_empty() && self.officials.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_item_with_missing_and_null_fields() {
        let json = r#"[{"name":"홍길동","assets":[
            {"relationship":"본인","type":null,"description":"서울 강남구 아파트","current_value":1200},
            {"type":"예금","previous_value":10,"increase":5,"unexpected":"ignored"}
        ]}]"#;

        let records = parse_assembly(json).unwrap();
        assert_eq!(records.len(), 1);

        let items = &records[0].assets;
        assert_eq!(items[0].item_type, "");
        assert_eq!(items[0].previous_value, 0);
        assert_eq!(items[0].current_value, 1200);
        assert_eq!(items[0].increase, None);

        assert_eq!(items[1].relationship, "");
        assert_eq!(items[1].increase, Some(5));
        assert_eq!(items[1].decrease, None);
    }

    #[test]
    fn test_officials_bare_array_and_wrapped_shapes() {
        let bare = r#"[{"name":"김공직","affiliation":"기획재정부","assets":[]}]"#;
        let wrapped = r#"{"officials":[{"name":"김공직","affiliation":"기획재정부","assets":[]}]}"#;

        let a = parse_officials(bare).unwrap();
        let b = parse_officials(wrapped).unwrap();

        assert_eq!(a, b);
        assert_eq!(a[0].affiliation.as_deref(), Some("기획재정부"));
    }

    #[test]
    fn test_wrapped_without_officials_key_is_empty() {
        let records = parse_officials(r#"{"generated":"2025-03-27"}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_display_reason_hides_no_change() {
        let mut item = RawLineItem::default();
        assert_eq!(item.display_reason(), None);

        item.reason = NO_CHANGE_REASON.to_string();
        assert_eq!(item.display_reason(), None);

        item.reason = "매도".to_string();
        assert_eq!(item.display_reason(), Some("매도"));
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let rows = or_empty("assembly", load_assembly("/definitely/not/here.json"));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name":"이몽룡","assets":[{{"type":"현금","current_value":50}}]}}]"#).unwrap();

        let records = load_assembly(file.path()).unwrap();
        assert_eq!(records[0].name, "이몽룡");
        assert_eq!(records[0].assets[0].current_value, 50);
    }

    #[test]
    fn test_population_parse() {
        assert_eq!(Population::parse("government"), Some(Population::Government));
        assert_eq!(Population::parse("Assembly"), Some(Population::Assembly));
        assert_eq!(Population::parse("senate"), None);
        assert_eq!(Population::Assembly.toggle(), Population::Government);
    }
}
