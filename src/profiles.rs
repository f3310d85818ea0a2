// 👤 Legislator Profiles - party, district and photo lookup
//
// members_info.json rows use the National Assembly open-API column names.
// Party and district arrive as slash-delimited history ("A당/B당"); the last
// segment is the current value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// STATUS_NM value for sitting members
pub const CURRENT_MEMBER_STATUS: &str = "현직의원";

pub const DEFAULT_PARTY: &str = "무소속";
pub const DEFAULT_DISTRICT: &str = "비례/정보없음";
pub const UNKNOWN_DISTRICT: &str = "정보없음";
pub const DEFAULT_AFFILIATION: &str = "정부";
pub const OFFICIAL_POSITION: &str = "공직자";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileRow {
    #[serde(rename = "NAAS_NM", default)]
    pub name: String,

    #[serde(rename = "PLPT_NM", default)]
    pub party: Option<String>,

    #[serde(rename = "ELECD_NM", default)]
    pub district: Option<String>,

    #[serde(rename = "NAAS_PIC", default)]
    pub photo_url: Option<String>,

    #[serde(rename = "STATUS_NM", default)]
    pub status: String,
}

impl ProfileRow {
    pub fn is_current(&self) -> bool {
        self.status == CURRENT_MEMBER_STATUS
    }
}

pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<ProfileRow>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read profiles file: {:?}", path.as_ref()))?;
    serde_json::from_str(&content).context("Failed to parse profiles JSON")
}

/// Last `/`-separated segment, trimmed
pub fn last_segment(value: &str) -> &str {
    value.rsplit('/').next().unwrap_or("").trim()
}

/// Display labels resolved for one person
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labels {
    pub affiliation: String,
    pub secondary: String,
    pub image_url: String,
}

impl Labels {
    /// Labels for a legislator, with or without a matching profile
    pub fn for_member(profile: Option<&ProfileRow>) -> Self {
        let party = match profile.and_then(|p| p.party.as_deref()).filter(|s| !s.is_empty()) {
            Some(raw) => non_empty_or(last_segment(raw), DEFAULT_PARTY),
            None => DEFAULT_PARTY.to_string(),
        };

        let district = match profile.and_then(|p| p.district.as_deref()).filter(|s| !s.is_empty()) {
            Some(raw) => non_empty_or(last_segment(raw), UNKNOWN_DISTRICT),
            None => DEFAULT_DISTRICT.to_string(),
        };

        Labels {
            affiliation: party,
            secondary: district,
            image_url: profile.and_then(|p| p.photo_url.clone()).unwrap_or_default(),
        }
    }

    /// Labels for a government official
    pub fn for_official(affiliation: Option<&str>) -> Self {
        let affiliation = affiliation.map(str::trim).filter(|s| !s.is_empty());
        Labels {
            affiliation: affiliation.unwrap_or(DEFAULT_AFFILIATION).to_string(),
            secondary: OFFICIAL_POSITION.to_string(),
            image_url: String::new(),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// PROFILE INDEX
// ============================================================================

/// Sitting members keyed by name
#[derive(Debug, Clone, Default)]
pub struct ProfileIndex {
    by_name: HashMap<String, ProfileRow>,
}

impl ProfileIndex {
    /// Index only current members; a later row with the same name wins
    pub fn build(rows: &[ProfileRow]) -> Self {
        let by_name = rows
            .iter()
            .filter(|p| p.is_current())
            .map(|p| (p.name.clone(), p.clone()))
            .collect();
        ProfileIndex { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&ProfileRow> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
