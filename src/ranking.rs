// 📊 Ranking - per-population net-worth ranking, search and person lookup

use serde::Serialize;

use crate::aggregation::PersonSummary;
use crate::disclosure::{DataSources, DisclosureRecord, Population};
use crate::profiles::{Labels, ProfileIndex};
use crate::rules::RuleEngine;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMember {
    /// 1-based position by net worth
    pub rank: usize,
    #[serde(flatten)]
    pub summary: PersonSummary,
}

fn labels_for(population: Population, record: &DisclosureRecord, profiles: &ProfileIndex) -> Labels {
    match population {
        Population::Assembly => Labels::for_member(profiles.get(&record.name)),
        Population::Government => Labels::for_official(record.affiliation.as_deref()),
    }
}

/// Summaries for one population, richest first
pub fn rank(population: Population, sources: &DataSources, engine: &RuleEngine) -> Vec<RankedMember> {
    let profiles = ProfileIndex::build(&sources.profiles);

    let mut summaries: Vec<PersonSummary> = sources
        .records(population)
        .iter()
        .map(|record| {
            PersonSummary::build(record, population, labels_for(population, record, &profiles), engine)
        })
        .collect();

    summaries.sort_by(|a, b| b.net_worth().cmp(&a.net_worth()));

    summaries
        .into_iter()
        .enumerate()
        .map(|(i, summary)| RankedMember { rank: i + 1, summary })
        .collect()
}

/// Does the member's name, party/affiliation or district/position contain `query`?
pub fn matches_query(member: &RankedMember, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let s = &member.summary;
    s.name.contains(query) || s.affiliation_label.contains(query) || s.secondary_label.contains(query)
}

/// Filter a ranking; ranks stay as computed on the full list
pub fn search<'a>(ranked: &'a [RankedMember], query: &str) -> Vec<&'a RankedMember> {
    ranked.iter().filter(|m| matches_query(m, query)).collect()
}

/// Find one person by exact name.
///
/// With a population hint only that population is searched; without one,
/// legislators are tried before officials. `None` is the "no data" state.
pub fn find_person(
    name: &str,
    hint: Option<Population>,
    sources: &DataSources,
    engine: &RuleEngine,
) -> Option<PersonSummary> {
    let order: &[Population] = match hint {
        Some(Population::Government) => &[Population::Government],
        Some(Population::Assembly) => &[Population::Assembly],
        None => &[Population::Assembly, Population::Government],
    };

    let profiles = ProfileIndex::build(&sources.profiles);

    order.iter().find_map(|population| {
        sources
            .records(*population)
            .iter()
            .find(|record| record.name == name)
            .map(|record| {
                PersonSummary::build(record, *population, labels_for(*population, record, &profiles), engine)
            })
    })
}

/// Accent color used for a member's party badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyColor {
    Red,
    Blue,
    DarkBlue,
    Orange,
    Indigo,
    Slate,
}

pub fn party_color(summary: &PersonSummary) -> PartyColor {
    if summary.is_government() {
        return PartyColor::Indigo;
    }
    let party = summary.affiliation_label.as_str();
    if party.contains("국민의힘") {
        PartyColor::Red
    } else if party.contains("민주당") {
        PartyColor::Blue
    } else if party.contains("조국") {
        PartyColor::DarkBlue
    } else if party.contains("개혁") {
        PartyColor::Orange
    } else {
        PartyColor::Slate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disclosure::RawLineItem;
    use crate::profiles::{ProfileRow, CURRENT_MEMBER_STATUS, DEFAULT_PARTY};

    fn record(name: &str, affiliation: Option<&str>, deposit: i64) -> DisclosureRecord {
        DisclosureRecord {
            name: name.to_string(),
            affiliation: affiliation.map(str::to_string),
            assets: vec![RawLineItem {
                item_type: "예금".to_string(),
                current_value: deposit,
                ..Default::default()
            }],
        }
    }

    fn sources() -> DataSources {
        DataSources {
            assembly: vec![
                record("박정", None, 300),
                record("안철수", None, 1000),
                record("동명이인", None, 5),
            ],
            officials: vec![
                record("김공직", Some("기획재정부"), 700),
                record("동명이인", Some("법무부"), 9),
            ],
            profiles: vec![ProfileRow {
                name: "박정".to_string(),
                party: Some("더불어민주당".to_string()),
                district: Some("경기 파주시을".to_string()),
                photo_url: None,
                status: CURRENT_MEMBER_STATUS.to_string(),
            }],
        }
    }

    #[test]
    fn test_rank_sorted_by_net_worth() {
        let ranked = rank(Population::Assembly, &sources(), &RuleEngine::with_defaults());

        let names: Vec<&str> = ranked.iter().map(|m| m.summary.name.as_str()).collect();
        assert_eq!(names, vec!["안철수", "박정", "동명이인"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert_eq!(ranked[0].summary.affiliation_label, DEFAULT_PARTY);
    }

    #[test]
    fn test_search_by_party_and_district() {
        let ranked = rank(Population::Assembly, &sources(), &RuleEngine::with_defaults());

        let hits = search(&ranked, "파주");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].summary.name, "박정");
        assert_eq!(hits[0].rank, 2);

        assert_eq!(search(&ranked, "민주당").len(), 1);
        assert_eq!(search(&ranked, "  ").len(), 3);
        assert!(search(&ranked, "없는사람").is_empty());
    }

    #[test]
    fn test_find_person_hint_order() {
        let engine = RuleEngine::with_defaults();
        let sources = sources();

        let default = find_person("동명이인", None, &sources, &engine).unwrap();
        assert_eq!(default.population, Population::Assembly);

        let gov = find_person("동명이인", Some(Population::Government), &sources, &engine).unwrap();
        assert_eq!(gov.affiliation_label, "법무부");
        assert_eq!(gov.net_worth(), 9);

        let fallback = find_person("김공직", None, &sources, &engine).unwrap();
        assert_eq!(fallback.population, Population::Government);

        assert!(find_person("김공직", Some(Population::Assembly), &sources, &engine).is_none());
        assert!(find_person("없는사람", None, &sources, &engine).is_none());
    }

    #[test]
    fn test_party_color() {
        let engine = RuleEngine::with_defaults();
        let sources = sources();

        let member = find_person("박정", None, &sources, &engine).unwrap();
        assert_eq!(party_color(&member), PartyColor::Blue);

        let official = find_person("김공직", None, &sources, &engine).unwrap();
        assert_eq!(party_color(&official), PartyColor::Indigo);
    }
}
