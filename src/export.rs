// 📤 Export - ranking as CSV

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::money::format_money;
use crate::ranking::RankedMember;
use crate::rules::Bucket;

/// One CSV line per ranked person. Amounts in thousands of won.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    rank: usize,
    name: &'a str,
    population: &'a str,
    affiliation: &'a str,
    secondary: &'a str,
    net_worth: i64,
    net_worth_display: String,
    change_amount: i64,
    change_rate_percent: String,
    real_estate: i64,
    financial: i64,
    virtual_asset: i64,
    vehicle: i64,
    other: i64,
    debt: i64,
}

impl<'a> From<&'a RankedMember> for ExportRow<'a> {
    fn from(member: &'a RankedMember) -> Self {
        let s = &member.summary;
        let b = &s.breakdown;
        ExportRow {
            rank: member.rank,
            name: &s.name,
            population: s.population.as_str(),
            affiliation: &s.affiliation_label,
            secondary: &s.secondary_label,
            net_worth: b.net_worth,
            net_worth_display: format_money(b.net_worth),
            change_amount: b.change_amount,
            change_rate_percent: format!("{:.1}", b.change_rate_percent),
            real_estate: b.total(Bucket::RealEstate),
            financial: b.total(Bucket::Financial),
            virtual_asset: b.total(Bucket::VirtualAsset),
            vehicle: b.total(Bucket::Vehicle),
            other: b.total(Bucket::Other),
            debt: b.total(Bucket::Debt),
        }
    }
}

pub fn write_csv<W: Write>(writer: W, members: &[RankedMember]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for member in members {
        wtr.serialize(ExportRow::from(member))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(path: P, members: &[RankedMember]) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())
        .with_context(|| format!("Failed to create export file: {:?}", path.as_ref()))?;
    write_csv(file, members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disclosure::{DataSources, DisclosureRecord, Population, RawLineItem};
    use crate::ranking::rank;
    use crate::rules::RuleEngine;

    #[test]
    fn test_csv_header_and_rows() {
        let sources = DataSources {
            assembly: vec![DisclosureRecord {
                name: "안철수".to_string(),
                affiliation: None,
                assets: vec![
                    RawLineItem { item_type: "예금".to_string(), current_value: 1234567, ..Default::default() },
                    RawLineItem { item_type: "채무".to_string(), current_value: 567, ..Default::default() },
                ],
            }],
            ..Default::default()
        };
        let ranked = rank(Population::Assembly, &sources, &RuleEngine::with_defaults());

        let mut out = Vec::new();
        write_csv(&mut out, &ranked).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rank,name,population,affiliation"));
        assert!(lines[1].starts_with("1,안철수,assembly,무소속,비례/정보없음,1234000,12억 3400만원"));
        assert!(lines[1].ends_with(",567"));
    }
}
