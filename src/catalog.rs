use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::parser::classify::ProposalType;

/// One catalogued proposal. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    #[serde(rename = "JVET number")]
    pub jvet_number: String,
    #[serde(rename = "MPEG number")]
    pub mpeg_number: String,
    #[serde(rename = "Created")]
    pub created: String,
    #[serde(rename = "First upload")]
    pub first_upload: String,
    #[serde(rename = "Last upload")]
    pub last_upload: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Download Link")]
    pub download_link: String,
    #[serde(rename = "Type")]
    pub category: ProposalType,
}

impl ProposalRecord {
    /// Case-insensitive substring match on title or JVET number.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.jvet_number.to_lowercase().contains(needle)
    }
}

/// The on-disk proposal catalog: a CSV snapshot replaced wholesale on every harvest.
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the catalog with `records`. Written to a sibling temp file first,
    /// then renamed over the old snapshot.
    pub fn save(&self, records: &[ProposalRecord]) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        let mut writer = csv::Writer::from_path(&tmp)?;
        if records.is_empty() {
            // serde-driven headers are only emitted alongside the first row
            writer.write_record(HEADER)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &self.path)?;

        info!("Wrote {} proposals to {}", records.len(), self.path.display());
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<ProposalRecord>, CatalogError> {
        if !self.path.is_file() {
            return Err(CatalogError::NotFound(self.path.clone()));
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ProposalRecord>, _>>()?;
        debug!("Loaded {} proposals from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Records whose title or JVET number contains `keyword`, ignoring case,
    /// in catalog order. An empty keyword matches everything.
    pub fn query(&self, keyword: &str) -> Result<Vec<ProposalRecord>, CatalogError> {
        let needle = keyword.to_lowercase();
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.matches(&needle))
            .collect())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

pub const HEADER: [&str; 9] = [
    "JVET number",
    "MPEG number",
    "Created",
    "First upload",
    "Last upload",
    "Title",
    "Source",
    "Download Link",
    "Type",
];

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(jvet: &str, title: &str, category: ProposalType) -> ProposalRecord {
        ProposalRecord {
            jvet_number: jvet.to_string(),
            mpeg_number: format!("m{}", jvet.len()),
            created: "2024-01-10 09:00:00".into(),
            first_upload: "2024-01-11 10:00:00".into(),
            last_upload: "2024-01-12 11:00:00".into(),
            title: title.to_string(),
            source: "Org A, Org B".into(),
            download_link: format!("https://jvet-experts.org/doc_end_user/documents/{}.zip", jvet),
            category,
        }
    }

    fn sample() -> Vec<ProposalRecord> {
        vec![
            record("JVET-A0001", "EE1-1: Neural \"loop\" filter", ProposalType::Experiment),
            record("JVET-A0002", "AHG9: SEI messages", ProposalType::AdHocGroup),
            record("JVET-B0100", "Crosscheck of JVET-A0001", ProposalType::CrossCheck),
            record("JVET-B0101", "Intra prediction, multi-line", ProposalType::General),
        ]
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("nested/data/proposals.csv"));
        catalog.save(&sample()).unwrap();
        assert_eq!(catalog.load_all().unwrap(), sample());
    }

    #[test]
    fn header_and_type_column() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("proposals.csv"));
        catalog.save(&sample()).unwrap();
        let text = fs::read_to_string(catalog.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), HEADER.join(","));
        assert!(lines.next().unwrap().ends_with(",1"));
        assert!(!dir.path().join("proposals.csv.tmp").exists());
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("proposals.csv"));
        catalog.save(&sample()).unwrap();
        catalog.save(&sample()[..1]).unwrap();
        assert_eq!(catalog.load_all().unwrap().len(), 1);
    }

    #[test]
    fn empty_catalog_keeps_header() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("proposals.csv"));
        catalog.save(&[]).unwrap();
        assert!(catalog.load_all().unwrap().is_empty());
        let text = fs::read_to_string(catalog.path()).unwrap();
        assert_eq!(text.trim_end(), HEADER.join(","));
    }

    #[test]
    fn query_matches_title_or_number_ignoring_case() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("proposals.csv"));
        catalog.save(&sample()).unwrap();

        let hits = catalog.query("ahg9").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].jvet_number, "JVET-A0002");

        // Number in one record, mentioned in another's title.
        let hits = catalog.query("jvet-a0001").unwrap();
        let numbers: Vec<_> = hits.iter().map(|r| r.jvet_number.as_str()).collect();
        assert_eq!(numbers, vec!["JVET-A0001", "JVET-B0100"]);

        assert!(catalog.query("no such thing").unwrap().is_empty());
    }

    #[test]
    fn empty_keyword_matches_everything() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("proposals.csv"));
        catalog.save(&sample()).unwrap();
        assert_eq!(catalog.query("").unwrap(), sample());
    }

    #[test]
    fn missing_catalog_is_distinct_from_no_matches() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("absent.csv"));
        assert!(matches!(catalog.query("x"), Err(CatalogError::NotFound(_))));
        assert!(matches!(catalog.load_all(), Err(CatalogError::NotFound(_))));
    }
}
