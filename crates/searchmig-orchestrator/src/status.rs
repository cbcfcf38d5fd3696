//! Status snapshots for operator listings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use searchmig_types::{IndexVersion, VersionStatus};

/// One version row in a status listing.
#[derive(Debug, Clone, Serialize)]
pub struct VersionRow {
    pub number: u32,
    pub status: VersionStatus,
    pub active: bool,
    pub doc_count: u64,
    pub fingerprint: String,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub cursor: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl From<IndexVersion> for VersionRow {
    fn from(version: IndexVersion) -> Self {
        Self {
            number: version.number,
            status: version.status,
            active: version.active,
            doc_count: version.doc_count,
            fingerprint: version.fingerprint.short().to_string(),
            cursor: version.cursor,
            created_at: version.created_at,
        }
    }
}

/// Status of one logical index and all of its versions, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub name: String,
    pub versions: Vec<VersionRow>,
}

impl IndexStatus {
    /// The version reads currently resolve to, if any.
    pub fn active(&self) -> Option<&VersionRow> {
        self.versions.iter().find(|v| v.active)
    }

    /// The newest non-retired version, if any.
    pub fn latest(&self) -> Option<&VersionRow> {
        self.versions.iter().rev().find(|v| v.status != VersionStatus::Retired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchmig_types::SchemaDefinition;

    fn row(number: u32, status: VersionStatus, active: bool) -> VersionRow {
        let mut version = IndexVersion::new(
            "courses",
            number,
            SchemaDefinition::empty().fingerprint(),
        );
        version.status = status;
        version.active = active;
        VersionRow::from(version)
    }

    #[test]
    fn test_active_and_latest() {
        let status = IndexStatus {
            name: "courses".to_string(),
            versions: vec![
                row(1, VersionStatus::Retired, false),
                row(2, VersionStatus::Live, true),
                row(3, VersionStatus::Created, false),
            ],
        };

        assert_eq!(status.active().unwrap().number, 2);
        assert_eq!(status.latest().unwrap().number, 3);
    }

    #[test]
    fn test_all_retired() {
        let status = IndexStatus {
            name: "courses".to_string(),
            versions: vec![row(1, VersionStatus::Retired, false)],
        };

        assert!(status.active().is_none());
        assert!(status.latest().is_none());
    }

    #[test]
    fn test_row_carries_short_fingerprint() {
        let row = row(1, VersionStatus::Created, false);
        assert_eq!(row.fingerprint.len(), 12);
    }
}
