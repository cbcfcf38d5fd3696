//! Audit records for operator actions.
//!
//! Every operator verb appends one `IndexAction` to a durable log before it
//! takes effect and finalizes it when the verb completes. Records are
//! append-only and keep the full command history per index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TypesError;

/// Kind of operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Register the index and materialize a version for the current schema
    Create,
    /// Reindex documents into a version
    Update,
    /// Point the logical name at a version
    Activate,
    /// Clear the active flag without retiring
    Deactivate,
    /// Empty a version's physical index, keeping the version usable
    Clear,
    /// Retire a version and delete its physical index
    Drop,
    /// Create-if-changed plus incremental update, fleet-wide
    Predeploy,
    /// Drop everything and rebuild from the current schema
    Reset,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Create => write!(f, "create"),
            ActionKind::Update => write!(f, "update"),
            ActionKind::Activate => write!(f, "activate"),
            ActionKind::Deactivate => write!(f, "deactivate"),
            ActionKind::Clear => write!(f, "clear"),
            ActionKind::Drop => write!(f, "drop"),
            ActionKind::Predeploy => write!(f, "predeploy"),
            ActionKind::Reset => write!(f, "reset"),
        }
    }
}

/// Outcome state of an action record.
///
/// Transitions exactly once from `Running` to a terminal state; the store
/// rejects a second finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// In progress (or interrupted by a crash)
    Running,
    /// Completed successfully
    Succeeded,
    /// Completed with an error
    Failed,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Running => write!(f, "running"),
            ActionStatus::Succeeded => write!(f, "succeeded"),
            ActionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// How a reindex pass selects documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Only documents changed since the version's cursor
    Incremental,
    /// The complete document set, ignoring the cursor
    Full,
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMode::Incremental => write!(f, "incremental"),
            UpdateMode::Full => write!(f, "full"),
        }
    }
}

/// Which version an operator verb targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The currently active version
    Active,
    /// The highest-numbered non-retired version
    Latest,
    /// An explicit version number
    Number(u32),
}

impl FromStr for VersionSelector {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(VersionSelector::Active),
            "latest" => Ok(VersionSelector::Latest),
            other => other
                .parse::<u32>()
                .map(VersionSelector::Number)
                .map_err(|_| TypesError::InvalidSelector(other.to_string())),
        }
    }
}

impl std::fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionSelector::Active => write!(f, "active"),
            VersionSelector::Latest => write!(f, "latest"),
            VersionSelector::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One durable audit record for an operator action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexAction {
    /// Store-assigned sequence, unique and ordered across all actions
    #[serde(default)]
    pub sequence: u64,

    /// Logical index the action targeted
    pub index_name: String,

    /// Version number the action resolved to, when known
    #[serde(default)]
    pub version_number: Option<u32>,

    /// What the operator asked for
    pub kind: ActionKind,

    /// Reindex mode, for update-style actions
    #[serde(default)]
    pub mode: Option<UpdateMode>,

    /// Current outcome state
    pub status: ActionStatus,

    /// When the action started
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    /// When the action reached a terminal state
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Failure detail when status is `Failed`
    #[serde(default)]
    pub error: Option<String>,

    /// Documents written by the action, for update-style actions
    #[serde(default)]
    pub docs_indexed: u64,
}

impl IndexAction {
    /// Start a new action record in the `Running` state.
    pub fn begin(index_name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            sequence: 0,
            index_name: index_name.into(),
            version_number: None,
            kind,
            mode: None,
            status: ActionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
            docs_indexed: 0,
        }
    }

    /// Attach the version number the action resolved to.
    pub fn with_version(mut self, number: u32) -> Self {
        self.version_number = Some(number);
        self
    }

    /// Attach the reindex mode.
    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Whether the record has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status != ActionStatus::Running
    }

    /// Serialize to JSON bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
