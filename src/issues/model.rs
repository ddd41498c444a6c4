//! Issue data model types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored issue. The JSON field name for the id is `_id`, matching the
/// wire contract of the REST API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssueRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    /// RFC 3339 UTC timestamp, set once at creation.
    pub created_on: String,
    /// RFC 3339 UTC timestamp, reset on every successful update.
    pub updated_on: String,
}

/// Fields required to create an issue. The required fields are validated
/// (present and non-empty) before this struct is built; the optional ones
/// default to the empty string.
#[derive(Debug, Clone)]
pub struct CreateIssueParams {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

/// Partial update set: only `Some` fields are written. `updated_on` is
/// always stamped by the storage layer when the update is applied.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueUpdate {
    /// True when no mutable field was provided.
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

/// Exact-match list filters. Every field is optional; provided filters are
/// applied conjunctively, on top of the mandatory project constraint.
/// Unknown query keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueFilter {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    #[serde(deserialize_with = "de_open_flag")]
    pub open: Option<bool>,
}

/// Structural validity check for issue ids (UUIDs minted on insert).
pub fn valid_issue_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Deserialize an `open` flag that may arrive as a JSON boolean or as a
/// string. The string `"true"` is true; any other string (including
/// `"false"`) is false. Query-string values always take the string path.
pub fn de_open_flag<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct OpenFlag;

    impl serde::de::Visitor<'_> for OpenFlag {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a boolean or a string")
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(v == "true")
        }
    }

    de.deserialize_any(OpenFlag).map(Some)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
