//! Application record types.
//!
//! An [`ApplicationRecord`] is one accelerator application tracked through the
//! pipeline. Records are persisted as a JSON array whose key names predate this
//! crate (`business-name`, `revenue_model`, ...), so the serde attributes here
//! are the wire format and must not drift.
//!
//! `status` and `stage` are free text on disk. Five statuses and four stages
//! drive behavior; anything else is carried through untouched as
//! [`Status::Other`] / [`Stage::Other`] so a load/save cycle never loses data.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Value;

/// Unique, immutable record identifier (epoch millis at submission time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(RecordId)
    }
}

// Older exports wrote ids as strings or floats; accept any integral form.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Int(v) => Ok(RecordId(v)),
            RawId::Float(v) if v.fract() == 0.0 && v.is_finite() => Ok(RecordId(v as i64)),
            RawId::Float(v) => Err(D::Error::custom(format!("non-integer record id {v}"))),
            RawId::Text(s) => s
                .parse::<RecordId>()
                .map_err(|e| D::Error::custom(format!("invalid record id {s:?}: {e}"))),
        }
    }
}

/// Pipeline column a record sits in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    New,
    Review,
    Interview,
    Accepted,
    Archived,
    /// Unrecognized status read from storage. Never rendered in a column.
    Other(String),
}

impl Status {
    /// Fixed display order of the board columns.
    pub const COLUMNS: [Status; 5] = [
        Status::New,
        Status::Review,
        Status::Interview,
        Status::Accepted,
        Status::Archived,
    ];

    /// Persisted key (`"New"`, `"Review"`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Status::New => "New",
            Status::Review => "Review",
            Status::Interview => "Interview",
            Status::Accepted => "Accepted",
            Status::Archived => "Archived",
            Status::Other(raw) => raw,
        }
    }

    /// Column header label, `None` for statuses outside the board.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Status::New => Some("Inbox"),
            Status::Review => Some("In Review"),
            Status::Interview => Some("Interview"),
            Status::Accepted => Some("Accepted"),
            Status::Archived => Some("Archived"),
            Status::Other(_) => None,
        }
    }

    pub fn is_column(&self) -> bool {
        !matches!(self, Status::Other(_))
    }

    /// Position in [`Status::COLUMNS`].
    pub fn column_index(&self) -> Option<usize> {
        Status::COLUMNS.iter().position(|s| s == self)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Other(String::new())
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "New" => Status::New,
            "Review" => Status::Review,
            "Interview" => Status::Interview,
            "Accepted" => Status::Accepted,
            "Archived" => Status::Archived,
            _ => Status::Other(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when user input names no board column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status {input:?} (expected one of New, Review, Interview, Accepted, Archived)")]
pub struct UnknownStatus {
    pub input: String,
}

/// Strict parse used for user input: accepts a column key or its label,
/// case-insensitively. Unlike `From<String>`, never yields `Other`.
impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Status::COLUMNS
            .iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(needle)
                    || status
                        .label()
                        .is_some_and(|label| label.eq_ignore_ascii_case(needle))
            })
            .cloned()
            .ok_or_else(|| UnknownStatus {
                input: s.to_string(),
            })
    }
}

/// Company stage as entered on the application form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    Draft,
    Mvp,
    Revenue,
    Scaling,
    Other(String),
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Draft => "draft",
            Stage::Mvp => "mvp",
            Stage::Revenue => "revenue",
            Stage::Scaling => "scaling",
            Stage::Other(raw) => raw,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Other(String::new())
    }
}

// Matching is exact: "Scaling" is not "scaling".
impl From<String> for Stage {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "draft" => Stage::Draft,
            "mvp" => Stage::Mvp,
            "revenue" => Stage::Revenue,
            "scaling" => Stage::Scaling,
            _ => Stage::Other(raw),
        }
    }
}

impl From<&str> for Stage {
    fn from(raw: &str) -> Self {
        Stage::from(raw.to_string())
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted application.
///
/// Immutable after creation except `status` and `notes`. Keys this type does
/// not model are kept in `extra` so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: RecordId,

    /// Founder name.
    #[serde(default)]
    pub name: String,

    #[serde(
        rename = "business-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub business_name: Option<String>,

    #[serde(default)]
    pub stage: Stage,

    /// Free-text pitch.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: Status,

    /// Creation date, display only.
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitors: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ApplicationRecord {
    /// Minimal record with every optional answer absent.
    pub fn new(id: RecordId, name: impl Into<String>, stage: Stage, status: Status) -> Self {
        Self {
            id,
            name: name.into(),
            business_name: None,
            stage,
            description: String::new(),
            status,
            date: String::new(),
            notes: String::new(),
            email: None,
            phone: None,
            customers: None,
            revenue_model: None,
            competitors: None,
            funding: None,
            extra: BTreeMap::new(),
        }
    }

    /// Business name when one was given, `None` for absent or blank.
    pub fn business_name(&self) -> Option<&str> {
        self.business_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Card title: the business name, falling back to the founder.
    pub fn display_title(&self) -> &str {
        self.business_name().unwrap_or(&self.name)
    }

    /// Revenue model answer, empty when absent.
    pub fn revenue_model(&self) -> &str {
        self.revenue_model.as_deref().unwrap_or_default()
    }
}

/// Renders an optional answer for display.
pub fn answer_or_na(answer: Option<&str>) -> &str {
    match answer {
        Some(text) if !text.trim().is_empty() => text,
        _ => "N/A",
    }
}
