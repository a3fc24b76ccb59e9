use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient::{self, LegacyKeys, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgramTrack {
    Skills,
    Education,
    Sports,
}

impl ProgramTrack {
    pub const ALL: [ProgramTrack; 3] = [
        ProgramTrack::Skills,
        ProgramTrack::Education,
        ProgramTrack::Sports,
    ];
}

impl std::fmt::Display for ProgramTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProgramTrack::Skills => "skills",
            ProgramTrack::Education => "education",
            ProgramTrack::Sports => "sports",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ProgramTrack {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skills" => Ok(ProgramTrack::Skills),
            "education" => Ok(ProgramTrack::Education),
            "sports" => Ok(ProgramTrack::Sports),
            _ => Err(anyhow::anyhow!("Unknown program track: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoyStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Physical,
    Cognitive,
}

/// Stored shape of an enrolled boy (identifier and timestamps are added by the store).
#[derive(Debug, Clone, Serialize)]
pub struct Boy {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub age_at_enrolment: u32,
    pub program_track: ProgramTrack,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub guardian_relationship: Option<String>,
    pub guardian_address: Option<String>,
    pub guardian_signature: String,
    pub consent_form_signed: bool,
    pub enrollment_date: NaiveDate,
    pub background: Option<String>,
    pub goals: Option<String>,
    pub notes: Option<String>,
    pub sponsor_name: Option<String>,
    pub status: BoyStatus,
    pub profile_photo: Option<String>,
    pub assessments: Vec<Value>,
    pub sessions: Vec<Value>,
    pub media: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBoyRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub program_track: ProgramTrack,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub guardian_relationship: Option<String>,
    pub guardian_address: Option<String>,
    /// Base64 data URI or an already hosted URL.
    pub guardian_signature: String,
    pub enrollment_date: Option<NaiveDate>,
    pub background: Option<String>,
    pub goals: Option<String>,
    pub notes: Option<String>,
    pub sponsor_name: Option<String>,
    pub status: Option<BoyStatus>,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssessmentRequest {
    pub kind: AssessmentKind,
    pub assessed_on: Option<NaiveDate>,
    pub assessor: Option<String>,
    #[serde(default)]
    pub scores: Map<String, Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub id: String,
    pub kind: AssessmentKind,
    pub assessed_on: NaiveDate,
    pub assessor: Option<String>,
    pub scores: Map<String, Value>,
    pub notes: Option<String>,
    pub recorded_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub title: String,
    pub session_date: Option<NaiveDate>,
    pub duration_minutes: Option<u32>,
    pub facilitator: Option<String>,
    pub attended: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub session_date: NaiveDate,
    pub duration_minutes: Option<u32>,
    pub facilitator: Option<String>,
    pub attended: bool,
    pub notes: Option<String>,
    pub recorded_at: String,
}

/// Read-side view used by reporting. Older documents carry `fullName` instead
/// of the split name fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoyRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub program_track: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for BoyRecord {
    const LEGACY_KEYS: LegacyKeys = &[("fullName", "full_name")];
}

impl BoyRecord {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.full_name.clone().unwrap_or_default(),
        }
    }
}
