use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lenient::{self, LegacyKeys, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerCategory {
    Professional,
    #[default]
    Helper,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VolunteerStatus::Pending => "pending",
            VolunteerStatus::Approved => "approved",
            VolunteerStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for VolunteerStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VolunteerStatus::Pending),
            "approved" => Ok(VolunteerStatus::Approved),
            "rejected" => Ok(VolunteerStatus::Rejected),
            _ => Err(anyhow::anyhow!("Unknown volunteer status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Volunteer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: VolunteerCategory,
    pub status: VolunteerStatus,
    pub availability: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub profile_photo: Option<String>,
    /// Set when the application is approved.
    pub joined_at: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVolunteerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: Option<VolunteerCategory>,
    pub availability: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Base64 data URI or URL.
    pub profile_photo: Option<String>,
}

/// Older admin pages stored the join date as `joinDate`.
pub const LEGACY_KEYS: LegacyKeys = &[("joinDate", "joined_at")];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolunteerRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for VolunteerRecord {
    const LEGACY_KEYS: LegacyKeys = LEGACY_KEYS;
}

impl VolunteerRecord {
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Join date, falling back to the application date.
    pub fn joined(&self) -> Option<DateTime<Utc>> {
        self.joined_at.or(self.created_at)
    }
}
