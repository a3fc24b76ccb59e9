use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient::{self, LegacyKeys, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Completed,
    #[default]
    Pending,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Donation {
    pub donor_name: Option<String>,
    pub email: Option<String>,
    pub anonymous: bool,
    pub program: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub status: DonationStatus,
}

/// Older donation forms and documents use camelCase names.
pub const LEGACY_KEYS: LegacyKeys = &[
    ("donorName", "donor_name"),
    ("paymentMethod", "payment_method"),
    ("createdAt", "created_at"),
];

#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub donor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub anonymous: bool,
    pub program: String,
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: f64,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub status: Option<DonationStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub donor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub anonymous: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub program: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for DonationRecord {
    const LEGACY_KEYS: LegacyKeys = LEGACY_KEYS;
}
