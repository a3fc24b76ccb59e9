use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use serde_json::Value;

use super::lenient::{self, fold_legacy_keys, LegacyKeys, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SponsorshipStatus {
    Completed,
    #[default]
    Pending,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsorshipItem {
    pub name: String,
    #[serde(default = "one", deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub unit_price: Option<f64>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct Sponsorship {
    pub sponsor_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub rate_used: Option<f64>,
    pub items: Vec<SponsorshipItem>,
    pub boy_id: Option<String>,
    pub status: SponsorshipStatus,
}

/// Older sponsorship forms and documents use camelCase names.
pub const LEGACY_KEYS: LegacyKeys = &[
    ("sponsorName", "sponsor_name"),
    ("rateUsed", "rate_used"),
    ("boyId", "boy_id"),
];

pub const ITEM_LEGACY_KEYS: LegacyKeys = &[("item", "name"), ("unitPrice", "unit_price")];

/// Fold legacy keys of a sponsorship body and of each of its items.
pub fn fold_request_keys(body: &mut Value) {
    let Value::Object(fields) = body else {
        return;
    };
    fold_legacy_keys(fields, LEGACY_KEYS);
    if let Some(Value::Array(items)) = fields.get_mut("items") {
        for item in items.iter_mut() {
            if let Value::Object(item) = item {
                fold_legacy_keys(item, ITEM_LEGACY_KEYS);
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSponsorshipRequest {
    pub sponsor_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: f64,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub rate_used: Option<f64>,
    #[serde(default)]
    pub items: Vec<SponsorshipItem>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub boy_id: Option<String>,
    pub status: Option<SponsorshipStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorshipItemRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default = "one", deserialize_with = "lenient::quantity")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorshipRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub sponsor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::records")]
    pub items: Vec<SponsorshipItemRecord>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for SponsorshipItemRecord {
    const LEGACY_KEYS: LegacyKeys = ITEM_LEGACY_KEYS;
}

impl Record for SponsorshipRecord {
    const LEGACY_KEYS: LegacyKeys = LEGACY_KEYS;
}
