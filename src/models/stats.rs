use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary consumed by the admin dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub totals: Totals,
    pub donations_by_program: ProgramBreakdown,
    pub boys_by_program: ProgramCounts,
    pub top_donors: Vec<LeaderboardEntry>,
    pub top_sponsors: Vec<LeaderboardEntry>,
    pub hall_of_fame: Vec<HallOfFameEntry>,
    pub longest_serving_volunteers: Vec<ServingVolunteer>,
    pub item_sponsorships: Vec<ItemCount>,
    pub quarterly_donations: Vec<PeriodTotal>,
    pub yearly_donations: Vec<PeriodTotal>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_donations: f64,
    pub donation_count: usize,
    pub total_volunteers: usize,
    pub total_sponsors: usize,
    pub total_boys: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ProgramBreakdown {
    pub skills: f64,
    pub education: f64,
    pub sports: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ProgramCounts {
    pub skills: usize,
    pub education: usize,
    pub sports: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SupporterKind {
    Donor,
    Sponsor,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HallOfFameEntry {
    pub name: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: SupporterKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServingVolunteer {
    pub id: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemCount {
    pub item: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodTotal {
    pub period: String,
    pub amount: f64,
    pub count: usize,
}
