//! Dashboard aggregation.
//!
//! Every call loads the full collections and reduces them in memory; nothing is
//! cached between calls.

use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use chrono::Datelike;

use crate::{
    models::{
        boy::{BoyRecord, ProgramTrack},
        donation::DonationRecord,
        lenient::Record,
        sponsorship::SponsorshipRecord,
        stats::{
            DashboardStats, HallOfFameEntry, ItemCount, LeaderboardEntry, PeriodTotal,
            ProgramBreakdown, ProgramCounts, ServingVolunteer, SupporterKind, Totals,
        },
        volunteer::VolunteerRecord,
    },
    store::{collections, RecordStore},
};

pub struct StatsService;

impl StatsService {
    /// Any collection failing to load aborts the whole summary.
    pub async fn dashboard(store: &dyn RecordStore, top_n: usize) -> anyhow::Result<DashboardStats> {
        let donations: Vec<DonationRecord> = load(store, collections::DONATIONS).await?;
        let volunteers: Vec<VolunteerRecord> = load(store, collections::VOLUNTEERS).await?;
        let sponsorships: Vec<SponsorshipRecord> = load(store, collections::SPONSORSHIPS).await?;
        let boys: Vec<BoyRecord> = load(store, collections::BOYS).await?;

        Ok(compute(&donations, &volunteers, &sponsorships, &boys, top_n))
    }
}

/// Only a failed fetch is an error; drifted documents read as partial records.
async fn load<T: Record>(store: &dyn RecordStore, collection: &str) -> anyhow::Result<Vec<T>> {
    let docs = store
        .get_records(collection, None)
        .await
        .with_context(|| format!("Failed to load {collection}"))?;
    Ok(docs.into_iter().map(T::from_document).collect())
}

pub fn compute(
    donations: &[DonationRecord],
    volunteers: &[VolunteerRecord],
    sponsorships: &[SponsorshipRecord],
    boys: &[BoyRecord],
    top_n: usize,
) -> DashboardStats {
    let totals = Totals {
        total_donations: donations.iter().map(|d| d.amount).sum(),
        donation_count: donations.len(),
        total_volunteers: volunteers.len(),
        total_sponsors: sponsorships.len(),
        total_boys: boys.len(),
    };

    let donors = aggregate(donations.iter().filter_map(donor_identity));
    let sponsors = aggregate(sponsorships.iter().filter_map(sponsor_identity));

    DashboardStats {
        totals,
        donations_by_program: donations_by_program(donations),
        boys_by_program: boys_by_program(boys),
        top_donors: top(donors.clone(), top_n),
        top_sponsors: top(sponsors.clone(), top_n),
        hall_of_fame: hall_of_fame(donors, sponsors, top_n),
        longest_serving_volunteers: longest_serving(volunteers, top_n),
        item_sponsorships: item_sponsorships(sponsorships),
        quarterly_donations: bucket(donations, |d| {
            let dt = d.created_at?;
            Some((dt.year(), dt.month0() / 3 + 1))
        })
        .into_iter()
        .map(|((year, quarter), (amount, count))| PeriodTotal {
            period: format!("{year}-Q{quarter}"),
            amount,
            count,
        })
        .collect(),
        yearly_donations: bucket(donations, |d| d.created_at.map(|dt| dt.year()))
            .into_iter()
            .map(|(year, (amount, count))| PeriodTotal {
                period: year.to_string(),
                amount,
                count,
            })
            .collect(),
    }
}

fn donations_by_program(donations: &[DonationRecord]) -> ProgramBreakdown {
    let mut out = ProgramBreakdown::default();
    for d in donations {
        match d.program.as_deref().and_then(|p| p.parse().ok()) {
            Some(ProgramTrack::Skills) => out.skills += d.amount,
            Some(ProgramTrack::Education) => out.education += d.amount,
            Some(ProgramTrack::Sports) => out.sports += d.amount,
            None => {}
        }
    }
    out
}

fn boys_by_program(boys: &[BoyRecord]) -> ProgramCounts {
    let mut out = ProgramCounts::default();
    for b in boys {
        match b.program_track.as_deref().and_then(|p| p.parse().ok()) {
            Some(ProgramTrack::Skills) => out.skills += 1,
            Some(ProgramTrack::Education) => out.education += 1,
            Some(ProgramTrack::Sports) => out.sports += 1,
            None => {}
        }
    }
    out
}

/// (identity key, display name, amount). Anonymous gifts have no identity.
fn donor_identity(d: &DonationRecord) -> Option<(String, String, f64)> {
    if d.anonymous {
        return None;
    }
    let name = d.donor_name.clone().or_else(|| d.email.clone())?;
    let key = d.email.as_deref().unwrap_or(name.as_str()).to_lowercase();
    Some((key, name, d.amount))
}

fn sponsor_identity(s: &SponsorshipRecord) -> Option<(String, String, f64)> {
    let name = s
        .sponsor_name
        .clone()
        .or_else(|| s.company.clone())
        .or_else(|| s.email.clone())?;
    let key = s.email.as_deref().unwrap_or(name.as_str()).to_lowercase();
    Some((key, name, s.amount))
}

/// Sum amounts per identity, keeping first-appearance order.
fn aggregate(entries: impl Iterator<Item = (String, String, f64)>) -> Vec<LeaderboardEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<LeaderboardEntry> = Vec::new();
    for (key, name, amount) in entries {
        match index.get(&key) {
            Some(&i) => {
                out[i].amount += amount;
                out[i].count += 1;
            }
            None => {
                index.insert(key, out.len());
                out.push(LeaderboardEntry { name, amount, count: 1 });
            }
        }
    }
    out
}

/// Descending by amount; `sort_by` is stable so ties keep their order.
fn top(mut entries: Vec<LeaderboardEntry>, n: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    entries.truncate(n);
    entries
}

fn hall_of_fame(
    donors: Vec<LeaderboardEntry>,
    sponsors: Vec<LeaderboardEntry>,
    n: usize,
) -> Vec<HallOfFameEntry> {
    let mut merged: Vec<HallOfFameEntry> = donors
        .into_iter()
        .map(|e| HallOfFameEntry { name: e.name, amount: e.amount, kind: SupporterKind::Donor })
        .chain(sponsors.into_iter().map(|e| HallOfFameEntry {
            name: e.name,
            amount: e.amount,
            kind: SupporterKind::Sponsor,
        }))
        .collect();
    merged.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    merged.truncate(n);
    merged
}

fn longest_serving(volunteers: &[VolunteerRecord], n: usize) -> Vec<ServingVolunteer> {
    let mut serving: Vec<ServingVolunteer> = volunteers
        .iter()
        .filter(|v| v.status.as_deref() == Some("approved"))
        .filter_map(|v| {
            Some(ServingVolunteer {
                id: v.id.clone(),
                name: v.display_name(),
                category: v.category.clone(),
                joined_at: v.joined()?,
            })
        })
        .collect();
    serving.sort_by_key(|v| v.joined_at);
    serving.truncate(n);
    serving
}

fn item_sponsorships(sponsorships: &[SponsorshipRecord]) -> Vec<ItemCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ItemCount> = Vec::new();
    for item in sponsorships.iter().flat_map(|s| s.items.iter()) {
        let Some(name) = &item.name else { continue };
        match index.get(name) {
            Some(&i) => out[i].quantity += u64::from(item.quantity),
            None => {
                index.insert(name.clone(), out.len());
                out.push(ItemCount { item: name.clone(), quantity: u64::from(item.quantity) });
            }
        }
    }
    out.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    out
}

/// Chronological buckets of (amount, count). Donations without a timestamp are skipped.
fn bucket<K: Ord>(
    donations: &[DonationRecord],
    key: impl Fn(&DonationRecord) -> Option<K>,
) -> BTreeMap<K, (f64, usize)> {
    let mut out: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for d in donations {
        if let Some(k) = key(d) {
            let entry = out.entry(k).or_insert((0.0, 0));
            entry.0 += d.amount;
            entry.1 += 1;
        }
    }
    out
}
