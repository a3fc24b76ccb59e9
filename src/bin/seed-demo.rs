//! Demo data seed script
//!
//! Fills the configured record store with boys, volunteers, donations and
//! sponsorships, then prints the dashboard totals computed over them.
//!
//! Usage:
//!   DATABASE_URL=... ./seed-demo --boys 12 --donations 40
//!   ./seed-demo --memory            # dry run against an in-process store

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde_json::json;

use taetae_api::{
    db,
    models::volunteer::VolunteerStatus,
    services::{
        boys::BoyService, donations::DonationService, sponsorships::SponsorshipService,
        stats::StatsService, volunteers::VolunteerService,
    },
    store::{MemoryRecordStore, PgRecordStore, RecordStore},
};

const FIRST_NAMES: [&str; 10] = [
    "Ade", "Chidi", "Emeka", "Musa", "Tunde", "Ibrahim", "Femi", "Obinna", "Segun", "Kunle",
];
const LAST_NAMES: [&str; 8] = [
    "Lagos", "Okafor", "Bello", "Adeyemi", "Eze", "Balogun", "Okonkwo", "Danjuma",
];
const PROGRAMS: [&str; 3] = ["skills", "education", "sports"];
const ITEMS: [&str; 5] = ["Football boots", "School bag", "Jersey", "Textbooks", "Water bottle"];
// 1x1 transparent PNG
const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed demo data into the TaeTae record store")]
struct Args {
    /// Seed an in-memory store instead of DATABASE_URL (nothing is persisted)
    #[arg(long)]
    memory: bool,
    #[arg(long, default_value_t = 12)]
    boys: usize,
    #[arg(long, default_value_t = 8)]
    volunteers: usize,
    #[arg(long, default_value_t = 40)]
    donations: usize,
    #[arg(long, default_value_t = 6)]
    sponsorships: usize,
    /// RNG seed, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let store: Arc<dyn RecordStore> = if args.memory {
        Arc::new(MemoryRecordStore::new())
    } else {
        let url = std::env::var("DATABASE_URL").context("DATABASE_URL required (or pass --memory)")?;
        let pool = db::create_pool(&url).await.context("Failed to connect to database")?;
        db::provision_records_table(&pool).await?;
        Arc::new(PgRecordStore::new(pool))
    };
    let store = store.as_ref();

    let currency = std::env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "NGN".to_string());
    let today = Utc::now().date_naive();

    println!("=== Seed Demo Data ===");

    println!("Enrolling {} boys...", args.boys);
    for _ in 0..args.boys {
        let dob = today - Duration::days(rng.gen_range(8 * 365..16 * 365));
        let req = serde_json::from_value(json!({
            "first_name": pick(&mut rng, &FIRST_NAMES),
            "last_name": pick(&mut rng, &LAST_NAMES),
            "date_of_birth": dob,
            "program_track": pick(&mut rng, &PROGRAMS),
            "guardian_name": format!("Mrs {}", pick(&mut rng, &LAST_NAMES)),
            "guardian_phone": format!("+23480{:08}", rng.gen_range(0..100_000_000u32)),
            "guardian_signature": SIGNATURE,
            "enrollment_date": today - Duration::days(rng.gen_range(0..720)),
        }))?;
        if let Err(e) = BoyService::enroll(store, None, req, today).await {
            tracing::warn!("Skipped boy: {e}");
        }
    }

    println!("Registering {} volunteers...", args.volunteers);
    for i in 0..args.volunteers {
        let name = format!("{} {}", pick(&mut rng, &FIRST_NAMES), pick(&mut rng, &LAST_NAMES));
        let req = serde_json::from_value(json!({
            "name": name,
            "email": format!("volunteer{i}@example.org"),
            "category": if rng.gen_bool(0.4) { "professional" } else { "helper" },
            "skills": ["mentoring"],
        }))?;
        let doc = VolunteerService::apply(store, None, None, None, req).await?;
        if rng.gen_bool(0.6) {
            let id = doc["id"].as_str().unwrap_or_default().to_string();
            let joined = today - Duration::days(rng.gen_range(30..1500));
            let mut patch = serde_json::Map::new();
            patch.insert("status".into(), json!(VolunteerStatus::Approved));
            patch.insert("joined_at".into(), json!(joined));
            VolunteerService::update(store, None, &id, patch, today).await?;
        }
    }

    println!("Recording {} donations...", args.donations);
    let donors: Vec<String> = (0..args.donations.div_ceil(3).max(1))
        .map(|_| format!("{} {}", pick(&mut rng, &FIRST_NAMES), pick(&mut rng, &LAST_NAMES)))
        .collect();
    for _ in 0..args.donations {
        let anonymous = rng.gen_bool(0.15);
        let donor = donors.choose(&mut rng).cloned().unwrap_or_default();
        let email = format!("{}@example.org", donor.to_lowercase().replace(' ', "."));
        let req = serde_json::from_value(json!({
            "donor_name": donor,
            "email": email,
            "anonymous": anonymous,
            "program": pick(&mut rng, &PROGRAMS),
            "amount": (rng.gen_range(1_000..250_000) / 500 * 500) as f64,
            "currency": currency,
            "status": "completed",
        }))?;
        DonationService::record(store, None, &currency, req).await?;
    }

    println!("Recording {} sponsorships...", args.sponsorships);
    for i in 0..args.sponsorships {
        let items: Vec<_> = ITEMS
            .choose_multiple(&mut rng, 2)
            .map(|item| json!({ "name": item, "quantity": rng.gen_range(1..12) }))
            .collect();
        let req = serde_json::from_value(json!({
            "sponsor_name": format!("Sponsor {}", i + 1),
            "email": format!("sponsor{}@example.org", i + 1),
            "company": if i % 2 == 0 { Some("Acme Nigeria Ltd") } else { None },
            "amount": rng.gen_range(50_000..500_000) as f64,
            "currency": currency,
            "items": items,
        }))?;
        SponsorshipService::record(store, None, &currency, req).await?;
    }

    let stats = StatsService::dashboard(store, 5).await?;
    println!("=== Done ===");
    println!("  Boys:          {}", stats.totals.total_boys);
    println!("  Volunteers:    {}", stats.totals.total_volunteers);
    println!("  Sponsors:      {}", stats.totals.total_sponsors);
    println!(
        "  Donations:     {} totalling {:.2} {currency}",
        stats.totals.donation_count, stats.totals.total_donations
    );
    for donor in &stats.top_donors {
        println!("    {:<24} {:>12.2}", donor.name, donor.amount);
    }

    Ok(())
}
