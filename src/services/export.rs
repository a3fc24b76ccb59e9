use chrono::Datelike;

use crate::{
    models::{donation::DonationRecord, lenient::Record},
    store::{collections, RecordStore},
};

const HEADER: [&str; 10] = [
    "id",
    "date",
    "donor_name",
    "email",
    "anonymous",
    "program",
    "amount",
    "currency",
    "payment_method",
    "status",
];

/// Donations as CSV, oldest first, optionally limited to one calendar year.
pub async fn donations_csv(store: &dyn RecordStore, year: Option<i32>) -> anyhow::Result<String> {
    let donations: Vec<DonationRecord> = store
        .get_records(collections::DONATIONS, None)
        .await?
        .into_iter()
        .map(DonationRecord::from_document)
        .filter(|d: &DonationRecord| match year {
            Some(year) => d.created_at.map(|at| at.year()) == Some(year),
            None => true,
        })
        .collect();
    write_donations(&donations)
}

pub fn write_donations(donations: &[DonationRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for d in donations {
        let date = d
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let amount = format!("{:.2}", d.amount);
        writer.write_record([
            d.id.as_deref().unwrap_or_default(),
            date.as_str(),
            d.donor_name.as_deref().unwrap_or_default(),
            d.email.as_deref().unwrap_or_default(),
            if d.anonymous { "true" } else { "false" },
            d.program.as_deref().unwrap_or_default(),
            amount.as_str(),
            d.currency.as_deref().unwrap_or_default(),
            d.payment_method.as_deref().unwrap_or_default(),
            d.status.as_deref().unwrap_or_default(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("CSV flush failed: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}
