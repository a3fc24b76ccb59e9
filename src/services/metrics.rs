use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref RECORDS_CREATED_COUNTER: CounterVec = register_counter_vec!(
        "taetae_records_created_total",
        "Records created per collection",
        &["collection"]
    ).unwrap();

    pub static ref DONATION_AMOUNT_COUNTER: CounterVec = register_counter_vec!(
        "taetae_donation_amount_total",
        "Sum of recorded donation amounts per program (currency as submitted)",
        &["program"]
    ).unwrap();

    pub static ref EMAILS_FAILED_COUNTER: CounterVec = register_counter_vec!(
        "taetae_emails_failed_total",
        "Emails that could not be sent, by kind",
        &["kind"]
    ).unwrap();

    pub static ref UPLOADS_COUNTER: CounterVec = register_counter_vec!(
        "taetae_uploads_total",
        "Cloud storage uploads by outcome",
        &["status"]
    ).unwrap();
}

pub fn record_created(collection: &str) {
    RECORDS_CREATED_COUNTER.with_label_values(&[collection]).inc();
}
