use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    models::{
        lenient::{fold_legacy_keys, Record},
        volunteer::{
            self, CreateVolunteerRequest, Volunteer, VolunteerCategory, VolunteerRecord, VolunteerStatus,
        },
    },
    services::{
        blank_to_none,
        email::{log_failure, EmailService},
        invalid, non_blank,
        records::{check_field, RecordService},
        storage::{resolve_asset, CloudStorage},
        ServiceResult,
    },
    store::{collections, Document, RecordStore},
};

pub struct VolunteerService;

impl VolunteerService {
    /// Public application form. Every applicant starts as `pending`.
    pub async fn apply(
        store: &dyn RecordStore,
        storage: Option<&CloudStorage>,
        email: Option<&EmailService>,
        admin_email: Option<&str>,
        req: CreateVolunteerRequest,
    ) -> ServiceResult<Document> {
        let name = non_blank(&req.name, "name")?;
        let address = non_blank(&req.email, "email")?.to_lowercase();
        if !address.contains('@') {
            return Err(invalid(format!("Invalid email address: {address}")));
        }

        let profile_photo = match blank_to_none(req.profile_photo) {
            Some(photo) => Some(resolve_asset(storage, &photo, "volunteers", &["profile", "volunteer"]).await?),
            None => None,
        };

        let volunteer = Volunteer {
            name,
            email: address,
            phone: blank_to_none(req.phone),
            category: req.category.unwrap_or_default(),
            status: VolunteerStatus::Pending,
            availability: blank_to_none(req.availability),
            bio: blank_to_none(req.bio),
            skills: req
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            profile_photo,
            joined_at: None,
        };

        let doc = RecordService::create(store, collections::VOLUNTEERS, &volunteer).await?;

        if let Some(email) = email {
            if let Err(e) = email
                .send_volunteer_application_received(&volunteer.email, &volunteer.name)
                .await
            {
                log_failure("volunteer_ack", &volunteer.email, &e);
            }
            if let Some(admin) = admin_email {
                let category = match volunteer.category {
                    VolunteerCategory::Professional => "professional",
                    VolunteerCategory::Helper => "helper",
                };
                if let Err(e) = email
                    .send_new_volunteer_alert(admin, &volunteer.name, &volunteer.email, category)
                    .await
                {
                    log_failure("volunteer_alert", admin, &e);
                }
            }
        }

        Ok(doc)
    }

    /// Merge update. A status change emails the volunteer; the first approval
    /// stamps `joined_at`.
    pub async fn update(
        store: &dyn RecordStore,
        email: Option<&EmailService>,
        raw_id: &str,
        mut updates: Document,
        today: NaiveDate,
    ) -> ServiceResult<Document> {
        fold_legacy_keys(&mut updates, volunteer::LEGACY_KEYS);
        check_field::<VolunteerStatus>(&updates, "status")?;
        check_field::<VolunteerCategory>(&updates, "category")?;
        check_field::<NaiveDate>(&updates, "joined_at")?;

        let new_status = match updates.get("status") {
            Some(value) => Some(serde_json::from_value::<VolunteerStatus>(value.clone()).map_err(anyhow::Error::from)?),
            None => None,
        };

        let mut previous = None;
        if let Some(status) = new_status {
            let current = RecordService::get(store, collections::VOLUNTEERS, raw_id).await?;
            let record = VolunteerRecord::from_document(current);
            if status == VolunteerStatus::Approved
                && record.joined_at.is_none()
                && !updates.contains_key("joined_at")
            {
                updates.insert("joined_at".into(), Value::String(today.to_string()));
            }
            previous = Some(record.status);
        }

        let doc = RecordService::update(store, collections::VOLUNTEERS, raw_id, updates).await?;

        if let (Some(status), Some(previous), Some(email)) = (new_status, previous, email) {
            let changed = previous.as_deref() != Some(status.to_string().as_str());
            if changed && status != VolunteerStatus::Pending {
                let record = VolunteerRecord::from_document(doc.clone());
                if let Some(to) = record.email.as_deref() {
                    let approved = status == VolunteerStatus::Approved;
                    if let Err(e) = email
                        .send_volunteer_decision(to, &record.display_name(), approved)
                        .await
                    {
                        log_failure("volunteer_decision", to, &e);
                    }
                }
            }
        }

        tracing::info!("Updated volunteer {raw_id}");
        Ok(doc)
    }
}
