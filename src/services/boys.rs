use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;

use crate::{
    models::boy::{
        Assessment, AssessmentRequest, Boy, BoyRecord, BoyStatus, CreateBoyRequest, ProgramTrack,
        Session, SessionRequest,
    },
    models::lenient::Record,
    services::{
        blank_to_none, invalid, non_blank,
        records::{check_field, parse_id, to_document, RecordService},
        storage::{resolve_asset, CloudStorage},
        ServiceError, ServiceResult,
    },
    store::{collections, timestamp, Document, RecordId, RecordStore},
};

/// Derived fields that are recomputed, never written by callers.
const DERIVED_FIELDS: [&str; 3] = ["full_name", "fullName", "age_at_enrolment"];

/// Whole years between `dob` and `on` (0 when `on` is before the birthday).
pub fn age_on(dob: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Response view with the derived `full_name`.
pub fn with_full_name(mut doc: Document) -> Document {
    let name = BoyRecord::from_document(doc.clone()).display_name();
    if !name.is_empty() {
        doc.insert("full_name".into(), Value::String(name));
    }
    doc
}

pub struct BoyService;

impl BoyService {
    /// Enroll a boy. Guardian consent (a signature) is mandatory.
    pub async fn enroll(
        store: &dyn RecordStore,
        storage: Option<&CloudStorage>,
        req: CreateBoyRequest,
        today: NaiveDate,
    ) -> ServiceResult<Document> {
        let first_name = non_blank(&req.first_name, "first_name")?;
        let last_name = non_blank(&req.last_name, "last_name")?;
        let guardian_name = non_blank(&req.guardian_name, "guardian_name")?;
        let guardian_phone = non_blank(&req.guardian_phone, "guardian_phone")?;
        let signature = non_blank(&req.guardian_signature, "guardian_signature")
            .map_err(|_| invalid("Guardian consent is required: guardian_signature is missing"))?;

        if req.date_of_birth > today {
            return Err(invalid("date_of_birth cannot be in the future"));
        }
        let enrollment_date = req.enrollment_date.unwrap_or(today);
        if enrollment_date < req.date_of_birth {
            return Err(invalid("enrollment_date cannot be before date_of_birth"));
        }

        let guardian_signature =
            resolve_asset(storage, &signature, "signatures", &["signature", "consent"]).await?;
        let profile_photo = match blank_to_none(req.profile_photo) {
            Some(photo) => Some(resolve_asset(storage, &photo, "profiles", &["profile", "boy"]).await?),
            None => None,
        };

        let boy = Boy {
            age_at_enrolment: age_on(req.date_of_birth, enrollment_date),
            first_name,
            last_name,
            date_of_birth: req.date_of_birth,
            program_track: req.program_track,
            guardian_name,
            guardian_phone,
            guardian_email: blank_to_none(req.guardian_email),
            guardian_relationship: blank_to_none(req.guardian_relationship),
            guardian_address: blank_to_none(req.guardian_address),
            guardian_signature,
            consent_form_signed: true,
            enrollment_date,
            background: blank_to_none(req.background),
            goals: blank_to_none(req.goals),
            notes: blank_to_none(req.notes),
            sponsor_name: blank_to_none(req.sponsor_name),
            status: req.status.unwrap_or_default(),
            profile_photo,
            assessments: Vec::new(),
            sessions: Vec::new(),
            media: Vec::new(),
        };

        RecordService::create(store, collections::BOYS, &boy).await
    }

    /// Partial update. Changing `date_of_birth` or `enrollment_date` recomputes the age.
    pub async fn update(store: &dyn RecordStore, raw_id: &str, mut updates: Document) -> ServiceResult<Document> {
        for field in DERIVED_FIELDS {
            updates.remove(field);
        }
        check_field::<ProgramTrack>(&updates, "program_track")?;
        check_field::<BoyStatus>(&updates, "status")?;
        check_field::<NaiveDate>(&updates, "date_of_birth")?;
        check_field::<NaiveDate>(&updates, "enrollment_date")?;

        if updates.contains_key("date_of_birth") || updates.contains_key("enrollment_date") {
            let current = RecordService::get(store, collections::BOYS, raw_id).await?;
            let date = |field: &str| -> Option<NaiveDate> {
                updates
                    .get(field)
                    .or_else(|| current.get(field))
                    .and_then(|v| serde_json::from_value(v.clone()).ok())
            };
            if let (Some(dob), Some(enrolled)) = (date("date_of_birth"), date("enrollment_date")) {
                if enrolled < dob {
                    return Err(invalid("enrollment_date cannot be before date_of_birth"));
                }
                updates.insert("age_at_enrolment".into(), Value::from(age_on(dob, enrolled)));
            }
        }

        RecordService::update(store, collections::BOYS, raw_id, updates).await
    }

    pub async fn add_assessment(
        store: &dyn RecordStore,
        raw_id: &str,
        req: AssessmentRequest,
    ) -> ServiceResult<Document> {
        let assessment = Assessment {
            id: RecordId::generate().to_string(),
            kind: req.kind,
            assessed_on: req.assessed_on.unwrap_or_else(|| Utc::now().date_naive()),
            assessor: blank_to_none(req.assessor),
            scores: req.scores,
            notes: blank_to_none(req.notes),
            recorded_at: timestamp(Utc::now()),
        };
        Self::append(store, raw_id, "assessments", Value::Object(to_document(&assessment)?)).await
    }

    pub async fn add_session(
        store: &dyn RecordStore,
        raw_id: &str,
        req: SessionRequest,
    ) -> ServiceResult<Document> {
        let session = Session {
            id: RecordId::generate().to_string(),
            title: non_blank(&req.title, "title")?,
            session_date: req.session_date.unwrap_or_else(|| Utc::now().date_naive()),
            duration_minutes: req.duration_minutes,
            facilitator: blank_to_none(req.facilitator),
            attended: req.attended.unwrap_or(true),
            notes: blank_to_none(req.notes),
            recorded_at: timestamp(Utc::now()),
        };
        Self::append(store, raw_id, "sessions", Value::Object(to_document(&session)?)).await
    }

    /// Read-modify-write of a nested array; concurrent appends are last-write-wins.
    pub(crate) async fn append(
        store: &dyn RecordStore,
        raw_id: &str,
        field: &str,
        entry: Value,
    ) -> ServiceResult<Document> {
        let id = parse_id(collections::BOYS, raw_id)?;
        let current = store
            .get_record_by_id(collections::BOYS, &id)
            .await?
            .ok_or(ServiceError::NotFound("Boy"))?;

        let mut items = match current.get(field) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        items.push(entry);

        let mut updates = Document::new();
        updates.insert(field.to_string(), Value::Array(items));
        store
            .update_record(collections::BOYS, &id, updates)
            .await?
            .ok_or(ServiceError::NotFound("Boy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(dob: &str) -> CreateBoyRequest {
        serde_json::from_value(json!({
            "first_name": "Ade",
            "last_name": "Lagos",
            "date_of_birth": dob,
            "program_track": "sports",
            "guardian_name": "Mrs Lagos",
            "guardian_phone": "+2348000000000",
            "guardian_signature": "data:image/png;base64,iVBORw0KGgo="
        }))
        .unwrap()
    }

    #[test]
    fn age_respects_birthdays() {
        assert_eq!(age_on(date("2015-06-15"), date("2025-06-14")), 9);
        assert_eq!(age_on(date("2015-06-15"), date("2025-06-15")), 10);
        assert_eq!(age_on(date("2012-02-29"), date("2025-02-28")), 12);
        assert_eq!(age_on(date("2012-02-29"), date("2025-03-01")), 13);
        assert_eq!(age_on(date("2025-01-01"), date("2024-01-01")), 0);
    }

    #[tokio::test]
    async fn enrollment_derives_age_and_consent() {
        let store = MemoryRecordStore::new();
        let doc = BoyService::enroll(&store, None, request("2015-03-01"), date("2025-09-01"))
            .await
            .unwrap();
        assert_eq!(doc["age_at_enrolment"], 10);
        assert_eq!(doc["consent_form_signed"], true);
        assert_eq!(doc["status"], "active");
        assert_eq!(doc["enrollment_date"], "2025-09-01");
        assert_eq!(doc["assessments"], json!([]));
    }

    #[tokio::test]
    async fn enrollment_without_signature_is_rejected() {
        let store = MemoryRecordStore::new();
        let mut req = request("2015-03-01");
        req.guardian_signature = "   ".into();
        let err = BoyService::enroll(&store, None, req, date("2025-09-01")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert!(store.get_records("boys", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn future_birth_dates_are_rejected() {
        let store = MemoryRecordStore::new();
        let err = BoyService::enroll(&store, None, request("2030-01-01"), date("2025-09-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn birth_date_change_recomputes_age() {
        let store = MemoryRecordStore::new();
        let doc = BoyService::enroll(&store, None, request("2015-03-01"), date("2025-09-01"))
            .await
            .unwrap();
        let id = doc["id"].as_str().unwrap();

        let patch = json!({ "date_of_birth": "2013-01-01", "age_at_enrolment": 99 });
        let updated = BoyService::update(&store, id, patch.as_object().cloned().unwrap())
            .await
            .unwrap();
        assert_eq!(updated["age_at_enrolment"], 12);
        assert_eq!(updated["first_name"], "Ade");
    }

    #[tokio::test]
    async fn invalid_program_track_patch_is_rejected() {
        let store = MemoryRecordStore::new();
        let doc = BoyService::enroll(&store, None, request("2015-03-01"), date("2025-09-01"))
            .await
            .unwrap();
        let patch = json!({ "program_track": "chess" });
        let err = BoyService::update(&store, doc["id"].as_str().unwrap(), patch.as_object().cloned().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn assessments_and_sessions_are_appended() {
        let store = MemoryRecordStore::new();
        let doc = BoyService::enroll(&store, None, request("2015-03-01"), date("2025-09-01"))
            .await
            .unwrap();
        let id = doc["id"].as_str().unwrap();

        let assessment: AssessmentRequest = serde_json::from_value(json!({
            "kind": "physical",
            "assessed_on": "2025-09-10",
            "scores": { "sprint_100m": 15.2 }
        }))
        .unwrap();
        BoyService::add_assessment(&store, id, assessment).await.unwrap();
        let cognitive: AssessmentRequest =
            serde_json::from_value(json!({ "kind": "cognitive", "notes": "Reads well" })).unwrap();
        let updated = BoyService::add_assessment(&store, id, cognitive).await.unwrap();

        let assessments = updated["assessments"].as_array().unwrap();
        assert_eq!(assessments.len(), 2);
        assert_eq!(assessments[0]["kind"], "physical");
        assert_eq!(assessments[0]["scores"]["sprint_100m"], 15.2);
        assert_eq!(assessments[1]["notes"], "Reads well");

        let session: SessionRequest =
            serde_json::from_value(json!({ "title": "Football drills", "duration_minutes": 90 })).unwrap();
        let updated = BoyService::add_session(&store, id, session).await.unwrap();
        assert_eq!(updated["sessions"][0]["title"], "Football drills");
        assert_eq!(updated["sessions"][0]["attended"], true);
    }

    #[test]
    fn full_name_is_derived_for_both_shapes() {
        let split = json!({ "first_name": "Ade", "last_name": "Lagos" });
        let legacy = json!({ "fullName": "Musa Bello" });
        assert_eq!(with_full_name(split.as_object().cloned().unwrap())["full_name"], "Ade Lagos");
        assert_eq!(with_full_name(legacy.as_object().cloned().unwrap())["full_name"], "Musa Bello");
    }
}
