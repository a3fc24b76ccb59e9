use crate::{
    models::sponsorship::{CreateSponsorshipRequest, Sponsorship, SponsorshipItem},
    services::{
        blank_to_none,
        email::{log_failure, EmailService},
        invalid, non_blank,
        records::RecordService,
        ServiceResult,
    },
    store::{collections, Document, RecordId, RecordStore},
};

pub struct SponsorshipService;

impl SponsorshipService {
    pub async fn record(
        store: &dyn RecordStore,
        email: Option<&EmailService>,
        default_currency: &str,
        req: CreateSponsorshipRequest,
    ) -> ServiceResult<Document> {
        let sponsor_name = non_blank(&req.sponsor_name, "sponsor_name")?;
        let address = non_blank(&req.email, "email")?.to_lowercase();
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(invalid("amount must be greater than zero"));
        }
        if let Some(rate) = req.rate_used {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(invalid("rate_used must be greater than zero"));
            }
        }

        let mut items = Vec::with_capacity(req.items.len());
        for item in req.items {
            let name = non_blank(&item.name, "items.name")?;
            if item.quantity == 0 {
                return Err(invalid(format!("Quantity for {name} must be at least 1")));
            }
            items.push(SponsorshipItem { name, ..item });
        }

        // Soft association: the boy is not looked up.
        let boy_id = req
            .boy_id
            .as_deref()
            .and_then(RecordId::parse)
            .map(|id| id.to_string());

        let sponsorship = Sponsorship {
            sponsor_name,
            email: address,
            phone: blank_to_none(req.phone),
            company: blank_to_none(req.company),
            amount: req.amount,
            currency: blank_to_none(req.currency)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| default_currency.to_string()),
            rate_used: req.rate_used,
            items,
            boy_id,
            status: req.status.unwrap_or_default(),
        };

        let doc = RecordService::create(store, collections::SPONSORSHIPS, &sponsorship).await?;

        if let Some(email) = email {
            if let Err(e) = email
                .send_sponsorship_thank_you(
                    &sponsorship.email,
                    &sponsorship.sponsor_name,
                    sponsorship.amount,
                    &sponsorship.currency,
                )
                .await
            {
                log_failure("sponsorship_thank_you", &sponsorship.email, &e);
            }
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::ServiceError, store::MemoryRecordStore};
    use serde_json::{json, Value};

    fn request(mut body: Value) -> CreateSponsorshipRequest {
        crate::models::sponsorship::fold_request_keys(&mut body);
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn items_and_boy_reference_are_normalized() {
        let store = MemoryRecordStore::new();
        let doc = SponsorshipService::record(
            &store,
            None,
            "NGN",
            request(json!({
                "sponsorName": "Acme Ltd",
                "email": "Giving@Acme.example",
                "amount": "150000",
                "rateUsed": 1500,
                "boyId": "{67E55044-10B1-426F-9247-BB680E5FE0C8}",
                "items": [
                    { "name": "Football boots", "quantity": "2", "unitPrice": 25000 },
                    { "name": "School bag" }
                ]
            })),
        )
        .await
        .unwrap();
        assert_eq!(doc["boy_id"], "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(doc["email"], "giving@acme.example");
        assert_eq!(doc["items"][0]["quantity"], 2);
        assert_eq!(doc["items"][0]["unit_price"], 25000.0);
        assert_eq!(doc["items"][1]["quantity"], 1);
        assert_eq!(doc["rate_used"], 1500.0);
        assert_eq!(doc["status"], "pending");
    }

    #[tokio::test]
    async fn zero_quantity_items_are_rejected() {
        let store = MemoryRecordStore::new();
        let err = SponsorshipService::record(
            &store,
            None,
            "NGN",
            request(json!({
                "sponsor_name": "Acme Ltd",
                "email": "giving@acme.example",
                "amount": 100,
                "items": [{ "name": "Jersey", "quantity": 0 }]
            })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }
}
