//! Submission service.
//!
//! Accepts public submissions for published forms and gives owners access
//! to the stored responses: listing, deletion, analytics and CSV export.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use formcraft_types::error::{RepositoryError, ResponseError};
use formcraft_types::form::{FieldId, Form, FormId};
use formcraft_types::response::{
    ClientInfo, DailyCount, FieldValue, FormAnalytics, FormResponse, ResponseId, SheetSyncStatus,
    SubmissionReceipt,
};
use formcraft_types::user::UserId;

use crate::repository::form::FormRepository;
use crate::repository::response::{ResponseFilter, ResponseRepository};
use crate::service::export::{self, CsvExport};
use crate::service::sheets::{SheetRow, SpreadsheetSync};
use crate::validation::validate_submission;

/// Days covered by the per-day breakdown in [`FormAnalytics::daily`].
pub const DAILY_WINDOW_DAYS: u64 = 7;

pub struct SubmissionService<F: FormRepository, R: ResponseRepository, S: SpreadsheetSync> {
    form_repo: F,
    response_repo: R,
    sheets: S,
}

impl<F: FormRepository, R: ResponseRepository, S: SpreadsheetSync> SubmissionService<F, R, S> {
    pub fn new(form_repo: F, response_repo: R, sheets: S) -> Self {
        Self {
            form_repo,
            response_repo,
            sheets,
        }
    }

    /// Validate and store a public submission.
    ///
    /// Values for ids that are not fields of the form are dropped. The
    /// spreadsheet push runs after the response is stored and only affects
    /// the receipt's `sheet_sync` status.
    pub async fn submit(
        &self,
        form_id: &FormId,
        values: BTreeMap<FieldId, FieldValue>,
        client: ClientInfo,
    ) -> Result<SubmissionReceipt, ResponseError> {
        let form = self.load_form(form_id).await?;
        if !form.published {
            return Err(ResponseError::NotPublished);
        }

        let errors = validate_submission(&form, &values);
        if !errors.is_empty() {
            tracing::debug!(form_id = %form.id, errors = errors.len(), "submission rejected");
            return Err(ResponseError::Validation(errors));
        }

        let data: BTreeMap<FieldId, FieldValue> = values
            .into_iter()
            .filter(|(id, _)| form.field(id).is_some())
            .collect();

        let response = FormResponse {
            id: ResponseId::new(),
            form_id: form.id.clone(),
            data,
            submitted_at: Utc::now(),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        };

        let response = self
            .response_repo
            .create(&response)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ResponseError::FormNotFound,
                other => ResponseError::StorageError(other.to_string()),
            })?;

        tracing::info!(form_id = %form.id, response_id = %response.id, "response stored");

        let sheet_sync = self.sync_to_sheet(&form, &response).await;

        Ok(SubmissionReceipt {
            response_id: response.id,
            form_id: form.id,
            submitted_at: response.submitted_at,
            submit_message: form.submit_message,
            redirect_url: form.redirect_url,
            sheet_sync,
        })
    }

    async fn sync_to_sheet(&self, form: &Form, response: &FormResponse) -> SheetSyncStatus {
        if !self.sheets.is_enabled() {
            return SheetSyncStatus::Skipped;
        }
        match self.sheets.append(&SheetRow::new(form, response)).await {
            Ok(()) => SheetSyncStatus::Synced,
            Err(e) => {
                tracing::warn!(
                    form_id = %form.id,
                    response_id = %response.id,
                    error = %e,
                    "spreadsheet sync failed"
                );
                SheetSyncStatus::Failed
            }
        }
    }

    /// Responses of an owned form, newest first.
    pub async fn list_responses(
        &self,
        owner_id: &UserId,
        form_id: &FormId,
        filter: ResponseFilter,
    ) -> Result<Vec<FormResponse>, ResponseError> {
        let form = self.load_owned_form(owner_id, form_id).await?;
        self.response_repo
            .list_for_form(&form.id, filter)
            .await
            .map_err(|e| ResponseError::StorageError(e.to_string()))
    }

    /// A single response, if the caller owns its form.
    pub async fn get_response(
        &self,
        owner_id: &UserId,
        response_id: &ResponseId,
    ) -> Result<FormResponse, ResponseError> {
        let response = self
            .response_repo
            .get_by_id(response_id)
            .await
            .map_err(|e| ResponseError::StorageError(e.to_string()))?
            .ok_or(ResponseError::ResponseNotFound)?;
        self.load_owned_form(owner_id, &response.form_id).await?;
        Ok(response)
    }

    /// Delete a response; the form's counter drops by one.
    pub async fn delete_response(
        &self,
        owner_id: &UserId,
        response_id: &ResponseId,
    ) -> Result<(), ResponseError> {
        self.get_response(owner_id, response_id).await?;
        self.response_repo
            .delete(response_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ResponseError::ResponseNotFound,
                other => ResponseError::StorageError(other.to_string()),
            })?;
        tracing::info!(response_id = %response_id, "response deleted");
        Ok(())
    }

    /// Response statistics relative to the current time.
    pub async fn analytics(
        &self,
        owner_id: &UserId,
        form_id: &FormId,
    ) -> Result<FormAnalytics, ResponseError> {
        self.analytics_at(owner_id, form_id, Utc::now()).await
    }

    /// Response statistics relative to `now`. Day boundaries are UTC.
    pub async fn analytics_at(
        &self,
        owner_id: &UserId,
        form_id: &FormId,
        now: DateTime<Utc>,
    ) -> Result<FormAnalytics, ResponseError> {
        let form = self.load_owned_form(owner_id, form_id).await?;

        let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week_start = today_start - Duration::days(DAILY_WINDOW_DAYS as i64 - 1);
        let month_start = today_start - Duration::days(29);

        let total_responses = self.count_since(&form.id, None).await?;
        let today = self.count_since(&form.id, Some(today_start)).await?;
        let last_7_days = self.count_since(&form.id, Some(week_start)).await?;
        let last_30_days = self.count_since(&form.id, Some(month_start)).await?;

        let recorded = self
            .response_repo
            .daily_counts(&form.id, week_start)
            .await
            .map_err(|e| ResponseError::StorageError(e.to_string()))?;

        // Fill in the days without responses.
        let daily = week_start
            .date_naive()
            .iter_days()
            .take(DAILY_WINDOW_DAYS as usize)
            .map(|date| DailyCount {
                date,
                count: recorded
                    .iter()
                    .find(|d| d.date == date)
                    .map(|d| d.count)
                    .unwrap_or(0),
            })
            .collect();

        Ok(FormAnalytics {
            form_id: form.id,
            total_responses,
            stored_counter: form.response_count,
            today,
            last_7_days,
            last_30_days,
            daily,
        })
    }

    /// Render every response of an owned form as CSV, newest first.
    pub async fn export_csv(
        &self,
        owner_id: &UserId,
        form_id: &FormId,
    ) -> Result<CsvExport, ResponseError> {
        let form = self.load_owned_form(owner_id, form_id).await?;
        let responses = self
            .response_repo
            .list_for_form(&form.id, ResponseFilter::default())
            .await
            .map_err(|e| ResponseError::StorageError(e.to_string()))?;

        Ok(CsvExport {
            file_name: export::export_file_name(&form.title),
            content: export::responses_to_csv(&form, &responses),
            row_count: responses.len(),
        })
    }

    async fn count_since(
        &self,
        form_id: &FormId,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, ResponseError> {
        self.response_repo
            .count_for_form(form_id, since)
            .await
            .map_err(|e| ResponseError::StorageError(e.to_string()))
    }

    async fn load_form(&self, form_id: &FormId) -> Result<Form, ResponseError> {
        self.form_repo
            .get_by_id(form_id)
            .await
            .map_err(|e| ResponseError::StorageError(e.to_string()))?
            .ok_or(ResponseError::FormNotFound)
    }

    async fn load_owned_form(
        &self,
        owner_id: &UserId,
        form_id: &FormId,
    ) -> Result<Form, ResponseError> {
        let form = self.load_form(form_id).await?;
        if !form.is_owned_by(owner_id) {
            return Err(ResponseError::AccessDenied);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use formcraft_types::form::{FieldType, FormField, FormTheme};

    use crate::service::memory::{MemoryStore, RecordingSync};
    use crate::service::sheets::DisabledSpreadsheetSync;

    fn field(id: &str, label: &str, field_type: FieldType, required: bool) -> FormField {
        FormField {
            id: FieldId::from(id),
            field_type,
            label: label.to_string(),
            placeholder: None,
            required,
            options: None,
        }
    }

    async fn seed_form(store: &MemoryStore, owner: &UserId, published: bool) -> Form {
        let now = Utc::now();
        let form = Form {
            id: FormId::new(),
            owner_id: owner.clone(),
            title: "Contact".to_string(),
            description: String::new(),
            fields: vec![
                field("name", "Name", FieldType::Text, true),
                field("email", "Email", FieldType::Email, true),
                field("age", "Age", FieldType::Number, false),
            ],
            theme: FormTheme::Default,
            submit_message: "Thanks!".to_string(),
            redirect_url: Some("https://example.com/done".to_string()),
            published,
            response_count: 0,
            created_at: now,
            updated_at: now,
        };
        FormRepository::create(store, &form).await.unwrap()
    }

    fn values(pairs: &[(&str, FieldValue)]) -> BTreeMap<FieldId, FieldValue> {
        pairs
            .iter()
            .map(|(k, v)| (FieldId::from(*k), v.clone()))
            .collect()
    }

    fn valid_values() -> BTreeMap<FieldId, FieldValue> {
        values(&[
            ("name", FieldValue::Text("Ada".to_string())),
            ("email", FieldValue::Text("ada@example.com".to_string())),
        ])
    }

    fn service(
        store: &MemoryStore,
    ) -> SubmissionService<MemoryStore, MemoryStore, DisabledSpreadsheetSync> {
        SubmissionService::new(store.clone(), store.clone(), DisabledSpreadsheetSync)
    }

    #[tokio::test]
    async fn test_submit_stores_response_and_counts() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let form = seed_form(&store, &owner, true).await;
        let svc = service(&store);

        let mut submitted = valid_values();
        submitted.insert(FieldId::from("unknown"), FieldValue::Bool(true));
        let receipt = svc
            .submit(
                &form.id,
                submitted,
                ClientInfo {
                    ip_address: Some("203.0.113.9".to_string()),
                    user_agent: Some("curl/8".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(receipt.submit_message, "Thanks!");
        assert_eq!(receipt.redirect_url.as_deref(), Some("https://example.com/done"));
        assert_eq!(receipt.sheet_sync, SheetSyncStatus::Skipped);
        assert_eq!(store.counter(&form.id), 1);

        let stored = svc.get_response(&owner, &receipt.response_id).await.unwrap();
        assert_eq!(stored.ip_address.as_deref(), Some("203.0.113.9"));
        assert!(!stored.data.contains_key(&FieldId::from("unknown")));
        assert_eq!(stored.data.len(), 2);
    }

    #[tokio::test]
    async fn test_identical_submissions_are_not_deduplicated() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let form = seed_form(&store, &owner, true).await;
        let svc = service(&store);

        let a = svc
            .submit(&form.id, valid_values(), ClientInfo::default())
            .await
            .unwrap();
        let b = svc
            .submit(&form.id, valid_values(), ClientInfo::default())
            .await
            .unwrap();

        assert_ne!(a.response_id, b.response_id);
        assert_eq!(store.response_total(), 2);
        assert_eq!(store.counter(&form.id), 2);
    }

    #[tokio::test]
    async fn test_unpublished_form_rejects_submission() {
        let store = MemoryStore::new();
        let form = seed_form(&store, &UserId::new(), false).await;
        let svc = service(&store);

        let err = svc
            .submit(&form.id, valid_values(), ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResponseError::NotPublished));
        assert_eq!(err.to_string(), "Form is not published");
        assert_eq!(store.response_total(), 0);
        assert_eq!(store.counter(&form.id), 0);
    }

    #[tokio::test]
    async fn test_missing_form() {
        let store = MemoryStore::new();
        let svc = service(&store);
        assert!(matches!(
            svc.submit(&FormId::new(), valid_values(), ClientInfo::default())
                .await,
            Err(ResponseError::FormNotFound)
        ));
    }

    #[tokio::test]
    async fn test_validation_collects_every_field_error() {
        let store = MemoryStore::new();
        let form = seed_form(&store, &UserId::new(), true).await;
        let svc = service(&store);

        let err = svc
            .submit(
                &form.id,
                values(&[
                    ("email", FieldValue::Text("nope".to_string())),
                    ("age", FieldValue::Text("old".to_string())),
                ]),
                ClientInfo::default(),
            )
            .await
            .unwrap_err();

        match err {
            ResponseError::Validation(errors) => {
                let ids: Vec<&str> = errors.iter().map(|e| e.field_id.as_str()).collect();
                assert_eq!(ids, ["name", "email", "age"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.response_total(), 0);
    }

    #[tokio::test]
    async fn test_sheet_sync_outcomes() {
        let store = MemoryStore::new();
        let form = seed_form(&store, &UserId::new(), true).await;

        let recording = RecordingSync::default();
        let svc = SubmissionService::new(store.clone(), store.clone(), recording.clone());
        let receipt = svc
            .submit(&form.id, valid_values(), ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(receipt.sheet_sync, SheetSyncStatus::Synced);
        let rows = recording.rows.lock().unwrap().clone();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].response_id, receipt.response_id.to_string());
        assert_eq!(rows[0].row[3], "Ada");

        let failing =
            SubmissionService::new(store.clone(), store.clone(), RecordingSync::failing());
        let receipt = failing
            .submit(&form.id, valid_values(), ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(receipt.sheet_sync, SheetSyncStatus::Failed);
        assert_eq!(store.response_total(), 2);
    }

    #[tokio::test]
    async fn test_delete_response_decrements_counter() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let form = seed_form(&store, &owner, true).await;
        let svc = service(&store);

        let mut last = None;
        for _ in 0..5 {
            last = Some(
                svc.submit(&form.id, valid_values(), ClientInfo::default())
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(store.counter(&form.id), 5);

        let receipt = last.unwrap();
        svc.delete_response(&owner, &receipt.response_id)
            .await
            .unwrap();
        assert_eq!(store.counter(&form.id), 4);
        assert!(matches!(
            svc.get_response(&owner, &receipt.response_id).await,
            Err(ResponseError::ResponseNotFound)
        ));
    }

    #[tokio::test]
    async fn test_owner_operations_check_ownership() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let form = seed_form(&store, &owner, true).await;
        let svc = service(&store);
        let receipt = svc
            .submit(&form.id, valid_values(), ClientInfo::default())
            .await
            .unwrap();

        assert!(matches!(
            svc.list_responses(&stranger, &form.id, ResponseFilter::default())
                .await,
            Err(ResponseError::AccessDenied)
        ));
        assert!(matches!(
            svc.get_response(&stranger, &receipt.response_id).await,
            Err(ResponseError::AccessDenied)
        ));
        assert!(matches!(
            svc.delete_response(&stranger, &receipt.response_id).await,
            Err(ResponseError::AccessDenied)
        ));
        assert!(matches!(
            svc.export_csv(&stranger, &form.id).await,
            Err(ResponseError::AccessDenied)
        ));
        assert_eq!(store.counter(&form.id), 1);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let form = seed_form(&store, &owner, true).await;
        let svc = service(&store);
        for _ in 0..2 {
            svc.submit(&form.id, valid_values(), ClientInfo::default())
                .await
                .unwrap();
        }

        let export = svc.export_csv(&owner, &form.id).await.unwrap();
        assert_eq!(export.file_name, "Contact_responses.csv");
        assert_eq!(export.row_count, 2);
        assert_eq!(export.content.lines().count(), 3);
        assert!(export.content.starts_with(
            "\"Response ID\",\"Submitted At\",\"IP Address\",\"Name\",\"Email\",\"Age\""
        ));
    }

    #[tokio::test]
    async fn test_analytics_windows() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let form = seed_form(&store, &owner, true).await;
        let svc = service(&store);

        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let offsets_in_hours = [1, 2, 30, 24 * 5, 24 * 20, 24 * 40];
        for hours in offsets_in_hours {
            let response = FormResponse {
                id: ResponseId::new(),
                form_id: form.id.clone(),
                data: valid_values(),
                submitted_at: now - Duration::hours(hours),
                ip_address: None,
                user_agent: None,
            };
            ResponseRepository::create(&store, &response).await.unwrap();
        }

        let analytics = svc.analytics_at(&owner, &form.id, now).await.unwrap();
        assert_eq!(analytics.total_responses, 6);
        assert_eq!(analytics.stored_counter, 6);
        assert_eq!(analytics.today, 2);
        assert_eq!(analytics.last_7_days, 4);
        assert_eq!(analytics.last_30_days, 5);

        assert_eq!(analytics.daily.len(), DAILY_WINDOW_DAYS as usize);
        assert_eq!(
            analytics.daily.first().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 5, 4).unwrap()
        );
        let last = analytics.daily.last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(last.count, 2);
        let total: i64 = analytics.daily.iter().map(|d| d.count).sum();
        assert_eq!(total, 4);
    }
}
