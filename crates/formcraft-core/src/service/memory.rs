//! In-memory repositories and spreadsheet sync for service tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use formcraft_types::error::RepositoryError;
use formcraft_types::form::{Form, FormId};
use formcraft_types::response::{DailyCount, FormResponse, ResponseId};
use formcraft_types::user::{User, UserId};

use crate::repository::SortOrder;
use crate::repository::form::{FormFilter, FormRepository};
use crate::repository::response::{ResponseFilter, ResponseRepository};
use crate::repository::user::UserRepository;
use crate::service::sheets::{SheetRow, SpreadsheetSync, SyncError};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    forms: Vec<Form>,
    responses: Vec<FormResponse>,
}

/// Shared store; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn response_total(&self) -> usize {
        self.inner.lock().unwrap().responses.len()
    }

    pub fn counter(&self, id: &FormId) -> i64 {
        self.inner
            .lock()
            .unwrap()
            .forms
            .iter()
            .find(|f| &f.id == id)
            .map(|f| f.response_count)
            .unwrap_or(-1)
    }

    /// Force the stored counter, bypassing the repository contract.
    pub fn set_counter(&self, id: &FormId, value: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(form) = inner.forms.iter_mut().find(|f| &f.id == id) {
            form.response_count = value;
        }
    }
}

fn page<T>(items: Vec<T>, limit: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let offset = offset.unwrap_or(0).max(0) as usize;
    let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

impl FormRepository for MemoryStore {
    async fn create(&self, form: &Form) -> Result<Form, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.forms.iter().any(|f| f.id == form.id) {
            return Err(RepositoryError::Conflict(form.id.to_string()));
        }
        inner.forms.push(form.clone());
        Ok(form.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .forms
            .iter()
            .find(|f| &f.id == id)
            .cloned())
    }

    async fn list(&self, filter: FormFilter) -> Result<Vec<Form>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut forms: Vec<Form> = inner
            .forms
            .iter()
            .filter(|f| filter.owner_id.as_ref().is_none_or(|o| &f.owner_id == o))
            .filter(|f| filter.published.is_none_or(|p| f.published == p))
            .cloned()
            .collect();
        forms.sort_by_key(|f| f.updated_at);
        if filter.sort_order.unwrap_or_default() == SortOrder::Desc {
            forms.reverse();
        }
        Ok(page(forms, filter.limit, filter.offset))
    }

    async fn update(&self, form: &Form) -> Result<Form, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .forms
            .iter_mut()
            .find(|f| f.id == form.id)
            .ok_or(RepositoryError::NotFound)?;
        let counter = stored.response_count;
        *stored = Form {
            response_count: counter,
            ..form.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.forms.len();
        inner.forms.retain(|f| &f.id != id);
        if inner.forms.len() == before {
            return Err(RepositoryError::NotFound);
        }
        inner.responses.retain(|r| &r.form_id != id);
        Ok(())
    }
}

impl ResponseRepository for MemoryStore {
    async fn create(&self, response: &FormResponse) -> Result<FormResponse, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let form = inner
            .forms
            .iter_mut()
            .find(|f| f.id == response.form_id)
            .ok_or(RepositoryError::NotFound)?;
        form.response_count += 1;
        inner.responses.push(response.clone());
        Ok(response.clone())
    }

    async fn get_by_id(&self, id: &ResponseId) -> Result<Option<FormResponse>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .responses
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn list_for_form(
        &self,
        form_id: &FormId,
        filter: ResponseFilter,
    ) -> Result<Vec<FormResponse>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut responses: Vec<FormResponse> = inner
            .responses
            .iter()
            .filter(|r| &r.form_id == form_id)
            .filter(|r| filter.since.is_none_or(|s| r.submitted_at >= s))
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(page(responses, filter.limit, filter.offset))
    }

    async fn count_for_form(
        &self,
        form_id: &FormId,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .responses
            .iter()
            .filter(|r| &r.form_id == form_id)
            .filter(|r| since.is_none_or(|s| r.submitted_at >= s))
            .count() as i64)
    }

    async fn daily_counts(
        &self,
        form_id: &FormId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut counts: std::collections::BTreeMap<chrono::NaiveDate, i64> =
            std::collections::BTreeMap::new();
        for r in inner
            .responses
            .iter()
            .filter(|r| &r.form_id == form_id && r.submitted_at >= since)
        {
            *counts.entry(r.submitted_at.date_naive()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }

    async fn delete(&self, id: &ResponseId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner
            .responses
            .iter()
            .position(|r| &r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let removed = inner.responses.remove(index);
        if let Some(form) = inner.forms.iter_mut().find(|f| f.id == removed.form_id) {
            form.response_count = (form.response_count - 1).max(0);
        }
        Ok(())
    }
}

impl UserRepository for MemoryStore {
    async fn upsert(&self, user: &User) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .users
            .iter_mut()
            .find(|u| u.external_id == user.external_id)
        {
            existing.email = user.email.clone();
            existing.name = user.name.clone();
            existing.updated_at = user.updated_at;
            return Ok(existing.clone());
        }
        inner.users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| &u.id == id)
            .cloned())
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.inner.lock().unwrap().users.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|u| &u.id != id);
        if inner.users.len() == before {
            return Err(RepositoryError::NotFound);
        }
        let owned: Vec<FormId> = inner
            .forms
            .iter()
            .filter(|f| &f.owner_id == id)
            .map(|f| f.id.clone())
            .collect();
        inner.forms.retain(|f| &f.owner_id != id);
        inner.responses.retain(|r| !owned.contains(&r.form_id));
        Ok(())
    }
}

/// Spreadsheet sync that records rows, or fails every append.
#[derive(Clone, Default)]
pub struct RecordingSync {
    pub rows: Arc<Mutex<Vec<SheetRow>>>,
    pub fail: bool,
}

impl RecordingSync {
    pub fn failing() -> Self {
        Self {
            rows: Arc::default(),
            fail: true,
        }
    }
}

impl SpreadsheetSync for RecordingSync {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn append(&self, row: &SheetRow) -> Result<(), SyncError> {
        if self.fail {
            return Err(SyncError::Rejected {
                status: 500,
                message: "sheet unavailable".to_string(),
            });
        }
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}
