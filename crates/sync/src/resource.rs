//! Resource controllers
//!
//! A [`Resource`] couples one backend collection with one [`Store`]. Every
//! operation moves the store through `loading -> success | error`; mutations
//! patch the list in place and then refetch it, and the refetched list wins.
//!
//! List fetches are ticketed: a response is applied only if no newer list
//! fetch was started while it was in flight.

use crate::store::{Action, Store, StoreState};
use medrec_api_client::endpoints::{PrescriptionsApi, RecordsApi};
use medrec_api_client::{ApiResult, Record};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument, warn};

/// A backend collection of opaque documents
pub trait ResourceApi: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the full list
    fn list(&self) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;

    /// Fetch one document
    fn get(&self, id: &str) -> impl Future<Output = ApiResult<Record>> + Send;

    /// Create a document, returning what the backend answered with
    fn create(&self, body: &Value) -> impl Future<Output = ApiResult<Record>> + Send;

    /// Update a document, returning what the backend answered with
    fn update(&self, id: &str, fields: &Value) -> impl Future<Output = ApiResult<Record>> + Send;

    /// Delete a document
    fn remove(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send;
}

impl ResourceApi for RecordsApi {
    fn name(&self) -> &'static str {
        "records"
    }

    async fn list(&self) -> ApiResult<Vec<Record>> {
        RecordsApi::list(self).await
    }

    async fn get(&self, id: &str) -> ApiResult<Record> {
        RecordsApi::get(self, id).await
    }

    async fn create(&self, body: &Value) -> ApiResult<Record> {
        RecordsApi::create(self, body).await
    }

    async fn update(&self, id: &str, fields: &Value) -> ApiResult<Record> {
        RecordsApi::update(self, id, fields).await
    }

    async fn remove(&self, id: &str) -> ApiResult<()> {
        RecordsApi::delete(self, id).await.map(drop)
    }
}

/// Medication requests matching a fixed search filter
#[derive(Clone)]
pub struct MedicationRequests {
    api: PrescriptionsApi,
    filter: Value,
}

impl MedicationRequests {
    /// All medication requests visible to the caller
    pub fn all(api: PrescriptionsApi) -> Self {
        Self::matching(api, Value::Object(serde_json::Map::new()))
    }

    /// Medication requests matching `filter`
    pub fn matching(api: PrescriptionsApi, filter: Value) -> Self {
        Self { api, filter }
    }

    /// The search filter sent with every list call
    pub fn filter(&self) -> &Value {
        &self.filter
    }
}

impl ResourceApi for MedicationRequests {
    fn name(&self) -> &'static str {
        "medication_requests"
    }

    async fn list(&self) -> ApiResult<Vec<Record>> {
        self.api.search(&self.filter).await
    }

    async fn get(&self, id: &str) -> ApiResult<Record> {
        self.api.get(id).await
    }

    async fn create(&self, body: &Value) -> ApiResult<Record> {
        self.api.create(body).await
    }

    async fn update(&self, id: &str, fields: &Value) -> ApiResult<Record> {
        self.api.update(id, fields).await
    }

    async fn remove(&self, id: &str) -> ApiResult<()> {
        self.api.delete(id).await.map(drop)
    }
}

/// Controller holding request state for one resource
pub struct Resource<A> {
    api: A,
    store: Store,
    list_ticket: AtomicU64,
}

impl<A: ResourceApi> Resource<A> {
    /// Create a controller with a fresh store
    pub fn new(api: A) -> Self {
        Self::with_store(api, Store::default())
    }

    /// Create a controller over an existing store
    pub fn with_store(api: A, store: Store) -> Self {
        Self {
            api,
            store,
            list_ticket: AtomicU64::new(0),
        }
    }

    /// The store this controller writes to
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Current state snapshot
    pub fn state(&self) -> StoreState {
        self.store.snapshot()
    }

    /// Fetch the full list into the store
    #[instrument(skip(self), fields(resource = self.api.name()))]
    pub async fn list(&self) -> ApiResult<Vec<Record>> {
        let ticket = self.list_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.dispatch(Action::FetchStart);

        let result = self.api.list().await;

        if self.list_ticket.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding stale list response");
            return result;
        }

        match &result {
            Ok(records) => {
                debug!(count = records.len(), "List fetched");
                self.store.dispatch(Action::SetRecords(records.clone()));
            }
            Err(e) => self.fail(e),
        }
        result
    }

    /// Invalidate the cached list by fetching it again
    pub async fn refetch(&self) -> ApiResult<Vec<Record>> {
        self.list().await
    }

    /// Fetch one document and select it
    #[instrument(skip(self), fields(resource = self.api.name()))]
    pub async fn get(&self, id: &str) -> ApiResult<Record> {
        self.store.dispatch(Action::FetchStart);

        let result = self.api.get(id).await;
        match &result {
            Ok(record) => self.store.dispatch(Action::SetRecord(Some(record.clone()))),
            Err(e) => self.fail(e),
        }
        result
    }

    /// Create a document, then refetch the list
    ///
    /// The backend's answer is appended when it carries an ID; otherwise the
    /// list only changes once the refetch lands.
    #[instrument(skip(self, body), fields(resource = self.api.name()))]
    pub async fn add(&self, body: &Value) -> ApiResult<Record> {
        self.store.dispatch(Action::FetchStart);

        let created = match self.api.create(body).await {
            Ok(created) => created,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        if created.id().is_some() {
            self.store.dispatch(Action::AddRecord(created.clone()));
        }
        self.refetch_after_mutation().await;
        Ok(created)
    }

    /// Update a document, then refetch the list
    #[instrument(skip(self, fields), fields(resource = self.api.name()))]
    pub async fn update(&self, id: &str, fields: &Value) -> ApiResult<Record> {
        self.store.dispatch(Action::FetchStart);

        let updated = match self.api.update(id, fields).await {
            Ok(updated) => updated,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        if updated.has_id(id) {
            self.store.dispatch(Action::UpdateRecord(updated.clone()));
        }
        self.refetch_after_mutation().await;
        Ok(updated)
    }

    /// Delete a document, then refetch the list
    #[instrument(skip(self), fields(resource = self.api.name()))]
    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        self.store.dispatch(Action::FetchStart);

        if let Err(e) = self.api.remove(id).await {
            self.fail(&e);
            return Err(e);
        }

        self.store.dispatch(Action::RemoveRecord(id.to_string()));
        self.refetch_after_mutation().await;
        Ok(())
    }

    /// The mutation already succeeded; a failed refetch only shows up in state.
    async fn refetch_after_mutation(&self) {
        if let Err(e) = self.refetch().await {
            warn!(error = %e, "Refetch after mutation failed");
        }
    }

    fn fail(&self, error: &medrec_api_client::ApiError) {
        self.store.dispatch(Action::SetError(error.user_message()));
    }
}
