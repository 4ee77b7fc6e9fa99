//! Prescription (medication request) API endpoints
//!
//! All routes require a bearer token.
//!
//! - `POST /prescription/search` list prescriptions matching a filter
//! - `GET /prescription/{id}` fetch one prescription
//! - `POST /prescription` create a prescription
//! - `PATCH /prescription/{id}` partially update a prescription
//! - `DELETE /prescription/{id}` delete a prescription

use crate::client::MedrecClient;
use crate::error::ApiResult;
use crate::record::{records_from_value, Record};
use serde_json::Value;

const PRESCRIPTION: &str = "prescription";

/// Prescriptions API interface
#[derive(Clone)]
pub struct PrescriptionsApi {
    client: MedrecClient,
}

impl PrescriptionsApi {
    /// Create a new prescriptions API interface
    pub(crate) fn new(client: MedrecClient) -> Self {
        Self { client }
    }

    /// Search prescriptions. An empty object matches everything.
    ///
    /// POST /prescription/search
    pub async fn search(&self, filter: &Value) -> ApiResult<Vec<Record>> {
        let body: Value = self.client.post(&[PRESCRIPTION, "search"], filter).await?;
        records_from_value(body)
    }

    /// Get a single prescription by ID
    ///
    /// GET /prescription/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Record> {
        self.client.get(&[PRESCRIPTION, id]).await
    }

    /// Create a prescription
    ///
    /// POST /prescription
    pub async fn create(&self, prescription: &Value) -> ApiResult<Record> {
        self.client.post(&[PRESCRIPTION], prescription).await
    }

    /// Update an existing prescription
    ///
    /// PATCH /prescription/{id}
    pub async fn update(&self, id: &str, fields: &Value) -> ApiResult<Record> {
        self.client.patch(&[PRESCRIPTION, id], fields).await
    }

    /// Delete a prescription
    ///
    /// DELETE /prescription/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<Value> {
        self.client.delete(&[PRESCRIPTION, id]).await
    }
}
