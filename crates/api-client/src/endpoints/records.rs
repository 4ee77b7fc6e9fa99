//! Medical records API endpoints
//!
//! - `GET /records` list all records visible to the caller
//! - `GET /records/{id}` fetch one record
//! - `POST /records` create a record
//! - `PATCH /records/{id}` partially update a record
//! - `DELETE /records/{id}` delete a record

use crate::client::MedrecClient;
use crate::error::ApiResult;
use crate::record::{records_from_value, Record};
use serde_json::Value;

const RECORDS: &str = "records";

/// Records API interface
#[derive(Clone)]
pub struct RecordsApi {
    client: MedrecClient,
}

impl RecordsApi {
    /// Create a new records API interface
    pub(crate) fn new(client: MedrecClient) -> Self {
        Self { client }
    }

    /// List records
    ///
    /// GET /records
    pub async fn list(&self) -> ApiResult<Vec<Record>> {
        let body: Value = self.client.get(&[RECORDS]).await?;
        records_from_value(body)
    }

    /// Get a single record by ID
    ///
    /// GET /records/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Record> {
        self.client.get(&[RECORDS, id]).await
    }

    /// Create a record
    ///
    /// POST /records
    pub async fn create(&self, record: &Value) -> ApiResult<Record> {
        self.client.post(&[RECORDS], record).await
    }

    /// Update an existing record with the given fields
    ///
    /// PATCH /records/{id}
    pub async fn update(&self, id: &str, fields: &Value) -> ApiResult<Record> {
        self.client.patch(&[RECORDS, id], fields).await
    }

    /// Delete a record
    ///
    /// DELETE /records/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<Value> {
        self.client.delete(&[RECORDS, id]).await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::session::SessionManager;
    use crate::MedrecClient;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, MedrecClient) {
        let server = MockServer::start().await;
        let config = ClientConfig::default().with_base_url(server.uri());
        let session = SessionManager::in_memory(config.session_ttl);
        let client = MedrecClient::with_config(config, session).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn test_list_records() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"RecordID": "r1", "Name": "Alice"},
                {"RecordID": "r2", "Name": "Bob"}
            ])))
            .mount(&server)
            .await;

        let records = client.records().list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].has_id("r1"));
    }

    #[tokio::test]
    async fn test_update_uses_patch() {
        let (server, client) = setup().await;
        Mock::given(method("PATCH"))
            .and(path("/records/r1"))
            .and(body_json(json!({"Name": "Alicia"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"RecordID": "r1", "Name": "Alicia"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updated = client
            .records()
            .update("r1", &json!({"Name": "Alicia"}))
            .await
            .unwrap();
        assert_eq!(updated.get("Name"), Some(&json!("Alicia")));
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/records/nope"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Record not found"})),
            )
            .mount(&server)
            .await;

        let err = client.records().get("nope").await.unwrap_err();
        assert_eq!(err.user_message(), "Record not found");
    }
}
