//! Authentication API endpoints
//!
//! - `PUT /auth/signup` register a patient together with an initial clinical record
//! - `POST /auth/login` exchange credentials for a token, role and organization

use crate::client::MedrecClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Auth API interface
#[derive(Clone)]
pub struct AuthApi {
    client: MedrecClient,
}

impl AuthApi {
    /// Create a new auth API interface
    pub(crate) fn new(client: MedrecClient) -> Self {
        Self { client }
    }

    /// Register a new user
    ///
    /// PUT /auth/signup
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupResponse> {
        let response: Option<SignupResponse> =
            self.client.put(&["auth", "signup"], request).await?;
        Ok(response.unwrap_or_default())
    }

    /// Log in with username and password
    ///
    /// POST /auth/login
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.client.post(&["auth", "login"], request).await
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Plain-text password, sent over the configured transport
    pub password: String,
}

impl LoginRequest {
    /// Create a login request
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Login response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Role granted to the user
    #[serde(default)]
    pub role: Option<String>,
    /// Organization the user belongs to
    #[serde(default)]
    pub organization: Option<String>,
    /// Bearer token; a login without one is treated as failed
    #[serde(default)]
    pub token: Option<String>,
}

/// Registration request body
///
/// `record` carries the nested clinical-record fragment captured at signup.
/// Any additional form fields travel in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Account name
    pub username: String,
    /// Chosen password
    pub password: String,
    /// Full name of the patient or practitioner
    pub name: String,
    /// Contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Requested role, e.g. `patient` or `doctor`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Organization to join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Initial clinical record, sent as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
    /// Any other form fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignupRequest {
    /// Create a request with the required fields
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the email address
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the requested role
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the organization
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Attach the initial clinical record
    #[must_use]
    pub fn with_record(mut self, record: Value) -> Self {
        self.record = Some(record);
        self
    }
}

/// Registration response body
///
/// Backends answer either with a created session or with a bare `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupResponse {
    /// Confirmation text from the backend
    #[serde(default)]
    pub message: Option<String>,
    /// Bearer token when the backend signs the new user in
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    /// Role granted to the new user
    #[serde(default)]
    pub role: Option<String>,
    /// Organization of the new user
    #[serde(default)]
    pub organization: Option<String>,
    /// Any other response fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signup_request_serialization() {
        let request = SignupRequest::new("jdoe", "s3cret", "Jane Doe")
            .with_email("jane@example.org")
            .with_record(json!({"BloodType": "O+", "Allergies": ["penicillin"]}));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["username"], "jdoe");
        assert_eq!(value["record"]["BloodType"], "O+");
        assert!(value.get("role").is_none());
    }

    #[test]
    fn test_signup_extra_fields_flattened() {
        let mut request = SignupRequest::new("jdoe", "pw", "Jane");
        request.extra.insert("phone".to_string(), json!("555-0100"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["phone"], "555-0100");
    }

    #[test]
    fn test_login_response_partial() {
        let response: LoginResponse = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(response.token.as_deref(), Some("abc"));
        assert!(response.role.is_none());
    }

    #[test]
    fn test_signup_response_access_token_alias() {
        let response: SignupResponse =
            serde_json::from_str(r#"{"access_token":"t","role":"patient"}"#).unwrap();
        assert_eq!(response.token.as_deref(), Some("t"));
        assert_eq!(response.role.as_deref(), Some("patient"));
    }
}
