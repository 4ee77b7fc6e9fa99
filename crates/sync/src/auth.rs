//! Login and registration state

use medrec_api_client::endpoints::auth::{LoginRequest, SignupRequest, SignupResponse};
use medrec_api_client::{ApiError, ApiResult, MedrecClient, Session};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// What the front end shows about the current user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub role: Option<String>,
    pub organization: Option<String>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    fn signed_in(session: &Session) -> Self {
        Self {
            role: session.role.clone(),
            organization: session.organization.clone(),
            token: Some(session.access_token.clone()),
            loading: false,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }
}

/// Drives signup, login and logout against the backend and local storage
#[derive(Debug)]
pub struct AuthController {
    client: MedrecClient,
    state: AuthState,
}

impl AuthController {
    /// Create a controller, picking up any still-valid stored session
    pub fn new(client: MedrecClient) -> Self {
        let state = match client.session().current() {
            Ok(Some(session)) => AuthState::signed_in(&session),
            Ok(None) => AuthState::default(),
            Err(e) => AuthState::failed(e.user_message()),
        };
        Self { client, state }
    }

    /// Current auth state
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.state.token.is_some()
    }

    /// Log in and persist the resulting session
    ///
    /// On failure role, organization and token are cleared and `error` holds
    /// a non-empty message.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> ApiResult<Session> {
        self.state.loading = true;
        self.state.error = None;

        match self.try_login(username, password).await {
            Ok(session) => {
                info!(role = session.role.as_deref().unwrap_or("-"), "Logged in");
                self.state = AuthState::signed_in(&session);
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.state = AuthState::failed(e.user_message());
                Err(e)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let response = self
            .client
            .auth()
            .login(&LoginRequest::new(username, password))
            .await?;

        let access_token = response
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unexpected("login response did not include a token"))?;

        let session = Session {
            access_token,
            role: response.role,
            organization: response.organization,
        };
        self.client.session().save(&session)?;
        Ok(session)
    }

    /// Register a new user
    ///
    /// When the backend answers with a token, the new session is persisted
    /// and the controller is signed in.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&mut self, request: &SignupRequest) -> ApiResult<SignupResponse> {
        self.state.loading = true;
        self.state.error = None;

        let result = self.client.auth().signup(request).await;
        match result {
            Ok(response) => {
                match response.token.as_deref().filter(|t| !t.is_empty()) {
                    Some(token) => {
                        let session = Session {
                            access_token: token.to_string(),
                            role: response.role.clone().or_else(|| request.role.clone()),
                            organization: response
                                .organization
                                .clone()
                                .or_else(|| request.organization.clone()),
                        };
                        if let Err(e) = self.client.session().save(&session) {
                            self.state = AuthState::failed(e.user_message());
                            return Err(e);
                        }
                        self.state = AuthState::signed_in(&session);
                    }
                    None => self.state.loading = false,
                }
                info!("Signed up");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                self.state.loading = false;
                self.state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Forget the session locally
    pub fn logout(&mut self) -> ApiResult<()> {
        self.client.session().clear()?;
        self.state = AuthState::default();
        info!("Logged out");
        Ok(())
    }
}
