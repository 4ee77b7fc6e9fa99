//! Shared setup for every command

use anyhow::{Context, Result};
use medrec_api_client::{ApiError, ClientConfig, MedrecClient, SessionManager};
use medrec_core::config::Config;
use medrec_core::error::{exit_codes, Error as CoreError};
use medrec_core::storage::FileStorage;
use medrec_telemetry::TelemetryConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration and client resolved from file, environment and flags
pub struct AppContext {
    pub config: Config,
    pub client: MedrecClient,
}

impl AppContext {
    /// Load configuration, start logging and build the backend client
    ///
    /// Precedence is defaults, then the config file, then environment
    /// variables, then command-line flags.
    pub fn load(
        config_path: Option<&Path>,
        api_url: Option<&str>,
        storage_path: Option<&Path>,
        verbose: bool,
    ) -> Result<Self> {
        let config = Config::load(config_path)?;

        let mut telemetry = TelemetryConfig::with_level(&config.schema.logging.level);
        telemetry.json = config.schema.logging.json;
        if verbose {
            telemetry.log_level =
                "medrec=debug,medrec_api_client=debug,medrec_sync=debug,medrec_core=debug"
                    .to_string();
            telemetry.show_target = true;
        }
        // A subscriber may already be installed when embedded in tests
        let _ = medrec_telemetry::init_with_config(telemetry);

        let mut client_config = ClientConfig::from_file_config(&config.schema.api)?;
        if let Some(url) = api_url {
            client_config = client_config.with_base_url(url);
        }

        let storage_file = storage_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.schema.storage.resolve_path());
        let storage = FileStorage::open(&storage_file)
            .with_context(|| format!("Failed to open storage at {}", storage_file.display()))?;
        debug!(
            storage = %storage_file.display(),
            base_url = %client_config.base_url,
            "Context ready"
        );

        let session = SessionManager::new(Arc::new(storage), client_config.session_ttl);
        let client = MedrecClient::with_config(client_config, session)?;

        Ok(Self { config, client })
    }
}

/// Message shown to the user for a failed command
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) => api.user_message(),
        None => format!("{err:#}"),
    }
}

/// Structured report for local failures, rendered as JSON
pub fn error_report(err: &anyhow::Error) -> Option<String> {
    let core = match err.downcast_ref::<ApiError>() {
        Some(ApiError::Storage(core)) => core,
        Some(_) => return None,
        None => err.downcast_ref::<CoreError>()?,
    };
    serde_json::to_string_pretty(&core.to_report()).ok()
}

/// Process exit code for a failed command
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    let code = if let Some(api) = err.downcast_ref::<ApiError>() {
        match api {
            ApiError::Config(_) | ApiError::InvalidUrl(_) => exit_codes::CONFIG_ERROR,
            ApiError::Storage(core) => core_exit_code(core),
            _ if api.is_unauthorized() => exit_codes::SESSION_ERROR,
            _ => exit_codes::API_ERROR,
        }
    } else if let Some(core) = err.downcast_ref::<CoreError>() {
        core_exit_code(core)
    } else {
        exit_codes::FAILURE
    };
    u8::try_from(code).unwrap_or(1)
}

fn core_exit_code(err: &CoreError) -> i32 {
    match err.code.category() {
        "Configuration" => exit_codes::CONFIG_ERROR,
        "Validation" => exit_codes::VALIDATION_ERROR,
        _ => exit_codes::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_exit_codes() {
        let err = anyhow::Error::new(ApiError::from_response_body(500, "{}"));
        assert_eq!(exit_code_for(&err), 4);

        let err = anyhow::Error::new(ApiError::from_response_body(401, r#"{"message":"nope"}"#));
        assert_eq!(exit_code_for(&err), 5);
        assert_eq!(user_message(&err), "nope");

        let err = anyhow::Error::new(ApiError::from_response_body(
            403,
            r#"{"message":"Not allowed"}"#,
        ));
        assert_eq!(exit_code_for(&err), 4);
        assert_eq!(user_message(&err), "Not allowed");

        let err = anyhow::Error::new(ApiError::config("bad url"));
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn test_core_error_exit_codes() {
        let err = anyhow::Error::new(CoreError::validation("not JSON"));
        assert_eq!(exit_code_for(&err), 2);

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(exit_code_for(&err), 1);
        assert_eq!(user_message(&err), "plain failure");
    }

    #[test]
    fn test_error_report_only_for_local_failures() {
        let err = anyhow::Error::new(CoreError::validation("not JSON"));
        assert!(error_report(&err).is_some_and(|r| r.contains("E6000")));

        let err = anyhow::Error::new(ApiError::from_response_body(500, "{}"));
        assert!(error_report(&err).is_none());
    }
}
