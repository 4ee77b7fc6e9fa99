//! Signup, login, logout and session inspection

use crate::context::AppContext;
use crate::output::{parse_json_object, print_json, OutputFormat, Status};
use anyhow::Result;
use medrec_api_client::endpoints::auth::SignupRequest;
use medrec_sync::AuthController;
use serde::Serialize;

/// Fields collected by `medrec signup`
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub record: Option<String>,
}

impl SignupForm {
    fn into_request(self) -> Result<SignupRequest> {
        let mut request = SignupRequest::new(self.username, self.password, self.name);
        request.email = self.email;
        request.role = self.role;
        request.organization = self.organization;
        if let Some(raw) = self.record.as_deref() {
            request.record = Some(parse_json_object(raw)?);
        }
        Ok(request)
    }
}

#[derive(Serialize)]
struct WhoAmI {
    authenticated: bool,
    role: Option<String>,
    organization: Option<String>,
    expires_at: Option<String>,
    api_url: String,
}

pub async fn signup(ctx: &AppContext, form: SignupForm, format: OutputFormat) -> Result<()> {
    let request = form.into_request()?;
    let mut auth = AuthController::new(ctx.client.clone());
    let response = auth.signup(&request).await?;

    if format == OutputFormat::Json {
        return print_json(&response);
    }

    Status::success(response.message.as_deref().unwrap_or("Account created"));
    if auth.is_authenticated() {
        Status::info(&format!("Logged in as {}", request.username));
    } else {
        Status::info("Run `medrec login` to start a session");
    }
    Ok(())
}

pub async fn login(
    ctx: &AppContext,
    username: &str,
    password: &str,
    format: OutputFormat,
) -> Result<()> {
    let mut auth = AuthController::new(ctx.client.clone());
    let session = auth.login(username, password).await?;

    if format == OutputFormat::Json {
        return print_json(auth.state());
    }

    Status::success(&format!("Logged in as {username}"));
    if let Some(role) = &session.role {
        Status::info(&format!("Role: {role}"));
    }
    if let Some(org) = &session.organization {
        Status::info(&format!("Organization: {org}"));
    }
    Ok(())
}

pub fn logout(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let mut auth = AuthController::new(ctx.client.clone());
    let was_signed_in = auth.is_authenticated();
    auth.logout()?;

    if format == OutputFormat::Json {
        return print_json(auth.state());
    }

    if was_signed_in {
        Status::success("Logged out");
    } else {
        Status::info("No active session");
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let auth = AuthController::new(ctx.client.clone());
    let state = auth.state();
    let expires_at = if auth.is_authenticated() {
        ctx.client
            .session()
            .expires_at()?
            .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    } else {
        None
    };

    let info = WhoAmI {
        authenticated: auth.is_authenticated(),
        role: state.role.clone(),
        organization: state.organization.clone(),
        expires_at,
        api_url: ctx.client.base_url().to_string(),
    };

    if format == OutputFormat::Json {
        return print_json(&info);
    }

    Status::header("Session");
    if !info.authenticated {
        Status::warning("Not logged in");
    } else {
        println!("  Role:         {}", info.role.as_deref().unwrap_or("-"));
        println!("  Organization: {}", info.organization.as_deref().unwrap_or("-"));
        println!("  Expires:      {}", info.expires_at.as_deref().unwrap_or("never"));
    }
    println!("  Backend:      {}", info.api_url);
    if let Some(path) = &ctx.config.path {
        println!("  Config:       {}", path.display());
    }
    Ok(())
}
