//! Login and logout commands.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::display::{action_success, output, CommandOutput};
use crate::cli::types::LoginArgs;
use crate::domain::models::Credentials;

#[derive(Debug, Serialize)]
pub struct SessionOutput {
    pub authenticated: bool,
    pub message: String,
}

impl CommandOutput for SessionOutput {
    fn to_human(&self) -> String {
        action_success(&self.message)
    }
}

pub async fn login(ctx: &CliContext, args: LoginArgs, json_mode: bool) -> Result<()> {
    let credentials = Credentials {
        email: args.email,
        password: args.password,
    };

    let session = ctx
        .client
        .login(&credentials)
        .await
        .context("Login failed")?;

    let out = SessionOutput {
        authenticated: session.is_authenticated(),
        message: format!("Logged in as {}", credentials.email),
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn logout(ctx: &CliContext, json_mode: bool) -> Result<()> {
    let session = ctx.client.logout().await;

    let out = SessionOutput {
        authenticated: session.is_authenticated(),
        message: "Logged out".to_string(),
    };
    output(&out, json_mode);
    Ok(())
}
