//! Raw authenticated GET.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::cli::context::CliContext;
use crate::cli::display::{output, CommandOutput};

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct GetOutput(pub Value);

impl CommandOutput for GetOutput {
    fn to_human(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }

    fn to_json(&self) -> Value {
        self.0.clone()
    }
}

pub async fn execute(ctx: &CliContext, path: &str, json_mode: bool) -> Result<()> {
    let body: Value = ctx
        .client
        .get_json(path, None)
        .await
        .with_context(|| format!("GET {path} failed"))?;

    output(&GetOutput(body), json_mode);
    Ok(())
}
