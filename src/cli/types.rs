//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::models::SortKey;

#[derive(Parser, Debug)]
#[command(name = "tablefetch")]
#[command(about = "tablefetch - paginated admin API client", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .tablefetch/
    #[arg(short, long, global = true, env = "TABLEFETCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the access token
    Login(LoginArgs),

    /// Log out and forget the stored session
    Logout,

    /// Fetch one page of a collection endpoint
    List(ListArgs),

    /// GET an arbitrary API path and print the JSON body
    Get {
        /// Request path, e.g. /api/users/42
        path: String,
    },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long, env = "TABLEFETCH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Collection endpoint, e.g. /api/users/paginate
    pub endpoint: String,

    /// Page number (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: u32,

    /// Page size (10, 18, 24 or 30)
    #[arg(short, long)]
    pub limit: Option<String>,

    /// Sort column; prefix with '-' for descending
    #[arg(short, long, default_value = "")]
    pub sort: SortKey,

    /// Free-text search
    #[arg(long, default_value = "")]
    pub search: String,

    /// Filter clause such as age>=21 or status=active (repeatable)
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Extra query parameter as key=value (repeatable)
    #[arg(long = "param")]
    pub params: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "tablefetch",
            "list",
            "/api/users/paginate",
            "--limit",
            "24",
            "--sort",
            "-created_at",
            "--filter",
            "age>=21",
            "--filter",
            "status=active",
            "--param",
            "role=admin",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.endpoint, "/api/users/paginate");
        assert_eq!(args.page, 1);
        assert_eq!(args.limit.as_deref(), Some("24"));
        assert_eq!(args.sort, SortKey::descending("created_at"));
        assert_eq!(args.filters, vec!["age>=21", "status=active"]);
        assert_eq!(args.params, vec!["role=admin"]);
    }

    #[test]
    fn test_parse_login_requires_email() {
        let result = Cli::try_parse_from(["tablefetch", "login", "--password", "pw"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_get_with_config() {
        let cli = Cli::try_parse_from(["tablefetch", "--config", "alt.yaml", "get", "/api/roles"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        assert!(matches!(cli.command, Commands::Get { ref path } if path == "/api/roles"));
    }
}
