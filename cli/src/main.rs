//! Command-line front end for the account API.
//!
//! Loads configuration at start-up (the process refuses to run without a
//! valid `API_URL`), validates form input against its schema, runs one
//! operation and prints the typed result as JSON.

use account_core::config::API_URL_VAR;
use account_core::{
    Config, Executor, LoginInput, ProfileInput, ProfileUpdate, RegisterInput, UserPreferences, Validated,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "account", about = "Talk to the account API", version)]
struct Cli {
    /// Base URL of the API; falls back to the API_URL environment variable.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for authenticated operations.
    #[arg(long, env = "API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange credentials for a token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the signed-in user.
    Profile,
    /// Replace the signed-in user's profile from a JSON form value.
    UpdateProfile { json: String },
    /// Revoke the current token.
    Logout,
    /// Show the settings-page profile.
    SettingsProfile,
    /// Update the settings-page profile from a JSON form value.
    UpdateSettingsProfile { json: String },
    /// Show preferences.
    Preferences,
    /// Update preferences from a JSON form value. `notifications` is
    /// required; other omitted fields take defaults.
    UpdatePreferences { json: String },
}

fn load_config(api_url: Option<String>) -> Result<Config> {
    Config::from_lookup(|name| {
        if name == API_URL_VAR {
            if let Some(url) = &api_url {
                return Some(url.clone());
            }
        }
        std::env::var(name).ok()
    })
    .context("invalid configuration")
}

/// Parse a JSON form value through its schema before anything is sent.
fn form_value(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("form value is not JSON")
}

fn form<T: Validated>(raw: &str) -> Result<T> {
    Ok(T::from_json(&form_value(raw)?)?)
}

fn preferences_form(raw: &str) -> Result<UserPreferences> {
    Ok(UserPreferences::from_form(&form_value(raw)?)?)
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.api_url)?;
    debug!(api_url = %config.api_url, app = %config.app_name, "configuration loaded");

    let mut executor = Executor::from_config(&config);
    if let Some(token) = cli.token {
        executor = executor.with_bearer(token);
    }

    match cli.command {
        Command::Login { email, password } => {
            let input = LoginInput { email, password };
            input.validate()?;
            print(&executor.login(&input)?)
        }
        Command::Register { name, email, password } => {
            let input = RegisterInput { name, email, password };
            input.validate()?;
            print(&executor.register(&input)?)
        }
        Command::Profile => print(&executor.get_profile()?),
        Command::UpdateProfile { json } => {
            let input: ProfileInput = form(&json)?;
            print(&executor.update_profile(&input)?)
        }
        Command::Logout => executor.logout().map_err(Into::into),
        Command::SettingsProfile => print(&executor.get_settings_profile()?),
        Command::UpdateSettingsProfile { json } => {
            let input: ProfileUpdate = form(&json)?;
            print(&executor.update_settings_profile(&input)?)
        }
        Command::Preferences => print(&executor.get_preferences()?),
        Command::UpdatePreferences { json } => {
            let input = preferences_form(&json)?;
            print(&executor.update_preferences(&input)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flag_overrides_environment_url() {
        let config = load_config(Some("http://127.0.0.1:9999/".to_string())).unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn malformed_flag_url_is_rejected() {
        assert!(load_config(Some("not a url".to_string())).is_err());
    }

    #[test]
    fn form_rejects_invalid_website() {
        let err = form::<ProfileUpdate>(r#"{"name":"Ada","email":"ada@example.com","website":"not-a-url"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("website"));
    }

    #[test]
    fn form_fills_preference_defaults() {
        let prefs = preferences_form(r#"{"notifications":{}}"#).unwrap();
        assert_eq!(prefs, UserPreferences::default());
    }

    #[test]
    fn preference_form_requires_notifications() {
        let err = preferences_form("{}").unwrap_err();
        assert!(err.to_string().contains("notifications"));
    }

    #[test]
    fn parses_update_preferences_subcommand() {
        let cli = Cli::try_parse_from(["account", "--token", "t", "update-preferences", r#"{"theme":"dark","notifications":{}}"#]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert!(matches!(cli.command, Command::UpdatePreferences { .. }));
    }
}
