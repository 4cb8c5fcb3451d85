use clap::Subcommand;
use serde_json::{Map, Value};

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::services::config_service;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the settings in effect, environment overrides included.
    Show,

    /// Change a stored setting.
    Set {
        /// base_url, language, session_cookie, cooldown_secs,
        /// request_timeout_secs or feedback_reset_delay_ms.
        key: String,

        /// New value. An empty session_cookie clears it.
        value: String,
    },
}

fn print_described(pairs: Vec<(&'static str, String)>, json: bool) -> Result<(), PortalError> {
    if json {
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::String(value)))
            .collect();
        return print_json(&map);
    }
    for (key, value) in pairs {
        println!("{:<24} {}", key, value);
    }
    Ok(())
}

pub fn handle_config_command(cmd: ConfigCommand, ctx: &AppContext) -> Result<(), PortalError> {
    match cmd {
        ConfigCommand::Show => print_described(config_service::describe(&ctx.config), ctx.json),
        ConfigCommand::Set { key, value } => {
            let config = config_service::set_value(&ctx.store, &key, &value)?;
            print_described(config_service::describe(&config), ctx.json)
        }
    }
}
