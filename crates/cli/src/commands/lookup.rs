use leadgate_core::config::{AppConfig, LoadOptions};
use leadgate_store::lookup_role_by_phone;

use super::CommandResult;

pub fn run(phone: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("lookup", "config_validation", error.to_string(), 2)
        }
    };

    let role = lookup_role_by_phone(&config.data.output_csv, phone);
    CommandResult::success("lookup", format!("{} -> {role}", phone.trim()))
}
