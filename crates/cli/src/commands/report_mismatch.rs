use leadgate_core::audit::{AuditRecord, AuditTrail};
use leadgate_core::config::{AppConfig, LoadOptions};
use leadgate_store::{lookup_role_by_phone, JsonAuditTrail};

use super::CommandResult;

/// Records that a caller disputed the role on file for their phone number.
/// The entry is flagged for admin review; nothing is reclassified here.
pub fn run(phone: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "report-mismatch",
                "config_validation",
                error.to_string(),
                2,
            )
        }
    };

    let current_role = lookup_role_by_phone(&config.data.output_csv, phone);

    let trail = JsonAuditTrail::new(&config.data.audit_log);
    if let Err(error) = trail.append(AuditRecord::role_mismatch(phone.trim(), current_role.clone()))
    {
        return CommandResult::failure("report-mismatch", "audit_store", error.to_string(), 3);
    }

    CommandResult::success(
        "report-mismatch",
        format!("recorded role mismatch for {} (current role: {current_role})", phone.trim()),
    )
}
