use std::fs;
use std::path::PathBuf;

use leadgate_core::audit::{AuditRecord, AuditTrail};
use leadgate_core::errors::ApplicationError;
use tracing::warn;

/// Flat JSON audit store. Each append reads the whole file as a list,
/// appends, and writes it back; an unreadable or corrupt file is treated as
/// an empty store and overwritten. Concurrent writers are not supported.
#[derive(Clone, Debug)]
pub struct JsonAuditTrail {
    path: PathBuf,
}

impl JsonAuditTrail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current store contents. Missing and corrupt stores both read as
    /// empty.
    pub fn read_all(&self) -> Vec<AuditRecord> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "audit store is corrupt, treating it as empty"
                );
                Vec::new()
            }
        }
    }
}

impl AuditTrail for JsonAuditTrail {
    fn append(&self, record: AuditRecord) -> Result<(), ApplicationError> {
        let mut records = self.read_all();
        records.push(record);

        let payload = serde_json::to_string_pretty(&records).map_err(|error| {
            ApplicationError::Persistence(format!("could not serialize audit store: {error}"))
        })?;

        fs::write(&self.path, payload).map_err(|error| {
            ApplicationError::Persistence(format!(
                "could not write audit store `{}`: {error}",
                self.path.display()
            ))
        })
    }
}
