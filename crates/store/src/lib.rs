//! File-backed adapters for the narrow I/O seams the core defines: CSV lead
//! reader/writer, the flat JSON audit trail, and the phone-to-role lookup
//! over previously classified output.

pub mod audit_log;
pub mod csv;
pub mod lookup;

pub use audit_log::JsonAuditTrail;
pub use csv::{CsvLeadReader, CsvLeadWriter, NAME_COLUMN, OUTPUT_COLUMNS, PHONE_COLUMN, SOURCE_COLUMN};
pub use lookup::lookup_role_by_phone;
