use std::fs;
use std::path::Path;

use leadgate_core::RoleTag;

use crate::csv::{split_line, OUTPUT_COLUMNS};

/// Scans a previously classified output file for an exact phone match and
/// returns the recorded role. No store, no match, or a blank phone all
/// resolve to the unknown role; this lookup never fails.
pub fn lookup_role_by_phone(path: &Path, phone: &str) -> RoleTag {
    let phone = phone.trim();
    if phone.is_empty() {
        return RoleTag::unknown();
    }

    let Ok(raw) = fs::read_to_string(path) else {
        return RoleTag::unknown();
    };

    let mut lines = raw.lines();
    let Some(header) = lines.next() else {
        return RoleTag::unknown();
    };

    let columns = split_line(header);
    let phone_index = columns.iter().position(|column| column == OUTPUT_COLUMNS[2]);
    let role_index = columns.iter().position(|column| column == OUTPUT_COLUMNS[4]);
    let (Some(phone_index), Some(role_index)) = (phone_index, role_index) else {
        return RoleTag::unknown();
    };

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        if fields.get(phone_index).map(String::as_str) == Some(phone) {
            return fields
                .get(role_index)
                .filter(|role| !role.trim().is_empty())
                .map(|role| RoleTag::new(role.trim()))
                .unwrap_or_else(RoleTag::unknown);
        }
    }

    RoleTag::unknown()
}
