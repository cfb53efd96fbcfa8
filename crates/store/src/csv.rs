use std::fs;
use std::path::PathBuf;

use leadgate_core::errors::ApplicationError;
use leadgate_core::pipeline::{LeadSink, LeadSource};
use leadgate_core::{LeadRecord, RawLeadRow};

/// Input column labels, as exported by the lead capture sheet.
pub const NAME_COLUMN: &str = "Name";
pub const PHONE_COLUMN: &str = "Phone Number";
pub const SOURCE_COLUMN: &str = "Buyer/Channel Partner/Enquiry/Site Visit";

/// Output column order. Fixed; downstream consumers index by position.
pub const OUTPUT_COLUMNS: [&str; 5] =
    ["Lead_ID", "Name", "Phone", "Source_Number", "Assigned_Role"];

/// Reads raw lead rows from a headered CSV file, keyed by the fixed column
/// labels. Rows shorter than the header are padded with empty fields.
#[derive(Clone, Debug)]
pub struct CsvLeadReader {
    path: PathBuf,
}

impl CsvLeadReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LeadSource for CsvLeadReader {
    fn read_rows(&mut self) -> Result<Vec<RawLeadRow>, ApplicationError> {
        let raw = fs::read_to_string(&self.path).map_err(|error| {
            ApplicationError::Persistence(format!(
                "could not read lead file `{}`: {error}",
                self.path.display()
            ))
        })?;

        let mut lines = raw.lines();
        let header = lines.next().ok_or_else(|| {
            ApplicationError::Persistence(format!(
                "lead file `{}` is empty (missing header row)",
                self.path.display()
            ))
        })?;

        let columns = split_line(header);
        let name_index = column_index(&columns, NAME_COLUMN, &self.path)?;
        let phone_index = column_index(&columns, PHONE_COLUMN, &self.path)?;
        let source_index = column_index(&columns, SOURCE_COLUMN, &self.path)?;

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_line(line);
            rows.push(RawLeadRow {
                name: field_at(&fields, name_index),
                phone: field_at(&fields, phone_index),
                source: field_at(&fields, source_index),
            });
        }

        Ok(rows)
    }
}

/// Writes enriched records with the fixed output header, one row per record,
/// in the order given.
#[derive(Clone, Debug)]
pub struct CsvLeadWriter {
    path: PathBuf,
}

impl CsvLeadWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LeadSink for CsvLeadWriter {
    fn write_records(&mut self, records: &[LeadRecord]) -> Result<(), ApplicationError> {
        let mut output = String::new();
        output.push_str(&join_line(&OUTPUT_COLUMNS.map(String::from)));
        output.push('\n');

        for record in records {
            let fields = [
                record.id.as_str().to_string(),
                record.name.clone(),
                record.phone.clone(),
                record.source.clone(),
                record.role.to_string(),
            ];
            output.push_str(&join_line(&fields));
            output.push('\n');
        }

        fs::write(&self.path, output).map_err(|error| {
            ApplicationError::Persistence(format!(
                "could not write classified output `{}`: {error}",
                self.path.display()
            ))
        })
    }
}

fn column_index(
    columns: &[String],
    label: &str,
    path: &std::path::Path,
) -> Result<usize, ApplicationError> {
    columns.iter().position(|column| column == label).ok_or_else(|| {
        ApplicationError::Persistence(format!(
            "lead file `{}` is missing required column `{label}`",
            path.display()
        ))
    })
}

fn field_at(fields: &[String], index: usize) -> String {
    fields.get(index).cloned().unwrap_or_default()
}

/// Splits one CSV line, honoring double-quoted fields with doubled inner
/// quotes.
pub(crate) fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }

    fields.push(current);
    fields
}

pub(crate) fn join_line(fields: &[String]) -> String {
    fields.iter().map(|field| quote_field(field)).collect::<Vec<_>>().join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use leadgate_core::pipeline::{LeadSink, LeadSource};
    use leadgate_core::{LeadId, LeadRecord, MatchStatus, RoleTag};

    use super::{split_line, CsvLeadReader, CsvLeadWriter};

    #[test]
    fn split_handles_quotes_and_embedded_commas() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_line("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(split_line("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
        assert_eq!(split_line("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn reader_keys_rows_by_the_fixed_column_labels() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leads.csv");
        std::fs::write(
            &path,
            "Name,Phone Number,Buyer/Channel Partner/Enquiry/Site Visit\n\
             Priya,9999999999,Buyer_Line\n\
             \"Rao, Asha\",8888888888,Site Visit\n",
        )
        .expect("write input");

        let rows = CsvLeadReader::new(&path).read_rows().expect("rows parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Priya");
        assert_eq!(rows[0].source, "Buyer_Line");
        assert_eq!(rows[1].name, "Rao, Asha");
    }

    #[test]
    fn reader_rejects_a_file_without_the_expected_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leads.csv");
        std::fs::write(&path, "Name,Phone\nPriya,9999999999\n").expect("write input");

        let error = CsvLeadReader::new(&path).read_rows().expect_err("missing column");
        assert!(error.to_string().contains("Phone Number"));
    }

    #[test]
    fn writer_emits_header_and_rows_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("classified.csv");

        let records = vec![
            LeadRecord {
                id: LeadId::from_row_number(1),
                name: "Priya".to_string(),
                phone: "9999999999".to_string(),
                source: "Buyer_Line".to_string(),
                role: RoleTag::new("BUYER"),
                status: MatchStatus::Matched,
            },
            LeadRecord {
                id: LeadId::from_row_number(2),
                name: "Rao, Asha".to_string(),
                phone: "8888888888".to_string(),
                source: "Site Visit".to_string(),
                role: RoleTag::new("SITE_VISIT"),
                status: MatchStatus::Matched,
            },
        ];

        CsvLeadWriter::new(&path).write_records(&records).expect("write succeeds");

        let written = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "Lead_ID,Name,Phone,Source_Number,Assigned_Role");
        assert_eq!(lines[1], "LEAD-0001,Priya,9999999999,Buyer_Line,BUYER");
        assert_eq!(lines[2], "LEAD-0002,\"Rao, Asha\",8888888888,Site Visit,SITE_VISIT");
    }
}
