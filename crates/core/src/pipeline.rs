use std::collections::BTreeMap;

use crate::classify::RuleSet;
use crate::domain::lead::{LeadId, LeadRecord, MatchStatus, RawLeadRow};
use crate::domain::role::RoleTag;
use crate::errors::ApplicationError;

/// Narrow interface to the external tabular reader.
pub trait LeadSource {
    fn read_rows(&mut self) -> Result<Vec<RawLeadRow>, ApplicationError>;
}

/// Narrow interface to the external tabular writer.
pub trait LeadSink {
    fn write_records(&mut self, records: &[LeadRecord]) -> Result<(), ApplicationError>;
}

/// Match-quality counters for one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub matched: usize,
    pub missing: usize,
    pub unrecognized: usize,
}

impl StatusCounts {
    fn record(&mut self, status: MatchStatus) {
        match status {
            MatchStatus::Matched => self.matched += 1,
            MatchStatus::Missing => self.missing += 1,
            MatchStatus::Unrecognized => self.unrecognized += 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub role_counts: BTreeMap<RoleTag, usize>,
    pub status_counts: StatusCounts,
    pub problems: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutcome {
    pub records: Vec<LeadRecord>,
    pub summary: BatchSummary,
}

/// Runs the classifier over every row a source yields and emits enriched
/// records to a sink, in input order. Row-level data issues (blank name,
/// blank or malformed phone) are collected as problems and never abort the
/// run; only source/sink I/O failures are errors.
#[derive(Clone, Debug, Default)]
pub struct BatchProcessor {
    rules: RuleSet,
}

impl BatchProcessor {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn run(
        &self,
        source: &mut dyn LeadSource,
        sink: &mut dyn LeadSink,
    ) -> Result<BatchOutcome, ApplicationError> {
        let rows = source.read_rows()?;

        let mut records = Vec::with_capacity(rows.len());
        let mut summary = BatchSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let record = self.enrich_row(row_number, &row, &mut summary.problems);

            summary.status_counts.record(record.status);
            *summary.role_counts.entry(record.role.clone()).or_insert(0) += 1;
            records.push(record);
        }

        summary.total = records.len();
        sink.write_records(&records)?;

        Ok(BatchOutcome { records, summary })
    }

    fn enrich_row(
        &self,
        row_number: usize,
        row: &RawLeadRow,
        problems: &mut Vec<String>,
    ) -> LeadRecord {
        let name = row.name.trim();
        let phone = row.phone.trim();
        let source = row.source.trim();

        if name.is_empty() {
            problems.push(format!("row {row_number}: name is blank"));
        }

        if phone.is_empty() {
            problems.push(format!("row {row_number}: phone number is blank"));
        } else if !phone_is_numeric(phone) {
            problems.push(format!("row {row_number}: phone `{phone}` has non-numeric chars"));
        }

        let classification = self.rules.classify(Some(source));

        LeadRecord {
            id: LeadId::from_row_number(row_number),
            name: name.to_string(),
            phone: phone.to_string(),
            source: source.to_string(),
            role: classification.role,
            status: classification.status,
        }
    }
}

/// Dashes, plus signs, and spaces are formatting, not data problems.
fn phone_is_numeric(phone: &str) -> bool {
    let digits: String =
        phone.chars().filter(|&ch| !matches!(ch, '-' | '+' | ' ')).collect();
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

/// In-memory source for tests and pre-read row batches.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLeadSource {
    rows: Vec<RawLeadRow>,
}

impl InMemoryLeadSource {
    pub fn new(rows: Vec<RawLeadRow>) -> Self {
        Self { rows }
    }
}

impl LeadSource for InMemoryLeadSource {
    fn read_rows(&mut self) -> Result<Vec<RawLeadRow>, ApplicationError> {
        Ok(self.rows.clone())
    }
}

/// In-memory sink capturing what would have been written.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLeadSink {
    records: Vec<LeadRecord>,
}

impl InMemoryLeadSink {
    pub fn records(&self) -> &[LeadRecord] {
        &self.records
    }
}

impl LeadSink for InMemoryLeadSink {
    fn write_records(&mut self, records: &[LeadRecord]) -> Result<(), ApplicationError> {
        self.records.extend_from_slice(records);
        Ok(())
    }
}
