use std::env;
use std::sync::{Mutex, OnceLock};

use leadgate_cli::commands::{ask, classify, lookup, report_mismatch};
use serde_json::Value;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_env(vars: &[(&str, String)], run: impl FnOnce()) {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    for (key, value) in vars {
        env::set_var(key, value);
    }
    run();
    for (key, _) in vars {
        env::remove_var(key);
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|error| {
        panic!("expected JSON payload, got error {error} for output: {output}")
    })
}

fn data_env(dir: &tempfile::TempDir) -> Vec<(&'static str, String)> {
    vec![
        ("LEADGATE_DATA_INPUT_CSV", dir.path().join("leads.csv").display().to_string()),
        (
            "LEADGATE_DATA_OUTPUT_CSV",
            dir.path().join("classified_leads_output.csv").display().to_string(),
        ),
        ("LEADGATE_DATA_AUDIT_LOG", dir.path().join("interaction_audit.json").display().to_string()),
    ]
}

fn write_input(dir: &tempfile::TempDir, body: &str) {
    let mut content =
        String::from("Name,Phone Number,Buyer/Channel Partner/Enquiry/Site Visit\n");
    content.push_str(body);
    std::fs::write(dir.path().join("leads.csv"), content).expect("write input");
}

fn write_classified_store(dir: &tempfile::TempDir) {
    std::fs::write(
        dir.path().join("classified_leads_output.csv"),
        "Lead_ID,Name,Phone,Source_Number,Assigned_Role\n\
         LEAD-0001,Priya,9999999999,Buyer_Line,BUYER\n",
    )
    .expect("write classified store");
}

fn read_audit(dir: &tempfile::TempDir) -> Value {
    let raw = std::fs::read_to_string(dir.path().join("interaction_audit.json"))
        .expect("audit store exists");
    serde_json::from_str(&raw).expect("audit store is valid JSON")
}

#[test]
fn classify_classifies_the_configured_input_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(&dir, "Priya,9999999999,Buyer_Line\n,,\n");

    with_env(&data_env(&dir), || {
        let result = classify::run(None, None, true);
        assert_eq!(result.exit_code, 0, "expected successful classify run: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "classify");
        assert_eq!(payload["total"], 2);
        assert_eq!(payload["matched"], 1);
        assert_eq!(payload["missing"], 1);
        assert_eq!(payload["role_counts"]["BUYER"], 1);
        assert_eq!(payload["problems"].as_array().map(Vec::len), Some(2));

        let written = std::fs::read_to_string(dir.path().join("classified_leads_output.csv"))
            .expect("output written");
        assert!(written.lines().nth(1).is_some_and(|line| line.ends_with("BUYER")));
    });
}

#[test]
fn classify_fails_cleanly_when_input_is_missing() {
    let dir = tempfile::tempdir().expect("tempdir");

    with_env(&data_env(&dir), || {
        let result = classify::run(None, None, true);
        assert_eq!(result.exit_code, 3, "expected lead store failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "lead_store");
    });
}

#[test]
fn ask_routes_by_role_and_appends_an_audit_record() {
    let dir = tempfile::tempdir().expect("tempdir");

    with_env(&data_env(&dir), || {
        // Role tags are accepted case-insensitively.
        let result = ask::run(Some("buyer"), None, "tell me about the emi options", true);
        assert_eq!(result.exit_code, 0, "expected successful ask run: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["role"], "BUYER");
        assert_eq!(payload["violation"], false);
        assert!(payload["response"].as_str().is_some_and(|text| text.contains("banking partners")));

        let audit = read_audit(&dir);
        let records = audit.as_array().expect("audit list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["role"], "BUYER");
        assert_eq!(records[0]["violation_flag"], false);
    });
}

#[test]
fn ask_refuses_banned_topics_and_flags_the_audit_record() {
    let dir = tempfile::tempdir().expect("tempdir");

    with_env(&data_env(&dir), || {
        let result =
            ask::run(Some("CHANNEL_PARTNER"), None, "what is the pricing for a 2BHK", true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["violation"], true);
        assert_eq!(payload["trigger_term"], "pricing");
        assert!(payload["response"].as_str().is_some_and(|text| text.contains("'pricing'")));

        let audit = read_audit(&dir);
        assert_eq!(audit[0]["violation_flag"], true);
    });
}

#[test]
fn ask_resolves_the_role_from_a_classified_phone_number() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_classified_store(&dir);

    with_env(&data_env(&dir), || {
        let result = ask::run(None, Some("9999999999"), "tell me about the emi options", true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["role"], "BUYER");
        assert_eq!(payload["violation"], false);
    });
}

#[test]
fn ask_with_an_unrecorded_phone_routes_to_the_unknown_role() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_classified_store(&dir);

    with_env(&data_env(&dir), || {
        let result = ask::run(None, Some("0000000000"), "tell me about the emi options", true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["role"], "UNKNOWN");
        assert_eq!(payload["violation"], false);
        assert!(payload["response"].as_str().is_some_and(|text| text.contains("Unknown role")));
    });
}

#[test]
fn ask_without_role_or_phone_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir");

    with_env(&data_env(&dir), || {
        let result = ask::run(None, None, "anything", true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "bad_arguments");
    });
}

#[test]
fn lookup_reports_recorded_and_unknown_phones() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_classified_store(&dir);

    with_env(&data_env(&dir), || {
        let result = lookup::run("9999999999");
        assert_eq!(result.exit_code, 0);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], "9999999999 -> BUYER");

        let result = lookup::run("1231231234");
        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], "1231231234 -> UNKNOWN");
    });
}

#[test]
fn report_mismatch_appends_a_flagged_audit_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_classified_store(&dir);

    with_env(&data_env(&dir), || {
        let result = report_mismatch::run("9999999999");
        assert_eq!(result.exit_code, 0, "expected successful mismatch report: {}", result.output);

        let audit = read_audit(&dir);
        let records = audit.as_array().expect("audit list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["event"], "ROLE_MISMATCH_REPORTED");
        assert_eq!(records[0]["current_role"], "BUYER");
        assert_eq!(records[0]["violation_flag"], true);
    });
}
