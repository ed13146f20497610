#![allow(clippy::unwrap_used)]

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn engine() -> Engine {
    BudgetEngine::new(Database::open_in_memory().unwrap())
}

// ── take_flag ─────────────────────────────────────────────────

#[test]
fn test_take_flag_removes_flag_and_value() {
    let mut a = args(&["approve", "--by", "ndapewa", "12"]);
    let value = take_flag(&mut a, "--by").unwrap();
    assert_eq!(value.as_deref(), Some("ndapewa"));
    assert_eq!(a, args(&["approve", "12"]));
}

#[test]
fn test_take_flag_absent() {
    let mut a = args(&["summary"]);
    assert_eq!(take_flag(&mut a, "--db").unwrap(), None);
    assert_eq!(a, args(&["summary"]));
}

#[test]
fn test_take_flag_missing_value() {
    let mut a = args(&["transactions", "--limit"]);
    assert!(take_flag(&mut a, "--limit").is_err());
}

#[test]
fn test_status_names_lists_every_status() {
    assert_eq!(
        status_names(),
        "pending, flagged, blocked, approved, rejected"
    );
}

#[test]
fn test_parse_id_rejects_garbage() {
    assert_eq!(parse_id(" 42 ", "transaction").unwrap(), 42);
    assert!(parse_id("forty", "transaction").is_err());
}

// ── run ───────────────────────────────────────────────────────

#[test]
fn test_run_help_and_empty() {
    let mut e = engine();
    run(&args(&["help"]), &mut e).unwrap();
    run(&[], &mut e).unwrap();
}

#[test]
fn test_run_unknown_command() {
    let mut e = engine();
    assert!(run(&args(&["launder"]), &mut e).is_err());
}

#[test]
fn test_run_read_commands_on_empty_ledger() {
    let mut e = engine();
    run(&args(&["allocations"]), &mut e).unwrap();
    run(&args(&["allocations", "--health", "critical"]), &mut e).unwrap();
    run(&args(&["transactions", "--status", "pending", "--limit", "5"]), &mut e).unwrap();
    run(&args(&["alerts", "--status", "open"]), &mut e).unwrap();
    run(&args(&["summary"]), &mut e).unwrap();
}

#[test]
fn test_run_rejects_unknown_filters() {
    let mut e = engine();
    assert!(run(&args(&["allocations", "--health", "great"]), &mut e).is_err());
    assert!(run(&args(&["transactions", "--status", "paid"]), &mut e).is_err());
    assert!(run(&args(&["transactions", "--limit", "-1"]), &mut e).is_err());
}

#[test]
fn test_run_approve_errors() {
    let mut e = engine();
    assert!(run(&args(&["approve"]), &mut e).is_err());
    assert!(run(&args(&["approve", "abc"]), &mut e).is_err());
    // No such transaction.
    assert!(run(&args(&["approve", "999", "--by", "auditor"]), &mut e).is_err());
}

#[test]
fn test_run_reject_needs_reason() {
    let mut e = engine();
    assert!(run(&args(&["reject", "1"]), &mut e).is_err());
}

#[test]
fn test_run_alert_status_usage() {
    let mut e = engine();
    assert!(run(&args(&["alert-status", "1"]), &mut e).is_err());
    assert!(run(&args(&["alert-status", "1", "closed"]), &mut e).is_err());
    assert!(run(&args(&["alert-status", "1", "resolved"]), &mut e).is_err());
}

#[test]
fn test_run_vendors() {
    let mut e = engine();
    run(&args(&["vendors"]), &mut e).unwrap();

    let mut vendor = fundguard::models::Vendor::new("Namib Build Supplies".into());
    vendor.registration_number = Some("CC/2019/04412".into());
    vendor.tax_reference = Some("TIN-2231".into());
    e.create_vendor(vendor).unwrap();

    run(&args(&["vendors"]), &mut e).unwrap();
    run(&args(&["v", "--search", "namib"]), &mut e).unwrap();
    run(&args(&["vendors", "--search", "nobody"]), &mut e).unwrap();
    assert!(run(&args(&["vendors", "--search"]), &mut e).is_err());
}
