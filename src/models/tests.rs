#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::error::LedgerError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_allocation(amount: Decimal) -> Allocation {
    Allocation::new(
        "Treasury".into(),
        "Public Works".into(),
        amount,
        date(2024, 1, 1),
    )
}

// ── Allocation ────────────────────────────────────────────────

#[test]
fn test_allocation_new_starts_full() {
    let alloc = make_allocation(dec!(5000000));
    assert!(alloc.id.is_none());
    assert_eq!(alloc.amount(), dec!(5000000));
    assert_eq!(alloc.remaining_amount(), dec!(5000000));
    assert_eq!(alloc.currency, "NAD");
    assert!(alloc.allowed_categories.is_empty());
    assert!(alloc.forbidden_categories.is_empty());
    assert!(!alloc.created_at.is_empty());
}

#[test]
fn test_allocation_with_categories_dedupes() {
    let alloc = make_allocation(dec!(100)).with_categories([3, 1, 3], [7]);
    assert_eq!(alloc.allowed_categories.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert!(alloc.forbidden_categories.contains(&7));
}

#[test]
fn test_allocation_restore_accepts_bounds() {
    let alloc = make_allocation(dec!(100));
    assert_eq!(alloc.clone().restore(dec!(0)).unwrap().remaining_amount(), dec!(0));
    assert_eq!(alloc.clone().restore(dec!(100)).unwrap().remaining_amount(), dec!(100));
    assert_eq!(alloc.restore(dec!(40.50)).unwrap().remaining_amount(), dec!(40.50));
}

#[test]
fn test_allocation_restore_rejects_out_of_range() {
    let alloc = make_allocation(dec!(100));
    assert!(matches!(
        alloc.clone().restore(dec!(-1)),
        Err(LedgerError::Corrupt { column: "remaining_amount", .. })
    ));
    assert!(matches!(
        alloc.restore(dec!(100.01)),
        Err(LedgerError::Corrupt { .. })
    ));
}

#[test]
fn test_allocation_validate() {
    assert!(make_allocation(dec!(0)).validate().is_ok());
    assert!(make_allocation(dec!(10)).validate().is_ok());

    let negative = make_allocation(dec!(-5));
    assert!(matches!(
        negative.validate(),
        Err(LedgerError::Validation { field: "amount", .. })
    ));

    let mut backwards = make_allocation(dec!(10));
    backwards.end_date = Some(date(2023, 12, 31));
    assert!(matches!(
        backwards.validate(),
        Err(LedgerError::Validation { field: "end_date", .. })
    ));

    let mut same_day = make_allocation(dec!(10));
    same_day.end_date = Some(date(2024, 1, 1));
    assert!(same_day.validate().is_ok());

    let mut blank = make_allocation(dec!(10));
    blank.source = "  ".into();
    assert!(blank.validate().is_err());
}

#[test]
fn test_allocation_validate_caps_amount() {
    assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
    assert!(make_allocation(MAX_AMOUNT).validate().is_ok());
    assert!(matches!(
        make_allocation(dec!(1000000000000000000000000000)).validate(),
        Err(LedgerError::Validation { field: "amount", .. })
    ));
    assert!(matches!(
        make_allocation(Decimal::MAX).validate(),
        Err(LedgerError::Validation { field: "amount", .. })
    ));
}

#[test]
fn test_allocation_validate_rejects_partially_spent() {
    let spent = make_allocation(dec!(10)).restore(dec!(5)).unwrap();
    assert!(matches!(
        spent.validate(),
        Err(LedgerError::Validation { field: "remaining_amount", .. })
    ));
}

#[test]
fn test_allocation_label() {
    let mut alloc = make_allocation(dec!(1));
    assert_eq!(alloc.label(), "Treasury → Public Works");
    alloc.department = Some("Roads".into());
    assert_eq!(alloc.label(), "Treasury → Public Works / Roads");
}

// ── TransactionStatus ─────────────────────────────────────────

#[test]
fn test_status_parse() {
    assert_eq!(TransactionStatus::parse("pending"), Some(TransactionStatus::Pending));
    assert_eq!(TransactionStatus::parse("FLAGGED"), Some(TransactionStatus::Flagged));
    assert_eq!(TransactionStatus::parse(" blocked "), Some(TransactionStatus::Blocked));
    assert_eq!(TransactionStatus::parse("approved"), Some(TransactionStatus::Approved));
    assert_eq!(TransactionStatus::parse("rejected"), Some(TransactionStatus::Rejected));
    assert_eq!(TransactionStatus::parse("escalated"), None);
}

#[test]
fn test_status_roundtrip() {
    for s in TransactionStatus::all() {
        assert_eq!(TransactionStatus::parse(s.as_str()), Some(*s), "Roundtrip failed for {s}");
    }
}

#[test]
fn test_status_terminal() {
    assert!(!TransactionStatus::Pending.is_terminal());
    assert!(!TransactionStatus::Flagged.is_terminal());
    assert!(TransactionStatus::Blocked.is_terminal());
    assert!(TransactionStatus::Approved.is_terminal());
    assert!(TransactionStatus::Rejected.is_terminal());
}

#[test]
fn test_status_transitions() {
    use TransactionStatus::*;
    assert!(Pending.can_transition_to(Approved));
    assert!(Pending.can_transition_to(Rejected));
    assert!(Flagged.can_transition_to(Approved));
    assert!(Flagged.can_transition_to(Rejected));
    assert!(!Pending.can_transition_to(Flagged));
    assert!(!Pending.can_transition_to(Pending));

    // Nothing leaves a terminal status
    for from in [Approved, Rejected, Blocked] {
        for to in TransactionStatus::all() {
            assert!(!from.can_transition_to(*to), "{from} -> {to} should be refused");
        }
    }
}

#[test]
fn test_status_initial() {
    assert!(TransactionStatus::Pending.is_initial());
    assert!(TransactionStatus::Flagged.is_initial());
    assert!(TransactionStatus::Blocked.is_initial());
    assert!(!TransactionStatus::Approved.is_initial());
    assert!(!TransactionStatus::Rejected.is_initial());
}

// ── Transaction ───────────────────────────────────────────────

fn make_txn(status: TransactionStatus) -> Transaction {
    let mut txn = Transaction::new(1, dec!(45000), "Office Equipment".into(), date(2024, 3, 1));
    txn.status = status;
    txn
}

#[test]
fn test_transaction_new_defaults() {
    let txn = make_txn(TransactionStatus::Pending);
    assert!(txn.id.is_none());
    assert_eq!(txn.allocation_id, 1);
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert!(txn.status_reason.is_none());
    assert_eq!(txn.risk_score, 0);
}

#[test]
fn test_transaction_with_status_is_a_new_value() {
    let txn = make_txn(TransactionStatus::Pending);
    let rejected = txn.with_status(TransactionStatus::Rejected, Some("duplicate invoice".into()));
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(rejected.status, TransactionStatus::Rejected);
    assert_eq!(rejected.status_reason.as_deref(), Some("duplicate invoice"));
    assert_eq!(rejected.amount, txn.amount);
}

#[test]
fn test_transaction_review_and_blocked_spend() {
    assert!(make_txn(TransactionStatus::Pending).is_pending_review());
    assert!(make_txn(TransactionStatus::Flagged).is_pending_review());
    assert!(!make_txn(TransactionStatus::Approved).is_pending_review());

    assert!(make_txn(TransactionStatus::Rejected).is_blocked_spend());
    assert!(make_txn(TransactionStatus::Flagged).is_blocked_spend());
    assert!(make_txn(TransactionStatus::Blocked).is_blocked_spend());
    assert!(!make_txn(TransactionStatus::Pending).is_blocked_spend());
    assert!(!make_txn(TransactionStatus::Approved).is_blocked_spend());
}

// ── SpendingCategory ──────────────────────────────────────────

#[test]
fn test_category_new() {
    let cat = SpendingCategory::new("Equipment".into());
    assert!(cat.id.is_none());
    assert!(!cat.is_restricted);
    assert!(SpendingCategory::restricted("Entertainment".into()).is_restricted);
}

#[test]
fn test_category_find() {
    let mut a = SpendingCategory::new("Construction".into());
    a.id = Some(1);
    let mut b = SpendingCategory::new("Equipment".into());
    b.id = Some(2);
    let cats = vec![a, b];
    assert_eq!(SpendingCategory::find_by_name(&cats, "equipment").unwrap().id, Some(2));
    assert_eq!(SpendingCategory::find_by_id(&cats, 1).unwrap().name, "Construction");
    assert!(SpendingCategory::find_by_id(&cats, 9).is_none());
    assert_eq!(format!("{}", cats[0]), "Construction");
}

// ── Vendor ────────────────────────────────────────────────────

#[test]
fn test_vendor_matches_search() {
    let mut v = Vendor::new("Namib Build Supplies".into());
    v.registration_number = Some("CC/2019/04412".into());
    assert!(v.matches_search("build"));
    assert!(v.matches_search("NAMIB"));
    assert!(v.matches_search("cc/2019"));
    assert!(!v.matches_search("windhoek"));
    assert!(!Vendor::new("Khomas Catering".into()).matches_search("cc/2019"));
}

#[test]
fn test_vendor_tax_registration() {
    let mut vendor = Vendor::new("ABC Supplies".into());
    assert!(!vendor.is_tax_registered());
    vendor.tax_reference = Some(" ".into());
    assert!(!vendor.is_tax_registered());
    vendor.tax_reference = Some("TAX-1".into());
    assert!(vendor.is_tax_registered());
}

// ── Alerts & approvals ────────────────────────────────────────

#[test]
fn test_alert_status_parse_and_active() {
    assert_eq!(AlertStatus::parse("Investigating"), Some(AlertStatus::Investigating));
    assert_eq!(AlertStatus::parse("closed"), None);
    assert!(AlertStatus::Open.is_active());
    assert!(AlertStatus::Investigating.is_active());
    assert!(!AlertStatus::Resolved.is_active());
    assert!(!AlertStatus::Dismissed.is_active());
}

#[test]
fn test_alert_new_is_open() {
    let alert = FraudAlert::new("GHOST_VENDOR".into(), AlertSeverity::High, "Unregistered Vendor".into());
    assert_eq!(alert.status, AlertStatus::Open);
    assert!(alert.transaction_id.is_none());
    assert!(AlertSeverity::Critical > AlertSeverity::High);
}

#[test]
fn test_decision_target_status() {
    assert_eq!(Decision::Approved.target_status(), TransactionStatus::Approved);
    assert_eq!(Decision::Rejected.target_status(), TransactionStatus::Rejected);
    assert_eq!(Decision::parse("approved"), Some(Decision::Approved));
    assert_eq!(Decision::parse("escalated"), None);
}
