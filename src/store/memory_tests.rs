#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::ledger::lifecycle;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn seed(store: &mut MemoryStore) -> (i64, i64) {
    let alloc = Allocation::new("Treasury".into(), "Public Works".into(), dec!(100), date(1));
    let alloc_id = store.insert_allocation(&alloc).unwrap();
    let txn = Transaction::new(alloc_id, dec!(60), "Cement".into(), date(2));
    let txn_id = store.insert_transaction(&txn).unwrap();
    (alloc_id, txn_id)
}

// ── Basic records ─────────────────────────────────────────────

#[test]
fn test_ids_are_assigned() {
    let mut store = MemoryStore::new();
    let (alloc_id, txn_id) = seed(&mut store);
    assert_ne!(alloc_id, txn_id);
    assert_eq!(store.get_allocation(alloc_id).unwrap().unwrap().id, Some(alloc_id));
    assert_eq!(store.get_transaction(txn_id).unwrap().unwrap().id, Some(txn_id));
    assert!(store.get_transaction(999).unwrap().is_none());
}

#[test]
fn test_category_names_unique_case_insensitive() {
    let mut store = MemoryStore::new();
    store.insert_category(&SpendingCategory::new("Equipment".into())).unwrap();
    assert!(store
        .insert_category(&SpendingCategory::new("EQUIPMENT".into()))
        .is_err());
    store.insert_category(&SpendingCategory::new("Construction".into())).unwrap();
    let names: Vec<_> = store
        .get_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Construction", "Equipment"]);
}

#[test]
fn test_clones_share_state() {
    let mut a = MemoryStore::new();
    let b = a.clone();
    let (alloc_id, _) = seed(&mut a);
    assert!(b.get_allocation(alloc_id).unwrap().is_some());
}

#[test]
fn test_transaction_filter_and_order() {
    let mut store = MemoryStore::new();
    let (alloc_id, first) = seed(&mut store);
    let mut later = Transaction::new(alloc_id, dec!(5), "Paint".into(), date(10));
    later.status = TransactionStatus::Flagged;
    let later_id = store.insert_transaction(&later).unwrap();

    let all = store.get_transactions(&TransactionFilter::default()).unwrap();
    assert_eq!(
        all.iter().map(|t| t.id.unwrap()).collect::<Vec<_>>(),
        vec![later_id, first]
    );

    let flagged = store
        .get_transactions(&TransactionFilter {
            status: Some(TransactionStatus::Flagged),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(flagged.len(), 1);

    let limited = store
        .get_transactions(&TransactionFilter {
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(limited[0].id, Some(later_id));

    let other = store
        .get_transactions(&TransactionFilter {
            allocation_id: Some(alloc_id + 100),
            ..Default::default()
        })
        .unwrap();
    assert!(other.is_empty());
}

// ── annotate_transaction ──────────────────────────────────────

#[test]
fn test_annotate_only_when_status_matches() {
    let mut store = MemoryStore::new();
    let (_, txn_id) = seed(&mut store);
    assert!(!store
        .annotate_transaction(txn_id, TransactionStatus::Flagged, "nope")
        .unwrap());
    assert!(store
        .annotate_transaction(txn_id, TransactionStatus::Pending, "Insufficient funds")
        .unwrap());
    let txn = store.get_transaction(txn_id).unwrap().unwrap();
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(txn.status_reason.as_deref(), Some("Insufficient funds"));
}

// ── commit_transition ─────────────────────────────────────────

#[test]
fn test_commit_applies_debit_and_status_together() {
    let mut store = MemoryStore::new();
    let (alloc_id, txn_id) = seed(&mut store);
    let t = store
        .commit_transition(txn_id, |input| {
            lifecycle::approve(
                &input.transaction,
                &input.allocation,
                input.category.as_ref(),
                input.vendor.as_ref(),
                "officer",
            )
        })
        .unwrap();
    assert!(t.approval.id.is_some());
    assert_eq!(
        store.get_allocation(alloc_id).unwrap().unwrap().remaining_amount(),
        dec!(40)
    );
    assert_eq!(
        store.get_transaction(txn_id).unwrap().unwrap().status,
        TransactionStatus::Approved
    );
    assert_eq!(store.get_approvals(txn_id).unwrap().len(), 1);
}

#[test]
fn test_commit_failure_writes_nothing() {
    let mut store = MemoryStore::new();
    let (alloc_id, txn_id) = seed(&mut store);
    let err = store
        .commit_transition(txn_id, |_| {
            Err(LedgerError::validation("status_reason", "refused"))
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { .. }));
    assert_eq!(
        store.get_allocation(alloc_id).unwrap().unwrap().remaining_amount(),
        dec!(100)
    );
    assert!(store.get_approvals(txn_id).unwrap().is_empty());
}

#[test]
fn test_commit_rejects_stale_balance() {
    let mut store = MemoryStore::new();
    let (alloc_id, txn_id) = seed(&mut store);
    let err = store
        .commit_transition(txn_id, |input| {
            let stale = input.allocation.with_remaining(dec!(90));
            lifecycle::approve(&input.transaction, &stale, None, None, "officer")
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict { allocation_id } if allocation_id == alloc_id));
    assert_eq!(
        store.get_transaction(txn_id).unwrap().unwrap().status,
        TransactionStatus::Pending
    );
}

#[test]
fn test_commit_missing_transaction() {
    let mut store = MemoryStore::new();
    let err = store
        .commit_transition(77, |_| Err(LedgerError::validation("x", "unreachable")))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound {
            entity: Entity::Transaction,
            id: 77
        }
    ));
}

// ── Alerts ────────────────────────────────────────────────────

#[test]
fn test_alert_status_updates() {
    let mut store = MemoryStore::new();
    let id = store
        .insert_alert(&FraudAlert::new(
            "SPLIT_TRANSACTION".into(),
            AlertSeverity::High,
            "Split Transaction Pattern Detected".into(),
        ))
        .unwrap();
    assert_eq!(store.get_alerts(Some(AlertStatus::Open)).unwrap().len(), 1);

    store.update_alert_status(id, AlertStatus::Investigating).unwrap();
    assert!(store.get_alerts(Some(AlertStatus::Open)).unwrap().is_empty());
    assert_eq!(store.get_alerts(None).unwrap()[0].status, AlertStatus::Investigating);

    assert!(matches!(
        store.update_alert_status(id + 1, AlertStatus::Resolved),
        Err(LedgerError::NotFound {
            entity: Entity::Alert,
            ..
        })
    ));
}
