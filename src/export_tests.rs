#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::models::TransactionStatus;
use crate::store::MemoryStore;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

// ── write_transactions ────────────────────────────────────────

#[test]
fn test_header_only_when_empty() {
    let mut out = Vec::new();
    let count = write_transactions(&mut out, &[], &[], &[], &[]).unwrap();
    assert_eq!(count, 0);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text.trim_end(),
        "id,date,allocation,vendor,category,amount,risk_score,risk_level,status,reason"
    );
}

#[test]
fn test_rows_resolve_names() {
    let mut alloc = Allocation::new("Treasury".into(), "Health".into(), dec!(1000), date(1));
    alloc.id = Some(1);
    let mut vendor = Vendor::new("Okahandja Medical".into());
    vendor.id = Some(2);
    let mut category = SpendingCategory::new("Medical Equipment".into());
    category.id = Some(3);

    let mut flagged = Transaction::new(1, dec!(28500.00), "Scanner".into(), date(4));
    flagged.id = Some(10);
    flagged.vendor_id = Some(2);
    flagged.category_id = Some(3);
    flagged.risk_score = 75;
    flagged.status = TransactionStatus::Flagged;
    flagged.status_reason = Some("Unusual amount, review".into());

    let mut plain = Transaction::new(1, dec!(12), "Pens".into(), date(5));
    plain.id = Some(11);

    let mut out = Vec::new();
    let count = write_transactions(
        &mut out,
        &[plain, flagged],
        &[alloc],
        &[vendor],
        &[category],
    )
    .unwrap();
    assert_eq!(count, 2);

    let mut rdr = csv::Reader::from_reader(out.as_slice());
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], "11");
    assert_eq!(&rows[0][3], "");
    assert_eq!(&rows[0][4], "Uncategorized");
    assert_eq!(&rows[0][7], "Low Risk");
    assert_eq!(&rows[0][8], "pending");

    assert_eq!(&rows[1][1], "2024-03-04");
    assert_eq!(&rows[1][2], "Treasury → Health");
    assert_eq!(&rows[1][3], "Okahandja Medical");
    assert_eq!(&rows[1][4], "Medical Equipment");
    assert_eq!(&rows[1][5], "28500.00");
    assert_eq!(&rows[1][7], "High Risk");
    assert_eq!(&rows[1][9], "Unusual amount, review");
}

// ── export_to_csv ─────────────────────────────────────────────

#[test]
fn test_export_to_file() {
    let mut store = MemoryStore::new();
    let alloc_id = store
        .insert_allocation(&Allocation::new(
            "Donor".into(),
            "School".into(),
            dec!(500),
            date(1),
        ))
        .unwrap();
    for day in 1..=3 {
        store
            .insert_transaction(&Transaction::new(alloc_id, dec!(5), "Books".into(), date(day)))
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    assert_eq!(export_to_csv(&store, &path).unwrap(), 3);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().nth(1).unwrap().contains("2024-03-03"));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    assert!(export_to_csv(&store, &path).is_err());
}
