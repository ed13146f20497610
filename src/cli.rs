use anyhow::{bail, Context, Result};
use std::path::Path;

use fundguard::engine::AllocationSummary;
use fundguard::ledger::{HealthTier, RiskLevel};
use fundguard::models::{AlertStatus, TransactionStatus};
use fundguard::util::{format_amount, shellexpand, truncate, usage_bar};
use fundguard::{BudgetEngine, Database, TransactionFilter};

type Engine = BudgetEngine<Database>;

pub(crate) fn run(args: &[String], engine: &mut Engine) -> Result<()> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };
    let mut rest = args[1..].to_vec();
    match command.as_str() {
        "allocations" | "a" => cli_allocations(&mut rest, engine),
        "transactions" | "t" => cli_transactions(&mut rest, engine),
        "vendors" | "v" => cli_vendors(&mut rest, engine),
        "approve" => cli_approve(&mut rest, engine),
        "reject" => cli_reject(&mut rest, engine),
        "alerts" => cli_alerts(&mut rest, engine),
        "alert-status" => cli_alert_status(&rest, engine),
        "summary" | "s" => cli_summary(engine),
        "export" => cli_export(&rest, engine),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fundguard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("FundGuard — budget ledger for public-fund allocations");
    println!();
    println!("Usage: fundguard [--db <path>] <command>");
    println!();
    println!("Commands:");
    println!("  allocations                   List allocations with usage and health");
    println!("    --health <tier>             Only healthy, low_balance or critical");
    println!("  transactions                  List transactions, newest first");
    println!("    --status <status>           {}", status_names());
    println!("    --allocation <id>           Only this allocation");
    println!("    --limit <n>                 At most n rows");
    println!("  vendors                       List vendors with risk and tax status");
    println!("    --search <text>             Match name or registration number");
    println!("  approve <txn-id>              Approve and debit the allocation");
    println!("    --by <name>                 Approver (default: $USER)");
    println!("  reject <txn-id> <reason...>   Reject with a reason");
    println!("    --by <name>                 Approver (default: $USER)");
    println!("  alerts                        List fraud alerts");
    println!("    --status <status>           open, investigating, resolved, dismissed");
    println!("  alert-status <id> <status>    Change an alert's review status");
    println!("  summary                       Print dashboard figures");
    println!("  export [path]                 Export transactions to CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Environment: FUNDGUARD_DB (database path), FUNDGUARD_LOG (log filter)");
}

fn status_names() -> String {
    TransactionStatus::all()
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remove `flag` and its value from `args`, returning the value.
pub(crate) fn take_flag(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{flag} needs a value");
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn parse_id(value: &str, what: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {what} id: {value}"))
}

fn approver(args: &mut Vec<String>) -> Result<String> {
    Ok(take_flag(args, "--by")?
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "officer".into()))
}

fn cli_allocations(args: &mut Vec<String>, engine: &Engine) -> Result<()> {
    let summaries = match take_flag(args, "--health")? {
        Some(tier) => {
            let tier = HealthTier::parse(&tier)
                .ok_or_else(|| anyhow::anyhow!("Unknown health tier: {tier}"))?;
            engine
                .store()
                .get_allocations_by_health(tier)?
                .into_iter()
                .map(AllocationSummary::of)
                .collect()
        }
        None => engine.allocation_summaries(None)?,
    };

    if summaries.is_empty() {
        println!("No allocations");
        return Ok(());
    }

    println!(
        "{:<5} {:<36} {:>18} {:>18} {:>7}  {:<12} Health",
        "ID", "Allocation", "Amount", "Remaining", "Used", ""
    );
    println!("{}", "─".repeat(110));
    for s in &summaries {
        println!(
            "{:<5} {:<36} {:>18} {:>18} {:>6.1}%  {:<12} {}",
            s.allocation.id.unwrap_or(0),
            truncate(&s.allocation.label(), 36),
            format_amount(s.allocation.amount()),
            format_amount(s.allocation.remaining_amount()),
            s.usage_percent,
            usage_bar(s.usage_percent, 12),
            s.health.label(),
        );
    }
    Ok(())
}

fn cli_transactions(args: &mut Vec<String>, engine: &Engine) -> Result<()> {
    let status = match take_flag(args, "--status")? {
        Some(s) => Some(
            TransactionStatus::parse(&s).ok_or_else(|| {
                anyhow::anyhow!("Unknown status: {s} (expected {})", status_names())
            })?,
        ),
        None => None,
    };
    let allocation_id = match take_flag(args, "--allocation")? {
        Some(id) => Some(parse_id(&id, "allocation")?),
        None => None,
    };
    let limit = match take_flag(args, "--limit")? {
        Some(n) => Some(
            n.parse::<u32>()
                .with_context(|| format!("Invalid limit: {n}"))?,
        ),
        None => None,
    };

    let txns = engine.transactions(&TransactionFilter {
        allocation_id,
        status,
        limit,
    })?;
    if txns.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<6} {:<28} {:>16} {:<10} {:<9} Reason",
        "ID", "Date", "Alloc", "Description", "Amount", "Risk", "Status"
    );
    println!("{}", "─".repeat(110));
    for t in &txns {
        println!(
            "{:<6} {:<10} {:<6} {:<28} {:>16} {:<10} {:<9} {}",
            t.id.unwrap_or(0),
            t.transaction_date.format("%Y-%m-%d").to_string(),
            t.allocation_id,
            truncate(&t.description, 28),
            format_amount(t.amount),
            RiskLevel::from_score(t.risk_score).label(),
            t.status.as_str(),
            t.status_reason.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

fn cli_vendors(args: &mut Vec<String>, engine: &Engine) -> Result<()> {
    let query = take_flag(args, "--search")?;
    let vendors = engine.vendors(query.as_deref())?;
    if vendors.is_empty() {
        match query {
            Some(q) => println!("No vendors match '{q}'"),
            None => println!("No vendors"),
        }
        return Ok(());
    }

    println!(
        "{:<5} {:<30} {:<16} {:<10} {:<4} Status",
        "ID", "Vendor", "Registration", "Risk", "Tax"
    );
    println!("{}", "─".repeat(80));
    for v in &vendors {
        println!(
            "{:<5} {:<30} {:<16} {:<10} {:<4} {}",
            v.id.unwrap_or(0),
            truncate(&v.name, 30),
            truncate(v.registration_number.as_deref().unwrap_or("-"), 16),
            RiskLevel::from_score(v.risk_score).label(),
            if v.is_tax_registered() { "yes" } else { "no" },
            if v.is_blacklisted { "BLACKLISTED" } else { "" },
        );
    }

    let tax_registered = vendors.iter().filter(|v| v.is_tax_registered()).count();
    let blacklisted = vendors.iter().filter(|v| v.is_blacklisted).count();
    println!();
    println!(
        "{} vendors, {tax_registered} tax-registered, {blacklisted} blacklisted",
        vendors.len()
    );
    Ok(())
}

fn cli_approve(args: &mut Vec<String>, engine: &mut Engine) -> Result<()> {
    let by = approver(args)?;
    let Some(id) = args.first() else {
        bail!("Usage: fundguard approve <txn-id> [--by <name>]");
    };
    let id = parse_id(id, "transaction")?;

    let txn = engine.approve(id, &by)?;
    let summary = engine.allocation_summary(txn.allocation_id)?;
    println!(
        "Approved transaction {id}: {} debited from allocation {}",
        format_amount(txn.amount),
        txn.allocation_id
    );
    println!(
        "  Remaining: {} ({:.1}% used, {})",
        format_amount(summary.allocation.remaining_amount()),
        summary.usage_percent,
        summary.health.label()
    );
    Ok(())
}

fn cli_reject(args: &mut Vec<String>, engine: &mut Engine) -> Result<()> {
    let by = approver(args)?;
    if args.len() < 2 {
        bail!("Usage: fundguard reject <txn-id> <reason...> [--by <name>]");
    }
    let id = parse_id(&args[0], "transaction")?;
    let reason = args[1..].join(" ");

    engine.reject(id, &reason, &by)?;
    println!("Rejected transaction {id}: {reason}");
    Ok(())
}

fn cli_alerts(args: &mut Vec<String>, engine: &Engine) -> Result<()> {
    let status = match take_flag(args, "--status")? {
        Some(s) => {
            Some(AlertStatus::parse(&s).ok_or_else(|| anyhow::anyhow!("Unknown alert status: {s}"))?)
        }
        None => None,
    };

    let alerts = engine.alerts(status)?;
    if alerts.is_empty() {
        println!("No alerts");
        return Ok(());
    }

    println!(
        "{:<5} {:<9} {:<14} {:<7} {:<24} Title",
        "ID", "Severity", "Status", "Txn", "Rule"
    );
    println!("{}", "─".repeat(90));
    for a in &alerts {
        println!(
            "{:<5} {:<9} {:<14} {:<7} {:<24} {}",
            a.id.unwrap_or(0),
            a.severity.as_str(),
            a.status.as_str(),
            a.transaction_id.map(|id| id.to_string()).unwrap_or_default(),
            truncate(&a.rule_code, 24),
            a.title,
        );
    }
    Ok(())
}

fn cli_alert_status(args: &[String], engine: &mut Engine) -> Result<()> {
    let [id, status] = args else {
        bail!("Usage: fundguard alert-status <id> <status>");
    };
    let id = parse_id(id, "alert")?;
    let status =
        AlertStatus::parse(status).ok_or_else(|| anyhow::anyhow!("Unknown alert status: {status}"))?;
    engine.set_alert_status(id, status)?;
    println!("Alert {id} is now {status}");
    Ok(())
}

fn cli_summary(engine: &Engine) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let stats = engine.dashboard(today)?;

    println!("FundGuard — {today}");
    println!("{}", "─".repeat(44));
    println!("  Allocations:      {}", stats.allocation_count);
    println!("  Total allocated:  {}", format_amount(stats.total_allocated));
    println!("  Total remaining:  {}", format_amount(stats.total_remaining));
    println!("  Total spent:      {}", format_amount(stats.total_spent()));
    println!(
        "  Today:            {} txns, {}",
        stats.today_transactions,
        format_amount(stats.today_amount)
    );
    println!("  Pending review:   {}", stats.pending_count);
    println!(
        "  Blocked:          {} txns, {}",
        stats.blocked_count,
        format_amount(stats.blocked_amount)
    );
    println!(
        "  Active alerts:    {} ({} critical, {} high)",
        stats.active_alerts, stats.critical_alerts, stats.high_alerts
    );
    Ok(())
}

fn cli_export(args: &[String], engine: &Engine) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let today = chrono::Local::now().format("%Y-%m-%d");
            format!("{home}/fundguard-export-{today}.csv")
        });

    let count = fundguard::export::export_to_csv(engine.store(), Path::new(&output_path))?;
    if count == 0 {
        println!("No transactions to export");
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
