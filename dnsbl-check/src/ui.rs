//! Console output for the dnsbl-check CLI.
//!
//! Progress narration, highlighted matches, the closing summary and the
//! `--list-blacklists` table. Uses only the `console` crate.

use console::{pad_str, style, Alignment};
use dnsbl_check_lib::{is_default_blacklist, MatchEvent, ProbeEvent, VERSION};
use std::path::Path;
use std::time::Duration;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a run.
pub fn print_header(label: &str, address_count: usize, blacklist_count: usize, concurrency: usize) {
    println!(
        "{} {} {}",
        style("dnsbl-check").bold(),
        style(format!("v{}", VERSION)).dim(),
        style(format!("- Checking {}", label)).dim(),
    );
    println!(
        "{}",
        style(format!(
            "{} | {} | Concurrency: {}",
            plural(address_count, "address", "addresses"),
            plural(blacklist_count, "blacklist", "blacklists"),
            concurrency
        ))
        .dim()
    );
    println!();
}

// ── Event narration ──────────────────────────────────────────────────────────

/// Narrate a single probe event as the aggregator receives it.
///
/// Address errors go to stderr so stdout stays a clean progress log.
pub fn print_event(event: &ProbeEvent, quiet: bool) {
    match event {
        ProbeEvent::Checking { address, blacklist } => {
            if !quiet {
                println!("{}", style(checking_line(address, blacklist)).dim());
            }
        }
        ProbeEvent::Matched(matched) => println!("{}", format_match_line(matched)),
        ProbeEvent::AddressError(error) => {
            eprintln!(
                "{} {}: {}",
                style("Error:").red().bold(),
                error.address,
                error.message
            );
        }
    }
}

fn checking_line(address: &str, blacklist: &str) -> String {
    format!("Checking {} against {}...", address, blacklist)
}

/// Highlighted line for an address found on a blacklist.
pub fn format_match_line(event: &MatchEvent) -> String {
    format!(
        "  {}  {}  {}",
        style("LISTED").red().bold(),
        style(pad_str(&event.address, 15, Alignment::Left, None)).white(),
        style(&event.blacklist).yellow(),
    )
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print where the report went, or that there was nothing to write.
pub fn print_report_outcome(path: Option<&Path>) {
    println!();
    println!("{}", report_outcome_line(path));
}

fn report_outcome_line(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!(
            "{} {}",
            style("Results saved to").green(),
            style(path.display()).bold()
        ),
        None => format!("{}", style("No blacklisted IPs found.").green()),
    }
}

/// Print the closing summary bar.
pub fn print_summary(listed: usize, checked: usize, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!("  {}", summary_line(listed, checked, duration));
}

fn summary_line(listed: usize, checked: usize, duration: Duration) -> String {
    let listed_text = format!("{} listed", listed);
    format!(
        "{} checked in {:.1}s  {}  {}",
        style(plural(checked, "address", "addresses")).bold(),
        duration.as_secs_f64(),
        style("|").dim(),
        if listed == 0 {
            style(listed_text).green()
        } else {
            style(listed_text).red()
        },
    )
}

// ── Blacklist listing ────────────────────────────────────────────────────────

/// Print the blacklists a run would probe, marking zones that are not built in.
pub fn print_blacklists(blacklists: &[String]) {
    println!();
    println!(
        "{}",
        style(format!("Blacklists ({}):", blacklists.len())).yellow().bold()
    );
    println!();
    for zone in blacklists {
        println!("  {}", blacklist_line(zone));
    }
    println!();
    println!("Add more with: dnsbl-check <target> -b <zone>");
}

fn blacklist_line(zone: &str) -> String {
    if is_default_blacklist(zone) {
        format!("{}", style(zone).green())
    } else {
        format!("{} {}", style(zone).cyan(), style("(custom)").dim())
    }
}

/// Confirm that `--init-config` wrote its file.
pub fn print_config_written(path: &Path) {
    println!(
        "{} {}",
        style("Configuration written to").green(),
        style(path.display()).bold()
    );
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

// ── Tests ────────────────────────────────────────────────────────────────────
