//! Console report written to stdout. Diagnostics go through `tracing` on stderr.

use chrono::{DateTime, Local};

use crate::invites::InvitePlan;
use crate::names::Mismatch;
use crate::types::AcceptResponse;

/// Format the per-cycle status line: `"<YYYY-mm-dd HH:MM:SS> <message>"`.
pub fn status_line(now: DateTime<Local>, message: &str) -> String {
    format!("{} {message}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Print the timestamped status line that opens each poll cycle.
pub fn report_status(message: &str) {
    println!("{}", status_line(Local::now(), message));
}

/// One line per mismatch, or a single all-clear line.
pub fn report_mismatches(mismatches: &[Mismatch]) {
    if mismatches.is_empty() {
        println!("No mismatches found.");
        return;
    }
    for mismatch in mismatches {
        println!("{mismatch}");
    }
}

/// Summarize an invite plan before any action is taken.
pub fn report_invite_plan(plan: &InvitePlan) {
    println!(
        "Found {} requested invites and {} accepted members.",
        plan.requested, plan.accepted
    );
    for member in &plan.to_accept {
        println!("Accepting invite for user: {}", member.member_name);
    }
    if !plan.unknown.is_empty() {
        let names: Vec<&str> = plan.unknown.iter().map(|m| m.member_name.as_str()).collect();
        println!("Unknown users requesting invites: {}", names.join(", "));
    }
    for member in &plan.accepted_unsorted {
        println!("User {} was accepted but is not sorted.", member.member_name);
    }
}

pub fn accept_result_lines(accepted: usize, resp: &AcceptResponse) -> Vec<String> {
    if resp.is_success() {
        vec![format!("{accepted} Invites accepted successfully.")]
    } else {
        vec![
            format!("Failed to accept invites. Status code: {}", resp.status),
            resp.body.clone(),
        ]
    }
}

pub fn report_accept_result(accepted: usize, resp: &AcceptResponse) {
    for line in accept_result_lines(accepted, resp) {
        println!("{line}");
    }
}
