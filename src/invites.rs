use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{LeagueApi, MemberApi};
use crate::reporter;
use crate::types::{AcceptResponse, Member, Signup};

/// Result of comparing private league members with the signed-up accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitePlan {
    /// Number of pending join requests.
    pub requested: usize,
    /// Number of members already in the league.
    pub accepted: usize,
    /// Join requests from signed-up accounts that the site lets us accept.
    pub to_accept: Vec<Member>,
    /// Join requests from accounts that are not signed up (or not sorted into a team).
    pub unknown: Vec<Member>,
    /// Members already accepted whose account is not sorted into a team.
    pub accepted_unsorted: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// No acceptable join request, nothing was sent.
    NothingToAccept,
    Accepted(usize),
    /// The site answered the accept request with a non-200 status.
    Rejected(AcceptResponse),
}

/// Account names of signups that have been sorted into a team.
pub fn signed_up_accounts(signups: &[Signup]) -> HashSet<String> {
    signups
        .iter()
        .filter(|s| s.team_id.is_some())
        .map(|s| s.user.account_name.clone())
        .collect()
}

/// Split members into `(join requests, accepted members)`.
pub fn split_members(members: Vec<Member>) -> (Vec<Member>, Vec<Member>) {
    members.into_iter().partition(Member::is_join_request)
}

pub fn plan_invites(members: Vec<Member>, signed_up: &HashSet<String>) -> InvitePlan {
    let (requests, accepted) = split_members(members);
    let mut plan = InvitePlan {
        requested: requests.len(),
        accepted: accepted.len(),
        ..InvitePlan::default()
    };

    for member in requests {
        if !signed_up.contains(&member.member_name) {
            plan.unknown.push(member);
        } else if member.is_acceptable {
            plan.to_accept.push(member);
        }
    }
    plan.accepted_unsorted = accepted
        .into_iter()
        .filter(|m| !signed_up.contains(&m.member_name))
        .collect();
    plan
}

/// One invite cycle: accept every pending request from a sorted signup.
///
/// A non-200 answer to the accept request is reported and returned as
/// [`InviteOutcome::Rejected`], not as an error.
pub async fn handle_invites(
    league: &dyn LeagueApi,
    members: &dyn MemberApi,
    league_id: &str,
) -> Result<InviteOutcome> {
    let signups = league
        .signups()
        .await
        .context("failed to get sorted users")?;
    let signed_up = signed_up_accounts(&signups);
    let current = members
        .members(league_id)
        .await
        .context("failed to get guild join requests")?;

    let plan = plan_invites(current, &signed_up);
    reporter::report_invite_plan(&plan);
    if !plan.unknown.is_empty() {
        warn!("{} join request(s) from unknown users", plan.unknown.len());
    }

    if plan.to_accept.is_empty() {
        println!("No new members to add.");
        return Ok(InviteOutcome::NothingToAccept);
    }

    let count = plan.to_accept.len();
    let resp = members
        .accept(league_id, &plan.to_accept)
        .await
        .context("failed to accept invites")?;
    reporter::report_accept_result(count, &resp);

    if resp.is_success() {
        info!("Accepted {count} invite(s)");
        Ok(InviteOutcome::Accepted(count))
    } else {
        warn!("Accept request failed with status {}", resp.status);
        Ok(InviteOutcome::Rejected(resp))
    }
}
