use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, CredentialKind};
use crate::types::{
    AcceptAction, AcceptResponse, Event, LadderEntry, Member, MembersResponse, Signup, Team,
    TeamUser,
};
use crate::{POE_API_BASE, USER_AGENT as CONTACT_AGENT};

/// Page size requested from the private league member endpoint.
const MEMBER_PAGE_LIMIT: &str = "100";

/// Read access to the BPL league API for the current event.
#[async_trait]
pub trait LeagueApi: Send + Sync {
    async fn current_event(&self) -> Result<Event>;
    async fn ladder(&self) -> Result<Vec<LadderEntry>>;
    /// Users grouped by team, keyed by team id as sent by the API.
    async fn users_by_team(&self) -> Result<HashMap<String, Vec<TeamUser>>>;
    async fn teams(&self) -> Result<Vec<Team>>;
    async fn signups(&self) -> Result<Vec<Signup>>;
}

/// Private league membership on the vendor site.
#[async_trait]
pub trait MemberApi: Send + Sync {
    /// All members of the private league, join requests included.
    async fn members(&self, league_id: &str) -> Result<Vec<Member>>;

    /// Accept the given join requests in one request.
    ///
    /// Non-200 answers are returned as-is, only rejected sessions are errors.
    async fn accept(&self, league_id: &str, members: &[Member]) -> Result<AcceptResponse>;
}

/// Map 401/403 to a credential error and any other non-200 to a status error.
async fn check_status(
    resp: Response,
    service: &'static str,
    kind: CredentialKind,
) -> Result<Response, ApiError> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Credential {
            kind,
            status: status.as_u16(),
            message: body,
        });
    }
    Err(ApiError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Rejected sessions are errors; every other status is handed back with its body.
async fn read_accept_response(resp: Response) -> Result<AcceptResponse, ApiError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Credential {
            kind: CredentialKind::PoeSession,
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(AcceptResponse {
        status: status.as_u16(),
        body,
    })
}

/// HTTP client for the BPL league API.
#[derive(Debug, Clone)]
pub struct BplClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BplClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(ApiError::from)?;
        let resp = check_status(resp, "BPL API", CredentialKind::BplToken).await?;
        let body = resp
            .json()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("failed to decode response from {url}"))?;
        debug!("GET {url} ok");
        Ok(body)
    }
}

#[async_trait]
impl LeagueApi for BplClient {
    async fn current_event(&self) -> Result<Event> {
        self.get_json("events/current").await
    }

    async fn ladder(&self) -> Result<Vec<LadderEntry>> {
        self.get_json("events/current/ladder").await
    }

    async fn users_by_team(&self) -> Result<HashMap<String, Vec<TeamUser>>> {
        self.get_json("events/current/users").await
    }

    async fn teams(&self) -> Result<Vec<Team>> {
        self.get_json("events/current/teams").await
    }

    async fn signups(&self) -> Result<Vec<Signup>> {
        self.get_json("events/current/signups").await
    }
}

/// Cookie-authenticated client for the pathofexile.com private league API.
#[derive(Debug, Clone)]
pub struct PoeClient {
    client: Client,
    base_url: String,
    session_id: String,
}

impl PoeClient {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_base_url(POE_API_BASE, session_id)
    }

    pub fn with_base_url(base_url: impl Into<String>, session_id: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        }
    }

    pub fn member_url(&self, league_id: &str) -> String {
        format!("{}/private-league-member/{}", self.base_url, league_id)
    }

    fn with_session(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(COOKIE, format!("POESESSID={}", self.session_id))
    }
}

#[async_trait]
impl MemberApi for PoeClient {
    async fn members(&self, league_id: &str) -> Result<Vec<Member>> {
        let url = self.member_url(league_id);
        // `_` is the cache buster the site's own frontend sends.
        let cache_buster = chrono::Utc::now().timestamp().to_string();
        let req = self
            .client
            .get(&url)
            .query(&[
                ("sort", "roleDesc"),
                ("search", ""),
                ("offset", "0"),
                ("limit", MEMBER_PAGE_LIMIT),
                ("_", cache_buster.as_str()),
            ])
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CONTACT_AGENT);
        let resp = self
            .with_session(req)
            .send()
            .await
            .map_err(ApiError::from)?;
        let resp = check_status(resp, "PoE API", CredentialKind::PoeSession).await?;
        let parsed: MembersResponse = resp
            .json()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("failed to decode member list from {url}"))?;
        debug!("Fetched {} private league members", parsed.members.len());
        Ok(parsed.members)
    }

    async fn accept(&self, league_id: &str, members: &[Member]) -> Result<AcceptResponse> {
        let actions: Vec<AcceptAction> = members.iter().map(AcceptAction::accept).collect();
        let req = self
            .client
            .post(self.member_url(league_id))
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(CACHE_CONTROL, "no-cache")
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, CONTACT_AGENT)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&actions);
        let resp = self
            .with_session(req)
            .send()
            .await
            .map_err(ApiError::from)?;
        Ok(read_accept_response(resp).await?)
    }
}
