//! Typed errors for the league and vendor APIs.

use std::fmt;

use thiserror::Error;

/// Which credential an API rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    BplToken,
    PoeSession,
}

impl CredentialKind {
    pub fn env_var(self) -> &'static str {
        match self {
            CredentialKind::BplToken => "BPL_TOKEN",
            CredentialKind::PoeSession => "POESESSID",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::BplToken => f.write_str("BPL token"),
            CredentialKind::PoeSession => f.write_str("PoE session id"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403 from either API. Retrying with the same credential is pointless.
    #[error("{kind} rejected (status {status}), update {}: {message}", .kind.env_var())]
    Credential {
        kind: CredentialKind,
        status: u16,
        message: String,
    },

    #[error("unexpected status {status} from {service}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("event name {0:?} does not contain a private league id (PL<digits>)")]
    LeagueIdNotFound(String),
}

/// Whether `err` (or anything in its context chain) is a rejected credential.
pub fn is_credential_error(err: &anyhow::Error) -> bool {
    credential_kind(err).is_some()
}

pub fn credential_kind(err: &anyhow::Error) -> Option<CredentialKind> {
    err.chain().find_map(|cause| match cause.downcast_ref::<ApiError>() {
        Some(ApiError::Credential { kind, .. }) => Some(*kind),
        _ => None,
    })
}
