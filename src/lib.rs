pub mod api;
pub mod config;
pub mod error;
pub mod invites;
pub mod league;
pub mod names;
pub mod poller;
pub mod reporter;
pub mod types;

/// BPL league API base URL (overridable via `BPL_BASE_URL`)
pub const DEFAULT_BPL_BASE_URL: &str = "https://v2202503259898322516.goodsrv.de/api";

/// Path of Exile web API base URL (private league membership, cookie auth)
pub const POE_API_BASE: &str = "https://www.pathofexile.com/api";

/// Contact user-agent sent to the vendor API.
pub const USER_AGENT: &str = "Contact: Liberatorist@gmail.com";

/// Default delay between poll cycles, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
