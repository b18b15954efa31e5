//! Watson Connect - bank data aggregator integrations.
//!
//! This crate talks to Teller and Plaid, maps their payloads to the
//! `watson-core` domain rows and drives the account/transaction sync jobs.
//! Storage is reached only through the repository traits in `watson-core`.

mod http;
pub mod plaid;
pub mod teller;

pub use http::DEFAULT_TIMEOUT_SECS;

// Re-export commonly used types
pub use plaid::{
    PlaidApiClient, PlaidClient, PlaidEnvironment, PlaidSyncService, PlaidSyncServiceTrait,
    PlaidSyncSummary,
};
pub use teller::{
    TellerApiClient, TellerClient, TellerLinkSummary, TellerSyncService, TellerSyncServiceTrait,
    DEFAULT_TELLER_API_URL,
};
