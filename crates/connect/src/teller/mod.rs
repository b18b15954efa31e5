//! Teller (mutual-TLS bank data API) integration.

mod client;
mod mapping;
mod models;
mod service;
mod traits;

pub use client::{TellerClient, DEFAULT_TELLER_API_URL};
pub use mapping::{to_teller_account, to_transaction};
pub use models::{
    TellerAccountLinks, TellerApiAccount, TellerApiInstitution, TellerApiTransaction,
    TellerCounterparty, TellerLinkSummary, TellerTransactionDetails, TellerTransactionLinks,
};
pub use service::TellerSyncService;
pub use traits::{TellerApiClient, TellerSyncServiceTrait};
