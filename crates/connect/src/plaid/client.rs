//! HTTP client for the Plaid API.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::models::{PlaidApiAccount, PlaidTokenExchange, PlaidTransactionsPage};
use super::traits::PlaidApiClient;
use crate::http::{client_builder, parse_response, request_error};
use watson_core::errors::{Error, Result};

const PROVIDER: &str = "Plaid";

/// Display name shown to the user inside Plaid Link.
const CLIENT_NAME: &str = "Watson";

/// Plaid environment; selects the API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    Sandbox,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "production" => Ok(PlaidEnvironment::Production),
            other => Err(Error::InvalidConfigValue(format!(
                "PLAID_ENV must be 'sandbox' or 'production', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PlaidEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaidEnvironment::Sandbox => f.write_str("sandbox"),
            PlaidEnvironment::Production => f.write_str("production"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Request/Response Types (internal)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LinkTokenCreateRequest<'a> {
    client_name: &'a str,
    user: LinkTokenUser<'a>,
    products: [&'a str; 1],
    country_codes: [&'a str; 1],
    language: &'a str,
}

#[derive(Serialize)]
struct LinkTokenUser<'a> {
    client_user_id: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct LinkTokenCreateResponse {
    link_token: String,
}

#[derive(Serialize)]
struct PublicTokenExchangeRequest<'a> {
    public_token: &'a str,
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct AccountsGetResponse {
    #[serde(default)]
    accounts: Vec<PlaidApiAccount>,
}

#[derive(Serialize)]
struct TransactionsGetRequest<'a> {
    access_token: &'a str,
    start_date: String,
    end_date: String,
    options: TransactionsGetOptions<'a>,
}

#[derive(Serialize)]
struct TransactionsGetOptions<'a> {
    account_ids: [&'a str; 1],
    count: usize,
    offset: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Plaid Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the Plaid API. Credentials travel in the
/// `PLAID-CLIENT-ID` and `PLAID-SECRET` headers.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl PlaidClient {
    pub fn new(environment: PlaidEnvironment, client_id: &str, secret: &str) -> Result<Self> {
        Self::with_base_url(environment.base_url(), client_id, secret)
    }

    pub fn with_base_url(base_url: &str, client_id: &str, secret: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "PLAID-CLIENT-ID",
            HeaderValue::from_str(client_id)
                .map_err(|e| Error::InvalidConfigValue(format!("Invalid Plaid client id: {}", e)))?,
        );
        headers.insert(
            "PLAID-SECRET",
            HeaderValue::from_str(secret)
                .map_err(|e| Error::InvalidConfigValue(format!("Invalid Plaid secret: {}", e)))?,
        );

        let client = client_builder()
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Plaid] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        parse_response(PROVIDER, response).await
    }
}

#[async_trait]
impl PlaidApiClient for PlaidClient {
    async fn create_link_token(&self, user_id: &str) -> Result<String> {
        let request = LinkTokenCreateRequest {
            client_name: CLIENT_NAME,
            user: LinkTokenUser {
                client_user_id: user_id,
            },
            products: ["transactions"],
            country_codes: ["US"],
            language: "en",
        };
        let response: LinkTokenCreateResponse = self.post("/link/token/create", &request).await?;
        Ok(response.link_token)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<PlaidTokenExchange> {
        self.post(
            "/item/public_token/exchange",
            &PublicTokenExchangeRequest { public_token },
        )
        .await
    }

    async fn get_accounts(&self, access_token: &str) -> Result<Vec<PlaidApiAccount>> {
        let response: AccountsGetResponse = self
            .post("/accounts/get", &AccessTokenRequest { access_token })
            .await?;
        Ok(response.accounts)
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        account_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        count: usize,
        offset: usize,
    ) -> Result<PlaidTransactionsPage> {
        let request = TransactionsGetRequest {
            access_token,
            start_date: start_date.format("%Y-%m-%d").to_string(),
            end_date: end_date.format("%Y-%m-%d").to_string(),
            options: TransactionsGetOptions {
                account_ids: [account_id],
                count,
                offset,
            },
        };
        self.post("/transactions/get", &request).await
    }
}
