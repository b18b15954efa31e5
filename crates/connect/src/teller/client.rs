//! HTTP client for the Teller API.
//!
//! Teller authenticates the application with a client certificate (mutual
//! TLS) and the user with the enrollment's access token, sent as the HTTP
//! basic-auth username with an empty password.

use async_trait::async_trait;
use log::debug;
use reqwest::Identity;
use std::fs;
use std::path::Path;

use super::models::{TellerApiAccount, TellerApiTransaction};
use super::traits::TellerApiClient;
use crate::http::{client_builder, parse_response, request_error};
use watson_core::errors::{ProviderError, Result};

/// Default base URL for the Teller API.
pub const DEFAULT_TELLER_API_URL: &str = "https://api.teller.io";

const PROVIDER: &str = "Teller";

/// HTTP client for the Teller API.
///
/// ```ignore
/// let client = TellerClient::from_pem_files(
///     DEFAULT_TELLER_API_URL,
///     "./certs/certificate.pem",
///     "./certs/private_key.pem",
/// )?;
/// let accounts = client.list_accounts("token_abc").await?;
/// ```
#[derive(Debug, Clone)]
pub struct TellerClient {
    client: reqwest::Client,
    base_url: String,
}

impl TellerClient {
    /// Builds a client that presents the given certificate and private key.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Identity` if either file cannot be read or the
    /// PEM data is not a usable client identity.
    pub fn from_pem_files(
        base_url: &str,
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let cert_path = cert_path.as_ref();
        let key_path = key_path.as_ref();
        let mut pem = fs::read(cert_path).map_err(|e| {
            ProviderError::Identity(format!("{}: {}", cert_path.display(), e))
        })?;
        pem.push(b'\n');
        pem.extend(
            fs::read(key_path)
                .map_err(|e| ProviderError::Identity(format!("{}: {}", key_path.display(), e)))?,
        );
        Self::from_pem(base_url, &pem)
    }

    /// Builds a client from one PEM buffer holding the certificate chain and key.
    pub fn from_pem(base_url: &str, pem: &[u8]) -> Result<Self> {
        let identity =
            Identity::from_pem(pem).map_err(|e| ProviderError::Identity(e.to_string()))?;
        let client = client_builder()
            .identity(identity)
            .build()
            .map_err(|e| ProviderError::Identity(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str, access_token: &str) -> Result<T> {
        debug!("[Teller] GET {}", url);
        let response = self
            .client
            .get(url)
            .basic_auth(access_token, Some(""))
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        parse_response(PROVIDER, response).await
    }
}

#[async_trait]
impl TellerApiClient for TellerClient {
    async fn list_accounts(&self, access_token: &str) -> Result<Vec<TellerApiAccount>> {
        let url = format!("{}/accounts", self.base_url);
        self.get(&url, access_token).await
    }

    async fn list_transactions(
        &self,
        transactions_link: &str,
        access_token: &str,
    ) -> Result<Vec<TellerApiTransaction>> {
        self.get(transactions_link, access_token).await
    }
}
