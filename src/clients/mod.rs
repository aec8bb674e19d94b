//! Remote data clients
//!
//! One client per external service, all JSON over HTTPS with a fixed
//! 10-second timeout. Low-level transport and schema failures never leak:
//! they are wrapped exactly once into [`ClientError`], tagged with the
//! service name. Constructing a client performs no I/O.
//!
//! The models consume these clients through the narrow async traits
//! defined here so tests can substitute in-memory fakes.

pub mod faucet;
pub mod gateway;
pub mod indexer;
pub mod ordinals;
pub mod ticker;

pub use faucet::FaucetClient;
pub use gateway::GatewayClient;
pub use indexer::LayerIndexerClient;
pub use ordinals::OrdinalsClient;
pub use ticker::TickerClient;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{
    EmissionSetting, Interaction, OrdinalUtxoPage, RawUtxo, ReserveSetting, TransactionDetail,
};

/// Per-request timeout applied by every remote client
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from remote clients, wrapped once at the client boundary
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} response did not match the expected schema: {source}")]
    Schema {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Name of the service the failure came from
    pub fn service(&self) -> &'static str {
        match self {
            ClientError::Request { service, .. }
            | ClientError::Status { service, .. }
            | ClientError::Schema { service, .. } => service,
        }
    }
}

/// UTXO/transaction indexer operations needed by the models
#[async_trait]
pub trait BitcoinGateway: Send + Sync {
    async fn find_many_utxos(&self, bitcoin_address: &str) -> Result<Vec<RawUtxo>, ClientError>;

    async fn broadcast_transaction(&self, transaction_hex: &str) -> Result<String, ClientError>;

    async fn get_transaction_detail(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionDetail, ClientError>;
}

/// Ordinal-UTXO indexer operations needed by the models
#[async_trait]
pub trait OrdinalIndex: Send + Sync {
    async fn find_many_ordinal_utxos(
        &self,
        bitcoin_address: &str,
        cursor: u64,
        size: u64,
    ) -> Result<OrdinalUtxoPage, ClientError>;
}

/// Interaction/guardian-settings indexer operations needed by the models
#[async_trait]
pub trait LayerIndexer: Send + Sync {
    async fn find_many_interactions(
        &self,
        size: usize,
        solana_address: &str,
    ) -> Result<Vec<Interaction>, ClientError>;

    async fn get_reserve_settings(&self) -> Result<Vec<ReserveSetting>, ClientError>;

    async fn get_emission_settings(&self) -> Result<Vec<EmissionSetting>, ClientError>;
}

/// Shared HTTP plumbing for the concrete clients
pub(crate) struct Http {
    service: &'static str,
    base_url: String,
    client: reqwest::Client,
}

impl Http {
    pub(crate) fn new(service: &'static str, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            service,
            base_url: base_url.into(),
            client,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let request = self
            .client
            .get(self.url(path))
            .query(query)
            .header("Content-Type", "application/json");
        self.execute(request).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|source| ClientError::Request {
            service: self.service,
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ClientError::Request {
            service: self.service,
            source,
        })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                service: self.service,
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Schema {
            service: self.service,
            source,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// `{ "data": ... }` envelope used by several services
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}
