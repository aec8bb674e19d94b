//! UTXO/transaction indexer client
//!
//! Serves spendable outputs per address, accepts raw transaction
//! broadcasts, and reports per-transaction confirmation status.

use async_trait::async_trait;

use crate::clients::{BitcoinGateway, ClientError, Envelope, Http};
use crate::config::Context;
use crate::types::{RawUtxo, TransactionDetail};

const SERVICE: &str = "Gateway";

pub struct GatewayClient {
    http: Http,
}

impl GatewayClient {
    pub fn new(context: &Context) -> Self {
        Self {
            http: Http::new(SERVICE, context.gateway_base_url()),
        }
    }

    /// Client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Http::new(SERVICE, base_url),
        }
    }
}

#[async_trait]
impl BitcoinGateway for GatewayClient {
    async fn find_many_utxos(&self, bitcoin_address: &str) -> Result<Vec<RawUtxo>, ClientError> {
        let envelope: Envelope<Vec<RawUtxo>> = self
            .http
            .get(
                &format!("api/v1/address/{}/utxos", bitcoin_address),
                &[],
            )
            .await?;
        Ok(envelope.data)
    }

    async fn broadcast_transaction(&self, transaction_hex: &str) -> Result<String, ClientError> {
        let envelope: Envelope<String> = self
            .http
            .post("api/v1/transaction/broadcast", transaction_hex)
            .await?;
        Ok(envelope.data)
    }

    async fn get_transaction_detail(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionDetail, ClientError> {
        let envelope: Envelope<TransactionDetail> = self
            .http
            .get(
                &format!("api/v1/transaction/{}/detail", transaction_id),
                &[],
            )
            .await?;
        Ok(envelope.data)
    }
}
