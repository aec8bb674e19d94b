//! Testnet claim faucet client
//!
//! Sends test bitcoin to a taproot address on regtest/testnet pairs.
//! The endpoint exists on non-mainnet deployments only.

use serde::Deserialize;

use crate::clients::{ClientError, Envelope, Http};
use crate::config::Context;

const SERVICE: &str = "Faucet";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimResponse {
    transaction_id: String,
}

pub struct FaucetClient {
    http: Http,
}

impl FaucetClient {
    pub fn new(context: &Context) -> Self {
        Self {
            http: Http::new(SERVICE, context.faucet_base_url()),
        }
    }

    /// Client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Http::new(SERVICE, base_url),
        }
    }

    /// Claim test bitcoin for a taproot address; returns the funding txid
    pub async fn claim_testnet_bitcoin(
        &self,
        bitcoin_p2tr_address: &str,
    ) -> Result<String, ClientError> {
        let envelope: Envelope<ClaimResponse> = self
            .http
            .post(
                &format!(
                    "api/v1/bitcoin-regtest-wallet/{}/claim",
                    bitcoin_p2tr_address
                ),
                &serde_json::json!({}),
            )
            .await?;
        Ok(envelope.data.transaction_id)
    }
}
