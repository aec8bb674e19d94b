//! Ordinal-UTXO indexer client
//!
//! Reports which outputs of an address carry inscriptions, paginated by a
//! cursor. Callers page with size 1000 until `cursor >= total_confirmed`.

use async_trait::async_trait;

use crate::clients::{ClientError, Envelope, Http, OrdinalIndex};
use crate::types::OrdinalUtxoPage;

const SERVICE: &str = "Ordinals";
const BASE_URL: &str = "https://open-api.unisat.io";

pub struct OrdinalsClient {
    http: Http,
}

impl OrdinalsClient {
    pub fn new() -> Self {
        Self {
            http: Http::new(SERVICE, BASE_URL),
        }
    }

    /// Client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Http::new(SERVICE, base_url),
        }
    }
}

impl Default for OrdinalsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrdinalIndex for OrdinalsClient {
    async fn find_many_ordinal_utxos(
        &self,
        bitcoin_address: &str,
        cursor: u64,
        size: u64,
    ) -> Result<OrdinalUtxoPage, ClientError> {
        let envelope: Envelope<OrdinalUtxoPage> = self
            .http
            .get(
                &format!(
                    "v1/indexer/address/{}/inscription-utxo-data",
                    bitcoin_address
                ),
                &[
                    ("cursor", cursor.to_string()),
                    ("size", size.to_string()),
                ],
            )
            .await?;
        Ok(envelope.data)
    }
}
