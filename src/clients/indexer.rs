//! Interaction/guardian-settings indexer client
//!
//! Serves the authoritative interaction history and the reserve/emission
//! guardian settings the quota model works from.

use async_trait::async_trait;
use serde::Deserialize;

use crate::clients::{ClientError, Envelope, Http, LayerIndexer};
use crate::config::Context;
use crate::types::{EmissionSetting, Interaction, ReserveSetting};

const SERVICE: &str = "Indexer";

pub struct LayerIndexerClient {
    http: Http,
}

#[derive(Debug, Deserialize)]
struct InteractionPage {
    items: Vec<Interaction>,
    #[allow(dead_code)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

impl LayerIndexerClient {
    pub fn new(context: &Context) -> Self {
        Self {
            http: Http::new(SERVICE, context.indexer_base_url()),
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
impl LayerIndexer for LayerIndexerClient {
    async fn find_many_interactions(
        &self,
        size: usize,
        solana_address: &str,
    ) -> Result<Vec<Interaction>, ClientError> {
        let page: InteractionPage = self
            .http
            .get(
                "v2/interactions",
                &[
                    ("size", size.to_string()),
                    ("solana_address", solana_address.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }

    async fn get_reserve_settings(&self) -> Result<Vec<ReserveSetting>, ClientError> {
        let envelope: Envelope<Items<ReserveSetting>> = self
            .http
            .get("v1/raw/layer/two-way-peg/guardian-settings", &[])
            .await?;
        Ok(envelope.data.items)
    }

    async fn get_emission_settings(&self) -> Result<Vec<EmissionSetting>, ClientError> {
        let envelope: Envelope<Items<EmissionSetting>> = self
            .http
            .get("v1/raw/layer/delegator/guardian-settings", &[])
            .await?;
        Ok(envelope.data.items)
    }
}
