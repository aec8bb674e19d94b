//! UTXO reservation model
//!
//! Produces the de-duplicated, annotated view of an address's spendable
//! outputs and keeps outputs consumed by in-flight transactions out of it.
//! A reservation is a cache entry keyed by the broadcast transaction id;
//! it is released when the indexer reports the transaction confirmed.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;

use crate::cache::Cache;
use crate::clients::{BitcoinGateway, ClientError, OrdinalIndex};
use crate::types::{RawUtxo, Utxo};

/// Page size used against the ordinal indexer
const ORDINAL_PAGE_SIZE: u64 = 1000;

/// Cache namespace for blocked-UTXO reservations
pub const BLOCKED_UTXO_CACHE: &str = "utxos";

/// Query for [`UtxoModel::find_many`]
#[derive(Debug, Clone, Default)]
pub struct FindUtxos {
    pub bitcoin_address: String,

    /// Keep only UTXOs whose `ordinal` flag matches
    pub ordinal: Option<bool>,

    /// Keep only UTXOs whose `blocked` flag matches
    pub blocked: Option<bool>,
}

pub struct UtxoModel {
    gateway: Arc<dyn BitcoinGateway>,
    ordinals: Arc<dyn OrdinalIndex>,
    cache: Cache<Vec<RawUtxo>>,
}

impl UtxoModel {
    pub fn new(
        gateway: Arc<dyn BitcoinGateway>,
        ordinals: Arc<dyn OrdinalIndex>,
        cache: Cache<Vec<RawUtxo>>,
    ) -> Self {
        Self {
            gateway,
            ordinals,
            cache,
        }
    }

    /// Fetch an address's UTXOs, annotate the `ordinal` and `blocked`
    /// flags, and apply the optional filters.
    ///
    /// Confirmed reservations are released as a side effect, so a UTXO
    /// spent by a transaction that has since confirmed shows up
    /// unblocked here without any explicit release call.
    pub async fn find_many(&self, query: &FindUtxos) -> Result<Vec<Utxo>, ClientError> {
        let raw = self.gateway.find_many_utxos(&query.bitcoin_address).await?;

        let ordinal_outpoints = self.ordinal_outpoints(&query.bitcoin_address).await?;
        let blocked_outpoints = self.blocked_outpoints().await?;

        let mut utxos: Vec<Utxo> = raw
            .into_iter()
            .map(|utxo| {
                let key = (utxo.transaction_id.clone(), utxo.transaction_index);
                Utxo::from_raw(
                    utxo,
                    ordinal_outpoints.contains(&key),
                    blocked_outpoints.contains(&key),
                )
            })
            .collect();

        if let Some(ordinal) = query.ordinal {
            utxos.retain(|utxo| utxo.ordinal == ordinal);
        }
        if let Some(blocked) = query.blocked {
            utxos.retain(|utxo| utxo.blocked == blocked);
        }

        Ok(utxos)
    }

    /// Reserve the UTXOs consumed by a just-broadcast transaction.
    ///
    /// Until the transaction confirms, every `find_many` sharing this
    /// cache reports them as `blocked`.
    pub fn block_utxos(&self, transaction_id: &str, utxos: Vec<RawUtxo>) {
        self.cache.set(transaction_id, Some(utxos));
    }

    /// Full ordinal-bearing outpoint set for an address, paged until the
    /// cursor reaches the indexer's confirmed total
    async fn ordinal_outpoints(
        &self,
        bitcoin_address: &str,
    ) -> Result<HashSet<(String, u32)>, ClientError> {
        let mut outpoints = HashSet::new();
        let mut cursor = 0u64;
        let mut total_confirmed = u64::MAX;

        while cursor < total_confirmed {
            let page = self
                .ordinals
                .find_many_ordinal_utxos(bitcoin_address, cursor, ORDINAL_PAGE_SIZE)
                .await?;

            total_confirmed = page.total_confirmed;
            let fetched = page.utxo.len() as u64;
            for ordinal in page.utxo {
                outpoints.insert((ordinal.txid, ordinal.vout));
            }
            if fetched == 0 {
                // an empty page must not leave the cursor stuck
                break;
            }
            cursor += fetched;
        }

        Ok(outpoints)
    }

    /// Outpoints of every still-outstanding reservation, after releasing
    /// the reservations whose transactions confirmed
    async fn blocked_outpoints(&self) -> Result<HashSet<(String, u32)>, ClientError> {
        self.release_confirmed().await?;

        Ok(self
            .cache
            .entries()
            .into_iter()
            .flat_map(|(_, utxos)| utxos)
            .map(|utxo| (utxo.transaction_id, utxo.transaction_index))
            .collect())
    }

    async fn release_confirmed(&self) -> Result<(), ClientError> {
        let transaction_ids = self.cache.keys();

        let details = try_join_all(transaction_ids.iter().map(|transaction_id| async move {
            let detail = self.gateway.get_transaction_detail(transaction_id).await?;
            Ok::<_, ClientError>((transaction_id.clone(), detail))
        }))
        .await?;

        let confirmed: Vec<String> = details
            .into_iter()
            .filter(|(_, detail)| detail.confirmations.unwrap_or(0) > 0)
            .map(|(transaction_id, _)| transaction_id)
            .collect();

        if !confirmed.is_empty() {
            self.cache.delete(&confirmed);
        }
        Ok(())
    }
}
