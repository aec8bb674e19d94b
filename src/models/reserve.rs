//! Reserve/guardian quota model
//!
//! `find_many` applies the network reserve policy; `get_quota` derives a
//! reserve's remaining withdrawal quota from its vault token balance and
//! the time-windowed accumulator. Quota is never stored anywhere.

use std::sync::Arc;

use crate::clients::{ClientError, LayerIndexer};
use crate::config::{Context, ReservePolicy, SolanaNetwork};
use crate::ledger::Ledger;
use crate::types::ReserveSetting;
use crate::zpl::{parse_pubkey, pdas, ZplError, ZplProgram};

pub struct ReserveSettingModel {
    indexer: Arc<dyn LayerIndexer>,
    ledger: Arc<dyn Ledger>,
    zpl: Arc<ZplProgram>,
    solana_network: SolanaNetwork,
    policy: ReservePolicy,
    now_unix: fn() -> u64,
}

fn default_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

impl ReserveSettingModel {
    pub fn new(
        context: &Context,
        indexer: Arc<dyn LayerIndexer>,
        ledger: Arc<dyn Ledger>,
        zpl: Arc<ZplProgram>,
    ) -> Self {
        Self {
            indexer,
            ledger,
            zpl,
            solana_network: context.solana_network(),
            policy: context.reserve_policy().clone(),
            now_unix: default_now,
        }
    }

    /// Replace the wall clock, for window edge-case tests
    pub fn with_clock(mut self, now_unix: fn() -> u64) -> Self {
        self.now_unix = now_unix;
        self
    }

    /// Reserve settings usable on the configured network.
    ///
    /// Non-mainnet networks expose only the playground reserve; mainnet
    /// excludes the externally custodied reserves named in the policy.
    pub async fn find_many(&self) -> Result<Vec<ReserveSetting>, ClientError> {
        let settings = self.indexer.get_reserve_settings().await?;

        if self.solana_network != SolanaNetwork::Mainnet {
            return Ok(settings
                .into_iter()
                .filter(|setting| setting.address == self.policy.playground_reserve)
                .collect());
        }

        Ok(settings
            .into_iter()
            .filter(|setting| !self.policy.excluded_reserves.contains(&setting.address))
            .collect())
    }

    /// Remaining withdrawal quota of a reserve, in satoshi.
    ///
    /// `min(total_amount_pegged - vault balance, window cap)`, where the
    /// window cap subtracts the accumulated amount while the withdrawal
    /// window is open. A reserve whose vault cannot be read yields zero
    /// quota rather than an error; callers skip zero-quota reserves.
    pub async fn get_quota(&self, setting: &ReserveSetting) -> u64 {
        match self.try_get_quota(setting).await {
            Ok(quota) => quota,
            Err(e) => {
                log::warn!(
                    "reserve {}: error reading vault token account, using zero quota: {}",
                    setting.address,
                    e
                );
                0
            }
        }
    }

    async fn try_get_quota(&self, setting: &ReserveSetting) -> Result<u64, ZplError> {
        let accounts = self.zpl.accounts().await?;
        let reserve = parse_pubkey(&setting.address)?;
        let asset_mint = parse_pubkey(&setting.asset_mint)?;

        let vault_authority = pdas::derive_spl_token_vault_authority(
            &accounts.liquidity_management_program,
            &reserve,
        );
        let vault_token_account = pdas::associated_token_address(&vault_authority, &asset_mint);
        let vault_balance = self
            .ledger
            .get_token_account_balance(&vault_token_account)
            .await?;

        let mut store_quota = setting.total_amount_pegged.saturating_sub(vault_balance);

        // externally custodied balance cannot be withdrawn through this path
        if let Some(offset) = self.policy.external_offset(&setting.address) {
            store_quota = store_quota.saturating_sub(offset);
        }

        let window_end = setting
            .withdrawal_window_started_at
            .saturating_add(setting.withdrawal_window);
        let window_cap = if (self.now_unix)() < window_end {
            setting
                .max_reserve_withdrawal_quota
                .saturating_sub(setting.accumulated_withdrawal_amount)
        } else {
            setting.max_reserve_withdrawal_quota
        };

        Ok(store_quota.min(window_cap))
    }
}
