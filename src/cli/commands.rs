//! CLI command implementations

use futures::future::join_all;

use crate::client::PegClient;
use crate::clients::ClientError;
use crate::models::interaction::InteractionError;
use crate::models::utxo::FindUtxos;
use crate::units::satoshi_to_btc;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Interaction error: {0}")]
    Interaction(#[from] InteractionError),
}

/// List an address's UTXOs
pub async fn utxos(
    client: &PegClient,
    address: String,
    spendable: bool,
) -> Result<(), CommandError> {
    let query = FindUtxos {
        bitcoin_address: address,
        ordinal: spendable.then_some(false),
        blocked: spendable.then_some(false),
    };
    let utxos = client.utxos().find_many(&query).await?;

    if utxos.is_empty() {
        println!("No UTXOs found");
        return Ok(());
    }

    println!(
        "{:<70} {:>12} {:>9} {:>8} {:>8}",
        "outpoint", "sats", "height", "ordinal", "blocked"
    );
    for utxo in &utxos {
        println!(
            "{:<70} {:>12} {:>9} {:>8} {:>8}",
            format!("{}:{}", utxo.transaction_id, utxo.transaction_index),
            utxo.satoshis,
            utxo.block_height,
            utxo.ordinal,
            utxo.blocked
        );
    }
    let total: u64 = utxos.iter().map(|utxo| utxo.satoshis).sum();
    println!("Total: {} sats ({} BTC)", total, satoshi_to_btc(total));
    Ok(())
}

/// Show a ticker price
pub async fn price(client: &PegClient, symbol: String) -> Result<(), CommandError> {
    let price = client.ticker().find_price(&symbol).await?;
    println!("{}: {}", price.symbol, price.price);
    Ok(())
}

/// List usable reserves with their remaining withdrawal quota
pub async fn reserves(client: &PegClient) -> Result<(), CommandError> {
    let settings = client.reserves().find_many().await?;
    if settings.is_empty() {
        println!("No usable reserves on this network");
        return Ok(());
    }

    let quotas = join_all(
        settings
            .iter()
            .map(|setting| client.reserves().get_quota(setting)),
    )
    .await;

    println!("{:<46} {:>16} {:>16}", "reserve", "pegged (BTC)", "quota (BTC)");
    for (setting, quota) in settings.iter().zip(quotas) {
        println!(
            "{:<46} {:>16} {:>16}",
            setting.address,
            satoshi_to_btc(setting.total_amount_pegged),
            satoshi_to_btc(quota)
        );
    }
    Ok(())
}

/// Show recent interactions for a Solana address
pub async fn interactions(
    client: &PegClient,
    solana_address: String,
    size: usize,
) -> Result<(), CommandError> {
    let interactions = client
        .interactions()
        .find_many(size, &solana_address)
        .await?;

    if interactions.is_empty() {
        println!("No interactions found");
        return Ok(());
    }

    for interaction in &interactions {
        println!(
            "{}  {:?}  {:?}  {} sats  initiated_at={}",
            interaction.interaction_id,
            interaction.interaction_type,
            interaction.status,
            interaction.amount,
            interaction.initiated_at
        );
    }
    Ok(())
}

/// Claim test bitcoin from the faucet
pub async fn claim(client: &PegClient, address: String) -> Result<(), CommandError> {
    let transaction_id = client.faucet().claim_testnet_bitcoin(&address).await?;
    println!("Claim broadcast: {}", transaction_id);
    Ok(())
}
