//! Tests for the UTXO reservation model
//!
//! Exercises the blocking round-trip (reserve, observe as blocked,
//! release on confirmation), ordinal/blocked annotation and filtering,
//! and ordinal indexer pagination.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{confirmed_detail, raw_utxo, unconfirmed_detail, FakeGateway, FakeOrdinals};
use pegbtc_client::cache::{Cache, MemoryBackend};
use pegbtc_client::models::utxo::{FindUtxos, UtxoModel};
use pegbtc_client::types::OrdinalUtxo;

const ADDRESS: &str = "bc1p-test-address";

fn build_model(gateway: FakeGateway, ordinals: FakeOrdinals) -> (UtxoModel, Cache<Vec<pegbtc_client::types::RawUtxo>>) {
    let cache = Cache::new(Arc::new(MemoryBackend::new()));
    let model = UtxoModel::new(Arc::new(gateway), Arc::new(ordinals), cache.clone());
    (model, cache)
}

fn query() -> FindUtxos {
    FindUtxos {
        bitcoin_address: ADDRESS.to_string(),
        ordinal: None,
        blocked: None,
    }
}

#[tokio::test]
async fn annotates_ordinal_and_blocked_flags() {
    let ordinal_target = raw_utxo(1, 0, 10_000);
    let blocked_target = raw_utxo(2, 1, 20_000);
    let plain = raw_utxo(3, 2, 30_000);

    let gateway = FakeGateway::new().with_utxos(
        ADDRESS,
        vec![ordinal_target.clone(), blocked_target.clone(), plain.clone()],
    );
    let ordinals = FakeOrdinals::new().with_ordinals(vec![OrdinalUtxo {
        txid: ordinal_target.transaction_id.clone(),
        vout: ordinal_target.transaction_index,
        satoshi: ordinal_target.satoshis,
    }]);

    let (model, _cache) = build_model(gateway, ordinals);
    model.block_utxos("pending-tx", vec![blocked_target.clone()]);

    let utxos = model.find_many(&query()).await.unwrap();
    assert_eq!(utxos.len(), 3);

    let by_txid = |txid: &str| utxos.iter().find(|u| u.transaction_id == txid).unwrap();
    assert!(by_txid(&ordinal_target.transaction_id).ordinal);
    assert!(!by_txid(&ordinal_target.transaction_id).blocked);
    assert!(by_txid(&blocked_target.transaction_id).blocked);
    assert!(!by_txid(&plain.transaction_id).ordinal);
    assert!(!by_txid(&plain.transaction_id).blocked);
}

#[tokio::test]
async fn spendable_filter_excludes_ordinal_and_blocked() {
    let ordinal_target = raw_utxo(1, 0, 10_000);
    let blocked_target = raw_utxo(2, 1, 20_000);
    let plain = raw_utxo(3, 2, 30_000);

    let gateway = FakeGateway::new().with_utxos(
        ADDRESS,
        vec![ordinal_target.clone(), blocked_target.clone(), plain.clone()],
    );
    let ordinals = FakeOrdinals::new().with_ordinals(vec![OrdinalUtxo {
        txid: ordinal_target.transaction_id.clone(),
        vout: ordinal_target.transaction_index,
        satoshi: ordinal_target.satoshis,
    }]);

    let (model, _cache) = build_model(gateway, ordinals);
    model.block_utxos("pending-tx", vec![blocked_target]);

    let spendable = model
        .find_many(&FindUtxos {
            bitcoin_address: ADDRESS.to_string(),
            ordinal: Some(false),
            blocked: Some(false),
        })
        .await
        .unwrap();

    assert_eq!(spendable.len(), 1);
    assert_eq!(spendable[0].transaction_id, plain.transaction_id);
}

#[tokio::test]
async fn blocked_filter_returns_only_reserved_utxos() {
    let blocked_target = raw_utxo(2, 1, 20_000);
    let gateway = FakeGateway::new().with_utxos(
        ADDRESS,
        vec![raw_utxo(1, 0, 10_000), blocked_target.clone()],
    );

    let (model, _cache) = build_model(gateway, FakeOrdinals::new());
    model.block_utxos("pending-tx", vec![blocked_target.clone()]);

    let blocked = model
        .find_many(&FindUtxos {
            bitcoin_address: ADDRESS.to_string(),
            ordinal: None,
            blocked: Some(true),
        })
        .await
        .unwrap();

    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].transaction_id, blocked_target.transaction_id);
}

#[tokio::test]
async fn confirmation_releases_the_reservation() {
    let reserved = raw_utxo(2, 1, 20_000);
    let gateway = FakeGateway::new()
        .with_utxos(ADDRESS, vec![reserved.clone()])
        .with_detail("pending-tx", unconfirmed_detail());

    let (model, cache) = build_model(gateway, FakeOrdinals::new());
    model.block_utxos("pending-tx", vec![reserved.clone()]);

    // unconfirmed: still blocked, reservation still cached
    let utxos = model.find_many(&query()).await.unwrap();
    assert!(utxos[0].blocked);
    assert_eq!(cache.keys(), vec!["pending-tx".to_string()]);

    // confirmed: released and removed from the cache
    let gateway = FakeGateway::new()
        .with_utxos(ADDRESS, vec![reserved.clone()])
        .with_detail("pending-tx", confirmed_detail(3));
    let model2 = UtxoModel::new(
        Arc::new(gateway),
        Arc::new(FakeOrdinals::new()),
        cache.clone(),
    );

    let utxos = model2.find_many(&query()).await.unwrap();
    assert!(!utxos[0].blocked);
    assert!(cache.keys().is_empty());
}

#[tokio::test]
async fn zero_confirmations_does_not_release() {
    let reserved = raw_utxo(2, 1, 20_000);
    let gateway = FakeGateway::new()
        .with_utxos(ADDRESS, vec![reserved.clone()])
        .with_detail("pending-tx", confirmed_detail(0));

    let (model, cache) = build_model(gateway, FakeOrdinals::new());
    model.block_utxos("pending-tx", vec![reserved]);

    let utxos = model.find_many(&query()).await.unwrap();
    assert!(utxos[0].blocked);
    assert_eq!(cache.keys().len(), 1);
}

#[tokio::test]
async fn reservations_are_shared_through_the_cache_backend() {
    let reserved = raw_utxo(5, 0, 50_000);
    let backend = Arc::new(MemoryBackend::new());

    let writer = UtxoModel::new(
        Arc::new(FakeGateway::new().with_utxos(ADDRESS, vec![reserved.clone()])),
        Arc::new(FakeOrdinals::new()),
        Cache::new(backend.clone()),
    );
    writer.block_utxos("pending-tx", vec![reserved.clone()]);

    // a second model instance over the same backend observes the block
    let reader = UtxoModel::new(
        Arc::new(FakeGateway::new().with_utxos(ADDRESS, vec![reserved])),
        Arc::new(FakeOrdinals::new()),
        Cache::new(backend),
    );
    let utxos = reader.find_many(&query()).await.unwrap();
    assert!(utxos[0].blocked);
}

#[tokio::test]
async fn ordinal_lookup_pages_until_total_confirmed() {
    let ordinals: Vec<OrdinalUtxo> = (0u8..5)
        .map(|i| OrdinalUtxo {
            txid: hex::encode([i; 32]),
            vout: 0,
            satoshi: 600,
        })
        .collect();

    let raw: Vec<_> = (0u8..5).map(|i| raw_utxo(i, 0, 600)).collect();
    let gateway = FakeGateway::new().with_utxos(ADDRESS, raw);
    let ordinal_index = Arc::new(
        FakeOrdinals::new()
            .with_ordinals(ordinals)
            .with_page_limit(2),
    );

    let model = UtxoModel::new(
        Arc::new(gateway),
        ordinal_index.clone(),
        Cache::new(Arc::new(MemoryBackend::new())),
    );

    let utxos = model.find_many(&query()).await.unwrap();
    assert!(utxos.iter().all(|u| u.ordinal));
    // 5 entries at 2 per page -> 3 pages
    assert_eq!(ordinal_index.page_calls.load(Ordering::SeqCst), 3);
}
