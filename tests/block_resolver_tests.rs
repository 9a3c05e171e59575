//! Integration tests for TemporalBlockResolver
//!
//! Run against MockOracle so every probe is counted and no node is needed.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use asofscan::{
    BlockResolveError, DiskCache, MemoCache, MemoryCache, OracleError, SupportedChain,
    TemporalBlockResolver, UnixTimestamp,
};
use helpers::{date, MockOracle, BASE_TS, BLOCK_TIME};

const CHAIN: SupportedChain = SupportedChain::Arbitrum;

fn resolver(oracle: &Arc<MockOracle>) -> (TemporalBlockResolver, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let resolver = TemporalBlockResolver::new(oracle.clone(), cache.clone());
    (resolver, cache)
}

#[tokio::test]
async fn test_exact_block_timestamp_resolves_to_that_block() {
    let oracle = Arc::new(MockOracle::linear(1_000_000));
    let (resolver, _) = resolver(&oracle);

    let block = resolver
        .resolve_block(CHAIN, oracle.ts(500_000))
        .await
        .unwrap();

    assert_eq!(block, 500_000);
    // one height lookup, then ~log2(1_000_000) probes
    assert_eq!(oracle.height_calls(), 1);
    assert!(
        oracle.timestamp_calls() <= 21,
        "expected a logarithmic number of probes, got {}",
        oracle.timestamp_calls()
    );
}

#[tokio::test]
async fn test_target_before_first_block_clamps_to_one() {
    let oracle = Arc::new(MockOracle::linear(1_000_000));
    let (resolver, _) = resolver(&oracle);

    let block = resolver
        .resolve_block(CHAIN, UnixTimestamp(BASE_TS - 86_400))
        .await
        .unwrap();

    assert_eq!(block, 1);
}

#[tokio::test]
async fn test_target_after_tip_resolves_to_tip() {
    let oracle = Arc::new(MockOracle::linear(10_000));
    let (resolver, _) = resolver(&oracle);

    let block = resolver
        .resolve_block(CHAIN, UnixTimestamp(i64::MAX))
        .await
        .unwrap();

    assert_eq!(block, 10_000);
}

#[tokio::test]
async fn test_result_is_maximal_block_at_or_before_target() {
    let oracle = Arc::new(MockOracle::linear(100_000));
    let (resolver, _) = resolver(&oracle);

    for offset in [0, 1, BLOCK_TIME - 1, BLOCK_TIME, 7 * BLOCK_TIME + 5] {
        let target = UnixTimestamp(oracle.ts(42_000).0 + offset);
        let b = resolver.resolve_block(CHAIN, target).await.unwrap();

        assert!(oracle.ts(b) <= target, "ts({b}) exceeds target {target}");
        assert!(
            b == 100_000 || oracle.ts(b + 1) > target,
            "block {} also qualifies for target {target}",
            b + 1
        );
    }
}

#[tokio::test]
async fn test_shared_timestamps_resolve_to_last_block_of_run() {
    // four blocks per second, as on fast L2s
    let oracle = Arc::new(MockOracle::with_timestamps(10_000, |n| BASE_TS + (n / 4) as i64));
    let (resolver, _) = resolver(&oracle);

    let block = resolver
        .resolve_block(CHAIN, oracle.ts(100))
        .await
        .unwrap();

    assert_eq!(block, 103);
}

#[tokio::test]
async fn test_second_identical_call_makes_no_oracle_calls() {
    let oracle = Arc::new(MockOracle::linear(1_000_000));
    let (resolver, cache) = resolver(&oracle);
    let target = oracle.ts(123_456);

    let first = resolver.resolve_block(CHAIN, target).await.unwrap();
    let calls_after_first = oracle.total_calls();
    let second = resolver.resolve_block(CHAIN, target).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(oracle.total_calls(), calls_after_first);

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.writes, 1);
}

#[tokio::test]
async fn test_same_timestamp_on_other_chain_is_separate_entry() {
    let oracle = Arc::new(MockOracle::linear(1_000));
    let (resolver, cache) = resolver(&oracle);
    let target = oracle.ts(500);

    resolver.resolve_block(SupportedChain::Base, target).await.unwrap();
    resolver.resolve_block(SupportedChain::Optimism, target).await.unwrap();

    assert_eq!(oracle.height_calls(), 2);
    assert_eq!(cache.stats().await.entries, 2);
}

#[tokio::test]
async fn test_concurrent_identical_calls_leave_cache_consistent() {
    let oracle = Arc::new(MockOracle::linear(1_000_000).with_delay(Duration::from_millis(1)));
    let (resolver, cache) = resolver(&oracle);
    let target = oracle.ts(500_000);

    let (a, b) = tokio::join!(
        resolver.resolve_block(CHAIN, target),
        resolver.resolve_block(CHAIN, target)
    );
    assert_eq!(a.unwrap(), 500_000);
    assert_eq!(b.unwrap(), 500_000);

    let stats = cache.stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.conflicts, 0);

    let calls_before = oracle.total_calls();
    let c = resolver.resolve_block(CHAIN, target).await.unwrap();
    assert_eq!(c, 500_000);
    assert_eq!(oracle.total_calls(), calls_before, "third call must be a cache hit");
}

#[tokio::test]
async fn test_oracle_failure_aborts_and_caches_nothing() {
    // 500_000 is the first midpoint probed in [1, 1_000_000]
    let oracle = Arc::new(MockOracle::linear(1_000_000).failing_at(500_000));
    let (resolver, cache) = resolver(&oracle);

    let err = resolver
        .resolve_block(CHAIN, oracle.ts(10))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BlockResolveError::Oracle(OracleError::OracleUnavailable { .. })
    ));
    assert_eq!(oracle.timestamp_calls(), 1, "no retries expected");
    assert_eq!(cache.stats().await.entries, 0);
}

#[tokio::test]
async fn test_zero_height_is_invalid_range() {
    let oracle = Arc::new(MockOracle::linear(0));
    let (resolver, cache) = resolver(&oracle);

    let err = resolver
        .resolve_block(CHAIN, UnixTimestamp(BASE_TS))
        .await
        .unwrap_err();

    assert!(matches!(err, BlockResolveError::InvalidRange { .. }));
    assert_eq!(oracle.timestamp_calls(), 0);
    assert_eq!(cache.stats().await.entries, 0);
}

#[tokio::test]
async fn test_date_resolves_to_last_block_of_that_day() {
    // one block per hour starting 2024-05-01T00:00:00Z
    let day_start = 1_714_521_600;
    let oracle = Arc::new(MockOracle::with_timestamps(24 * 10, move |n| {
        day_start + 3_600 * (n as i64 - 1)
    }));
    let (resolver, _) = resolver(&oracle);

    let block = resolver
        .resolve_block_for_date(CHAIN, date("2024-05-01"))
        .await
        .unwrap();
    assert_eq!(block, 24, "block 24 is 23:00, block 25 is next midnight");

    let same = resolver
        .resolve_block_for_date_str(CHAIN, " 2024-05-01 ")
        .await
        .unwrap();
    assert_eq!(same, block);
}

#[tokio::test]
async fn test_invalid_date_string_is_rejected_before_any_rpc() {
    let oracle = Arc::new(MockOracle::linear(1_000));
    let (resolver, _) = resolver(&oracle);

    for input in ["2024-13-01", "yesterday", "01-05-2024", ""] {
        let err = resolver
            .resolve_block_for_date_str(CHAIN, input)
            .await
            .unwrap_err();
        assert!(
            matches!(err, BlockResolveError::InvalidDate { .. }),
            "{input:?} gave {err:?}"
        );
    }
    assert_eq!(oracle.total_calls(), 0);
}

#[tokio::test]
async fn test_resolve_tags_result_with_chain() {
    let oracle = Arc::new(MockOracle::linear(1_000));
    let (resolver, _) = resolver(&oracle);

    let resolved = resolver.resolve(CHAIN, oracle.ts(7)).await.unwrap();
    assert_eq!(resolved.chain, CHAIN);
    assert_eq!(resolved.block_number, 7);
}

#[tokio::test]
async fn test_disk_cache_answers_for_a_fresh_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let target = UnixTimestamp(BASE_TS + BLOCK_TIME * 9_999);

    let first_oracle = Arc::new(MockOracle::linear(1_000_000));
    let first = TemporalBlockResolver::new(
        first_oracle.clone(),
        Arc::new(DiskCache::new(&path).validate().unwrap()),
    );
    assert_eq!(first.resolve_block(CHAIN, target).await.unwrap(), 10_000);

    // a new process: new resolver, new cache handle, same file
    let second_oracle = Arc::new(MockOracle::linear(1_000_000));
    let second = TemporalBlockResolver::new(
        second_oracle.clone(),
        Arc::new(DiskCache::new(&path).validate().unwrap()),
    );
    assert_eq!(second.resolve_block(CHAIN, target).await.unwrap(), 10_000);
    assert_eq!(second_oracle.total_calls(), 0);
}
