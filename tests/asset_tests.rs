//! Asset Cache & Texture Bank Tests
//!
//! Tests for:
//! - AssetCache: dedup of sequential and concurrent requests, no poisoned
//!   entries after failure, eviction, statistics
//! - TextureBank: one load per channel, all-or-nothing failure, teardown

mod common;

use std::sync::Arc;

use common::{FakeModelLoader, FakeTextureLoader};
use matchum::assets::{AssetCache, CacheStats, TextureBank, TextureBankConfig};
use matchum::errors::{Error, LoadFailure};
use matchum::resources::TextureChannel;
use wgpu::AddressMode;

const WOOD: &str = "/models/Matchum_cabinet(wood).glb";
const METAL: &str = "/models/Matchum_cabinet(metal).glb";

fn cache() -> (AssetCache<Arc<FakeModelLoader>>, Arc<FakeModelLoader>) {
    let loader = Arc::new(FakeModelLoader::default());
    (AssetCache::new(Arc::clone(&loader)), loader)
}

fn bank_config() -> TextureBankConfig {
    TextureBankConfig {
        diffuse: "/textures/hanji/diffuse.jpg".into(),
        normal: "/textures/hanji/normal.jpg".into(),
        roughness: "/textures/hanji/roughness.jpg".into(),
        repeat: [2.0, 2.0],
        anisotropy: 16,
    }
}

fn bank() -> (TextureBank<Arc<FakeTextureLoader>>, Arc<FakeTextureLoader>) {
    let loader = Arc::new(FakeTextureLoader::default());
    (TextureBank::new(Arc::clone(&loader), bank_config()), loader)
}

// ============================================================================
// Asset Cache
// ============================================================================

#[tokio::test]
async fn sequential_requests_load_once() {
    let (cache, loader) = cache();

    let first = cache.get_or_load(WOOD).await.unwrap();
    let second = cache.get_or_load(WOOD).await.unwrap();

    assert!(first.ptr_eq(&second));
    assert_eq!(loader.probe.calls(WOOD), 1);
    assert_eq!(
        cache.stats(),
        CacheStats {
            loads: 1,
            hits: 1,
            joins: 0,
            failures: 0
        }
    );
}

#[tokio::test]
async fn concurrent_requests_join_one_load() {
    let (cache, loader) = cache();
    let gate = loader.probe.gate(WOOD);

    let requests = futures::future::join_all((0..4).map(|_| cache.get_or_load(WOOD)));
    let release = async {
        tokio::task::yield_now().await;
        gate.notify_one();
    };
    let (handles, ()) = futures::join!(requests, release);

    let handles: Vec<_> = handles.into_iter().map(Result::unwrap).collect();
    assert!(handles.windows(2).all(|w| w[0].ptr_eq(&w[1])));
    assert_eq!(loader.probe.calls(WOOD), 1);
    assert_eq!(cache.stats().loads, 1);
    assert_eq!(cache.stats().joins, 3);
}

#[tokio::test]
async fn distinct_paths_load_independently() {
    let (cache, loader) = cache();
    let wood = cache.get_or_load(WOOD).await.unwrap();
    let metal = cache.get_or_load(METAL).await.unwrap();

    assert!(!wood.ptr_eq(&metal));
    assert_eq!(loader.probe.total_calls(), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn failed_load_is_not_cached() {
    let (cache, loader) = cache();
    loader.probe.fail(WOOD);

    let err = cache.get_or_load(WOOD).await.unwrap_err();
    assert!(matches!(
        err,
        Error::AssetLoad {
            source: LoadFailure::Http { status: 404 },
            ..
        }
    ));
    assert!(!cache.contains(WOOD));
    assert_eq!(cache.stats().failures, 1);

    loader.probe.heal(WOOD);
    cache.get_or_load(WOOD).await.unwrap();
    assert_eq!(loader.probe.calls(WOOD), 2);
    assert!(cache.contains(WOOD));
}

#[tokio::test]
async fn empty_path_is_rejected_without_io() {
    let (cache, loader) = cache();
    let err = cache.get_or_load("").await.unwrap_err();
    assert!(matches!(err, Error::AssetLoad { .. }));
    assert_eq!(loader.probe.total_calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn evicted_handle_stays_usable_and_path_reloads() {
    let (cache, loader) = cache();
    let held = cache.get_or_load(WOOD).await.unwrap();

    let evicted = cache.evict(WOOD).unwrap();
    assert!(evicted.ptr_eq(&held));
    assert!(!cache.contains(WOOD));
    assert_eq!(held.nodes.len(), 2);

    let reloaded = cache.get_or_load(WOOD).await.unwrap();
    assert!(!reloaded.ptr_eq(&held));
    assert_eq!(loader.probe.calls(WOOD), 2);
}

#[tokio::test]
async fn template_outlives_cache_clear() {
    let (cache, _) = cache();
    let handle = cache.get_or_load(WOOD).await.unwrap();
    let weak = handle.downgrade();

    cache.clear();
    assert!(weak.is_alive());
    drop(handle);
    assert!(!weak.is_alive());
}

// ============================================================================
// Texture Bank
// ============================================================================

#[tokio::test]
async fn texture_bank_loads_each_channel_once() {
    let (bank, loader) = bank();
    assert!(!bank.is_loaded());

    let first = bank.ensure_loaded().await.unwrap();
    let second = bank.ensure_loaded().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(bank.is_loaded());
    assert_eq!(bank.load_count(), 1);
    for channel in TextureChannel::ALL {
        assert_eq!(loader.probe.calls(bank_config().path(channel)), 1);
    }
}

#[tokio::test]
async fn texture_bank_applies_policy_to_every_channel() {
    let (bank, _) = bank();
    let set = bank.ensure_loaded().await.unwrap();

    for (channel, texture) in set.iter() {
        assert_eq!(texture.sampler.address_mode_u, AddressMode::Repeat, "{channel}");
        assert_eq!(texture.sampler.address_mode_v, AddressMode::Repeat, "{channel}");
        assert_eq!(texture.sampler.anisotropy_clamp, 16, "{channel}");
        assert_eq!(texture.transform.repeat.to_array(), [2.0, 2.0], "{channel}");
        assert!(texture.generate_mipmaps);
        assert_eq!(texture.image.format(), channel.color_space().rgba8_format());
    }
}

#[tokio::test]
async fn concurrent_ensure_loaded_joins() {
    let (bank, loader) = bank();
    let (a, b) = futures::join!(bank.ensure_loaded(), bank.ensure_loaded());
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(loader.probe.total_calls(), 3);
}

#[tokio::test]
async fn one_failed_channel_discards_the_set() {
    let (bank, loader) = bank();
    let normal = bank_config().normal;
    loader.probe.fail(&normal);

    let err = bank.ensure_loaded().await.unwrap_err();
    match err {
        Error::TextureLoad { channel, path, .. } => {
            assert_eq!(channel, TextureChannel::Normal);
            assert_eq!(path, normal);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!bank.is_loaded());
    assert!(bank.get().is_none());

    loader.probe.heal(&normal);
    bank.ensure_loaded().await.unwrap();
    assert_eq!(bank.load_count(), 2);
}

#[tokio::test]
async fn teardown_releases_and_reloads() {
    let (bank, loader) = bank();
    let before = bank.ensure_loaded().await.unwrap();

    bank.teardown();
    assert!(!bank.is_loaded());
    assert_eq!(before.diffuse().name, bank_config().diffuse);

    let after = bank.ensure_loaded().await.unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(loader.probe.calls(&bank_config().diffuse), 2);
}
