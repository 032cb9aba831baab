//! Variant Resolver Tests
//!
//! Tests for:
//! - Showroom scenario: wood → resin → wood load accounting
//! - Shared texture set across translucent resolutions
//! - No partial mutation when loading fails
//! - Last-requested-wins under overlapping resolutions
//! - Instance reuse when variants share a model

mod common;

use std::sync::Arc;

use common::{harness, init_logger};
use matchum::config::ProductLine;
use matchum::errors::Error;
use matchum::pipeline::{Resolution, ResolverState, VariantId};
use matchum::resources::{MaterialSpec, TextureChannel};

const WOOD: &str = "/models/Matchum_cabinet(wood).glb";
const RESIN: &str = "/models/Matchum_cabinet(resin).glb";
const METAL: &str = "/models/Matchum_cabinet(metal).glb";

fn applied(resolution: Resolution) -> matchum::pipeline::ResolvedScene {
    match resolution {
        Resolution::Applied(resolved) => resolved,
        Resolution::Discarded(stale) => panic!("unexpectedly discarded: {stale:?}"),
    }
}

#[tokio::test]
async fn showroom_scenario_load_accounting() {
    init_logger();
    let h = harness(ProductLine::showroom());

    // Initial wood on an unloaded cache
    let wood = applied(h.resolver.resolve(VariantId::Wood).await.unwrap());
    assert_eq!(h.models.probe.calls(WOOD), 1);
    assert_eq!(h.textures.probe.total_calls(), 0);
    assert!(wood.scene.materials().iter().all(|m| !m.is_translucent()));
    assert_eq!(wood.meshes_updated, 2);

    // Switch to resin: one texture-bank load of three channels
    let resin = applied(h.resolver.resolve(VariantId::Resin).await.unwrap());
    assert_eq!(h.textures.probe.total_calls(), 3);
    assert_eq!(h.resolver.texture_bank().load_count(), 1);
    for material in resin.scene.materials() {
        let spec = material.as_translucent().unwrap();
        assert!((0.9..=0.95).contains(&spec.opacity));
    }

    // Back to wood: cache hit, opaque again, bank untouched
    let again = applied(h.resolver.resolve(VariantId::Wood).await.unwrap());
    assert_eq!(h.models.probe.calls(WOOD), 1);
    assert_eq!(h.models.probe.total_calls(), 2);
    assert_eq!(h.textures.probe.total_calls(), 3);
    assert!(again.scene.asset().ptr_eq(wood.scene.asset()));
    assert_eq!(again.scene.materials(), wood.scene.materials());
    assert_eq!(h.resolver.current_variant(), Some(VariantId::Wood));
    assert_eq!(h.resolver.state(), ResolverState::Idle);
}

#[tokio::test]
async fn opaque_variants_enable_anisotropy_without_touching_template() {
    let h = harness(ProductLine::showroom());
    let resolved = applied(h.resolver.resolve(VariantId::Metal).await.unwrap());

    let template = resolved.scene.asset().materials[0].clone();
    for (_, mesh) in resolved.scene.iter_meshes() {
        let spec = mesh.material.as_opaque().unwrap();
        let map = spec.map.as_ref().unwrap();
        assert_eq!(map.sampler().anisotropy_clamp, 16);
        assert!(map.shares_texture(template.map.as_ref().unwrap()));
        assert!(!mesh.material.settings().transparent);
    }
    assert!(template.map.as_ref().unwrap().sampler_override.is_none());
    assert_eq!(template.map.as_ref().unwrap().texture.sampler.anisotropy_clamp, 1);
}

#[tokio::test]
async fn translucent_resolutions_share_one_texture_set() {
    let h = harness(ProductLine::showroom());
    let first = applied(h.resolver.resolve(VariantId::Resin).await.unwrap());
    h.resolver.resolve(VariantId::Wood).await.unwrap();
    let second = applied(h.resolver.resolve(VariantId::Resin).await.unwrap());

    let a = first.scene.materials();
    let b = second.scene.materials();
    let set_a = a[0].texture_set().unwrap();
    let set_b = b[0].texture_set().unwrap();
    assert!(Arc::ptr_eq(set_a, set_b));
    for channel in TextureChannel::ALL {
        let path = h.resolver.texture_bank().config().path(channel).to_string();
        assert_eq!(h.textures.probe.calls(&path), 1);
    }

    // Same spec field for field
    assert_eq!(a, b);
}

#[tokio::test]
async fn failed_texture_load_keeps_previous_materials() {
    let h = harness(ProductLine::showroom());
    applied(h.resolver.resolve(VariantId::Resin).await.unwrap());
    // Release the bank so the next translucent switch must load again
    h.resolver.texture_bank().teardown();
    applied(h.resolver.resolve(VariantId::Wood).await.unwrap());
    let before = h.resolver.current_scene().unwrap();
    let before_materials = before.materials();

    let roughness = h.resolver.texture_bank().config().roughness.clone();
    h.textures.probe.fail(&roughness);

    let err = h.resolver.resolve(VariantId::Resin).await.unwrap_err();
    assert!(matches!(
        err,
        Error::TextureLoad {
            channel: TextureChannel::Roughness,
            ..
        }
    ));

    let after = h.resolver.current_scene().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.materials(), before_materials);
    assert_eq!(h.resolver.current_variant(), Some(VariantId::Wood));
    assert_eq!(h.resolver.state(), ResolverState::Idle);

    // Caller-initiated retry succeeds once the texture is back
    h.textures.probe.heal(&roughness);
    applied(h.resolver.resolve(VariantId::Resin).await.unwrap());
    assert!(h.resolver.current_scene().unwrap().materials()[0].is_translucent());
}

#[tokio::test]
async fn failed_model_load_keeps_previous_scene() {
    let h = harness(ProductLine::showroom());
    applied(h.resolver.resolve(VariantId::Wood).await.unwrap());
    let before = h.resolver.current_scene().unwrap();

    h.models.probe.fail(METAL);
    let err = h.resolver.resolve(VariantId::Metal).await.unwrap_err();
    assert!(matches!(err, Error::AssetLoad { ref path, .. } if path == METAL));
    assert!(Arc::ptr_eq(&before, &h.resolver.current_scene().unwrap()));
    assert!(!h.resolver.cache().contains(METAL));
}

#[tokio::test]
async fn latest_request_wins_over_slower_earlier_one() {
    let h = harness(ProductLine::showroom());
    let wood_gate = h.models.probe.gate(WOOD);

    let wood = tokio::spawn(h.resolver.resolve(VariantId::Wood));
    tokio::task::yield_now().await;
    assert_eq!(
        h.resolver.state(),
        ResolverState::Resolving {
            variant: VariantId::Wood,
            token: 1
        }
    );

    let metal = h.resolver.resolve(VariantId::Metal);
    assert_eq!(h.resolver.latest_token(), 2);
    let metal = applied(metal.await.unwrap());
    assert_eq!(metal.variant, VariantId::Metal);

    wood_gate.notify_one();
    let wood = wood.await.unwrap().unwrap();
    let stale = wood.discarded().copied().unwrap();
    assert_eq!((stale.variant, stale.token, stale.latest), (VariantId::Wood, 1, 2));

    let scene = h.resolver.current_scene().unwrap();
    assert_eq!(scene.asset().path(), METAL);
    assert_eq!(h.resolver.current_variant(), Some(VariantId::Metal));
    // The superseded load still populated the cache
    assert!(h.resolver.cache().contains(WOOD));
}

#[tokio::test]
async fn fast_switch_is_not_clobbered_by_slow_textures() {
    let h = harness(ProductLine::showroom());
    let diffuse = h.resolver.texture_bank().config().diffuse.clone();
    let gate = h.textures.probe.gate(&diffuse);

    let resin = tokio::spawn(h.resolver.resolve(VariantId::Resin));
    tokio::task::yield_now().await;
    let wood = applied(h.resolver.resolve(VariantId::Wood).await.unwrap());
    assert_eq!(wood.variant, VariantId::Wood);

    gate.notify_one();
    assert!(!resin.await.unwrap().unwrap().is_applied());
    assert!(h.resolver.texture_bank().is_loaded());
    assert!(
        h.resolver
            .current_scene()
            .unwrap()
            .materials()
            .iter()
            .all(|m| matches!(m, MaterialSpec::Opaque(_)))
    );
}

#[tokio::test]
async fn superseded_failure_is_reported_as_discarded() {
    let h = harness(ProductLine::showroom());
    let gate = h.models.probe.gate(RESIN);
    h.models.probe.fail(RESIN);

    let resin = h.resolver.resolve(VariantId::Resin);
    let wood = h.resolver.resolve(VariantId::Wood);
    applied(wood.await.unwrap());

    gate.notify_one();
    let outcome = resin.await.unwrap();
    assert!(outcome.discarded().is_some());
    assert_eq!(h.resolver.current_variant(), Some(VariantId::Wood));
}

#[tokio::test]
async fn same_variant_twice_applies_only_the_latest() {
    let h = harness(ProductLine::showroom());
    let first = h.resolver.resolve(VariantId::Wood);
    let second = h.resolver.resolve(VariantId::Wood);

    let (first, second) = futures::join!(first, second);
    assert!(!first.unwrap().is_applied());
    assert_eq!(applied(second.unwrap()).token, 2);
    assert_eq!(h.models.probe.calls(WOOD), 1);
}

#[tokio::test]
async fn unknown_variant_is_rejected() {
    let h = harness(ProductLine::showroom());
    let err = h.resolver.resolve(VariantId::Walnut).await.unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownVariant {
            variant: VariantId::Walnut,
            ..
        }
    ));
    assert_eq!(h.models.probe.total_calls(), 0);
    assert_eq!(h.resolver.state(), ResolverState::Idle);
    assert!(h.resolver.current_scene().is_none());
}

#[tokio::test]
async fn shared_model_variants_reuse_instance_and_tint() {
    let h = harness(ProductLine::simplified());

    let natural = applied(h.resolver.resolve(VariantId::Natural).await.unwrap());
    assert!(!natural.reused_instance);
    let walnut = applied(h.resolver.resolve(VariantId::Walnut).await.unwrap());
    assert!(walnut.reused_instance);
    assert_eq!(h.models.probe.total_calls(), 1);

    let natural_color = natural.scene.materials()[0].as_opaque().unwrap().color;
    let walnut_color = walnut.scene.materials()[0].as_opaque().unwrap().color;
    assert_ne!(natural_color, walnut_color);
    assert!(walnut_color.x < natural_color.x);
    // Earlier published scene is unaffected by the later switch
    assert_eq!(
        natural.scene.materials()[0].as_opaque().unwrap().color,
        natural_color
    );
    assert_eq!(walnut.scene.environment.ambient_intensity, 0.8);
}
