//! Showroom Variant Walkthrough
//!
//! Resolves a few variant switches against an asset root and logs what the
//! pipeline produced, plus cache and texture bank statistics.
//!
//! Usage:
//!   cargo run --example showroom -- [ASSET_ROOT] [PRODUCT_LINE.json]
//!
//! `ASSET_ROOT` defaults to `assets`; an `http(s)://` root requires the
//! `http` feature. Without a product line file the built-in showroom line is
//! used.

use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use matchum::pipeline::{RotateDirection, VariantId};
use matchum::{
    AssetReaderVariant, GltfModelLoader, ImageTextureLoader, ProductLine, Resolution,
    VariantResolver, Viewer,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| "assets".to_string());
    let line = match args.next() {
        Some(path) => ProductLine::from_file(&path).with_context(|| format!("loading {path}"))?,
        None => ProductLine::showroom(),
    };
    info!("Product line '{}' over {root}", line.name);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(walkthrough(&root, line))
}

async fn walkthrough(root: &str, line: ProductLine) -> anyhow::Result<()> {
    let models = GltfModelLoader::new(AssetReaderVariant::from_source(root)?);
    let textures = ImageTextureLoader::new(AssetReaderVariant::from_source(root)?);
    let resolver = Arc::new(VariantResolver::with_loaders(line, models, textures)?);
    let mut viewer = Viewer::new(Arc::clone(&resolver))?;

    report(viewer.refresh().await);

    let walk: Vec<VariantId> = resolver.product_line().variant_ids().collect();
    for &variant in walk.iter().skip(1).chain(walk.first()) {
        report(viewer.set_variant(variant).await);
    }

    // Two quick switches: only the second one lands
    if let [first, second, ..] = walk[..] {
        let early = viewer.set_variant(first);
        let late = viewer.set_variant(second);
        let (early, late) = futures::join!(early, late);
        report(early);
        report(late);
    }

    viewer.rotate_step(RotateDirection::Right);
    viewer.set_scale(viewer.state().scale * 1.2);
    info!("Viewer state: {:?}", viewer.state());
    viewer.reset();
    info!("After reset: {:?}", viewer.state());

    let stats = resolver.cache().stats();
    info!(
        "Model cache: {} entries, {} loads, {} hits, {} joins, {} failures",
        resolver.cache().len(),
        stats.loads,
        stats.hits,
        stats.joins,
        stats.failures
    );
    info!(
        "Texture bank: loaded={} loads={}",
        resolver.texture_bank().is_loaded(),
        resolver.texture_bank().load_count()
    );
    Ok(())
}

fn report(result: matchum::Result<Resolution>) {
    match result {
        Ok(Resolution::Applied(resolved)) => {
            let scene = &resolved.scene;
            let materials = scene.materials();
            info!(
                "[{}] {} applied: {} meshes, {} updated, first material '{}' ({})",
                resolved.token,
                resolved.variant,
                scene.mesh_count(),
                resolved.meshes_updated,
                materials.first().map_or("-", |m| m.name()),
                materials.first().map_or("-", |m| m.shader_name()),
            );
        }
        Ok(Resolution::Discarded(stale)) => {
            info!(
                "[{}] {} discarded, request {} is newer",
                stale.token, stale.variant, stale.latest
            );
        }
        Err(err) => warn!("Variant switch failed: {err}"),
    }
}
