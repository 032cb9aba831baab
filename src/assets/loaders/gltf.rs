//! glTF / GLB model loading.
//!
//! Bytes are fetched through an [`AssetReader`] (external buffers and images
//! relative to the model), then parsed and decoded on a blocking worker into
//! an immutable [`Prefab`].

use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::assets::cache::ModelLoader;
use crate::assets::io::{AssetReader, sibling_uri};
use crate::assets::prefab::{Prefab, PrefabNode, PrefabPrimitive};
use crate::errors::LoadFailure;
use crate::resources::geometry::Geometry;
use crate::resources::image::Image;
use crate::resources::material::{OpaqueSpec, Side};
use crate::resources::texture::{ColorSpace, Texture, TextureSampler, TextureSlot};

/// Loads `.glb` / `.gltf` files into cached templates.
pub struct GltfModelLoader<R: AssetReader> {
    reader: R,
}

impl<R: AssetReader> GltfModelLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    #[inline]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    async fn load_buffers(
        &self,
        gltf: &gltf::Gltf,
        model_path: &str,
    ) -> Result<Vec<Vec<u8>>, LoadFailure> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    let blob = gltf.blob.as_deref().ok_or_else(|| {
                        LoadFailure::Gltf("Missing GLB binary chunk".to_string())
                    })?;
                    buffer_data.push(blob.to_vec());
                }
                gltf::buffer::Source::Uri(uri) => {
                    let uri = external_uri(uri)?;
                    buffer_data.push(self.reader.read_bytes(&sibling_uri(model_path, uri)).await?);
                }
            }
        }
        Ok(buffer_data)
    }

    /// Encoded bytes of every image, in document order.
    async fn load_image_bytes(
        &self,
        gltf: &gltf::Gltf,
        buffers: &[Vec<u8>],
        model_path: &str,
    ) -> Result<Vec<Vec<u8>>, LoadFailure> {
        let mut encoded = Vec::new();
        for image in gltf.images() {
            match image.source() {
                gltf::image::Source::View { view, .. } => {
                    let start = view.offset();
                    let end = start + view.length();
                    let bytes = buffers
                        .get(view.buffer().index())
                        .and_then(|b| b.get(start..end))
                        .ok_or_else(|| {
                            LoadFailure::Gltf(format!(
                                "image {} view out of buffer bounds",
                                image.index()
                            ))
                        })?;
                    encoded.push(bytes.to_vec());
                }
                gltf::image::Source::Uri { uri, .. } => {
                    let uri = external_uri(uri)?;
                    encoded.push(self.reader.read_bytes(&sibling_uri(model_path, uri)).await?);
                }
            }
        }
        Ok(encoded)
    }
}

impl<R: AssetReader + 'static> ModelLoader for GltfModelLoader<R> {
    async fn load_model(&self, path: &str) -> Result<Prefab, LoadFailure> {
        let bytes = self.reader.read_bytes(path).await?;
        let gltf = gltf::Gltf::from_slice(&bytes)?;
        drop(bytes);

        let buffers = self.load_buffers(&gltf, path).await?;
        let images = self.load_image_bytes(&gltf, &buffers, path).await?;

        let label = path.to_string();
        tokio::task::spawn_blocking(move || PrefabBuilder::build(&gltf, &buffers, images, &label))
            .await?
    }
}

fn external_uri(uri: &str) -> Result<&str, LoadFailure> {
    if uri.starts_with("data:") {
        return Err(LoadFailure::Gltf(
            "embedded data URIs are not supported; use GLB or external files".to_string(),
        ));
    }
    Ok(uri)
}

/// Decoded image plus the sampler state authored for it.
struct IntermediateTexture {
    name: Option<String>,
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    sampler: TextureSampler,
    generate_mipmaps: bool,
}

#[derive(Hash, PartialEq, Eq, Clone, Copy)]
struct TextureCacheKey {
    gltf_texture_index: usize,
    is_srgb: bool,
}

struct PrefabBuilder {
    intermediate_textures: Vec<IntermediateTexture>,
    created_textures: FxHashMap<TextureCacheKey, Arc<Texture>>,
    prefab: Prefab,
}

impl PrefabBuilder {
    fn build(
        gltf: &gltf::Gltf,
        buffers: &[Vec<u8>],
        images: Vec<Vec<u8>>,
        label: &str,
    ) -> Result<Prefab, LoadFailure> {
        let unsupported: Vec<_> = gltf.extensions_required().collect();
        if !unsupported.is_empty() {
            warn!("'{label}' requires unsupported glTF extensions: {unsupported:?}");
        }

        let decoded = images
            .iter()
            .map(|bytes| image::load_from_memory(bytes).map(image::DynamicImage::into_rgba8))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = Self {
            intermediate_textures: Vec::new(),
            created_textures: FxHashMap::default(),
            prefab: Prefab::new(),
        };
        builder.load_textures(gltf, &decoded)?;
        builder.load_materials(gltf);
        let mesh_primitives = builder.load_meshes(gltf, buffers);
        builder.load_nodes(gltf, &mesh_primitives);

        builder.prefab.textures = builder.created_textures.into_values().collect();
        debug!(
            "Parsed '{label}': {} nodes, {} geometries, {} materials, {} textures",
            builder.prefab.nodes.len(),
            builder.prefab.geometries.len(),
            builder.prefab.materials.len(),
            builder.prefab.textures.len()
        );
        Ok(builder.prefab)
    }

    /// Only collects image data and sampler configuration; textures are
    /// created per color space when a material references them.
    fn load_textures(
        &mut self,
        gltf: &gltf::Gltf,
        decoded: &[image::RgbaImage],
    ) -> Result<(), LoadFailure> {
        for texture in gltf.textures() {
            let img = decoded.get(texture.source().index()).ok_or_else(|| {
                LoadFailure::Gltf(format!("texture {} has no image", texture.index()))
            })?;
            let (sampler, generate_mipmaps) = convert_sampler(&texture.sampler());
            self.intermediate_textures.push(IntermediateTexture {
                name: texture.name().map(str::to_string),
                rgba: img.as_raw().clone(),
                width: img.width(),
                height: img.height(),
                sampler,
                generate_mipmaps,
            });
        }
        Ok(())
    }

    fn get_or_create_texture(
        &mut self,
        gltf_texture_index: usize,
        is_srgb: bool,
    ) -> Option<Arc<Texture>> {
        let key = TextureCacheKey {
            gltf_texture_index,
            is_srgb,
        };
        if let Some(texture) = self.created_textures.get(&key) {
            return Some(Arc::clone(texture));
        }

        let source = self.intermediate_textures.get(gltf_texture_index)?;
        let color_space = if is_srgb {
            ColorSpace::Srgb
        } else {
            ColorSpace::Linear
        };
        let image = Image::new(
            source.width,
            source.height,
            color_space.rgba8_format(),
            source.rgba.clone(),
        );
        let name = source
            .name
            .clone()
            .unwrap_or_else(|| format!("Texture_{gltf_texture_index}"));
        let mut texture = Texture::new(&name, image);
        texture.sampler = source.sampler;
        texture.generate_mipmaps = source.generate_mipmaps;

        let texture = Arc::new(texture);
        self.created_textures.insert(key, Arc::clone(&texture));
        Some(texture)
    }

    fn texture_slot(
        &mut self,
        texture: &gltf::Texture,
        tex_coord: u32,
        is_srgb: bool,
    ) -> Option<TextureSlot> {
        let texture = self.get_or_create_texture(texture.index(), is_srgb)?;
        let mut slot = TextureSlot::new(texture);
        slot.channel = tex_coord as u8;
        Some(slot)
    }

    fn load_materials(&mut self, gltf: &gltf::Gltf) {
        for material in gltf.materials() {
            let pbr = material.pbr_metallic_roughness();
            let name = material
                .name()
                .map_or_else(|| format!("Material_{}", self.prefab.materials.len()), str::to_string);

            let mut spec = OpaqueSpec::new(&name, Vec4::from_array(pbr.base_color_factor()));
            spec.metalness = pbr.metallic_factor();
            spec.roughness = pbr.roughness_factor();
            spec.emissive = Vec3::from_array(material.emissive_factor());
            spec.side = if material.double_sided() {
                Side::Double
            } else {
                Side::Front
            };

            // Base Color Texture (sRGB)
            if let Some(info) = pbr.base_color_texture() {
                spec.map = self.texture_slot(&info.texture(), info.tex_coord(), true);
            }
            // Metallic-Roughness Texture (Linear)
            if let Some(info) = pbr.metallic_roughness_texture() {
                spec.roughness_map = self.texture_slot(&info.texture(), info.tex_coord(), false);
            }
            // Normal Texture (Linear)
            if let Some(normal) = material.normal_texture() {
                spec.normal_map = self.texture_slot(&normal.texture(), normal.tex_coord(), false);
            }

            self.prefab.materials.push(spec);
        }
    }

    /// Returns, per glTF mesh, the primitives it expands to.
    fn load_meshes(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<Vec<PrefabPrimitive>> {
        let mut mesh_primitives = Vec::with_capacity(gltf.meshes().len());
        for mesh in gltf.meshes() {
            let mut primitives = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    warn!(
                        "Skipping non-triangle primitive {} of mesh {:?}",
                        primitive.index(),
                        mesh.name()
                    );
                    continue;
                }
                let geometry = load_primitive_geometry(&primitive, buffers);
                self.prefab.geometries.push(Arc::new(geometry));
                primitives.push(PrefabPrimitive {
                    geometry: self.prefab.geometries.len() - 1,
                    material: primitive.material().index(),
                });
            }
            mesh_primitives.push(primitives);
        }
        mesh_primitives
    }

    fn load_nodes(&mut self, gltf: &gltf::Gltf, mesh_primitives: &[Vec<PrefabPrimitive>]) {
        for node in gltf.nodes() {
            let name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
            let mut prefab_node = PrefabNode::new(&name);

            let (t, r, s) = node.transform().decomposed();
            prefab_node.transform.position = Vec3::from_array(t);
            prefab_node.transform.rotation = Quat::from_array(r);
            prefab_node.transform.scale = Vec3::from_array(s);

            prefab_node.children_indices = node.children().map(|c| c.index()).collect();
            if let Some(mesh) = node.mesh() {
                prefab_node.primitives = mesh_primitives
                    .get(mesh.index())
                    .cloned()
                    .unwrap_or_default();
            }
            self.prefab.nodes.push(prefab_node);
        }

        self.prefab.root_indices = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => {
                // No scene: every node that is nobody's child is a root.
                let mut is_child = vec![false; self.prefab.nodes.len()];
                for node in &self.prefab.nodes {
                    for &child in &node.children_indices {
                        if let Some(flag) = is_child.get_mut(child) {
                            *flag = true;
                        }
                    }
                }
                (0..self.prefab.nodes.len()).filter(|&i| !is_child[i]).collect()
            }
        };
    }
}

fn load_primitive_geometry(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Geometry {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(Iterator::collect)
        .unwrap_or_default();
    let mut geometry = Geometry::new(positions);

    if let Some(iter) = reader.read_normals() {
        geometry = geometry.with_normals(iter.collect());
    }
    if let Some(iter) = reader.read_tex_coords(0) {
        geometry = geometry.with_uvs(iter.into_f32().collect());
    }
    if let Some(iter) = reader.read_indices() {
        geometry = geometry.with_indices(iter.into_u32().collect());
    }
    geometry
}

/// Converts a glTF sampler; the flag reports whether mipmaps are requested.
fn convert_sampler(sampler: &gltf::texture::Sampler) -> (TextureSampler, bool) {
    use gltf::texture::{MagFilter, MinFilter, WrappingMode};
    use wgpu::{AddressMode, FilterMode, MipmapFilterMode};

    let address = |mode: WrappingMode| match mode {
        WrappingMode::ClampToEdge => AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => AddressMode::MirrorRepeat,
        WrappingMode::Repeat => AddressMode::Repeat,
    };

    let mag_filter = match sampler.mag_filter() {
        Some(MagFilter::Nearest) => FilterMode::Nearest,
        Some(MagFilter::Linear) | None => FilterMode::Linear,
    };
    let (min_filter, mipmap_filter, generate_mipmaps) = match sampler.min_filter() {
        Some(MinFilter::Nearest) => (FilterMode::Nearest, MipmapFilterMode::Linear, false),
        Some(MinFilter::Linear) | None => (FilterMode::Linear, MipmapFilterMode::Linear, false),
        Some(MinFilter::NearestMipmapNearest) => {
            (FilterMode::Nearest, MipmapFilterMode::Nearest, true)
        }
        Some(MinFilter::LinearMipmapNearest) => {
            (FilterMode::Linear, MipmapFilterMode::Nearest, true)
        }
        Some(MinFilter::NearestMipmapLinear) => {
            (FilterMode::Nearest, MipmapFilterMode::Linear, true)
        }
        Some(MinFilter::LinearMipmapLinear) => (FilterMode::Linear, MipmapFilterMode::Linear, true),
    };

    let sampler = TextureSampler {
        address_mode_u: address(sampler.wrap_s()),
        address_mode_v: address(sampler.wrap_t()),
        mag_filter,
        min_filter,
        mipmap_filter,
        anisotropy_clamp: 1,
    };
    (sampler, generate_mipmaps)
}
