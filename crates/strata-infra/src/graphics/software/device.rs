// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The resource registry of the software backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use strata_core::math::LinearRgba;
use strata_core::renderer::api::util::DepthClearFlags;
use strata_core::renderer::binding::{BufferBinding, TextureArrayViews};
use strata_core::renderer::{
    BufferDesc, BufferId, BufferKind, DepthImageDesc, DepthImageId, GraphicsPipelineDesc,
    GraphicsPipelineId, ImageDesc, ImageFormat, ImageId, ModelDesc, ModelId, PipelineReflection,
    ResourceError, ResourceKind, SamplerDesc, SamplerId, TextureArrayDesc, TextureArrayId,
    TextureDesc, TextureId, MAX_FRAMES_IN_FLIGHT,
};

use super::native::{NativeBuffer, NativeImageView, NativeSampler};

/// The layout a color image is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Writable as a render target or clear destination.
    General,
    /// Readable by shaders.
    ShaderReadOnly,
}

#[derive(Debug)]
struct ImageEntry {
    desc: ImageDesc,
    view: NativeImageView,
    pixels: Vec<LinearRgba>,
    layout: ImageLayout,
}

#[derive(Debug)]
struct DepthImageEntry {
    desc: DepthImageDesc,
    depth: Vec<f32>,
    stencil: Vec<u8>,
}

#[derive(Debug)]
struct TextureEntry {
    desc: TextureDesc,
    view: NativeImageView,
}

#[derive(Debug)]
struct TextureArrayEntry {
    desc: TextureArrayDesc,
    textures: Vec<TextureId>,
}

#[derive(Debug)]
struct SamplerEntry {
    sampler: NativeSampler,
}

#[derive(Debug)]
struct PipelineEntry {
    debug_name: String,
    render_targets: Vec<ImageId>,
    depth_stencil: Option<DepthImageId>,
    reflection: Arc<PipelineReflection>,
}

#[derive(Debug)]
struct ModelEntry {
    desc: ModelDesc,
    vertex_buffer: NativeBuffer,
    index_buffer: NativeBuffer,
}

#[derive(Debug)]
struct BufferEntry {
    desc: BufferDesc,
    frames: Vec<NativeBuffer>,
    contents: Vec<Vec<u8>>,
}

/// A copy of a color image read back by the blit.
#[derive(Debug, Clone)]
pub(crate) struct ImageReadback {
    pub(crate) debug_name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) layout: ImageLayout,
    pub(crate) pixels: Vec<LinearRgba>,
}

/// The render targets of a registered pipeline.
#[derive(Debug, Clone)]
pub struct PipelineTargets {
    /// Color targets of the pipeline's render pass.
    pub render_targets: Vec<ImageId>,
    /// Depth target of the pipeline's render pass.
    pub depth_stencil: Option<DepthImageId>,
}

#[derive(Debug)]
struct SoftwareDeviceInternal {
    images: Mutex<HashMap<ImageId, ImageEntry>>,
    depth_images: Mutex<HashMap<DepthImageId, DepthImageEntry>>,
    textures: Mutex<HashMap<TextureId, TextureEntry>>,
    texture_arrays: Mutex<HashMap<TextureArrayId, TextureArrayEntry>>,
    samplers: Mutex<HashMap<SamplerId, SamplerEntry>>,
    pipelines: Mutex<HashMap<GraphicsPipelineId, PipelineEntry>>,
    models: Mutex<HashMap<ModelId, ModelEntry>>,
    buffers: Mutex<HashMap<BufferId, BufferEntry>>,

    next_image_id: AtomicU32,
    next_depth_image_id: AtomicU32,
    next_texture_id: AtomicU32,
    next_texture_array_id: AtomicU32,
    next_sampler_id: AtomicU32,
    next_pipeline_id: AtomicU32,
    next_model_id: AtomicU32,
    next_buffer_id: AtomicU32,
    next_native_id: AtomicU64,

    debug_texture: TextureId,
    debug_view: NativeImageView,
}

/// Owns every resource of the software backend.
///
/// Cloning is cheap: clones share the same registries.
#[derive(Debug, Clone)]
pub struct SoftwareDevice {
    internal: Arc<SoftwareDeviceInternal>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ResourceError> {
    mutex
        .lock()
        .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned ({what}): {e}")))
}

fn check_handle(valid: bool, kind: ResourceKind) -> Result<(), ResourceError> {
    if valid {
        Ok(())
    } else {
        Err(ResourceError::InvalidHandle { kind })
    }
}

fn check_extent(width: u32, height: u32, name: &str) -> Result<usize, ResourceError> {
    if width == 0 || height == 0 {
        return Err(ResourceError::BackendError(format!(
            "'{name}' has a zero-sized extent {width}x{height}"
        )));
    }
    Ok(width as usize * height as usize)
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareDevice {
    /// Creates an empty device holding only the standing debug texture.
    pub fn new() -> Self {
        let debug_texture = TextureId(0);
        let debug_view = NativeImageView(0);
        let mut textures = HashMap::new();
        textures.insert(
            debug_texture,
            TextureEntry {
                desc: TextureDesc {
                    debug_name: "Debug Texture".to_string(),
                    width: 1,
                    height: 1,
                    format: ImageFormat::Rgba8Unorm,
                },
                view: debug_view,
            },
        );

        Self {
            internal: Arc::new(SoftwareDeviceInternal {
                images: Mutex::new(HashMap::new()),
                depth_images: Mutex::new(HashMap::new()),
                textures: Mutex::new(textures),
                texture_arrays: Mutex::new(HashMap::new()),
                samplers: Mutex::new(HashMap::new()),
                pipelines: Mutex::new(HashMap::new()),
                models: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                next_image_id: AtomicU32::new(0),
                next_depth_image_id: AtomicU32::new(0),
                next_texture_id: AtomicU32::new(1),
                next_texture_array_id: AtomicU32::new(0),
                next_sampler_id: AtomicU32::new(0),
                next_pipeline_id: AtomicU32::new(0),
                next_model_id: AtomicU32::new(0),
                next_buffer_id: AtomicU32::new(0),
                next_native_id: AtomicU64::new(1),
                debug_texture,
                debug_view,
            }),
        }
    }

    fn generate_native_id(&self) -> u64 {
        self.internal.next_native_id.fetch_add(1, Ordering::Relaxed)
    }

    /// The standing debug texture used to pad texture arrays.
    pub fn debug_texture(&self) -> TextureId {
        self.internal.debug_texture
    }

    pub(crate) fn debug_view(&self) -> NativeImageView {
        self.internal.debug_view
    }

    // --- Creation ---

    /// Creates a color render target filled with its clear color.
    pub fn create_image(&self, desc: &ImageDesc) -> Result<ImageId, ResourceError> {
        let texels = check_extent(desc.width, desc.height, &desc.debug_name)?;
        let id = ImageId(self.internal.next_image_id.fetch_add(1, Ordering::Relaxed));
        let entry = ImageEntry {
            desc: desc.clone(),
            view: NativeImageView(self.generate_native_id()),
            pixels: vec![desc.clear_color; texels],
            layout: ImageLayout::General,
        };
        lock(&self.internal.images, "images")?.insert(id, entry);
        log::info!(
            "SoftwareDevice: Created image '{}' ({}x{}, {:?}) with ID: {:?}",
            desc.debug_name,
            desc.width,
            desc.height,
            desc.format,
            id
        );
        Ok(id)
    }

    /// Creates a depth render target filled with its clear depth.
    pub fn create_depth_image(&self, desc: &DepthImageDesc) -> Result<DepthImageId, ResourceError> {
        let texels = check_extent(desc.width, desc.height, &desc.debug_name)?;
        let id = DepthImageId(
            self.internal
                .next_depth_image_id
                .fetch_add(1, Ordering::Relaxed),
        );
        let stencil = if desc.format.has_stencil() {
            vec![0; texels]
        } else {
            Vec::new()
        };
        let entry = DepthImageEntry {
            desc: desc.clone(),
            depth: vec![desc.clear_depth; texels],
            stencil,
        };
        lock(&self.internal.depth_images, "depth images")?.insert(id, entry);
        log::info!(
            "SoftwareDevice: Created depth image '{}' ({:?}) with ID: {:?}",
            desc.debug_name,
            desc.format,
            id
        );
        Ok(id)
    }

    /// Creates a sampled texture.
    pub fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId, ResourceError> {
        check_extent(desc.width, desc.height, &desc.debug_name)?;
        let id = TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed));
        let entry = TextureEntry {
            desc: desc.clone(),
            view: NativeImageView(self.generate_native_id()),
        };
        lock(&self.internal.textures, "textures")?.insert(id, entry);
        log::debug!(
            "SoftwareDevice: Created texture '{}' with ID: {:?}",
            desc.debug_name,
            id
        );
        Ok(id)
    }

    /// Creates an empty texture array.
    pub fn create_texture_array(
        &self,
        desc: &TextureArrayDesc,
    ) -> Result<TextureArrayId, ResourceError> {
        if desc.capacity == 0 {
            return Err(ResourceError::BackendError(format!(
                "Texture array '{}' needs a capacity of at least 1",
                desc.debug_name
            )));
        }
        let id = TextureArrayId(
            self.internal
                .next_texture_array_id
                .fetch_add(1, Ordering::Relaxed),
        );
        let entry = TextureArrayEntry {
            desc: desc.clone(),
            textures: Vec::with_capacity(desc.capacity as usize),
        };
        lock(&self.internal.texture_arrays, "texture arrays")?.insert(id, entry);
        log::info!(
            "SoftwareDevice: Created texture array '{}' (capacity {}) with ID: {:?}",
            desc.debug_name,
            desc.capacity,
            id
        );
        Ok(id)
    }

    /// Appends `texture` to `array` and returns its index in the array.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the array is already at capacity.
    pub fn load_texture_into_array(
        &self,
        array: TextureArrayId,
        texture: TextureId,
    ) -> Result<u32, ResourceError> {
        check_handle(texture.is_valid(), ResourceKind::Texture)?;
        if !lock(&self.internal.textures, "textures")?.contains_key(&texture) {
            return Err(ResourceError::NotFound {
                kind: ResourceKind::Texture,
                id: texture.index(),
            });
        }

        let mut arrays = lock(&self.internal.texture_arrays, "texture arrays")?;
        let entry = arrays
            .get_mut(&array)
            .ok_or(ResourceError::NotFound {
                kind: ResourceKind::TextureArray,
                id: array.index(),
            })?;
        if entry.textures.len() >= entry.desc.capacity as usize {
            log::warn!(
                "SoftwareDevice: Texture array '{}' is full ({} textures), refusing {:?}",
                entry.desc.debug_name,
                entry.desc.capacity,
                texture
            );
            return Err(ResourceError::OutOfBounds);
        }
        entry.textures.push(texture);
        Ok((entry.textures.len() - 1) as u32)
    }

    /// Creates a sampler.
    pub fn create_sampler(&self, desc: &SamplerDesc) -> Result<SamplerId, ResourceError> {
        let id = SamplerId(self.internal.next_sampler_id.fetch_add(1, Ordering::Relaxed));
        let entry = SamplerEntry {
            sampler: NativeSampler(self.generate_native_id()),
        };
        lock(&self.internal.samplers, "samplers")?.insert(id, entry);
        log::debug!(
            "SoftwareDevice: Created sampler '{}' ({:?}, {:?}) with ID: {:?}",
            desc.debug_name,
            desc.filter,
            desc.address_mode,
            id
        );
        Ok(id)
    }

    /// Creates a model with its vertex and index buffers.
    pub fn create_model(&self, desc: &ModelDesc) -> Result<ModelId, ResourceError> {
        if desc.index_count == 0 {
            return Err(ResourceError::BackendError(format!(
                "Model '{}' has no indices",
                desc.debug_name
            )));
        }
        let id = ModelId(self.internal.next_model_id.fetch_add(1, Ordering::Relaxed));
        let entry = ModelEntry {
            desc: desc.clone(),
            vertex_buffer: NativeBuffer(self.generate_native_id()),
            index_buffer: NativeBuffer(self.generate_native_id()),
        };
        lock(&self.internal.models, "models")?.insert(id, entry);
        log::info!(
            "SoftwareDevice: Created model '{}' ({} vertices, {} indices) with ID: {:?}",
            desc.debug_name,
            desc.vertex_count,
            desc.index_count,
            id
        );
        Ok(id)
    }

    /// Replaces the geometry of an existing model. The id and its native
    /// buffers are kept.
    pub fn update_model(&self, model: ModelId, desc: &ModelDesc) -> Result<(), ResourceError> {
        check_handle(model.is_valid(), ResourceKind::Model)?;
        if desc.index_count == 0 {
            return Err(ResourceError::BackendError(format!(
                "Model '{}' has no indices",
                desc.debug_name
            )));
        }
        let mut models = lock(&self.internal.models, "models")?;
        let entry = models.get_mut(&model).ok_or(ResourceError::NotFound {
            kind: ResourceKind::Model,
            id: model.index(),
        })?;
        entry.desc = desc.clone();
        log::debug!(
            "SoftwareDevice: Updated model {:?} ({} vertices, {} indices)",
            model,
            desc.vertex_count,
            desc.index_count
        );
        Ok(())
    }

    /// Creates a buffer backed by one native buffer per frame in flight.
    pub fn create_buffer(&self, desc: &BufferDesc) -> Result<BufferId, ResourceError> {
        if desc.size == 0 {
            return Err(ResourceError::BackendError(format!(
                "Buffer '{}' has a size of zero",
                desc.debug_name
            )));
        }
        let id = BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        let frames = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| NativeBuffer(self.generate_native_id()))
            .collect();
        let contents = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| vec![0u8; desc.size as usize])
            .collect();
        let entry = BufferEntry {
            desc: desc.clone(),
            frames,
            contents,
        };
        lock(&self.internal.buffers, "buffers")?.insert(id, entry);
        log::info!(
            "SoftwareDevice: Created {:?} buffer '{}' ({} bytes x {} frames) with ID: {:?}",
            desc.kind,
            desc.debug_name,
            desc.size,
            MAX_FRAMES_IN_FLIGHT,
            id
        );
        Ok(id)
    }

    /// Creates a graphics pipeline and merges its stages' reflection data.
    /// ## Errors
    /// * `ResourceError::NotFound` - If a render target of `desc` does not exist.
    pub fn create_graphics_pipeline(
        &self,
        desc: &GraphicsPipelineDesc,
    ) -> Result<GraphicsPipelineId, ResourceError> {
        {
            let images = lock(&self.internal.images, "images")?;
            if let Some(missing) = desc.render_targets.iter().find(|t| !images.contains_key(*t)) {
                return Err(ResourceError::NotFound {
                    kind: ResourceKind::Image,
                    id: missing.index(),
                });
            }
        }
        if let Some(depth) = desc.depth_stencil {
            if !lock(&self.internal.depth_images, "depth images")?.contains_key(&depth) {
                return Err(ResourceError::NotFound {
                    kind: ResourceKind::DepthImage,
                    id: depth.index(),
                });
            }
        }

        let reflection = PipelineReflection::from_stages(&desc.stages);
        let id = GraphicsPipelineId(
            self.internal
                .next_pipeline_id
                .fetch_add(1, Ordering::Relaxed),
        );
        log::info!(
            "SoftwareDevice: Created graphics pipeline '{}' with ID: {:?} ({} bindings in {} sets)",
            desc.debug_name,
            id,
            reflection.bind_infos().len(),
            reflection.set_layouts().len()
        );
        let entry = PipelineEntry {
            debug_name: desc.debug_name.clone(),
            render_targets: desc.render_targets.clone(),
            depth_stencil: desc.depth_stencil,
            reflection: Arc::new(reflection),
        };
        lock(&self.internal.pipelines, "pipelines")?.insert(id, entry);
        Ok(id)
    }

    // --- Buffer contents ---

    /// Writes `data` into the native buffer of `frame_index` at `offset`.
    ///
    /// Frame indices wrap over the frames in flight.
    pub fn write_buffer(
        &self,
        buffer: BufferId,
        frame_index: u32,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let mut buffers = lock(&self.internal.buffers, "buffers")?;
        let entry = buffers.get_mut(&buffer).ok_or(ResourceError::NotFound {
            kind: ResourceKind::Buffer,
            id: buffer.index(),
        })?;
        let contents = entry
            .contents
            .get_mut((frame_index % MAX_FRAMES_IN_FLIGHT) as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        let start = offset as usize;
        let end = start
            .checked_add(data.len())
            .filter(|end| *end <= contents.len())
            .ok_or(ResourceError::OutOfBounds)?;
        contents[start..end].copy_from_slice(data);
        Ok(())
    }

    /// A copy of the native buffer of `frame_index`.
    pub fn read_buffer(
        &self,
        buffer: BufferId,
        frame_index: u32,
    ) -> Result<Vec<u8>, ResourceError> {
        let buffers = lock(&self.internal.buffers, "buffers")?;
        let entry = buffers.get(&buffer).ok_or(ResourceError::NotFound {
            kind: ResourceKind::Buffer,
            id: buffer.index(),
        })?;
        entry
            .contents
            .get((frame_index % MAX_FRAMES_IN_FLIGHT) as usize)
            .cloned()
            .ok_or(ResourceError::OutOfBounds)
    }

    // --- Image storage ---

    /// A copy of the pixels of a color image, row-major.
    pub fn image_pixels(&self, image: ImageId) -> Result<Vec<LinearRgba>, ResourceError> {
        self.with_image(image, |entry| entry.pixels.clone())
    }

    /// The pixels of a color image as raw bytes.
    pub fn image_bytes(&self, image: ImageId) -> Result<Vec<u8>, ResourceError> {
        self.with_image(image, |entry| {
            bytemuck::cast_slice::<LinearRgba, u8>(&entry.pixels).to_vec()
        })
    }

    /// The current layout of a color image.
    pub fn image_layout(&self, image: ImageId) -> Result<ImageLayout, ResourceError> {
        self.with_image(image, |entry| entry.layout)
    }

    /// The pixel format of a color image.
    pub fn image_format(&self, image: ImageId) -> Result<ImageFormat, ResourceError> {
        self.with_image(image, |entry| entry.desc.format)
    }

    pub(crate) fn image_view(&self, image: ImageId) -> Result<NativeImageView, ResourceError> {
        self.with_image(image, |entry| entry.view)
    }

    /// Reads back the color image behind `view`, if any.
    pub(crate) fn read_image_by_view(
        &self,
        view: NativeImageView,
    ) -> Result<Option<ImageReadback>, ResourceError> {
        let images = lock(&self.internal.images, "images")?;
        Ok(images
            .values()
            .find(|entry| entry.view == view)
            .map(|entry| ImageReadback {
                debug_name: entry.desc.debug_name.clone(),
                width: entry.desc.width,
                height: entry.desc.height,
                layout: entry.layout,
                pixels: entry.pixels.clone(),
            }))
    }

    /// The depth and stencil values of a depth image, row-major.
    ///
    /// The stencil vector is empty for formats without a stencil aspect.
    pub fn depth_image_contents(
        &self,
        image: DepthImageId,
    ) -> Result<(Vec<f32>, Vec<u8>), ResourceError> {
        let images = lock(&self.internal.depth_images, "depth images")?;
        let entry = images.get(&image).ok_or(ResourceError::NotFound {
            kind: ResourceKind::DepthImage,
            id: image.index(),
        })?;
        Ok((entry.depth.clone(), entry.stencil.clone()))
    }

    fn with_image<R>(
        &self,
        image: ImageId,
        f: impl FnOnce(&ImageEntry) -> R,
    ) -> Result<R, ResourceError> {
        check_handle(image.is_valid(), ResourceKind::Image)?;
        let images = lock(&self.internal.images, "images")?;
        let entry = images.get(&image).ok_or(ResourceError::NotFound {
            kind: ResourceKind::Image,
            id: image.index(),
        })?;
        Ok(f(entry))
    }

    fn with_image_mut<R>(
        &self,
        image: ImageId,
        f: impl FnOnce(&mut ImageEntry) -> R,
    ) -> Result<R, ResourceError> {
        check_handle(image.is_valid(), ResourceKind::Image)?;
        let mut images = lock(&self.internal.images, "images")?;
        let entry = images.get_mut(&image).ok_or(ResourceError::NotFound {
            kind: ResourceKind::Image,
            id: image.index(),
        })?;
        Ok(f(entry))
    }

    pub(crate) fn clear_image(
        &self,
        image: ImageId,
        color: LinearRgba,
    ) -> Result<(), ResourceError> {
        self.with_image_mut(image, |entry| {
            if entry.layout != ImageLayout::General {
                log::warn!(
                    "SoftwareDevice: Clearing image '{}' while in layout {:?}",
                    entry.desc.debug_name,
                    entry.layout
                );
            }
            entry.pixels.fill(color);
        })
    }

    pub(crate) fn clear_depth_image(
        &self,
        image: DepthImageId,
        flags: DepthClearFlags,
        depth: f32,
        stencil: u8,
    ) -> Result<(), ResourceError> {
        let mut images = lock(&self.internal.depth_images, "depth images")?;
        let entry = images.get_mut(&image).ok_or(ResourceError::NotFound {
            kind: ResourceKind::DepthImage,
            id: image.index(),
        })?;
        if flags.contains(DepthClearFlags::DEPTH) {
            entry.depth.fill(depth);
        }
        if flags.contains(DepthClearFlags::STENCIL) {
            if entry.desc.format.has_stencil() {
                entry.stencil.fill(stencil);
            } else {
                log::warn!(
                    "SoftwareDevice: Depth image '{}' ({:?}) has no stencil aspect to clear",
                    entry.desc.debug_name,
                    entry.desc.format
                );
            }
        }
        Ok(())
    }

    pub(crate) fn set_image_layout(
        &self,
        image: ImageId,
        layout: ImageLayout,
    ) -> Result<ImageLayout, ResourceError> {
        self.with_image_mut(image, |entry| std::mem::replace(&mut entry.layout, layout))
    }

    // --- Lookups used by the backend ---

    pub(crate) fn pipeline_reflection(
        &self,
        pipeline: GraphicsPipelineId,
    ) -> Result<Arc<PipelineReflection>, ResourceError> {
        self.with_pipeline(pipeline, |entry| entry.reflection.clone())
    }

    pub(crate) fn pipeline_targets(
        &self,
        pipeline: GraphicsPipelineId,
    ) -> Result<PipelineTargets, ResourceError> {
        self.with_pipeline(pipeline, |entry| PipelineTargets {
            render_targets: entry.render_targets.clone(),
            depth_stencil: entry.depth_stencil,
        })
    }

    /// The debug name a pipeline was created with.
    pub fn pipeline_name(&self, pipeline: GraphicsPipelineId) -> Result<String, ResourceError> {
        self.with_pipeline(pipeline, |entry| entry.debug_name.clone())
    }

    fn with_pipeline<R>(
        &self,
        pipeline: GraphicsPipelineId,
        f: impl FnOnce(&PipelineEntry) -> R,
    ) -> Result<R, ResourceError> {
        check_handle(pipeline.is_valid(), ResourceKind::GraphicsPipeline)?;
        let pipelines = lock(&self.internal.pipelines, "pipelines")?;
        let entry = pipelines.get(&pipeline).ok_or(ResourceError::NotFound {
            kind: ResourceKind::GraphicsPipeline,
            id: pipeline.index(),
        })?;
        Ok(f(entry))
    }

    fn with_model<R>(
        &self,
        model: ModelId,
        f: impl FnOnce(&ModelEntry) -> R,
    ) -> Result<R, ResourceError> {
        check_handle(model.is_valid(), ResourceKind::Model)?;
        let models = lock(&self.internal.models, "models")?;
        let entry = models.get(&model).ok_or(ResourceError::NotFound {
            kind: ResourceKind::Model,
            id: model.index(),
        })?;
        Ok(f(entry))
    }

    pub(crate) fn model_index_count(&self, model: ModelId) -> Result<u32, ResourceError> {
        self.with_model(model, |entry| entry.desc.index_count)
    }

    pub(crate) fn model_vertex_buffer(
        &self,
        model: ModelId,
    ) -> Result<NativeBuffer, ResourceError> {
        self.with_model(model, |entry| entry.vertex_buffer)
    }

    pub(crate) fn model_index_buffer(&self, model: ModelId) -> Result<NativeBuffer, ResourceError> {
        self.with_model(model, |entry| entry.index_buffer)
    }

    pub(crate) fn sampler(&self, sampler: SamplerId) -> Result<NativeSampler, ResourceError> {
        check_handle(sampler.is_valid(), ResourceKind::Sampler)?;
        let samplers = lock(&self.internal.samplers, "samplers")?;
        samplers
            .get(&sampler)
            .map(|entry| entry.sampler)
            .ok_or(ResourceError::NotFound {
                kind: ResourceKind::Sampler,
                id: sampler.index(),
            })
    }

    pub(crate) fn texture_view(
        &self,
        texture: TextureId,
    ) -> Result<NativeImageView, ResourceError> {
        check_handle(texture.is_valid(), ResourceKind::Texture)?;
        let textures = lock(&self.internal.textures, "textures")?;
        textures
            .get(&texture)
            .map(|entry| entry.view)
            .ok_or(ResourceError::NotFound {
                kind: ResourceKind::Texture,
                id: texture.index(),
            })
    }

    /// The descriptor a texture was created from.
    pub fn texture_desc(&self, texture: TextureId) -> Result<TextureDesc, ResourceError> {
        check_handle(texture.is_valid(), ResourceKind::Texture)?;
        let textures = lock(&self.internal.textures, "textures")?;
        textures
            .get(&texture)
            .map(|entry| entry.desc.clone())
            .ok_or(ResourceError::NotFound {
                kind: ResourceKind::Texture,
                id: texture.index(),
            })
    }

    pub(crate) fn texture_array_views(
        &self,
        array: TextureArrayId,
    ) -> Result<TextureArrayViews<NativeImageView>, ResourceError> {
        check_handle(array.is_valid(), ResourceKind::TextureArray)?;
        let (members, capacity) = {
            let arrays = lock(&self.internal.texture_arrays, "texture arrays")?;
            let entry = arrays.get(&array).ok_or(ResourceError::NotFound {
                kind: ResourceKind::TextureArray,
                id: array.index(),
            })?;
            (entry.textures.clone(), entry.desc.capacity)
        };
        let views = members
            .into_iter()
            .map(|texture| self.texture_view(texture))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TextureArrayViews { views, capacity })
    }

    pub(crate) fn buffer_binding(
        &self,
        buffer: BufferId,
        kind: BufferKind,
        frame_index: u32,
    ) -> Result<BufferBinding<NativeBuffer>, ResourceError> {
        check_handle(buffer.is_valid(), kind.resource_kind())?;
        let buffers = lock(&self.internal.buffers, "buffers")?;
        let entry = buffers.get(&buffer).ok_or(ResourceError::NotFound {
            kind: kind.resource_kind(),
            id: buffer.index(),
        })?;
        if entry.desc.kind != kind {
            return Err(ResourceError::KindMismatch {
                id: buffer.index(),
                expected: kind.resource_kind(),
                found: entry.desc.kind.resource_kind(),
            });
        }
        let native = entry
            .frames
            .get((frame_index % MAX_FRAMES_IN_FLIGHT) as usize)
            .copied()
            .ok_or(ResourceError::OutOfBounds)?;
        Ok(BufferBinding {
            buffer: native,
            range: entry.desc.size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_desc(name: &str) -> ImageDesc {
        ImageDesc {
            debug_name: name.to_string(),
            width: 4,
            height: 2,
            format: ImageFormat::Rgba16Float,
            clear_color: LinearRgba::BLUE,
        }
    }

    #[test]
    fn images_start_with_their_clear_color() {
        let device = SoftwareDevice::new();
        let image = device.create_image(&image_desc("Color")).unwrap();
        let pixels = device.image_pixels(image).unwrap();
        assert_eq!(pixels.len(), 8);
        assert!(pixels.iter().all(|p| *p == LinearRgba::BLUE));
        assert_eq!(device.image_layout(image).unwrap(), ImageLayout::General);
        assert_eq!(device.image_bytes(image).unwrap().len(), 8 * 16);
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let device = SoftwareDevice::new();
        let desc = ImageDesc {
            width: 0,
            ..image_desc("Empty")
        };
        assert!(matches!(
            device.create_image(&desc),
            Err(ResourceError::BackendError(_))
        ));
    }

    #[test]
    fn debug_texture_exists_at_construction() {
        let device = SoftwareDevice::new();
        let debug = device.debug_texture();
        assert_eq!(device.texture_view(debug).unwrap(), device.debug_view());
        assert_eq!(device.texture_desc(debug).unwrap().debug_name, "Debug Texture");

        let texture = device
            .create_texture(&TextureDesc {
                debug_name: "Albedo".to_string(),
                width: 1,
                height: 1,
                format: ImageFormat::Rgba8Unorm,
            })
            .unwrap();
        assert_ne!(texture, debug);
        assert_ne!(device.texture_view(texture).unwrap(), device.debug_view());
    }

    #[test]
    fn texture_array_refuses_textures_beyond_capacity() {
        let device = SoftwareDevice::new();
        let array = device
            .create_texture_array(&TextureArrayDesc {
                debug_name: "Materials".to_string(),
                capacity: 2,
            })
            .unwrap();
        let desc = TextureDesc {
            debug_name: "T".to_string(),
            width: 1,
            height: 1,
            format: ImageFormat::Rgba8Unorm,
        };
        let t0 = device.create_texture(&desc).unwrap();
        let t1 = device.create_texture(&desc).unwrap();
        let t2 = device.create_texture(&desc).unwrap();

        assert_eq!(device.load_texture_into_array(array, t0).unwrap(), 0);
        assert_eq!(device.load_texture_into_array(array, t1).unwrap(), 1);
        assert!(matches!(
            device.load_texture_into_array(array, t2),
            Err(ResourceError::OutOfBounds)
        ));

        let views = device.texture_array_views(array).unwrap();
        assert_eq!(views.capacity, 2);
        assert_eq!(
            views.views,
            vec![
                device.texture_view(t0).unwrap(),
                device.texture_view(t1).unwrap()
            ]
        );
    }

    #[test]
    fn buffers_are_multi_buffered_and_typed() {
        let device = SoftwareDevice::new();
        let buffer = device
            .create_buffer(&BufferDesc {
                debug_name: "View Data".to_string(),
                size: 64,
                kind: BufferKind::Constant,
            })
            .unwrap();

        let frame0 = device.buffer_binding(buffer, BufferKind::Constant, 0).unwrap();
        let frame1 = device.buffer_binding(buffer, BufferKind::Constant, 1).unwrap();
        assert_ne!(frame0.buffer, frame1.buffer);
        assert_eq!(frame0.range, 64);

        assert!(matches!(
            device.buffer_binding(buffer, BufferKind::Storage, 0),
            Err(ResourceError::KindMismatch {
                expected: ResourceKind::StorageBuffer,
                found: ResourceKind::ConstantBuffer,
                ..
            })
        ));
        let wrapped = device
            .buffer_binding(buffer, BufferKind::Constant, MAX_FRAMES_IN_FLIGHT)
            .unwrap();
        assert_eq!(wrapped, frame0);
    }

    #[test]
    fn buffer_writes_are_per_frame() {
        let device = SoftwareDevice::new();
        let buffer = device
            .create_buffer(&BufferDesc {
                debug_name: "Model Data".to_string(),
                size: 8,
                kind: BufferKind::Storage,
            })
            .unwrap();
        device.write_buffer(buffer, 1, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(device.read_buffer(buffer, 0).unwrap(), vec![0; 8]);
        assert_eq!(
            device.read_buffer(buffer, 1).unwrap(),
            vec![0, 0, 0, 0, 1, 2, 3, 4]
        );
        assert!(matches!(
            device.write_buffer(buffer, 0, 6, &[1, 2, 3]),
            Err(ResourceError::OutOfBounds)
        ));
    }

    #[test]
    fn pipeline_requires_existing_targets() {
        let device = SoftwareDevice::new();
        let desc = GraphicsPipelineDesc {
            debug_name: "Forward".to_string(),
            render_targets: vec![ImageId(5)],
            ..Default::default()
        };
        assert!(matches!(
            device.create_graphics_pipeline(&desc),
            Err(ResourceError::NotFound {
                kind: ResourceKind::Image,
                id: 5
            })
        ));
    }

    #[test]
    fn depth_clear_respects_aspects() {
        let device = SoftwareDevice::new();
        let depth = device
            .create_depth_image(&DepthImageDesc {
                debug_name: "Depth".to_string(),
                width: 2,
                height: 2,
                format: strata_core::renderer::DepthImageFormat::D24UnormS8Uint,
                clear_depth: 1.0,
            })
            .unwrap();
        device
            .clear_depth_image(depth, DepthClearFlags::STENCIL, 0.0, 7)
            .unwrap();
        let (values, stencil) = device.depth_image_contents(depth).unwrap();
        assert!(values.iter().all(|d| *d == 1.0));
        assert!(stencil.iter().all(|s| *s == 7));
    }

    #[test]
    fn unknown_buffer_is_reported_without_a_binding_kind() {
        let device = SoftwareDevice::new();
        assert!(matches!(
            device.write_buffer(BufferId(42), 0, 0, &[1]),
            Err(ResourceError::NotFound {
                kind: ResourceKind::Buffer,
                id: 42
            })
        ));
        assert!(matches!(
            device.read_buffer(BufferId(42), 0),
            Err(ResourceError::NotFound {
                kind: ResourceKind::Buffer,
                id: 42
            })
        ));
    }

    #[test]
    fn updated_model_keeps_its_buffers() {
        let device = SoftwareDevice::new();
        let model = device
            .create_model(&ModelDesc {
                debug_name: "Cube".to_string(),
                vertex_count: 24,
                index_count: 36,
            })
            .unwrap();
        let vertex_buffer = device.model_vertex_buffer(model).unwrap();

        device
            .update_model(
                model,
                &ModelDesc {
                    debug_name: "Quad".to_string(),
                    vertex_count: 4,
                    index_count: 6,
                },
            )
            .unwrap();
        assert_eq!(device.model_index_count(model).unwrap(), 6);
        assert_eq!(device.model_vertex_buffer(model).unwrap(), vertex_buffer);

        let empty = ModelDesc {
            debug_name: "Empty".to_string(),
            vertex_count: 0,
            index_count: 0,
        };
        assert!(matches!(
            device.update_model(model, &empty),
            Err(ResourceError::BackendError(_))
        ));
        assert!(matches!(
            device.update_model(ModelId(99), &ModelDesc { index_count: 3, ..empty }),
            Err(ResourceError::NotFound {
                kind: ResourceKind::Model,
                id: 99
            })
        ));
        assert_eq!(device.model_index_count(model).unwrap(), 6);
    }

    #[test]
    fn invalid_handles_are_reported() {
        let device = SoftwareDevice::new();
        assert!(matches!(
            device.model_index_count(ModelId::INVALID),
            Err(ResourceError::InvalidHandle {
                kind: ResourceKind::Model
            })
        ));
    }
}
