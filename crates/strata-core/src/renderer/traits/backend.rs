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

//! Defines the `RenderBackend` trait, the contract the command executor replays against.

use std::fmt::Debug;
use std::sync::Arc;

use crate::math::LinearRgba;
use crate::renderer::api::command::{ScissorRect, Viewport};
use crate::renderer::api::descriptor::DescriptorSetSlot;
use crate::renderer::api::pipeline::PipelineReflection;
use crate::renderer::api::resource::{
    BufferId, BufferKind, CommandListId, DepthImageId, GraphicsPipelineId, ImageId, ModelId,
    SamplerId, TextureArrayId, TextureId,
};
use crate::renderer::api::util::DepthClearFlags;
use crate::renderer::binding::{
    BufferBinding, DescriptorLifetime, DescriptorWrite, TextureArrayViews,
};
use crate::renderer::error::ResourceError;

/// A descriptor write expressed in a backend's native types.
pub type BackendWrite<B> = DescriptorWrite<
    <B as RenderBackend>::Sampler,
    <B as RenderBackend>::ImageView,
    <B as RenderBackend>::Buffer,
>;

/// A graphics backend able to execute recorded command lists.
///
/// The `cmd_*` methods are pure translators: each one appends the native
/// equivalent of one recorded operation to the command buffer identified by
/// `list`. State tracking (open render passes, the index-buffer cache, the
/// bound pipeline) belongs to the executor, not to the backend.
///
/// The resolution methods are capability checked: asking for a resource as a
/// kind it is not returns [`ResourceError::KindMismatch`].
pub trait RenderBackend: Send + Sync + Debug {
    /// The native sampler object.
    type Sampler: Clone + Debug + PartialEq;
    /// The native shader-read-only image view.
    type ImageView: Clone + Debug + PartialEq;
    /// The native buffer object.
    type Buffer: Clone + Debug + PartialEq;
    /// The native descriptor set object.
    type DescriptorSet: Clone + Debug;

    // --- Command buffer lifecycle ---

    /// Acquires a native command buffer for the replay of one command list.
    fn begin_command_list(&self) -> CommandListId;

    /// Finalizes and submits the command buffer acquired by `begin_command_list`.
    fn end_command_list(&self, list: CommandListId);

    // --- Native translation, one entry point per command kind ---

    /// Labels the start of frame `frame_index` and advances the per-frame
    /// descriptor pools to it.
    fn cmd_mark_frame_start(&self, list: CommandListId, frame_index: u32);

    /// Opens a debug-marker region.
    fn cmd_push_marker(&self, list: CommandListId, name: &str, color: LinearRgba);

    /// Closes the innermost debug-marker region.
    fn cmd_pop_marker(&self, list: CommandListId);

    /// Begins `pipeline`'s render pass and binds the pipeline.
    fn cmd_begin_render_pass(&self, list: CommandListId, pipeline: GraphicsPipelineId);

    /// Ends the render pass begun for `pipeline`.
    fn cmd_end_render_pass(&self, list: CommandListId, pipeline: GraphicsPipelineId);

    /// Binds a finalized descriptor set at `slot` of `pipeline`'s layout.
    fn cmd_bind_descriptor_set(
        &self,
        list: CommandListId,
        pipeline: GraphicsPipelineId,
        slot: DescriptorSetSlot,
        set: Self::DescriptorSet,
    );

    /// Sets the scissor rectangle.
    fn cmd_set_scissor(&self, list: CommandListId, rect: ScissorRect);

    /// Sets the viewport.
    fn cmd_set_viewport(&self, list: CommandListId, viewport: Viewport);

    /// Binds `model`'s vertex buffer at vertex input `slot`.
    fn cmd_bind_vertex_buffer(&self, list: CommandListId, slot: u32, model: ModelId);

    /// Binds `model`'s index buffer.
    fn cmd_bind_index_buffer(&self, list: CommandListId, model: ModelId);

    /// Binds a raw buffer at vertex input `slot`.
    fn cmd_bind_raw_vertex_buffer(&self, list: CommandListId, slot: u32, buffer: BufferId);

    /// Clears a color image.
    fn cmd_clear_image(&self, list: CommandListId, image: ImageId, color: LinearRgba);

    /// Clears the aspects of a depth image selected by `flags`.
    fn cmd_clear_depth_image(
        &self,
        list: CommandListId,
        image: DepthImageId,
        flags: DepthClearFlags,
        depth: f32,
        stencil: u8,
    );

    /// Issues a non-indexed draw.
    fn cmd_draw(&self, list: CommandListId, vertex_count: u32, instance_count: u32);

    /// Issues an indexed draw using the bound index buffer.
    fn cmd_draw_indexed(&self, list: CommandListId, index_count: u32, instance_count: u32);

    // --- Resource resolution ---

    /// The reflection table of a pipeline.
    /// ## Errors
    /// * `ResourceError::NotFound` - If no pipeline is registered under `pipeline`.
    fn pipeline_reflection(
        &self,
        pipeline: GraphicsPipelineId,
    ) -> Result<Arc<PipelineReflection>, ResourceError>;

    /// The number of indices in a model's index buffer.
    fn model_index_count(&self, model: ModelId) -> Result<u32, ResourceError>;

    /// The native sampler behind `sampler`.
    fn resolve_sampler(&self, sampler: SamplerId) -> Result<Self::Sampler, ResourceError>;

    /// A shader-read-only view of `texture`.
    fn resolve_texture_view(&self, texture: TextureId) -> Result<Self::ImageView, ResourceError>;

    /// Views of the textures in `array`, in insertion order, and its capacity.
    fn resolve_texture_array(
        &self,
        array: TextureArrayId,
    ) -> Result<TextureArrayViews<Self::ImageView>, ResourceError>;

    /// A view of the standing debug texture, used to pad texture arrays.
    fn debug_texture_view(&self) -> Self::ImageView;

    /// The native buffer behind `buffer` for `frame_index`, and its size.
    /// ## Arguments
    /// * `kind` - How the caller intends to bind the buffer.
    /// ## Errors
    /// * `ResourceError::KindMismatch` - If the buffer was created with another kind.
    fn resolve_buffer(
        &self,
        buffer: BufferId,
        kind: BufferKind,
        frame_index: u32,
    ) -> Result<BufferBinding<Self::Buffer>, ResourceError>;

    /// Allocates a native descriptor set for set index `set` of `pipeline`'s
    /// layout and writes `writes` into it.
    /// ## Errors
    /// * `ResourceError::PoolExhausted` - If the pool serving `lifetime` is full.
    fn allocate_descriptor_set(
        &self,
        pipeline: GraphicsPipelineId,
        set: u32,
        writes: &[DescriptorWrite<Self::Sampler, Self::ImageView, Self::Buffer>],
        lifetime: DescriptorLifetime,
    ) -> Result<Self::DescriptorSet, ResourceError>;
}
