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

//! The closed set of commands a [`CommandList`](super::CommandList) records.
//!
//! Every variant is plain `Copy` data. Variable-length payloads (descriptor
//! arrays) are deep-copied into the list's frame arena and referenced by an
//! [`ArenaSlice`]; marker names are stored inline.

use crate::math::LinearRgba;
use crate::memory::ArenaSlice;
use crate::renderer::api::descriptor::{Descriptor, DescriptorSetSlot};
use crate::renderer::api::resource::{BufferId, DepthImageId, GraphicsPipelineId, ImageId, ModelId};
use crate::renderer::api::util::DepthClearFlags;
use crate::utils::InlineName;

/// A debug-marker name: at most 15 bytes, stored inline.
pub type MarkerName = InlineName<16>;

/// A scissor rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    /// Left edge, inclusive.
    pub left: u32,
    /// Right edge, exclusive.
    pub right: u32,
    /// Top edge, inclusive.
    pub top: u32,
    /// Bottom edge, exclusive.
    pub bottom: u32,
}

impl ScissorRect {
    /// Width of the rectangle.
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the rectangle.
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// A viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth mapped to the near plane.
    pub min_depth: f32,
    /// Depth mapped to the far plane.
    pub max_depth: f32,
}

/// One recorded operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start of a frame: advances the backend's per-frame pools.
    MarkFrameStart {
        /// The frame-in-flight index that now owns per-frame resources.
        frame_index: u32,
    },
    /// Opens a debug-marker scope.
    PushMarker {
        /// The marker label.
        name: MarkerName,
        /// The marker color.
        color: LinearRgba,
    },
    /// Closes the innermost debug-marker scope.
    PopMarker,
    /// Begins the render pass of a pipeline and binds the pipeline.
    BeginPipeline {
        /// The pipeline to begin.
        pipeline: GraphicsPipelineId,
    },
    /// Ends the render pass of a pipeline.
    EndPipeline {
        /// The pipeline to end.
        pipeline: GraphicsPipelineId,
    },
    /// Resolves and binds a descriptor set for the bound pipeline.
    BindDescriptorSet {
        /// The target slot.
        slot: DescriptorSetSlot,
        /// The descriptors, copied into the list's arena.
        descriptors: ArenaSlice<Descriptor>,
        /// Frame index used to pick per-frame buffers.
        frame_index: u32,
    },
    /// Sets the scissor rectangle.
    SetScissorRect(ScissorRect),
    /// Sets the viewport.
    SetViewport(Viewport),
    /// Binds a model's vertex buffer to a vertex input slot.
    SetVertexBuffer {
        /// The vertex input slot.
        slot: u32,
        /// The model whose vertex buffer is bound.
        model: ModelId,
    },
    /// Binds a model's index buffer.
    SetIndexBuffer {
        /// The model whose index buffer is bound.
        model: ModelId,
    },
    /// Binds a raw buffer as vertex input.
    SetBuffer {
        /// The vertex input slot.
        slot: u32,
        /// The buffer to bind.
        buffer: BufferId,
    },
    /// Clears a color image.
    ClearImage {
        /// The image to clear.
        image: ImageId,
        /// The clear color.
        color: LinearRgba,
    },
    /// Clears a depth image.
    ClearDepthImage {
        /// The image to clear.
        image: DepthImageId,
        /// Which aspects to clear.
        flags: DepthClearFlags,
        /// The depth clear value.
        depth: f32,
        /// The stencil clear value.
        stencil: u8,
    },
    /// Draws a whole model, indexed, one instance.
    Draw {
        /// The model to draw.
        model: ModelId,
    },
    /// Non-indexed draw of whatever vertex input is bound.
    DrawBindless {
        /// Number of vertices.
        vertex_count: u32,
        /// Number of instances.
        instance_count: u32,
    },
    /// Indexed draw using a model's index buffer.
    DrawIndexedBindless {
        /// The model whose index buffer is used.
        model: ModelId,
        /// Number of indices.
        index_count: u32,
        /// Number of instances.
        instance_count: u32,
    },
}

impl Command {
    /// A short, stable name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Command::MarkFrameStart { .. } => "MarkFrameStart",
            Command::PushMarker { .. } => "PushMarker",
            Command::PopMarker => "PopMarker",
            Command::BeginPipeline { .. } => "BeginPipeline",
            Command::EndPipeline { .. } => "EndPipeline",
            Command::BindDescriptorSet { .. } => "BindDescriptorSet",
            Command::SetScissorRect(_) => "SetScissorRect",
            Command::SetViewport(_) => "SetViewport",
            Command::SetVertexBuffer { .. } => "SetVertexBuffer",
            Command::SetIndexBuffer { .. } => "SetIndexBuffer",
            Command::SetBuffer { .. } => "SetBuffer",
            Command::ClearImage { .. } => "ClearImage",
            Command::ClearDepthImage { .. } => "ClearDepthImage",
            Command::Draw { .. } => "Draw",
            Command::DrawBindless { .. } => "DrawBindless",
            Command::DrawIndexedBindless { .. } => "DrawIndexedBindless",
        }
    }
}
