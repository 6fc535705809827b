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

//! The recording surface of a deferred command list.
//!
//! Every method validates its arguments, copies them into the list's frame
//! arenas and appends one [`Command`]. Nothing touches the backend until
//! [`CommandList::execute`] replays the list.
//!
//! Contract violations are fatal and caught here, at record time, before any
//! GPU work exists: unbalanced markers, overlapping or unmatched pipeline
//! scopes, invalid handles, zero-sized draws and exhausted arenas.

use super::recorded::{Command, MarkerName, ScissorRect, Viewport};
use crate::fatal;
use crate::math::LinearRgba;
use crate::memory::FrameArena;
use crate::renderer::api::core::RendererConfig;
use crate::renderer::api::descriptor::{Descriptor, DescriptorSet, DescriptorSetSlot};
use crate::renderer::api::resource::{BufferId, DepthImageId, GraphicsPipelineId, ImageId, ModelId};
use crate::renderer::api::util::DepthClearFlags;

/// An append-only, replayable sequence of rendering commands.
///
/// A list is recorded by a single writer, replayed with
/// [`execute`](CommandList::execute) and recycled with
/// [`reset`](CommandList::reset) at the frame boundary.
pub struct CommandList {
    pub(super) commands: FrameArena<Command>,
    pub(super) descriptors: FrameArena<Descriptor>,
    marker_depth: u32,
    open_pipeline: Option<GraphicsPipelineId>,
}

impl CommandList {
    /// Creates a list able to hold `command_capacity` commands and
    /// `descriptor_capacity` copied descriptors per frame.
    pub fn new(command_capacity: usize, descriptor_capacity: usize) -> Self {
        Self {
            commands: FrameArena::with_capacity("commands", command_capacity),
            descriptors: FrameArena::with_capacity("descriptors", descriptor_capacity),
            marker_depth: 0,
            open_pipeline: None,
        }
    }

    /// Creates a list sized from the renderer configuration.
    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.command_capacity, config.descriptor_capacity)
    }

    /// Signals the start of a frame and hands per-frame resources to `frame_index`.
    pub fn mark_frame_start(&mut self, frame_index: u32) {
        self.commands.push(Command::MarkFrameStart { frame_index });
    }

    /// Opens a debug-marker scope.
    ///
    /// `name` must be shorter than 16 bytes; longer names are fatal and are
    /// rejected before anything is copied.
    pub fn push_marker(&mut self, name: &str, color: LinearRgba) {
        let Some(marker) = MarkerName::new(name) else {
            fatal!(
                "PushMarker: marker name '{}' is {} bytes, the limit is {}",
                name,
                name.len(),
                MarkerName::MAX_LEN
            );
        };
        self.commands.push(Command::PushMarker {
            name: marker,
            color,
        });
        self.marker_depth += 1;
    }

    /// Closes the innermost debug-marker scope.
    pub fn pop_marker(&mut self) {
        if self.marker_depth == 0 {
            fatal!("PopMarker: no marker is open");
        }
        self.commands.push(Command::PopMarker);
        self.marker_depth -= 1;
    }

    /// Begins `pipeline`'s render pass. Only one pipeline may be open at a time.
    pub fn begin_pipeline(&mut self, pipeline: GraphicsPipelineId) {
        if !pipeline.is_valid() {
            fatal!("BeginPipeline: invalid pipeline handle");
        }
        if let Some(open) = self.open_pipeline {
            fatal!(
                "BeginPipeline({:?}): pipeline {:?} is still open",
                pipeline,
                open
            );
        }
        self.commands.push(Command::BeginPipeline { pipeline });
        self.open_pipeline = Some(pipeline);
    }

    /// Ends `pipeline`'s render pass, which must be the open one.
    pub fn end_pipeline(&mut self, pipeline: GraphicsPipelineId) {
        match self.open_pipeline {
            Some(open) if open == pipeline => {}
            Some(open) => fatal!(
                "EndPipeline({:?}): the open pipeline is {:?}",
                pipeline,
                open
            ),
            None => fatal!("EndPipeline({:?}): no pipeline is open", pipeline),
        }
        self.commands.push(Command::EndPipeline { pipeline });
        self.open_pipeline = None;
    }

    /// Records a descriptor-set bind for the pipeline bound at replay time.
    ///
    /// That is the pipeline of the most recent `BeginPipeline`, even once its
    /// pass has ended. Replaying a bind before any `BeginPipeline` is fatal.
    /// The descriptors are copied now; `set` may be changed or dropped right
    /// after this call. The global slot is not bindable through this path.
    pub fn bind_descriptor_set(
        &mut self,
        slot: DescriptorSetSlot,
        set: &DescriptorSet,
        frame_index: u32,
    ) {
        if slot == DescriptorSetSlot::Global {
            fatal!("BindDescriptorSet: the global slot cannot be bound per pipeline");
        }
        if set.slot() != slot {
            log::warn!(
                "BindDescriptorSet: set declared for {:?} is bound to {:?}",
                set.slot(),
                slot
            );
        }
        let descriptors = self.descriptors.alloc_slice(set.descriptors());
        self.commands.push(Command::BindDescriptorSet {
            slot,
            descriptors,
            frame_index,
        });
    }

    /// Sets the scissor rectangle.
    pub fn set_scissor_rect(&mut self, left: u32, right: u32, top: u32, bottom: u32) {
        if right < left || bottom < top {
            fatal!(
                "SetScissorRect: inverted rectangle (left {}, right {}, top {}, bottom {})",
                left,
                right,
                top,
                bottom
            );
        }
        self.commands.push(Command::SetScissorRect(ScissorRect {
            left,
            right,
            top,
            bottom,
        }));
    }

    /// Sets the viewport.
    pub fn set_viewport(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        min_depth: f32,
        max_depth: f32,
    ) {
        self.commands.push(Command::SetViewport(Viewport {
            x,
            y,
            width,
            height,
            min_depth,
            max_depth,
        }));
    }

    /// Binds `model`'s vertex buffer to vertex input `slot`.
    pub fn set_vertex_buffer(&mut self, slot: u32, model: ModelId) {
        Self::require_model("SetVertexBuffer", model);
        self.commands.push(Command::SetVertexBuffer { slot, model });
    }

    /// Binds `model`'s index buffer.
    pub fn set_index_buffer(&mut self, model: ModelId) {
        Self::require_model("SetIndexBuffer", model);
        self.commands.push(Command::SetIndexBuffer { model });
    }

    /// Binds a raw buffer as vertex input `slot`.
    pub fn set_buffer(&mut self, slot: u32, buffer: BufferId) {
        if !buffer.is_valid() {
            fatal!("SetBuffer: invalid buffer handle");
        }
        self.commands.push(Command::SetBuffer { slot, buffer });
    }

    /// Clears a color image.
    pub fn clear_image(&mut self, image: ImageId, color: LinearRgba) {
        if !image.is_valid() {
            fatal!("Clear: invalid image handle");
        }
        self.commands.push(Command::ClearImage { image, color });
    }

    /// Clears the aspects of a depth image selected by `flags`.
    pub fn clear_depth_image(
        &mut self,
        image: DepthImageId,
        depth: f32,
        flags: DepthClearFlags,
        stencil: u8,
    ) {
        if !image.is_valid() {
            fatal!("Clear: invalid depth image handle");
        }
        if flags.is_empty() {
            log::warn!("Clear: depth image {:?} cleared with no aspect selected", image);
        }
        self.commands.push(Command::ClearDepthImage {
            image,
            flags,
            depth,
            stencil,
        });
    }

    /// Draws all indices of `model`, one instance.
    pub fn draw(&mut self, model: ModelId) {
        Self::require_model("Draw", model);
        self.commands.push(Command::Draw { model });
    }

    /// Draws `vertex_count` vertices of the bound vertex input, non-indexed.
    pub fn draw_bindless(&mut self, vertex_count: u32, instance_count: u32) {
        Self::require_counts("DrawBindless", vertex_count, instance_count);
        self.commands.push(Command::DrawBindless {
            vertex_count,
            instance_count,
        });
    }

    /// Draws `index_count` indices from `model`'s index buffer.
    pub fn draw_indexed_bindless(&mut self, model: ModelId, index_count: u32, instance_count: u32) {
        Self::require_model("DrawIndexedBindless", model);
        Self::require_counts("DrawIndexedBindless", index_count, instance_count);
        self.commands.push(Command::DrawIndexedBindless {
            model,
            index_count,
            instance_count,
        });
    }

    /// Discards every recorded command and starts a new arena generation.
    pub fn reset(&mut self) {
        if self.marker_depth != 0 || self.open_pipeline.is_some() {
            log::warn!(
                "Resetting a command list with {} open marker(s) and open pipeline {:?}",
                self.marker_depth,
                self.open_pipeline
            );
        }
        self.commands.reset();
        self.descriptors.reset();
        self.marker_depth = 0;
        self.open_pipeline = None;
    }

    /// The recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        self.commands.as_slice()
    }

    /// The descriptors copied by a recorded [`Command::BindDescriptorSet`].
    pub fn descriptors(&self, command: &Command) -> &[Descriptor] {
        match command {
            Command::BindDescriptorSet { descriptors, .. } => self.descriptors.get(*descriptors),
            _ => &[],
        }
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// `true` if nothing was recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of currently open marker scopes.
    pub fn marker_depth(&self) -> u32 {
        self.marker_depth
    }

    /// The pipeline whose scope is currently open, if any.
    pub fn open_pipeline(&self) -> Option<GraphicsPipelineId> {
        self.open_pipeline
    }

    fn require_model(operation: &str, model: ModelId) {
        if !model.is_valid() {
            fatal!("{}: invalid model handle", operation);
        }
    }

    fn require_counts(operation: &str, count: u32, instance_count: u32) {
        if count == 0 || instance_count == 0 {
            fatal!(
                "{}: vertex/index count ({}) and instance count ({}) must be non-zero",
                operation,
                count,
                instance_count
            );
        }
    }
}

impl std::fmt::Debug for CommandList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandList")
            .field("commands", &self.commands)
            .field("descriptors", &self.descriptors)
            .field("marker_depth", &self.marker_depth)
            .field("open_pipeline", &self.open_pipeline)
            .finish()
    }
}
