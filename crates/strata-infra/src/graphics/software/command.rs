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

//! Native command buffers of the software backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use strata_core::fatal;
use strata_core::math::LinearRgba;
use strata_core::renderer::api::command::{ScissorRect, Viewport};
use strata_core::renderer::api::util::DepthClearFlags;
use strata_core::renderer::{
    CommandListId, DepthImageId, GraphicsPipelineId, ImageComponentType, ImageId,
};

use super::device::ImageLayout;
use super::native::{NativeBuffer, NativeDescriptorSet};

/// One operation recorded into a native command buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCommand {
    /// A single debug label.
    InsertLabel(String),
    /// Opens a debug label region.
    PushLabel {
        /// The label text.
        name: String,
        /// The label color.
        color: LinearRgba,
    },
    /// Closes the innermost debug label region.
    PopLabel,
    /// Begins a render pass on a pipeline's targets.
    BeginRenderPass {
        /// Color targets.
        color_targets: Vec<ImageId>,
        /// Depth target.
        depth_target: Option<DepthImageId>,
    },
    /// Begins a render pass on a swapchain image.
    BeginSwapchainPass {
        /// The acquired swapchain image.
        image_index: u32,
    },
    /// Ends the open render pass.
    EndRenderPass,
    /// Binds a graphics pipeline.
    BindPipeline(GraphicsPipelineId),
    /// Binds the blit pipeline for one component type.
    BindBlitPipeline(ImageComponentType),
    /// Binds a descriptor set at a set index of the bound pipeline's layout.
    BindDescriptorSet {
        /// The set index.
        set: u32,
        /// The native set.
        descriptor_set: NativeDescriptorSet,
    },
    /// Sets the scissor rectangle.
    SetScissor(ScissorRect),
    /// Sets the viewport.
    SetViewport(Viewport),
    /// Binds a buffer at a vertex input slot.
    BindVertexBuffer {
        /// The vertex input slot.
        slot: u32,
        /// The native buffer.
        buffer: NativeBuffer,
    },
    /// Binds a 32-bit index buffer.
    BindIndexBuffer(NativeBuffer),
    /// Fills a color image.
    ClearImage {
        /// The cleared image.
        image: ImageId,
        /// The fill color.
        color: LinearRgba,
    },
    /// Fills the selected aspects of a depth image.
    ClearDepthImage {
        /// The cleared image.
        image: DepthImageId,
        /// The cleared aspects.
        flags: DepthClearFlags,
        /// The depth fill value.
        depth: f32,
        /// The stencil fill value.
        stencil: u8,
    },
    /// Moves a color image to another layout.
    TransitionImage {
        /// The transitioned image.
        image: ImageId,
        /// The layout the image is expected to be in.
        from: ImageLayout,
        /// The new layout.
        to: ImageLayout,
    },
    /// A non-indexed draw.
    Draw {
        /// Vertices per instance.
        vertex_count: u32,
        /// Instances.
        instance_count: u32,
    },
    /// An indexed draw.
    DrawIndexed {
        /// Indices per instance.
        index_count: u32,
        /// Instances.
        instance_count: u32,
    },
}

#[derive(Debug, Default)]
struct CommandBuffer {
    commands: Vec<NativeCommand>,
    open_render_passes: u32,
}

/// Hands out native command buffers and collects what is recorded into them.
#[derive(Debug, Default)]
pub struct CommandBufferHandler {
    buffers: Mutex<HashMap<CommandListId, CommandBuffer>>,
    next_id: AtomicU32,
}

impl CommandBufferHandler {
    /// Creates a handler with no open command buffers.
    pub fn new() -> Self {
        Self::default()
    }

    fn buffers(&self) -> MutexGuard<'_, HashMap<CommandListId, CommandBuffer>> {
        self.buffers.lock().unwrap_or_else(|poisoned| {
            log::error!("CommandBufferHandler: Mutex poisoned (command buffers), recovering");
            poisoned.into_inner()
        })
    }

    /// Opens a new, empty command buffer.
    pub fn begin(&self) -> CommandListId {
        let id = CommandListId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.buffers().insert(id, CommandBuffer::default());
        log::trace!("CommandBufferHandler: Began command buffer {:?}", id);
        id
    }

    /// Appends `command` to the open command buffer `list`.
    ///
    /// Recording into a buffer that is not open is a contract violation.
    pub fn record(&self, list: CommandListId, command: NativeCommand) {
        let mut buffers = self.buffers();
        let Some(buffer) = buffers.get_mut(&list) else {
            fatal!("Recording into command buffer {:?}, which is not open", list);
        };
        match &command {
            NativeCommand::BeginRenderPass { .. } | NativeCommand::BeginSwapchainPass { .. } => {
                if buffer.open_render_passes != 0 {
                    fatal!("Beginning a render pass in {:?} while one is already open", list);
                }
                buffer.open_render_passes += 1;
            }
            NativeCommand::EndRenderPass => {
                if buffer.open_render_passes == 0 {
                    fatal!("Ending a render pass in {:?} with none open", list);
                }
                buffer.open_render_passes -= 1;
            }
            _ => {}
        }
        buffer.commands.push(command);
    }

    /// Closes `list` and returns its commands for submission.
    ///
    /// Closing a buffer with an open render pass is a contract violation.
    pub fn end(&self, list: CommandListId) -> Vec<NativeCommand> {
        let Some(buffer) = self.buffers().remove(&list) else {
            fatal!("Ending command buffer {:?}, which is not open", list);
        };
        if buffer.open_render_passes != 0 {
            fatal!(
                "Ending command buffer {:?} with {} open render pass(es)",
                list,
                buffer.open_render_passes
            );
        }
        buffer.commands
    }

    /// Drops `list` and everything recorded into it.
    pub fn discard(&self, list: CommandListId) {
        if self.buffers().remove(&list).is_some() {
            log::debug!("CommandBufferHandler: Discarded command buffer {:?}", list);
        }
    }

    /// The number of command buffers currently open.
    pub fn open_count(&self) -> usize {
        self.buffers().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let handler = CommandBufferHandler::new();
        let list = handler.begin();
        handler.record(list, NativeCommand::InsertLabel("Frame 0".to_string()));
        handler.record(
            list,
            NativeCommand::Draw {
                vertex_count: 3,
                instance_count: 1,
            },
        );
        let commands = handler.end(list);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], NativeCommand::InsertLabel("Frame 0".to_string()));
        assert_eq!(handler.open_count(), 0);
    }

    #[test]
    fn buffers_are_independent() {
        let handler = CommandBufferHandler::new();
        let a = handler.begin();
        let b = handler.begin();
        assert_ne!(a, b);
        handler.record(a, NativeCommand::PopLabel);
        assert!(handler.end(b).is_empty());
        assert_eq!(handler.end(a), vec![NativeCommand::PopLabel]);
    }

    #[test]
    fn discard_drops_the_buffer() {
        let handler = CommandBufferHandler::new();
        let list = handler.begin();
        handler.record(list, NativeCommand::BeginSwapchainPass { image_index: 0 });
        handler.discard(list);
        assert_eq!(handler.open_count(), 0);
    }

    #[test]
    #[should_panic(expected = "open render pass")]
    fn ending_with_open_pass_is_fatal() {
        let handler = CommandBufferHandler::new();
        let list = handler.begin();
        handler.record(
            list,
            NativeCommand::BeginRenderPass {
                color_targets: vec![ImageId(0)],
                depth_target: None,
            },
        );
        handler.end(list);
    }

    #[test]
    #[should_panic(expected = "already open")]
    fn nested_passes_are_fatal() {
        let handler = CommandBufferHandler::new();
        let list = handler.begin();
        handler.record(list, NativeCommand::BeginSwapchainPass { image_index: 0 });
        handler.record(list, NativeCommand::BeginSwapchainPass { image_index: 1 });
    }

    #[test]
    #[should_panic(expected = "not open")]
    fn recording_into_closed_buffer_is_fatal() {
        let handler = CommandBufferHandler::new();
        let list = handler.begin();
        handler.end(list);
        handler.record(list, NativeCommand::PopLabel);
    }
}
