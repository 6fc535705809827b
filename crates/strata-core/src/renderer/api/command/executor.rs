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

//! Replays a recorded [`CommandList`] against a [`RenderBackend`].
//!
//! Replay is a single in-order pass through one exhaustive `match`. The
//! executor keeps its own render-pass counter, independent of the one used
//! while recording, and a per-execution index-buffer cache that elides
//! redundant native binds.

use super::list::CommandList;
use super::recorded::Command;
use crate::fatal;
use crate::renderer::api::descriptor::{Descriptor, DescriptorSetSlot};
use crate::renderer::api::resource::{CommandListId, GraphicsPipelineId, ModelId};
use crate::renderer::binding::{DescriptorLifetime, DescriptorSetBuilder};
use crate::renderer::error::BindingError;
use crate::renderer::traits::RenderBackend;

/// Counters collected while executing one command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionStats {
    /// Commands replayed.
    pub commands: u32,
    /// Draw calls issued (indexed and non-indexed).
    pub draw_calls: u32,
    /// Native index-buffer binds issued.
    pub index_buffer_binds: u32,
    /// Index-buffer binds skipped because the buffer was already bound.
    pub index_buffer_binds_elided: u32,
    /// Descriptor sets resolved and bound.
    pub descriptor_sets_bound: u32,
    /// Descriptor sets skipped because they failed to resolve.
    pub descriptor_sets_failed: u32,
}

/// State tracked across the replay of one list. Never shared between lists.
#[derive(Debug)]
struct ReplayState {
    open_passes: u32,
    bound_pipeline: GraphicsPipelineId,
    bound_index_buffer: ModelId,
}

impl Default for ReplayState {
    fn default() -> Self {
        Self {
            open_passes: 0,
            bound_pipeline: GraphicsPipelineId::INVALID,
            bound_index_buffer: ModelId::INVALID,
        }
    }
}

struct Replay<'a, B: RenderBackend> {
    backend: &'a B,
    list: CommandListId,
    source: &'a CommandList,
    state: ReplayState,
    stats: ExecutionStats,
}

impl CommandList {
    /// Replays every recorded command, in order, into one native command
    /// buffer and submits it.
    ///
    /// Open marker scopes or an unclosed pipeline at either end of the replay
    /// are fatal. Descriptor sets that fail to resolve are logged and skipped
    /// without affecting the rest of the list.
    pub fn execute<B: RenderBackend>(&self, backend: &B) -> ExecutionStats {
        if self.marker_depth() != 0 {
            fatal!(
                "Execute: {} marker(s) still open, every PushMarker needs a PopMarker",
                self.marker_depth()
            );
        }

        let list = backend.begin_command_list();
        let mut replay = Replay {
            backend,
            list,
            source: self,
            state: ReplayState::default(),
            stats: ExecutionStats::default(),
        };
        for command in self.commands() {
            replay.apply(command);
        }

        if replay.state.open_passes != 0 {
            fatal!(
                "Execute: {} render pass(es) still open at the end of the list",
                replay.state.open_passes
            );
        }
        backend.end_command_list(list);

        let stats = replay.stats;
        log::debug!(
            "Executed command list {:?}: {} commands, {} draws, {} index binds ({} elided), {} descriptor sets ({} failed)",
            list,
            stats.commands,
            stats.draw_calls,
            stats.index_buffer_binds,
            stats.index_buffer_binds_elided,
            stats.descriptor_sets_bound,
            stats.descriptor_sets_failed
        );
        stats
    }
}

impl<B: RenderBackend> Replay<'_, B> {
    fn apply(&mut self, command: &Command) {
        log::trace!("Replaying {}", command.name());
        self.stats.commands += 1;
        let (backend, list) = (self.backend, self.list);

        match *command {
            Command::MarkFrameStart { frame_index } => {
                backend.cmd_mark_frame_start(list, frame_index);
            }
            Command::PushMarker { name, color } => {
                backend.cmd_push_marker(list, name.as_str(), color);
            }
            Command::PopMarker => backend.cmd_pop_marker(list),
            Command::BeginPipeline { pipeline } => {
                if self.state.open_passes > 0 {
                    fatal!(
                        "BeginPipeline({:?}) replayed while pipeline {:?} is open",
                        pipeline,
                        self.state.bound_pipeline
                    );
                }
                self.state.open_passes += 1;
                backend.cmd_begin_render_pass(list, pipeline);
                self.state.bound_pipeline = pipeline;
                self.state.bound_index_buffer = ModelId::INVALID;
            }
            Command::EndPipeline { pipeline } => {
                if self.state.open_passes == 0 {
                    fatal!("EndPipeline({:?}) replayed with no open render pass", pipeline);
                }
                backend.cmd_end_render_pass(list, pipeline);
                self.state.open_passes -= 1;
            }
            Command::BindDescriptorSet {
                slot,
                descriptors,
                frame_index,
            } => {
                let descriptors = self.source.descriptors.get(descriptors);
                self.bind_descriptor_set(slot, descriptors, frame_index);
            }
            Command::SetScissorRect(rect) => backend.cmd_set_scissor(list, rect),
            Command::SetViewport(viewport) => backend.cmd_set_viewport(list, viewport),
            Command::SetVertexBuffer { slot, model } => {
                backend.cmd_bind_vertex_buffer(list, slot, model);
            }
            Command::SetIndexBuffer { model } => {
                backend.cmd_bind_index_buffer(list, model);
                self.state.bound_index_buffer = model;
                self.stats.index_buffer_binds += 1;
            }
            Command::SetBuffer { slot, buffer } => {
                backend.cmd_bind_raw_vertex_buffer(list, slot, buffer);
            }
            Command::ClearImage { image, color } => backend.cmd_clear_image(list, image, color),
            Command::ClearDepthImage {
                image,
                flags,
                depth,
                stencil,
            } => backend.cmd_clear_depth_image(list, image, flags, depth, stencil),
            Command::Draw { model } => {
                backend.cmd_bind_vertex_buffer(list, 0, model);
                self.bind_index_buffer_cached(model);
                let index_count = match backend.model_index_count(model) {
                    Ok(count) => count,
                    Err(err) => fatal!("Draw({:?}): {}", model, err),
                };
                backend.cmd_draw_indexed(list, index_count, 1);
                self.stats.draw_calls += 1;
            }
            Command::DrawBindless {
                vertex_count,
                instance_count,
            } => {
                backend.cmd_draw(list, vertex_count, instance_count);
                self.stats.draw_calls += 1;
            }
            Command::DrawIndexedBindless {
                model,
                index_count,
                instance_count,
            } => {
                self.bind_index_buffer_cached(model);
                backend.cmd_draw_indexed(list, index_count, instance_count);
                self.stats.draw_calls += 1;
            }
        }
    }

    fn bind_index_buffer_cached(&mut self, model: ModelId) {
        if self.state.bound_index_buffer == model {
            self.stats.index_buffer_binds_elided += 1;
            return;
        }
        self.backend.cmd_bind_index_buffer(self.list, model);
        self.state.bound_index_buffer = model;
        self.stats.index_buffer_binds += 1;
    }

    fn bind_descriptor_set(
        &mut self,
        slot: DescriptorSetSlot,
        descriptors: &[Descriptor],
        frame_index: u32,
    ) {
        if slot == DescriptorSetSlot::Global {
            fatal!("BindDescriptorSet: the global slot cannot be bound per pipeline");
        }
        let pipeline = self.state.bound_pipeline;
        if !pipeline.is_valid() {
            fatal!("BindDescriptorSet({:?}) replayed before any BeginPipeline", slot);
        }

        match self.build_descriptor_set(pipeline, slot, descriptors, frame_index) {
            Ok(set) => {
                self.backend
                    .cmd_bind_descriptor_set(self.list, pipeline, slot, set);
                self.stats.descriptor_sets_bound += 1;
            }
            Err(err) => {
                log::error!(
                    "Skipping descriptor set for slot {:?} of pipeline {:?}: {}",
                    slot,
                    pipeline,
                    err
                );
                self.stats.descriptor_sets_failed += 1;
            }
        }
    }

    fn build_descriptor_set(
        &self,
        pipeline: GraphicsPipelineId,
        slot: DescriptorSetSlot,
        descriptors: &[Descriptor],
        frame_index: u32,
    ) -> Result<B::DescriptorSet, BindingError> {
        let reflection = self.backend.pipeline_reflection(pipeline)?;
        let mut builder = DescriptorSetBuilder::<B>::new(pipeline, reflection);
        for descriptor in descriptors {
            builder.bind(descriptor, frame_index, self.backend)?;
        }
        builder.build(slot, DescriptorLifetime::PerFrame, self.backend)
    }
}
