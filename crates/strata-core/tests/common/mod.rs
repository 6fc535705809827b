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

//! A recording mock backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use strata_core::math::LinearRgba;
use strata_core::renderer::api::command::{ScissorRect, Viewport};
use strata_core::renderer::api::pipeline::{
    ShaderBindingType, ShaderReflection, ShaderResourceBinding,
};
use strata_core::renderer::api::util::{DepthClearFlags, ShaderStage};
use strata_core::renderer::binding::{
    BufferBinding, DescriptorLifetime, DescriptorWrite, TextureArrayViews,
};
use strata_core::renderer::*;

/// The view returned for the standing debug texture.
pub const DEBUG_VIEW: u32 = 999;

/// A native call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin(CommandListId),
    End(CommandListId),
    FrameStart(u32),
    PushMarker(String),
    PopMarker,
    BeginPass(GraphicsPipelineId),
    EndPass(GraphicsPipelineId),
    BindSet {
        pipeline: GraphicsPipelineId,
        slot: DescriptorSetSlot,
        set: u32,
    },
    Scissor(ScissorRect),
    Viewport(Viewport),
    VertexBuffer {
        slot: u32,
        model: ModelId,
    },
    IndexBuffer(ModelId),
    RawVertexBuffer {
        slot: u32,
        buffer: BufferId,
    },
    ClearImage(ImageId, LinearRgba),
    ClearDepth(DepthImageId, DepthClearFlags, f32, u8),
    Draw {
        vertices: u32,
        instances: u32,
    },
    DrawIndexed {
        indices: u32,
        instances: u32,
    },
}

/// Buffers resolve to `(buffer id, frame index)`.
pub type MockBuffer = (u32, u32);

/// A descriptor set allocation observed by the mock.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub pipeline: GraphicsPipelineId,
    pub set: u32,
    pub writes: Vec<DescriptorWrite<u32, u32, MockBuffer>>,
    pub lifetime: DescriptorLifetime,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<Call>>,
    pub allocations: Mutex<Vec<Allocation>>,
    pipelines: HashMap<GraphicsPipelineId, Arc<PipelineReflection>>,
    models: HashMap<ModelId, u32>,
    samplers: Vec<SamplerId>,
    textures: Vec<TextureId>,
    texture_arrays: HashMap<TextureArrayId, (Vec<TextureId>, u32)>,
    buffers: HashMap<BufferId, (BufferKind, u64)>,
    next_list: Mutex<u32>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(mut self, id: GraphicsPipelineId, stages: &[ShaderReflection]) -> Self {
        self.pipelines
            .insert(id, Arc::new(PipelineReflection::from_stages(stages)));
        self
    }

    pub fn with_model(mut self, id: ModelId, index_count: u32) -> Self {
        self.models.insert(id, index_count);
        self
    }

    pub fn with_sampler(mut self, id: SamplerId) -> Self {
        self.samplers.push(id);
        self
    }

    pub fn with_texture(mut self, id: TextureId) -> Self {
        self.textures.push(id);
        self
    }

    pub fn with_texture_array(
        mut self,
        id: TextureArrayId,
        textures: &[TextureId],
        capacity: u32,
    ) -> Self {
        self.texture_arrays
            .insert(id, (textures.to_vec(), capacity));
        self
    }

    pub fn with_buffer(mut self, id: BufferId, kind: BufferKind, size: u64) -> Self {
        self.buffers.insert(id, (kind, size));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn allocations(&self) -> Vec<Allocation> {
        self.allocations.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl RenderBackend for MockBackend {
    type Sampler = u32;
    type ImageView = u32;
    type Buffer = MockBuffer;
    type DescriptorSet = u32;

    fn begin_command_list(&self) -> CommandListId {
        let mut next = self.next_list.lock().unwrap();
        let id = CommandListId(*next);
        *next += 1;
        self.record(Call::Begin(id));
        id
    }

    fn end_command_list(&self, list: CommandListId) {
        self.record(Call::End(list));
    }

    fn cmd_mark_frame_start(&self, _list: CommandListId, frame_index: u32) {
        self.record(Call::FrameStart(frame_index));
    }

    fn cmd_push_marker(&self, _list: CommandListId, name: &str, _color: LinearRgba) {
        self.record(Call::PushMarker(name.to_string()));
    }

    fn cmd_pop_marker(&self, _list: CommandListId) {
        self.record(Call::PopMarker);
    }

    fn cmd_begin_render_pass(&self, _list: CommandListId, pipeline: GraphicsPipelineId) {
        self.record(Call::BeginPass(pipeline));
    }

    fn cmd_end_render_pass(&self, _list: CommandListId, pipeline: GraphicsPipelineId) {
        self.record(Call::EndPass(pipeline));
    }

    fn cmd_bind_descriptor_set(
        &self,
        _list: CommandListId,
        pipeline: GraphicsPipelineId,
        slot: DescriptorSetSlot,
        set: u32,
    ) {
        self.record(Call::BindSet {
            pipeline,
            slot,
            set,
        });
    }

    fn cmd_set_scissor(&self, _list: CommandListId, rect: ScissorRect) {
        self.record(Call::Scissor(rect));
    }

    fn cmd_set_viewport(&self, _list: CommandListId, viewport: Viewport) {
        self.record(Call::Viewport(viewport));
    }

    fn cmd_bind_vertex_buffer(&self, _list: CommandListId, slot: u32, model: ModelId) {
        self.record(Call::VertexBuffer { slot, model });
    }

    fn cmd_bind_index_buffer(&self, _list: CommandListId, model: ModelId) {
        self.record(Call::IndexBuffer(model));
    }

    fn cmd_bind_raw_vertex_buffer(&self, _list: CommandListId, slot: u32, buffer: BufferId) {
        self.record(Call::RawVertexBuffer { slot, buffer });
    }

    fn cmd_clear_image(&self, _list: CommandListId, image: ImageId, color: LinearRgba) {
        self.record(Call::ClearImage(image, color));
    }

    fn cmd_clear_depth_image(
        &self,
        _list: CommandListId,
        image: DepthImageId,
        flags: DepthClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        self.record(Call::ClearDepth(image, flags, depth, stencil));
    }

    fn cmd_draw(&self, _list: CommandListId, vertex_count: u32, instance_count: u32) {
        self.record(Call::Draw {
            vertices: vertex_count,
            instances: instance_count,
        });
    }

    fn cmd_draw_indexed(&self, _list: CommandListId, index_count: u32, instance_count: u32) {
        self.record(Call::DrawIndexed {
            indices: index_count,
            instances: instance_count,
        });
    }

    fn pipeline_reflection(
        &self,
        pipeline: GraphicsPipelineId,
    ) -> Result<Arc<PipelineReflection>, ResourceError> {
        self.pipelines
            .get(&pipeline)
            .cloned()
            .ok_or(ResourceError::NotFound {
                kind: ResourceKind::GraphicsPipeline,
                id: pipeline.0,
            })
    }

    fn model_index_count(&self, model: ModelId) -> Result<u32, ResourceError> {
        self.models.get(&model).copied().ok_or(ResourceError::NotFound {
            kind: ResourceKind::Model,
            id: model.0,
        })
    }

    fn resolve_sampler(&self, sampler: SamplerId) -> Result<u32, ResourceError> {
        if self.samplers.contains(&sampler) {
            Ok(sampler.0)
        } else {
            Err(ResourceError::NotFound {
                kind: ResourceKind::Sampler,
                id: sampler.0,
            })
        }
    }

    fn resolve_texture_view(&self, texture: TextureId) -> Result<u32, ResourceError> {
        if self.textures.contains(&texture) {
            Ok(texture.0)
        } else {
            Err(ResourceError::NotFound {
                kind: ResourceKind::Texture,
                id: texture.0,
            })
        }
    }

    fn resolve_texture_array(
        &self,
        array: TextureArrayId,
    ) -> Result<TextureArrayViews<u32>, ResourceError> {
        let (textures, capacity) =
            self.texture_arrays
                .get(&array)
                .ok_or(ResourceError::NotFound {
                    kind: ResourceKind::TextureArray,
                    id: array.0,
                })?;
        Ok(TextureArrayViews {
            views: textures.iter().map(|texture| texture.0).collect(),
            capacity: *capacity,
        })
    }

    fn debug_texture_view(&self) -> u32 {
        DEBUG_VIEW
    }

    fn resolve_buffer(
        &self,
        buffer: BufferId,
        kind: BufferKind,
        frame_index: u32,
    ) -> Result<BufferBinding<MockBuffer>, ResourceError> {
        let (actual, size) = self.buffers.get(&buffer).ok_or(ResourceError::NotFound {
            kind: kind.resource_kind(),
            id: buffer.0,
        })?;
        if *actual != kind {
            return Err(ResourceError::KindMismatch {
                id: buffer.0,
                expected: kind.resource_kind(),
                found: actual.resource_kind(),
            });
        }
        Ok(BufferBinding {
            buffer: (buffer.0, frame_index),
            range: *size,
        })
    }

    fn allocate_descriptor_set(
        &self,
        pipeline: GraphicsPipelineId,
        set: u32,
        writes: &[DescriptorWrite<u32, u32, MockBuffer>],
        lifetime: DescriptorLifetime,
    ) -> Result<u32, ResourceError> {
        let mut allocations = self.allocations.lock().unwrap();
        allocations.push(Allocation {
            pipeline,
            set,
            writes: writes.to_vec(),
            lifetime,
        });
        Ok(allocations.len() as u32 - 1)
    }
}

/// A pipeline with a per-pass set (1) and a per-draw set (2):
///
/// | name          | type           | set | binding | count |
/// |---------------|----------------|-----|---------|-------|
/// | `_viewData`   | uniform buffer | 1   | 0       | 1     |
/// | `_modelData`  | storage buffer | 2   | 0       | 1     |
/// | `_sampler`    | sampler        | 2   | 1       | 1     |
/// | `_albedo`     | sampled image  | 2   | 2       | 1     |
/// | `_textures`   | sampled image  | 2   | 3       | 4     |
pub fn forward_stages() -> Vec<ShaderReflection> {
    vec![
        ShaderReflection::new(ShaderStage::Vertex)
            .with_binding(ShaderResourceBinding::new(
                "_viewData",
                ShaderBindingType::UniformBuffer,
                1,
                0,
            ))
            .with_binding(ShaderResourceBinding::new(
                "_modelData",
                ShaderBindingType::StorageBuffer,
                2,
                0,
            )),
        ShaderReflection::new(ShaderStage::Fragment)
            .with_binding(ShaderResourceBinding::new(
                "_sampler",
                ShaderBindingType::Sampler,
                2,
                1,
            ))
            .with_binding(ShaderResourceBinding::new(
                "_albedo",
                ShaderBindingType::SampledImage,
                2,
                2,
            ))
            .with_binding(
                ShaderResourceBinding::new("_textures", ShaderBindingType::SampledImage, 2, 3)
                    .with_count(4),
            ),
    ]
}
