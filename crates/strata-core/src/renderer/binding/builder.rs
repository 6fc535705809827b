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

//! Accumulates the descriptors of one `BindDescriptorSet` and finalizes a native set.

use std::sync::Arc;

use super::resolved::{DescriptorLifetime, DescriptorWrite, ResolvedResource};
use crate::renderer::api::descriptor::{Descriptor, DescriptorResource, DescriptorSetSlot};
use crate::renderer::api::pipeline::{
    reflect_descriptor_set, PipelineReflection, ReflectedBinding, ShaderBindingType,
};
use crate::renderer::api::resource::{BufferId, BufferKind, GraphicsPipelineId, TextureArrayId};
use crate::renderer::error::BindingError;
use crate::renderer::traits::{BackendWrite, RenderBackend};

/// Resolves descriptors against a pipeline's reflection table and builds one
/// native descriptor set out of them.
///
/// All descriptors bound to one builder must resolve to the same set index:
/// the first successful lookup commits the set and every later lookup is
/// checked against it.
pub struct DescriptorSetBuilder<B: RenderBackend> {
    pipeline: GraphicsPipelineId,
    reflection: Arc<PipelineReflection>,
    committed_set: Option<u32>,
    writes: Vec<BackendWrite<B>>,
    failed: u32,
}

impl<B: RenderBackend> DescriptorSetBuilder<B> {
    /// Starts a set for `pipeline`.
    pub fn new(pipeline: GraphicsPipelineId, reflection: Arc<PipelineReflection>) -> Self {
        Self {
            pipeline,
            reflection,
            committed_set: None,
            writes: Vec::new(),
            failed: 0,
        }
    }

    /// Resolves one descriptor and adds it to the set.
    ///
    /// Buffers are resolved for `frame_index`. A descriptor that targets a
    /// binding already in the set replaces it.
    pub fn bind(
        &mut self,
        descriptor: &Descriptor,
        frame_index: u32,
        backend: &B,
    ) -> Result<(), BindingError> {
        let result = self.resolve(descriptor, frame_index, backend);
        match result {
            Ok(write) => {
                match self
                    .writes
                    .iter_mut()
                    .find(|existing| existing.bind_info_index == write.bind_info_index)
                {
                    Some(existing) => *existing = write,
                    None => self.writes.push(write),
                }
                Ok(())
            }
            Err(err) => {
                self.failed += 1;
                Err(err)
            }
        }
    }

    /// The set index committed so far, if any descriptor resolved.
    pub fn committed_set(&self) -> Option<u32> {
        self.committed_set
    }

    /// The writes accumulated so far.
    pub fn writes(&self) -> &[BackendWrite<B>] {
        &self.writes
    }

    /// Finalizes the set for `slot`.
    ///
    /// Fails if `slot` is the global slot, if any earlier
    /// [`bind`](Self::bind) failed, or if the descriptors resolved to a set
    /// other than `slot`'s.
    pub fn build(
        self,
        slot: DescriptorSetSlot,
        lifetime: DescriptorLifetime,
        backend: &B,
    ) -> Result<B::DescriptorSet, BindingError> {
        if slot == DescriptorSetSlot::Global {
            return Err(BindingError::GlobalSlot);
        }
        if self.failed > 0 {
            return Err(BindingError::UnresolvedBindings {
                failed: self.failed,
            });
        }
        let set = slot.index();
        if let Some(committed_set) = self.committed_set {
            if committed_set != set {
                return Err(BindingError::SlotMismatch {
                    slot,
                    committed_set,
                });
            }
        }
        let native = backend.allocate_descriptor_set(self.pipeline, set, &self.writes, lifetime)?;
        Ok(native)
    }

    fn resolve(
        &mut self,
        descriptor: &Descriptor,
        frame_index: u32,
        backend: &B,
    ) -> Result<BackendWrite<B>, BindingError> {
        let reflected = reflect_descriptor_set(
            descriptor.name(),
            descriptor.name_hash(),
            ShaderBindingType::from(descriptor.descriptor_type()),
            &mut self.committed_set,
            self.reflection.bind_infos(),
        )?;

        let resource = match descriptor.resource() {
            DescriptorResource::Sampler(sampler) => {
                ResolvedResource::Sampler(backend.resolve_sampler(sampler)?)
            }
            DescriptorResource::Texture(texture) => {
                ResolvedResource::Image(backend.resolve_texture_view(texture)?)
            }
            DescriptorResource::TextureArray(array) => {
                Self::texture_array(descriptor, array, &reflected, backend)?
            }
            DescriptorResource::ConstantBuffer(buffer) => {
                Self::buffer(buffer, BufferKind::Constant, frame_index, backend)?
            }
            DescriptorResource::StorageBuffer(buffer) => {
                Self::buffer(buffer, BufferKind::Storage, frame_index, backend)?
            }
        };

        Ok(DescriptorWrite {
            name_hash: descriptor.name_hash(),
            bind_info_index: reflected.bind_info_index,
            layout: reflected.layout,
            resource,
        })
    }

    /// Caller textures first, in insertion order, then the debug texture up
    /// to the array's capacity.
    fn texture_array(
        descriptor: &Descriptor,
        array: TextureArrayId,
        reflected: &ReflectedBinding,
        backend: &B,
    ) -> Result<ResolvedResource<B::Sampler, B::ImageView, B::Buffer>, BindingError> {
        let resolved = backend.resolve_texture_array(array)?;
        let capacity = resolved.capacity;

        if resolved.views.len() > capacity as usize {
            return Err(BindingError::TooManyTextures {
                array,
                textures: resolved.views.len(),
                capacity,
            });
        }
        if capacity > reflected.layout.count {
            return Err(BindingError::ArrayCountExceeded {
                name: descriptor.name().to_string(),
                capacity,
                declared: reflected.layout.count,
            });
        }

        let mut views = resolved.views;
        views.resize(capacity as usize, backend.debug_texture_view());
        Ok(ResolvedResource::ImageArray(views))
    }

    fn buffer(
        buffer: BufferId,
        kind: BufferKind,
        frame_index: u32,
        backend: &B,
    ) -> Result<ResolvedResource<B::Sampler, B::ImageView, B::Buffer>, BindingError> {
        Ok(ResolvedResource::Buffer(
            backend.resolve_buffer(buffer, kind, frame_index)?,
        ))
    }
}
