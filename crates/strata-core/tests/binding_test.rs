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

mod common;

use common::{forward_stages, MockBackend, DEBUG_VIEW};
use strata_core::renderer::api::pipeline::{ShaderReflection, ShaderResourceBinding};
use strata_core::renderer::api::util::ShaderStage;
use strata_core::renderer::binding::{BufferBinding, ResolvedResource};
use strata_core::renderer::*;

const PIPELINE: GraphicsPipelineId = GraphicsPipelineId(0);

fn builder(backend: &MockBackend) -> DescriptorSetBuilder<MockBackend> {
    DescriptorSetBuilder::new(PIPELINE, backend.pipeline_reflection(PIPELINE).unwrap())
}

fn backend() -> MockBackend {
    MockBackend::new()
        .with_pipeline(PIPELINE, &forward_stages())
        .with_texture(TextureId(1))
        .with_texture(TextureId(2))
        .with_sampler(SamplerId(3))
        .with_texture_array(TextureArrayId(0), &[TextureId(1), TextureId(2)], 4)
        .with_buffer(BufferId(0), BufferKind::Storage, 256)
        .with_buffer(BufferId(1), BufferKind::Constant, 64)
}

#[test]
fn texture_array_is_padded_with_the_debug_texture() {
    let backend = backend();
    let mut builder = builder(&backend);
    builder
        .bind(
            &Descriptor::new("_textures", DescriptorResource::TextureArray(TextureArrayId(0))),
            0,
            &backend,
        )
        .unwrap();

    let write = &builder.writes()[0];
    assert_eq!(
        write.resource,
        ResolvedResource::ImageArray(vec![1, 2, DEBUG_VIEW, DEBUG_VIEW])
    );
    assert_eq!(write.layout.binding, 3);
    assert_eq!(write.layout.count, 4);
}

#[test]
fn full_and_empty_texture_arrays() {
    let backend = backend()
        .with_texture_array(
            TextureArrayId(1),
            &[TextureId(2), TextureId(1), TextureId(2), TextureId(1)],
            4,
        )
        .with_texture_array(TextureArrayId(2), &[], 4);
    let mut builder = builder(&backend);

    builder
        .bind(
            &Descriptor::new("_textures", DescriptorResource::TextureArray(TextureArrayId(1))),
            0,
            &backend,
        )
        .unwrap();
    assert_eq!(
        builder.writes()[0].resource,
        ResolvedResource::ImageArray(vec![2, 1, 2, 1])
    );

    builder
        .bind(
            &Descriptor::new("_textures", DescriptorResource::TextureArray(TextureArrayId(2))),
            0,
            &backend,
        )
        .unwrap();
    assert_eq!(builder.writes().len(), 1);
    assert_eq!(
        builder.writes()[0].resource,
        ResolvedResource::ImageArray(vec![DEBUG_VIEW; 4])
    );
}

#[test]
fn texture_array_larger_than_the_shader_array_is_rejected() {
    let backend = backend().with_texture_array(TextureArrayId(5), &[TextureId(1)], 8);
    let mut builder = builder(&backend);
    let err = builder
        .bind(
            &Descriptor::new("_textures", DescriptorResource::TextureArray(TextureArrayId(5))),
            0,
            &backend,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::ArrayCountExceeded {
            capacity: 8,
            declared: 4,
            ..
        }
    ));
}

#[test]
fn texture_array_over_capacity_is_rejected() {
    let backend = backend().with_texture_array(
        TextureArrayId(6),
        &[TextureId(1), TextureId(2), TextureId(1)],
        2,
    );
    let mut builder = builder(&backend);
    let err = builder
        .bind(
            &Descriptor::new("_textures", DescriptorResource::TextureArray(TextureArrayId(6))),
            0,
            &backend,
        )
        .unwrap_err();
    assert!(matches!(err, BindingError::TooManyTextures { textures: 3, capacity: 2, .. }));
}

#[test]
fn texture_named_like_a_sampler_does_not_bind() {
    let stages = [ShaderReflection::new(ShaderStage::Fragment).with_binding(
        ShaderResourceBinding::new("Albedo", ShaderBindingType::Sampler, 2, 0),
    )];
    let backend = MockBackend::new()
        .with_pipeline(PIPELINE, &stages)
        .with_texture(TextureId(1));
    let mut builder = builder(&backend);

    let err = builder
        .bind(
            &Descriptor::new("Albedo", DescriptorResource::Texture(TextureId(1))),
            0,
            &backend,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        BindingError::Reflection(ReflectionError::NotFound {
            ty: ShaderBindingType::SampledImage,
            ..
        })
    ));
    assert!(builder.writes().is_empty());
    assert_eq!(builder.committed_set(), None);
    assert!(matches!(
        builder.build(DescriptorSetSlot::PerDraw, DescriptorLifetime::PerFrame, &backend),
        Err(BindingError::UnresolvedBindings { failed: 1 })
    ));
    assert!(backend.allocations().is_empty());
}

#[test]
fn buffers_resolve_per_frame_with_their_range() {
    let backend = backend();
    let mut builder = builder(&backend);
    builder
        .bind(
            &Descriptor::new("_modelData", DescriptorResource::StorageBuffer(BufferId(0))),
            1,
            &backend,
        )
        .unwrap();

    assert_eq!(
        builder.writes()[0].resource,
        ResolvedResource::Buffer(BufferBinding {
            buffer: (0, 1),
            range: 256
        })
    );
}

#[test]
fn buffer_kind_is_capability_checked() {
    let backend = backend();
    let mut builder = builder(&backend);
    let err = builder
        .bind(
            &Descriptor::new("_modelData", DescriptorResource::StorageBuffer(BufferId(1))),
            0,
            &backend,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::Resource(ResourceError::KindMismatch {
            expected: ResourceKind::StorageBuffer,
            found: ResourceKind::ConstantBuffer,
            ..
        })
    ));
}

#[test]
fn descriptors_from_two_sets_do_not_mix() {
    let backend = backend();
    let mut builder = builder(&backend);
    builder
        .bind(
            &Descriptor::new("_sampler", DescriptorResource::Sampler(SamplerId(3))),
            0,
            &backend,
        )
        .unwrap();
    assert_eq!(builder.committed_set(), Some(2));

    let err = builder
        .bind(
            &Descriptor::new("_viewData", DescriptorResource::ConstantBuffer(BufferId(1))),
            0,
            &backend,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::Reflection(ReflectionError::SetMismatch {
            committed_set: 2,
            found_set: 1,
            ..
        })
    ));
    assert_eq!(builder.committed_set(), Some(2));
}

#[test]
fn build_checks_the_slot() {
    let backend = backend();
    let mut builder = builder(&backend);
    builder
        .bind(
            &Descriptor::new("_viewData", DescriptorResource::ConstantBuffer(BufferId(1))),
            0,
            &backend,
        )
        .unwrap();
    let err = builder
        .build(DescriptorSetSlot::PerDraw, DescriptorLifetime::PerFrame, &backend)
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::SlotMismatch {
            slot: DescriptorSetSlot::PerDraw,
            committed_set: 1
        }
    ));
}

#[test]
fn build_rejects_the_global_slot() {
    let backend = backend();
    let builder = builder(&backend);
    let err = builder
        .build(DescriptorSetSlot::Global, DescriptorLifetime::PerFrame, &backend)
        .unwrap_err();
    assert!(matches!(err, BindingError::GlobalSlot));
    assert!(backend.allocations().is_empty());
}

#[test]
fn build_allocates_one_set_with_every_write() {
    let backend = backend();
    let mut builder = builder(&backend);
    for descriptor in [
        Descriptor::new("_modelData", DescriptorResource::StorageBuffer(BufferId(0))),
        Descriptor::new("_sampler", DescriptorResource::Sampler(SamplerId(3))),
        Descriptor::new("_albedo", DescriptorResource::Texture(TextureId(2))),
    ] {
        builder.bind(&descriptor, 0, &backend).unwrap();
    }

    let set = builder
        .build(DescriptorSetSlot::PerDraw, DescriptorLifetime::Persistent, &backend)
        .unwrap();

    let allocations = backend.allocations();
    assert_eq!(set, 0);
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].set, 2);
    assert_eq!(allocations[0].lifetime, DescriptorLifetime::Persistent);
    let bindings: Vec<u32> = allocations[0].writes.iter().map(|w| w.layout.binding).collect();
    assert_eq!(bindings, vec![0, 1, 2]);
    assert_eq!(allocations[0].writes[2].resource, ResolvedResource::Image(2));
}

#[test]
fn unknown_resources_are_reported() {
    let backend = backend();
    let mut builder = builder(&backend);
    let err = builder
        .bind(
            &Descriptor::new("_albedo", DescriptorResource::Texture(TextureId(77))),
            0,
            &backend,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::Resource(ResourceError::NotFound {
            kind: ResourceKind::Texture,
            id: 77
        })
    ));
}
