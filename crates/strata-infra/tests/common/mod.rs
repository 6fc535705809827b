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

//! A small forward-rendering scene on the software backend.

#![allow(dead_code)]

use strata_core::math::LinearRgba;
use strata_core::renderer::api::core::Extent2d;
use strata_core::renderer::api::pipeline::{ShaderReflection, ShaderResourceBinding};
use strata_core::renderer::api::util::ShaderStage;
use strata_core::renderer::*;
use strata_infra::SoftwareBackend;

pub struct Scene {
    pub backend: SoftwareBackend,
    pub color: ImageId,
    pub depth: DepthImageId,
    pub pipeline: GraphicsPipelineId,
    pub model: ModelId,
    pub sampler: SamplerId,
    pub albedo: TextureId,
    pub materials: TextureArrayId,
    pub material_textures: Vec<TextureId>,
    pub view_data: BufferId,
    pub model_data: BufferId,
}

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

fn texture(backend: &SoftwareBackend, name: &str) -> TextureId {
    backend
        .device()
        .create_texture(&TextureDesc {
            debug_name: name.to_string(),
            width: 4,
            height: 4,
            format: ImageFormat::Rgba8Unorm,
        })
        .unwrap()
}

impl Scene {
    /// Builds the scene with `textures_in_array` textures loaded into a
    /// four-slot texture array.
    pub fn new(textures_in_array: usize) -> Self {
        let config = RendererConfig {
            swapchain_extent: Extent2d {
                width: 8,
                height: 8,
            },
            swapchain_image_count: 3,
            descriptor_sets_per_frame: 8,
            ..RendererConfig::default()
        };
        let backend = SoftwareBackend::new(&config).unwrap();
        let device = backend.device();

        let color = device
            .create_image(&ImageDesc {
                debug_name: "Scene Color".to_string(),
                width: 4,
                height: 4,
                format: ImageFormat::Rgba16Float,
                clear_color: LinearRgba::BLACK,
            })
            .unwrap();
        let depth = device
            .create_depth_image(&DepthImageDesc {
                debug_name: "Scene Depth".to_string(),
                width: 4,
                height: 4,
                format: DepthImageFormat::D32Float,
                clear_depth: 0.5,
            })
            .unwrap();
        let pipeline = device
            .create_graphics_pipeline(&GraphicsPipelineDesc {
                debug_name: "Forward".to_string(),
                stages: forward_stages(),
                render_targets: vec![color],
                depth_stencil: Some(depth),
            })
            .unwrap();
        let model = device
            .create_model(&ModelDesc {
                debug_name: "Cube".to_string(),
                vertex_count: 24,
                index_count: 36,
            })
            .unwrap();
        let sampler = device
            .create_sampler(&SamplerDesc {
                debug_name: "Linear".to_string(),
                ..Default::default()
            })
            .unwrap();
        let albedo = texture(&backend, "Albedo");
        let materials = device
            .create_texture_array(&TextureArrayDesc {
                debug_name: "Materials".to_string(),
                capacity: 4,
            })
            .unwrap();
        let material_textures: Vec<TextureId> = (0..textures_in_array)
            .map(|i| {
                let id = texture(&backend, &format!("Material {i}"));
                device.load_texture_into_array(materials, id).unwrap();
                id
            })
            .collect();
        let view_data = device
            .create_buffer(&BufferDesc {
                debug_name: "View Data".to_string(),
                size: 128,
                kind: BufferKind::Constant,
            })
            .unwrap();
        let model_data = device
            .create_buffer(&BufferDesc {
                debug_name: "Model Data".to_string(),
                size: 256,
                kind: BufferKind::Storage,
            })
            .unwrap();

        Self {
            backend,
            color,
            depth,
            pipeline,
            model,
            sampler,
            albedo,
            materials,
            material_textures,
            view_data,
            model_data,
        }
    }

    pub fn pass_set(&self) -> DescriptorSet {
        let mut set = DescriptorSet::new(DescriptorSetSlot::PerPass);
        set.bind_constant_buffer("_viewData", self.view_data);
        set
    }

    pub fn draw_set(&self) -> DescriptorSet {
        let mut set = DescriptorSet::new(DescriptorSetSlot::PerDraw);
        set.bind_storage_buffer("_modelData", self.model_data)
            .bind_sampler("_sampler", self.sampler)
            .bind_texture("_albedo", self.albedo)
            .bind_texture_array("_textures", self.materials);
        set
    }

    /// Records one frame drawing the model once with both sets bound.
    pub fn record_frame(&self, list: &mut CommandList, frame_index: u32, draw_set: &DescriptorSet) {
        list.mark_frame_start(frame_index);
        list.push_marker("Forward", LinearRgba::GREEN);
        list.clear_image(self.color, LinearRgba::BLUE);
        list.clear_depth_image(
            self.depth,
            1.0,
            strata_core::renderer::api::util::DepthClearFlags::DEPTH,
            0,
        );
        list.begin_pipeline(self.pipeline);
        list.set_viewport(0.0, 0.0, 4.0, 4.0, 0.0, 1.0);
        list.set_scissor_rect(0, 4, 0, 4);
        list.bind_descriptor_set(DescriptorSetSlot::PerPass, &self.pass_set(), frame_index);
        list.bind_descriptor_set(DescriptorSetSlot::PerDraw, draw_set, frame_index);
        list.draw(self.model);
        list.end_pipeline(self.pipeline);
        list.pop_marker();
    }
}
