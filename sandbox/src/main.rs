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

// Strata Sandbox
// Records, replays and presents a few frames on the software backend.

use anyhow::{anyhow, Context, Result};
use strata_core::math::LinearRgba;
use strata_core::renderer::api::pipeline::{ShaderReflection, ShaderResourceBinding};
use strata_core::renderer::api::util::{DepthClearFlags, ShaderStage};
use strata_core::renderer::*;
use strata_infra::SoftwareBackend;

const FRAMES: u32 = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewData {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
}

fn forward_shader() -> Vec<ShaderReflection> {
    vec![
        ShaderReflection::new(ShaderStage::Vertex).with_binding(ShaderResourceBinding::new(
            "_viewData",
            ShaderBindingType::UniformBuffer,
            1,
            0,
        )),
        ShaderReflection::new(ShaderStage::Fragment)
            .with_binding(ShaderResourceBinding::new(
                "_sampler",
                ShaderBindingType::Sampler,
                2,
                0,
            ))
            .with_binding(
                ShaderResourceBinding::new("_textures", ShaderBindingType::SampledImage, 2, 1)
                    .with_count(8),
            ),
    ]
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RendererConfig::load(&path)
            .with_context(|| format!("Failed to load renderer config '{path}'"))?,
        None => RendererConfig::default(),
    };
    strata_infra::logging::init(&config);

    let backend = SoftwareBackend::new(&config)?;
    let device = backend.device();

    let color = device.create_image(&ImageDesc {
        debug_name: "Scene Color".to_string(),
        width: config.swapchain_extent.width,
        height: config.swapchain_extent.height,
        format: ImageFormat::Rgba16Float,
        clear_color: LinearRgba::BLACK,
    })?;
    let depth = device.create_depth_image(&DepthImageDesc {
        debug_name: "Scene Depth".to_string(),
        width: config.swapchain_extent.width,
        height: config.swapchain_extent.height,
        format: DepthImageFormat::D24UnormS8Uint,
        clear_depth: 1.0,
    })?;
    let pipeline = device.create_graphics_pipeline(&GraphicsPipelineDesc {
        debug_name: "Forward".to_string(),
        stages: forward_shader(),
        render_targets: vec![color],
        depth_stencil: Some(depth),
    })?;
    let model = device.create_model(&ModelDesc {
        debug_name: "Quad".to_string(),
        vertex_count: 4,
        index_count: 6,
    })?;
    let sampler = device.create_sampler(&SamplerDesc {
        debug_name: "Linear Repeat".to_string(),
        ..Default::default()
    })?;
    let materials = device.create_texture_array(&TextureArrayDesc {
        debug_name: "Materials".to_string(),
        capacity: 8,
    })?;
    for i in 0..3 {
        let texture = device.create_texture(&TextureDesc {
            debug_name: format!("Material {i}"),
            width: 16,
            height: 16,
            format: ImageFormat::Rgba8Unorm,
        })?;
        device.load_texture_into_array(materials, texture)?;
    }
    let view_buffer = device.create_buffer(&BufferDesc {
        debug_name: "View Data".to_string(),
        size: std::mem::size_of::<ViewData>() as u64,
        kind: BufferKind::Constant,
    })?;

    let mut pass_set = DescriptorSet::new(DescriptorSetSlot::PerPass);
    pass_set.bind_constant_buffer("_viewData", view_buffer);
    let mut material_set = DescriptorSet::new(DescriptorSetSlot::PerDraw);
    material_set
        .bind_sampler("_sampler", sampler)
        .bind_texture_array("_textures", materials);

    let mut list = CommandList::from_config(&config);
    let clear_colors = [
        LinearRgba::RED,
        LinearRgba::GREEN,
        LinearRgba::BLUE,
        LinearRgba::YELLOW,
    ];

    for frame in 0..FRAMES {
        let frame_index = backend.frame_index();
        let view = ViewData {
            view_proj: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            camera_position: [0.0, 0.0, frame as f32, 1.0],
        };
        device.write_buffer(view_buffer, frame_index, 0, bytemuck::bytes_of(&view))?;

        list.reset();
        list.mark_frame_start(frame_index);
        list.push_marker("Forward", LinearRgba::GREEN);
        list.clear_image(color, clear_colors[frame as usize % clear_colors.len()]);
        list.clear_depth_image(depth, 1.0, DepthClearFlags::BOTH, 0);
        list.begin_pipeline(pipeline);
        list.set_viewport(
            0.0,
            0.0,
            config.swapchain_extent.width as f32,
            config.swapchain_extent.height as f32,
            0.0,
            1.0,
        );
        list.set_scissor_rect(
            0,
            config.swapchain_extent.width,
            0,
            config.swapchain_extent.height,
        );
        list.bind_descriptor_set(DescriptorSetSlot::PerPass, &pass_set, frame_index);
        list.bind_descriptor_set(DescriptorSetSlot::PerDraw, &material_set, frame_index);
        list.draw(model);
        list.draw(model);
        list.end_pipeline(pipeline);
        list.pop_marker();

        let stats = list.execute(&backend);
        if stats.descriptor_sets_failed > 0 {
            return Err(anyhow!(
                "Frame {frame}: {} descriptor set(s) failed to resolve",
                stats.descriptor_sets_failed
            ));
        }
        let image_index = backend.present(color)?;
        log::info!(
            "Frame {frame}: {} commands, {} draws, {} index binds elided, presented swapchain image {image_index}",
            stats.commands,
            stats.draw_calls,
            stats.index_buffer_binds_elided
        );
    }

    log::info!(
        "Rendered {FRAMES} frames, {} submissions",
        backend.submitted().len()
    );
    Ok(())
}
