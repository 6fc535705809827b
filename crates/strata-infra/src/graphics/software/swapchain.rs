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

//! The software swapchain and its blit pipelines.

use std::collections::HashMap;

use strata_core::math::LinearRgba;
use strata_core::renderer::api::core::Extent2d;
use strata_core::renderer::api::pipeline::LayoutBinding;
use strata_core::renderer::api::util::ShaderStageFlags;
use strata_core::renderer::binding::ResolvedResource;
use strata_core::renderer::{
    binding_name_hash, ImageComponentType, PresentError, ShaderBindingType,
};

use super::descriptor::SoftwareWrite;
use super::native::{NativeDescriptorSet, NativeImageView, NativeSampler};

/// The fixed steps of one present, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentStep {
    /// The next swapchain image was acquired.
    AcquireImage,
    /// The blit set was pointed at the presented image.
    UpdateBlitDescriptors,
    /// The swapchain render pass began.
    BeginPass,
    /// The full-screen triangle was drawn.
    Draw,
    /// The swapchain render pass ended.
    EndPass,
    /// The swapchain image was queued for presentation.
    Present,
    /// The frame index was toggled.
    FlipIndex,
}

/// The blit pipeline used for one image component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitPipeline {
    /// The component type the pipeline samples.
    pub component_type: ImageComponentType,
    /// Its persistent two-entry descriptor set.
    pub descriptor_set: NativeDescriptorSet,
}

/// The two writes of a blit set: binding 0 is the sampler, binding 1 the image.
pub fn blit_writes(sampler: NativeSampler, view: NativeImageView) -> Vec<SoftwareWrite> {
    let entry = |binding, binding_type| LayoutBinding {
        binding,
        binding_type,
        count: 1,
        stages: ShaderStageFlags::FRAGMENT,
    };
    vec![
        SoftwareWrite {
            name_hash: binding_name_hash("_blitSampler"),
            bind_info_index: 0,
            layout: entry(0, ShaderBindingType::Sampler),
            resource: ResolvedResource::Sampler(sampler),
        },
        SoftwareWrite {
            name_hash: binding_name_hash("_blitTexture"),
            bind_info_index: 1,
            layout: entry(1, ShaderBindingType::SampledImage),
            resource: ResolvedResource::Image(view),
        },
    ]
}

/// A set of presentable images with a binary frame index.
#[derive(Debug)]
pub struct Swapchain {
    extent: Extent2d,
    images: Vec<Vec<LinearRgba>>,
    next_image: u32,
    frame_index: u32,
    out_of_date: Option<String>,
    sampler: NativeSampler,
    blit_pipelines: HashMap<ImageComponentType, BlitPipeline>,
    presented: Vec<u32>,
    last_steps: Vec<PresentStep>,
}

impl Swapchain {
    /// Creates a swapchain of `image_count` black images.
    pub fn new(
        extent: Extent2d,
        image_count: u32,
        sampler: NativeSampler,
        blit_pipelines: impl IntoIterator<Item = BlitPipeline>,
    ) -> Self {
        let texels = extent.width as usize * extent.height as usize;
        Self {
            extent,
            images: vec![vec![LinearRgba::BLACK; texels]; image_count as usize],
            next_image: 0,
            frame_index: 0,
            out_of_date: None,
            sampler,
            blit_pipelines: blit_pipelines
                .into_iter()
                .map(|pipeline| (pipeline.component_type, pipeline))
                .collect(),
            presented: Vec::new(),
            last_steps: Vec::new(),
        }
    }

    /// The size of the swapchain images.
    pub fn extent(&self) -> Extent2d {
        self.extent
    }

    /// The number of swapchain images.
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    /// The binary frame index, toggled by every successful present.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// The sampler written into blit sets.
    pub fn sampler(&self) -> NativeSampler {
        self.sampler
    }

    /// The blit pipeline for `component_type`.
    pub fn blit_pipeline(&self, component_type: ImageComponentType) -> Option<BlitPipeline> {
        self.blit_pipelines.get(&component_type).copied()
    }

    /// Marks the swapchain out of date; acquisition fails until [`Self::recreate`].
    pub fn mark_out_of_date(&mut self, reason: &str) {
        log::warn!("Swapchain: Marked out of date: {reason}");
        self.out_of_date = Some(reason.to_string());
    }

    /// Rebuilds the images at `extent`. The frame index is kept.
    pub fn recreate(&mut self, extent: Extent2d) {
        let texels = extent.width as usize * extent.height as usize;
        for image in &mut self.images {
            *image = vec![LinearRgba::BLACK; texels];
        }
        self.extent = extent;
        self.next_image = 0;
        self.out_of_date = None;
        log::info!(
            "Swapchain: Recreated {} images at {}x{}",
            self.images.len(),
            extent.width,
            extent.height
        );
    }

    /// Acquires the next image in round-robin order.
    /// ## Errors
    /// * `PresentError::AcquisitionFailed` - If the swapchain is out of date.
    pub fn acquire_next_image(&mut self) -> Result<u32, PresentError> {
        if let Some(reason) = &self.out_of_date {
            return Err(PresentError::AcquisitionFailed(reason.clone()));
        }
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count();
        Ok(index)
    }

    /// Replaces the contents of swapchain image `index`.
    pub(crate) fn write_image(&mut self, index: u32, pixels: Vec<LinearRgba>) {
        match self.images.get_mut(index as usize) {
            Some(image) => *image = pixels,
            None => log::error!("Swapchain: Image index {index} out of range"),
        }
    }

    /// The pixels of swapchain image `index`, row-major.
    pub fn image(&self, index: u32) -> Option<&[LinearRgba]> {
        self.images.get(index as usize).map(Vec::as_slice)
    }

    pub(crate) fn present(&mut self, index: u32) {
        self.presented.push(index);
    }

    pub(crate) fn flip_frame_index(&mut self) {
        self.frame_index ^= 1;
    }

    /// Swapchain image indices in the order they were presented.
    pub fn presented(&self) -> &[u32] {
        &self.presented
    }

    pub(crate) fn set_last_steps(&mut self, steps: Vec<PresentStep>) {
        self.last_steps = steps;
    }

    /// The steps taken by the most recent present attempt.
    pub fn last_steps(&self) -> &[PresentStep] {
        &self.last_steps
    }
}

/// Nearest-neighbour resample of a `src_width` x `src_height` image to `extent`.
pub(crate) fn blit_nearest(
    src: &[LinearRgba],
    src_width: u32,
    src_height: u32,
    extent: Extent2d,
) -> Vec<LinearRgba> {
    let mut dst = Vec::with_capacity(extent.width as usize * extent.height as usize);
    for y in 0..extent.height {
        let sy = (y as u64 * src_height as u64 / extent.height as u64) as usize;
        for x in 0..extent.width {
            let sx = (x as u64 * src_width as u64 / extent.width as u64) as usize;
            dst.push(
                src.get(sy * src_width as usize + sx)
                    .copied()
                    .unwrap_or(LinearRgba::BLACK),
            );
        }
    }
    dst
}
