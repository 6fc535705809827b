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

//! The software implementation of [`RenderBackend`].

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use strata_core::fatal;
use strata_core::math::LinearRgba;
use strata_core::renderer::api::command::{ScissorRect, Viewport};
use strata_core::renderer::api::core::Extent2d;
use strata_core::renderer::api::util::DepthClearFlags;
use strata_core::renderer::binding::{
    BufferBinding, DescriptorLifetime, DescriptorWrite, ResolvedResource, TextureArrayViews,
};
use strata_core::renderer::{
    BufferId, BufferKind, CommandListId, DepthImageId, DescriptorSetSlot, GraphicsPipelineId,
    ImageComponentType, ImageId, ModelId, PipelineReflection, PresentError, RenderBackend,
    RendererConfig, ResourceError, SamplerDesc, SamplerId, TextureArrayId, TextureId,
};
use strata_core::renderer::{AddressMode, FilterMode};

use super::command::{CommandBufferHandler, NativeCommand};
use super::descriptor::{DescriptorPool, DescriptorSetContents};
use super::device::{ImageLayout, SoftwareDevice};
use super::native::{NativeBuffer, NativeDescriptorSet, NativeImageView, NativeSampler};
use super::swapchain::{blit_nearest, blit_writes, BlitPipeline, PresentStep, Swapchain};

/// A native command buffer after it was submitted to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// The command list the buffer was acquired for.
    pub list: CommandListId,
    /// The recorded commands, in order.
    pub commands: Vec<NativeCommand>,
}

/// A CPU-side graphics backend.
///
/// Command buffers are recorded into [`NativeCommand`] lists and executed
/// when they are submitted: clears, layout transitions and the present blit
/// are applied to image storage, and every submission is kept for inspection.
#[derive(Debug)]
pub struct SoftwareBackend {
    device: SoftwareDevice,
    commands: CommandBufferHandler,
    descriptors: Mutex<DescriptorPool>,
    swapchain: Mutex<Swapchain>,
    submissions: Mutex<Vec<Submission>>,
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::error!("SoftwareBackend: Mutex poisoned ({what}), recovering");
        poisoned.into_inner()
    })
}

const BLIT_COMPONENT_TYPES: [ImageComponentType; 3] = [
    ImageComponentType::Float,
    ImageComponentType::Uint,
    ImageComponentType::Sint,
];

impl SoftwareBackend {
    /// Creates the backend, its swapchain and the blit pipelines.
    ///
    /// ## Arguments
    /// * `config` - Supplies the swapchain size and descriptor pool capacity.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized backend or an error.
    pub fn new(config: &RendererConfig) -> Result<Self> {
        log::info!("Initializing software backend...");
        if config.swapchain_image_count == 0 {
            return Err(anyhow!("The swapchain needs at least one image"));
        }
        if config.descriptor_sets_per_frame == 0 {
            return Err(anyhow!("The descriptor pools need room for at least one set"));
        }

        let device = SoftwareDevice::new();
        let present_sampler = device
            .create_sampler(&SamplerDesc {
                debug_name: "Present Sampler".to_string(),
                filter: FilterMode::Nearest,
                address_mode: AddressMode::ClampToEdge,
            })
            .and_then(|id| device.sampler(id))
            .map_err(|e| anyhow!("Failed to create present sampler: {}", e))?;

        let mut descriptors = DescriptorPool::new(config.descriptor_sets_per_frame);
        let mut blit_pipelines = Vec::with_capacity(BLIT_COMPONENT_TYPES.len());
        for component_type in BLIT_COMPONENT_TYPES {
            let contents = DescriptorSetContents {
                pipeline: GraphicsPipelineId::INVALID,
                set: 0,
                writes: blit_writes(present_sampler, device.debug_view()),
            };
            let descriptor_set = descriptors
                .allocate(contents, DescriptorLifetime::Persistent)
                .map_err(|e| anyhow!("Failed to allocate {:?} blit set: {}", component_type, e))?;
            blit_pipelines.push(BlitPipeline {
                component_type,
                descriptor_set,
            });
        }

        let swapchain = Swapchain::new(
            config.swapchain_extent,
            config.swapchain_image_count,
            present_sampler,
            blit_pipelines,
        );
        log::info!(
            "Software backend ready: {} swapchain images at {}x{}, {} descriptor sets per frame",
            config.swapchain_image_count,
            config.swapchain_extent.width,
            config.swapchain_extent.height,
            config.descriptor_sets_per_frame
        );

        Ok(Self {
            device,
            commands: CommandBufferHandler::new(),
            descriptors: Mutex::new(descriptors),
            swapchain: Mutex::new(swapchain),
            submissions: Mutex::new(Vec::new()),
        })
    }

    /// The resource registry, used to create and inspect resources.
    pub fn device(&self) -> &SoftwareDevice {
        &self.device
    }

    fn descriptors(&self) -> MutexGuard<'_, DescriptorPool> {
        lock_or_recover(&self.descriptors, "descriptor pool")
    }

    fn swapchain(&self) -> MutexGuard<'_, Swapchain> {
        lock_or_recover(&self.swapchain, "swapchain")
    }

    // --- Inspection ---

    /// Every command buffer submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<Submission> {
        lock_or_recover(&self.submissions, "submissions").clone()
    }

    /// Drains the submission log.
    pub fn take_submitted(&self) -> Vec<Submission> {
        std::mem::take(&mut *lock_or_recover(&self.submissions, "submissions"))
    }

    /// The contents of a native descriptor set, or `None` once it was recycled.
    pub fn descriptor_set_contents(
        &self,
        set: NativeDescriptorSet,
    ) -> Option<DescriptorSetContents> {
        self.descriptors().get(set).cloned()
    }

    /// The number of descriptor sets allocated for `frame_index`.
    pub fn descriptor_sets_in_use(&self, frame_index: u32) -> usize {
        self.descriptors().frame_usage(frame_index)
    }

    /// The binary frame index toggled by [`Self::present`].
    pub fn frame_index(&self) -> u32 {
        self.swapchain().frame_index()
    }

    /// The steps taken by the most recent present attempt.
    pub fn last_present_steps(&self) -> Vec<PresentStep> {
        self.swapchain().last_steps().to_vec()
    }

    /// Swapchain image indices in the order they were presented.
    pub fn presented_images(&self) -> Vec<u32> {
        self.swapchain().presented().to_vec()
    }

    /// A copy of swapchain image `index`.
    pub fn swapchain_image(&self, index: u32) -> Option<Vec<LinearRgba>> {
        self.swapchain().image(index).map(<[_]>::to_vec)
    }

    /// Makes swapchain acquisition fail until [`Self::resize_swapchain`].
    pub fn invalidate_swapchain(&self, reason: &str) {
        self.swapchain().mark_out_of_date(reason);
    }

    /// Recreates the swapchain images at `extent`.
    pub fn resize_swapchain(&self, extent: Extent2d) {
        self.swapchain().recreate(extent);
    }

    // --- Presentation ---

    /// Blits `image` to the next swapchain image and presents it.
    ///
    /// The steps always run in the order of [`PresentStep`]. If acquisition
    /// fails nothing is submitted and the frame index is left untouched.
    ///
    /// ## Returns
    /// * `Result<u32, PresentError>` - The presented swapchain image index.
    pub fn present(&self, image: ImageId) -> Result<u32, PresentError> {
        let format = self
            .device
            .image_format(image)
            .map_err(|_| PresentError::InvalidImage(image))?;
        let view = self.device.image_view(image)?;
        let component_type = format.component_type();

        let list = self.begin_command_list();
        self.cmd_push_marker(list, "Present Blitting", LinearRgba::RED);

        let mut steps = Vec::with_capacity(7);
        let recorded = self.record_blit(list, image, view, component_type, &mut steps);
        let image_index = match recorded {
            Ok(index) => index,
            Err(err) => {
                self.commands.discard(list);
                log::error!("SoftwareBackend: Present of {:?} failed: {}", image, err);
                self.swapchain().set_last_steps(steps);
                return Err(err);
            }
        };

        self.cmd_pop_marker(list);
        self.end_command_list(list);

        let mut swapchain = self.swapchain();
        swapchain.present(image_index);
        steps.push(PresentStep::Present);
        swapchain.flip_frame_index();
        steps.push(PresentStep::FlipIndex);
        swapchain.set_last_steps(steps);
        log::trace!(
            "SoftwareBackend: Presented {:?} to swapchain image {} (frame index now {})",
            image,
            image_index,
            swapchain.frame_index()
        );
        Ok(image_index)
    }

    fn record_blit(
        &self,
        list: CommandListId,
        image: ImageId,
        view: NativeImageView,
        component_type: ImageComponentType,
        steps: &mut Vec<PresentStep>,
    ) -> Result<u32, PresentError> {
        let (image_index, blit, sampler) = {
            let mut swapchain = self.swapchain();
            let image_index = swapchain.acquire_next_image()?;
            let blit = swapchain.blit_pipeline(component_type).ok_or_else(|| {
                PresentError::Resource(ResourceError::BackendError(format!(
                    "No blit pipeline for {component_type:?} images"
                )))
            })?;
            (image_index, blit, swapchain.sampler())
        };
        steps.push(PresentStep::AcquireImage);

        self.descriptors()
            .update_persistent(blit.descriptor_set, blit_writes(sampler, view))?;
        steps.push(PresentStep::UpdateBlitDescriptors);

        self.commands.record(
            list,
            NativeCommand::TransitionImage {
                image,
                from: ImageLayout::General,
                to: ImageLayout::ShaderReadOnly,
            },
        );
        self.commands
            .record(list, NativeCommand::BeginSwapchainPass { image_index });
        steps.push(PresentStep::BeginPass);

        self.commands
            .record(list, NativeCommand::BindBlitPipeline(component_type));
        self.commands.record(
            list,
            NativeCommand::BindDescriptorSet {
                set: 0,
                descriptor_set: blit.descriptor_set,
            },
        );
        self.cmd_draw(list, 3, 1);
        steps.push(PresentStep::Draw);

        self.commands.record(list, NativeCommand::EndRenderPass);
        steps.push(PresentStep::EndPass);
        self.commands.record(
            list,
            NativeCommand::TransitionImage {
                image,
                from: ImageLayout::ShaderReadOnly,
                to: ImageLayout::General,
            },
        );
        Ok(image_index)
    }

    // --- Queue ---

    fn execute_submission(&self, commands: &[NativeCommand]) {
        let mut swapchain_pass: Option<u32> = None;
        let mut blit_bound = false;
        let mut bound_set: Option<NativeDescriptorSet> = None;

        for command in commands {
            match command {
                NativeCommand::ClearImage { image, color } => {
                    if let Err(e) = self.device.clear_image(*image, *color) {
                        log::error!("SoftwareBackend: Failed to clear {:?}: {}", image, e);
                    }
                }
                NativeCommand::ClearDepthImage {
                    image,
                    flags,
                    depth,
                    stencil,
                } => {
                    if let Err(e) = self.device.clear_depth_image(*image, *flags, *depth, *stencil)
                    {
                        log::error!("SoftwareBackend: Failed to clear {:?}: {}", image, e);
                    }
                }
                NativeCommand::TransitionImage { image, from, to } => {
                    match self.device.set_image_layout(*image, *to) {
                        Ok(previous) if previous != *from => log::warn!(
                            "SoftwareBackend: {:?} transitioned from {:?}, expected {:?}",
                            image,
                            previous,
                            from
                        ),
                        Ok(_) => {}
                        Err(e) => {
                            log::error!("SoftwareBackend: Failed to transition {:?}: {}", image, e)
                        }
                    }
                }
                NativeCommand::BeginSwapchainPass { image_index } => {
                    swapchain_pass = Some(*image_index);
                }
                NativeCommand::BindBlitPipeline(_) => blit_bound = true,
                NativeCommand::BindPipeline(_) => blit_bound = false,
                NativeCommand::BindDescriptorSet { descriptor_set, .. } => {
                    bound_set = Some(*descriptor_set);
                }
                NativeCommand::EndRenderPass => {
                    swapchain_pass = None;
                    blit_bound = false;
                    bound_set = None;
                }
                NativeCommand::Draw { .. } => {
                    if let (Some(image_index), true, Some(set)) =
                        (swapchain_pass, blit_bound, bound_set)
                    {
                        self.blit(image_index, set);
                    }
                }
                _ => {}
            }
        }
    }

    fn blit(&self, image_index: u32, set: NativeDescriptorSet) {
        let source_view = self.descriptors().get(set).and_then(|contents| {
            contents.writes.iter().find_map(|write| match write.resource {
                ResolvedResource::Image(view) => Some(view),
                _ => None,
            })
        });
        let Some(view) = source_view else {
            log::error!("SoftwareBackend: Blit set {:?} has no image to sample", set);
            return;
        };

        let source = match self.device.read_image_by_view(view) {
            Ok(Some(source)) => source,
            Ok(None) => {
                log::warn!("SoftwareBackend: Blit source {:?} is not a color image", view);
                return;
            }
            Err(e) => {
                log::error!("SoftwareBackend: Failed to read blit source: {}", e);
                return;
            }
        };
        if source.layout != ImageLayout::ShaderReadOnly {
            log::warn!(
                "SoftwareBackend: Sampling '{}' in layout {:?}",
                source.debug_name,
                source.layout
            );
        }

        let mut swapchain = self.swapchain();
        let pixels = blit_nearest(
            &source.pixels,
            source.width,
            source.height,
            swapchain.extent(),
        );
        swapchain.write_image(image_index, pixels);
    }
}

impl RenderBackend for SoftwareBackend {
    type Sampler = NativeSampler;
    type ImageView = NativeImageView;
    type Buffer = NativeBuffer;
    type DescriptorSet = NativeDescriptorSet;

    fn begin_command_list(&self) -> CommandListId {
        self.commands.begin()
    }

    fn end_command_list(&self, list: CommandListId) {
        let commands = self.commands.end(list);
        self.execute_submission(&commands);
        log::trace!(
            "SoftwareBackend: Submitted {:?} ({} commands)",
            list,
            commands.len()
        );
        lock_or_recover(&self.submissions, "submissions").push(Submission { list, commands });
    }

    fn cmd_mark_frame_start(&self, list: CommandListId, frame_index: u32) {
        self.descriptors().set_frame(frame_index);
        self.commands
            .record(list, NativeCommand::InsertLabel(format!("Frame {frame_index}")));
    }

    fn cmd_push_marker(&self, list: CommandListId, name: &str, color: LinearRgba) {
        self.commands.record(
            list,
            NativeCommand::PushLabel {
                name: name.to_string(),
                color,
            },
        );
    }

    fn cmd_pop_marker(&self, list: CommandListId) {
        self.commands.record(list, NativeCommand::PopLabel);
    }

    fn cmd_begin_render_pass(&self, list: CommandListId, pipeline: GraphicsPipelineId) {
        let targets = match self.device.pipeline_targets(pipeline) {
            Ok(targets) => targets,
            Err(e) => fatal!("Cannot begin the render pass of {:?}: {}", pipeline, e),
        };
        self.commands.record(
            list,
            NativeCommand::BeginRenderPass {
                color_targets: targets.render_targets,
                depth_target: targets.depth_stencil,
            },
        );
        self.commands.record(list, NativeCommand::BindPipeline(pipeline));
    }

    fn cmd_end_render_pass(&self, list: CommandListId, pipeline: GraphicsPipelineId) {
        log::trace!("SoftwareBackend: Ending render pass of {:?}", pipeline);
        self.commands.record(list, NativeCommand::EndRenderPass);
    }

    fn cmd_bind_descriptor_set(
        &self,
        list: CommandListId,
        pipeline: GraphicsPipelineId,
        slot: DescriptorSetSlot,
        set: NativeDescriptorSet,
    ) {
        log::trace!(
            "SoftwareBackend: Binding {:?} at set {} of {:?}",
            set,
            slot.index(),
            pipeline
        );
        self.commands.record(
            list,
            NativeCommand::BindDescriptorSet {
                set: slot.index(),
                descriptor_set: set,
            },
        );
    }

    fn cmd_set_scissor(&self, list: CommandListId, rect: ScissorRect) {
        self.commands.record(list, NativeCommand::SetScissor(rect));
    }

    fn cmd_set_viewport(&self, list: CommandListId, viewport: Viewport) {
        self.commands.record(list, NativeCommand::SetViewport(viewport));
    }

    fn cmd_bind_vertex_buffer(&self, list: CommandListId, slot: u32, model: ModelId) {
        match self.device.model_vertex_buffer(model) {
            Ok(buffer) => self
                .commands
                .record(list, NativeCommand::BindVertexBuffer { slot, buffer }),
            Err(e) => log::error!("SoftwareBackend: Cannot bind vertices of {:?}: {}", model, e),
        }
    }

    fn cmd_bind_index_buffer(&self, list: CommandListId, model: ModelId) {
        match self.device.model_index_buffer(model) {
            Ok(buffer) => self
                .commands
                .record(list, NativeCommand::BindIndexBuffer(buffer)),
            Err(e) => log::error!("SoftwareBackend: Cannot bind indices of {:?}: {}", model, e),
        }
    }

    fn cmd_bind_raw_vertex_buffer(&self, list: CommandListId, slot: u32, buffer: BufferId) {
        let frame_index = self.descriptors().current_frame();
        match self
            .device
            .buffer_binding(buffer, BufferKind::Vertex, frame_index)
        {
            Ok(binding) => self.commands.record(
                list,
                NativeCommand::BindVertexBuffer {
                    slot,
                    buffer: binding.buffer,
                },
            ),
            Err(e) => log::error!("SoftwareBackend: Cannot bind {:?}: {}", buffer, e),
        }
    }

    fn cmd_clear_image(&self, list: CommandListId, image: ImageId, color: LinearRgba) {
        self.commands
            .record(list, NativeCommand::ClearImage { image, color });
    }

    fn cmd_clear_depth_image(
        &self,
        list: CommandListId,
        image: DepthImageId,
        flags: DepthClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        self.commands.record(
            list,
            NativeCommand::ClearDepthImage {
                image,
                flags,
                depth,
                stencil,
            },
        );
    }

    fn cmd_draw(&self, list: CommandListId, vertex_count: u32, instance_count: u32) {
        self.commands.record(
            list,
            NativeCommand::Draw {
                vertex_count,
                instance_count,
            },
        );
    }

    fn cmd_draw_indexed(&self, list: CommandListId, index_count: u32, instance_count: u32) {
        self.commands.record(
            list,
            NativeCommand::DrawIndexed {
                index_count,
                instance_count,
            },
        );
    }

    fn pipeline_reflection(
        &self,
        pipeline: GraphicsPipelineId,
    ) -> Result<Arc<PipelineReflection>, ResourceError> {
        self.device.pipeline_reflection(pipeline)
    }

    fn model_index_count(&self, model: ModelId) -> Result<u32, ResourceError> {
        self.device.model_index_count(model)
    }

    fn resolve_sampler(&self, sampler: SamplerId) -> Result<NativeSampler, ResourceError> {
        self.device.sampler(sampler)
    }

    fn resolve_texture_view(&self, texture: TextureId) -> Result<NativeImageView, ResourceError> {
        self.device.texture_view(texture)
    }

    fn resolve_texture_array(
        &self,
        array: TextureArrayId,
    ) -> Result<TextureArrayViews<NativeImageView>, ResourceError> {
        self.device.texture_array_views(array)
    }

    fn debug_texture_view(&self) -> NativeImageView {
        self.device.debug_view()
    }

    fn resolve_buffer(
        &self,
        buffer: BufferId,
        kind: BufferKind,
        frame_index: u32,
    ) -> Result<BufferBinding<NativeBuffer>, ResourceError> {
        self.device.buffer_binding(buffer, kind, frame_index)
    }

    fn allocate_descriptor_set(
        &self,
        pipeline: GraphicsPipelineId,
        set: u32,
        writes: &[DescriptorWrite<NativeSampler, NativeImageView, NativeBuffer>],
        lifetime: DescriptorLifetime,
    ) -> Result<NativeDescriptorSet, ResourceError> {
        let reflection = self.device.pipeline_reflection(pipeline)?;
        let layout = reflection.set_layout(set).ok_or_else(|| {
            ResourceError::BackendError(format!("{pipeline:?} has no descriptor set {set}"))
        })?;
        if let Some(write) = writes
            .iter()
            .find(|write| layout.binding(write.layout.binding) != Some(&write.layout))
        {
            return Err(ResourceError::BackendError(format!(
                "Write to binding {} does not match set {} of {:?}",
                write.layout.binding, set, pipeline
            )));
        }

        let contents = DescriptorSetContents {
            pipeline,
            set,
            writes: writes.to_vec(),
        };
        let allocated = self.descriptors().allocate(contents, lifetime)?;
        log::trace!(
            "SoftwareBackend: Allocated {:?} ({} writes) for set {} of {:?}",
            allocated,
            writes.len(),
            set,
            pipeline
        );
        Ok(allocated)
    }
}
