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

//! A CPU-only rendering backend.
//!
//! It keeps image storage in host memory and executes submitted command
//! buffers directly, which makes every step of the pipeline observable.

mod backend;
mod command;
mod descriptor;
mod device;
mod native;
mod swapchain;

pub use self::backend::{SoftwareBackend, Submission};
pub use self::command::{CommandBufferHandler, NativeCommand};
pub use self::descriptor::{DescriptorPool, DescriptorSetContents, SoftwareWrite};
pub use self::device::{ImageLayout, PipelineTargets, SoftwareDevice};
pub use self::native::{NativeBuffer, NativeDescriptorSet, NativeImageView, NativeSampler};
pub use self::swapchain::{blit_writes, BlitPipeline, PresentStep, Swapchain};
