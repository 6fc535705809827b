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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" of the renderer: resource
//! handles, descriptors, pipeline reflection, the deferred [`CommandList`]
//! and its executor, the descriptor-set builder, and the [`RenderBackend`]
//! trait that a concrete backend (see the `strata-infra` crate) implements.
//!
//! Client code records into a [`CommandList`]; [`CommandList::execute`]
//! later walks the list once, in order, translating each command into native
//! calls through the backend and resolving descriptor sets through the
//! pipeline's reflection table before any native bind is issued.

pub mod api;
pub mod binding;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::command::{Command, CommandList, ExecutionStats, MarkerName};
pub use self::api::core::{RendererConfig, MAX_FRAMES_IN_FLIGHT};
pub use self::api::descriptor::{
    binding_name_hash, Descriptor, DescriptorResource, DescriptorSet, DescriptorSetSlot,
    DescriptorType,
};
pub use self::api::pipeline::{
    reflect_descriptor_set, BindInfo, GraphicsPipelineDesc, PipelineReflection, ShaderBindingType,
};
pub use self::api::resource::*;
pub use self::binding::{DescriptorLifetime, DescriptorSetBuilder};
pub use self::error::{
    BindingError, ConfigError, PresentError, ReflectionError, RenderError, ResourceError,
};
pub use self::traits::RenderBackend;
