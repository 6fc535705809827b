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

//! Graphics pipeline descriptions and their shader reflection tables.

pub mod layout;
pub mod reflection;

pub use self::layout::*;
pub use self::reflection::*;

use crate::renderer::api::resource::{DepthImageId, ImageId};

/// Describes a graphics pipeline.
///
/// Shader compilation is out of scope; the caller provides the reflection
/// data extracted from each stage and the backend merges it into the
/// pipeline's [`PipelineReflection`] at creation time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphicsPipelineDesc {
    /// A name used in logs and debug markers.
    pub debug_name: String,
    /// Reflection data of each shader stage.
    pub stages: Vec<ShaderReflection>,
    /// Color targets written by the pipeline's render pass.
    pub render_targets: Vec<ImageId>,
    /// Optional depth target of the render pass.
    pub depth_stencil: Option<DepthImageId>,
}
