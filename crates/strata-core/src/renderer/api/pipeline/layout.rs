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

//! Native-facing descriptor-set layout entries.

use super::reflection::ShaderBindingType;
use crate::renderer::api::util::ShaderStageFlags;

/// One entry of a descriptor-set layout, as produced by reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutBinding {
    /// The binding index inside the set.
    pub binding: u32,
    /// The shader-side binding type.
    pub binding_type: ShaderBindingType,
    /// Number of array elements (1 for non-arrays).
    pub count: u32,
    /// Stages that access the binding.
    pub stages: ShaderStageFlags,
}

/// The layout of one descriptor set of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescriptorSetLayoutDesc {
    /// The set index.
    pub set: u32,
    /// The bindings of the set, ordered by binding index.
    pub bindings: Vec<LayoutBinding>,
}

impl DescriptorSetLayoutDesc {
    /// Looks up the entry for a binding index.
    pub fn binding(&self, binding: u32) -> Option<&LayoutBinding> {
        self.bindings.iter().find(|entry| entry.binding == binding)
    }
}
