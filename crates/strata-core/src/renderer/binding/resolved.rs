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

//! Native-side values produced while resolving descriptors.

use crate::renderer::api::pipeline::LayoutBinding;

/// How long a finalized descriptor set stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorLifetime {
    /// Valid for the current frame in flight only; recycled when the same
    /// frame index starts again.
    PerFrame,
    /// Never recycled.
    Persistent,
}

/// A native buffer and the byte range bound from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBinding<Buf> {
    /// The native buffer for the requested frame.
    pub buffer: Buf,
    /// The bound range in bytes, starting at offset zero.
    pub range: u64,
}

/// The views of a texture array, in insertion order, and its declared capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureArrayViews<View> {
    /// Views of the textures currently in the array.
    pub views: Vec<View>,
    /// The number of slots the array declares.
    pub capacity: u32,
}

/// A resolved native resource, ready to be written into a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedResource<Sampler, View, Buf> {
    /// A native sampler.
    Sampler(Sampler),
    /// A shader-read-only image view.
    Image(View),
    /// Exactly `capacity` image views of a texture array.
    ImageArray(Vec<View>),
    /// A native buffer range.
    Buffer(BufferBinding<Buf>),
}

/// One entry of a descriptor set under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorWrite<Sampler, View, Buf> {
    /// Hash of the binding name.
    pub name_hash: u32,
    /// Index of the matching entry in the pipeline's bind infos.
    pub bind_info_index: u32,
    /// The native layout entry of the binding.
    pub layout: LayoutBinding,
    /// The resolved resource.
    pub resource: ResolvedResource<Sampler, View, Buf>,
}
