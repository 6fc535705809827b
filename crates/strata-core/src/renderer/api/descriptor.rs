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

//! Client-facing descriptors: single binding requests and the sets that group them.
//!
//! A [`Descriptor`] names a shader binding by the hash of its name and carries
//! the resource to bind there. Descriptors are immutable `Copy` values; a
//! [`DescriptorSet`] is an ordered, caller-owned collection of them that the
//! command list deep-copies at record time.

use crate::renderer::api::resource::{BufferId, SamplerId, TextureArrayId, TextureId};
use crate::utils::InlineName;

/// Hashes a shader binding name (32-bit FNV-1a).
///
/// Reflection hashes the names it finds in shaders with the same function,
/// so descriptors and bind infos meet on this value.
pub const fn binding_name_hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// The name of a binding kept alongside its hash for diagnostics.
///
/// Long names are truncated; the hash is always computed on the full name.
pub type BindingLabel = InlineName<32>;

/// The kind of resource a descriptor binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    /// A sampler object.
    Sampler,
    /// A single sampled texture.
    Texture,
    /// A fixed-capacity array of sampled textures.
    TextureArray,
    /// A uniform/constant buffer.
    ConstantBuffer,
    /// A storage buffer.
    StorageBuffer,
}

/// The resource referenced by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorResource {
    /// A sampler object.
    Sampler(SamplerId),
    /// A single sampled texture.
    Texture(TextureId),
    /// A texture array.
    TextureArray(TextureArrayId),
    /// A buffer bound as a constant buffer.
    ConstantBuffer(BufferId),
    /// A buffer bound as a storage buffer.
    StorageBuffer(BufferId),
}

impl DescriptorResource {
    /// The descriptor type of this resource.
    pub const fn descriptor_type(&self) -> DescriptorType {
        match self {
            DescriptorResource::Sampler(_) => DescriptorType::Sampler,
            DescriptorResource::Texture(_) => DescriptorType::Texture,
            DescriptorResource::TextureArray(_) => DescriptorType::TextureArray,
            DescriptorResource::ConstantBuffer(_) => DescriptorType::ConstantBuffer,
            DescriptorResource::StorageBuffer(_) => DescriptorType::StorageBuffer,
        }
    }
}

/// One binding request: a resource and the shader binding it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    name_hash: u32,
    label: BindingLabel,
    resource: DescriptorResource,
}

impl Descriptor {
    /// Creates a descriptor for the binding called `name`.
    pub fn new(name: &str, resource: DescriptorResource) -> Self {
        Self {
            name_hash: binding_name_hash(name),
            label: BindingLabel::truncated(name),
            resource,
        }
    }

    /// Creates a descriptor from a precomputed name hash.
    ///
    /// Diagnostics will show the hash instead of a name.
    pub fn from_hash(name_hash: u32, resource: DescriptorResource) -> Self {
        Self {
            name_hash,
            label: BindingLabel::default(),
            resource,
        }
    }

    /// The hash of the targeted binding name.
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    /// The targeted binding name, or an empty string if built from a hash.
    pub fn name(&self) -> &str {
        self.label.as_str()
    }

    /// The resource to bind.
    pub fn resource(&self) -> DescriptorResource {
        self.resource
    }

    /// The descriptor type of the resource.
    pub fn descriptor_type(&self) -> DescriptorType {
        self.resource.descriptor_type()
    }
}

/// The descriptor-set index a [`DescriptorSet`] is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorSetSlot {
    /// Engine-wide bindings. Reserved for a pipeline-independent binding
    /// mechanism and rejected by [`bind_descriptor_set`] and [`build`].
    ///
    /// [`bind_descriptor_set`]: crate::CommandList::bind_descriptor_set
    /// [`build`]: crate::renderer::binding::DescriptorSetBuilder::build
    Global,
    /// Bindings that change once per pass.
    PerPass,
    /// Bindings that change for every draw.
    PerDraw,
}

impl DescriptorSetSlot {
    /// The set index of this slot.
    pub const fn index(self) -> u32 {
        match self {
            DescriptorSetSlot::Global => 0,
            DescriptorSetSlot::PerPass => 1,
            DescriptorSetSlot::PerDraw => 2,
        }
    }
}

/// An ordered collection of descriptors targeting one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSet {
    slot: DescriptorSetSlot,
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    /// Creates an empty set for `slot`.
    pub fn new(slot: DescriptorSetSlot) -> Self {
        Self {
            slot,
            descriptors: Vec::new(),
        }
    }

    /// The slot this set targets.
    pub fn slot(&self) -> DescriptorSetSlot {
        self.slot
    }

    /// The descriptors in insertion order.
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Adds a descriptor, replacing in place any earlier one for the same binding name.
    pub fn bind(&mut self, descriptor: Descriptor) -> &mut Self {
        match self
            .descriptors
            .iter_mut()
            .find(|existing| existing.name_hash == descriptor.name_hash)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
        self
    }

    /// Binds a sampler.
    pub fn bind_sampler(&mut self, name: &str, sampler: SamplerId) -> &mut Self {
        self.bind(Descriptor::new(name, DescriptorResource::Sampler(sampler)))
    }

    /// Binds a single texture.
    pub fn bind_texture(&mut self, name: &str, texture: TextureId) -> &mut Self {
        self.bind(Descriptor::new(name, DescriptorResource::Texture(texture)))
    }

    /// Binds a texture array.
    pub fn bind_texture_array(&mut self, name: &str, array: TextureArrayId) -> &mut Self {
        self.bind(Descriptor::new(name, DescriptorResource::TextureArray(array)))
    }

    /// Binds a constant buffer.
    pub fn bind_constant_buffer(&mut self, name: &str, buffer: BufferId) -> &mut Self {
        self.bind(Descriptor::new(name, DescriptorResource::ConstantBuffer(buffer)))
    }

    /// Binds a storage buffer.
    pub fn bind_storage_buffer(&mut self, name: &str, buffer: BufferId) -> &mut Self {
        self.bind(Descriptor::new(name, DescriptorResource::StorageBuffer(buffer)))
    }

    /// Removes every descriptor, keeping the slot.
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// `true` if no descriptor was bound.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
