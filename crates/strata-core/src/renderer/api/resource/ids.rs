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

//! Opaque, strongly-typed handles to backend-owned resources.
//!
//! Every handle is a `u32` newtype. The invalid handle is a distinguished
//! sentinel (`u32::MAX`), never zero, so index `0` is a perfectly valid
//! resource.

use std::fmt;

macro_rules! render_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// The distinguished invalid handle.
            pub const INVALID: Self = Self(u32::MAX);

            /// `true` unless this is [`Self::INVALID`].
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            /// The raw index of the handle.
            pub const fn index(self) -> u32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

render_handle!(
    /// A color render target.
    ImageId
);
render_handle!(
    /// A depth (and optionally stencil) render target.
    DepthImageId
);
render_handle!(
    /// A sampled, read-only texture.
    TextureId
);
render_handle!(
    /// A fixed-capacity array of textures bound as one descriptor.
    TextureArrayId
);
render_handle!(
    /// A sampler object.
    SamplerId
);
render_handle!(
    /// A graphics pipeline together with its reflection table and layouts.
    GraphicsPipelineId
);
render_handle!(
    /// A model: a vertex buffer and an index buffer drawn together.
    ModelId
);
render_handle!(
    /// A raw, multi-buffered GPU buffer.
    BufferId
);
render_handle!(
    /// A native command buffer acquired for the replay of one command list.
    CommandListId
);

/// The kind of a backend resource, used for capability checks and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A color render target.
    Image,
    /// A depth render target.
    DepthImage,
    /// A sampled texture.
    Texture,
    /// A texture array.
    TextureArray,
    /// A sampler.
    Sampler,
    /// A graphics pipeline.
    GraphicsPipeline,
    /// A model.
    Model,
    /// A buffer bound as raw vertex input.
    VertexBuffer,
    /// A buffer bound as a uniform/constant buffer.
    ConstantBuffer,
    /// A buffer bound as a storage buffer.
    StorageBuffer,
    /// A buffer looked up without a binding kind.
    Buffer,
    /// A native command buffer.
    CommandList,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Image => "image",
            ResourceKind::DepthImage => "depth image",
            ResourceKind::Texture => "texture",
            ResourceKind::TextureArray => "texture array",
            ResourceKind::Sampler => "sampler",
            ResourceKind::GraphicsPipeline => "graphics pipeline",
            ResourceKind::Model => "model",
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::ConstantBuffer => "constant buffer",
            ResourceKind::StorageBuffer => "storage buffer",
            ResourceKind::Buffer => "buffer",
            ResourceKind::CommandList => "command list",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_is_not_zero() {
        assert!(ModelId(0).is_valid());
        assert!(!ModelId::INVALID.is_valid());
        assert_eq!(ModelId::default(), ModelId::INVALID);
        assert_eq!(TextureId(42).index(), 42);
    }

    #[test]
    fn kind_display() {
        assert_eq!(ResourceKind::TextureArray.to_string(), "texture array");
        assert_eq!(ResourceKind::CommandList.to_string(), "command list");
    }
}
