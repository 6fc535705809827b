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

//! Creation descriptors for backend resources.
//!
//! These are plain data consumed by a backend's `create_*` functions; the
//! command list itself only ever sees the resulting handles.

use super::ids::ResourceKind;
use crate::math::LinearRgba;

/// Pixel formats of color images and textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// 8-bit normalized RGBA.
    #[default]
    Rgba8Unorm,
    /// 16-bit float RGBA.
    Rgba16Float,
    /// 32-bit float RGBA.
    Rgba32Float,
    /// Single-channel 32-bit unsigned integer.
    R32Uint,
    /// Single-channel 32-bit signed integer.
    R32Sint,
}

/// How shaders read the components of an image format.
///
/// Presentation selects a blit pipeline per component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageComponentType {
    /// Normalized or floating point components.
    Float,
    /// Unsigned integer components.
    Uint,
    /// Signed integer components.
    Sint,
}

impl ImageFormat {
    /// The component type shaders use to read this format.
    pub const fn component_type(self) -> ImageComponentType {
        match self {
            ImageFormat::Rgba8Unorm | ImageFormat::Rgba16Float | ImageFormat::Rgba32Float => {
                ImageComponentType::Float
            }
            ImageFormat::R32Uint => ImageComponentType::Uint,
            ImageFormat::R32Sint => ImageComponentType::Sint,
        }
    }
}

/// Formats of depth images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthImageFormat {
    /// 32-bit float depth.
    #[default]
    D32Float,
    /// 24-bit normalized depth with 8-bit stencil.
    D24UnormS8Uint,
    /// 32-bit float depth with 8-bit stencil.
    D32FloatS8Uint,
}

impl DepthImageFormat {
    /// `true` if the format carries a stencil aspect.
    pub const fn has_stencil(self) -> bool {
        matches!(
            self,
            DepthImageFormat::D24UnormS8Uint | DepthImageFormat::D32FloatS8Uint
        )
    }
}

/// Describes a color render target.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDesc {
    /// A name used in logs and debug markers.
    pub debug_name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: ImageFormat,
    /// The value the image is initialized with.
    pub clear_color: LinearRgba,
}

impl Default for ImageDesc {
    fn default() -> Self {
        Self {
            debug_name: String::new(),
            width: 1,
            height: 1,
            format: ImageFormat::default(),
            clear_color: LinearRgba::BLACK,
        }
    }
}

/// Describes a depth render target.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImageDesc {
    /// A name used in logs and debug markers.
    pub debug_name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth format.
    pub format: DepthImageFormat,
    /// The depth value the image is initialized with.
    pub clear_depth: f32,
}

impl Default for DepthImageDesc {
    fn default() -> Self {
        Self {
            debug_name: String::new(),
            width: 1,
            height: 1,
            format: DepthImageFormat::default(),
            clear_depth: 1.0,
        }
    }
}

/// Describes a sampled texture.
///
/// Pixel data is supplied by the texture loader and is out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureDesc {
    /// A name used in logs and debug markers.
    pub debug_name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: ImageFormat,
}

/// Describes a fixed-capacity texture array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureArrayDesc {
    /// A name used in logs and debug markers.
    pub debug_name: String,
    /// The number of slots shaders see, regardless of how many are filled.
    pub capacity: u32,
}

/// Texel filtering of a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest-texel sampling.
    Nearest,
    /// Linear interpolation.
    #[default]
    Linear,
}

/// Addressing of texture coordinates outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Coordinates wrap around.
    #[default]
    Repeat,
    /// Coordinates are clamped to the edge texel.
    ClampToEdge,
    /// Coordinates mirror at every integer boundary.
    MirrorRepeat,
}

/// Describes a sampler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SamplerDesc {
    /// A name used in logs.
    pub debug_name: String,
    /// Filtering used for both minification and magnification.
    pub filter: FilterMode,
    /// Addressing used on all axes.
    pub address_mode: AddressMode,
}

/// Describes a model: one vertex buffer and one 32-bit index buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelDesc {
    /// A name used in logs.
    pub debug_name: String,
    /// Number of vertices in the vertex buffer.
    pub vertex_count: u32,
    /// Number of indices in the index buffer.
    pub index_count: u32,
}

/// How a raw buffer is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Bound as vertex input via `SetBuffer`.
    Vertex,
    /// Bound as a uniform/constant buffer descriptor.
    Constant,
    /// Bound as a storage buffer descriptor.
    Storage,
}

impl BufferKind {
    /// The resource kind used in capability checks.
    pub const fn resource_kind(self) -> ResourceKind {
        match self {
            BufferKind::Vertex => ResourceKind::VertexBuffer,
            BufferKind::Constant => ResourceKind::ConstantBuffer,
            BufferKind::Storage => ResourceKind::StorageBuffer,
        }
    }
}

/// Describes a raw buffer.
///
/// Backends keep one native buffer per frame in flight behind each handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    /// A name used in logs.
    pub debug_name: String,
    /// Size of one native buffer in bytes. This is also the bound range.
    pub size: u64,
    /// How the buffer is bound.
    pub kind: BufferKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_types() {
        assert_eq!(
            ImageFormat::Rgba16Float.component_type(),
            ImageComponentType::Float
        );
        assert_eq!(ImageFormat::R32Uint.component_type(), ImageComponentType::Uint);
        assert_eq!(ImageFormat::R32Sint.component_type(), ImageComponentType::Sint);
    }

    #[test]
    fn stencil_formats() {
        assert!(!DepthImageFormat::D32Float.has_stencil());
        assert!(DepthImageFormat::D24UnormS8Uint.has_stencil());
    }
}
