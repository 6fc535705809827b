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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Only *content* errors live here: conditions caused by data that the
//! author can fix (a binding name the shader does not declare, a missing
//! resource, a bad config file). Caller contract violations are reported
//! through [`fatal!`](crate::fatal) instead.

use crate::renderer::api::descriptor::DescriptorSetSlot;
use crate::renderer::api::pipeline::ShaderBindingType;
use crate::renderer::api::resource::{ImageId, ResourceKind, TextureArrayId};
use std::fmt;

/// An error raised while looking up or resolving a backend resource.
#[derive(Debug)]
pub enum ResourceError {
    /// No live resource of this kind is registered under the given id.
    NotFound {
        /// The kind of resource that was requested.
        kind: ResourceKind,
        /// The raw id that was requested.
        id: u32,
    },
    /// The handle is the invalid sentinel.
    InvalidHandle {
        /// The kind of resource the handle refers to.
        kind: ResourceKind,
    },
    /// The resource exists but has a different kind than the one requested.
    KindMismatch {
        /// The raw id that was requested.
        id: u32,
        /// The kind the caller asked for.
        expected: ResourceKind,
        /// The kind the resource actually has.
        found: ResourceKind,
    },
    /// A fixed-size pool has no room left for this frame.
    PoolExhausted {
        /// A short name of the pool.
        pool: &'static str,
        /// The pool capacity.
        capacity: usize,
    },
    /// An index into a resource was out of its bounds.
    OutOfBounds,
    /// An error originating from the specific backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound { kind, id } => write!(f, "No {kind} registered with ID {id}"),
            ResourceError::InvalidHandle { kind } => write!(f, "Invalid {kind} handle"),
            ResourceError::KindMismatch {
                id,
                expected,
                found,
            } => write!(f, "Resource {id} is a {found}, expected a {expected}"),
            ResourceError::PoolExhausted { pool, capacity } => {
                write!(f, "Pool '{pool}' exhausted (capacity {capacity})")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A mismatch between a requested binding and the pipeline's reflected bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectionError {
    /// No reflected binding has this name and type.
    NotFound {
        /// The binding name as recorded.
        name: String,
        /// The hash of the binding name.
        name_hash: u32,
        /// The shader-side binding type that was looked for.
        ty: ShaderBindingType,
    },
    /// A binding was found, but in a different set than the one already committed.
    SetMismatch {
        /// The binding name as reflected.
        name: String,
        /// The shader-side binding type.
        ty: ShaderBindingType,
        /// The set index committed by an earlier binding.
        committed_set: u32,
        /// The set index of the binding that was found.
        found_set: u32,
    },
}

impl fmt::Display for ReflectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectionError::NotFound {
                name,
                name_hash,
                ty,
            } => write!(
                f,
                "Binding '{name}' ({name_hash:#010x}) of type {ty:?} has no matching BindInfo in the bound shaders"
            ),
            ReflectionError::SetMismatch {
                name,
                ty,
                committed_set,
                found_set,
            } => write!(
                f,
                "Binding '{name}' of type {ty:?} lives in set {found_set}, but set {committed_set} was already committed"
            ),
        }
    }
}

impl std::error::Error for ReflectionError {}

/// An error raised while building one descriptor set.
#[derive(Debug)]
pub enum BindingError {
    /// The descriptor did not match the pipeline's reflection table.
    Reflection(ReflectionError),
    /// A resource referenced by the descriptor could not be resolved.
    Resource(ResourceError),
    /// A texture array reports more textures than its capacity.
    TooManyTextures {
        /// The offending array.
        array: TextureArrayId,
        /// Number of textures held by the array.
        textures: usize,
        /// The declared capacity of the array.
        capacity: u32,
    },
    /// The shader declares fewer array elements than the bound texture array provides.
    ArrayCountExceeded {
        /// The binding name.
        name: String,
        /// The capacity of the bound texture array.
        capacity: u32,
        /// The element count declared by the shader.
        declared: u32,
    },
    /// The descriptors resolved to a set other than the requested slot.
    SlotMismatch {
        /// The slot the set was bound to.
        slot: DescriptorSetSlot,
        /// The set index the descriptors resolved to.
        committed_set: u32,
    },
    /// The global slot was requested through the per-pipeline path.
    GlobalSlot,
    /// The set was finalized although some of its descriptors failed to resolve.
    UnresolvedBindings {
        /// Number of descriptors that failed.
        failed: u32,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::Reflection(err) => write!(f, "Reflection error: {err}"),
            BindingError::Resource(err) => write!(f, "Resource error: {err}"),
            BindingError::TooManyTextures {
                array,
                textures,
                capacity,
            } => write!(
                f,
                "Texture array {array:?} holds {textures} textures but its capacity is {capacity}"
            ),
            BindingError::ArrayCountExceeded {
                name,
                capacity,
                declared,
            } => write!(
                f,
                "Binding '{name}' declares {declared} elements, texture array capacity is {capacity}"
            ),
            BindingError::SlotMismatch {
                slot,
                committed_set,
            } => write!(
                f,
                "Descriptors resolved to set {committed_set} but were bound to slot {slot:?} (set {})",
                slot.index()
            ),
            BindingError::GlobalSlot => {
                write!(f, "The global slot cannot be bound per pipeline")
            }
            BindingError::UnresolvedBindings { failed } => {
                write!(f, "{failed} descriptor(s) failed to resolve")
            }
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindingError::Reflection(err) => Some(err),
            BindingError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReflectionError> for BindingError {
    fn from(err: ReflectionError) -> Self {
        BindingError::Reflection(err)
    }
}

impl From<ResourceError> for BindingError {
    fn from(err: ResourceError) -> Self {
        BindingError::Resource(err)
    }
}

/// An error raised while presenting a rendered image.
#[derive(Debug)]
pub enum PresentError {
    /// The next swapchain image could not be acquired.
    AcquisitionFailed(String),
    /// The image to present is not a registered color image.
    InvalidImage(ImageId),
    /// A resource of the blit path could not be resolved.
    Resource(ResourceError),
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentError::AcquisitionFailed(msg) => {
                write!(f, "Failed to acquire swapchain image: {msg}")
            }
            PresentError::InvalidImage(id) => write!(f, "Cannot present image {id:?}"),
            PresentError::Resource(err) => write!(f, "Present resource error: {err}"),
        }
    }
}

impl std::error::Error for PresentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresentError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for PresentError {
    fn from(err: ResourceError) -> Self {
        PresentError::Resource(err)
    }
}

/// An error raised while loading the renderer configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io {
        /// The path that was read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The config text is not valid JSON for [`RendererConfig`](crate::RendererConfig).
    Parse(serde_json::Error),
    /// A value is out of its accepted range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config '{path}': {source}")
            }
            ConfigError::Parse(err) => write!(f, "Failed to parse config: {err}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// A high-level error of the rendering system.
#[derive(Debug)]
pub enum RenderError {
    /// An error occurred while managing a resource.
    Resource(ResourceError),
    /// A descriptor set could not be built.
    Binding(BindingError),
    /// Presentation failed.
    Present(PresentError),
    /// The configuration could not be loaded.
    Config(ConfigError),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Resource(err) => write!(f, "Resource error: {err}"),
            RenderError::Binding(err) => write!(f, "Binding error: {err}"),
            RenderError::Present(err) => write!(f, "Present error: {err}"),
            RenderError::Config(err) => write!(f, "Config error: {err}"),
            RenderError::Internal(msg) => write!(f, "Internal renderer error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            RenderError::Binding(err) => Some(err),
            RenderError::Present(err) => Some(err),
            RenderError::Config(err) => Some(err),
            RenderError::Internal(_) => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

impl From<BindingError> for RenderError {
    fn from(err: BindingError) -> Self {
        RenderError::Binding(err)
    }
}

impl From<PresentError> for RenderError {
    fn from(err: PresentError) -> Self {
        RenderError::Present(err)
    }
}

impl From<ConfigError> for RenderError {
    fn from(err: ConfigError) -> Self {
        RenderError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn resource_error_display() {
        let err = ResourceError::KindMismatch {
            id: 3,
            expected: ResourceKind::StorageBuffer,
            found: ResourceKind::ConstantBuffer,
        };
        assert_eq!(
            format!("{err}"),
            "Resource 3 is a constant buffer, expected a storage buffer"
        );
        let err = ResourceError::NotFound {
            kind: ResourceKind::Texture,
            id: 7,
        };
        assert_eq!(format!("{err}"), "No texture registered with ID 7");
    }

    #[test]
    fn reflection_error_names_the_binding() {
        let err = ReflectionError::NotFound {
            name: "Albedo".to_string(),
            name_hash: 0xdead_beef,
            ty: ShaderBindingType::SampledImage,
        };
        let text = format!("{err}");
        assert!(text.contains("'Albedo'"));
        assert!(text.contains("0xdeadbeef"));
        assert!(text.contains("SampledImage"));
    }

    #[test]
    fn binding_error_wraps_sources() {
        let err: BindingError = ReflectionError::SetMismatch {
            name: "Lights".to_string(),
            ty: ShaderBindingType::StorageBuffer,
            committed_set: 1,
            found_set: 2,
        }
        .into();
        assert!(err.source().is_some());
        assert!(format!("{err}").contains("set 2"));

        let err = BindingError::SlotMismatch {
            slot: DescriptorSetSlot::PerDraw,
            committed_set: 1,
        };
        assert!(err.source().is_none());
        assert!(format!("{err}").contains("(set 2)"));
    }

    #[test]
    fn render_error_conversions() {
        let err: RenderError = PresentError::AcquisitionFailed("out of date".into()).into();
        assert!(matches!(err, RenderError::Present(_)));
        assert_eq!(
            format!("{err}"),
            "Present error: Failed to acquire swapchain image: out of date"
        );

        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: RenderError = ConfigError::from(parse).into();
        assert!(err.source().is_some());
    }
}
