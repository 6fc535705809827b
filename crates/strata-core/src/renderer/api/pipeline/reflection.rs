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

//! Shader reflection: where each named binding of a pipeline lives.
//!
//! Each shader stage reports the resources it declares as a
//! [`ShaderReflection`]. When a pipeline is created, the stages are merged
//! into one flat list of [`BindInfo`] entries, a [`PipelineReflection`],
//! which is immutable afterwards and shared read-only (behind an `Arc`) by
//! every command list that binds resources for the pipeline.
//!
//! [`reflect_descriptor_set`] is the single lookup used by the descriptor-set
//! builder to turn a recorded binding name into a concrete location.

use std::collections::BTreeMap;

use super::layout::{DescriptorSetLayoutDesc, LayoutBinding};
use crate::renderer::api::descriptor::{binding_name_hash, DescriptorType};
use crate::renderer::api::util::{ShaderStage, ShaderStageFlags};
use crate::renderer::error::ReflectionError;

/// The type of a binding as declared in shader code.
///
/// Both single textures and texture arrays are sampled images on the shader
/// side; the array-ness lives in the binding's element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderBindingType {
    /// A standalone sampler.
    Sampler,
    /// A sampled image (or array of sampled images).
    SampledImage,
    /// A uniform buffer.
    UniformBuffer,
    /// A storage buffer.
    StorageBuffer,
}

impl From<DescriptorType> for ShaderBindingType {
    fn from(ty: DescriptorType) -> Self {
        match ty {
            DescriptorType::Sampler => ShaderBindingType::Sampler,
            DescriptorType::Texture | DescriptorType::TextureArray => {
                ShaderBindingType::SampledImage
            }
            DescriptorType::ConstantBuffer => ShaderBindingType::UniformBuffer,
            DescriptorType::StorageBuffer => ShaderBindingType::StorageBuffer,
        }
    }
}

/// A binding declared by one shader stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderResourceBinding {
    /// The binding name as written in the shader.
    pub name: String,
    /// The shader-side type.
    pub binding_type: ShaderBindingType,
    /// The set index.
    pub set: u32,
    /// The binding index inside the set.
    pub binding: u32,
    /// Number of array elements (1 for non-arrays).
    pub count: u32,
}

impl ShaderResourceBinding {
    /// Creates a non-array binding.
    pub fn new(name: &str, binding_type: ShaderBindingType, set: u32, binding: u32) -> Self {
        Self {
            name: name.to_string(),
            binding_type,
            set,
            binding,
            count: 1,
        }
    }

    /// Sets the array element count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// The bindings declared by one shader stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderReflection {
    /// The stage these bindings come from.
    pub stage: ShaderStage,
    /// The declared bindings.
    pub bindings: Vec<ShaderResourceBinding>,
}

impl ShaderReflection {
    /// Creates an empty reflection for `stage`.
    pub fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            bindings: Vec::new(),
        }
    }

    /// Adds a binding.
    pub fn with_binding(mut self, binding: ShaderResourceBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// Where a named shader binding lives, merged over all stages of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindInfo {
    /// The binding name.
    pub name: String,
    /// The hash of the binding name.
    pub name_hash: u32,
    /// The shader-side type.
    pub binding_type: ShaderBindingType,
    /// The set index.
    pub set: u32,
    /// The binding index inside the set.
    pub binding: u32,
    /// Number of array elements.
    pub count: u32,
    /// Stages that access the binding.
    pub stages: ShaderStageFlags,
}

impl BindInfo {
    /// The native layout entry for this binding.
    pub fn layout_binding(&self) -> LayoutBinding {
        LayoutBinding {
            binding: self.binding,
            binding_type: self.binding_type,
            count: self.count,
            stages: self.stages,
        }
    }
}

/// The result of a successful [`reflect_descriptor_set`] lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectedBinding {
    /// Index of the matching entry in the bind-info list.
    pub bind_info_index: u32,
    /// The set the binding lives in.
    pub set: u32,
    /// The native layout entry of the binding.
    pub layout: LayoutBinding,
}

/// Resolves one recorded binding against a pipeline's bind infos.
///
/// Finds the first entry whose name hash and type both match. If
/// `committed_set` already holds a set index (fixed by an earlier binding of
/// the same descriptor set), the entry must live in that set; otherwise the
/// entry's set becomes the committed one.
///
/// Failures are content errors: they are logged here with the binding name,
/// hash and type, and `committed_set` is left untouched.
pub fn reflect_descriptor_set(
    name: &str,
    name_hash: u32,
    binding_type: ShaderBindingType,
    committed_set: &mut Option<u32>,
    bind_infos: &[BindInfo],
) -> Result<ReflectedBinding, ReflectionError> {
    let found = bind_infos
        .iter()
        .enumerate()
        .find(|(_, info)| info.name_hash == name_hash && info.binding_type == binding_type);

    let Some((index, info)) = found else {
        log::error!(
            "While building a descriptor set, binding '{}' ({:#010x}) of type {:?} has no matching BindInfo in the bound shaders",
            name,
            name_hash,
            binding_type
        );
        return Err(ReflectionError::NotFound {
            name: name.to_string(),
            name_hash,
            ty: binding_type,
        });
    };

    match *committed_set {
        Some(set) if set != info.set => {
            log::error!(
                "While building a descriptor set, BindInfo '{}' of type {:?} matched but lives in set {} instead of the committed set {}",
                info.name,
                info.binding_type,
                info.set,
                set
            );
            return Err(ReflectionError::SetMismatch {
                name: info.name.clone(),
                ty: info.binding_type,
                committed_set: set,
                found_set: info.set,
            });
        }
        Some(_) => {}
        None => *committed_set = Some(info.set),
    }

    Ok(ReflectedBinding {
        bind_info_index: index as u32,
        set: info.set,
        layout: info.layout_binding(),
    })
}

/// The merged reflection table of a graphics pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineReflection {
    bind_infos: Vec<BindInfo>,
    set_layouts: Vec<DescriptorSetLayoutDesc>,
}

impl PipelineReflection {
    /// Merges per-stage reflection into one table.
    ///
    /// A binding declared by several stages at the same location becomes a
    /// single entry visible to all of them, with the largest declared count.
    /// A binding whose name and type reappear at a different location is kept
    /// as a separate entry and reported; lookups resolve to the first one.
    pub fn from_stages(stages: &[ShaderReflection]) -> Self {
        let mut bind_infos: Vec<BindInfo> = Vec::new();

        for stage in stages {
            let stage_flags = ShaderStageFlags::from_stage(stage.stage);
            for declared in &stage.bindings {
                let name_hash = binding_name_hash(&declared.name);
                let existing = bind_infos.iter_mut().find(|info| {
                    info.name_hash == name_hash && info.binding_type == declared.binding_type
                });

                match existing {
                    Some(info) if info.set == declared.set && info.binding == declared.binding => {
                        info.stages |= stage_flags;
                        info.count = info.count.max(declared.count);
                    }
                    Some(info) => {
                        log::warn!(
                            "Binding '{}' is declared at set {} binding {} by {:?} but at set {} binding {} by an earlier stage",
                            declared.name,
                            declared.set,
                            declared.binding,
                            stage.stage,
                            info.set,
                            info.binding
                        );
                        bind_infos.push(Self::bind_info(declared, name_hash, stage_flags));
                    }
                    None => bind_infos.push(Self::bind_info(declared, name_hash, stage_flags)),
                }
            }
        }

        let set_layouts = Self::group_by_set(&bind_infos);
        Self {
            bind_infos,
            set_layouts,
        }
    }

    /// The flat list of bind infos.
    pub fn bind_infos(&self) -> &[BindInfo] {
        &self.bind_infos
    }

    /// The layouts of every set the pipeline uses, ordered by set index.
    pub fn set_layouts(&self) -> &[DescriptorSetLayoutDesc] {
        &self.set_layouts
    }

    /// The layout of one set.
    pub fn set_layout(&self, set: u32) -> Option<&DescriptorSetLayoutDesc> {
        self.set_layouts.iter().find(|layout| layout.set == set)
    }

    /// `true` if the pipeline declares no bindings.
    pub fn is_empty(&self) -> bool {
        self.bind_infos.is_empty()
    }

    fn bind_info(
        declared: &ShaderResourceBinding,
        name_hash: u32,
        stages: ShaderStageFlags,
    ) -> BindInfo {
        BindInfo {
            name: declared.name.clone(),
            name_hash,
            binding_type: declared.binding_type,
            set: declared.set,
            binding: declared.binding,
            count: declared.count,
            stages,
        }
    }

    fn group_by_set(bind_infos: &[BindInfo]) -> Vec<DescriptorSetLayoutDesc> {
        let mut sets: BTreeMap<u32, BTreeMap<u32, LayoutBinding>> = BTreeMap::new();
        for info in bind_infos {
            sets.entry(info.set)
                .or_default()
                .entry(info.binding)
                .or_insert_with(|| info.layout_binding());
        }
        sets.into_iter()
            .map(|(set, bindings)| DescriptorSetLayoutDesc {
                set,
                bindings: bindings.into_values().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_pipeline() -> PipelineReflection {
        let vertex = ShaderReflection::new(ShaderStage::Vertex)
            .with_binding(ShaderResourceBinding::new(
                "_viewData",
                ShaderBindingType::UniformBuffer,
                1,
                0,
            ))
            .with_binding(ShaderResourceBinding::new(
                "_modelData",
                ShaderBindingType::StorageBuffer,
                2,
                0,
            ));
        let fragment = ShaderReflection::new(ShaderStage::Fragment)
            .with_binding(ShaderResourceBinding::new(
                "_viewData",
                ShaderBindingType::UniformBuffer,
                1,
                0,
            ))
            .with_binding(ShaderResourceBinding::new(
                "_sampler",
                ShaderBindingType::Sampler,
                2,
                1,
            ))
            .with_binding(
                ShaderResourceBinding::new("_textures", ShaderBindingType::SampledImage, 2, 2)
                    .with_count(4),
            );
        PipelineReflection::from_stages(&[vertex, fragment])
    }

    #[test]
    fn merge_unions_stage_visibility() {
        let reflection = forward_pipeline();
        assert_eq!(reflection.bind_infos().len(), 4);

        let view = &reflection.bind_infos()[0];
        assert_eq!(view.name, "_viewData");
        assert_eq!(view.stages, ShaderStageFlags::ALL_GRAPHICS);
        assert_eq!(reflection.bind_infos()[1].stages, ShaderStageFlags::VERTEX);
    }

    #[test]
    fn layouts_are_grouped_by_set() {
        let reflection = forward_pipeline();
        let sets: Vec<u32> = reflection.set_layouts().iter().map(|l| l.set).collect();
        assert_eq!(sets, vec![1, 2]);

        let per_draw = reflection.set_layout(2).unwrap();
        let bindings: Vec<u32> = per_draw.bindings.iter().map(|b| b.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2]);
        assert_eq!(per_draw.binding(2).unwrap().count, 4);
        assert!(reflection.set_layout(0).is_none());
    }

    #[test]
    fn conflicting_locations_keep_first_for_lookup() {
        let vertex = ShaderReflection::new(ShaderStage::Vertex).with_binding(
            ShaderResourceBinding::new("_data", ShaderBindingType::StorageBuffer, 1, 0),
        );
        let fragment = ShaderReflection::new(ShaderStage::Fragment).with_binding(
            ShaderResourceBinding::new("_data", ShaderBindingType::StorageBuffer, 2, 3),
        );
        let reflection = PipelineReflection::from_stages(&[vertex, fragment]);
        assert_eq!(reflection.bind_infos().len(), 2);

        let mut set = None;
        let found = reflect_descriptor_set(
            "_data",
            binding_name_hash("_data"),
            ShaderBindingType::StorageBuffer,
            &mut set,
            reflection.bind_infos(),
        )
        .unwrap();
        assert_eq!(found.bind_info_index, 0);
        assert_eq!(set, Some(1));
    }

    #[test]
    fn lookup_commits_the_first_set() {
        let reflection = forward_pipeline();
        let mut set = None;
        let found = reflect_descriptor_set(
            "_textures",
            binding_name_hash("_textures"),
            ShaderBindingType::SampledImage,
            &mut set,
            reflection.bind_infos(),
        )
        .unwrap();

        assert_eq!(set, Some(2));
        assert_eq!(found.bind_info_index, 3);
        assert_eq!(
            found.layout,
            LayoutBinding {
                binding: 2,
                binding_type: ShaderBindingType::SampledImage,
                count: 4,
                stages: ShaderStageFlags::FRAGMENT,
            }
        );
    }

    #[test]
    fn lookup_is_deterministic() {
        let reflection = forward_pipeline();
        let lookup = || {
            let mut set = Some(2);
            reflect_descriptor_set(
                "_sampler",
                binding_name_hash("_sampler"),
                ShaderBindingType::Sampler,
                &mut set,
                reflection.bind_infos(),
            )
        };
        assert_eq!(lookup(), lookup());
    }

    #[test]
    fn unknown_name_fails_without_touching_the_committed_set() {
        let reflection = forward_pipeline();
        for initial in [None, Some(2)] {
            let mut set = initial;
            let err = reflect_descriptor_set(
                "_missing",
                binding_name_hash("_missing"),
                ShaderBindingType::UniformBuffer,
                &mut set,
                reflection.bind_infos(),
            )
            .unwrap_err();
            assert!(matches!(err, ReflectionError::NotFound { .. }));
            assert_eq!(set, initial);
        }
    }

    #[test]
    fn type_must_match_as_well_as_name() {
        let fragment = ShaderReflection::new(ShaderStage::Fragment).with_binding(
            ShaderResourceBinding::new("Albedo", ShaderBindingType::Sampler, 1, 0),
        );
        let reflection = PipelineReflection::from_stages(&[fragment]);
        let mut set = None;
        let err = reflect_descriptor_set(
            "Albedo",
            binding_name_hash("Albedo"),
            ShaderBindingType::from(DescriptorType::Texture),
            &mut set,
            reflection.bind_infos(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReflectionError::NotFound {
                name: "Albedo".to_string(),
                name_hash: binding_name_hash("Albedo"),
                ty: ShaderBindingType::SampledImage,
            }
        );
        assert_eq!(set, None);
    }

    #[test]
    fn set_mismatch_is_an_error() {
        let reflection = forward_pipeline();
        let mut set = Some(2);
        let err = reflect_descriptor_set(
            "_viewData",
            binding_name_hash("_viewData"),
            ShaderBindingType::UniformBuffer,
            &mut set,
            reflection.bind_infos(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReflectionError::SetMismatch {
                name: "_viewData".to_string(),
                ty: ShaderBindingType::UniformBuffer,
                committed_set: 2,
                found_set: 1,
            }
        );
        assert_eq!(set, Some(2));
    }
}
