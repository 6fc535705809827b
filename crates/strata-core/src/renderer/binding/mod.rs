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

//! Reflection-driven descriptor binding.
//!
//! The [`DescriptorSetBuilder`] turns the descriptors recorded by a
//! `BindDescriptorSet` command into one native descriptor set: every
//! descriptor is located through the pipeline's reflection table, its
//! resource is resolved to a native object through the backend, and the
//! resulting [`DescriptorWrite`]s are finalized with a [`DescriptorLifetime`].

pub mod builder;
pub mod resolved;

pub use self::builder::DescriptorSetBuilder;
pub use self::resolved::*;
