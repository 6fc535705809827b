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

//! Native object handles of the software backend.
//!
//! These stand in for the driver objects a GPU backend would hand out. Each
//! one is an opaque number minted by [`SoftwareDevice`](super::SoftwareDevice)
//! that uniquely identifies a view, sampler or buffer for its whole lifetime.

/// A native sampler object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeSampler(pub u64);

/// A native shader-read-only image view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeImageView(pub u64);

/// A native buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeBuffer(pub u64);

/// A native descriptor set, allocated from a [`DescriptorPool`](super::DescriptorPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeDescriptorSet {
    /// A set from the pool of one frame in flight. It stops resolving once
    /// the pool has been recycled past `epoch`.
    PerFrame {
        /// The frame-in-flight index owning the set.
        frame: u32,
        /// The recycle count of that frame's pool at allocation time.
        epoch: u64,
        /// Position of the set in the pool.
        index: u32,
    },
    /// A set that is never recycled.
    Persistent {
        /// Position of the set in the persistent pool.
        index: u32,
    },
}
