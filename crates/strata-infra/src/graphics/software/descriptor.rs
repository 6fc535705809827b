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

//! Descriptor pools of the software backend.

use strata_core::renderer::binding::{DescriptorLifetime, DescriptorWrite};
use strata_core::renderer::{GraphicsPipelineId, ResourceError, MAX_FRAMES_IN_FLIGHT};

use super::native::{NativeBuffer, NativeDescriptorSet, NativeImageView, NativeSampler};

/// A descriptor write in the software backend's native types.
pub type SoftwareWrite = DescriptorWrite<NativeSampler, NativeImageView, NativeBuffer>;

/// What a native descriptor set holds.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorSetContents {
    /// The pipeline whose layout the set was allocated for.
    pub pipeline: GraphicsPipelineId,
    /// The set index within that layout.
    pub set: u32,
    /// The written entries.
    pub writes: Vec<SoftwareWrite>,
}

#[derive(Debug, Default)]
struct FramePool {
    sets: Vec<DescriptorSetContents>,
    epoch: u64,
}

/// One pool per frame in flight plus a persistent pool.
///
/// Per-frame sets stay valid until their frame index starts again, at which
/// point the whole pool is recycled in one go.
#[derive(Debug)]
pub struct DescriptorPool {
    frames: Vec<FramePool>,
    persistent: Vec<DescriptorSetContents>,
    current_frame: u32,
    sets_per_frame: usize,
}

impl DescriptorPool {
    /// Creates the pools. Each per-frame pool holds `sets_per_frame` sets.
    pub fn new(sets_per_frame: usize) -> Self {
        Self {
            frames: (0..MAX_FRAMES_IN_FLIGHT).map(|_| FramePool::default()).collect(),
            persistent: Vec::new(),
            current_frame: 0,
            sets_per_frame,
        }
    }

    /// Makes `frame_index` current and recycles its pool.
    pub fn set_frame(&mut self, frame_index: u32) {
        let frame = frame_index % MAX_FRAMES_IN_FLIGHT;
        let pool = &mut self.frames[frame as usize];
        log::trace!(
            "DescriptorPool: Recycling {} set(s) of frame {}",
            pool.sets.len(),
            frame
        );
        pool.sets.clear();
        pool.epoch += 1;
        self.current_frame = frame;
    }

    /// The frame-in-flight index new per-frame sets are allocated for.
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Stores `contents` in the pool serving `lifetime`.
    /// ## Errors
    /// * `ResourceError::PoolExhausted` - If the current frame's pool is full.
    pub fn allocate(
        &mut self,
        contents: DescriptorSetContents,
        lifetime: DescriptorLifetime,
    ) -> Result<NativeDescriptorSet, ResourceError> {
        match lifetime {
            DescriptorLifetime::PerFrame => {
                let frame = self.current_frame;
                let pool = &mut self.frames[frame as usize];
                if pool.sets.len() >= self.sets_per_frame {
                    return Err(ResourceError::PoolExhausted {
                        pool: "per-frame descriptor sets",
                        capacity: self.sets_per_frame,
                    });
                }
                pool.sets.push(contents);
                Ok(NativeDescriptorSet::PerFrame {
                    frame,
                    epoch: pool.epoch,
                    index: (pool.sets.len() - 1) as u32,
                })
            }
            DescriptorLifetime::Persistent => {
                self.persistent.push(contents);
                Ok(NativeDescriptorSet::Persistent {
                    index: (self.persistent.len() - 1) as u32,
                })
            }
        }
    }

    /// Replaces the writes of a persistent set.
    pub fn update_persistent(
        &mut self,
        set: NativeDescriptorSet,
        writes: Vec<SoftwareWrite>,
    ) -> Result<(), ResourceError> {
        let NativeDescriptorSet::Persistent { index } = set else {
            return Err(ResourceError::BackendError(format!(
                "Descriptor set {set:?} is not persistent"
            )));
        };
        let contents = self
            .persistent
            .get_mut(index as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        contents.writes = writes;
        Ok(())
    }

    /// The contents of `set`, or `None` once its pool has been recycled.
    pub fn get(&self, set: NativeDescriptorSet) -> Option<&DescriptorSetContents> {
        match set {
            NativeDescriptorSet::PerFrame {
                frame,
                epoch,
                index,
            } => {
                let pool = self.frames.get(frame as usize)?;
                if pool.epoch != epoch {
                    return None;
                }
                pool.sets.get(index as usize)
            }
            NativeDescriptorSet::Persistent { index } => self.persistent.get(index as usize),
        }
    }

    /// The number of sets allocated from the pool of `frame_index`.
    pub fn frame_usage(&self, frame_index: u32) -> usize {
        self.frames[(frame_index % MAX_FRAMES_IN_FLIGHT) as usize]
            .sets
            .len()
    }
}
