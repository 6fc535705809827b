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

//! A typed, frame-scoped bump arena.
//!
//! A [`FrameArena`] hands out [`ArenaSlice`] handles for runs of `Copy`
//! values. Storage is reserved once at construction and released all at once
//! by [`FrameArena::reset`], which also advances the arena's generation so
//! that handles from an earlier frame can never be read again.
//!
//! Running out of capacity is a sizing error, not a runtime condition, and is
//! reported through [`fatal!`](crate::fatal).

use std::fmt;
use std::marker::PhantomData;

use crate::fatal;

/// A handle to `len` contiguous values inside a [`FrameArena`].
///
/// The handle is only valid for the arena and generation that produced it.
pub struct ArenaSlice<T> {
    start: u32,
    len: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaSlice<T> {
    /// Number of values referenced by this handle.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// `true` if the handle references no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The arena generation this handle belongs to.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls so the handle stays `Copy` whatever `T` is.
impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> PartialEq for ArenaSlice<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len && self.generation == other.generation
    }
}

impl<T> Eq for ArenaSlice<T> {}

impl<T> fmt::Debug for ArenaSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaSlice")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("generation", &self.generation)
            .finish()
    }
}

/// A fixed-capacity arena of `T` values, reset once per frame.
pub struct FrameArena<T: Copy> {
    label: &'static str,
    items: Vec<T>,
    capacity: usize,
    generation: u32,
}

impl<T: Copy> FrameArena<T> {
    /// Creates an arena able to hold `capacity` values between resets.
    pub fn with_capacity(label: &'static str, capacity: usize) -> Self {
        if capacity > u32::MAX as usize {
            fatal!("arena '{}' capacity {} exceeds u32 range", label, capacity);
        }
        Self {
            label,
            items: Vec::with_capacity(capacity),
            capacity,
            generation: 0,
        }
    }

    /// Copies a single value into the arena.
    pub fn push(&mut self, value: T) -> ArenaSlice<T> {
        self.reserve(1);
        let start = self.items.len() as u32;
        self.items.push(value);
        self.slice(start, 1)
    }

    /// Deep-copies `values` into the arena.
    ///
    /// Capacity is checked before anything is copied.
    pub fn alloc_slice(&mut self, values: &[T]) -> ArenaSlice<T> {
        self.reserve(values.len());
        let start = self.items.len() as u32;
        self.items.extend_from_slice(values);
        self.slice(start, values.len() as u32)
    }

    /// Reads the values behind `handle`.
    ///
    /// A handle from an earlier generation is fatal.
    pub fn get(&self, handle: ArenaSlice<T>) -> &[T] {
        if handle.generation != self.generation {
            fatal!(
                "arena '{}': stale slice from generation {} read in generation {}",
                self.label,
                handle.generation,
                self.generation
            );
        }
        let start = handle.start as usize;
        match self.items.get(start..start + handle.len as usize) {
            Some(values) => values,
            None => fatal!(
                "arena '{}': slice {}..{} is out of bounds ({} live values)",
                self.label,
                start,
                start + handle.len as usize,
                self.items.len()
            ),
        }
    }

    /// Every value allocated since the last reset, in allocation order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Releases every allocation and starts a new generation.
    pub fn reset(&mut self) {
        self.items.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of values currently allocated.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if nothing was allocated since the last reset.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of values between resets.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values that can still be allocated before the next reset.
    pub fn remaining(&self) -> usize {
        self.capacity - self.items.len()
    }

    /// The current generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn reserve(&self, count: usize) {
        if count > self.remaining() {
            fatal!(
                "arena '{}' exhausted: {} requested, {}/{} in use",
                self.label,
                count,
                self.items.len(),
                self.capacity
            );
        }
    }

    fn slice(&self, start: u32, len: u32) -> ArenaSlice<T> {
        ArenaSlice {
            start,
            len,
            generation: self.generation,
            _marker: PhantomData,
        }
    }
}

impl<T: Copy> fmt::Debug for FrameArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameArena")
            .field("label", &self.label)
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .field("generation", &self.generation)
            .finish()
    }
}
