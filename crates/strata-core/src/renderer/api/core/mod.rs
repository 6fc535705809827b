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

//! Renderer-wide constants and configuration.

/// The number of frames that can be in flight at once.
///
/// Frame indices handed to `MarkFrameStart`, `BindDescriptorSet` and the
/// per-frame buffers are always below this value.
pub const MAX_FRAMES_IN_FLIGHT: u32 = 2;

pub mod settings;

pub use self::settings::*;
