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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`core`]**: Renderer-wide constants and configuration.
//! - **[`resource`]**: Resource handles and their creation descriptors.
//! - **[`descriptor`]**: Binding requests and the sets that group them.
//! - **[`pipeline`]**: Pipeline descriptions and shader reflection.
//! - **[`command`]**: Command recording and replay.
//! - **[`util`]**: Generic enums and flag sets.

pub mod command;
pub mod core;
pub mod descriptor;
pub mod pipeline;
pub mod resource;
pub mod util;
