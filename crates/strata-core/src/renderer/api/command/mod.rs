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

//! Deferred command recording and replay.
//!
//! - **[`list`]**: the [`CommandList`] recording surface.
//! - **[`recorded`]**: the closed set of recorded [`Command`]s and their payloads.
//! - **[`executor`]**: the single replay routine behind [`CommandList::execute`].

pub mod executor;
pub mod list;
pub mod recorded;

pub use self::executor::ExecutionStats;
pub use self::list::*;
pub use self::recorded::*;
