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

//! The fatal-assertion macro used for caller contract violations.
//!
//! Contract violations (unbalanced markers, unbalanced pipeline scopes,
//! exhausted arenas, invalid handles handed to a draw) are programming errors
//! that cannot be continued past. [`fatal!`](crate::fatal) reports them through
//! the `log` facade at `error` level so they reach whatever logger the host
//! installed, then panics with the same message.

/// Logs an error through `log` and panics with the same message.
///
/// Accepts the same arguments as [`format!`].
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {{
        let message = ::std::format!($($arg)+);
        $crate::__log::error!("{}", message);
        ::std::panic!("{}", message)
    }};
}
