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

//! Logger initialization.

use env_logger::{Builder, Env};
use strata_core::RendererConfig;

/// Installs `env_logger` as the `log` backend.
///
/// `RUST_LOG` wins when set; otherwise the config's `log_filter` applies.
/// Calling this more than once keeps the first logger.
pub fn init(config: &RendererConfig) {
    let result = Builder::from_env(Env::default().default_filter_or(config.log_filter.as_str()))
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialized, keeping the existing one");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        let config = RendererConfig::default();
        init(&config);
        init(&config);
        log::info!("logger installed");
    }
}
