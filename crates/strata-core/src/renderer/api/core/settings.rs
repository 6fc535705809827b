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

//! Renderer configuration, loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::renderer::error::ConfigError;

/// A 2D extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent2d {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Sizes and switches of the renderer.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "command_capacity": 16384, "log_filter": "strata_core=debug" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Commands a single command list can record per frame.
    pub command_capacity: usize,
    /// Descriptors a single command list can copy per frame.
    pub descriptor_capacity: usize,
    /// Descriptor sets the backend can allocate per frame in flight.
    pub descriptor_sets_per_frame: usize,
    /// Size of the swapchain images.
    pub swapchain_extent: Extent2d,
    /// Number of swapchain images.
    pub swapchain_image_count: u32,
    /// Default `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command_capacity: 4096,
            descriptor_capacity: 8192,
            descriptor_sets_per_frame: 1024,
            swapchain_extent: Extent2d {
                width: 1280,
                height: 720,
            },
            swapchain_image_count: 3,
            log_filter: "info".to_string(),
        }
    }
}

impl RendererConfig {
    /// Parses a config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loading renderer config from '{}'", path.display());
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.command_capacity == 0 {
            return Err(ConfigError::Invalid(
                "command_capacity must be at least 1".to_string(),
            ));
        }
        if self.descriptor_sets_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "descriptor_sets_per_frame must be at least 1".to_string(),
            ));
        }
        if self.swapchain_image_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "swapchain_image_count must be at least 2, got {}",
                self.swapchain_image_count
            )));
        }
        if self.swapchain_extent.width == 0 || self.swapchain_extent.height == 0 {
            return Err(ConfigError::Invalid(
                "swapchain_extent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
