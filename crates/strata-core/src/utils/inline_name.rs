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

//! Fixed-capacity, inline UTF-8 strings.
//!
//! Command payloads must be plain `Copy` data with no heap ownership, so
//! short labels (debug markers, binding names kept for diagnostics) are stored
//! inline in a byte array instead of a `String`.

use std::fmt;

/// A UTF-8 string of fewer than `N` bytes stored inline.
///
/// One byte of the capacity is reserved, so an `InlineName<16>` holds at most
/// 15 bytes of text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineName<const N: usize> {
    bytes: [u8; N],
    len: u8,
}

impl<const N: usize> InlineName<N> {
    /// The maximum number of bytes of text this name can hold.
    pub const MAX_LEN: usize = N - 1;

    /// Stores `text` if it is strictly shorter than `N` bytes.
    ///
    /// Returns `None` without copying anything otherwise.
    pub fn new(text: &str) -> Option<Self> {
        if text.len() > Self::MAX_LEN || Self::MAX_LEN > u8::MAX as usize {
            return None;
        }
        let mut bytes = [0u8; N];
        bytes[..text.len()].copy_from_slice(text.as_bytes());
        Some(Self {
            bytes,
            len: text.len() as u8,
        })
    }

    /// Stores the longest prefix of `text` that fits, cut on a character boundary.
    pub fn truncated(text: &str) -> Self {
        let mut end = text.len().min(Self::MAX_LEN).min(u8::MAX as usize);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0u8; N];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self {
            bytes,
            len: end as u8,
        }
    }

    /// The stored text.
    pub fn as_str(&self) -> &str {
        // Construction only ever copies whole characters.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    /// Length of the stored text in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// `true` if the stored text is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for InlineName<N> {
    fn default() -> Self {
        Self {
            bytes: [0u8; N],
            len: 0,
        }
    }
}

impl<const N: usize> fmt::Debug for InlineName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for InlineName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Name16 = InlineName<16>;

    #[test]
    fn accepts_up_to_fifteen_bytes() {
        let name = Name16::new("fifteen_chars__").unwrap();
        assert_eq!(name.len(), 15);
        assert_eq!(name.as_str(), "fifteen_chars__");
    }

    #[test]
    fn rejects_sixteen_bytes_or_more() {
        assert!(Name16::new("sixteen_chars___").is_none());
        assert!(Name16::new("a much longer marker name").is_none());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 14 ASCII bytes followed by a two-byte character.
        let name = Name16::truncated("abcdefghijklmné");
        assert_eq!(name.as_str(), "abcdefghijklmn");
        assert_eq!(Name16::truncated("short").as_str(), "short");
    }

    #[test]
    fn formatting() {
        let name = Name16::new("Shadows").unwrap();
        assert_eq!(format!("{name}"), "Shadows");
        assert_eq!(format!("{name:?}"), "\"Shadows\"");
        assert!(Name16::default().is_empty());
    }
}
