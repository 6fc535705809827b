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

//! A declarative macro for small, `Copy` flag sets.

/// Declares a flag-set newtype over an unsigned integer.
///
/// The generated type offers `EMPTY`, one constant per declared flag, the
/// usual set queries and the bitwise operators. Its `Debug` output lists the
/// set flag names, e.g. `DepthClearFlags(DEPTH | STENCIL)`.
#[macro_export]
#[doc(hidden)]
macro_rules! strata_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// The set with no flag raised.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a set from raw bits, keeping undeclared bits as-is.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits of this set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` when no flag is raised.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// `true` when every flag of `other` is raised in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// `true` when at least one flag of `other` is raised in `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Raises the flags of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl ::core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl ::core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl ::core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                let mut remaining = self.bits;
                let mut separator = "";
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        write!(f, "{}{}", separator, stringify!($flag_name))?;
                        remaining &= !$flag_value;
                        separator = " | ";
                    }
                )*
                if remaining != 0 {
                    write!(f, "{}{:#x}", separator, remaining)?;
                } else if self.bits == 0 {
                    write!(f, "EMPTY")?;
                }
                write!(f, ")")
            }
        }
    };
}
