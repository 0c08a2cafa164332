//! Newtypes for the RTP header identifiers.
//!
//! Sequence number, timestamp and SSRC are all plain unsigned integers on the
//! wire; wrapping them keeps them from being swapped at call sites.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Generates a transparent wrapper around an unsigned wire integer.
macro_rules! wire_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty; $width:literal) => $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            /// Wrapping addition
            #[inline]
            pub const fn wrapping_add(self, rhs: $inner) -> Self {
                Self(self.0.wrapping_add(rhs))
            }

            /// Big-endian wire form
            #[inline]
            pub const fn to_be_bytes(self) -> [u8; $width] {
                self.0.to_be_bytes()
            }

            /// Reads the big-endian wire form
            #[inline]
            pub const fn from_be_bytes(bytes: [u8; $width]) -> Self {
                Self(<$inner>::from_be_bytes(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<$inner> for $name {
            #[inline]
            fn partial_cmp(&self, other: &$inner) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }
    };
}

wire_newtype!(
    /// RTP sequence number. Receivers accept only strictly increasing values.
    SequenceNumber(u16; 2) => "SN"
);

wire_newtype!(
    /// RTP timestamp.
    Timestamp(u32; 4) => "TS"
);

wire_newtype!(
    /// RTP synchronization source identifier.
    Ssrc(u32; 4) => "SSRC"
);

impl SequenceNumber {
    /// Value a receiver compares the first packet of a session against.
    pub const UNSEEN: Self = Self::new(0);

    /// The following sequence number, wrapping at 16 bits.
    #[inline]
    pub const fn next(self) -> Self {
        self.wrapping_add(1)
    }
}
