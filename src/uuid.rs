use std::{fmt, str};

use fstr::FStr;

use crate::error::{Error, Field};

/// Represents a Universally Unique IDentifier.
///
/// This is the plain 16-byte container. It knows nothing about the meaning of its bytes beyond
/// the variant and version fields; see [`TimeUuid`](crate::TimeUuid) for the time-based layout.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Creates an object from a 16-byte big-endian array.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates an object from a byte slice that must be exactly 16 bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] if `bytes` is not 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        <[u8; 16]>::try_from(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidLength {
                field: Field::Uuid,
                actual: bytes.len(),
            })
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Reports the variant field value of the UUID or, if appropriate, "NIL" or "MAX".
    pub const fn variant(&self) -> Variant {
        if self.0[8] < 0x80 {
            if u128::from_be_bytes(self.0) == 0 {
                Variant::VarNil
            } else {
                Variant::Var0
            }
        } else if self.0[8] < 0xc0 {
            Variant::Var10
        } else if self.0[8] < 0xe0 {
            Variant::Var110
        } else if u128::from_be_bytes(self.0) == u128::MAX {
            Variant::VarMax
        } else {
            Variant::VarReserved
        }
    }

    /// Returns the version field value of the UUID or `None` if the UUID does not have the
    /// variant field value of `10`.
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::Uuid;
    ///
    /// let x = "b4cc8000-a838-11ee-8102-686f73743031".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "b4cc8000-a838-11ee-8102-686f73743031");
    /// assert_eq!(format!("{}", y), "b4cc8000-a838-11ee-8102-686f73743031");
    /// # Ok::<(), timeuuid::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        encode_canonical(&self.0)
    }
}

/// The shared interface of 16-byte identifier types: raw byte access plus the canonical
/// 8-4-4-4-12 textual form.
///
/// Implemented by both [`Uuid`] and [`TimeUuid`](crate::TimeUuid), so code that only stores,
/// prints, or parses identifiers can be written once for either.
pub trait Identifier: Copy + Eq + From<[u8; 16]> {
    /// Returns a reference to the underlying 16-byte array.
    fn to_bytes_ref(&self) -> &[u8; 16];

    /// Returns the canonical lowercase string representation.
    fn to_canonical(&self) -> FStr<36> {
        encode_canonical(self.to_bytes_ref())
    }

    /// Parses the 8-4-4-4-12 hexadecimal string representation (case insensitive).
    fn parse_canonical(src: &str) -> Result<Self, ParseError> {
        decode_canonical(src).map(Self::from)
    }
}

impl Identifier for Uuid {
    fn to_bytes_ref(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Tests if a string is in the 8-4-4-4-12 hexadecimal form, in any letter case.
///
/// The check is purely syntactic: the version and variant fields are not inspected.
///
/// # Examples
///
/// ```rust
/// assert!(timeuuid::is_valid_format("00000000-0000-0000-0000-000000000000"));
/// assert!(!timeuuid::is_valid_format("00000000-0000-0000-0000000000000000"));
/// ```
pub fn is_valid_format(src: &str) -> bool {
    decode_canonical(src).is_ok()
}

pub(crate) fn encode_canonical(bytes: &[u8; 16]) -> FStr<36> {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    let mut buffer = [0u8; 36];
    let mut j = 0;
    for (i, e) in bytes.iter().enumerate() {
        buffer[j] = DIGITS[(e >> 4) as usize];
        buffer[j + 1] = DIGITS[(e & 15) as usize];
        j += 2;
        if i == 3 || i == 5 || i == 7 || i == 9 {
            buffer[j] = b'-';
            j += 1;
        }
    }
    FStr::from_bytes(buffer).expect("hex digits and hyphens are valid UTF-8")
}

pub(crate) fn decode_canonical(src: &str) -> Result<[u8; 16], ParseError> {
    const ERR: ParseError = ParseError {};
    let mut dst = [0u8; 16];
    let mut iter = src.chars();
    for (i, e) in dst.iter_mut().enumerate() {
        let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
        let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
        *e = (hi << 4) | lo;
        if (i == 3 || i == 5 || i == 7 || i == 9) && iter.next().ok_or(ERR)? != '-' {
            return Err(ERR);
        }
    }
    if iter.next().is_none() {
        Ok(dst)
    } else {
        Err(ERR)
    }
}

/// Represents the variant field values.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variant {
    /// The Nil UUID.
    VarNil,
    /// The variant field value of `0`.
    Var0,
    /// The variant field value of `10`, used by RFC 4122 identifiers.
    Var10,
    /// The variant field value of `110`.
    Var110,
    /// The reserved variant field value of `111`.
    VarReserved,
    /// The Max UUID.
    VarMax,
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        decode_canonical(src).map(Self)
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl TryFrom<&[u8]> for Uuid {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("invalid string representation")]
pub struct ParseError {}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            Self::Value::from_slice(value).map_err(de::Error::custom)
        }
    }

}
