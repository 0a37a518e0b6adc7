//! Error types reported by constructors that take caller-supplied bytes.

use std::fmt;

use thiserror::Error;

/// Broad category of an [`Error`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A caller-supplied value has the wrong shape, e.g. a byte sequence of the wrong length.
    InvalidArgument,
}

/// Names the fixed-width field an [`Error`] refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Field {
    /// The whole 16-byte identifier.
    Uuid,
    /// The 6-byte node identifier.
    NodeId,
    /// The 2-byte clock sequence.
    ClockId,
}

impl Field {
    /// Returns the number of bytes the field occupies.
    pub const fn width(&self) -> usize {
        match self {
            Self::Uuid => 16,
            Self::NodeId => 6,
            Self::ClockId => 2,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uuid => "identifier",
            Self::NodeId => "node identifier",
            Self::ClockId => "clock identifier",
        })
    }
}

/// Error constructing an identifier from caller-supplied bytes or text.
///
/// Every variant belongs to [`ErrorKind::InvalidArgument`]. Validation runs before any generator
/// state is touched, so a failed call leaves the generator exactly as it was.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The supplied bytes or characters do not match the field width.
    #[error("{field} must have {} bytes, got {actual}", .field.width())]
    InvalidLength { field: Field, actual: usize },

    /// A text identifier contains a character that does not fit in a single byte.
    #[error("{field} must consist of one-byte characters, got {found:?}")]
    NonByteCharacter { field: Field, found: char },
}

impl Error {
    /// Returns the category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLength { .. } | Self::NonByteCharacter { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Returns the field the error refers to.
    pub const fn field(&self) -> Field {
        match self {
            Self::InvalidLength { field, .. } | Self::NonByteCharacter { field, .. } => *field,
        }
    }
}
