use crate::error::{Error, Field};

/// Caller-supplied value for a fixed-width field (node identifier or clock sequence).
///
/// A field is either given as raw bytes, given as text whose characters each map to one byte by
/// character code (e.g. `"host01"` for a node identifier), or left to the generator's random
/// number generator.
///
/// # Examples
///
/// ```rust
/// use timeuuid::IdInput;
///
/// assert_eq!(IdInput::from("ab"), IdInput::Text("ab"));
/// assert_eq!(IdInput::from(&[0x01u8, 0x02]), IdInput::Bytes(&[0x01, 0x02]));
/// assert_eq!(IdInput::default(), IdInput::Random);
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum IdInput<'a> {
    /// Raw bytes that must match the field width exactly.
    Bytes(&'a [u8]),
    /// Text of exactly as many characters as the field width, each in `U+0000..=U+00FF`.
    Text(&'a str),
    /// Draw the field from the generator's random number generator.
    #[default]
    Random,
}

impl IdInput<'_> {
    /// Resolves the input into a fixed-width array, or `None` if the field is to be drawn at
    /// random.
    pub(crate) fn resolve<const N: usize>(self, field: Field) -> Result<Option<[u8; N]>, Error> {
        debug_assert_eq!(field.width(), N);
        match self {
            Self::Bytes(bytes) => <[u8; N]>::try_from(bytes)
                .map(Some)
                .map_err(|_| Error::InvalidLength {
                    field,
                    actual: bytes.len(),
                }),
            Self::Text(text) => {
                let actual = text.chars().count();
                if actual != N {
                    return Err(Error::InvalidLength { field, actual });
                }
                let mut dst = [0u8; N];
                for (e, c) in dst.iter_mut().zip(text.chars()) {
                    *e = u8::try_from(c).map_err(|_| Error::NonByteCharacter { field, found: c })?;
                }
                Ok(Some(dst))
            }
            Self::Random => Ok(None),
        }
    }
}

impl<'a> From<&'a [u8]> for IdInput<'a> {
    fn from(src: &'a [u8]) -> Self {
        Self::Bytes(src)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for IdInput<'a> {
    fn from(src: &'a [u8; N]) -> Self {
        Self::Bytes(src)
    }
}

impl<'a> From<&'a str> for IdInput<'a> {
    fn from(src: &'a str) -> Self {
        Self::Text(src)
    }
}

impl<'a, T: Into<IdInput<'a>>> From<Option<T>> for IdInput<'a> {
    fn from(src: Option<T>) -> Self {
        src.map_or(Self::Random, Into::into)
    }
}
