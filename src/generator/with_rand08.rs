//! Integration with `rand` (v0.8) crate.

use super::{Rng, StdSystemTime, TimeUuidGenerator};
use rand::RngCore;

/// An adapter that implements [`Rng`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> Rng for Adapter<T> {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }
}

impl<T: RngCore> TimeUuidGenerator<Adapter<T>, StdSystemTime> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.8) crate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::TimeUuidGenerator;
    ///
    /// let mut g = TimeUuidGenerator::with_rand08(rand::rngs::OsRng);
    /// println!("{}", g.now());
    /// ```
    pub const fn with_rand08(rng: T) -> Self {
        Self::new(Adapter(rng))
    }
}
