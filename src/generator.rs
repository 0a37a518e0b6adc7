//! Time-based UUID generator and related types.

#[cfg(feature = "tracing")]
use tracing::instrument;

use std::time;

use crate::error::{Error, Field};
use crate::input::IdInput;
use crate::time_uuid::{
    is_valid_unix_ts_ms, TimeUuid, MAX_CLOCK_ID, MAX_NODE_ID, MIN_CLOCK_ID, MIN_NODE_ID,
    TICKS_PER_MS,
};

pub mod with_rand08;

/// A trait that defines the minimum random number generator interface for
/// [`TimeUuidGenerator`].
///
/// The random node identifiers and clock sequences are only as unpredictable as this source;
/// use a cryptographically secure generator such as `rand::rngs::OsRng`.
pub trait Rng {
    /// Fills `dest` with random data.
    fn fill_bytes(&mut self, dest: &mut [u8]);
}

/// A trait that defines the minimum system clock interface for [`TimeUuidGenerator`].
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&mut self) -> i64;
}

/// The default [`TimeSource`] that uses [`std::time::SystemTime`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&mut self) -> i64 {
        system_time_to_unix_ts_ms(time::SystemTime::now())
    }
}

/// Converts a [`SystemTime`](time::SystemTime) to Unix milliseconds, rounding towards negative
/// infinity and saturating at the bounds of `i64`.
pub(crate) fn system_time_to_unix_ts_ms(t: time::SystemTime) -> i64 {
    match t.duration_since(time::UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(err) => {
            let before = err.duration();
            let ms = before.as_millis() + u128::from(before.subsec_nanos() % 1_000_000 != 0);
            i64::try_from(ms).map_or(i64::MIN, |ms| -ms)
        }
    }
}

/// Represents a time-based UUID generator that encapsulates the tick counters and guarantees
/// distinct identifiers for up to 10 000 calls within the same millisecond.
///
/// System clocks report milliseconds, while the UUIDv1 timestamp counts 100-nanosecond ticks.
/// The generator fills the sub-millisecond part from one of two independent counters:
///
/// | Timestamp                    | Ticks come from          | Counter behavior                            |
/// | ---------------------------- | ------------------------ | ------------------------------------------- |
/// | Current time ([`now`])       | current-time counter     | Reset to 0 when the millisecond advances    |
/// | Explicit ([`from_unix_ts_ms`]) | argument, else explicit counter | Incremented per call, wraps at 10 000 |
///
/// Keeping the counters apart means that building identifiers for historical timestamps, e.g.
/// range boundaries via [`min`] and [`max`], never disturbs the ticks of live identifiers.
///
/// The generator is a plain value mutated through `&mut self`. The following example shares one
/// across threads using Rust's standard synchronization mechanism.
///
/// # Examples
///
/// ```rust
/// use rand::rngs::OsRng;
/// use std::{sync, thread};
/// use timeuuid::TimeUuidGenerator;
///
/// let g = sync::Arc::new(sync::Mutex::new(TimeUuidGenerator::with_rand08(OsRng)));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.lock().unwrap().now(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
///
/// [`now`]: TimeUuidGenerator::now
/// [`from_unix_ts_ms`]: TimeUuidGenerator::from_unix_ts_ms
/// [`min`]: TimeUuidGenerator::min_for_unix_ts_ms
/// [`max`]: TimeUuidGenerator::max_for_unix_ts_ms
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TimeUuidGenerator<R, T = StdSystemTime> {
    /// Counter for explicit timestamps given without usable ticks.
    ticks: u16,
    /// Counter for current-time generation, valid within `last_timestamp`.
    ticks_for_current_time: u16,
    last_timestamp: i64,

    /// The random number generator used by the generator.
    rng: R,

    /// The system clock used by the generator.
    time: T,
}

impl<R: Default, T: Default> Default for TimeUuidGenerator<R, T> {
    fn default() -> Self {
        Self {
            ticks: 0,
            ticks_for_current_time: 0,
            last_timestamp: i64::MIN,
            rng: R::default(),
            time: T::default(),
        }
    }
}

impl<R: Rng> TimeUuidGenerator<R> {
    /// Creates a generator instance that reads the system clock.
    pub const fn new(rng: R) -> Self {
        Self::with_time_source(rng, StdSystemTime)
    }
}

impl<R: Rng, T: TimeSource> TimeUuidGenerator<R, T> {
    /// Creates a generator instance with a custom clock.
    pub const fn with_time_source(rng: R, time: T) -> Self {
        Self {
            ticks: 0,
            ticks_for_current_time: 0,
            last_timestamp: i64::MIN,
            rng,
            time,
        }
    }

    /// Generates a new identifier from the current time with a random node identifier and clock
    /// sequence.
    ///
    /// # Panics
    ///
    /// Panics if the time source reports a time outside the range a [`TimeUuid`] can carry.
    pub fn now(&mut self) -> TimeUuid {
        self.generate_core(None, None, None, None)
    }

    /// Generates a new identifier from the current time with the given node identifier and
    /// clock sequence.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if `node_id` is
    /// not 6 bytes or characters long or `clock_id` is not 2 bytes or characters long.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::{IdInput, TimeUuidGenerator};
    ///
    /// let mut g = TimeUuidGenerator::with_rand08(rand::rngs::OsRng);
    /// let x = g.now_with("host01".into(), IdInput::Random)?;
    /// assert_eq!(x.node_id_string(), "host01");
    /// # Ok::<(), timeuuid::Error>(())
    /// ```
    pub fn now_with(
        &mut self,
        node_id: IdInput<'_>,
        clock_id: IdInput<'_>,
    ) -> Result<TimeUuid, Error> {
        self.create(None, None, node_id, clock_id)
    }

    /// Generates a new identifier for an explicit Unix timestamp in milliseconds with a random
    /// node identifier and clock sequence.
    ///
    /// `ticks` below 10 000 are used as they are; otherwise the explicit-timestamp counter
    /// supplies them. An out-of-range `unix_ts_ms` falls back to the current time.
    pub fn from_unix_ts_ms(&mut self, unix_ts_ms: i64, ticks: Option<u16>) -> TimeUuid {
        self.generate_core(Some(unix_ts_ms), ticks, None, None)
    }

    /// Generates a new identifier for a [`SystemTime`](time::SystemTime), truncated to
    /// milliseconds, with a random node identifier and clock sequence.
    ///
    /// See [`TimeUuidGenerator::from_unix_ts_ms()`] for the treatment of `ticks`.
    pub fn from_system_time(&mut self, t: time::SystemTime, ticks: Option<u16>) -> TimeUuid {
        self.from_unix_ts_ms(system_time_to_unix_ts_ms(t), ticks)
    }

    /// Generates a new identifier for a `chrono` date-time, truncated to milliseconds.
    ///
    /// See [`TimeUuidGenerator::from_unix_ts_ms()`] for the treatment of `ticks`.
    #[cfg(feature = "chrono")]
    #[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
    pub fn from_date_time<Tz: chrono::TimeZone>(
        &mut self,
        dt: &chrono::DateTime<Tz>,
        ticks: Option<u16>,
    ) -> TimeUuid {
        self.from_unix_ts_ms(dt.timestamp_millis(), ticks)
    }

    /// Returns the smallest identifier for the given timestamp, drawing `ticks` from the
    /// explicit-timestamp counter if not given as in [`TimeUuidGenerator::from_unix_ts_ms()`].
    pub fn min_for_unix_ts_ms(&mut self, unix_ts_ms: i64, ticks: Option<u16>) -> TimeUuid {
        self.generate_core(Some(unix_ts_ms), ticks, Some(MIN_NODE_ID), Some(MIN_CLOCK_ID))
    }

    /// Returns the largest identifier for the given timestamp, drawing `ticks` from the
    /// explicit-timestamp counter if not given as in [`TimeUuidGenerator::from_unix_ts_ms()`].
    pub fn max_for_unix_ts_ms(&mut self, unix_ts_ms: i64, ticks: Option<u16>) -> TimeUuid {
        self.generate_core(Some(unix_ts_ms), ticks, Some(MAX_NODE_ID), Some(MAX_CLOCK_ID))
    }

    /// Generates a new identifier from the full set of optional arguments.
    ///
    /// - `timestamp`: Unix milliseconds; `None` or a value rejected by
    ///   [`is_valid_unix_ts_ms()`](crate::is_valid_unix_ts_ms) selects the current time, whose
    ///   ticks always come from the current-time counter.
    /// - `ticks`: used as is for an explicit timestamp if below 10 000.
    /// - `node_id`, `clock_id`: see [`IdInput`].
    ///
    /// Both identifier inputs are validated before the counters advance.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if `node_id` is
    /// not 6 bytes or characters long or `clock_id` is not 2 bytes or characters long.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::{IdInput, TimeUuidGenerator};
    ///
    /// let mut g = TimeUuidGenerator::with_rand08(rand::rngs::OsRng);
    /// let x = g.create(
    ///     Some(1_704_067_200_000),
    ///     Some(0),
    ///     IdInput::Text("host01"),
    ///     IdInput::Bytes(&[0x01, 0x02]),
    /// )?;
    /// assert_eq!(x.to_string(), "b4cc8000-a838-11ee-8102-686f73743031");
    ///
    /// assert!(g.create(None, None, IdInput::Bytes(&[0; 4]), IdInput::Random).is_err());
    /// # Ok::<(), timeuuid::Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn create(
        &mut self,
        timestamp: Option<i64>,
        ticks: Option<u16>,
        node_id: IdInput<'_>,
        clock_id: IdInput<'_>,
    ) -> Result<TimeUuid, Error> {
        let node_id = node_id.resolve::<6>(Field::NodeId)?;
        let clock_id = clock_id.resolve::<2>(Field::ClockId)?;
        Ok(self.generate_core(timestamp, ticks, node_id, clock_id))
    }

    /// Resolves the timestamp and ticks, fills missing fields with random bytes, and encodes.
    fn generate_core(
        &mut self,
        timestamp: Option<i64>,
        ticks: Option<u16>,
        node_id: Option<[u8; 6]>,
        clock_id: Option<[u8; 2]>,
    ) -> TimeUuid {
        let (unix_ts_ms, ticks) = self.time_with_ticks(timestamp, ticks);
        let node_id = node_id.unwrap_or_else(|| self.random_bytes());
        let clock_id = clock_id.unwrap_or_else(|| self.random_bytes());
        TimeUuid::from_fields(unix_ts_ms, ticks, node_id, clock_id)
    }

    fn time_with_ticks(&mut self, timestamp: Option<i64>, ticks: Option<u16>) -> (i64, u16) {
        if let Some(unix_ts_ms) = timestamp {
            if is_valid_unix_ts_ms(unix_ts_ms) {
                return (unix_ts_ms, self.explicit_ticks(ticks));
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(unix_ts_ms, "timestamp out of range; using current time");
        }

        let unix_ts_ms = self.time.unix_ts_ms();
        self.ticks_for_current_time += 1;
        if self.ticks_for_current_time >= TICKS_PER_MS || unix_ts_ms > self.last_timestamp {
            self.ticks_for_current_time = 0;
            self.last_timestamp = unix_ts_ms;
        }
        (unix_ts_ms, self.ticks_for_current_time)
    }

    fn explicit_ticks(&mut self, ticks: Option<u16>) -> u16 {
        match ticks {
            Some(ticks) if ticks < TICKS_PER_MS => ticks,
            _ => {
                self.ticks = (self.ticks + 1) % TICKS_PER_MS;
                self.ticks
            }
        }
    }

    fn random_bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut bytes = [0u8; N];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }
}

/// Supports operations as an infinite iterator that produces a new identifier from the current
/// time for each call of `next()`.
///
/// # Examples
///
/// ```rust
/// use timeuuid::TimeUuidGenerator;
///
/// TimeUuidGenerator::with_rand08(rand::rngs::OsRng)
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{i}] {e}"));
/// ```
impl<R: Rng, T: TimeSource> Iterator for TimeUuidGenerator<R, T> {
    type Item = TimeUuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.now())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: Rng, T: TimeSource> std::iter::FusedIterator for TimeUuidGenerator<R, T> {}
