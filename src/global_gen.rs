//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::{sync, time};

use crate::{Error, IdInput, TimeUuid};
use inner::GlobalGenInner;

/// Returns the lock handle of process-wide global generator, creating one if none exists.
fn lock_global_gen() -> sync::MutexGuard<'static, GlobalGenInner> {
    static G: sync::OnceLock<sync::Mutex<GlobalGenInner>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("timeuuid: could not lock global generator")
}

/// Generates a time-based UUID from the current time with a random node identifier and clock
/// sequence.
///
/// This function employs a global generator, so identifiers generated within the same
/// millisecond anywhere in the process carry distinct ticks (up to 10 000 per millisecond). On
/// Unix, this function resets the generator when the process ID changes (i.e., upon process
/// forks).
///
/// # Examples
///
/// ```rust
/// let uuid = timeuuid::now();
/// println!("{}", uuid); // e.g., "b4cc8000-a838-11ee-8102-686f73743031"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte array
///
/// let uuid_string: String = timeuuid::now().to_string();
/// ```
pub fn now() -> TimeUuid {
    lock_global_gen().get_mut().now()
}

/// Generates a time-based UUID from the current time with the given node identifier and clock
/// sequence.
///
/// # Errors
///
/// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if `node_id` is not 6
/// bytes or characters long or `clock_id` is not 2 bytes or characters long.
///
/// # Examples
///
/// ```rust
/// let uuid = timeuuid::now_with("host01".into(), "cl".into())?;
/// assert_eq!(uuid.node_id_string(), "host01");
/// # Ok::<(), timeuuid::Error>(())
/// ```
pub fn now_with(node_id: IdInput<'_>, clock_id: IdInput<'_>) -> Result<TimeUuid, Error> {
    lock_global_gen().get_mut().now_with(node_id, clock_id)
}

/// Generates a time-based UUID for an explicit Unix timestamp in milliseconds.
///
/// See [`TimeUuidGenerator::from_unix_ts_ms()`](crate::TimeUuidGenerator::from_unix_ts_ms).
///
/// # Examples
///
/// ```rust
/// let uuid = timeuuid::from_unix_ts_ms(1_704_067_200_000, Some(42));
/// assert_eq!(uuid.unix_ts_ms(), 1_704_067_200_000);
/// assert_eq!(uuid.date_precision().ticks, 42);
/// ```
pub fn from_unix_ts_ms(unix_ts_ms: i64, ticks: Option<u16>) -> TimeUuid {
    lock_global_gen().get_mut().from_unix_ts_ms(unix_ts_ms, ticks)
}

/// Generates a time-based UUID for a [`SystemTime`](time::SystemTime), truncated to
/// milliseconds.
pub fn from_system_time(t: time::SystemTime, ticks: Option<u16>) -> TimeUuid {
    lock_global_gen().get_mut().from_system_time(t, ticks)
}

/// Generates a time-based UUID from the full set of optional arguments.
///
/// See [`TimeUuidGenerator::create()`](crate::TimeUuidGenerator::create).
///
/// # Errors
///
/// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if `node_id` is not 6
/// bytes or characters long or `clock_id` is not 2 bytes or characters long.
pub fn create(
    timestamp: Option<i64>,
    ticks: Option<u16>,
    node_id: IdInput<'_>,
    clock_id: IdInput<'_>,
) -> Result<TimeUuid, Error> {
    lock_global_gen()
        .get_mut()
        .create(timestamp, ticks, node_id, clock_id)
}

/// Returns the smallest identifier for a Unix timestamp in milliseconds.
///
/// Missing `ticks` are drawn from the global explicit-timestamp counter; pass `Some(0)` for the
/// start of the millisecond.
///
/// # Examples
///
/// ```rust
/// let lo = timeuuid::min(1_704_067_200_000, Some(0));
/// let hi = timeuuid::max(1_704_067_200_000, Some(9_999));
/// let x = timeuuid::from_unix_ts_ms(1_704_067_200_000, Some(5_000));
/// assert!(lo <= x && x <= hi);
/// ```
pub fn min(unix_ts_ms: i64, ticks: Option<u16>) -> TimeUuid {
    lock_global_gen().get_mut().min_for_unix_ts_ms(unix_ts_ms, ticks)
}

/// Returns the largest identifier for a Unix timestamp in milliseconds.
///
/// Missing `ticks` are drawn from the global explicit-timestamp counter; pass `Some(9_999)` for
/// the end of the millisecond.
pub fn max(unix_ts_ms: i64, ticks: Option<u16>) -> TimeUuid {
    lock_global_gen().get_mut().max_for_unix_ts_ms(unix_ts_ms, ticks)
}

mod inner {
    use rand::rngs::OsRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    use crate::generator::{Rng, TimeUuidGenerator};

    /// The random number generator of the global generator.
    ///
    /// [`ChaCha12Rng`] seeded by [`OsRng`], reseeded whenever the global generator is reset.
    #[derive(Debug)]
    pub struct GlobalGenRng(ChaCha12Rng);

    impl Rng for GlobalGenRng {
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            rand::RngCore::fill_bytes(&mut self.0, dest);
        }
    }

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct GlobalGenInner {
        #[cfg(unix)]
        pid: u32,
        generator: TimeUuidGenerator<GlobalGenRng>,
    }

    impl Default for GlobalGenInner {
        fn default() -> Self {
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                generator: TimeUuidGenerator::new(GlobalGenRng(
                    ChaCha12Rng::from_rng(OsRng)
                        .expect("timeuuid: could not initialize global generator"),
                )),
            }
        }
    }

    impl GlobalGenInner {
        /// Returns a mutable reference to the inner [`TimeUuidGenerator`] instance, resetting
        /// the generator state on Unix if the process ID has changed.
        pub fn get_mut(&mut self) -> &mut TimeUuidGenerator<GlobalGenRng> {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    old_pid = self.pid,
                    new_pid = std::process::id(),
                    "process forked; resetting global generator"
                );
                *self = Default::default();
            }
            &mut self.generator
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{from_unix_ts_ms, max, min, now, now_with};
    use crate::{IdInput, Variant};

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| now().into()).collect());

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
        let pattern = r"^[0-9a-f]{8}-[0-9a-f]{4}-1[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
        let re = regex::Regex::new(pattern).unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 100k identifiers without collision
    #[test]
    fn generates_100k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Encodes up-to-date timestamp
    #[test]
    fn encodes_up_to_date_timestamp() {
        use std::time;
        for _ in 0..10_000 {
            let ts_now = time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_millis() as i64;
            let timestamp = now().unix_ts_ms();
            assert!((ts_now - timestamp).abs() < 16);
        }
    }

    /// Sets constant bits and random bits properly
    #[test]
    fn sets_constant_bits_and_random_bits_properly() {
        // count '1' of each bit
        let bins = SAMPLES.with(|samples| {
            let mut bins = [0u32; 128];
            for e in samples {
                let mut it = bins.iter_mut().rev();
                for c in e.chars().rev() {
                    if let Some(mut num) = c.to_digit(16) {
                        for _ in 0..4 {
                            *it.next().unwrap() += num & 1;
                            num >>= 1;
                        }
                    }
                }
            }
            bins
        });

        // test if constant bits are all set to 1 or 0
        let n = N_SAMPLES as u32;
        assert_eq!(bins[48], 0, "version bit 48");
        assert_eq!(bins[49], 0, "version bit 49");
        assert_eq!(bins[50], 0, "version bit 50");
        assert_eq!(bins[51], n, "version bit 51");
        assert_eq!(bins[64], n, "variant bit 64");
        assert_eq!(bins[65], 0, "variant bit 65");

        // test if random bits are set to 1 at ~50% probability
        // set margin based on binom dist 99.999% confidence interval
        let margin = 4.417173 * (0.5 * 0.5 / N_SAMPLES as f64).sqrt();
        for i in 66..128 {
            let p = bins[i] as f64 / N_SAMPLES as f64;
            assert!((p - 0.5).abs() < margin, "random bit {i}: {p}");
        }
    }

    /// Sets correct variant and version bits
    #[test]
    fn sets_correct_variant_and_version_bits() {
        for _ in 0..1_000 {
            let e = now();
            assert_eq!(e.as_uuid().variant(), Variant::Var10);
            assert_eq!(e.as_uuid().version(), Some(1));
        }
    }

    /// Generates no duplicate IDs under multithreading
    #[test]
    fn generates_no_duplicate_ids_under_multithreading() -> Result<(), Box<dyn std::error::Error>> {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::Builder::new()
                .spawn(move || {
                    for _ in 0..2_000 {
                        tx.send(now()).unwrap();
                    }
                })
                .map_err(|err| format!("failed to spawn thread: {:?}", err))?;
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert(e);
        }

        assert_eq!(s.len(), 4 * 2_000);
        Ok(())
    }

    /// Brackets explicit-time identifiers between boundaries
    #[test]
    fn brackets_explicit_time_identifiers_between_boundaries() {
        let ts = 1_704_067_200_000;
        let lo = min(ts, Some(0));
        let hi = max(ts, Some(9_999));
        for ticks in [0, 1, 9_998, 9_999] {
            let e = from_unix_ts_ms(ts, Some(ticks));
            assert!(lo <= e && e <= hi);
        }
        assert!(now_with(IdInput::Bytes(&[0; 7]), IdInput::Random).is_err());
    }
}
