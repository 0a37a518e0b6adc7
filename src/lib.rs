//! Time-based UUID (version 1) generator and codec
//!
//! ```rust
//! let uuid = timeuuid::now();
//! println!("{}", uuid); // e.g. "b4cc8000-a838-11ee-8102-686f73743031"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//! println!("{:?}", uuid.date_precision()); // Unix milliseconds and sub-millisecond ticks
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562#name-uuid-version-1).
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_high       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                              node                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - `time_high`, `time_mid`, and `time_low` hold the 60-bit count of 100-nanosecond ticks since
//!   1582-10-15T00:00:00Z, most significant part first when read as
//!   `time_high:time_mid:time_low`.
//! - The 4-bit `ver` field is set at `0001`.
//! - The 2-bit `var` field is set at `10`.
//! - The 14-bit `clock_seq` field takes the lower six bits of the first clock identifier byte and
//!   the whole second byte.
//! - The 48-bit `node` field carries the node identifier verbatim.
//!
//! System clocks report milliseconds only, so the generator supplies the ten thousand ticks
//! within each millisecond from a counter. Identifiers generated from the current time by one
//! generator are distinct for up to 10 000 calls per millisecond; see [`TimeUuidGenerator`].
//!
//! # Explicit timestamps and range boundaries
//!
//! ```rust
//! let ts = 1_704_067_200_000; // 2024-01-01T00:00:00.000Z
//!
//! let uuid = timeuuid::create(Some(ts), Some(0), "host01".into(), b"\x01\x02".into())?;
//! assert_eq!(uuid.to_string(), "b4cc8000-a838-11ee-8102-686f73743031");
//! assert_eq!(uuid.node_id_string(), "host01");
//!
//! // smallest and largest identifiers of a millisecond in signed-byte order
//! let lo = timeuuid::min(ts, Some(0));
//! let hi = timeuuid::max(ts, Some(9_999));
//! assert!(lo <= uuid && uuid <= hi);
//! # Ok::<(), timeuuid::Error>(())
//! ```
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen`: Enables the process-wide default generator behind [`now()`] and the other
//!   free functions.
//!
//! Optional features:
//!
//! - `chrono`: Enables conversion from and to `chrono::DateTime`.
//! - `serde`: Enables serialization and deserialization of [`Uuid`] and [`TimeUuid`].
//! - `tracing`: Emits `tracing` events on argument fallbacks and generator resets.
//! - `uuid`: Enables conversion from and to `uuid::Uuid`.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod uuid;
pub use uuid::{is_valid_format, Identifier, ParseError, Uuid, Variant};

pub mod error;
pub use error::{Error, ErrorKind, Field};

mod input;
pub use input::IdInput;

mod time_uuid;
pub use time_uuid::{
    is_valid_unix_ts_ms, DatePrecision, TimeUuid, GREGORIAN_OFFSET_MS, MAX_CLOCK_ID, MAX_NODE_ID,
    MAX_UNIX_TS_MS, MIN_CLOCK_ID, MIN_NODE_ID, MIN_UNIX_TS_MS, TICKS_PER_MS,
};

pub mod generator;
pub use generator::TimeUuidGenerator;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{create, from_system_time, from_unix_ts_ms, max, min, now, now_with};
