//! Time-based (version 1) UUID type and its field codec.

use std::{cmp, fmt, str, time};

use fstr::FStr;

use crate::error::Error;
use crate::uuid::{Identifier, ParseError, Uuid};

/// Number of 100-nanosecond ticks in one millisecond.
pub const TICKS_PER_MS: u16 = 10_000;

/// Milliseconds from the Gregorian reform (1582-10-15T00:00:00Z) to the Unix epoch.
pub const GREGORIAN_OFFSET_MS: i64 = 12_219_292_800_000;

/// Smallest Unix timestamp in milliseconds that a [`TimeUuid`] can carry (1582-10-15).
pub const MIN_UNIX_TS_MS: i64 = -GREGORIAN_OFFSET_MS;

/// Largest Unix timestamp in milliseconds that a [`TimeUuid`] can carry with any tick value
/// (around the year 5236).
pub const MAX_UNIX_TS_MS: i64 =
    ((MAX_TIMESTAMP - (TICKS_PER_MS as u64 - 1)) / TICKS_PER_MS as u64) as i64 - GREGORIAN_OFFSET_MS;

const MAX_TIMESTAMP: u64 = (1 << 60) - 1;

/// Node identifier of [`TimeUuid::min()`].
pub const MIN_NODE_ID: [u8; 6] = [0x80; 6];

/// Clock sequence of [`TimeUuid::min()`].
pub const MIN_CLOCK_ID: [u8; 2] = [0x80; 2];

/// Node identifier of [`TimeUuid::max()`].
pub const MAX_NODE_ID: [u8; 6] = [0x7f; 6];

/// Clock sequence of [`TimeUuid::max()`].
pub const MAX_CLOCK_ID: [u8; 2] = [0x7f; 2];

/// Returns true if `unix_ts_ms` falls within [`MIN_UNIX_TS_MS`]`..=`[`MAX_UNIX_TS_MS`].
pub const fn is_valid_unix_ts_ms(unix_ts_ms: i64) -> bool {
    MIN_UNIX_TS_MS <= unix_ts_ms && unix_ts_ms <= MAX_UNIX_TS_MS
}

/// Represents a time-based (version 1) UUID.
///
/// The type wraps a [`Uuid`] and adds the accessors that decode the RFC 4122 time-based layout.
/// Use [`TimeUuidGenerator`](crate::TimeUuidGenerator) or the crate-level functions such as
/// [`now()`](crate::now) to create new values.
///
/// # Ordering
///
/// [`Ord`] compares the 60-bit timestamp first and then bytes 8 through 15 (clock sequence and
/// node identifier) as **signed** bytes, which is how Apache Cassandra sorts its `timeuuid`
/// type. Under this order, [`TimeUuid::min()`] and [`TimeUuid::max()`] bracket every identifier
/// sharing their timestamp. Identifiers that tie on all of these are ordered by raw bytes so
/// that the order stays consistent with [`Eq`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TimeUuid(Uuid);

/// Timestamp decoded from a [`TimeUuid`] at full precision.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct DatePrecision {
    /// Milliseconds since the Unix epoch; negative before 1970.
    pub unix_ts_ms: i64,
    /// Sub-millisecond part in 100-nanosecond ticks, less than [`TICKS_PER_MS`].
    pub ticks: u16,
}

impl TimeUuid {
    /// Creates a version 1 UUID from field values.
    ///
    /// The timestamp is `(unix_ts_ms + GREGORIAN_OFFSET_MS) * 10_000 + ticks` in 100-nanosecond
    /// units. The version nibble is forced to `0001` and the two most significant bits of
    /// `clock_id[0]` are replaced by the variant bits `10`.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` is out of the range checked by [`is_valid_unix_ts_ms()`] or if
    /// `ticks` is not less than [`TICKS_PER_MS`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::TimeUuid;
    ///
    /// // 2024-01-01T00:00:00.000Z
    /// let x = TimeUuid::from_fields(1_704_067_200_000, 0, *b"host01", [0x01, 0x02]);
    /// assert_eq!(x.to_string(), "b4cc8000-a838-11ee-8102-686f73743031");
    /// ```
    pub const fn from_fields(
        unix_ts_ms: i64,
        ticks: u16,
        node_id: [u8; 6],
        clock_id: [u8; 2],
    ) -> Self {
        if !is_valid_unix_ts_ms(unix_ts_ms) || ticks >= TICKS_PER_MS {
            panic!("invalid field value");
        }

        let ts = (unix_ts_ms + GREGORIAN_OFFSET_MS) as u64 * TICKS_PER_MS as u64 + ticks as u64;
        Self(Uuid::from_bytes([
            (ts >> 24) as u8,
            (ts >> 16) as u8,
            (ts >> 8) as u8,
            ts as u8,
            (ts >> 40) as u8,
            (ts >> 32) as u8,
            0x10 | ((ts >> 56) as u8 & 0x0f),
            (ts >> 48) as u8,
            0x80 | (clock_id[0] & 0x3f),
            clock_id[1],
            node_id[0],
            node_id[1],
            node_id[2],
            node_id[3],
            node_id[4],
            node_id[5],
        ]))
    }

    /// Returns the smallest identifier for the given point in time under the [`Ord`] order.
    ///
    /// The clock sequence and node identifier are filled with `0x80` bytes, so the value can
    /// serve as an inclusive lower bound in time range queries.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`TimeUuid::from_fields()`].
    pub const fn min(unix_ts_ms: i64, ticks: u16) -> Self {
        Self::from_fields(unix_ts_ms, ticks, MIN_NODE_ID, MIN_CLOCK_ID)
    }

    /// Returns the largest identifier for the given point in time under the [`Ord`] order.
    ///
    /// The clock sequence and node identifier are filled with `0x7f` bytes, so the value can
    /// serve as an inclusive upper bound in time range queries.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`TimeUuid::from_fields()`].
    pub const fn max(unix_ts_ms: i64, ticks: u16) -> Self {
        Self::from_fields(unix_ts_ms, ticks, MAX_NODE_ID, MAX_CLOCK_ID)
    }

    /// Creates an object from a pre-built byte slice that must be exactly 16 bytes long.
    ///
    /// The bytes are taken as they are; the version and variant fields are not checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] if `bytes` is not 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        Uuid::from_slice(bytes).map(Self)
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Returns a reference to the underlying [`Uuid`] container.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the raw 60-bit timestamp in 100-nanosecond ticks since 1582-10-15T00:00:00Z.
    pub const fn timestamp(&self) -> u64 {
        let b = self.0.as_bytes();
        ((b[6] & 0x0f) as u64) << 56
            | (b[7] as u64) << 48
            | (b[4] as u64) << 40
            | (b[5] as u64) << 32
            | (b[0] as u64) << 24
            | (b[1] as u64) << 16
            | (b[2] as u64) << 8
            | b[3] as u64
    }

    /// Decodes the timestamp into Unix milliseconds and the sub-millisecond tick count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::{DatePrecision, TimeUuid};
    ///
    /// let x = TimeUuid::from_fields(1_704_067_200_123, 4_567, *b"host01", *b"cl");
    /// assert_eq!(
    ///     x.date_precision(),
    ///     DatePrecision { unix_ts_ms: 1_704_067_200_123, ticks: 4_567 }
    /// );
    /// ```
    pub const fn date_precision(&self) -> DatePrecision {
        let ts = self.timestamp();
        DatePrecision {
            unix_ts_ms: (ts / TICKS_PER_MS as u64) as i64 - GREGORIAN_OFFSET_MS,
            ticks: (ts % TICKS_PER_MS as u64) as u16,
        }
    }

    /// Returns the timestamp truncated to Unix milliseconds.
    pub const fn unix_ts_ms(&self) -> i64 {
        self.date_precision().unix_ts_ms
    }

    /// Returns the timestamp truncated to milliseconds as [`SystemTime`](time::SystemTime), or
    /// `None` if the platform cannot represent it.
    pub fn system_time(&self) -> Option<time::SystemTime> {
        let ms = self.unix_ts_ms();
        let offset = time::Duration::from_millis(ms.unsigned_abs());
        if ms >= 0 {
            time::UNIX_EPOCH.checked_add(offset)
        } else {
            time::UNIX_EPOCH.checked_sub(offset)
        }
    }

    /// Returns the timestamp truncated to milliseconds as a `chrono` UTC date-time.
    #[cfg(feature = "chrono")]
    #[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
    pub fn date_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.unix_ts_ms())
    }

    /// Returns the 6-byte node identifier.
    pub const fn node_id(&self) -> [u8; 6] {
        let b = self.0.as_bytes();
        [b[10], b[11], b[12], b[13], b[14], b[15]]
    }

    /// Returns the node identifier interpreted as text of one character per byte.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeuuid::TimeUuid;
    ///
    /// let x = TimeUuid::from_fields(0, 0, *b"host01", [0, 0]);
    /// assert_eq!(x.node_id_string(), "host01");
    /// ```
    pub fn node_id_string(&self) -> String {
        self.node_id().iter().copied().map(char::from).collect()
    }

    /// Returns the 2-byte clock sequence as stored, i.e. with the variant bits in the first byte.
    pub const fn clock_id(&self) -> [u8; 2] {
        let b = self.0.as_bytes();
        [b[8], b[9]]
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure.
    pub fn encode(&self) -> FStr<36> {
        self.0.encode()
    }

    /// Compares the timestamps and then bytes 8 through 15 as signed bytes.
    ///
    /// This is the order Apache Cassandra applies to `timeuuid` columns. The version nibble is
    /// not compared.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use timeuuid::TimeUuid;
    ///
    /// let x = TimeUuid::from_fields(1_704_067_200_000, 0, [0x7f; 6], [0, 0]);
    /// let y = TimeUuid::from_fields(1_704_067_200_000, 0, [0x80; 6], [0, 0]);
    /// assert_eq!(x.time_cmp(&y), Ordering::Greater);
    /// assert!(x.as_bytes() < y.as_bytes());
    /// ```
    pub fn time_cmp(&self, other: &Self) -> cmp::Ordering {
        let lhs = self.0.as_bytes()[8..].iter().map(|&e| e as i8);
        let rhs = other.0.as_bytes()[8..].iter().map(|&e| e as i8);
        self.timestamp()
            .cmp(&other.timestamp())
            .then_with(|| lhs.cmp(rhs))
    }
}

impl Identifier for TimeUuid {
    fn to_bytes_ref(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Ord for TimeUuid {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.time_cmp(other).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TimeUuid {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeUuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl str::FromStr for TimeUuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    ///
    /// Only the syntax is validated; the version and variant fields are taken as they are.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        src.parse().map(Self)
    }
}

impl From<Uuid> for TimeUuid {
    fn from(src: Uuid) -> Self {
        Self(src)
    }
}

impl From<TimeUuid> for Uuid {
    fn from(src: TimeUuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for TimeUuid {
    fn from(src: [u8; 16]) -> Self {
        Self(Uuid::from(src))
    }
}

impl From<TimeUuid> for [u8; 16] {
    fn from(src: TimeUuid) -> Self {
        src.0.into()
    }
}

impl TryFrom<&[u8]> for TimeUuid {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(src)
    }
}

impl AsRef<[u8]> for TimeUuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<TimeUuid> for String {
    fn from(src: TimeUuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for TimeUuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::TimeUuid;

    impl From<TimeUuid> for uuid::Uuid {
        fn from(src: TimeUuid) -> Self {
            src.0.into()
        }
    }

    impl From<uuid::Uuid> for TimeUuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{TimeUuid, Uuid};
    use serde::{Deserializer, Serializer};

    impl serde::Serialize for TimeUuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.0.serialize(serializer)
        }
    }

    impl<'de> serde::Deserialize<'de> for TimeUuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Uuid::deserialize(deserializer).map(Self)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2024-01-01T00:00:00.000Z
    const TS_2024: i64 = 1_704_067_200_000;

    /// Returns a collection of prepared cases
    fn prepare_cases() -> Vec<((i64, u16, [u8; 6], [u8; 2]), &'static str)> {
        vec![
            (
                (TS_2024, 0, *b"host01", [0x01, 0x02]),
                "b4cc8000-a838-11ee-8102-686f73743031",
            ),
            (
                (MIN_UNIX_TS_MS, 0, [0; 6], [0; 2]),
                "00000000-0000-1000-8000-000000000000",
            ),
            (
                (0, 0, MIN_NODE_ID, MIN_CLOCK_ID),
                "13814000-1dd2-11b2-8080-808080808080",
            ),
            (
                (0, 9_999, MAX_NODE_ID, MAX_CLOCK_ID),
                "1381670f-1dd2-11b2-bf7f-7f7f7f7f7f7f",
            ),
            (
                (MAX_UNIX_TS_MS, 9_999, [0xff; 6], [0xff; 2]),
                "ffffe4bf-ffff-1fff-bfff-ffffffffffff",
            ),
        ]
    }

    /// Encodes prepared cases correctly
    #[test]
    fn encodes_prepared_cases_correctly() {
        for (fs, text) in prepare_cases() {
            let e = TimeUuid::from_fields(fs.0, fs.1, fs.2, fs.3);
            assert_eq!(e.to_string(), text);
            assert_eq!(&e.encode() as &str, text);
            assert_eq!(text.parse(), Ok(e));
        }
    }

    /// Decodes timestamp, ticks, and node identifier of prepared cases
    #[test]
    fn decodes_timestamp_ticks_and_node_identifier_of_prepared_cases() {
        for (fs, text) in prepare_cases() {
            let e: TimeUuid = text.parse().unwrap();
            assert_eq!(
                e.date_precision(),
                DatePrecision {
                    unix_ts_ms: fs.0,
                    ticks: fs.1
                }
            );
            assert_eq!(e.unix_ts_ms(), fs.0);
            assert_eq!(e.node_id(), fs.2);
            assert_eq!(e.clock_id()[0], 0x80 | (fs.3[0] & 0x3f));
            assert_eq!(e.clock_id()[1], fs.3[1]);
        }
    }

    /// Matches the golden vector byte by byte
    #[test]
    fn matches_the_golden_vector_byte_by_byte() {
        let e = TimeUuid::from_fields(TS_2024, 0, *b"host01", [0x01, 0x02]);
        assert_eq!(
            e.as_bytes(),
            &[180, 204, 128, 0, 168, 56, 17, 238, 129, 2, 104, 111, 115, 116, 48, 49]
        );
        assert_eq!(e.timestamp(), 139_233_600_000_000_000);
        assert_eq!(e.node_id_string(), "host01");
        assert_eq!(e.clock_id(), [0x81, 0x02]);
    }

    /// Round-trips field values across the timestamp range
    #[test]
    fn round_trips_field_values_across_the_timestamp_range() {
        let timestamps = [
            MIN_UNIX_TS_MS,
            MIN_UNIX_TS_MS + 1,
            -1,
            0,
            1,
            TS_2024,
            TS_2024 + 86_399_999,
            MAX_UNIX_TS_MS - 1,
            MAX_UNIX_TS_MS,
        ];
        for ts in timestamps {
            for ticks in [0, 1, 4_999, 9_999] {
                let e = TimeUuid::from_fields(ts, ticks, *b"\x00\x7f\x80\xffab", [0x3f, 0xc0]);
                assert_eq!(e.unix_ts_ms(), ts);
                assert_eq!(e.date_precision().ticks, ticks);
                assert_eq!(e.node_id(), *b"\x00\x7f\x80\xffab");
                assert_eq!(e.as_uuid().version(), Some(1));
                assert_eq!(e.as_bytes()[6] >> 4, 0b0001);
                assert_eq!(e.as_bytes()[8] >> 6, 0b10);
            }
        }
    }

    /// Panics on timestamps before the Gregorian epoch
    #[test]
    #[should_panic(expected = "invalid field value")]
    fn panics_on_timestamps_before_the_gregorian_epoch() {
        TimeUuid::from_fields(MIN_UNIX_TS_MS - 1, 0, [0; 6], [0; 2]);
    }

    /// Panics on ticks of a whole millisecond
    #[test]
    #[should_panic(expected = "invalid field value")]
    fn panics_on_ticks_of_a_whole_millisecond() {
        TimeUuid::from_fields(0, TICKS_PER_MS, [0; 6], [0; 2]);
    }

    /// Builds min and max boundaries that share the timestamp
    #[test]
    fn builds_min_and_max_boundaries_that_share_the_timestamp() {
        for ticks in [0, 1234, 9_999] {
            let lo = TimeUuid::min(TS_2024, ticks);
            let hi = TimeUuid::max(TS_2024, ticks);
            assert_eq!(lo.date_precision(), hi.date_precision());
            assert_eq!(lo.as_bytes()[..8], hi.as_bytes()[..8]);
            assert_eq!(lo.as_bytes()[8..], [0x80; 8]);
            assert_eq!(hi.as_bytes()[8..], [0xbf, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f]);
            assert!(lo < hi);
        }
    }

    /// Brackets every clock and node pattern between min and max
    #[test]
    fn brackets_every_clock_and_node_pattern_between_min_and_max() {
        let lo = TimeUuid::min(TS_2024, 42);
        let hi = TimeUuid::max(TS_2024, 42);
        for a in [0x00u8, 0x01, 0x3f, 0x40, 0x7f, 0x80, 0xbf, 0xc0, 0xff] {
            for b in [0x00u8, 0x7f, 0x80, 0xff] {
                let e = TimeUuid::from_fields(TS_2024, 42, [b, a, b, a, b, a], [a, b]);
                assert!(lo <= e && e <= hi, "{e} out of [{lo}, {hi}]");
            }
        }

        // neighbors in time stay outside the bracket
        assert!(TimeUuid::max(TS_2024, 41) < lo);
        assert!(hi < TimeUuid::min(TS_2024, 43));
        assert!(TimeUuid::max(TS_2024 - 1, 9_999) < TimeUuid::min(TS_2024, 0));
    }

    /// Orders by timestamp before raw bytes
    #[test]
    fn orders_by_timestamp_before_raw_bytes() {
        // byte-wise the later one sorts first because time_low wraps around
        let earlier = TimeUuid::from_fields(0, 0, [0; 6], [0; 2]);
        let later = TimeUuid::from_fields(396_773, 0, [0; 6], [0; 2]);
        assert!(earlier.as_bytes() > later.as_bytes());
        assert!(earlier < later);
        assert_eq!(earlier.cmp(&earlier), cmp::Ordering::Equal);
        assert_eq!(earlier.time_cmp(&later), cmp::Ordering::Less);

        // signed comparison puts 0x7f above 0x80 within the same timestamp
        let x = TimeUuid::from_fields(TS_2024, 0, [0x7f; 6], [0; 2]);
        let y = TimeUuid::from_fields(TS_2024, 0, [0x80; 6], [0; 2]);
        assert_eq!(x.time_cmp(&y), cmp::Ordering::Greater);
        assert!(x > y);
    }

    /// Converts to system time
    #[test]
    fn converts_to_system_time() {
        let e = TimeUuid::from_fields(TS_2024, 5_000, [0; 6], [0; 2]);
        assert_eq!(
            e.system_time(),
            Some(time::UNIX_EPOCH + time::Duration::from_millis(TS_2024 as u64))
        );

        let e = TimeUuid::from_fields(-1_500, 0, [0; 6], [0; 2]);
        assert_eq!(
            e.system_time(),
            Some(time::UNIX_EPOCH - time::Duration::from_millis(1_500))
        );
    }

    /// Rejects raw byte slices of wrong length
    #[test]
    fn rejects_raw_byte_slices_of_wrong_length() {
        use crate::error::{ErrorKind, Field};

        let err = TimeUuid::from_slice(&[0u8; 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.field(), Field::Uuid);

        let bytes = *TimeUuid::min(TS_2024, 0).as_bytes();
        assert_eq!(
            TimeUuid::try_from(&bytes[..]),
            Ok(TimeUuid::min(TS_2024, 0))
        );
    }

    /// Has symmetric converters
    #[test]
    fn has_symmetric_converters() {
        for (fs, _) in prepare_cases() {
            let e = TimeUuid::from_fields(fs.0, fs.1, fs.2, fs.3);
            assert_eq!(TimeUuid::from(<[u8; 16]>::from(e)), e);
            assert_eq!(TimeUuid::from(Uuid::from(e)), e);
            assert_eq!(TimeUuid::try_from(e.to_string()), Ok(e));
            assert_eq!(TimeUuid::try_from(String::from(e).to_uppercase()), Ok(e));
            assert_eq!(TimeUuid::parse_canonical(&e.to_canonical()), Ok(e));
            #[cfg(feature = "uuid")]
            assert_eq!(TimeUuid::from(<uuid::Uuid>::from(e)), e);
            #[cfg(feature = "uuid")]
            assert_eq!(uuid::Uuid::from(e).get_version_num(), 1);
        }
    }

    /// Converts to chrono date-time
    #[cfg(feature = "chrono")]
    #[test]
    fn converts_to_chrono_date_time() {
        let e = TimeUuid::from_fields(TS_2024 + 7, 0, [0; 6], [0; 2]);
        assert_eq!(
            e.date_time().map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            Some("2024-01-01T00:00:00.007Z".to_owned())
        );
    }
}
