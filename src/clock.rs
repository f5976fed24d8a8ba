use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Layout used for the `date` of every history record, ie `2024-03-01 14:05:09.123456`
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

/// A source of "now" for stamping history records.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time in the local timezone, or UTC if the local offset cannot be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// A clock that is stuck at a single instant
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Render a timestamp the way it is stored in the history.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    // every component in TIMESTAMP_FORMAT is available on OffsetDateTime
    ts.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::PrimitiveDateTime;
    use time::macros::datetime;

    #[test]
    fn test_format_timestamp() {
        let ts = datetime!(2024-03-01 14:05:09.123456 UTC);
        assert_eq!(format_timestamp(ts), "2024-03-01 14:05:09.123456");
    }

    #[test]
    fn test_format_timestamp_pads_subseconds() {
        let ts = datetime!(2024-12-31 00:00:00 UTC);
        assert_eq!(format_timestamp(ts), "2024-12-31 00:00:00.000000");
    }

    #[test]
    fn test_fixed_clock() {
        let ts = datetime!(2023-07-14 08:30:00 +02:00);
        let clock = FixedClock(ts);
        assert_eq!(clock.now(), ts);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_renders_parsable_timestamp() {
        let rendered = format_timestamp(SystemClock.now());
        assert!(PrimitiveDateTime::parse(&rendered, TIMESTAMP_FORMAT).is_ok());
    }
}
