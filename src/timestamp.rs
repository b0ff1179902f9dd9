//! Wall-clock capture and rendering.
//!
//! Log headers and file names need broken-down UTC time. The conversion from
//! the Unix epoch to a civil date is done here directly (Gregorian
//! days-from-epoch arithmetic) so the hot logging path never touches a
//! general-purpose date formatter; rendering goes through the
//! [`LineBuffer`] integer primitives only.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::buffer::LineBuffer;

const SECS_PER_DAY: i64 = 86_400;

/// A broken-down UTC point in time with microsecond precision.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WallClock {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub micros: u32,
}

impl WallClock {
    /// Captures the current UTC wall-clock time.
    pub fn now() -> WallClock {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => WallClock::from_unix(since.as_secs() as i64, since.subsec_micros()),
            Err(before) => {
                // Clock set before the epoch; carry the negative offset.
                let dur = before.duration();
                let mut secs = -(dur.as_secs() as i64);
                let mut micros = dur.subsec_micros();
                if micros != 0 {
                    secs -= 1;
                    micros = 1_000_000 - micros;
                }
                WallClock::from_unix(secs, micros)
            }
        }
    }

    /// Converts seconds since the Unix epoch (plus a sub-second microsecond
    /// component) into civil UTC fields. Negative seconds are valid and map
    /// to dates before 1970 via the proleptic Gregorian calendar.
    pub fn from_unix(secs: i64, micros: u32) -> WallClock {
        let days = secs.div_euclid(SECS_PER_DAY);
        let tod = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        WallClock {
            year,
            month,
            day,
            hour: (tod / 3600) as u32,
            minute: (tod / 60 % 60) as u32,
            second: (tod % 60) as u32,
            micros,
        }
    }

    /// Renders `YYYY-MM-DD HH:MM:SS.ffffff`, the line-header timestamp.
    pub fn write_header(&self, buf: &mut LineBuffer) {
        self.write_date(buf, b'-');
        buf.push_byte(b' ');
        self.write_time(buf, b':');
        buf.push_byte(b'.');
        buf.write_int_right_align(self.micros as i64, 6);
    }

    /// Renders `YYYYMMDD`, the name of a day directory.
    pub fn write_date_bucket(&self, buf: &mut LineBuffer) {
        self.write_date(buf, 0);
    }

    /// Renders `YYYYMMDDHHMMSS.ffffff`, the name of a rotated file.
    pub fn write_file_stem(&self, buf: &mut LineBuffer) {
        self.write_date(buf, 0);
        self.write_time(buf, 0);
        buf.push_byte(b'.');
        buf.write_int_right_align(self.micros as i64, 6);
    }

    fn write_date(&self, buf: &mut LineBuffer, sep: u8) {
        buf.write_int_left_align(self.year, 4);
        if sep != 0 {
            buf.push_byte(sep);
        }
        buf.write_int_right_align(self.month as i64, 2);
        if sep != 0 {
            buf.push_byte(sep);
        }
        buf.write_int_right_align(self.day as i64, 2);
    }

    fn write_time(&self, buf: &mut LineBuffer, sep: u8) {
        buf.write_int_right_align(self.hour as i64, 2);
        if sep != 0 {
            buf.push_byte(sep);
        }
        buf.write_int_right_align(self.minute as i64, 2);
        if sep != 0 {
            buf.push_byte(sep);
        }
        buf.write_int_right_align(self.second as i64, 2);
    }
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let mut year = yoe + era * 400;
    if month <= 2 {
        year += 1;
    }
    (year, month as u32, day as u32)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn render(f: impl FnOnce(&mut LineBuffer)) -> String {
        let mut buf = LineBuffer::new();
        f(&mut buf);
        String::from_utf8(buf.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn known_instants() {
        let epoch = WallClock::from_unix(0, 0);
        assert_eq!(render(|b| epoch.write_header(b)), "1970-01-01 00:00:00.000000");
        assert_eq!(render(|b| epoch.write_date_bucket(b)), "19700101");

        // 2024-02-29T13:07:09.000042Z, a leap day
        let leap = WallClock::from_unix(1_709_212_029, 42);
        assert_eq!(render(|b| leap.write_header(b)), "2024-02-29 13:07:09.000042");
        assert_eq!(render(|b| leap.write_file_stem(b)), "20240229130709.000042");

        // one microsecond before the epoch
        let before = WallClock::from_unix(-1, 999_999);
        assert_eq!(render(|b| before.write_header(b)), "1969-12-31 23:59:59.999999");
    }

    #[test]
    fn matches_jiff() {
        let mut rng = SmallRng::seed_from_u64(0xc10c);
        for _ in 0..5000 {
            let secs = rng.random_range(-5_000_000_000i64..10_000_000_000);
            let wc = WallClock::from_unix(secs, 0);
            let ts = jiff::Timestamp::from_second(secs).unwrap();
            let dt = ts.to_zoned(jiff::tz::TimeZone::UTC).datetime();
            assert_eq!(
                (wc.year, wc.month, wc.day, wc.hour, wc.minute, wc.second),
                (
                    dt.year() as i64,
                    dt.month() as u32,
                    dt.day() as u32,
                    dt.hour() as u32,
                    dt.minute() as u32,
                    dt.second() as u32
                ),
                "secs={secs}"
            );
        }
    }

    #[test]
    fn header_is_lexicographically_ordered() {
        let a = WallClock::from_unix(1_700_000_000, 1);
        let b = WallClock::from_unix(1_700_000_000, 2);
        let c = WallClock::from_unix(1_700_000_001, 0);
        let ra = render(|buf| a.write_header(buf));
        let rb = render(|buf| b.write_header(buf));
        let rc = render(|buf| c.write_header(buf));
        assert!(ra < rb && rb < rc);
    }
}
