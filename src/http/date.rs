//! `Date` header values in the fixed RFC 1123 form,
//! e.g. `Wed, 05 Jun 2024 12:00:00 GMT`.

use std::time::{SystemTime, UNIX_EPOCH};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const SECS_PER_DAY: u64 = 86_400;

/// Formats the current time.
#[inline]
pub fn now() -> String {
    format(SystemTime::now())
}

/// Formats `time` in GMT. Times before the Unix epoch clamp to the epoch.
pub fn format(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    let days = secs / SECS_PER_DAY;
    let rem = secs % SECS_PER_DAY;
    let (year, month, day) = civil_from_days(days);

    // 1970-01-01 was a Thursday
    let weekday = WEEKDAYS[((days + 3) % 7) as usize];

    format!(
        "{weekday}, {day:02} {} {year:04} {:02}:{:02}:{:02} GMT",
        MONTHS[(month - 1) as usize],
        rem / 3600,
        rem % 3600 / 60,
        rem % 60,
    )
}

// Days since 1970-01-01 to (year, month 1..=12, day 1..=31), proleptic Gregorian.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;

    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);

    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn known_dates() {
        #[rustfmt::skip]
        let cases = [
            (0,             "Thu, 01 Jan 1970 00:00:00 GMT"),
            (1_717_588_800, "Wed, 05 Jun 2024 12:00:00 GMT"),
            (951_868_799,   "Tue, 29 Feb 2000 23:59:59 GMT"),
            (951_868_800,   "Wed, 01 Mar 2000 00:00:00 GMT"),
            (1_704_067_199, "Sun, 31 Dec 2023 23:59:59 GMT"),
        ];

        for (secs, expected) in cases {
            assert_eq!(format(UNIX_EPOCH + Duration::from_secs(secs)), expected);
        }
    }

    #[test]
    fn before_epoch() {
        let time = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(format(time), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn shape() {
        let value = now();

        assert_eq!(value.len(), 29);
        assert!(value.ends_with(" GMT"));
    }
}
