//! MS-DOS date/time encoding used by ZIP records.
//!
//! ```text
//! date: yyyyyyym mmmddddd   (year - 1980, month 1-12, day 1-31)
//! time: hhhhhmmm mmmsssss   (hour, minute, second / 2)
//! ```

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

/// A packed DOS date/time pair with two-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DosDateTime {
    /// Packed date field.
    pub date: u16,
    /// Packed time field.
    pub time: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable moment.
    pub const MIN: Self = Self {
        date: (1 << 5) | 1,
        time: 0,
    };

    /// 2107-12-31 23:59:58, the latest representable moment.
    pub const MAX: Self = Self {
        date: (127 << 9) | (12 << 5) | 31,
        time: (23 << 11) | (59 << 5) | 29,
    };

    /// Encode the current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Encode a calendar moment. Moments outside 1980..=2107 clamp to
    /// [`DosDateTime::MIN`] / [`DosDateTime::MAX`].
    pub fn from_datetime<T: Datelike + Timelike>(moment: &T) -> Self {
        let year = moment.year();
        if year < 1980 {
            return Self::MIN;
        }
        if year > 2107 {
            return Self::MAX;
        }

        let date = (((year - 1980) as u16) << 9)
            | ((moment.month() as u16) << 5)
            | moment.day() as u16;
        let time = ((moment.hour() as u16) << 11)
            | ((moment.minute() as u16) << 5)
            | (moment.second() / 2) as u16;

        Self { date, time }
    }

    /// Wrap raw fields read from an archive.
    pub fn from_parts(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Decode back to a calendar moment, or `None` for out-of-range fields.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let year = ((self.date >> 9) & 0x7F) as i32 + 1980;
        let month = ((self.date >> 5) & 0x0F) as u32;
        let day = (self.date & 0x1F) as u32;
        let hour = ((self.time >> 11) & 0x1F) as u32;
        let minute = ((self.time >> 5) & 0x3F) as u32;
        let second = (self.time & 0x1F) as u32 * 2;

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_encode_known_moment() {
        let dos = DosDateTime::from_datetime(&at(2024, 3, 15, 13, 45, 31));
        assert_eq!(dos.date, (44 << 9) | (3 << 5) | 15);
        assert_eq!(dos.time, (13 << 11) | (45 << 5) | 15);
    }

    #[test]
    fn test_two_second_resolution() {
        let even = DosDateTime::from_datetime(&at(2001, 1, 1, 0, 0, 58));
        let odd = DosDateTime::from_datetime(&at(2001, 1, 1, 0, 0, 59));
        assert_eq!(even, odd);
        assert_eq!(odd.to_naive(), Some(at(2001, 1, 1, 0, 0, 58)));
    }

    #[test]
    fn test_epoch_and_clamping() {
        let epoch = DosDateTime::from_datetime(&at(1980, 1, 1, 0, 0, 0));
        assert_eq!(epoch, DosDateTime::MIN);

        let before = DosDateTime::from_datetime(&at(1970, 6, 1, 12, 0, 0));
        assert_eq!(before, DosDateTime::MIN);

        let after = DosDateTime::from_datetime(&at(2200, 6, 1, 12, 0, 0));
        assert_eq!(after, DosDateTime::MAX);
        assert_eq!(DosDateTime::MAX.to_naive(), Some(at(2107, 12, 31, 23, 59, 58)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(DosDateTime::from_parts(0, 0).to_naive(), None);
    }

    #[test]
    fn test_now_is_decodable() {
        assert!(DosDateTime::now().to_naive().is_some());
    }
}
