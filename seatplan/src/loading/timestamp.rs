//! Allocation time parsing.
//!
//! Two layouts are accepted:
//!
//! - the form export, 12-hour with a meridiem marker between date and time:
//!   `2025/5/14 下午 5:51:07`, `2025/5/14 PM 5:51:07`
//! - the 24-hour layout written by the CSV export: `2025/05/14 17:51:07`

use crate::types::PriorityKey;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn parse(marker: &str) -> Option<Self> {
        match marker {
            "上午" => Some(Self::Am),
            "下午" => Some(Self::Pm),
            m if m.eq_ignore_ascii_case("am") || m.eq_ignore_ascii_case("a.m.") => Some(Self::Am),
            m if m.eq_ignore_ascii_case("pm") || m.eq_ignore_ascii_case("p.m.") => Some(Self::Pm),
            _ => None,
        }
    }
}

fn parse_twelve_hour(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let (date, marker, time) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let meridiem = Meridiem::parse(marker)?;
    let date = NaiveDate::parse_from_str(date, "%Y/%m/%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;

    let hour = match (meridiem, time.hour()) {
        (_, 0 | 13..) => return None,
        (Meridiem::Am, 12) => 0,
        (Meridiem::Pm, h) if h < 12 => h + 12,
        (_, h) => h,
    };

    Some(date.and_time(time.with_hour(hour)?))
}

/// Parses an allocation time into a priority key.
///
/// Text that matches neither layout yields [`PriorityKey::Invalid`] and a
/// warning; such requests are served after every valid one.
#[must_use]
pub fn parse_timestamp(text: &str) -> PriorityKey {
    let text = text.trim();
    let parsed = NaiveDateTime::parse_from_str(text, "%Y/%m/%d %H:%M:%S")
        .ok()
        .or_else(|| parse_twelve_hour(text));

    if let Some(at) = parsed {
        PriorityKey::Valid(at)
    } else {
        tracing::warn!("Failed to parse allocation time '{}'", text);
        PriorityKey::Invalid
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> PriorityKey {
        PriorityKey::Valid(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
    }

    #[test]
    fn test_afternoon_marker_adds_twelve_hours() {
        assert_eq!(parse_timestamp("2025/5/14 下午 5:51:07"), valid(2025, 5, 14, 17, 51, 7));
        assert_eq!(parse_timestamp("2025/5/14 PM 5:51:07"), valid(2025, 5, 14, 17, 51, 7));
        assert_eq!(parse_timestamp("2025/5/14 下午 12:00:00"), valid(2025, 5, 14, 12, 0, 0));
    }

    #[test]
    fn test_morning_marker_maps_twelve_to_midnight() {
        assert_eq!(parse_timestamp("2025/5/14 上午 12:30:00"), valid(2025, 5, 14, 0, 30, 0));
        assert_eq!(parse_timestamp("2025/5/14 上午 9:05:00"), valid(2025, 5, 14, 9, 5, 0));
        assert_eq!(parse_timestamp("2025/5/14 am 9:05:00"), valid(2025, 5, 14, 9, 5, 0));
    }

    #[test]
    fn test_export_layout_round_trips() {
        let key = valid(2025, 5, 14, 17, 51, 7);
        assert_eq!(parse_timestamp(&key.export_text()), key);
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(parse_timestamp(""), PriorityKey::Invalid);
        assert_eq!(parse_timestamp("yesterday"), PriorityKey::Invalid);
        assert_eq!(parse_timestamp("2025/5/14 傍晚 5:51:07"), PriorityKey::Invalid);
        assert_eq!(parse_timestamp("2025/5/14 下午 13:00:00"), PriorityKey::Invalid);
        assert_eq!(parse_timestamp("2025/13/14 上午 1:00:00"), PriorityKey::Invalid);
    }
}
