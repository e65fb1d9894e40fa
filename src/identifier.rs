//! Receipt identifiers: `NO` + room + four-digit year + two-digit month

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::{Clock, SystemClock};

static MONTH_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})年([0-9]{1,2})月").expect("month label pattern"));

/// Extract `YYYYMM` from a label such as `2025年9月`.
pub fn month_code(label: &str) -> Option<String> {
    let caps = MONTH_LABEL.captures(label)?;
    Some(format!("{}{:0>2}", &caps[1], &caps[2]))
}

/// Identifier for `room` and `month`, falling back to the current year and
/// month when the label does not parse.
pub fn receipt_id(room: &str, month: &str) -> String {
    receipt_id_with_clock(room, month, &SystemClock)
}

pub fn receipt_id_with_clock(room: &str, month: &str, clock: &dyn Clock) -> String {
    let code = month_code(month).unwrap_or_else(|| {
        log::debug!("month label {:?} not recognised, using current month", month);
        clock.now().format("%Y%m").to_string()
    });
    format!("NO{}{}", room, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FixedClock;
    use chrono::{Local, TimeZone};

    #[test]
    fn well_formed_label() {
        assert_eq!(receipt_id("101", "2025年9月"), "NO101202509");
        assert_eq!(receipt_id("101", "2025年12月"), "NO101202512");
        assert_eq!(receipt_id("B-2", "2024年01月"), "NOB-2202401");
    }

    #[test]
    fn label_found_inside_text() {
        assert_eq!(month_code("租期 2025年3月 房租"), Some("202503".to_string()));
    }

    #[test]
    fn malformed_label_uses_clock() {
        let clock = FixedClock(Local.with_ymd_and_hms(2026, 2, 14, 8, 0, 0).single().unwrap());
        assert_eq!(receipt_id_with_clock("101", "not-a-month", &clock), "NO101202602");
        assert_eq!(receipt_id_with_clock("101", "", &clock), "NO101202602");
        assert_eq!(receipt_id_with_clock("101", "25年9月", &clock), "NO101202602");
    }

    #[test]
    fn full_width_digits_are_not_month_codes() {
        assert_eq!(month_code("２０２５年９月"), None);
    }
}
