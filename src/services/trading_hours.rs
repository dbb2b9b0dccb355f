use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::constants::TRADING_TIMEZONE;

/// Trading session configuration for the Indonesia Stock Exchange
pub struct TradingHours {
    pub start_hour: u32,        // 9 for 09:00
    pub start_minute: u32,
    pub end_hour: u32,          // 16 for 16:00
    pub end_minute: u32,
    pub timezone: &'static str, // "Asia/Jakarta"
    pub weekdays_only: bool,    // true for Monday-Friday only
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            start_minute: 0,
            end_hour: 16,
            end_minute: 0,
            timezone: TRADING_TIMEZONE,
            weekdays_only: true,
        }
    }
}

impl TradingHours {
    /// Parse the configured timezone, falling back to UTC+7 Jakarta
    pub fn tz(&self) -> Tz {
        match self.timezone.parse() {
            Ok(tz) => tz,
            Err(e) => {
                tracing::warn!("Failed to parse timezone '{}': {}", self.timezone, e);
                chrono_tz::Asia::Jakarta
            }
        }
    }

    /// Whether the local date of `now` is a trading day
    pub fn is_trading_day(&self, now: DateTime<Utc>) -> bool {
        let weekday = now.with_timezone(&self.tz()).weekday();
        !(self.weekdays_only && matches!(weekday, Weekday::Sat | Weekday::Sun))
    }

    /// Whether `now` falls inside the session (both ends inclusive)
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_trading_day(now) {
            return false;
        }
        let local = now.with_timezone(&self.tz());

        let current = local.hour() * 100 + local.minute();
        let start = self.start_hour * 100 + self.start_minute;
        let end = self.end_hour * 100 + self.end_minute;
        start <= current && current <= end
    }

    /// First five minutes of the closing hour, when the daily recap goes out
    pub fn is_closing_at(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz());
        local.hour() == self.end_hour && local.minute() <= 5
    }

    /// Calendar date in the trading timezone
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz()).date_naive()
    }
}

/// Today's date in the trading timezone
pub fn today_local() -> NaiveDate {
    TradingHours::default().local_date(Utc::now())
}

/// Current time in the trading timezone
pub fn now_local() -> DateTime<Tz> {
    Utc::now().with_timezone(&TradingHours::default().tz())
}

/// Human-readable local timestamp for messages ("17 Oct 2026, 14:05 WIB")
pub fn format_wib(time: DateTime<Tz>) -> String {
    time.format("%d %b %Y, %H:%M WIB").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jakarta(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        chrono_tz::Asia::Jakarta
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_trading_hours_config() {
        let config = TradingHours::default();
        assert_eq!(config.start_hour, 9);
        assert_eq!(config.end_hour, 16);
        assert_eq!(config.timezone, "Asia/Jakarta");
        assert!(config.weekdays_only);
    }

    #[test]
    fn test_session_bounds_inclusive() {
        let hours = TradingHours::default();
        // 2026-10-16 is a Friday
        assert!(!hours.is_open_at(jakarta(2026, 10, 16, 8, 59)));
        assert!(hours.is_open_at(jakarta(2026, 10, 16, 9, 0)));
        assert!(hours.is_open_at(jakarta(2026, 10, 16, 16, 0)));
        assert!(!hours.is_open_at(jakarta(2026, 10, 16, 16, 1)));
        assert!(!hours.is_open_at(jakarta(2026, 10, 17, 10, 0)));
        assert!(!hours.is_trading_day(jakarta(2026, 10, 18, 10, 0)));
        assert!(hours.is_trading_day(jakarta(2026, 10, 19, 7, 0)));
    }

    #[test]
    fn test_closing_window() {
        let hours = TradingHours::default();
        assert!(hours.is_closing_at(jakarta(2026, 10, 16, 16, 0)));
        assert!(hours.is_closing_at(jakarta(2026, 10, 16, 16, 5)));
        assert!(!hours.is_closing_at(jakarta(2026, 10, 16, 16, 6)));
        assert!(!hours.is_closing_at(jakarta(2026, 10, 16, 15, 55)));
    }

    #[test]
    fn test_local_date_uses_jakarta() {
        let hours = TradingHours::default();
        // 18:30 UTC is already the next day in Jakarta (UTC+7)
        let late = Utc.with_ymd_and_hms(2026, 10, 16, 18, 30, 0).unwrap();
        assert_eq!(hours.local_date(late), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }

    #[test]
    fn test_format_wib() {
        let time = chrono_tz::Asia::Jakarta
            .with_ymd_and_hms(2026, 10, 16, 14, 5, 0)
            .unwrap();
        assert_eq!(format_wib(time), "16 Oct 2026, 14:05 WIB");
    }
}
