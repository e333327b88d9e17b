//! # Trigger Construction
//!
//! Platforms disagree on how a recurring daily alert is expressed: one wants a
//! repeating calendar match, the other a daily trigger bound to a named
//! channel. [`TriggerStyle`] is resolved once from configuration and
//! [`Trigger::daily`] is the only place the shape is chosen.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Channel that daily-interval reminders are delivered on
pub const REMINDER_CHANNEL_ID: &str = "reminders";

/// Trigger shape supported by the notification platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerStyle {
    /// Repeating calendar match on hour and minute (iOS)
    Calendar,
    /// Daily trigger delivered through a notification channel (Android)
    DailyChannel,
}

impl TriggerStyle {
    /// Resolve the style from a platform name
    pub fn for_platform(platform: &str) -> Result<Self> {
        match platform.trim().to_lowercase().as_str() {
            "ios" => Ok(TriggerStyle::Calendar),
            "android" => Ok(TriggerStyle::DailyChannel),
            _ => Err(anyhow!("Unknown notification platform: {}", platform)),
        }
    }

    pub fn uses_channels(&self) -> bool {
        matches!(self, TriggerStyle::DailyChannel)
    }
}

/// A recurring daily trigger, one delivery per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Local-timezone calendar match
    Calendar { hour: u32, minute: u32, repeats: bool },
    Daily {
        hour: u32,
        minute: u32,
        channel_id: String,
    },
}

impl Trigger {
    /// Build the daily trigger for `hour:minute` in the given style
    pub fn daily(style: TriggerStyle, hour: u32, minute: u32) -> Self {
        match style {
            TriggerStyle::Calendar => Trigger::Calendar {
                hour,
                minute,
                repeats: true,
            },
            TriggerStyle::DailyChannel => Trigger::Daily {
                hour,
                minute,
                channel_id: REMINDER_CHANNEL_ID.to_string(),
            },
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            Trigger::Calendar { hour, .. } | Trigger::Daily { hour, .. } => *hour,
        }
    }

    pub fn minute(&self) -> u32 {
        match self {
            Trigger::Calendar { minute, .. } | Trigger::Daily { minute, .. } => *minute,
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Trigger::Calendar { .. } => None,
            Trigger::Daily { channel_id, .. } => Some(channel_id),
        }
    }

    /// Wall-clock time this trigger matches, `None` if out of range
    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
    }

    /// First firing at or after `now`: today if the time has not passed yet,
    /// otherwise tomorrow.
    pub fn next_fire(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let candidate = now.date().and_time(self.time()?);
        if candidate < now {
            Some(candidate + Duration::days(1))
        } else {
            Some(candidate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_style_for_platform() {
        assert_eq!(TriggerStyle::for_platform("ios").unwrap(), TriggerStyle::Calendar);
        assert_eq!(
            TriggerStyle::for_platform(" Android ").unwrap(),
            TriggerStyle::DailyChannel
        );
        assert!(TriggerStyle::for_platform("web").is_err());
    }

    #[test]
    fn test_daily_shape_follows_style() {
        let calendar = Trigger::daily(TriggerStyle::Calendar, 8, 30);
        assert_eq!(
            calendar,
            Trigger::Calendar {
                hour: 8,
                minute: 30,
                repeats: true
            }
        );
        assert_eq!(calendar.channel_id(), None);

        let daily = Trigger::daily(TriggerStyle::DailyChannel, 19, 0);
        assert_eq!(daily.channel_id(), Some(REMINDER_CHANNEL_ID));
        assert_eq!((daily.hour(), daily.minute()), (19, 0));
    }

    #[test]
    fn test_next_fire_today_when_not_passed() {
        let trigger = Trigger::daily(TriggerStyle::Calendar, 13, 0);
        assert_eq!(trigger.next_fire(at(8, 0)), Some(at(13, 0)));
        assert_eq!(trigger.next_fire(at(13, 0)), Some(at(13, 0)));
    }

    #[test]
    fn test_next_fire_tomorrow_when_passed() {
        let trigger = Trigger::daily(TriggerStyle::DailyChannel, 8, 0);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(trigger.next_fire(at(8, 1)), Some(expected));
    }

    #[test]
    fn test_out_of_range_time_has_no_fire() {
        let trigger = Trigger::daily(TriggerStyle::Calendar, 24, 0);
        assert_eq!(trigger.time(), None);
        assert_eq!(trigger.next_fire(at(8, 0)), None);
    }
}
