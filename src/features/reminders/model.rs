//! Reminder records and their persisted form.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Title shared by the built-in reminders
pub const DEFAULT_TITLE: &str = "Take creatine";

/// Body text of every reminder notification
pub const REMINDER_BODY: &str = "Time to take your creatine!";

/// Wall-clock time of day, independent of date and timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = anyhow::Error;

    /// Parses `H:MM` or `HH:MM`, rejecting out-of-range values
    fn from_str(s: &str) -> Result<Self> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid time '{}', expected HH:MM", s))?;

        let hour: u32 = hour
            .parse()
            .map_err(|_| anyhow!("Invalid hour in '{}'", s))?;
        if minute.len() != 2 {
            return Err(anyhow!("Invalid minute in '{}'", s));
        }
        let minute: u32 = minute
            .parse()
            .map_err(|_| anyhow!("Invalid minute in '{}'", s))?;

        if hour > 23 || minute > 59 {
            return Err(anyhow!("Time out of range: {}", s));
        }
        Ok(TimeOfDay { hour, minute })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Stable identifier, unique within the set
    pub id: String,
    pub time_of_day: TimeOfDay,
    pub enabled: bool,
    pub title: String,
}

impl Reminder {
    pub fn new(id: &str, time_of_day: TimeOfDay, title: &str) -> Self {
        Self {
            id: id.to_string(),
            time_of_day,
            enabled: false,
            title: title.to_string(),
        }
    }
}

/// First-run reminder set: 08:00, 13:00 and 19:00, all disabled
pub fn default_reminders() -> Vec<Reminder> {
    vec![
        Reminder::new("1", TimeOfDay::new(8, 0), DEFAULT_TITLE),
        Reminder::new("2", TimeOfDay::new(13, 0), DEFAULT_TITLE),
        Reminder::new("3", TimeOfDay::new(19, 0), DEFAULT_TITLE),
    ]
}

pub fn encode_reminders(reminders: &[Reminder]) -> Result<String> {
    Ok(serde_json::to_string(reminders)?)
}

pub fn decode_reminders(raw: &str) -> Result<Vec<Reminder>> {
    Ok(serde_json::from_str(raw)?)
}
