//! Local answers for "what time is it" style questions.

use once_cell::sync::Lazy;
use regex::Regex;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

static TIME_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)what\s+time|time\s+is\s+it|current\s+time|tell\s+me\s+the\s+time|say\s+the\s+time",
    )
    .expect("time query pattern compiles")
});

const SPOKEN_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:none]:[minute padding:zero] [period case:upper]");

#[derive(Clone, Copy, Debug, Default)]
pub struct TimeIntercept;

impl TimeIntercept {
    pub fn matches(&self, input: &str) -> bool {
        TIME_QUERY.is_match(input)
    }

    /// Sentence for the current local time, e.g. `It's 3:07 PM.`
    pub fn respond(&self) -> String {
        self.respond_at(local_now())
    }

    pub fn respond_at(&self, at: OffsetDateTime) -> String {
        let clock = at.format(SPOKEN_TIME_FORMAT).unwrap_or_else(|err| {
            tracing::warn!("time formatting failed: {err}");
            twelve_hour_clock(at.hour(), at.minute())
        });
        format!("It's {clock}.")
    }
}

fn twelve_hour_clock(hour: u8, minute: u8) -> String {
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{minute:02} {period}")
}

fn local_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    match UtcOffset::current_local_offset() {
        Ok(offset) => now.to_offset(offset),
        Err(err) => {
            tracing::debug!("local offset unavailable, using UTC: {err}");
            now
        }
    }
}
