// Selection domain model - device, date and time-of-day range
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("minute {0} is outside 0..={max}", max = MinuteRange::MAX)]
    OutOfBounds(u16),
    #[error("minute {0} is not on the {step}-minute grid", step = MinuteRange::STEP)]
    OffGrid(u16),
    #[error("range start {start} is after end {end}")]
    Inverted { start: u16, end: u16 },
}

/// Inclusive minute-of-day range `[start, end]`.
///
/// Bounds lie on the 15-minute grid or at the last selectable minute (23:55).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteRange {
    start: u16,
    end: u16,
}

impl MinuteRange {
    pub const MIN: u16 = 0;
    pub const MAX: u16 = 1435;
    pub const STEP: u16 = 15;

    pub fn new(start: u16, end: u16) -> Result<Self, RangeError> {
        for value in [start, end] {
            if value > Self::MAX {
                return Err(RangeError::OutOfBounds(value));
            }
            if value % Self::STEP != 0 && value != Self::MAX {
                return Err(RangeError::OffGrid(value));
            }
        }
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole day, `[0, 1435]`.
    pub const fn full_day() -> Self {
        Self {
            start: Self::MIN,
            end: Self::MAX,
        }
    }

    /// Build a range the way the slider control does: clamp, snap down to the grid, order the bounds.
    pub fn clamped(start: i32, end: i32) -> Self {
        let a = Self::snap(start);
        let b = Self::snap(end);
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    fn snap(value: i32) -> u16 {
        let value = value.clamp(Self::MIN as i32, Self::MAX as i32) as u16;
        if value == Self::MAX {
            value
        } else {
            value - value % Self::STEP
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn contains(&self, minute: u16) -> bool {
        self.start <= minute && minute <= self.end
    }
}

impl Default for MinuteRange {
    fn default() -> Self {
        Self::full_day()
    }
}

impl fmt::Display for MinuteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            format_minute(self.start),
            format_minute(self.end)
        )
    }
}

/// `HH:MM` for a minute of the day.
pub fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Parse `HH:MM` into a minute of the day.
pub fn parse_minute(text: &str) -> Option<u16> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// What the operator is currently looking at.
///
/// Empty `device`/`date` mean "nothing selected yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub device: String,
    pub date: String,
    pub range: MinuteRange,
}

impl Selection {
    /// Dashboard data may only be requested once both device and date are set.
    pub fn is_complete(&self) -> bool {
        !self.device.is_empty() && !self.date.is_empty()
    }
}
