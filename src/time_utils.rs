use chrono::{Local, NaiveTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourFormat {
    Twelve,
    TwentyFour,
}

impl HourFormat {
    pub fn from_24h_flag(use_24h: bool) -> Self {
        if use_24h { HourFormat::TwentyFour } else { HourFormat::Twelve }
    }
}

/// Source of the current local time, consulted when the data source has no
/// usable state.
pub trait WallClock {
    fn now(&self) -> NaiveTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl WallClock for LocalClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A wall clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl WallClock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockTime {
    pub fn from_naive(t: NaiveTime) -> Self {
        Self { hour: t.hour(), minute: t.minute(), second: t.second() }
    }

    pub fn display_hour(&self, format: HourFormat) -> u32 {
        match format {
            HourFormat::TwentyFour => self.hour,
            HourFormat::Twelve => match self.hour % 12 {
                0 => 12,
                h => h,
            },
        }
    }

    /// Hour tens, hour units, minute tens, minute units. 12-hour mode carries
    /// no AM/PM, so 01:05 and 13:05 give the same digits.
    pub fn digits(&self, format: HourFormat) -> [char; 4] {
        let text = format!("{:02}{:02}", self.display_hour(format), self.minute);
        let mut out = ['0'; 4];
        for (slot, ch) in out.iter_mut().zip(text.chars()) {
            *slot = ch;
        }
        out
    }

    pub fn format_time(&self, format: HourFormat) -> String {
        format!("{:02}:{:02}", self.display_hour(format), self.minute)
    }

    pub fn format_time_suffix(&self, format: HourFormat) -> &'static str {
        match format {
            HourFormat::Twelve if self.hour >= 12 => " PM",
            HourFormat::Twelve => " AM",
            HourFormat::TwentyFour => "",
        }
    }
}

/// Parse an `HH:MM` or `HH:MM:SS` state string.
pub fn parse_state(state: &str) -> Option<ClockTime> {
    let state = state.trim();
    NaiveTime::parse_from_str(state, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(state, "%H:%M"))
        .ok()
        .map(ClockTime::from_naive)
}

/// Time to display for a data-source state: the parsed state, or the wall
/// clock when the state is empty or unparseable.
pub fn resolve_time(state: &str, clock: &impl WallClock) -> ClockTime {
    if state.trim().is_empty() {
        log::debug!("Empty time state, using wall clock");
        return ClockTime::from_naive(clock.now());
    }
    parse_state(state).unwrap_or_else(|| {
        log::warn!("Unparseable time state {:?}, using wall clock", state);
        ClockTime::from_naive(clock.now())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> FixedClock {
        FixedClock(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn parses_minutes_and_seconds_forms() {
        assert_eq!(parse_state("13:05"), Some(ClockTime { hour: 13, minute: 5, second: 0 }));
        assert_eq!(parse_state("07:45:59"), Some(ClockTime { hour: 7, minute: 45, second: 59 }));
        assert_eq!(parse_state("unavailable"), None);
        assert_eq!(parse_state("25:00"), None);
    }

    #[test]
    fn digits_in_both_formats() {
        let t = parse_state("13:05").unwrap();
        assert_eq!(t.digits(HourFormat::TwentyFour), ['1', '3', '0', '5']);
        assert_eq!(t.digits(HourFormat::Twelve), ['0', '1', '0', '5']);
    }

    #[test]
    fn twelve_hour_mode_is_ambiguous_between_am_and_pm() {
        let am = parse_state("01:05").unwrap();
        let pm = parse_state("13:05").unwrap();
        assert_eq!(am.digits(HourFormat::Twelve), pm.digits(HourFormat::Twelve));
        assert_ne!(am.format_time_suffix(HourFormat::Twelve), pm.format_time_suffix(HourFormat::Twelve));
    }

    #[test]
    fn midnight_and_noon_show_twelve() {
        let midnight = parse_state("00:30").unwrap();
        let noon = parse_state("12:00").unwrap();
        assert_eq!(midnight.digits(HourFormat::Twelve), ['1', '2', '3', '0']);
        assert_eq!(midnight.digits(HourFormat::TwentyFour), ['0', '0', '3', '0']);
        assert_eq!(noon.format_time(HourFormat::Twelve), "12:00");
        assert_eq!(noon.format_time_suffix(HourFormat::Twelve), " PM");
        assert_eq!(midnight.format_time_suffix(HourFormat::Twelve), " AM");
        assert_eq!(noon.format_time_suffix(HourFormat::TwentyFour), "");
    }

    #[test]
    fn empty_or_garbage_state_falls_back_to_wall_clock() {
        let clock = at(9, 41);
        assert_eq!(resolve_time("", &clock), ClockTime { hour: 9, minute: 41, second: 0 });
        assert_eq!(resolve_time("unknown", &clock), ClockTime { hour: 9, minute: 41, second: 0 });
        assert_eq!(resolve_time("22:10", &clock), ClockTime { hour: 22, minute: 10, second: 0 });
    }
}
