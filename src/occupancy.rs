/*!
 # Occupancy decision engine

 Maps "now", the active fetching hours, the manual override and a batch of
 calendar events onto a single boolean lamp state. Pure and deterministic;
 all I/O (calendar fetch, serial write) happens around it, which is what
 makes it testable in isolation.

 Quiet-hours policy: the configured window is the range of hours during
 which the calendar is consulted at all. Inside `[start, end)` events
 decide the lamp; outside it the lamp is forced off without fetching. A
 window that fails to parse fails open to "always fetch" rather than
 silently going dark.
*/

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::{debug, trace};

use crate::calendar::CalendarEvent;
use crate::{Error, Result};

/// Time-of-day range during which calendar polling is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl QuietWindow {
    /// Parses a window from two `HH:MM` strings.
    ///
    /// The window must lie within one day, start before end.
    pub fn parse(start: &str, end: &str) -> Result<QuietWindow> {
        let start = NaiveTime::parse_from_str(start, "%H:%M")
            .map_err(|e| Error::Configuration(format!("bad window start \"{start}\": {e}")))?;
        let end = NaiveTime::parse_from_str(end, "%H:%M")
            .map_err(|e| Error::Configuration(format!("bad window end \"{end}\": {e}")))?;
        if start >= end {
            return Err(Error::Configuration(format!(
                "window start {start} is not before end {end}"
            )));
        }
        Ok(QuietWindow { start, end })
    }

    /// True when `time` falls inside `[start, end)`
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Externally persisted manual override state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualOverride {
    /// When set, the operator owns the lamp and the calendar is ignored
    pub enabled: bool,
    /// The last state the operator set
    pub led_on: bool,
}

/// Sole output of the decision engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyResult {
    pub led_on: bool,
}

/// Computes the lamp state for `now`.
///
/// Evaluation order is fixed: the manual override short-circuits before
/// anything else is read, then the fetching-hours gate, then the event
/// scan. An event lights the lamp when it belongs to `calendar_id`, is
/// not an excluded all-day event, and `now` lies in
/// `[event.start - start_offset, event.end)`. The scan stops at the first
/// match, in input order.
pub fn decide(
    now: NaiveDateTime,
    quiet: Option<&QuietWindow>,
    manual: &ManualOverride,
    calendar_id: &str,
    events: &[CalendarEvent],
    start_offset: Duration,
    include_all_day: bool,
) -> OccupancyResult {
    if manual.enabled {
        debug!("Manual override active, keeping led_on={}", manual.led_on);
        return OccupancyResult {
            led_on: manual.led_on,
        };
    }

    // None means the configured window was unusable: fail open to fetch.
    let fetch_enabled = quiet.map_or(true, |w| w.contains(now.time()));
    if !fetch_enabled {
        debug!("Outside active fetching hours, forcing sign off");
        return OccupancyResult { led_on: false };
    }

    for event in events {
        if event.calendar_id != calendar_id {
            trace!("Skipping event from calendar {}", event.calendar_id);
            continue;
        }
        if event.all_day && !include_all_day {
            trace!("Skipping all-day event");
            continue;
        }
        let effective_start = event.start - start_offset;
        if now >= effective_start && now < event.end {
            debug!(
                "In event window [{} - {}), enabling LED",
                effective_start, event.end
            );
            return OccupancyResult { led_on: true };
        }
    }

    OccupancyResult { led_on: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event(calendar_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> CalendarEvent {
        CalendarEvent {
            calendar_id: calendar_id.to_string(),
            start,
            end,
            all_day: false,
        }
    }

    fn no_override() -> ManualOverride {
        ManualOverride::default()
    }

    const OFFSET: Duration = Duration::minutes(5);

    #[test]
    fn window_parse_accepts_hh_mm() {
        let window = QuietWindow::parse("08:00", "18:00").unwrap();
        assert!(window.contains(at(8, 0).time()));
        assert!(window.contains(at(17, 59).time()));
        assert!(!window.contains(at(18, 0).time()));
        assert!(!window.contains(at(7, 59).time()));
    }

    #[test]
    fn window_parse_rejects_garbage_and_inverted() {
        assert!(matches!(
            QuietWindow::parse("8 o'clock", "18:00"),
            Err(Error::Configuration(_))
        ));
        assert!(QuietWindow::parse("08:00", "25:00").is_err());
        assert!(QuietWindow::parse("18:00", "08:00").is_err());
        assert!(QuietWindow::parse("08:00", "08:00").is_err());
    }

    #[test]
    fn lamp_on_inside_offset_adjusted_event() {
        // now=10:00, event 10:05-10:30, offset 5min -> effective [10:00, 10:30)
        let events = [event("work", at(10, 5), at(10, 30))];
        let result = decide(
            at(10, 0),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(result.led_on);
    }

    #[test]
    fn lamp_off_just_before_adjusted_start() {
        let events = [event("work", at(10, 5), at(10, 30))];
        let result = decide(
            at(9, 59),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(!result.led_on);
    }

    #[test]
    fn lamp_off_at_event_end() {
        let events = [event("work", at(10, 5), at(10, 30))];
        let result = decide(
            at(10, 30),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(!result.led_on);
    }

    #[test]
    fn other_calendars_do_not_trigger() {
        let events = [event("home", at(10, 5), at(10, 30))];
        let result = decide(
            at(10, 15),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(!result.led_on);
    }

    #[test]
    fn all_day_events_respect_the_flag() {
        let mut all_day = event("work", at(0, 0), at(23, 59));
        all_day.all_day = true;
        let events = [all_day];

        let excluded = decide(
            at(10, 0),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(!excluded.led_on);

        let included = decide(
            at(10, 0),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            true,
        );
        assert!(included.led_on);
    }

    #[test]
    fn first_matching_event_wins() {
        let events = [
            event("work", at(10, 0), at(10, 30)),
            event("work", at(10, 0), at(11, 0)),
        ];
        let result = decide(
            at(10, 15),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(result.led_on);
    }

    #[test]
    fn override_short_circuits_contradictory_events() {
        // An in-window event that would turn the lamp on...
        let events = [event("work", at(10, 0), at(11, 0))];
        let manual = ManualOverride {
            enabled: true,
            led_on: false,
        };
        // ...is ignored: only the stored override state comes back.
        let result = decide(at(10, 30), None, &manual, "work", &events, OFFSET, false);
        assert!(!result.led_on);

        let manual = ManualOverride {
            enabled: true,
            led_on: true,
        };
        let result = decide(at(3, 0), None, &manual, "work", &[], OFFSET, false);
        assert!(result.led_on);
    }

    #[test]
    fn outside_fetching_hours_forces_off() {
        let window = QuietWindow::parse("08:00", "18:00").unwrap();
        let events = [event("work", at(19, 0), at(20, 0))];
        let result = decide(
            at(19, 30),
            Some(&window),
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(!result.led_on);
    }

    #[test]
    fn unparseable_window_fails_open_to_fetch() {
        // None models a window that did not parse
        let events = [event("work", at(10, 0), at(11, 0))];
        let result = decide(
            at(10, 30),
            None,
            &no_override(),
            "work",
            &events,
            OFFSET,
            false,
        );
        assert!(result.led_on);
    }
}
