//! Splits the combined event list into the two output buckets.

use crate::types::{Event, EventCategory};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// The two named output partitions handed to the output boundary.
#[derive(Debug, Default)]
pub struct Buckets {
    /// Movie showtimes within the lookahead window, ascending by date.
    pub movies_this_week: Vec<Event>,
    /// Concert/culture events from the run time onward, ascending by date.
    pub big_events_radar: Vec<Event>,
}

/// Partition and sort events relative to `now`.
///
/// Movies land in `movies_this_week` when their date falls inside
/// `[now, now + lookahead_days]`; movies beyond the window are dropped.
/// Radar events are kept from `now` onward with no upper bound. Sorting is
/// stable, so date ties keep the input (registry) order.
pub fn categorize(events: Vec<Event>, now: DateTime<Tz>, lookahead_days: i64) -> Buckets {
    let cutoff = now + Duration::days(lookahead_days.max(0));

    let mut movies_this_week: Vec<Event> = Vec::new();
    let mut big_events_radar: Vec<Event> = Vec::new();

    for event in events {
        match event.category() {
            EventCategory::Movie => {
                if event.date() >= now && event.date() <= cutoff {
                    movies_this_week.push(event);
                }
            }
            EventCategory::Radar => {
                if event.date() >= now {
                    big_events_radar.push(event);
                }
            }
        }
    }

    movies_this_week.sort_by_key(|event| event.date());
    big_events_radar.sort_by_key(|event| event.date());

    Buckets {
        movies_this_week,
        big_events_radar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::berlin_datetime;
    use std::collections::BTreeMap;

    fn movie(title: &str, date: DateTime<Tz>) -> Event {
        Event::new(
            title,
            date,
            "Astor Grand Cinema",
            "https://example.com/movie",
            EventCategory::Movie,
            BTreeMap::new(),
        )
        .unwrap()
    }

    fn concert(title: &str, date: DateTime<Tz>) -> Event {
        Event::new(
            title,
            date,
            "Faust",
            "https://example.com/concert",
            EventCategory::Radar,
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn sunday_night_movie_is_this_week_from_monday_midnight() {
        // Monday 00:00 run time, movie the following Sunday 23:59
        let now = berlin_datetime(2026, 9, 7, 0, 0).unwrap();
        let sunday_late = berlin_datetime(2026, 9, 13, 23, 59).unwrap();
        let buckets = categorize(vec![movie("Late Show", sunday_late)], now, 7);
        assert_eq!(buckets.movies_this_week.len(), 1);
    }

    #[test]
    fn movie_eight_days_out_lands_in_neither_bucket() {
        let now = berlin_datetime(2026, 9, 7, 0, 0).unwrap();
        let eight_days = berlin_datetime(2026, 9, 15, 20, 0).unwrap();
        let buckets = categorize(vec![movie("Too Far", eight_days)], now, 7);
        assert!(buckets.movies_this_week.is_empty());
        assert!(buckets.big_events_radar.is_empty());
    }

    #[test]
    fn past_events_are_dropped_from_both_buckets() {
        let now = berlin_datetime(2026, 9, 7, 12, 0).unwrap();
        let yesterday = berlin_datetime(2026, 9, 6, 20, 0).unwrap();
        let buckets = categorize(
            vec![movie("Gone", yesterday), concert("Also Gone", yesterday)],
            now,
            7,
        );
        assert!(buckets.movies_this_week.is_empty());
        assert!(buckets.big_events_radar.is_empty());
    }

    #[test]
    fn near_term_concert_stays_on_the_radar() {
        // A concert two days out is kept, not swallowed by the movie window
        let now = berlin_datetime(2026, 9, 7, 0, 0).unwrap();
        let soon = berlin_datetime(2026, 9, 9, 20, 0).unwrap();
        let buckets = categorize(vec![concert("Soon", soon)], now, 7);
        assert_eq!(buckets.big_events_radar.len(), 1);
    }

    #[test]
    fn radar_bucket_sorts_ascending_by_date() {
        let now = berlin_datetime(2026, 9, 7, 0, 0).unwrap();
        let a = concert("C", berlin_datetime(2026, 10, 1, 20, 0).unwrap());
        let b = concert("A", berlin_datetime(2026, 9, 10, 20, 0).unwrap());
        let c = concert("B", berlin_datetime(2026, 9, 20, 20, 0).unwrap());
        let buckets = categorize(vec![a, b, c], now, 7);
        let dates: Vec<_> = buckets.big_events_radar.iter().map(|e| e.date()).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(buckets.big_events_radar[0].title(), "A");
    }

    #[test]
    fn date_ties_keep_input_order() {
        let now = berlin_datetime(2026, 9, 7, 0, 0).unwrap();
        let same = berlin_datetime(2026, 9, 12, 20, 0).unwrap();
        let buckets = categorize(vec![concert("First", same), concert("Second", same)], now, 7);
        assert_eq!(buckets.big_events_radar[0].title(), "First");
        assert_eq!(buckets.big_events_radar[1].title(), "Second");
    }
}
