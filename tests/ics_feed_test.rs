use boring_hannover::sources::concerts::kulturpalast::KulturpalastLindenSource;

const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20260912T203000\r\n\
DTEND:20260912T230000\r\n\
SUMMARY:Soli-Konzert im Pal\r\n ast\r\n\
URL:https://kulturpalast-hannover.de/event/soli-konzert/\r\n\
DESCRIPTION:Drei Bands\\, ein Abend.\\nEinlass ab 20 Uhr.\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20260919\r\n\
DTEND;VALUE=DATE:20260920\r\n\
SUMMARY:Flohmarkt im Hof\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20260925T220000\r\n\
DTEND:20260920T020000\r\n\
SUMMARY:Kaputtes Event\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20260926T200000\r\n\
SUMMARY:\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

#[test]
fn calendar_parse_handles_folding_all_day_and_broken_events() {
    let events = KulturpalastLindenSource::parse_calendar(FEED);

    // The event with DTEND days before DTSTART and the summaryless one drop
    assert_eq!(events.len(), 2);

    // Folded SUMMARY line is stitched back together
    let concert = &events[0];
    assert_eq!(concert.title(), "Soli-Konzert im Palast");
    assert_eq!(concert.format_time(), "Sat 20:30");
    assert_eq!(concert.url(), "https://kulturpalast-hannover.de/event/soli-konzert/");
    // Unescaped description, first line only
    assert_eq!(
        concert.metadata().get("description").map(String::as_str),
        Some("Drei Bands, ein Abend.")
    );

    // All-day events get the evening default instead of midnight,
    // and no URL falls back to the venue's events page
    let all_day = &events[1];
    assert_eq!(all_day.title(), "Flohmarkt im Hof");
    assert_eq!(all_day.format_time(), "Sat 20:00");
    assert_eq!(all_day.url(), "https://kulturpalast-hannover.de/events/");
}

#[test]
fn utc_timestamps_convert_to_local_time() {
    let feed = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20260912T180000Z\r\n\
SUMMARY:UTC Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let events = KulturpalastLindenSource::parse_calendar(feed);
    assert_eq!(events.len(), 1);
    // 18:00 UTC is 20:00 in Berlin during DST
    assert_eq!(events[0].format_time(), "Sat 20:00");
}

#[test]
fn empty_feed_yields_no_events() {
    assert!(KulturpalastLindenSource::parse_calendar("BEGIN:VCALENDAR\nEND:VCALENDAR\n").is_empty());
}
