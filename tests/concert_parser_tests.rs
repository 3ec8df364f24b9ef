use boring_hannover::dates::berlin_datetime;
use boring_hannover::sources::concerts::broncos::BroncosSource;
use boring_hannover::sources::concerts::faust::FaustSource;
use boring_hannover::sources::concerts::punkrock::PunkrockKonzerteSource;
use boring_hannover::sources::concerts::weltspiele::WeltspieleSource;
use boring_hannover::types::EventCategory;
use std::collections::HashSet;

const BRONCOS_PAGE: &str = r#"
<html><body>
<article class="event">
  <a class="event__link" href="/event/turbostaat-2026"></a>
  <time class="event__start-time" datetime="2026-09-12T20:00:00+02:00"></time>
  <h3 class="event__title">Turbostaat</h3>
  <span class="event__tagline">Punk Rock</span>
</article>
<article class="event">
  <a class="event__link" href="/event/duo-nord"></a>
  <time class="event__start-time" datetime="2026-09-13T19:00:00+02:00"></time>
  <h3 class="event__title">Duo Nord</h3>
  <span class="event__tagline">Mongolian Throat Singing</span>
</article>
<article class="event">
  <a class="event__link" href="/event/missing-time"></a>
  <h3 class="event__title">No Date Band</h3>
</article>
<article class="event">
  <time class="event__start-time" datetime="2026-09-14T20:00:00+02:00"></time>
  <h3 class="event__title">No Link Band</h3>
</article>
</body></html>
"#;

#[test]
fn broncos_parses_valid_cards_and_skips_malformed_ones() {
    let events = BroncosSource::parse_page(BRONCOS_PAGE);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title(), "Turbostaat");
    assert_eq!(events[0].url(), "https://www.stadtkind-kalender.de/event/turbostaat-2026");
    assert_eq!(events[0].category(), EventCategory::Radar);
    // Tagline normalized to the canonical taxonomy
    assert_eq!(
        events[0].metadata().get("genre").map(String::as_str),
        Some("Punk / Hardcore")
    );
    // Unknown tagline is carried through as-is
    assert_eq!(
        events[1].metadata().get("genre").map(String::as_str),
        Some("Mongolian Throat Singing")
    );
}

const PUNKROCK_PAGE: &str = r#"
<html><body>
<div class="row" itemtype="http://schema.org/Event">
  <meta itemprop="startDate" content="2026-09-12T20:30:00" />
  <span class="b">Slime</span>
  <span itemprop="location"><span itemprop="name">Faust</span>
    <span itemprop="address">Hannover</span></span>
  <a class="info" href="https://example.com/slime">Info</a>
</div>
<div class="row" itemtype="http://schema.org/Event">
  <meta itemprop="startDate" content="2026-01-10T20:00:00" />
  <span class="b">Long Gone</span>
</div>
<div class="row" itemtype="http://schema.org/Event">
  <span class="b">Date Box Band</span>
  <div class="dateBox">Sa. 19.09.2026</div>
</div>
</body></html>
"#;

#[test]
fn punkrock_reads_microdata_and_falls_back_to_date_box() {
    let now = berlin_datetime(2026, 9, 1, 0, 0).unwrap();
    let events = PunkrockKonzerteSource::parse_page(PUNKROCK_PAGE, now);

    // The January gig is in the past and dropped
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title(), "Slime");
    assert_eq!(events[0].venue(), "Faust");
    assert_eq!(events[0].url(), "https://example.com/slime");
    assert_eq!(events[0].format_time(), "Sat 20:30");

    // dateBox fallback defaults to the usual gig hour
    assert_eq!(events[1].title(), "Date Box Band");
    assert_eq!(events[1].format_time(), "Sat 20:00");
}

#[test]
fn punkrock_caps_a_very_long_listings_page() {
    let mut page = String::from("<html><body>");
    for i in 0..500 {
        page.push_str(&format!(
            r#"<div class="row" itemtype="http://schema.org/Event">
  <meta itemprop="startDate" content="2026-10-{:02}T20:00:00" />
  <span class="b">Band {i}</span>
</div>"#,
            (i % 28) + 1
        ));
    }
    page.push_str("</body></html>");

    let now = berlin_datetime(2026, 9, 1, 0, 0).unwrap();
    let events = PunkrockKonzerteSource::parse_page(&page, now);
    assert_eq!(events.len(), 60);
}

const FAUST_CONCERTS_PAGE: &str = r#"
<html><body>
<a href="/veranstaltungen/september/120926-le-fly.html">
  <p>Sa, 12.09.26</p>
  <p>Le Fly</p>
  <p>60er-Jahre Halle</p>
  <p>VVK 25&euro; / AK 32&euro;</p>
  <p>Einlass: 19:00 Uhr / Beginn: 20:30 Uhr</p>
</a>
<a href="/ueber-uns.html">Impressum</a>
</body></html>
"#;

#[test]
fn faust_builds_event_from_slug_date_and_text_lines() {
    let mut seen = HashSet::new();
    let events = FaustSource::parse_page(FAUST_CONCERTS_PAGE, "concert", false, &mut seen);

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.title(), "Le Fly");
    assert_eq!(event.format_time(), "Sat 20:30");
    assert_eq!(
        event.url(),
        "https://www.kulturzentrum-faust.de/veranstaltungen/september/120926-le-fly.html"
    );
    assert_eq!(
        event.metadata().get("location").map(String::as_str),
        Some("60er-Jahre Halle")
    );
}

#[test]
fn faust_deduplicates_across_category_pages() {
    let mut seen = HashSet::new();
    let first = FaustSource::parse_page(FAUST_CONCERTS_PAGE, "concert", false, &mut seen);
    let second = FaustSource::parse_page(FAUST_CONCERTS_PAGE, "party", false, &mut seen);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

const FAUST_STAGE_PAGE: &str = r#"
<html><body>
<a href="/veranstaltungen/september/150926-comedy-night.html">
  <p>Di, 15.09.26</p>
  <p>Comedy Night (English)</p>
</a>
<a href="/veranstaltungen/september/160926-kabarett.html">
  <p>Mi, 16.09.26</p>
  <p>Kabarett am Abend</p>
</a>
</body></html>
"#;

#[test]
fn faust_stage_category_keeps_only_english_shows() {
    let mut seen = HashSet::new();
    let events = FaustSource::parse_page(FAUST_STAGE_PAGE, "theater", true, &mut seen);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title(), "Comedy Night (English)");
}

const WELTSPIELE_PROGRAM: &str = r#"
<html><body>
<div class="program-month">
  <div class="program-month-title">September</div>
  <a href="/events/nachtschicht">
    <li class="program-event">
      <div class="program-event-header"><span class="in-brackets">(12)</span></div>
      <div class="underline">Nachtschicht</div>
      <div class="program-event-tag">techno</div>
      <div class="program-event-place">
        <div class="underline underline-rich-text-box">DJ A, DJ B</div>
      </div>
    </li>
  </a>
  <a href="https://weltspiele.club/events/jazzkeller">
    <li class="program-event">
      <div class="program-event-header"><span class="in-brackets">(19)</span></div>
      <div class="underline">Jazzkeller</div>
    </li>
  </a>
  <a href="/impressum">Impressum</a>
</div>
<div class="program-month">
  <div class="program-month-title">Irgendwann</div>
  <a href="/events/lost">
    <li class="program-event">
      <div class="program-event-header"><span class="in-brackets">(1)</span></div>
      <div class="underline">Lost</div>
    </li>
  </a>
</div>
</body></html>
"#;

#[test]
fn weltspiele_program_collects_entries_per_month_block() {
    let entries = WeltspieleSource::parse_program(WELTSPIELE_PROGRAM);

    // The unknown month block is skipped entirely
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].title, "Nachtschicht");
    assert_eq!(entries[0].day, 12);
    assert_eq!(entries[0].month, 9);
    assert_eq!(entries[0].url, "https://weltspiele.club/events/nachtschicht");
    assert_eq!(entries[0].tag.as_deref(), Some("techno"));
    assert_eq!(entries[0].lineup.as_deref(), Some("DJ A, DJ B"));

    assert_eq!(entries[1].title, "Jazzkeller");
    assert_eq!(entries[1].tag, None);
    assert_eq!(entries[1].lineup, None);
}
