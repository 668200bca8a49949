//! Best-effort guess whether a visitor is in the Netherlands.
//!
//! Used when the host restricts the widget to Dutch visitors. Neither signal
//! is authoritative; either one is enough.

const DUTCH_TIME_ZONES: [&str; 1] = ["Europe/Amsterdam"];
const DUTCH_LANGUAGES: [&str; 2] = ["nl", "fy"];

/// True when the resolved time zone or any preferred language looks Dutch.
pub fn likely_in_netherlands<'a, I>(time_zone: Option<&str>, languages: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if time_zone.is_some_and(|tz| DUTCH_TIME_ZONES.contains(&tz.trim())) {
        return true;
    }
    languages.into_iter().any(|tag| {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or_default();
        DUTCH_LANGUAGES
            .iter()
            .any(|lang| primary.eq_ignore_ascii_case(lang))
    })
}
