//! Spanish date/time normalization against a fixed civil calendar.
//!
//! Dates come out as `DD/MM/YYYY`, times as `h:mm am|pm`. Anything that can't be
//! read yields `None`, which callers turn into a reprompt.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc, Weekday};
use regex::{Captures, Regex};

/// America/Lima: UTC-5 all year, no daylight saving.
pub const REFERENCE_OFFSET_WEST_SECS: i32 = 5 * 3600;

pub fn reference_offset() -> FixedOffset {
    FixedOffset::west_opt(REFERENCE_OFFSET_WEST_SECS).unwrap_or_else(|| Utc.fix())
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct TemporalNormalizer {
    clock: Arc<dyn Clock>,
}

impl TemporalNormalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Current civil date in the reference timezone.
    pub fn reference_today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&reference_offset()).date_naive()
    }

    pub fn today(&self) -> String {
        format_date(self.reference_today())
    }

    pub fn parse_date(&self, text: &str) -> Option<String> {
        resolve_date(text, self.reference_today()).map(format_date)
    }

    pub fn parse_time(&self, text: &str) -> Option<String> {
        resolve_time(text).map(format_time)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string().to_lowercase()
}

// ── Dates ──

fn resolve_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let folded = fold(text);
    if folded.is_empty() {
        return None;
    }
    // "de la mañana" is a time of day, not tomorrow
    let text = morning_regex().replace_all(&folded, " ");
    let text = text.trim();

    iso_date(text)
        .or_else(|| numeric_date(text, today))
        .or_else(|| textual_date(text, today))
        .or_else(|| relative_day(text, today))
        .or_else(|| offset_date(text, today))
        .or_else(|| weekday_date(text, today))
        .or_else(|| day_of_month(&folded, today))
        // A time on its own books for today.
        .or_else(|| resolve_time(&folded).map(|_| today))
}

fn iso_date(text: &str) -> Option<NaiveDate> {
    let caps = iso_date_regex().captures(text)?;
    NaiveDate::from_ymd_opt(num(&caps, 1)? as i32, num(&caps, 2)?, num(&caps, 3)?)
}

fn numeric_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = dotted_date_regex().captures(text) {
        let year = full_year(caps.get(3)?.as_str())?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, num(&caps, 2)?, num(&caps, 1)?) {
            return Some(date);
        }
    }

    let caps = slashed_date_regex().captures(text)?;
    let day = num(&caps, 1)?;
    let month = num(&caps, 2)?;
    match caps.get(3) {
        Some(year) => NaiveDate::from_ymd_opt(full_year(year.as_str())?, month, day),
        None => upcoming_day_month(today, month, day),
    }
}

fn textual_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    for caps in day_month_regex().captures_iter(text) {
        let Some(month) = month_number(&caps[2]) else {
            continue;
        };
        let day = num(&caps, 1)?;
        return match caps.get(3) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
            None => upcoming_day_month(today, month, day),
        };
    }

    for caps in month_day_regex().captures_iter(text) {
        let Some(month) = month_number(&caps[1]) else {
            continue;
        };
        let day = num(&caps, 2)?;
        return match caps.get(3) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
            None => upcoming_day_month(today, month, day),
        };
    }

    None
}

fn relative_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = relative_day_regex().captures(text)?;
    let days = match &caps[1] {
        "pasado manana" => 2,
        "manana" => 1,
        "hoy" => 0,
        "ayer" => -1,
        "anteayer" => -2,
        _ => return None,
    };
    today.checked_add_signed(Duration::days(days))
}

fn offset_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = offset_regex().captures(text) {
        let amount = count_word(&caps[1])?;
        let days = if caps[2].starts_with("semana") {
            amount * 7
        } else {
            amount
        };
        return today.checked_add_signed(Duration::days(days));
    }
    if next_week_regex().is_match(text) {
        return today.checked_add_signed(Duration::days(7));
    }
    None
}

/// Next occurrence of the named weekday, today included. With "próximo" or
/// "que viene" a same-day match skips to the following week.
fn weekday_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = weekday_regex().captures(text)?;
    let target = match &caps[1] {
        "lunes" => Weekday::Mon,
        "martes" => Weekday::Tue,
        "miercoles" => Weekday::Wed,
        "jueves" => Weekday::Thu,
        "viernes" => Weekday::Fri,
        "sabado" => Weekday::Sat,
        "domingo" => Weekday::Sun,
        _ => return None,
    };
    let from = today.weekday().num_days_from_monday() as i64;
    let to = target.num_days_from_monday() as i64;
    let mut ahead = (to - from).rem_euclid(7);
    if ahead == 0 && next_marker_regex().is_match(text) {
        ahead = 7;
    }
    today.checked_add_signed(Duration::days(ahead))
}

/// "el 25" or a bare "25": that day of this month, or of the next month that has it.
fn day_of_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = day_of_month_regex().captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..12 {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if date >= today {
                return Some(date);
            }
        }
        (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    }
    None
}

/// Day/month without a year: the first year from this one where that date
/// exists and hasn't passed. 29/02 may be up to eight years out.
fn upcoming_day_month(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    (today.year()..=today.year() + 8)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= today)
}

fn full_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}

fn month_number(word: &str) -> Option<u32> {
    let month = match word.trim_end_matches('.') {
        "enero" | "ene" => 1,
        "febrero" | "feb" => 2,
        "marzo" | "mar" => 3,
        "abril" | "abr" => 4,
        "mayo" | "may" => 5,
        "junio" | "jun" => 6,
        "julio" | "jul" => 7,
        "agosto" | "ago" => 8,
        "septiembre" | "setiembre" | "sep" | "sept" | "set" => 9,
        "octubre" | "oct" => 10,
        "noviembre" | "nov" => 11,
        "diciembre" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

fn count_word(word: &str) -> Option<i64> {
    let n = match word {
        "un" | "una" | "uno" => 1,
        "dos" => 2,
        "tres" => 3,
        "cuatro" => 4,
        "cinco" => 5,
        "seis" => 6,
        "siete" => 7,
        "ocho" => 8,
        "nueve" => 9,
        "diez" => 10,
        "once" => 11,
        "doce" => 12,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

// ── Times ──

fn resolve_time(text: &str) -> Option<NaiveTime> {
    let folded = fold(text);
    if folded.is_empty() {
        return None;
    }
    if noon_regex().is_match(&folded) {
        return NaiveTime::from_hms_opt(12, 0, 0);
    }
    if midnight_regex().is_match(&folded) {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }

    let text = meridiem_regex().replace_all(&folded, "${1}m");
    let text = hour_word_regex().replace_all(&text, |caps: &Captures| {
        let hour = count_word(&caps[2]).unwrap_or(0);
        format!("{} {hour}", &caps[1])
    });
    // Numbers inside dates are never hours.
    let text = iso_date_regex().replace_all(&text, " ");
    let text = dotted_date_regex().replace_all(&text, " ");
    let text = slashed_date_regex().replace_all(&text, " ");
    let text = text.trim();

    for caps in time_regex().captures_iter(text) {
        let strong = ["pre", "m", "suf", "frac", "part"]
            .iter()
            .any(|group| caps.name(group).is_some());
        if !strong {
            continue;
        }
        if let Some(time) = time_from_parts(&caps) {
            return Some(time);
        }
    }

    // A bare hour reads as the 24-hour clock.
    if bare_hour_regex().is_match(text) {
        let hour: u32 = text.parse().ok()?;
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }
    None
}

fn time_from_parts(caps: &Captures) -> Option<NaiveTime> {
    let hour: u32 = caps.name("h")?.as_str().parse().ok()?;
    let minute: u32 = match (caps.name("m"), caps.name("frac")) {
        (Some(m), _) => m.as_str().parse().ok()?,
        (None, Some(frac)) if frac.as_str() == "media" => 30,
        (None, Some(_)) => 15,
        (None, None) => 0,
    };

    let meridiem = caps
        .name("suf")
        .map(|s| s.as_str())
        .filter(|s| *s == "am" || *s == "pm")
        .or_else(|| caps.name("frac_suf").map(|s| s.as_str()))
        .or_else(|| caps.name("part").map(|p| p.as_str()));

    let hour = match meridiem {
        Some("am" | "manana" | "madrugada") => match hour {
            0..=11 => hour,
            12 => 0,
            _ => return None,
        },
        Some("pm" | "tarde") => match hour {
            1..=11 => hour + 12,
            12..=23 => hour,
            _ => return None,
        },
        Some("noche") => match hour {
            12 => 0,
            1..=11 => hour + 12,
            13..=23 => hour,
            _ => return None,
        },
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

// ── Text helpers ──

/// Lower-cases, strips Spanish accents and collapses whitespace.
fn fold(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            ',' => ' ',
            other => other,
        })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn num(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("literal regex must compile"))
        }
    };
}

cached_regex!(iso_date_regex, r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b");
cached_regex!(dotted_date_regex, r"\b(\d{1,2})\.(\d{1,2})\.(\d{2,4})\b");
cached_regex!(slashed_date_regex, r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2,4}))?\b");
cached_regex!(
    day_month_regex,
    r"\b(\d{1,2})(?:ro|ero)?\s+(?:de\s+)?([a-z]+\.?)(?:\s+(?:de\s+|del\s+)?(\d{4}))?\b"
);
cached_regex!(month_day_regex, r"\b([a-z]+\.?)\s+(\d{1,2})(?:\s+(\d{4}))?\b");
cached_regex!(
    relative_day_regex,
    r"\b(pasado manana|anteayer|manana|hoy|ayer)\b"
);
cached_regex!(
    offset_regex,
    r"\b(?:en|dentro de)\s+(\d{1,3}|un|una|uno|dos|tres|cuatro|cinco|seis|siete|ocho|nueve|diez)\s+(dias?|semanas?)\b"
);
cached_regex!(next_week_regex, r"\b(?:proxima semana|semana que viene)\b");
cached_regex!(
    weekday_regex,
    r"\b(lunes|martes|miercoles|jueves|viernes|sabado|domingo)\b"
);
cached_regex!(next_marker_regex, r"\b(?:proximo|proxima|que viene)\b");
cached_regex!(day_of_month_regex, r"^(?:(?:el|dia)\s+)?(\d{1,2})$");
cached_regex!(morning_regex, r"\b(?:de|por|en) la manana\b");
cached_regex!(noon_regex, r"\bmediodia\b");
cached_regex!(midnight_regex, r"\bmedianoche\b");
cached_regex!(meridiem_regex, r"\b([ap])\.\s?m\b\.?");
cached_regex!(
    hour_word_regex,
    r"\b(a las|a la)\s+(una|dos|tres|cuatro|cinco|seis|siete|ocho|nueve|diez|once|doce)\b"
);
cached_regex!(
    time_regex,
    r"(?:\b(?P<pre>a las|a la)\s+)?\b(?P<h>\d{1,2})(?:[:.](?P<m>\d{2}))?(?:\s*(?P<suf>am|pm|hrs|hr|horas|h)\b)?\b(?:\s+y\s+(?P<frac>media|cuarto)(?:\s*(?P<frac_suf>am|pm)\b)?)?(?:\s+(?:de|en|por) la\s+(?P<part>manana|tarde|noche|madrugada))?"
);
cached_regex!(bare_hour_regex, r"^\d{1,2}$");

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2025-10-15 12:00 in Lima, a Wednesday.
    fn normalizer() -> TemporalNormalizer {
        let now = Utc.with_ymd_and_hms(2025, 10, 15, 17, 0, 0).unwrap();
        TemporalNormalizer::new(Arc::new(FixedClock(now)))
    }

    fn date(s: &str) -> Option<String> {
        normalizer().parse_date(s)
    }

    fn time(s: &str) -> Option<String> {
        normalizer().parse_time(s)
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert_eq!(date(""), None);
        assert_eq!(time(""), None);
        assert_eq!(date("   "), None);
        assert_eq!(time("   "), None);
    }

    #[test]
    fn test_today_uses_fixed_offset() {
        assert_eq!(normalizer().today(), "15/10/2025");

        // 03:00 UTC on the 16th is still the 15th in Lima.
        let late = Utc.with_ymd_and_hms(2025, 10, 16, 3, 0, 0).unwrap();
        let n = TemporalNormalizer::new(Arc::new(FixedClock(late)));
        assert_eq!(n.today(), "15/10/2025");

        let later = Utc.with_ymd_and_hms(2025, 10, 16, 5, 0, 0).unwrap();
        let n = TemporalNormalizer::new(Arc::new(FixedClock(later)));
        assert_eq!(n.today(), "16/10/2025");
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(date("25/10/2025").as_deref(), Some("25/10/2025"));
        assert_eq!(date("5/1/2026").as_deref(), Some("05/01/2026"));
        assert_eq!(date("25-10-25").as_deref(), Some("25/10/2025"));
        assert_eq!(date("25.10.2025").as_deref(), Some("25/10/2025"));
        assert_eq!(date("2025-12-01").as_deref(), Some("01/12/2025"));
    }

    #[test]
    fn test_numeric_date_without_year_prefers_future() {
        assert_eq!(date("20/10").as_deref(), Some("20/10/2025"));
        assert_eq!(date("10/10").as_deref(), Some("10/10/2026"));
        assert_eq!(date("15/10").as_deref(), Some("15/10/2025"));
    }

    #[test]
    fn test_invalid_calendar_dates() {
        assert_eq!(date("31/02/2026"), None);
        assert_eq!(date("10/13/2025"), None);
        assert_eq!(date("1/1/202"), None);
    }

    #[test]
    fn test_textual_dates() {
        assert_eq!(date("25 de octubre").as_deref(), Some("25/10/2025"));
        assert_eq!(date("25 de octubre de 2026").as_deref(), Some("25/10/2026"));
        assert_eq!(date("3 de enero").as_deref(), Some("03/01/2026"));
        assert_eq!(date("1ro de Diciembre").as_deref(), Some("01/12/2025"));
        assert_eq!(date("octubre 30").as_deref(), Some("30/10/2025"));
        assert_eq!(date("7 sept 2026").as_deref(), Some("07/09/2026"));
        assert_eq!(date("lunes 27 de octubre").as_deref(), Some("27/10/2025"));
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(date("hoy").as_deref(), Some("15/10/2025"));
        assert_eq!(date("mañana").as_deref(), Some("16/10/2025"));
        assert_eq!(date("Manana").as_deref(), Some("16/10/2025"));
        assert_eq!(date("pasado mañana").as_deref(), Some("17/10/2025"));
        assert_eq!(date("ayer").as_deref(), Some("14/10/2025"));
        assert_eq!(date("mañana a las 8 pm").as_deref(), Some("16/10/2025"));
        assert_eq!(date("en 3 días").as_deref(), Some("18/10/2025"));
        assert_eq!(date("dentro de una semana").as_deref(), Some("22/10/2025"));
        assert_eq!(date("la próxima semana").as_deref(), Some("22/10/2025"));
    }

    #[test]
    fn test_morning_is_not_tomorrow() {
        assert_eq!(date("8 de la mañana").as_deref(), Some("15/10/2025"));
    }

    #[test]
    fn test_time_only_answer_means_today() {
        assert_eq!(date("8 pm").as_deref(), Some("15/10/2025"));
        assert_eq!(date("a las 8").as_deref(), Some("15/10/2025"));
        assert_eq!(date("8 y media de la noche").as_deref(), Some("15/10/2025"));
    }

    #[test]
    fn test_leap_day_without_year() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 17, 0, 0).unwrap();
        let n = TemporalNormalizer::new(Arc::new(FixedClock(now)));
        assert_eq!(n.parse_date("29/02").as_deref(), Some("29/02/2028"));
        assert_eq!(n.parse_date("29 de febrero").as_deref(), Some("29/02/2028"));
        assert_eq!(n.parse_date("10/03").as_deref(), Some("10/03/2026"));
    }

    #[test]
    fn test_weekdays_prefer_future() {
        assert_eq!(date("viernes").as_deref(), Some("17/10/2025"));
        assert_eq!(date("el lunes").as_deref(), Some("20/10/2025"));
        assert_eq!(date("martes").as_deref(), Some("21/10/2025"));
        assert_eq!(date("miércoles").as_deref(), Some("15/10/2025"));
        assert_eq!(date("el próximo miércoles").as_deref(), Some("22/10/2025"));
        assert_eq!(date("sábado").as_deref(), Some("18/10/2025"));
    }

    #[test]
    fn test_weekdays_never_in_the_past() {
        let n = normalizer();
        let today = n.reference_today();
        for name in ["lunes", "martes", "miercoles", "jueves", "viernes", "sabado", "domingo"] {
            let resolved = resolve_date(name, today).unwrap();
            assert!(resolved >= today, "{name} resolved to {resolved}");
            assert!(resolved < today + Duration::days(7));
        }
    }

    #[test]
    fn test_day_of_month() {
        assert_eq!(date("el 20").as_deref(), Some("20/10/2025"));
        assert_eq!(date("el 3").as_deref(), Some("03/11/2025"));
        assert_eq!(date("31").as_deref(), Some("31/10/2025"));
        assert_eq!(date("el 40"), None);
    }

    #[test]
    fn test_unparseable_dates() {
        assert_eq!(date("cuando puedas"), None);
        assert_eq!(date("algún día"), None);
        assert_eq!(date("8:75"), None);
    }

    #[test]
    fn test_times() {
        assert_eq!(time("8 pm").as_deref(), Some("8:00 pm"));
        assert_eq!(time("8pm").as_deref(), Some("8:00 pm"));
        assert_eq!(time("8 p.m.").as_deref(), Some("8:00 pm"));
        assert_eq!(time("8:30am").as_deref(), Some("8:30 am"));
        assert_eq!(time("20:00").as_deref(), Some("8:00 pm"));
        assert_eq!(time("20h").as_deref(), Some("8:00 pm"));
        assert_eq!(time("07:05").as_deref(), Some("7:05 am"));
        assert_eq!(time("12 pm").as_deref(), Some("12:00 pm"));
        assert_eq!(time("12 am").as_deref(), Some("12:00 am"));
        assert_eq!(time("9").as_deref(), Some("9:00 am"));
        assert_eq!(time("21").as_deref(), Some("9:00 pm"));
    }

    #[test]
    fn test_spoken_times() {
        assert_eq!(time("8 de la noche").as_deref(), Some("8:00 pm"));
        assert_eq!(time("a las ocho de la noche").as_deref(), Some("8:00 pm"));
        assert_eq!(time("3 de la tarde").as_deref(), Some("3:00 pm"));
        assert_eq!(time("9 de la mañana").as_deref(), Some("9:00 am"));
        assert_eq!(time("8 y media").as_deref(), Some("8:30 am"));
        assert_eq!(time("7 y cuarto de la tarde").as_deref(), Some("7:15 pm"));
        assert_eq!(time("a las 6").as_deref(), Some("6:00 am"));
        assert_eq!(time("mediodía").as_deref(), Some("12:00 pm"));
        assert_eq!(time("medianoche").as_deref(), Some("12:00 am"));
        assert_eq!(time("12 de la noche").as_deref(), Some("12:00 am"));
        assert_eq!(time("8 y media pm").as_deref(), Some("8:30 pm"));
        assert_eq!(time("7 y cuarto p.m.").as_deref(), Some("7:15 pm"));
        assert_eq!(time("9 y media am").as_deref(), Some("9:30 am"));
    }

    #[test]
    fn test_time_inside_date_text() {
        assert_eq!(time("mañana a las 8 pm").as_deref(), Some("8:00 pm"));
        assert_eq!(time("25/10/2025 8 pm").as_deref(), Some("8:00 pm"));
        assert_eq!(time("el 25 de octubre a las 19:30").as_deref(), Some("7:30 pm"));
    }

    #[test]
    fn test_invalid_times() {
        assert_eq!(time("25 pm"), None);
        assert_eq!(time("13 am"), None);
        assert_eq!(time("8:75"), None);
        assert_eq!(time("24"), None);
        assert_eq!(time("hola"), None);
        assert_eq!(time("25/10/2025"), None);
    }

    #[test]
    fn test_end_to_end_canonical_values() {
        let n = normalizer();
        assert_eq!(n.parse_date("25/10/2025").as_deref(), Some("25/10/2025"));
        assert_eq!(n.parse_time("8 pm").as_deref(), Some("8:00 pm"));
    }
}
