// src/intent/appointment.rs
//! Appointment requests: checking an existing booking vs. booking a new one,
//! and extraction of name, phone and date from the raw message.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::contains_phrase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentIntent {
    /// Lookup of an existing appointment; needs name and phone.
    Check,
    /// New booking; needs name, phone and date.
    Book,
}

const SUBJECT: &[&str] = &["appuntamento", "appuntamenti", "prenotazione", "visita", "controllo"];

// First person or possessive: the user talks about a booking they hold.
const CHECK_PHRASES: &[&str] = &[
    "il mio appuntamento",
    "la mia prenotazione",
    "mio appuntamento",
    "mia prenotazione",
    "ho un appuntamento",
    "ho gia un appuntamento",
    "ho prenotato",
    "avevo prenotato",
    "ho fissato",
    "avevo fissato",
    "quando e il mio",
];

const BOOK_VERBS: &[&str] = &[
    "prenotare", "prenota", "prenoto", "prenotami", "prenotatemi", "fissare", "fissami",
    "fissatemi",
];

// Verbs that already name who the booking is for.
const BOOK_IMPERATIVES: &[&str] = &["prenotami", "prenotatemi", "fissami", "fissatemi", "prenoto"];

const FIRST_PERSON: &[&str] = &[
    "vorrei", "voglio", "desidero", "devo", "vorremmo", "vogliamo", "mi serve", "ho bisogno di",
];

// Questions about the procedure, answered from the knowledge base.
const HOW_TO: &[&str] = &[
    "come posso", "come si", "come faccio", "come fare", "come funziona", "e possibile", "si puo",
    "si possono",
];

fn has(normalized: &str, list: &[&str]) -> bool {
    list.iter().any(|p| contains_phrase(normalized, p))
}

/// Whether the message names a booking verb outside a how-to question.
pub fn mentions_booking(normalized: &str) -> bool {
    has(normalized, BOOK_VERBS) && !has(normalized, HOW_TO)
}

/// Check wins over Book when both match ("vorrei verificare il mio appuntamento").
/// Book needs a booking verb with either a first-person request, an imperative
/// or a subject noun ("prenotare una visita").
pub fn detect_appointment(normalized: &str) -> Option<AppointmentIntent> {
    if has(normalized, CHECK_PHRASES) {
        return Some(AppointmentIntent::Check);
    }
    if !mentions_booking(normalized) {
        return None;
    }
    let governed = has(normalized, FIRST_PERSON)
        || has(normalized, BOOK_IMPERATIVES)
        || has(normalized, SUBJECT);
    governed.then_some(AppointmentIntent::Book)
}

/// [`detect_appointment`], plus a booking verb next to a phone number or a date
/// the user already typed ("prenota per domani, 347 1112233").
pub fn detect_appointment_with(
    normalized: &str,
    details: &AppointmentDetails,
) -> Option<AppointmentIntent> {
    detect_appointment(normalized).or_else(|| {
        (mentions_booking(normalized) && (details.phone.is_some() || details.date.is_some()))
            .then_some(AppointmentIntent::Book)
    })
}

/// Whatever could be read from one message; missing parts are asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

static NAME_INTRO: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:mi chiamo|il mio nome [eè]|a nome di|nome:?)\s+([\p{L}']+(?:\s+[\p{L}']+){0,2})",
    )
    .ok()
});
// case-sensitive on purpose: "sono" followed by capitalized words only
static NAME_SONO: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"\b[Ss]ono\s+(\p{Lu}[\p{L}']+(?:\s+\p{Lu}[\p{L}']+){0,2})").ok()
});
static PHONE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\+?\d[\d\s.]{6,16}\d").ok());
static DATE_NUMERIC: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{2}|\d{4})\b").ok());
static DATE_WORDS: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s+(gennaio|febbraio|marzo|aprile|maggio|giugno|luglio|agosto|settembre|ottobre|novembre|dicembre)(?:\s+(\d{4}))?\b",
    )
    .ok()
});
static DATE_RELATIVE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(dopodomani|domani)\b").ok());
static TIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\balle\s+(?:ore\s+)?(\d{1,2})(?:[:.](\d{2}))?\b").ok());

const MONTHS: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto", "settembre",
    "ottobre", "novembre", "dicembre",
];

const NAME_STOP: &[&str] = &[
    "e", "ed", "il", "la", "mio", "mia", "numero", "telefono", "cellulare", "vorrei", "per", "con",
    "di", "ho", "sono", "al", "alle", "del", "domani", "oggi",
];

/// Extract booking details from the raw (not normalized) message.
/// `today` anchors year-less and relative dates.
pub fn extract_details(raw: &str, today: NaiveDate) -> AppointmentDetails {
    let (date, time) = extract_date_time(raw, today);
    AppointmentDetails {
        name: extract_name(raw),
        phone: extract_phone(raw),
        date,
        time,
    }
}

pub fn extract_name(raw: &str) -> Option<String> {
    let caps = NAME_INTRO
        .as_ref()
        .and_then(|re| re.captures(raw))
        .or_else(|| NAME_SONO.as_ref().and_then(|re| re.captures(raw)))?;
    let words: Vec<&str> = caps.get(1)?.as_str().split_whitespace().collect();

    let mut kept = Vec::new();
    for w in words {
        if NAME_STOP.contains(&w.to_lowercase().as_str()) {
            break;
        }
        kept.push(capitalize(w));
    }
    (!kept.is_empty()).then(|| kept.join(" "))
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Digits only, national format (a leading +39 / 0039 is dropped).
/// A match that swallowed a trailing number ("347 111 2233 12 dicembre") is cut
/// back to the longest group-aligned prefix that still reads as a phone.
pub fn extract_phone(raw: &str) -> Option<String> {
    let re = PHONE.as_ref()?;
    re.find_iter(raw).find_map(|m| {
        let s = m.as_str();
        national_number(s).or_else(|| {
            s.char_indices()
                .rev()
                .filter(|(_, c)| c.is_whitespace() || *c == '.')
                .find_map(|(end, _)| national_number(&s[..end]))
        })
    })
}

fn national_number(candidate: &str) -> Option<String> {
    let digits: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = if candidate.trim_start().starts_with('+') {
        digits.strip_prefix("39").unwrap_or(&digits).to_string()
    } else if let Some(rest) = digits.strip_prefix("0039") {
        rest.to_string()
    } else {
        digits
    };
    (9..=11).contains(&national.len()).then_some(national)
}

pub fn extract_date_time(raw: &str, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveTime>) {
    let date = numeric_date(raw)
        .or_else(|| worded_date(raw, today))
        .or_else(|| relative_date(raw, today));
    let time = TIME.as_ref().and_then(|re| re.captures(raw)).and_then(|c| {
        let h: u32 = c.get(1)?.as_str().parse().ok()?;
        let m: u32 = c.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        NaiveTime::from_hms_opt(h, m, 0)
    });
    (date, time)
}

fn numeric_date(raw: &str) -> Option<NaiveDate> {
    let c = DATE_NUMERIC.as_ref()?.captures(raw)?;
    let d: u32 = c.get(1)?.as_str().parse().ok()?;
    let m: u32 = c.get(2)?.as_str().parse().ok()?;
    let y_raw = c.get(3)?.as_str();
    let mut y: i32 = y_raw.parse().ok()?;
    if y_raw.len() == 2 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, m, d)
}

fn worded_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let c = DATE_WORDS.as_ref()?.captures(raw)?;
    let d: u32 = c.get(1)?.as_str().parse().ok()?;
    let month_name = c.get(2)?.as_str().to_lowercase();
    let m = MONTHS.iter().position(|n| *n == month_name)? as u32 + 1;
    match c.get(3) {
        Some(y) => NaiveDate::from_ymd_opt(y.as_str().parse().ok()?, m, d),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), m, d)?;
            if this_year < today {
                NaiveDate::from_ymd_opt(today.year() + 1, m, d)
            } else {
                Some(this_year)
            }
        }
    }
}

fn relative_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let c = DATE_RELATIVE.as_ref()?.captures(raw)?;
    let days = if c.get(1)?.as_str().eq_ignore_ascii_case("dopodomani") {
        2
    } else {
        1
    };
    today.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn check_takes_precedence_over_booking() {
        assert_eq!(
            detect_appointment("vorrei verificare il mio appuntamento"),
            Some(AppointmentIntent::Check)
        );
        assert_eq!(
            detect_appointment("vorrei prenotare un appuntamento"),
            Some(AppointmentIntent::Book)
        );
        assert_eq!(detect_appointment("quanto costa un apparecchio"), None);
        assert_eq!(detect_appointment("appuntamento"), None);
    }

    #[test]
    fn information_questions_are_not_bookings() {
        for q in [
            "vorrei sapere se il controllo dell udito e gratuito",
            "potete confermare che il controllo dell udito e gratuito",
            "come posso prenotare un controllo dell udito",
            "vorrei informazioni sulla visita audiometrica",
            "si puo prenotare una visita a domicilio",
            "vorrei un nuovo controllo",
        ] {
            assert_eq!(detect_appointment(q), None, "{q}");
        }
    }

    #[test]
    fn booking_needs_a_governed_verb() {
        assert_eq!(detect_appointment("vorrei prenotare"), Some(AppointmentIntent::Book));
        assert_eq!(detect_appointment("prenotami una visita"), Some(AppointmentIntent::Book));
        assert_eq!(detect_appointment("fissare un controllo"), Some(AppointmentIntent::Book));
        assert_eq!(detect_appointment("ho prenotato ieri"), Some(AppointmentIntent::Check));
        assert_eq!(detect_appointment("prenotare"), None);
    }

    #[test]
    fn booking_verb_with_typed_details_is_a_booking() {
        let details = extract_details("prenota per domani, 347 1112233", today());
        assert_eq!(detect_appointment("prenota per domani 347 1112233"), None);
        assert_eq!(
            detect_appointment_with("prenota per domani 347 1112233", &details),
            Some(AppointmentIntent::Book)
        );
        let none = AppointmentDetails::default();
        assert_eq!(detect_appointment_with("prenota", &none), None);
    }

    #[test]
    fn extracts_name_variants() {
        assert_eq!(extract_name("Ciao, mi chiamo mario rossi e vorrei"), Some("Mario Rossi".into()));
        assert_eq!(extract_name("a nome di Anna Bianchi, tel 333"), Some("Anna Bianchi".into()));
        assert_eq!(extract_name("Sono Luca Verdi"), Some("Luca Verdi".into()));
        assert_eq!(extract_name("sono interessato a una visita"), None);
    }

    #[test]
    fn extracts_phone_numbers() {
        assert_eq!(extract_phone("il mio numero è 333 123 4567"), Some("3331234567".into()));
        assert_eq!(extract_phone("+39 081 1234567"), Some("0811234567".into()));
        assert_eq!(extract_phone("data 12.05.2027"), None);
        assert_eq!(extract_phone("nessun numero"), None);
        assert_eq!(
            extract_phone("numero 347 111 2233 12 dicembre"),
            Some("3471112233".into())
        );
    }

    #[test]
    fn extracts_dates_and_times() {
        let (d, t) = extract_date_time("il 12/11/2026 alle 10:30", today());
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 11, 12));
        assert_eq!(t, NaiveTime::from_hms_opt(10, 30, 0));

        let (d, t) = extract_date_time("il 3 marzo alle ore 9", today());
        assert_eq!(d, NaiveDate::from_ymd_opt(2027, 3, 3));
        assert_eq!(t, NaiveTime::from_hms_opt(9, 0, 0));

        let (d, _) = extract_date_time("domani", today());
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 10, 20));

        let (d, _) = extract_date_time("il 31/02/2027", today());
        assert_eq!(d, None);
    }

    #[test]
    fn full_message() {
        let got = extract_details(
            "Vorrei prenotare, mi chiamo Giulia Neri, numero 3471112233, il 5 dicembre 2026",
            today(),
        );
        assert_eq!(got.name.as_deref(), Some("Giulia Neri"));
        assert_eq!(got.phone.as_deref(), Some("3471112233"));
        assert_eq!(got.date, NaiveDate::from_ymd_opt(2026, 12, 5));
        assert_eq!(got.time, None);
    }
}
