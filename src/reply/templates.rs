// src/reply/templates.rs
//! Italian reply templates. Each function picks one phrasing at random from a
//! fixed set; the caller owns the random source so tests can seed it.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::appointments::Appointment;
use crate::config::AssistantSection;
use crate::intent::Greeting;
use crate::pharmacy::{NearbyPharmacy, PharmacyRecord};

pub const EMPTY_MESSAGE_REPLY: &str = "Per favore, scrivi qualcosa.";

const WEEKDAYS: [&str; 7] = [
    "lunedì", "martedì", "mercoledì", "giovedì", "venerdì", "sabato", "domenica",
];
const MONTHS: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto", "settembre",
    "ottobre", "novembre", "dicembre",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, options: Vec<String>) -> String {
    options.choose(rng).cloned().unwrap_or_default()
}

fn capitalize_first(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        Some(f) => f.to_uppercase().chain(c).collect(),
        None => String::new(),
    }
}

pub fn format_date_it(d: NaiveDate) -> String {
    format!("{} {} {}", d.day(), MONTHS[d.month0() as usize], d.year())
}

fn weekday_it(d: NaiveDate) -> &'static str {
    WEEKDAYS[d.weekday().num_days_from_monday() as usize]
}

pub fn format_time_it(t: NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

pub fn greeting<R: Rng + ?Sized>(kind: Greeting, a: &AssistantSection, rng: &mut R) -> String {
    let options = match kind {
        Greeting::Hello => vec![
            format!("Ciao! Sono {}, l'assistente virtuale di {}. Come posso aiutarti?", a.name, a.company),
            "Buongiorno! Come posso esserti utile oggi?".to_string(),
            "Ciao! Chiedimi pure informazioni su apparecchi acustici, appuntamenti o farmacie.".to_string(),
            "Salve! Sono qui per aiutarti. Di cosa hai bisogno?".to_string(),
        ],
        Greeting::HowAreYou => vec![
            "Sto benissimo, grazie! E tu? Come posso aiutarti?".to_string(),
            "Tutto bene, grazie per averlo chiesto! Di cosa hai bisogno?".to_string(),
            "Benissimo! Sono pronto a rispondere alle tue domande.".to_string(),
        ],
        Greeting::Thanks => vec![
            "Prego! Se ti serve altro, sono qui.".to_string(),
            "Di nulla, è stato un piacere aiutarti!".to_string(),
            "Figurati! Hai altre domande?".to_string(),
        ],
        Greeting::Goodbye => vec![
            "Arrivederci e buona giornata!".to_string(),
            format!("A presto! Grazie per aver scelto {}.", a.company),
            "Ciao, alla prossima!".to_string(),
        ],
    };
    pick(rng, options)
}

pub fn introduction<R: Rng + ?Sized>(a: &AssistantSection, rng: &mut R) -> String {
    pick(
        rng,
        vec![
            format!("Ciao, sono {}, l'assistente virtuale di {}. Come posso aiutarti?", a.name, a.company),
            format!("Eccomi! Sono {}. Posso darti informazioni su prodotti, servizi, orari e farmacie {}.", a.name, a.company),
            format!("Sono {}, al tuo servizio. Chiedimi pure quello che ti serve sull'udito e sui servizi di {}.", a.name, a.company),
            format!("{} in ascolto! Cosa posso fare per te?", a.name),
        ],
    )
}

pub fn time_reply<R: Rng + ?Sized>(now: DateTime<Tz>, rng: &mut R) -> String {
    let hhmm = format!("{:02}:{:02}", now.hour(), now.minute());
    pick(
        rng,
        vec![
            format!("L'orario attuale è {hhmm}."),
            format!("Sono le {hhmm}."),
            format!("In questo momento sono le {hhmm}."),
            format!("Adesso sono le {hhmm}."),
        ],
    )
}

pub fn date_reply<R: Rng + ?Sized>(now: DateTime<Tz>, rng: &mut R) -> String {
    let d = now.date_naive();
    let wd = weekday_it(d);
    let full = format_date_it(d);
    pick(
        rng,
        vec![
            format!("Oggi è {wd} {full}."),
            format!("La data di oggi è {full}."),
            format!("Oggi è il {full}."),
            format!("È {wd} {full}."),
        ],
    )
}

pub fn office_hours<R: Rng + ?Sized>(a: &AssistantSection, summary: &str, rng: &mut R) -> String {
    pick(
        rng,
        vec![
            format!("I nostri uffici sono aperti {summary}."),
            format!("Siamo a tua disposizione {summary}. Puoi chiamarci al {}.", a.phone),
            format!("Orari di apertura: {summary}."),
        ],
    )
}

pub fn language_apology<R: Rng + ?Sized>(a: &AssistantSection, rng: &mut R) -> String {
    pick(
        rng,
        vec![
            format!(
                "Gentile utente, il servizio è ottimizzato per domande in italiano. Ti invitiamo a scrivere la tua richiesta in italiano. Puoi anche contattarci a {} o al {}.",
                a.email, a.phone
            ),
            format!(
                "Il nostro assistente virtuale funziona in italiano. Per favore, ripeti la domanda in italiano oppure scrivici a {}.",
                a.email
            ),
            "Questo servizio risponde solo a richieste in lingua italiana. Ti invitiamo a riformulare la domanda in italiano. Grazie!".to_string(),
        ],
    )
}

/// The fallback pool, with contacts filled in.
pub fn fallback_pool(a: &AssistantSection) -> Vec<String> {
    vec![
        format!("Mi dispiace, non ho una risposta precisa a questa domanda. Puoi riformularla oppure contattare il servizio clienti al {} o via email {}.", a.phone, a.email),
        format!("Al momento non dispongo di informazioni sufficienti per rispondere. Ti consiglio di consultare il sito {} o chiamare il servizio clienti.", a.website),
        format!("Non sono sicuro di poter aiutare con questa richiesta. Puoi provare a chiedere in modo diverso o scrivere a {}.", a.email),
        format!("Bella domanda! Per una risposta dettagliata ti suggerisco di contattare direttamente {} al {}.", a.company, a.phone),
        format!("Non ho la risposta pronta, ma puoi trovare molte informazioni utili su {}.", a.website),
        "Non ho capito bene. Potresti riformulare la domanda con altre parole?".to_string(),
        format!("Su questo non so aiutarti, ma i nostri operatori sì: chiama il {}.", a.phone),
    ]
}

fn pharmacy_line(r: &PharmacyRecord) -> String {
    let mut line = format!("{}, {}", r.name, r.address);
    if !r.city.is_empty() {
        line.push_str(&format!(", {}", r.city));
    }
    if !r.province.is_empty() {
        line.push_str(&format!(" ({})", r.province));
    }
    if !r.phone.is_empty() {
        line.push_str(&format!(", tel. {}", r.phone));
    }
    line
}

pub fn pharmacy_list<R: Rng + ?Sized>(place: &str, found: &[&PharmacyRecord], rng: &mut R) -> String {
    let place = capitalize_first(place);
    let n = found.len();
    let lines: Vec<String> = found.iter().take(5).map(|r| pharmacy_line(r)).collect();
    let head = if n == 1 {
        pick(
            rng,
            vec![
                format!("A {place} trovi la nostra farmacia convenzionata:"),
                format!("Ecco la farmacia Otofarma a {place}:"),
            ],
        )
    } else {
        pick(
            rng,
            vec![
                format!("A {place} ci sono {n} farmacie convenzionate:"),
                format!("Ecco le farmacie che ho trovato a {place}:"),
                format!("Ho trovato {n} farmacie a {place}:"),
            ],
        )
    };
    let more = if n > 5 {
        format!(" e altre {}", n - 5)
    } else {
        String::new()
    };
    format!("{head} {}{more}.", lines.join("; "))
}

pub fn pharmacy_not_found(a: &AssistantSection) -> String {
    format!(
        "Non ho trovato farmacie convenzionate per la località indicata. Chiama il {} e ti indicheremo la più vicina.",
        a.phone
    )
}

pub fn ask_for_city() -> String {
    "In quale città o zona cerchi una farmacia? Indicami il nome del comune.".to_string()
}

pub fn nearest_pharmacies(found: &[NearbyPharmacy<'_>]) -> String {
    let lines: Vec<String> = found
        .iter()
        .map(|p| format!("{} ({:.1} km)", pharmacy_line(p.record), p.distance_km))
        .collect();
    format!("Le farmacie più vicine a te sono: {}.", lines.join("; "))
}

pub fn ask_for_position() -> String {
    "Per trovare le farmacie più vicine ho bisogno della tua posizione. Attiva la geolocalizzazione oppure dimmi in quale città ti trovi.".to_string()
}

// --- appointments ---

pub fn appointment_missing(missing: &[&str]) -> String {
    let list = match missing {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} e {}", init.join(", "), last),
    };
    format!("Per procedere mi servono ancora: {list}. Puoi scrivermeli in un unico messaggio?")
}

pub fn appointment_past_date(d: NaiveDate) -> String {
    format!(
        "La data {} è già passata. Indicami una data futura per l'appuntamento.",
        format_date_it(d)
    )
}

pub fn appointment_confirmed<R: Rng + ?Sized>(appt: &Appointment, rng: &mut R) -> String {
    let when = match appt.time {
        Some(t) => format!("{} alle {}", format_date_it(appt.date), format_time_it(t)),
        None => format_date_it(appt.date),
    };
    pick(
        rng,
        vec![
            format!("Perfetto {}, il tuo appuntamento è registrato per il {when}. Ti contatteremo per conferma.", appt.name),
            format!("Fatto! Appuntamento fissato per il {when} a nome di {}.", appt.name),
        ],
    )
}

pub fn appointment_found(appt: &Appointment) -> String {
    let when = match appt.time {
        Some(t) => format!("{} alle {}", format_date_it(appt.date), format_time_it(t)),
        None => format_date_it(appt.date),
    };
    format!("Ho trovato il tuo appuntamento: {when}, a nome di {}.", appt.name)
}

pub fn appointment_not_found(a: &AssistantSection) -> String {
    format!(
        "Non ho trovato appuntamenti con questi dati. Controlla nome e numero oppure chiama il {}.",
        a.phone
    )
}

pub fn appointment_store_unavailable(a: &AssistantSection) -> String {
    format!(
        "Al momento non riesco ad accedere alle prenotazioni. Riprova più tardi o chiama il {}.",
        a.phone
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn time_reply_has_hh_mm() {
        let now = chrono_tz::Europe::Rome
            .with_ymd_and_hms(2026, 10, 19, 9, 5, 0)
            .unwrap();
        let r = time_reply(now, &mut rng());
        assert!(r.contains("09:05"), "{r}");
    }

    #[test]
    fn date_reply_uses_italian_names() {
        let now = chrono_tz::Europe::Rome
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .unwrap();
        let r = date_reply(now, &mut rng());
        assert!(r.contains("19 ottobre 2026"), "{r}");
    }

    #[test]
    fn missing_fields_are_listed_naturally() {
        assert_eq!(
            appointment_missing(&["il nome", "il numero di telefono", "la data"]),
            "Per procedere mi servono ancora: il nome, il numero di telefono e la data. Puoi scrivermeli in un unico messaggio?"
        );
        assert!(appointment_missing(&["la data"]).contains("ancora: la data."));
    }

    #[test]
    fn fallback_pool_mentions_contacts() {
        let a = AssistantSection::default();
        let pool = fallback_pool(&a);
        assert!(pool.len() >= 5);
        assert!(pool.iter().any(|m| m.contains(&a.phone)));
        assert!(pool.iter().all(|m| !m.is_empty()));
    }
}
