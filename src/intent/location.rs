// src/intent/location.rs
//! "Near me" requests, answered from the caller's coordinates.

use once_cell::sync::Lazy;
use regex::Regex;

static NEAR_ME: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"\b(?:vicino a me|vicino a dove sono|qui vicino|nelle vicinanze|nei dintorni|nella mia zona|in zona|piu vicin[aoie]|vicino casa|dalla mia posizione|intorno a me)\b",
    )
    .ok()
});

pub fn is_near_me_query(normalized: &str) -> bool {
    NEAR_ME.as_ref().is_some_and(|re| re.is_match(normalized))
}
