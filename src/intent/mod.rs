// src/intent/mod.rs
//! Intent classifiers. Each one is a pure function of the utterance and is
//! evaluated by the dispatcher in its fixed order.

pub mod activation;
pub mod appointment;
pub mod corporate;
pub mod datetime;
pub mod greeting;
pub mod language;
pub mod location;
pub mod office_hours;
pub mod pharmacy;

pub use activation::{is_activation, strip_wake_word};
pub use appointment::{detect_appointment, detect_appointment_with, AppointmentIntent};
pub use corporate::{detect_corporate_topic, CorporateTopic};
pub use datetime::{detect_datetime, DateTimeQuery};
pub use greeting::{detect_greeting, Greeting};
pub use language::{detect_language, Language};
pub use location::is_near_me_query;
pub use office_hours::is_office_hours_query;
pub use pharmacy::PharmacyQuestionDetector;
