// tests/dispatch_scenarios.rs
//
// End-to-end scenarios through Engine::reply: stage order, canned replies,
// corpus answers and the conversational fallback.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use otobot::config::AssistantConfig;
use otobot::corpus::{CorpusIndex, QaEntry};
use otobot::llm::{LimitedClient, MockProvider};
use otobot::pharmacy::PharmacyDirectory;
use otobot::{ChatRequest, Engine, EngineBuilder, Stage};

const CSV: &str = "\
nome;indirizzo;citta;cap;provincia;regione;telefono;email;latitudine;longitudine
Farmacia Centrale;Via Toledo 120;Napoli;80134;NA;Campania;081 5550101;;40.8422;14.2486
Farmacia Duomo;Piazza del Duomo 2;Milano;20122;MI;Lombardia;02 5550707;;45.4642;9.1900
";

fn corpus() -> CorpusIndex {
    CorpusIndex::new(vec![
        QaEntry::new("Ciao", "QUESTA RISPOSTA NON DEVE USCIRE"),
        QaEntry::new(
            "Quanto costa un apparecchio acustico?",
            "Il prezzo dipende dal modello e dalle esigenze di ascolto.",
        ),
        QaEntry::new(
            "Gli apparecchi acustici sono ricaricabili?",
            "Molti modelli sono ricaricabili.",
        ),
    ])
}

fn builder() -> EngineBuilder {
    // 2026-03-10 08:05 UTC is 09:05 in Rome (CET)
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 8, 5, 0).unwrap();
    EngineBuilder::new(AssistantConfig::default())
        .corpus(corpus())
        .pharmacies(PharmacyDirectory::from_csv_str(CSV))
        .now(now)
        .seed(5)
}

fn engine() -> Engine {
    builder().build()
}

#[tokio::test]
async fn time_question_replies_with_local_hhmm() {
    let r = engine().reply(&ChatRequest::text("che ore sono")).await;
    assert_eq!(r.stage, Stage::DateTime);
    assert!(r.text.contains("09:05"), "{}", r.text);
}

#[tokio::test]
async fn date_question_replies_in_italian() {
    let r = engine().reply(&ChatRequest::text("Che giorno è oggi?")).await;
    assert_eq!(r.stage, Stage::DateTime);
    assert!(r.text.contains("10 marzo 2026"), "{}", r.text);
}

#[tokio::test]
async fn greeting_wins_over_corpus() {
    let r = engine().reply(&ChatRequest::text("Ciao")).await;
    assert_eq!(r.stage, Stage::Greeting);
    assert_ne!(r.text, "QUESTA RISPOSTA NON DEVE USCIRE");
}

#[tokio::test]
async fn verbatim_corpus_question_gets_its_answer() {
    let r = engine()
        .reply(&ChatRequest::text("Gli apparecchi acustici sono ricaricabili?"))
        .await;
    assert_eq!(r.stage, Stage::Corpus);
    assert_eq!(r.text, "Molti modelli sono ricaricabili.");
}

#[tokio::test]
async fn english_question_gets_italian_only_apology() {
    let r = engine().reply(&ChatRequest::text("What are your hours?")).await;
    assert_eq!(r.stage, Stage::LanguageGate);
    assert!(r.text.contains("italiano"), "{}", r.text);
}

#[tokio::test]
async fn office_hours_use_configured_summary() {
    let r = engine()
        .reply(&ChatRequest::text("quali sono i vostri orari di apertura?"))
        .await;
    assert_eq!(r.stage, Stage::OfficeHours);
    assert!(r.text.contains("dal lunedì al venerdì"), "{}", r.text);
}

#[tokio::test]
async fn corporate_question_is_answered_from_facts() {
    let r = engine()
        .reply(&ChatRequest::text("Quando è stata fondata Otofarma?"))
        .await;
    assert_eq!(r.stage, Stage::Corporate);
    assert!(r.text.contains("2009"), "{}", r.text);
}

#[tokio::test]
async fn pharmacy_in_known_city_is_listed() {
    let r = engine()
        .reply(&ChatRequest::text("c'è una farmacia a Napoli?"))
        .await;
    assert_eq!(r.stage, Stage::Pharmacy);
    assert!(r.text.contains("Farmacia Centrale"), "{}", r.text);
    assert!(!r.text.contains("Farmacia Duomo"));
}

#[tokio::test]
async fn pharmacy_without_place_asks_for_city() {
    let r = engine().reply(&ChatRequest::text("cerco una farmacia")).await;
    assert_eq!(r.stage, Stage::Pharmacy);
    assert!(r.text.contains("città"), "{}", r.text);
}

#[tokio::test]
async fn near_me_uses_request_position() {
    let req = ChatRequest::text("farmacie qui vicino").with_position(45.46, 9.19);
    let r = engine().reply(&req).await;
    assert_eq!(r.stage, Stage::NearMe);
    let first = r.text.find("Farmacia Duomo").expect("closest listed");
    let second = r.text.find("Farmacia Centrale").expect("second listed");
    assert!(first < second);
}

#[tokio::test]
async fn llm_is_consulted_before_canned_fallback() {
    let llm = Arc::new(LimitedClient::new(
        MockProvider {
            fixed: "Per questo ti consiglio di rivolgerti al tuo audioprotesista.".into(),
        },
        10,
        400,
    ));
    let e = builder().llm(llm).build();
    let r = e
        .reply(&ChatRequest::text("mi piace molto il mare d'inverno"))
        .await;
    assert_eq!(r.stage, Stage::Llm);
    assert!(r.text.contains("audioprotesista"));
}

#[tokio::test]
async fn unknown_question_without_llm_falls_back() {
    let r = engine()
        .reply(&ChatRequest::text("mi piace molto il mare d'inverno"))
        .await;
    assert_eq!(r.stage, Stage::Fallback);
    assert!(!r.text.is_empty());
}

#[tokio::test]
async fn same_seed_same_reply() {
    let a = builder().build().reply_text("ciao").await;
    let b = builder().build().reply_text("ciao").await;
    assert_eq!(a, b);
}
