// tests/pharmacy_lookup.rs
//
// Pharmacy dataset parsing, city search, distance ranking and question scoring.

use otobot::intent::PharmacyQuestionDetector;
use otobot::pharmacy::{haversine_km, PharmacyDirectory};

const COMMA_CSV: &str = "\
name,address,city,postal_code,province,region,phone,email,lat,lon
Farmacia Centrale,Via Toledo 120,Napoli,80134,NA,Campania,081 5550101,,40.8422,14.2486
,Via Senza Nome 1,Napoli,80100,NA,Campania,,,,
Farmacia Vesuvio,Via Roma 8,Torre del Greco,80059,NA,Campania,081 5550404,,not-a-number,14.3680
Farmacia Duomo,Piazza del Duomo 2,Milano,20122,MI,Lombardia,02 5550707,,45.4642,9.1900
";

#[test]
fn comma_file_with_bad_rows() {
    let dir = PharmacyDirectory::from_csv_str(COMMA_CSV);
    let names: Vec<&str> = dir.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Farmacia Centrale", "Farmacia Duomo"]);
}

#[test]
fn shipped_dataset_loads() {
    let dir = PharmacyDirectory::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/farmacie.csv"))
        .expect("dataset");
    assert_eq!(dir.len(), 8);
    assert!(dir.place_names().iter().any(|p| p == "Torre del Greco"));
    let napoli = dir.in_city("napoli");
    assert_eq!(napoli.len(), 2);
}

#[test]
fn longest_city_name_wins() {
    let dir = PharmacyDirectory::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/farmacie.csv"))
        .expect("dataset");
    assert_eq!(dir.city_in("farmacia a torre del greco"), Some("torre del greco"));
    let found = dir.search("farmacia a torre del greco");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Farmacia Vesuvio");
}

#[test]
fn nearest_skips_rows_without_coordinates() {
    let dir = PharmacyDirectory::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/farmacie.csv"))
        .expect("dataset");
    let near = dir.nearest(41.89, 12.47, 10);
    assert_eq!(near.len(), 7, "Roma row has no coordinates");
    assert!(near.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[test]
fn haversine_napoli_milano() {
    let d = haversine_km(40.8518, 14.2681, 45.4642, 9.1900);
    assert!((640.0..=680.0).contains(&d), "{d}");
    assert!(haversine_km(40.0, 14.0, 40.0, 14.0).abs() < 1e-9);
}

#[test]
fn detector_scores_place_names() {
    let det = PharmacyQuestionDetector::new(["Napoli", "Salerno"]);
    // primary keyword alone
    assert!(det.is_pharmacy_question("c e una farmacia"));
    // location intent + known place
    assert!(det.is_pharmacy_question("dove vi trovo a salerno"));
    // place alone is not enough
    assert!(!det.is_pharmacy_question("abito a napoli"));
}
