// src/pharmacy.rs
//! Pharmacy directory loaded once from a delimited file (`,` or `;`).
//!
//! Header names may be English or Italian (`nome`, `indirizzo`, `citta`, `cap`,
//! `provincia`, `regione`, `telefono`, `email`, `latitudine`, `longitudine`).
//! A missing file yields an empty directory; bad rows are skipped with a warning.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::text::{contains_phrase, normalize, tokens};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyRecord {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "indirizzo", default)]
    pub address: String,
    #[serde(alias = "citta", alias = "città", alias = "comune")]
    pub city: String,
    #[serde(alias = "cap", default)]
    pub postal_code: String,
    #[serde(alias = "provincia", default)]
    pub province: String,
    #[serde(alias = "regione", default)]
    pub region: String,
    #[serde(alias = "telefono", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(alias = "latitudine", alias = "latitude", default)]
    pub lat: Option<f64>,
    #[serde(alias = "longitudine", alias = "longitude", default)]
    pub lon: Option<f64>,
}

impl PharmacyRecord {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// A pharmacy together with its distance from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPharmacy<'a> {
    pub record: &'a PharmacyRecord,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PharmacyDirectory {
    records: Vec<PharmacyRecord>,
    /// (normalized city, record index), longest city first.
    cities: Vec<(String, usize)>,
}

impl PharmacyDirectory {
    pub fn new(records: Vec<PharmacyRecord>) -> Self {
        let mut cities: Vec<(String, usize)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (normalize(&r.city), i))
            .filter(|(c, _)| !c.is_empty())
            .collect();
        cities.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.1.cmp(&b.1)));
        Self { records, cities }
    }

    /// Load from disk. A missing file is not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "pharmacy file not found, directory is empty");
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let dir = Self::from_csv_str(&content);
        info!(pharmacies = dir.len(), "pharmacy directory loaded");
        Ok(dir)
    }

    pub fn from_csv_str(content: &str) -> Self {
        let header = content.lines().next().unwrap_or_default();
        let delimiter = if header.matches(';').count() > header.matches(',').count() {
            b';'
        } else {
            b','
        };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (i, row) in rdr.deserialize::<PharmacyRecord>().enumerate() {
            match row {
                Ok(r) if !r.name.is_empty() => records.push(r),
                Ok(_) => warn!(row = i + 1, "pharmacy row without name skipped"),
                Err(e) => warn!(row = i + 1, error = %e, "pharmacy row skipped"),
            }
        }
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PharmacyRecord] {
        &self.records
    }

    /// Distinct city and province names, for classifiers and the spelling dictionary.
    pub fn place_names(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .records
            .iter()
            .flat_map(|r| [r.city.clone(), r.province.clone()])
            .filter(|p| !p.trim().is_empty())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// City mentioned in the utterance (longest name wins, "torre del greco" before "greco").
    pub fn city_in(&self, normalized: &str) -> Option<&str> {
        self.cities
            .iter()
            .find(|(c, _)| contains_phrase(normalized, c))
            .map(|(c, _)| c.as_str())
    }

    /// All records whose normalized city equals `city`.
    pub fn in_city(&self, city: &str) -> Vec<&PharmacyRecord> {
        let city = normalize(city);
        self.records
            .iter()
            .filter(|r| normalize(&r.city) == city)
            .collect()
    }

    /// Free-text lookup: city first, then the best token overlap on name/address/province.
    pub fn search(&self, normalized: &str) -> Vec<&PharmacyRecord> {
        if let Some(city) = self.city_in(normalized) {
            return self.in_city(city);
        }
        let query: Vec<&str> = tokens(normalized).filter(|t| t.chars().count() > 3).collect();
        if query.is_empty() {
            return Vec::new();
        }
        let mut best: (usize, Vec<&PharmacyRecord>) = (0, Vec::new());
        for r in &self.records {
            let hay = normalize(&format!("{} {} {}", r.name, r.address, r.province));
            let score = query.iter().filter(|t| contains_phrase(&hay, t)).count();
            if score == 0 {
                continue;
            }
            if score > best.0 {
                best = (score, vec![r]);
            } else if score == best.0 {
                best.1.push(r);
            }
        }
        best.1
    }

    /// The `n` closest pharmacies with coordinates.
    pub fn nearest(&self, lat: f64, lon: f64, n: usize) -> Vec<NearbyPharmacy<'_>> {
        let mut v: Vec<NearbyPharmacy<'_>> = self
            .records
            .iter()
            .filter_map(|r| {
                r.coordinates().map(|(plat, plon)| NearbyPharmacy {
                    record: r,
                    distance_km: haversine_km(lat, lon, plat, plon),
                })
            })
            .collect();
        v.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        v.truncate(n);
        v
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
