// src/appointments.rs
//! Appointment persistence.
//!
//! Lookup requires BOTH name and phone and both must match the same record;
//! a partial query never discloses anything.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::text::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(name: &str, phone: &str, date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self {
            name: name.trim().to_string(),
            phone: phone_digits(phone),
            date,
            time,
            created_at: Utc::now(),
        }
    }

    fn matches(&self, name: &str, phone: &str) -> bool {
        normalize(&self.name) == normalize(name) && phone_digits(&self.phone) == phone_digits(phone)
    }
}

fn phone_digits(p: &str) -> String {
    p.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Storage behind appointment booking and lookup.
pub trait AppointmentStore: Send + Sync {
    fn save(&self, appt: Appointment) -> Result<()>;

    /// Most recent appointment matching both `name` and `phone`; `None` if either is missing.
    fn find(&self, name: Option<&str>, phone: Option<&str>) -> Result<Option<Appointment>>;
}

fn usable<'a>(name: Option<&'a str>, phone: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    let name = name.map(str::trim).filter(|n| !n.is_empty())?;
    let phone = phone.map(str::trim).filter(|p| !phone_digits(p).is_empty())?;
    Some((name, phone))
}

fn latest_match(items: &[Appointment], name: &str, phone: &str) -> Option<Appointment> {
    items
        .iter()
        .filter(|a| a.matches(name, phone))
        .max_by_key(|a| a.created_at)
        .cloned()
}

/// Volatile store, used by tests and when no file is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<Appointment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppointmentStore for MemoryStore {
    fn save(&self, appt: Appointment) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(appt);
        Ok(())
    }

    fn find(&self, name: Option<&str>, phone: Option<&str>) -> Result<Option<Appointment>> {
        let Some((name, phone)) = usable(name, phone) else {
            return Ok(None);
        };
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(latest_match(&items, name, phone))
    }
}

/// JSON array on disk; every save rewrites the file via temp file + rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Appointment>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(raw
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| match serde_json::from_value::<Appointment>(v) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!(item = i, error = %e, "appointment record skipped");
                    None
                }
            })
            .collect())
    }

    fn write_all(&self, items: &[Appointment]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut f =
                fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
            let data = serde_json::to_vec_pretty(items)?;
            f.write_all(&data)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl AppointmentStore for JsonFileStore {
    fn save(&self, appt: Appointment) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        items.push(appt);
        self.write_all(&items)
    }

    fn find(&self, name: Option<&str>, phone: Option<&str>) -> Result<Option<Appointment>> {
        let Some((name, phone)) = usable(name, phone) else {
            return Ok(None);
        };
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let items = self.read_all()?;
        Ok(latest_match(&items, name, phone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appt(name: &str, phone: &str) -> Appointment {
        Appointment::new(
            name,
            phone,
            NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0),
        )
    }

    #[test]
    fn memory_store_requires_both_fields() {
        let s = MemoryStore::new();
        s.save(appt("Mario Rossi", "333 1234567")).unwrap();

        assert!(s.find(None, Some("3331234567")).unwrap().is_none());
        assert!(s.find(Some("Mario Rossi"), None).unwrap().is_none());
        assert!(s.find(Some("Mario Rossi"), Some("3339999999")).unwrap().is_none());
        assert!(s.find(Some("Luigi Rossi"), Some("3331234567")).unwrap().is_none());

        let got = s.find(Some("mario rossi"), Some("333-123-4567")).unwrap().unwrap();
        assert_eq!(got.phone, "3331234567");
    }

    #[test]
    fn file_store_round_trips_and_skips_bad_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("appointments.json");
        let s = JsonFileStore::new(&path);

        assert!(s.find(Some("Anna"), Some("3470000000")).unwrap().is_none());
        s.save(appt("Anna Bianchi", "3470000000")).unwrap();
        s.save(appt("Luca Verdi", "3481111111")).unwrap();

        // corrupt one record by hand
        let mut raw: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        raw.push(serde_json::json!({"name": "broken"}));
        fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();

        let reopened = JsonFileStore::new(&path);
        let got = reopened
            .find(Some("Luca Verdi"), Some("348 111 1111"))
            .unwrap()
            .unwrap();
        assert_eq!(got.date, NaiveDate::from_ymd_opt(2026, 11, 3).unwrap());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
