// src/engine.rs
//! # Engine
//! Everything the reply pipeline needs, built once at startup and shared by
//! reference: corpus + matcher, spelling corrector, pharmacy data, company
//! facts, fallback memory, the random source and the external collaborators.
//!
//! Missing optional data degrades the matching stage to a no-op; it is logged
//! here, once, and never per request.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::appointments::{AppointmentStore, JsonFileStore, MemoryStore};
use crate::config::AssistantConfig;
use crate::corporate::CorporateFacts;
use crate::corpus::CorpusIndex;
use crate::intent::PharmacyQuestionDetector;
use crate::llm::{self, DisabledClient, DynFallback};
use crate::matcher::{Capabilities, Matcher};
use crate::notify::{self, LogNotifier, Notifier};
use crate::pharmacy::PharmacyDirectory;
use crate::reply::templates;
use crate::reply::FallbackMemory;
use crate::speech::{self, Synthesizer, Transcriber};
use crate::text::keywords::IMPORTANT_KEYWORDS;
use crate::text::{Dictionary, SpellingCorrector};

pub struct Engine {
    pub(crate) cfg: AssistantConfig,
    pub(crate) tz: Tz,
    pub(crate) matcher: Matcher,
    pub(crate) corrector: SpellingCorrector,
    pub(crate) pharmacies: PharmacyDirectory,
    pub(crate) pharmacy_detector: PharmacyQuestionDetector,
    pub(crate) corporate: CorporateFacts,
    pub(crate) fallback_memory: FallbackMemory,
    pub(crate) fallback_pool: Vec<String>,
    pub(crate) store: Arc<dyn AppointmentStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) llm: DynFallback,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    rng: Mutex<StdRng>,
    fixed_now: Option<DateTime<Utc>>,
}

impl Engine {
    /// Load every data source named in `cfg` and wire the collaborators from the environment.
    pub fn from_config(cfg: AssistantConfig) -> Self {
        let corpus = CorpusIndex::load_dir(&cfg.data.corpus_dir);

        let pharmacies = match PharmacyDirectory::load(&cfg.data.pharmacies) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "pharmacy dataset unavailable");
                PharmacyDirectory::default()
            }
        };

        let dictionary = match &cfg.data.dictionary {
            Some(path) => match Dictionary::from_path(path) {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(error = %e, "spelling dictionary unavailable");
                    None
                }
            },
            None => None,
        };

        let corporate = match CorporateFacts::load(&cfg.data.corporate) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "corporate facts unreadable, using built-in answers");
                CorporateFacts::builtin()
            }
        };

        let store: Arc<dyn AppointmentStore> =
            Arc::new(JsonFileStore::new(cfg.data.appointments.clone()));
        let llm = llm::build_fallback(&cfg.llm);
        let (synthesizer, transcriber) = speech::from_env();

        let mut builder = EngineBuilder::new(cfg)
            .corpus(corpus)
            .pharmacies(pharmacies)
            .corporate(corporate)
            .store(store)
            .notifier(notify::notifier_from_env())
            .llm(llm);
        if let Some(d) = dictionary {
            builder = builder.dictionary(d);
        }
        if let Some(s) = synthesizer {
            builder = builder.synthesizer(s);
        }
        if let Some(t) = transcriber {
            builder = builder.transcriber(t);
        }
        builder.build()
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.cfg
    }

    pub fn corpus(&self) -> &CorpusIndex {
        self.matcher.corpus()
    }

    pub fn synthesizer(&self) -> Option<&Arc<dyn Synthesizer>> {
        self.synthesizer.as_ref()
    }

    pub fn transcriber(&self) -> Option<&Arc<dyn Transcriber>> {
        self.transcriber.as_ref()
    }

    /// Current time in the configured timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.fixed_now.unwrap_or_else(Utc::now).with_timezone(&self.tz)
    }

    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// A fallback message not used recently.
    pub(crate) fn fallback_reply(&self) -> String {
        self.with_rng(|rng| self.fallback_memory.pick(&self.fallback_pool, rng))
            .unwrap_or_else(|| templates::EMPTY_MESSAGE_REPLY.to_string())
    }
}

/// Assemble an [`Engine`] piece by piece. Anything not supplied gets an empty
/// or in-memory default, which is what tests want.
pub struct EngineBuilder {
    cfg: AssistantConfig,
    corpus: Option<CorpusIndex>,
    pharmacies: Option<PharmacyDirectory>,
    dictionary: Option<Dictionary>,
    corporate: Option<CorporateFacts>,
    store: Option<Arc<dyn AppointmentStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    llm: Option<DynFallback>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    seed: Option<u64>,
    now: Option<DateTime<Utc>>,
}

impl EngineBuilder {
    pub fn new(cfg: AssistantConfig) -> Self {
        Self {
            cfg,
            corpus: None,
            pharmacies: None,
            dictionary: None,
            corporate: None,
            store: None,
            notifier: None,
            llm: None,
            synthesizer: None,
            transcriber: None,
            seed: None,
            now: None,
        }
    }

    pub fn corpus(mut self, corpus: CorpusIndex) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn pharmacies(mut self, pharmacies: PharmacyDirectory) -> Self {
        self.pharmacies = Some(pharmacies);
        self
    }

    pub fn dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn corporate(mut self, facts: CorporateFacts) -> Self {
        self.corporate = Some(facts);
        self
    }

    pub fn store(mut self, store: Arc<dyn AppointmentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn llm(mut self, llm: DynFallback) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn synthesizer(mut self, s: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(s);
        self
    }

    pub fn transcriber(mut self, t: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(t);
        self
    }

    /// Seed the random source so template choice is reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Freeze the clock.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn build(self) -> Engine {
        let cfg = self.cfg;
        let tz = cfg.assistant.tz();
        let corpus = Arc::new(self.corpus.unwrap_or_default());
        let pharmacies = self.pharmacies.unwrap_or_default();
        let places = pharmacies.place_names();

        let corrector = if !cfg.capabilities.spelling {
            info!("spelling correction disabled");
            SpellingCorrector::disabled()
        } else if self.dictionary.is_none() {
            info!("no spelling dictionary, only the built-in misspelling table applies");
            SpellingCorrector::disabled()
        } else {
            let mut c = SpellingCorrector::new(self.dictionary, cfg.matching.spelling_similarity);
            c.learn(corpus.vocabulary());
            c.learn(&places);
            c.learn(IMPORTANT_KEYWORDS);
            c
        };

        let caps: Capabilities = cfg.capabilities;
        let matcher = Matcher::new(corpus.clone(), &cfg.matching, caps);
        let pharmacy_detector = PharmacyQuestionDetector::new(&places);

        let rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        let llm = self.llm.unwrap_or_else(|| Arc::new(DisabledClient));

        info!(
            corpus = corpus.len(),
            pharmacies = pharmacies.len(),
            spelling = corrector.has_dictionary(),
            semantic = cfg.capabilities.semantic,
            fuzzy = cfg.capabilities.fuzzy,
            llm = llm.provider_name(),
            "engine ready"
        );

        Engine {
            tz,
            matcher,
            corrector,
            pharmacy_detector,
            pharmacies,
            corporate: self.corporate.unwrap_or_default(),
            fallback_memory: FallbackMemory::with_capacity(cfg.fallback.memory),
            fallback_pool: templates::fallback_pool(&cfg.assistant),
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
            llm,
            synthesizer: self.synthesizer,
            transcriber: self.transcriber,
            rng: Mutex::new(rng),
            fixed_now: self.now,
            cfg,
        }
    }
}
