//! In-memory algorithm store and session registry.
//!
//! Algorithms keep their submission order, which is the order every list
//! endpoint returns. Sessions map bearer tokens to users.

use std::{
    collections::HashMap,
    sync::RwLock,
};

use algomarket_core::{
    samples::{sample_catalog, sample_queue},
    Algorithm, AlgorithmId, AlgorithmStatus, Compiler, Decision, Language, ModeratedAlgorithm,
    NewAlgorithm, Pricing, Role, User,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::GatewayError;

/// Token of the demo moderator session seeded by [`MarketStore::with_demo_data`].
pub const DEMO_MODERATOR_TOKEN: &str = "demo-moderator";
/// Token of the demo author session seeded by [`MarketStore::with_demo_data`].
pub const DEMO_AUTHOR_TOKEN: &str = "demo-author";

/// A stored algorithm: its moderation record plus catalog metadata.
#[derive(Debug, Clone)]
pub struct StoredAlgorithm {
    pub record: ModeratedAlgorithm,
    pub pricing: Pricing,
    pub language: Language,
    pub compiler: Compiler,
    pub updated_at: DateTime<Utc>,
}

impl StoredAlgorithm {
    fn listing(&self) -> Algorithm {
        Algorithm {
            id: self.record.id.clone(),
            title: self.record.title.clone(),
            description: self.record.description.clone(),
            author: self.record.author_name.clone(),
            tags: self.record.tags.clone(),
            is_paid: self.pricing.is_paid(),
            price: self.pricing.price(),
            code: self.record.code.clone(),
            language: self.language.to_string(),
            compiler: self.compiler.to_string(),
            created_at: self.record.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Thread-safe store of algorithms and sessions.
#[derive(Debug, Default)]
pub struct MarketStore {
    algorithms: RwLock<IndexMap<AlgorithmId, StoredAlgorithm>>,
    sessions: RwLock<HashMap<String, User>>,
}

impl MarketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the sample catalog and queue, with one moderator
    /// and one author session.
    #[must_use]
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        for listing in sample_catalog() {
            let pricing = match listing.price {
                Some(price) if listing.is_paid => Pricing::Paid { price },
                _ => Pricing::Free,
            };
            let mut record = ModeratedAlgorithm::pending(
                listing.id,
                listing.title,
                listing.description,
                listing.author,
                listing.created_at,
            );
            record.tags = listing.tags;
            record.status = AlgorithmStatus::Approved;
            record.moderated_by = Some("moderator".to_owned());
            record.moderated_at = Some(listing.updated_at);
            store.insert(StoredAlgorithm {
                record,
                pricing,
                language: Language::Cpp,
                compiler: Compiler::Gpp,
                updated_at: listing.updated_at,
            });
        }
        for record in sample_queue() {
            let updated_at = record.moderated_at.unwrap_or(record.created_at);
            store.insert(StoredAlgorithm {
                record,
                pricing: Pricing::Free,
                language: Language::Cpp,
                compiler: Compiler::Gpp,
                updated_at,
            });
        }
        store.register_session(DEMO_MODERATOR_TOKEN, User::new("1", "moderator", Role::Moderator));
        store.register_session(DEMO_AUTHOR_TOKEN, User::new("2", "author", Role::Author));
        store
    }

    /// Insert or replace an algorithm, keeping its position when replacing.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn insert(&self, algorithm: StoredAlgorithm) {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.algorithms
            .write()
            .expect("algorithm store write lock poisoned")
            .insert(algorithm.record.id.clone(), algorithm);
    }

    /// Bind `token` to `user`, replacing any previous binding.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn register_session(&self, token: impl Into<String>, user: User) {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.sessions
            .write()
            .expect("session registry write lock poisoned")
            .insert(token.into(), user);
    }

    /// The user bound to `token`, if any.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn user_for_token(&self, token: &str) -> Option<User> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.sessions
            .read()
            .expect("session registry read lock poisoned")
            .get(token)
            .cloned()
    }

    /// Moderation records in submission order, optionally pending only.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn list(&self, pending_only: bool) -> Vec<ModeratedAlgorithm> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.algorithms
            .read()
            .expect("algorithm store read lock poisoned")
            .values()
            .filter(|a| !pending_only || a.record.is_pending())
            .map(|a| a.record.clone())
            .collect()
    }

    /// Approved algorithms as public catalog listings.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn catalog(&self) -> Vec<Algorithm> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.algorithms
            .read()
            .expect("algorithm store read lock poisoned")
            .values()
            .filter(|a| a.record.status == AlgorithmStatus::Approved)
            .map(StoredAlgorithm::listing)
            .collect()
    }

    /// Store a new submission by `author` as pending and return its record.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn submit(&self, submission: NewAlgorithm, author: &User) -> ModeratedAlgorithm {
        let now = Utc::now();
        let mut record = ModeratedAlgorithm::pending(
            AlgorithmId::new(Uuid::new_v4().to_string()),
            submission.title,
            submission.description,
            author.username.clone(),
            now,
        );
        record.tags = submission.tags;
        record.code = Some(submission.code);
        self.insert(StoredAlgorithm {
            record: record.clone(),
            pricing: submission.pricing,
            language: submission.language,
            compiler: submission.compiler,
            updated_at: now,
        });
        record
    }

    /// Apply `decision` to algorithm `id` on behalf of `moderator`.
    ///
    /// # Errors
    /// Returns [`GatewayError::AlgorithmNotFound`] for an unknown ID and
    /// [`GatewayError::AlreadyModerated`] if the algorithm is not pending.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn moderate(
        &self,
        id: &AlgorithmId,
        decision: &Decision,
        moderator: &User,
    ) -> Result<ModeratedAlgorithm, GatewayError> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut algorithms = self.algorithms.write().expect("algorithm store write lock poisoned");
        let entry = algorithms
            .get_mut(id)
            .ok_or_else(|| GatewayError::AlgorithmNotFound(id.clone()))?;
        let now = Utc::now();
        entry.record.apply(decision, moderator.username.clone(), now)?;
        entry.updated_at = now;
        Ok(entry.record.clone())
    }
}
