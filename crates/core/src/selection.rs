//! Process-wide selection: active domain, known domains, loaded competitors.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    models::{Competitor, Domain},
    storage::KeyValueStore,
};

/// Storage key remembering the last selected domain.
pub const DOMAIN_KEY: &str = "insightiq_domain";
/// Domain used when nothing was persisted.
pub const FALLBACK_DOMAIN: &str = "ai-ml";

/// Active domain plus the data derived from it.
pub struct SelectionStore {
    storage: Arc<dyn KeyValueStore>,
    active_domain: String,
    persisted: bool,
    known_domains: Vec<Domain>,
    active_competitors: Vec<Competitor>,
    competitors_domain: Option<String>,
}

impl SelectionStore {
    /// Restore the active domain from `storage`, falling back to [`FALLBACK_DOMAIN`].
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let stored = match storage.get(DOMAIN_KEY) {
            Ok(value) => value.filter(|slug| !slug.is_empty()),
            Err(err) => {
                warn!(?err, "Failed to read persisted domain");
                None
            }
        };
        let persisted = stored.is_some();
        let active_domain = stored.unwrap_or_else(|| FALLBACK_DOMAIN.to_string());
        info!(domain = %active_domain, persisted, "Selection restored");
        Self {
            storage,
            active_domain,
            persisted,
            known_domains: Vec::new(),
            active_competitors: Vec::new(),
            competitors_domain: None,
        }
    }

    /// Whether a domain choice survived from a previous session.
    pub fn has_persisted_domain(&self) -> bool {
        self.persisted
    }

    /// Currently active domain slug.
    pub fn active_domain(&self) -> &str {
        &self.active_domain
    }

    /// Switch the active domain and persist it. Membership is not checked.
    ///
    /// The in-memory value changes even when persisting fails.
    pub fn set_active_domain(&mut self, slug: &str) -> Result<()> {
        if self.active_domain != slug {
            self.active_competitors.clear();
            self.competitors_domain = None;
        }
        self.active_domain = slug.to_string();
        self.storage.set(DOMAIN_KEY, slug)?;
        self.persisted = true;
        Ok(())
    }

    /// Domains loaded at startup.
    pub fn known_domains(&self) -> &[Domain] {
        &self.known_domains
    }

    /// Replace the known domains.
    pub fn set_known_domains(&mut self, domains: Vec<Domain>) {
        self.known_domains = domains;
    }

    /// Look up a known domain by slug.
    pub fn domain(&self, slug: &str) -> Option<&Domain> {
        self.known_domains.iter().find(|domain| domain.slug == slug)
    }

    /// Competitors most recently loaded for the active domain.
    pub fn active_competitors(&self) -> &[Competitor] {
        &self.active_competitors
    }

    /// Competitors, but only when they were loaded for the current domain.
    pub fn competitors_for_active(&self) -> Option<&[Competitor]> {
        (self.competitors_domain.as_deref() == Some(self.active_domain.as_str()))
            .then_some(self.active_competitors.as_slice())
    }

    /// Record the competitors loaded for `domain`.
    pub fn set_active_competitors(&mut self, domain: &str, competitors: Vec<Competitor>) {
        self.competitors_domain = Some(domain.to_string());
        self.active_competitors = competitors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::tempdir;

    #[test]
    fn defaults_without_persisted_value() {
        let store = SelectionStore::open(Arc::new(MemoryStore::new()));
        assert_eq!(store.active_domain(), FALLBACK_DOMAIN);
        assert!(!store.has_persisted_domain());
    }

    #[test]
    fn active_domain_survives_restart() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state.json");

        let mut store = SelectionStore::open(Arc::new(FileStore::new(&path)));
        store.set_active_domain("x")?;

        let restarted = SelectionStore::open(Arc::new(FileStore::new(&path)));
        assert_eq!(restarted.active_domain(), "x");
        assert!(restarted.has_persisted_domain());
        Ok(())
    }

    #[test]
    fn switching_domain_invalidates_competitors() -> Result<()> {
        let mut store = SelectionStore::open(Arc::new(MemoryStore::new()));
        store.set_active_competitors(
            "ai-ml",
            vec![Competitor {
                name: "OpenAI".to_string(),
                logo: None,
            }],
        );
        assert_eq!(store.competitors_for_active().map(<[_]>::len), Some(1));

        store.set_active_domain("fintech")?;
        assert!(store.competitors_for_active().is_none());
        assert!(store.active_competitors().is_empty());
        Ok(())
    }
}
