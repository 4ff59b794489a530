use crisisbrief_common::{EngineConfig, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::summarize::Summarizer;

type Factory = dyn Fn(&EngineConfig) -> Result<Summarizer> + Send + Sync;

/// Holds at most one live engine adapter, keyed by its configuration
///
/// The adapter is rebuilt only when a caller asks for a configuration that
/// differs (structurally) from the cached one. Rebuilding happens under the
/// write lock and the old instance is replaced only once the new one is
/// fully constructed.
pub struct EngineCache {
    factory: Box<Factory>,
    slot: RwLock<Option<(EngineConfig, Arc<Summarizer>)>>,
}

impl EngineCache {
    /// Create an empty cache with the given adapter factory
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&EngineConfig) -> Result<Summarizer> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            slot: RwLock::new(None),
        }
    }

    /// Cached adapter for `config`, building it if needed
    pub async fn get_or_create(&self, config: &EngineConfig) -> Result<Arc<Summarizer>> {
        {
            let slot = self.slot.read().await;
            if let Some((cached, summarizer)) = slot.as_ref() {
                if cached == config {
                    return Ok(summarizer.clone());
                }
            }
        }

        let mut slot = self.slot.write().await;

        // Another caller may have rebuilt it while we waited
        if let Some((cached, summarizer)) = slot.as_ref() {
            if cached == config {
                return Ok(summarizer.clone());
            }
        }

        info!("Initializing summarization engine: {}", config.resolved_model());
        let summarizer = Arc::new((self.factory)(config)?);
        *slot = Some((config.clone(), summarizer.clone()));

        Ok(summarizer)
    }

    /// Configuration of the live adapter, if any
    pub async fn current_config(&self) -> Option<EngineConfig> {
        self.slot.read().await.as_ref().map(|(config, _)| config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_trait::SummarizationEngine;
    use async_trait::async_trait;
    use crisisbrief_common::CrisisBriefError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NamedEngine(String);

    #[async_trait]
    impl SummarizationEngine for NamedEngine {
        async fn summarize(&self, _: &str, _: usize, _: usize, _: bool) -> Result<String> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            &self.0
        }
    }

    fn counting_cache(builds: Arc<AtomicUsize>) -> EngineCache {
        EngineCache::new(move |config: &EngineConfig| {
            builds.fetch_add(1, Ordering::SeqCst);
            if config.model.is_empty() {
                return Err(CrisisBriefError::config("empty model"));
            }
            let engine = Arc::new(NamedEngine(config.resolved_model().to_string()));
            Ok(Summarizer::new(engine, config.clone()))
        })
    }

    #[tokio::test]
    async fn test_same_config_reuses_instance() {
        let builds = Arc::new(AtomicUsize::new(0));
        let cache = counting_cache(builds.clone());
        let config = EngineConfig::new("llama3.2");

        let first = cache.get_or_create(&config).await.unwrap();
        // Equal by value, not by identity
        let second = cache.get_or_create(&config.clone()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_changed_config_rebuilds() {
        let builds = Arc::new(AtomicUsize::new(0));
        let cache = counting_cache(builds.clone());
        let primary = EngineConfig::new("llama3.2");
        let alternate = primary.clone().with_alternate_family(true);

        let first = cache.get_or_create(&primary).await.unwrap();
        let second = cache.get_or_create(&alternate).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.model_name(), "gemma2:2b");
        assert_eq!(cache.current_config().await, Some(alternate));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_build_keeps_old_instance() {
        let builds = Arc::new(AtomicUsize::new(0));
        let cache = counting_cache(builds);
        let good = EngineConfig::new("llama3.2");

        cache.get_or_create(&good).await.unwrap();
        assert!(cache.get_or_create(&EngineConfig::new("")).await.is_err());
        assert_eq!(cache.current_config().await, Some(good));
    }

    #[tokio::test]
    async fn test_concurrent_callers_build_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(counting_cache(builds.clone()));
        let config = EngineConfig::new("llama3.2");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                cache.get_or_create(&config).await.map(|s| s.model_name().to_string())
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "llama3.2");
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
