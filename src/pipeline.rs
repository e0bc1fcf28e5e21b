//! Load Pipeline
//!
//! Connects catalog selections to the renderer: each `SelectionChanged` starts a
//! background normalization on the tokio runtime, and the outcome comes back over
//! a channel that the UI polls once per frame. Outcomes from superseded requests
//! are discarded by generation.

use crate::catalog::{CatalogEntry, SelectionChanged};
use crate::error::NormalizeError;
use crate::model::TreeNode;
use crate::normalize::normalize;
use crate::source::DocumentSource;
use crate::tree::{Generation, TreeRenderer};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Hint appended to user-facing load failures
pub const RETRY_HINT: &str = "Please try another appendix";

/// Result of one background load
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: Generation,
    pub entry: CatalogEntry,
    pub result: Result<TreeNode, NormalizeError>,
}

pub struct LoadPipeline {
    runtime: Handle,
    source: Arc<dyn DocumentSource>,
    tx: UnboundedSender<LoadOutcome>,
    rx: UnboundedReceiver<LoadOutcome>,
}

impl LoadPipeline {
    pub fn new(runtime: Handle, source: Arc<dyn DocumentSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            source,
            tx,
            rx,
        }
    }

    /// Start loading the selected entry; supersedes any load still in flight
    pub fn request(&self, renderer: &mut TreeRenderer, selection: SelectionChanged) -> Generation {
        let SelectionChanged(entry) = selection;
        let generation = renderer.begin_load();
        log::info!("Loading appendix '{}' (generation {})", entry.name, generation.0);

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = normalize(Some(&entry), source.as_ref()).await;
            let outcome = LoadOutcome {
                generation,
                entry,
                result,
            };
            if tx.send(outcome).is_err() {
                log::debug!("Load pipeline closed before generation {} finished", generation.0);
            }
        });
        generation
    }

    /// Apply every finished load without blocking; returns how many were committed
    pub fn poll(&mut self, renderer: &mut TreeRenderer) -> usize {
        let mut committed = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            if apply(renderer, outcome) {
                committed += 1;
            }
        }
        committed
    }

    /// Wait for the next finished load
    pub async fn next_outcome(&mut self) -> Option<LoadOutcome> {
        self.rx.recv().await
    }
}

/// Hand one outcome to the renderer; stale generations are dropped there
pub fn apply(renderer: &mut TreeRenderer, outcome: LoadOutcome) -> bool {
    let LoadOutcome {
        generation,
        entry,
        result,
    } = outcome;

    match result {
        Ok(tree) => renderer.commit_tree(generation, tree),
        Err(e) => {
            log::error!("Failed to load appendix '{}': {}", entry.name, e);
            renderer.commit_failure(
                generation,
                &entry.name,
                format!("Failed to load appendix: {}\n{}", e, RETRY_HINT),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::source::StaticSource;
    use serde_json::json;

    fn entry(id: &str, config_path: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: format!("Appendix {}", id.to_uppercase()),
            category: "family".to_string(),
            config_path: config_path.to_string(),
        }
    }

    fn source() -> Arc<dyn DocumentSource> {
        let source = StaticSource::new()
            .with("fm/config.json", json!({ "name": "Appendix FM", "endpoints": ["fm.json"] }))
            .with(
                "both/config.json",
                json!({ "name": "Appendix Both", "endpoints": ["one.json", "two.json"] }),
            )
            .with(
                "fm/fm.json",
                json!({ "sections": [{
                    "sectionTitle": "Section 1",
                    "rules": [{ "ruleCode": "FM 1.1", "requirements": ["A"] }]
                }]}),
            );
        Arc::new(source)
    }

    #[tokio::test]
    async fn test_successful_load_commits_tree() {
        let mut pipeline = LoadPipeline::new(Handle::current(), source());
        let mut renderer = TreeRenderer::new(LayoutConfig::default());

        let generation = pipeline.request(&mut renderer, SelectionChanged(entry("fm", "fm/config.json")));
        assert!(renderer.is_loading());

        let outcome = pipeline.next_outcome().await.unwrap();
        assert_eq!(outcome.generation, generation);
        assert!(apply(&mut renderer, outcome));

        assert!(!renderer.is_loading());
        assert_eq!(renderer.tree().name, "Appendix FM");
        assert_eq!(renderer.tree().node_count(), 3);
        assert!(renderer.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_shows_message_and_empty_tree() {
        let mut pipeline = LoadPipeline::new(Handle::current(), source());
        let mut renderer = TreeRenderer::new(LayoutConfig::default());

        pipeline.request(&mut renderer, SelectionChanged(entry("x", "x/config.json")));
        let outcome = pipeline.next_outcome().await.unwrap();
        assert!(apply(&mut renderer, outcome));

        let error = renderer.error().unwrap();
        assert!(error.starts_with("Failed to load appendix"));
        assert!(error.ends_with(RETRY_HINT));
        assert!(renderer.is_empty());
        assert_eq!(renderer.tree().name, "Appendix X");
    }

    #[tokio::test]
    async fn test_all_endpoints_failing_shows_empty_tree() {
        let mut pipeline = LoadPipeline::new(Handle::current(), source());
        let mut renderer = TreeRenderer::new(LayoutConfig::default());
        renderer.load(TreeNode::root("Previous", vec![TreeNode::leaf("R1", None, None)]));

        pipeline.request(&mut renderer, SelectionChanged(entry("both", "both/config.json")));
        let outcome = pipeline.next_outcome().await.unwrap();
        assert!(matches!(
            outcome.result,
            Err(NormalizeError::EmptyData { declared: 2, failed: 2 })
        ));
        assert!(apply(&mut renderer, outcome));

        let error = renderer.error().unwrap();
        assert!(error.contains("No valid data loaded from endpoints"));
        assert!(error.ends_with(RETRY_HINT));
        assert!(renderer.is_empty());
        assert!(renderer.tree().children().is_empty());
        assert_eq!(renderer.tree().name, "Appendix BOTH");
        assert_eq!(renderer.layout().nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_superseded_request_is_discarded() {
        let mut pipeline = LoadPipeline::new(Handle::current(), source());
        let mut renderer = TreeRenderer::new(LayoutConfig::default());

        let first = pipeline.request(&mut renderer, SelectionChanged(entry("x", "x/config.json")));
        let second = pipeline.request(&mut renderer, SelectionChanged(entry("fm", "fm/config.json")));

        let mut outcomes = vec![
            pipeline.next_outcome().await.unwrap(),
            pipeline.next_outcome().await.unwrap(),
        ];
        // Apply the stale one last, as if it arrived late
        outcomes.sort_by_key(|o| std::cmp::Reverse(o.generation));
        assert_eq!(outcomes[0].generation, second);
        assert_eq!(outcomes[1].generation, first);

        let results: Vec<bool> = outcomes.into_iter().map(|o| apply(&mut renderer, o)).collect();
        assert_eq!(results, vec![true, false]);
        assert_eq!(renderer.tree().name, "Appendix FM");
        assert!(renderer.error().is_none());
    }
}
