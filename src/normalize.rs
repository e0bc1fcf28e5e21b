//! Data Normalizer
//!
//! Turns one catalog entry into a validated tree:
//! 1. Fetch the source configuration
//! 2. Fan out to every endpoint document concurrently
//! 3. Drop failed endpoints, flatten sections in declared order
//! 4. Drop empty sections, map sections to branches and rules to leaves

use crate::catalog::CatalogEntry;
use crate::error::{EndpointFetchError, FetchError, NormalizeError, Result};
use crate::model::{EndpointDocument, RuleDoc, SectionDoc, SourceConfig, TreeNode};
use crate::source::DocumentSource;
use futures::future::join_all;

/// Resolve an endpoint reference against the directory of its configuration.
///
/// Endpoints live under the first path segment of `configPath`
/// (`uk/appendix-fm/config.json` + `part1.json` -> `uk/part1.json`).
pub fn endpoint_path(config_path: &str, endpoint: &str) -> String {
    let base = config_path
        .trim_start_matches("./")
        .split('/')
        .next()
        .unwrap_or_default();
    if base.is_empty() || base == config_path.trim_start_matches("./") {
        endpoint.to_string()
    } else {
        format!("{}/{}", base, endpoint)
    }
}

/// Run the full pipeline for one catalog entry
pub async fn normalize(
    entry: Option<&CatalogEntry>,
    source: &dyn DocumentSource,
) -> Result<TreeNode> {
    let entry = entry.ok_or_else(|| {
        NormalizeError::Config("No appendix configuration provided".to_string())
    })?;

    if entry.config_path.trim().is_empty() {
        return Err(NormalizeError::Config(format!(
            "Invalid appendix config: Missing configPath for {}",
            entry.name
        )));
    }

    log::info!("Loading config from: {}", entry.config_path);
    let config = fetch_config(source, &entry.config_path).await?;

    let endpoints = match config.endpoints.as_deref() {
        Some(endpoints) if !endpoints.is_empty() => endpoints,
        _ => {
            return Err(NormalizeError::Config(
                "Invalid config format: Missing or invalid endpoints".to_string(),
            ))
        }
    };

    let results = fetch_endpoints(source, &entry.config_path, endpoints).await;
    let declared = results.len();

    let mut documents = Vec::with_capacity(declared);
    for result in results {
        match result {
            Ok(doc) => documents.push(doc),
            Err(e) => log::warn!("{}", e),
        }
    }
    let failed = declared - documents.len();
    log::info!(
        "Loaded {} of {} endpoints for {}",
        documents.len(),
        declared,
        entry.name
    );

    if documents.is_empty() || documents.iter().all(|d| d.sections.is_empty()) {
        return Err(NormalizeError::EmptyData { declared, failed });
    }

    let title = config
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| entry.name.clone());

    build_tree(title, documents)
}

async fn fetch_config(source: &dyn DocumentSource, config_path: &str) -> Result<SourceConfig> {
    let value = source
        .fetch(config_path)
        .await
        .map_err(|e| NormalizeError::Config(format!("Config load failed: {}", e)))?;

    serde_json::from_value(value)
        .map_err(|e| NormalizeError::Config(format!("Invalid config format: {}", e)))
}

/// Issue every request before awaiting any; results come back in declared order
async fn fetch_endpoints(
    source: &dyn DocumentSource,
    config_path: &str,
    endpoints: &[String],
) -> Vec<std::result::Result<EndpointDocument, EndpointFetchError>> {
    let requests = endpoints.iter().map(|endpoint| async move {
        let path = endpoint_path(config_path, endpoint);
        log::debug!("Loading endpoint: {}", path);

        let value = source.fetch(&path).await.map_err(|e| EndpointFetchError {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        serde_json::from_value::<EndpointDocument>(value).map_err(|e| EndpointFetchError {
            endpoint: endpoint.clone(),
            source: FetchError::Json { path, source: e },
        })
    });

    join_all(requests).await
}

/// Pure part of the pipeline: flatten, filter and map surviving documents
pub fn build_tree(title: impl Into<String>, documents: Vec<EndpointDocument>) -> Result<TreeNode> {
    let children: Vec<TreeNode> = documents
        .into_iter()
        .flat_map(|doc| doc.sections)
        .filter(|section| !section.rules.is_empty())
        .map(section_node)
        .collect();

    if children.is_empty() {
        return Err(NormalizeError::EmptyTree);
    }

    Ok(TreeNode::root(title, children))
}

fn section_node(section: SectionDoc) -> TreeNode {
    let rules = section.rules.into_iter().map(rule_node).collect();
    TreeNode::branch(section.section_title, section.section_description, rules)
}

fn rule_node(rule: RuleDoc) -> TreeNode {
    TreeNode::leaf(rule.rule_code, rule.rule_description, rule.requirements)
}
