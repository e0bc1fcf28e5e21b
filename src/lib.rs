//! Appendix Tree - Interactive viewer for multi-source rule appendices
//!
//! Normalizes rule documents from several endpoints into one hierarchy and
//! renders it as a collapsible, animated tree.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod tree;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry, SelectionChanged, ALL_CATEGORIES};
pub use config::{LayoutConfig, Margin, ViewerConfig};
pub use error::{EndpointFetchError, FetchError, LayoutError, NormalizeError, RenderError, ViewError};
pub use model::{NodeKind, NodePath, TreeNode};
pub use normalize::{build_tree, normalize};
pub use pipeline::{LoadOutcome, LoadPipeline};
pub use source::{source_for_root, DocumentSource, FileSource, HttpSource, StaticSource};
pub use tree::{DetailEvent, DetailPanel, NodeDetail, TreeRenderer, TreeViewer};
