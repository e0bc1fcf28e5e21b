//! Interactive Tree Rendering Module
//!
//! Collapsible horizontal tree for one normalized hierarchy:
//! - Tidy layout (depth → x, leaf slots → y)
//! - Keyed reconciliation with enter/update/exit transitions
//! - Pan/zoom with bounded scale and animated reset
//! - Leaf detail events for the side panel

pub mod detail;
pub mod layout;
pub mod reconcile;
pub mod renderer;
pub mod state;
pub mod style;
pub mod transition;
pub mod viewer;
pub mod viewport;

pub use detail::{DetailEvent, DetailPanel, NodeDetail};
pub use layout::{compute_layout, LayoutEdge, LayoutNode, NodeKey, TreeLayout};
pub use reconcile::{reconcile, Keyed, Reconciliation};
pub use renderer::{Generation, TreeRenderer};
pub use state::{CollapseState, RenderState};
pub use style::TreeTheme;
pub use transition::{Frame, Scene, Tween};
pub use viewer::TreeViewer;
pub use viewport::{ViewTransform, Viewport};
