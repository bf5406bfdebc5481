//! Engine for a forum-post publishing tool: renders reusable post templates
//! with `[Name]` placeholders into final text, and keeps shared reference
//! data (instructions, tags, templates) consistent between a per-device
//! cache and a multi-user remote table.
//!
//! Everything here is synchronous and UI-free. The render and reconcile
//! entry points are pure functions of their arguments; callers own all I/O
//! initiation, persistence timing, and display.

pub mod composer;
pub mod debounce;
pub mod link;
pub mod preview;
pub mod reconcile;
pub mod registry;
pub mod render;
pub mod store;
pub mod template;

pub use composer::{Composer, LinkGroup};
pub use debounce::{Debounced, TEMPLATE_SWITCH_WINDOW, TEXT_INPUT_WINDOW};
pub use link::{build_final_link, extract_thread_id, normalize, LinkConfig, LinkSource};
pub use reconcile::{decode_remote_value, owned_subset, reconcile, Reconciled, RemoteRecord};
pub use registry::{RegistryError, VariableDeclaration, VariableKind, VariableRegistry};
pub use render::{render, ExtraLink, RenderOptions};
pub use template::{default_template, default_templates, Template};
