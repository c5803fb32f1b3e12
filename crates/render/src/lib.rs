//! Renderer seam: anything that turns a scene and a camera into output.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//!
//! The debug text renderer describes the node tree instead of drawing it,
//! which is what the CLI and tests consume.

mod renderer;

pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "vitrine-render v0.1.0"
}
