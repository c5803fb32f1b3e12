//! Shared value types: node identity, transforms, packed colors, 2D extents.

mod types;

pub use types::{Color, Extent2, NodeId, Transform};

pub fn crate_info() -> &'static str {
    "vitrine-common v0.1.0"
}
