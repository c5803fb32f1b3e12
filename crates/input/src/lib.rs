//! Rendering surface: the element pointer events arrive on.
//!
//! # Invariants
//! - Listeners run in registration order, on the thread that dispatches.
//! - A removed listener is never invoked again.

pub mod surface;

pub use surface::{
    CursorStyle, ListenerId, PointerEvent, PointerEventKind, RenderSurface, SurfaceRect,
    SurfaceState,
};

pub fn crate_info() -> &'static str {
    "vitrine-input v0.1.0"
}
