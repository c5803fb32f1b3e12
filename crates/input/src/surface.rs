use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Raw pointer input in client (window) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { client_x: f32, client_y: f32 },
    Click { client_x: f32, client_y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Move,
    Click,
}

impl PointerEvent {
    pub fn kind(&self) -> PointerEventKind {
        match self {
            Self::Move { .. } => PointerEventKind::Move,
            Self::Click { .. } => PointerEventKind::Click,
        }
    }

    pub fn client_position(&self) -> Vec2 {
        match *self {
            Self::Move { client_x, client_y } | Self::Click { client_x, client_y } => {
                Vec2::new(client_x, client_y)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

/// Bounding rectangle of the surface in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for SurfaceRect {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl SurfaceRect {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Client pixels to normalized device coordinates: x right, y up, both
    /// in `-1..1` across the surface.
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Vec2 {
        Vec2::new(
            ((client_x - self.left) / self.width) * 2.0 - 1.0,
            -((client_y - self.top) / self.height) * 2.0 + 1.0,
        )
    }

    /// Inverse of [`to_ndc`](Self::to_ndc).
    pub fn to_client(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            self.left + (ndc.x + 1.0) / 2.0 * self.width,
            self.top + (1.0 - ndc.y) / 2.0 * self.height,
        )
    }
}

/// The part of the surface listeners may mutate while handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceState {
    pub rect: SurfaceRect,
    pub cursor: CursorStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(&PointerEvent, &mut SurfaceState)>;

struct Listener {
    id: ListenerId,
    kind: PointerEventKind,
    handler: Handler,
}

/// A drawing surface that receives pointer events and shows a cursor.
#[derive(Default)]
pub struct RenderSurface {
    state: SurfaceState,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl RenderSurface {
    pub fn new(rect: SurfaceRect) -> Self {
        Self {
            state: SurfaceState {
                rect,
                cursor: CursorStyle::Default,
            },
            ..Self::default()
        }
    }

    pub fn rect(&self) -> SurfaceRect {
        self.state.rect
    }

    pub fn cursor(&self) -> CursorStyle {
        self.state.cursor
    }

    pub fn set_cursor(&mut self, cursor: CursorStyle) {
        self.state.cursor = cursor;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.rect.width = width;
        self.state.rect.height = height;
    }

    /// Register a handler for one kind of pointer event.
    pub fn add_listener(
        &mut self,
        kind: PointerEventKind,
        handler: impl FnMut(&PointerEvent, &mut SurfaceState) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            kind,
            handler: Box::new(handler),
        });
        tracing::trace!(?id, ?kind, "listener added");
        id
    }

    /// Deregister a handler. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every matching listener. Returns how many ran.
    pub fn dispatch(&mut self, event: &PointerEvent) -> usize {
        let kind = event.kind();
        let mut invoked = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.handler)(event, &mut self.state);
            invoked += 1;
        }
        invoked
    }
}
