//! Draft lifecycle observers.

use hookline::{BeforeHandler, Context, EventKind, HandlerError, Request};

/// A draft lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftEvent {
    /// A new draft is started.
    New,
    /// A draft is edited.
    Patch,
    /// A draft is activated.
    Save,
}

impl DraftEvent {
    /// Every draft event, in lifecycle order.
    pub const ALL: [DraftEvent; 3] = [DraftEvent::New, DraftEvent::Patch, DraftEvent::Save];
}

impl From<DraftEvent> for EventKind {
    fn from(event: DraftEvent) -> Self {
        match event {
            DraftEvent::New => EventKind::New,
            DraftEvent::Patch => EventKind::Patch,
            DraftEvent::Save => EventKind::Save,
        }
    }
}

/// BEFORE NEW/PATCH/SAVE: logs the draft transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftObserver;

impl BeforeHandler for DraftObserver {
    async fn before(&self, req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        tracing::info!("Draft {} {}", req.event(), req.target().unwrap_or("-"));
        Ok(())
    }
}
