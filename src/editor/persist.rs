//! Debounced hand-off of the document to the host.
//!
//! Every structural change takes a ticket; a ticket only fires if nothing newer
//! was scheduled while it waited.

use super::canvas::CanvasModel;
use crate::blocks::Block;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistTicket(u64);

#[derive(Debug, Default)]
pub struct PersistGate {
    version: u64,
}

impl PersistGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self) -> PersistTicket {
        self.version = self.version.saturating_add(1);
        PersistTicket(self.version)
    }

    pub fn is_current(&self, ticket: PersistTicket) -> bool {
        ticket.0 == self.version
    }

    /// Invalidate anything still waiting.
    pub fn cancel(&mut self) {
        self.version = self.version.saturating_add(1);
    }
}

#[cfg(target_arch = "wasm32")]
pub async fn debounce_delay(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn debounce_delay(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Take a ticket if the model changed since the last check. A freshly built
/// model has nothing to persist.
pub fn ticket_if_dirty(model: &mut CanvasModel, gate: &mut PersistGate) -> Option<PersistTicket> {
    model.take_dirty().then(|| gate.schedule())
}

/// Wait out the debounce window, then snapshot the document if `ticket` is
/// still the newest. The caller hands the snapshot to the host.
pub async fn settle(
    ticket: PersistTicket,
    delay_ms: u64,
    is_current: impl Fn(PersistTicket) -> bool,
    snapshot: impl FnOnce() -> Vec<Block>,
) -> Option<Vec<Block>> {
    debounce_delay(delay_ms).await;
    if is_current(ticket) {
        Some(snapshot())
    } else {
        None
    }
}
