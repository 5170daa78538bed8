use dioxus::prelude::*;
use tracing::warn;

use super::dom;
use crate::blocks::{Block, BlockId, ChildLocation, ListKey};
use crate::editor::persist::ticket_if_dirty;
use crate::editor::{CanvasModel, DragPayload, PersistGate, PersistTicket};

/// Shared by every component of one editor instance through context.
///
/// Mutations go through [`EditorHandle::mutate`], which turns a dirty model
/// into a persistence ticket. The debounce and the drag flush themselves run
/// from effects owned by `CanvasEditor`, so they survive the unmounting of
/// whichever block fired the event.
#[derive(Clone, Copy, PartialEq)]
pub struct EditorHandle {
    pub model: Signal<CanvasModel>,
    pub dragging: Signal<Option<DragPayload>>,
    pub hover: Signal<Option<(ListKey, usize)>>,
    pub gate: Signal<PersistGate>,
    pub flush_request: Signal<u64>,
    pub persist_request: Signal<Option<PersistTicket>>,
}

impl EditorHandle {
    pub fn mutate<R>(mut self, f: impl FnOnce(&mut CanvasModel) -> R) -> R {
        let out = f(&mut *self.model.write());
        self.persist_if_dirty();
        out
    }

    fn persist_if_dirty(mut self) {
        let ticket = ticket_if_dirty(&mut self.model.write(), &mut self.gate.write());
        if ticket.is_some() {
            self.persist_request.set(ticket);
        }
    }

    pub fn flush(self) {
        self.mutate(|model| model.flush_drag());
    }

    pub fn open_id(&self) -> Option<BlockId> {
        self.model.read().selection().open_id()
    }

    pub fn select_block(mut self, index: usize) {
        let selected = self.model.write().select_block(index);
        if selected {
            self.focus_open();
        }
    }

    pub fn select_child(mut self, location: ChildLocation) {
        let selected = self.model.write().select_child(location);
        if selected {
            self.focus_open();
        }
    }

    fn focus_open(&self) {
        if let Some(id) = self.model.peek().selection().open_id() {
            dom::focus(&id.dom_id());
        }
    }

    pub fn start_drag(mut self, payload: DragPayload) {
        self.dragging.set(Some(payload));
    }

    pub fn end_drag(mut self) {
        if self.dragging.peek().is_some() {
            self.dragging.set(None);
        }
        if self.hover.peek().is_some() {
            self.hover.set(None);
        }
    }

    /// Remember where a drop into `key` would land.
    pub fn hover_at(mut self, key: ListKey, index: usize) {
        if *self.hover.peek() != Some((key, index)) {
            self.hover.set(Some((key, index)));
        }
    }

    /// Drop whatever is being dragged into `key`, at the hovered slot or at
    /// `fallback_index`.
    pub fn drop_on(mut self, key: ListKey, fallback_index: usize) {
        let Some(payload) = self.dragging.write().take() else {
            warn!(?key, "drop without an active drag ignored");
            return;
        };
        let index = match *self.hover.peek() {
            Some((hovered, index)) if hovered == key => index,
            _ => fallback_index,
        };
        self.hover.set(None);
        if self.model.write().drop_entry(payload, key, index) {
            *self.flush_request.write() += 1;
        }
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.model.read().blocks().to_vec()
    }
}
