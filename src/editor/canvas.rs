//! The canvas document and every operation the editor performs on it.
//!
//! `CanvasModel` is plain data: the Dioxus components keep one in a signal and
//! call into it from event handlers, so the whole editing flow can be driven
//! without a renderer.

use tracing::{debug, warn};

use super::drag::{DragBatch, DragPayload};
use super::selection::Selection;
use crate::blocks::columns::{self, ChildLocation};
use crate::blocks::document::{dedupe_document, find_block, prepare_document, Place};
use crate::blocks::{
    apply_patch, create_block, safe_columns, Block, BlockPatch, ColumnLayout, ListEntry, ListKey,
    PaletteItem,
};
use crate::config::EditorConfig;
use crate::error::Result;

#[derive(Debug)]
pub struct CanvasModel {
    blocks: Vec<Block>,
    selection: Selection,
    batch: DragBatch,
    dirty: bool,
    // edits made since the last hand-off to the host
    unsaved: bool,
    last_emitted: Option<Vec<Block>>,
    config: EditorConfig,
}

impl CanvasModel {
    pub fn new(blocks: Vec<Block>, config: EditorConfig) -> Self {
        Self {
            blocks: prepare_document(blocks),
            selection: Selection::Closed,
            batch: DragBatch::default(),
            dirty: false,
            unsaved: false,
            last_emitted: None,
            config,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The block bound to the settings panel, always the current copy.
    pub fn open_block(&self) -> Option<&Block> {
        self.selection.resolve(&self.blocks)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Report and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn commit(&mut self) {
        self.dirty = true;
        self.unsaved = true;
        self.selection.reconcile(&self.blocks);
    }

    /// Snapshot handed to the host's `on_change`. Remembered so the host's
    /// echo of it cannot roll back edits made after it was taken.
    pub fn mark_emitted(&mut self) -> Vec<Block> {
        let snapshot = self.blocks.clone();
        self.last_emitted = Some(snapshot.clone());
        self.unsaved = false;
        snapshot
    }

    /// Adopt a document handed in by the host. Our own emissions come back
    /// unchanged and are ignored, so this never marks the model dirty.
    pub fn on_external_blocks_change(&mut self, blocks: Vec<Block>) -> bool {
        if blocks == self.blocks {
            return false;
        }
        if self.unsaved && self.last_emitted.as_ref() == Some(&blocks) {
            debug!("stale echo of an earlier emission ignored");
            return false;
        }
        let prepared = prepare_document(blocks);
        if prepared == self.blocks {
            return false;
        }
        debug!(blocks = prepared.len(), "external document adopted");
        self.blocks = prepared;
        self.selection.reconcile(&self.blocks);
        true
    }

    /// Replace the document outright, e.g. when another template is opened.
    pub fn switch_document(&mut self, blocks: Vec<Block>) {
        self.blocks = prepare_document(blocks);
        self.selection = Selection::Closed;
        self.batch = DragBatch::default();
        self.dirty = false;
        self.unsaved = false;
        self.last_emitted = None;
    }

    pub fn update_block(&mut self, index: usize, patch: &BlockPatch) -> bool {
        let Some(block) = self.blocks.get(index) else {
            warn!(index, "update of a missing block ignored");
            return false;
        };
        let next = apply_patch(block, patch);
        if next == *block {
            return true;
        }
        let installed_columns = patch.columns.is_some() && next.is_columns();
        let parent = next.id;
        self.blocks[index] = next;
        if installed_columns {
            // the new matrix wins over any other placement of the same ids
            let blocks = std::mem::take(&mut self.blocks);
            self.blocks = dedupe_document(blocks, |key| {
                u64::from(matches!(key, ListKey::Column { parent: p, .. } if p == parent))
            });
        }
        self.commit();
        true
    }

    pub fn delete_block(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            warn!(index, "delete of a missing block ignored");
            return None;
        }
        let removed = self.blocks.remove(index);
        self.commit();
        Some(removed)
    }

    /// Click-to-add: append a palette item and open it.
    pub fn append_from_palette(&mut self, item: PaletteItem) -> usize {
        let block = create_block(ListEntry::Palette(item), &self.config);
        self.blocks.push(block);
        let index = self.blocks.len() - 1;
        self.commit();
        self.select_block(index);
        index
    }

    pub fn select_block(&mut self, index: usize) -> bool {
        self.select(Place::TopLevel(index))
    }

    pub fn select_child(&mut self, location: ChildLocation) -> bool {
        self.select(Place::Child(location))
    }

    fn select(&mut self, place: Place) -> bool {
        let next = Selection::at(&self.blocks, place);
        if !next.is_open() {
            warn!(?place, "selection of a missing block ignored");
            return false;
        }
        self.selection = next;
        true
    }

    pub fn close_selection(&mut self) {
        self.selection = Selection::Closed;
    }

    /// Delete whatever the settings panel is bound to.
    pub fn delete_open(&mut self) -> Option<Block> {
        match self.selection {
            Selection::Closed => None,
            Selection::TopLevel { id } => {
                let index = self.blocks.iter().position(|b| b.id == id)?;
                self.delete_block(index)
            }
            Selection::Child { location, .. } => self.delete_child(location),
        }
    }

    fn columns_parent(&self, parent_index: usize) -> Option<&Block> {
        self.blocks.get(parent_index).filter(|b| b.is_columns())
    }

    pub fn update_child(&mut self, location: ChildLocation, patch: &BlockPatch) -> bool {
        let updated = self.columns_parent(location.parent_index).and_then(|parent| {
            columns::update_child(parent, location.column_index, location.child_index, patch)
        });
        match updated {
            Some(parent) if parent == self.blocks[location.parent_index] => true,
            Some(parent) => {
                self.blocks[location.parent_index] = parent;
                self.commit();
                true
            }
            None => {
                warn!(?location, "update of a missing column child ignored");
                false
            }
        }
    }

    pub fn delete_child(&mut self, location: ChildLocation) -> Option<Block> {
        let result = self.columns_parent(location.parent_index).and_then(|parent| {
            columns::delete_child(parent, location.column_index, location.child_index)
        });
        let Some((parent, removed)) = result else {
            warn!(?location, "delete of a missing column child ignored");
            return None;
        };
        self.blocks[location.parent_index] = parent;
        self.commit();
        Some(removed)
    }

    pub fn change_layout(&mut self, parent_index: usize, layout: ColumnLayout) -> bool {
        let Some(parent) = self.columns_parent(parent_index) else {
            warn!(parent_index, "layout change on a missing columns block ignored");
            return false;
        };
        self.blocks[parent_index] = columns::change_layout(parent, layout);
        self.commit();
        true
    }

    /// Route a settings-panel edit to whatever is open.
    pub fn handle_settings_change(&mut self, key: &str, value: serde_json::Value) -> Result<()> {
        let patch = BlockPatch::from_setting(key, value)?;
        match self.selection {
            Selection::Closed => {
                warn!(key, "settings change with nothing open ignored");
            }
            Selection::Child { location, .. } => {
                self.update_child(location, &patch);
            }
            Selection::TopLevel { id } => {
                let Some(index) = self.blocks.iter().position(|b| b.id == id) else {
                    return Ok(());
                };
                match patch.layout {
                    Some(layout) if key == "layout" && self.blocks[index].is_columns() => {
                        self.change_layout(index, layout);
                    }
                    _ => {
                        self.update_block(index, &patch);
                    }
                }
            }
        }
        Ok(())
    }

    /// Current contents of one list as drag entries.
    pub fn list_entries(&self, key: ListKey) -> Option<Vec<ListEntry>> {
        match key {
            ListKey::Canvas => Some(self.blocks.iter().cloned().map(ListEntry::Block).collect()),
            ListKey::Column { parent, column } => {
                let parent = self.blocks.iter().find(|b| b.id == parent && b.is_columns())?;
                let list = safe_columns(parent).into_iter().nth(column)?;
                Some(list.into_iter().map(ListEntry::Block).collect())
            }
        }
    }

    /// The canvas list reported its new contents. Returns `true` when a flush
    /// must be scheduled.
    pub fn handle_canvas_drop(&mut self, list: Vec<ListEntry>) -> bool {
        self.batch.report_canvas(list)
    }

    /// A column list reported its new contents.
    pub fn handle_column_drop(&mut self, parent_index: usize, column: usize, list: Vec<ListEntry>) -> bool {
        let Some(parent) = self.columns_parent(parent_index) else {
            warn!(parent_index, "column drop on a missing columns block ignored");
            return false;
        };
        let parent = parent.id;
        self.batch.report_column(parent, column, list)
    }

    /// One physical drop of `payload` at `index` in `target`: report the list it
    /// left (if any) and the list it entered.
    pub fn drop_entry(&mut self, payload: DragPayload, target: ListKey, index: usize) -> bool {
        if payload.entry.block_type().is_columns() && matches!(target, ListKey::Column { .. }) {
            warn!("columns cannot be dropped inside a column");
            return false;
        }
        let Some(mut target_list) = self.list_entries(target) else {
            warn!(?target, "drop on a missing list ignored");
            return false;
        };
        let dragged_id = payload.entry.block_id();
        if let (Some(_), Some(id)) = (payload.origin, dragged_id) {
            if find_block(&self.blocks, id).is_none() {
                warn!(%id, "drop of a block deleted mid-drag ignored");
                return false;
            }
        }
        let mut index = index.min(target_list.len());

        let mut schedule = false;
        match payload.origin {
            Some(origin) if origin == target => {
                if let Some(from) = target_list
                    .iter()
                    .position(|e| e.block_id().is_some() && e.block_id() == dragged_id)
                {
                    target_list.remove(from);
                    if from < index {
                        index -= 1;
                    }
                }
            }
            Some(origin) => {
                if let Some(mut source_list) = self.list_entries(origin) {
                    source_list.retain(|e| e.block_id().is_none() || e.block_id() != dragged_id);
                    schedule |= self.batch.report(origin, source_list);
                }
            }
            None => {}
        }

        target_list.insert(index, payload.entry);
        schedule |= self.batch.report(target, target_list);
        schedule
    }

    /// Apply every report collected since the last flush as one change.
    pub fn flush_drag(&mut self) -> bool {
        let batch = std::mem::take(&mut self.batch);
        if batch.is_empty() {
            return false;
        }
        let next = batch.apply(&self.blocks, &self.config);
        if next == self.blocks {
            return false;
        }
        self.blocks = next;
        self.commit();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::document::placements;
    use crate::blocks::{BlockId, BlockType};

    fn model() -> CanvasModel {
        CanvasModel::new(Vec::new(), EditorConfig::default())
    }

    fn add(model: &mut CanvasModel, ty: BlockType) -> BlockId {
        let index = model.append_from_palette(PaletteItem::new(ty));
        model.blocks()[index].id
    }

    #[test]
    fn new_model_is_clean() {
        let blocks = vec![Block::new(BlockId(1), BlockType::Text)];
        let mut model = CanvasModel::new(blocks, EditorConfig::default());
        assert!(!model.take_dirty());
        assert_eq!(model.selection(), Selection::Closed);
    }

    #[test]
    fn update_refreshes_open_block() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.select_block(0);
        model.update_block(0, &BlockPatch::label("Full name"));
        assert_eq!(model.open_block().map(|b| b.label.as_str()), Some("Full name"));
        assert!(model.take_dirty());
        assert!(!model.take_dirty());
    }

    #[test]
    fn delete_open_removes_selected_child() {
        let mut model = model();
        add(&mut model, BlockType::Columns);
        let child = Block::new(BlockId::fresh(), BlockType::Text);
        model.handle_column_drop(0, 1, vec![ListEntry::Block(child.clone())]);
        model.flush_drag();
        model.select_child(ChildLocation::new(0, 1, 0));
        assert_eq!(model.delete_open().map(|b| b.id), Some(child.id));
        assert_eq!(model.selection(), Selection::Closed);
        assert_eq!(placements(model.blocks(), child.id), 0);
        assert!(model.delete_open().is_none());
    }

    #[test]
    fn deleting_open_block_closes_selection() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        add(&mut model, BlockType::Email);
        model.select_block(1);
        model.delete_block(1);
        assert_eq!(model.selection(), Selection::Closed);
        assert!(model.open_block().is_none());
    }

    #[test]
    fn deleting_other_block_keeps_selection() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        let email = add(&mut model, BlockType::Email);
        model.select_block(1);
        model.delete_block(0);
        assert_eq!(model.open_block().map(|b| b.id), Some(email));
    }

    #[test]
    fn deleting_open_child_closes_selection() {
        let mut model = model();
        let cols = add(&mut model, BlockType::Columns);
        model.drop_entry(
            DragPayload::palette(PaletteItem::new(BlockType::Text)),
            ListKey::Column { parent: cols, column: 1 },
            0,
        );
        model.flush_drag();
        let location = ChildLocation::new(0, 1, 0);
        assert!(model.select_child(location));
        assert!(model.delete_child(location).is_some());
        assert_eq!(model.selection(), Selection::Closed);
    }

    #[test]
    fn deleting_parent_of_open_child_closes_selection() {
        let mut model = model();
        let cols = add(&mut model, BlockType::Columns);
        model.drop_entry(
            DragPayload::palette(PaletteItem::new(BlockType::Text)),
            ListKey::Column { parent: cols, column: 0 },
            0,
        );
        model.flush_drag();
        model.select_child(ChildLocation::new(0, 0, 0));
        model.delete_block(0);
        assert_eq!(model.selection(), Selection::Closed);
    }

    #[test]
    fn selecting_child_replaces_top_level_selection() {
        let mut model = model();
        let cols = add(&mut model, BlockType::Columns);
        model.drop_entry(
            DragPayload::palette(PaletteItem::new(BlockType::Email)),
            ListKey::Column { parent: cols, column: 0 },
            0,
        );
        model.flush_drag();
        model.select_block(0);
        model.select_child(ChildLocation::new(0, 0, 0));
        assert!(matches!(model.selection(), Selection::Child { .. }));
        model.select_block(0);
        assert_eq!(model.selection(), Selection::TopLevel { id: cols });
        assert!(!model.select_child(ChildLocation::new(0, 1, 3)));
    }

    #[test]
    fn settings_route_to_child() {
        let mut model = model();
        let cols = add(&mut model, BlockType::Columns);
        model.drop_entry(
            DragPayload::palette(PaletteItem::new(BlockType::Text)),
            ListKey::Column { parent: cols, column: 0 },
            0,
        );
        model.flush_drag();
        model.select_child(ChildLocation::new(0, 0, 0));
        model
            .handle_settings_change("placeholder", serde_json::json!("Type here"))
            .unwrap();
        assert_eq!(
            model.open_block().and_then(|b| b.placeholder.as_deref()),
            Some("Type here")
        );
        assert_eq!(safe_columns(&model.blocks()[0])[0][0].placeholder.as_deref(), Some("Type here"));
    }

    #[test]
    fn settings_layout_change_is_lossless() {
        let mut model = model();
        let cols = add(&mut model, BlockType::Columns);
        for column in 0..2 {
            model.drop_entry(
                DragPayload::palette(PaletteItem::new(BlockType::Text)),
                ListKey::Column { parent: cols, column },
                0,
            );
        }
        model.flush_drag();
        model.select_block(0);
        model.handle_settings_change("layout", serde_json::json!("1")).unwrap();
        let matrix = safe_columns(&model.blocks()[0]);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].len(), 2);
        assert_eq!(model.blocks()[0].layout, Some(ColumnLayout::One));
    }

    #[test]
    fn settings_errors_surface() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.select_block(0);
        assert!(model.handle_settings_change("type", serde_json::json!("email")).is_err());
        assert!(model.handle_settings_change("bogus", serde_json::json!(1)).is_err());
    }

    #[test]
    fn external_change_replaces_only_when_different() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.take_dirty();
        let same = model.blocks().to_vec();
        assert!(!model.on_external_blocks_change(same));

        let mut other = model.blocks().to_vec();
        other.push(Block::new(BlockId::fresh(), BlockType::Divider));
        assert!(model.on_external_blocks_change(other));
        assert_eq!(model.blocks().len(), 2);
        assert!(!model.is_dirty());
    }

    #[test]
    fn switching_documents_closes_selection() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.select_block(0);
        model.switch_document(vec![Block::new(BlockId::fresh(), BlockType::Title)]);
        assert_eq!(model.selection(), Selection::Closed);
        assert!(!model.is_dirty());
    }

    #[test]
    fn reorder_on_canvas() {
        let mut model = model();
        let a = add(&mut model, BlockType::Text);
        let b = add(&mut model, BlockType::Email);
        let c = add(&mut model, BlockType::Heading);
        let first = model.blocks()[0].clone();
        assert!(model.drop_entry(DragPayload::block(first, ListKey::Canvas), ListKey::Canvas, 3));
        model.flush_drag();
        let order: Vec<_> = model.blocks().iter().map(|b| b.id).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn reports_in_one_tick_schedule_one_flush() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        let cols = add(&mut model, BlockType::Columns);
        let text = model.blocks()[0].clone();
        let scheduled = model.drop_entry(
            DragPayload::block(text, ListKey::Canvas),
            ListKey::Column { parent: cols, column: 0 },
            0,
        );
        assert!(scheduled);
        assert!(!model.handle_column_drop(1, 1, Vec::new()));
        assert!(model.flush_drag());
        assert!(model.handle_canvas_drop(model.list_entries(ListKey::Canvas).unwrap()));
    }

    #[test]
    fn moved_open_block_stays_open() {
        let mut model = model();
        let text = add(&mut model, BlockType::Text);
        let cols = add(&mut model, BlockType::Columns);
        model.select_block(0);
        let block = model.blocks()[0].clone();
        model.drop_entry(
            DragPayload::block(block, ListKey::Canvas),
            ListKey::Column { parent: cols, column: 1 },
            0,
        );
        model.flush_drag();
        assert_eq!(
            model.selection(),
            Selection::Child {
                location: ChildLocation::new(0, 1, 0),
                id: text
            }
        );
    }

    #[test]
    fn columns_cannot_enter_columns() {
        let mut model = model();
        let outer = add(&mut model, BlockType::Columns);
        add(&mut model, BlockType::Columns);
        let inner = model.blocks()[1].clone();
        assert!(!model.drop_entry(
            DragPayload::block(inner, ListKey::Canvas),
            ListKey::Column { parent: outer, column: 0 },
            0,
        ));
        assert!(!model.flush_drag());
        assert_eq!(model.blocks().len(), 2);
    }

    #[test]
    fn drag_between_columns_keeps_single_placement() {
        let mut model = model();
        let cols = add(&mut model, BlockType::Columns);
        model.drop_entry(
            DragPayload::palette(PaletteItem::new(BlockType::Text)),
            ListKey::Column { parent: cols, column: 0 },
            0,
        );
        model.flush_drag();
        let child = safe_columns(&model.blocks()[0])[0][0].clone();
        let id = child.id;
        model.drop_entry(
            DragPayload::block(child, ListKey::Column { parent: cols, column: 0 }),
            ListKey::Column { parent: cols, column: 1 },
            0,
        );
        model.flush_drag();
        assert_eq!(placements(model.blocks(), id), 1);
        assert_eq!(safe_columns(&model.blocks()[0])[1][0].id, id);
    }

    #[test]
    fn echo_of_earlier_emission_keeps_newer_edits() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        let emitted = model.mark_emitted();
        model.update_block(0, &BlockPatch::label("newer edit"));

        assert!(!model.on_external_blocks_change(emitted));
        assert_eq!(model.blocks()[0].label, "newer edit");
        assert!(model.take_dirty());
    }

    #[test]
    fn echo_matching_current_state_is_a_no_op() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.take_dirty();
        let emitted = model.mark_emitted();
        assert!(!model.on_external_blocks_change(emitted));
        assert!(!model.is_dirty());
    }

    #[test]
    fn host_document_still_adopted_after_emission() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.mark_emitted();
        let replacement = vec![Block::new(BlockId::fresh(), BlockType::Divider)];
        assert!(model.on_external_blocks_change(replacement.clone()));
        assert_eq!(model.blocks(), replacement.as_slice());
    }

    #[test]
    fn columns_setting_moves_rather_than_copies() {
        let mut model = model();
        let text = add(&mut model, BlockType::Text);
        add(&mut model, BlockType::Columns);
        model.select_block(1);
        let moved = model.blocks()[0].clone();
        let matrix = serde_json::to_value(vec![vec![moved], Vec::new()]).unwrap();

        model.handle_settings_change("columns", matrix).unwrap();

        assert_eq!(placements(model.blocks(), text), 1);
        assert_eq!(model.blocks().len(), 1);
        assert_eq!(safe_columns(&model.blocks()[0])[0][0].id, text);
        assert!(model.open_block().is_some_and(|b| b.is_columns()));
    }

    #[test]
    fn drop_of_block_deleted_mid_drag_is_refused() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        let cols = add(&mut model, BlockType::Columns);
        let dragged = model.blocks()[0].clone();
        model.delete_block(0);

        assert!(!model.drop_entry(
            DragPayload::block(dragged.clone(), ListKey::Canvas),
            ListKey::Column { parent: cols, column: 0 },
            0,
        ));
        assert!(!model.flush_drag());
        assert_eq!(placements(model.blocks(), dragged.id), 0);
    }

    #[test]
    fn ignored_patch_leaves_model_clean() {
        let mut model = model();
        add(&mut model, BlockType::Text);
        model.select_block(0);
        model.take_dirty();

        model.handle_settings_change("layout", serde_json::json!("3")).unwrap();
        model.update_block(0, &BlockPatch::label("Textbox"));

        assert!(!model.is_dirty());
        assert_eq!(model.blocks()[0].layout, None);
    }
}
