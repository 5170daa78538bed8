use std::collections::HashSet;

use zyra::blocks::document::placements;
use zyra::blocks::{load_document, save_document, ListKey};
use zyra::editor::{CanvasModel, DragPayload, PersistGate, Selection};
use zyra::{Block, BlockId, BlockType, ColumnLayout, EditorConfig, PaletteItem};

fn drop_and_flush(model: &mut CanvasModel, payload: DragPayload, target: ListKey, index: usize) {
    assert!(model.drop_entry(payload, target, index));
    assert!(model.flush_drag());
}

#[test]
fn build_a_form_by_dragging() {
    let mut model = CanvasModel::new(Vec::new(), EditorConfig::default());
    assert!(!model.take_dirty());

    let textbox = PaletteItem::new(BlockType::Text).with_label("Textbox");
    drop_and_flush(&mut model, DragPayload::palette(textbox), ListKey::Canvas, 0);
    assert_eq!(model.blocks().len(), 1);
    assert_eq!(model.blocks()[0].block_type, BlockType::Text);
    assert_eq!(model.blocks()[0].label, "Textbox");
    assert!(model.take_dirty());

    let columns = PaletteItem::new(BlockType::Columns);
    drop_and_flush(&mut model, DragPayload::palette(columns), ListKey::Canvas, 1);
    let columns_block = &model.blocks()[1];
    assert_eq!(columns_block.layout, Some(ColumnLayout::TwoEqual));
    assert_eq!(columns_block.columns, Some(vec![Vec::new(), Vec::new()]));
    let parent = columns_block.id;

    let text = model.blocks()[0].clone();
    drop_and_flush(
        &mut model,
        DragPayload::block(text.clone(), ListKey::Canvas),
        ListKey::Column { parent, column: 0 },
        0,
    );

    assert_eq!(model.blocks().len(), 1);
    assert!(model.blocks()[0].is_columns());
    assert_eq!(placements(model.blocks(), text.id), 1);
    let columns = model.blocks()[0].columns.clone().unwrap_or_default();
    assert_eq!(columns[0].len(), 1);
    assert_eq!(columns[0][0].id, text.id);
    assert!(columns[1].is_empty());
}

#[test]
fn selection_follows_a_dragged_block() {
    let mut model = CanvasModel::new(Vec::new(), EditorConfig::default());
    model.append_from_palette(PaletteItem::new(BlockType::Email));
    model.append_from_palette(PaletteItem::new(BlockType::Columns));
    let email = model.blocks()[0].clone();
    let parent = model.blocks()[1].id;

    model.select_block(0);
    drop_and_flush(
        &mut model,
        DragPayload::block(email.clone(), ListKey::Canvas),
        ListKey::Column { parent, column: 1 },
        0,
    );

    assert!(matches!(model.selection(), Selection::Child { id, .. } if id == email.id));
    assert_eq!(model.open_block().map(|b| b.id), Some(email.id));
}

#[test]
fn saved_document_reloads_unchanged() {
    let mut model = CanvasModel::new(Vec::new(), EditorConfig::default());
    model.append_from_palette(PaletteItem::new(BlockType::Heading));
    model.append_from_palette(PaletteItem::new(BlockType::Radio));

    let raw = save_document(model.blocks()).unwrap();
    let loaded = load_document(&raw).unwrap();
    assert_eq!(loaded.as_slice(), model.blocks());

    assert!(model.take_dirty());
    assert!(!model.on_external_blocks_change(loaded));
    assert!(!model.take_dirty());
}

#[test]
fn burst_of_edits_leaves_one_live_ticket() {
    let mut gate = PersistGate::new();
    let tickets: Vec<_> = (0..5).map(|_| gate.schedule()).collect();
    let live: Vec<_> = tickets.iter().filter(|t| gate.is_current(**t)).collect();
    assert_eq!(live.len(), 1);
    assert_eq!(*live[0], tickets[4]);
}

#[test]
fn fresh_ids_never_collide_with_loaded_ones() {
    let loaded = load_document(r#"[{"id": 9000000000000, "type": "text"}]"#).unwrap();
    let mut seen: HashSet<BlockId> = loaded.iter().map(|b| b.id).collect();
    for _ in 0..100 {
        assert!(seen.insert(BlockId::fresh()));
    }
    let block = Block::new(BlockId::fresh(), BlockType::Divider);
    assert!(!seen.contains(&block.id));
}
