//! Whole-document helpers: lookup, de-duplication and JSON load/save.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::block::{Block, BlockId};
use super::columns::{normalize_columns, safe_columns, ChildLocation};
use crate::error::Result;

/// One ordered list in the document: the canvas, or a column of a columns block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKey {
    Canvas,
    Column { parent: BlockId, column: usize },
}

/// Where a block currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Place {
    TopLevel(usize),
    Child(ChildLocation),
}

pub fn find_block(blocks: &[Block], id: BlockId) -> Option<Place> {
    if let Some(index) = blocks.iter().position(|b| b.id == id) {
        return Some(Place::TopLevel(index));
    }
    blocks.iter().enumerate().find_map(|(parent_index, parent)| {
        let columns = parent.columns.as_ref()?;
        columns.iter().enumerate().find_map(|(column_index, column)| {
            column
                .iter()
                .position(|child| child.id == id)
                .map(|child_index| {
                    Place::Child(ChildLocation::new(parent_index, column_index, child_index))
                })
        })
    })
}

pub fn block_at(blocks: &[Block], place: Place) -> Option<&Block> {
    match place {
        Place::TopLevel(index) => blocks.get(index),
        Place::Child(loc) => blocks
            .get(loc.parent_index)?
            .columns
            .as_ref()?
            .get(loc.column_index)?
            .get(loc.child_index),
    }
}

/// Keep each id in exactly one place.
///
/// `rank` scores each list; an id stays in its highest-ranked list, and ties
/// keep the first occurrence in document order. Columns blocks only live on
/// the canvas, so duplicated containers are settled first and their children
/// compete afterwards.
pub fn dedupe_document(blocks: Vec<Block>, rank: impl Fn(ListKey) -> u64) -> Vec<Block> {
    let mut seen_containers = HashSet::new();
    let blocks: Vec<Block> = blocks
        .into_iter()
        .filter(|b| !b.is_columns() || seen_containers.insert(b.id))
        .collect();

    // id -> (rank, list, position) of the surviving occurrence
    let mut winners: HashMap<BlockId, (u64, ListKey, usize)> = HashMap::new();
    let mut consider = |id: BlockId, key: ListKey, position: usize| {
        let score = rank(key);
        winners
            .entry(id)
            .and_modify(|current| {
                if score > current.0 {
                    *current = (score, key, position);
                }
            })
            .or_insert((score, key, position));
    };
    for (index, block) in blocks.iter().enumerate() {
        consider(block.id, ListKey::Canvas, index);
        if let Some(columns) = &block.columns {
            for (column, children) in columns.iter().enumerate() {
                let key = ListKey::Column { parent: block.id, column };
                for (position, child) in children.iter().enumerate() {
                    consider(child.id, key, position);
                }
            }
        }
    }

    let keeps = |id: BlockId, key: ListKey, position: usize| {
        winners
            .get(&id)
            .is_some_and(|&(_, k, p)| k == key && p == position)
    };

    let total = winners.len();
    let mut pruned = 0usize;
    let mut out = Vec::with_capacity(blocks.len());
    for (index, mut block) in blocks.into_iter().enumerate() {
        if !keeps(block.id, ListKey::Canvas, index) {
            pruned += 1;
            continue;
        }
        if let Some(columns) = block.columns.take() {
            let parent = block.id;
            block.columns = Some(
                columns
                    .into_iter()
                    .enumerate()
                    .map(|(column, children)| {
                        let key = ListKey::Column { parent, column };
                        let before = children.len();
                        let kept: Vec<Block> = children
                            .into_iter()
                            .enumerate()
                            .filter(|(position, child)| keeps(child.id, key, *position))
                            .map(|(_, child)| child)
                            .collect();
                        pruned += before - kept.len();
                        kept
                    })
                    .collect(),
            );
        }
        out.push(block);
    }
    if pruned > 0 {
        warn!(pruned, unique = total, "pruned duplicate block placements");
    }
    out
}

/// Make externally supplied blocks safe to edit: repair columns blocks, drop
/// duplicate placements (first one wins) and reserve every id.
pub fn prepare_document(blocks: Vec<Block>) -> Vec<Block> {
    let repaired = blocks.iter().map(normalize_columns).collect();
    let prepared = dedupe_document(repaired, |_| 0);
    for id in prepared.iter().flat_map(Block::ids) {
        BlockId::observe(id);
    }
    prepared
}

pub fn load_document(raw: &str) -> Result<Vec<Block>> {
    let blocks: Vec<Block> = serde_json::from_str(raw)?;
    Ok(prepare_document(blocks))
}

pub fn save_document(blocks: &[Block]) -> Result<String> {
    Ok(serde_json::to_string(blocks)?)
}

/// Number of places `id` occupies. Zero or one in any prepared document.
pub fn placements(blocks: &[Block], id: BlockId) -> usize {
    blocks
        .iter()
        .map(|b| {
            let own = usize::from(b.id == id);
            let nested = if b.is_columns() {
                safe_columns(b)
                    .iter()
                    .flatten()
                    .filter(|child| child.id == id)
                    .count()
            } else {
                0
            };
            own + nested
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::block::{BlockType, ColumnLayout};

    fn text(id: u64) -> Block {
        Block::new(BlockId(id), BlockType::Text)
    }

    fn columns(id: u64, matrix: Vec<Vec<Block>>) -> Block {
        let mut block = Block::new(BlockId(id), BlockType::Columns);
        block.layout = Some(ColumnLayout::TwoEqual);
        block.columns = Some(matrix);
        block
    }

    #[test]
    fn find_top_level_and_child() {
        let doc = vec![text(1), columns(2, vec![vec![], vec![text(3)]])];
        assert_eq!(find_block(&doc, BlockId(1)), Some(Place::TopLevel(0)));
        assert_eq!(
            find_block(&doc, BlockId(3)),
            Some(Place::Child(ChildLocation::new(1, 1, 0)))
        );
        assert_eq!(find_block(&doc, BlockId(4)), None);
        let place = find_block(&doc, BlockId(3)).unwrap();
        assert_eq!(block_at(&doc, place).map(|b| b.id), Some(BlockId(3)));
    }

    #[test]
    fn unranked_duplicates_keep_first() {
        let doc = vec![text(1), columns(2, vec![vec![text(1)], vec![]]), text(1)];
        let out = dedupe_document(doc, |_| 0);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, BlockId(1));
        assert_eq!(placements(&out, BlockId(1)), 1);
    }

    #[test]
    fn ranked_list_wins() {
        let doc = vec![text(1), columns(2, vec![vec![text(1)], vec![]])];
        let target = ListKey::Column {
            parent: BlockId(2),
            column: 0,
        };
        let out = dedupe_document(doc, |key| u64::from(key == target));
        assert_eq!(out.len(), 1);
        assert_eq!(find_block(&out, BlockId(1)), Some(Place::Child(ChildLocation::new(0, 0, 0))));
    }

    #[test]
    fn duplicated_container_settled_before_children() {
        let container = columns(2, vec![vec![text(3)], vec![]]);
        let doc = vec![container.clone(), container];
        let out = dedupe_document(doc, |_| 0);
        assert_eq!(out.len(), 1);
        assert_eq!(placements(&out, BlockId(3)), 1);
    }

    #[test]
    fn load_repairs_and_reserves_ids() {
        let raw = r#"[
            {"id": 900000000000001, "type": "columns", "layout": "3", "columns": [[{"id": 11, "type": "text"}]]},
            {"id": 12, "type": "mystery"}
        ]"#;
        let doc = load_document(raw).unwrap();
        assert_eq!(doc[0].columns.as_ref().map(Vec::len), Some(3));
        assert_eq!(doc[1].block_type, BlockType::Unknown("mystery".into()));
        assert!(BlockId::fresh().0 > 900000000000001);
    }

    #[test]
    fn load_rejects_non_json() {
        assert!(load_document("not json").is_err());
    }

    #[test]
    fn save_then_load_keeps_blocks() {
        let doc = vec![text(21), columns(22, vec![vec![text(23)], vec![]])];
        let raw = save_document(&doc).unwrap();
        assert_eq!(load_document(&raw).unwrap(), doc);
    }
}
