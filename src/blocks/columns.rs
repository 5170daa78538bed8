//! Column matrix operations for `columns` blocks.
//!
//! Every function here returns a new block and leaves its input alone. The
//! matrix length always matches the block's layout on the way out, and no
//! column ever holds another columns block.

use tracing::warn;

use super::block::{apply_patch, Block, BlockPatch, ColumnLayout};

/// Position of a child inside a top-level columns block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildLocation {
    pub parent_index: usize,
    pub column_index: usize,
    pub child_index: usize,
}

impl ChildLocation {
    pub fn new(parent_index: usize, column_index: usize, child_index: usize) -> Self {
        Self {
            parent_index,
            column_index,
            child_index,
        }
    }
}

/// The column matrix, or `[[], []]` when it is missing or empty.
pub fn safe_columns(block: &Block) -> Vec<Vec<Block>> {
    match &block.columns {
        Some(columns) if !columns.is_empty() => columns.clone(),
        _ => vec![Vec::new(), Vec::new()],
    }
}

/// Pad with empty columns, or fold every surplus column onto the last
/// surviving one in order.
fn fit_columns(mut columns: Vec<Vec<Block>>, count: usize) -> Vec<Vec<Block>> {
    let count = count.max(1);
    if columns.len() > count {
        let overflow: Vec<Block> = columns.drain(count..).flatten().collect();
        if let Some(last) = columns.last_mut() {
            last.extend(overflow);
        }
    }
    columns.resize_with(count, Vec::new);
    columns
}

/// Replace nested columns blocks by their own children, in place.
fn flatten_nested(column: Vec<Block>) -> Vec<Block> {
    let mut out = Vec::with_capacity(column.len());
    for block in column {
        if block.is_columns() {
            warn!(id = %block.id, "columns block nested in a column, lifting its children");
            out.extend(flatten_nested(safe_columns(&block).into_iter().flatten().collect()));
        } else {
            out.push(block);
        }
    }
    out
}

/// Repair a columns block read from storage: fill in a layout, fit the
/// matrix to it and lift out nested columns. Other blocks pass through.
pub fn normalize_columns(block: &Block) -> Block {
    if !block.is_columns() {
        return block.clone();
    }
    let layout = block.layout.unwrap_or_else(|| {
        ColumnLayout::for_count(block.columns.as_ref().map_or(2, Vec::len))
    });
    let columns = safe_columns(block).into_iter().map(flatten_nested).collect();

    let mut next = block.clone();
    next.layout = Some(layout);
    next.columns = Some(fit_columns(columns, layout.column_count()));
    if next.columns != block.columns {
        warn!(id = %block.id, layout = layout.as_str(), "repaired columns matrix");
    }
    next
}

/// Switch layout. Growing appends empty columns; shrinking moves the removed
/// columns' children, in order, to the end of the last remaining column.
pub fn change_layout(block: &Block, layout: ColumnLayout) -> Block {
    if !block.is_columns() {
        warn!(id = %block.id, "layout change on a non-columns block ignored");
        return block.clone();
    }
    let mut next = block.clone();
    next.layout = Some(layout);
    next.columns = Some(fit_columns(safe_columns(block), layout.column_count()));
    next
}

/// Patch one child. `None` when the position does not exist.
pub fn update_child(
    block: &Block,
    column_index: usize,
    child_index: usize,
    patch: &BlockPatch,
) -> Option<Block> {
    let mut columns = safe_columns(block);
    let child = columns.get_mut(column_index)?.get_mut(child_index)?;
    *child = apply_patch(child, patch);

    let mut next = block.clone();
    next.columns = Some(columns);
    Some(next)
}

/// Remove one child, returning the new parent and the removed child.
pub fn delete_child(block: &Block, column_index: usize, child_index: usize) -> Option<(Block, Block)> {
    let mut columns = safe_columns(block);
    let column = columns.get_mut(column_index)?;
    if child_index >= column.len() {
        return None;
    }
    let removed = column.remove(child_index);

    let mut next = block.clone();
    next.columns = Some(columns);
    Some((next, removed))
}

/// Install a reported list as column `column_index`.
///
/// Columns blocks in the list are refused and handed back so the caller can
/// keep them somewhere else. `None` when the column does not exist.
pub fn replace_column(
    block: &Block,
    column_index: usize,
    list: Vec<Block>,
) -> Option<(Block, Vec<Block>)> {
    let mut columns = fit_columns(safe_columns(block), block.expected_columns());
    let slot = columns.get_mut(column_index)?;

    let (refused, accepted): (Vec<Block>, Vec<Block>) = list.into_iter().partition(Block::is_columns);
    *slot = accepted;

    let mut next = block.clone();
    next.columns = Some(columns);
    Some((next, refused))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::block::{BlockId, BlockType};

    fn text(id: u64) -> Block {
        Block::new(BlockId(id), BlockType::Text)
    }

    fn columns(layout: ColumnLayout, matrix: Vec<Vec<Block>>) -> Block {
        let mut block = Block::new(BlockId(1000), BlockType::Columns);
        block.layout = Some(layout);
        block.columns = Some(matrix);
        block
    }

    fn ids(block: &Block) -> Vec<Vec<u64>> {
        safe_columns(block)
            .iter()
            .map(|col| col.iter().map(|b| b.id.0).collect())
            .collect()
    }

    #[test]
    fn missing_matrix_reads_as_two_empty_columns() {
        let block = Block::new(BlockId(9), BlockType::Columns);
        assert_eq!(safe_columns(&block), vec![Vec::<Block>::new(), Vec::new()]);
    }

    #[test]
    fn shrink_four_to_one_keeps_order() {
        let block = columns(
            ColumnLayout::Four,
            vec![vec![text(1)], vec![text(2)], vec![text(3)], vec![text(4)]],
        );
        let next = change_layout(&block, ColumnLayout::One);
        assert_eq!(ids(&next), vec![vec![1, 2, 3, 4]]);
        assert_eq!(next.layout, Some(ColumnLayout::One));
    }

    #[test]
    fn shrink_appends_after_existing_children() {
        let block = columns(
            ColumnLayout::Three,
            vec![vec![text(1)], vec![text(2), text(3)], vec![text(4)]],
        );
        let next = change_layout(&block, ColumnLayout::TwoWide);
        assert_eq!(ids(&next), vec![vec![1], vec![2, 3, 4]]);
    }

    #[test]
    fn grow_one_to_three() {
        let block = columns(ColumnLayout::One, vec![vec![text(1), text(2)]]);
        let next = change_layout(&block, ColumnLayout::Three);
        assert_eq!(ids(&next), vec![vec![1, 2], vec![], vec![]]);
    }

    #[test]
    fn every_layout_change_matches_count() {
        let mut block = columns(ColumnLayout::TwoEqual, vec![vec![text(1)], vec![text(2)]]);
        for layout in [
            ColumnLayout::Four,
            ColumnLayout::One,
            ColumnLayout::Three,
            ColumnLayout::TwoWide,
        ] {
            block = change_layout(&block, layout);
            assert_eq!(safe_columns(&block).len(), layout.column_count());
            assert_eq!(block.ids().len(), 3);
        }
    }

    #[test]
    fn update_child_patches_copy() {
        let block = columns(ColumnLayout::TwoEqual, vec![vec![text(1)], vec![text(2)]]);
        let next = update_child(&block, 1, 0, &BlockPatch::label("Phone")).unwrap();
        assert_eq!(safe_columns(&next)[1][0].label, "Phone");
        assert_eq!(safe_columns(&block)[1][0].label, "Textbox");
        assert!(update_child(&block, 2, 0, &BlockPatch::label("x")).is_none());
        assert!(update_child(&block, 0, 5, &BlockPatch::label("x")).is_none());
    }

    #[test]
    fn delete_child_returns_removed() {
        let block = columns(ColumnLayout::TwoEqual, vec![vec![text(1), text(2)], vec![]]);
        let (next, removed) = delete_child(&block, 0, 0).unwrap();
        assert_eq!(removed.id, BlockId(1));
        assert_eq!(ids(&next), vec![vec![2], vec![]]);
        assert!(delete_child(&block, 1, 0).is_none());
    }

    #[test]
    fn normalize_fits_wrong_count() {
        let block = columns(
            ColumnLayout::TwoEqual,
            vec![vec![text(1)], vec![text(2)], vec![text(3)]],
        );
        assert_eq!(ids(&normalize_columns(&block)), vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn normalize_infers_layout_from_matrix() {
        let mut block = columns(ColumnLayout::One, vec![vec![], vec![], vec![text(5)]]);
        block.layout = None;
        let next = normalize_columns(&block);
        assert_eq!(next.layout, Some(ColumnLayout::Three));
        assert_eq!(ids(&next), vec![vec![], vec![], vec![5]]);
    }

    #[test]
    fn normalize_lifts_nested_columns() {
        let inner = columns(ColumnLayout::TwoEqual, vec![vec![text(2)], vec![text(3)]]);
        let block = columns(ColumnLayout::TwoEqual, vec![vec![text(1), inner], vec![]]);
        assert_eq!(ids(&normalize_columns(&block)), vec![vec![1, 2, 3], vec![]]);
    }

    #[test]
    fn replace_column_refuses_columns_blocks() {
        let block = columns(ColumnLayout::TwoEqual, vec![vec![], vec![]]);
        let nested = columns(ColumnLayout::One, vec![vec![]]);
        let (next, refused) = replace_column(&block, 0, vec![text(1), nested]).unwrap();
        assert_eq!(ids(&next), vec![vec![1], vec![]]);
        assert_eq!(refused.len(), 1);
        assert!(replace_column(&block, 2, vec![]).is_none());
    }
}
