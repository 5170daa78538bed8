//! Same-tick accumulation of drag list reports.
//!
//! One physical drop can make several lists report their new contents (the
//! list the block left and the list it entered). Reports are collected here
//! and applied together so no render sees a half-moved block.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::blocks::columns::replace_column;
use crate::blocks::document::{dedupe_document, find_block};
use crate::blocks::{create_block, Block, BlockId, ListEntry, ListKey, PaletteItem};
use crate::config::EditorConfig;

/// The thing being dragged and the list it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct DragPayload {
    pub entry: ListEntry,
    /// `None` for palette items.
    pub origin: Option<ListKey>,
}

impl DragPayload {
    pub fn palette(item: PaletteItem) -> Self {
        Self {
            entry: ListEntry::Palette(item),
            origin: None,
        }
    }

    pub fn block(block: Block, origin: ListKey) -> Self {
        Self {
            entry: ListEntry::Block(block),
            origin: Some(origin),
        }
    }
}

#[derive(Debug)]
struct ColumnReport {
    parent: BlockId,
    column: usize,
    entries: Vec<ListEntry>,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct DragBatch {
    canvas: Option<(u64, Vec<ListEntry>)>,
    columns: Vec<ColumnReport>,
    seq: u64,
    flush_requested: bool,
}

impl DragBatch {
    pub fn is_empty(&self) -> bool {
        self.canvas.is_none() && self.columns.is_empty()
    }

    /// Returns `true` for the first report of a batch, when the caller has to
    /// schedule the flush.
    pub fn report_canvas(&mut self, entries: Vec<ListEntry>) -> bool {
        self.seq += 1;
        self.canvas = Some((self.seq, entries));
        self.request_flush()
    }

    pub fn report_column(&mut self, parent: BlockId, column: usize, entries: Vec<ListEntry>) -> bool {
        self.seq += 1;
        let seq = self.seq;
        match self
            .columns
            .iter_mut()
            .find(|r| r.parent == parent && r.column == column)
        {
            Some(report) => {
                report.entries = entries;
                report.seq = seq;
            }
            None => self.columns.push(ColumnReport {
                parent,
                column,
                entries,
                seq,
            }),
        }
        self.request_flush()
    }

    pub fn report(&mut self, key: ListKey, entries: Vec<ListEntry>) -> bool {
        match key {
            ListKey::Canvas => self.report_canvas(entries),
            ListKey::Column { parent, column } => self.report_column(parent, column, entries),
        }
    }

    fn request_flush(&mut self) -> bool {
        !std::mem::replace(&mut self.flush_requested, true)
    }

    /// Compute the next document: canvas report first, column reports layered
    /// onto their parents, then every id kept only in its newest list.
    pub fn apply(self, blocks: &[Block], config: &EditorConfig) -> Vec<Block> {
        let mut ranks: HashMap<ListKey, u64> = HashMap::new();

        let mut next: Vec<Block> = match self.canvas {
            Some((seq, entries)) => {
                ranks.insert(ListKey::Canvas, seq);
                entries
                    .into_iter()
                    .map(|entry| create_block(entry, config))
                    .collect()
            }
            None => blocks.to_vec(),
        };

        let mut refused: Vec<Block> = Vec::new();
        let mut columns = self.columns;
        columns.sort_by_key(|r| r.seq);
        for report in columns {
            let Some(parent) = next
                .iter_mut()
                .find(|b| b.id == report.parent && b.is_columns())
            else {
                warn!(parent = %report.parent, "column report for a missing container dropped");
                continue;
            };
            let list: Vec<Block> = report
                .entries
                .into_iter()
                .filter(|entry| match entry {
                    ListEntry::Palette(item) if item.value.is_columns() => {
                        warn!("columns cannot be dropped inside a column");
                        false
                    }
                    _ => true,
                })
                .map(|entry| create_block(entry, config))
                .collect();
            match replace_column(parent, report.column, list) {
                Some((updated, nested)) => {
                    *parent = updated;
                    refused.extend(nested);
                    ranks.insert(
                        ListKey::Column {
                            parent: report.parent,
                            column: report.column,
                        },
                        report.seq,
                    );
                }
                None => {
                    warn!(parent = %report.parent, column = report.column, "column report out of range dropped")
                }
            }
        }

        let mut next = dedupe_document(next, |key| ranks.get(&key).copied().unwrap_or(0));
        for block in refused {
            if find_block(&next, block.id).is_none() {
                next.push(block);
            }
        }
        debug!(lists = ranks.len(), blocks = next.len(), "drag batch applied");
        next
    }
}
