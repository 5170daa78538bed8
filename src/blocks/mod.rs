pub mod block;
pub mod columns;
pub mod document;

pub use block::{
    apply_patch, column_count_for, create_block, default_palette, Block, BlockId, BlockPatch,
    BlockStyle, BlockType, ChoiceOption, ColumnLayout, ListEntry, PaletteItem,
};
pub use columns::{change_layout, safe_columns, ChildLocation};
pub use document::{find_block, load_document, save_document, ListKey, Place};
