use dioxus::prelude::*;

use super::block_renderer::BlockRenderer;
use super::drop_list::DropList;
use super::handle::EditorHandle;
use crate::blocks::{safe_columns, Block, BlockPatch, ChildLocation, ListKey};

/// A columns block as one independent drop list per column.
#[component]
pub fn ColumnRenderer(parent_index: usize, block: Block, #[props(default = true)] show_meta: bool) -> Element {
    let handle = use_context::<EditorHandle>();
    let open = handle.open_id();
    let parent = block.id;
    let widths = block.layout.unwrap_or_default().widths();
    let columns: Vec<(usize, ListKey, u8, Vec<Block>)> = safe_columns(&block)
        .into_iter()
        .enumerate()
        .map(|(column, children)| {
            let width = widths.get(column).copied().unwrap_or(50);
            (column, ListKey::Column { parent, column }, width, children)
        })
        .collect();

    rsx! {
        div {
            class: "zyra-columns",
            style: "display: flex; gap: 12px;",
            for (column_index, list_key, width, children) in columns {
                div {
                    key: "{column_index}",
                    class: "zyra-column",
                    style: "flex: 0 0 calc({width}% - 12px); min-height: 48px; border: 1px dashed #c3c4c7;",
                    DropList {
                        list_key,
                        items: children,
                        render_item: move |(child_index, child): (usize, Block)| {
                            let location = ChildLocation::new(parent_index, column_index, child_index);
                            let selected = open == Some(child.id);
                            rsx! {
                                BlockRenderer {
                                    block: child,
                                    selected,
                                    show_meta,
                                    on_select: move |_| handle.select_child(location),
                                    on_delete: move |_| {
                                        handle.mutate(|model| model.delete_child(location));
                                    },
                                    on_change: move |patch: BlockPatch| {
                                        handle.mutate(|model| model.update_child(location, &patch));
                                    },
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}
