use dioxus::prelude::*;

use super::dom;
use super::handle::EditorHandle;
use crate::blocks::{Block, ListKey};
use crate::editor::DragPayload;

/// A sortable list of blocks over HTML5 drag events.
///
/// Items are dragged out with their origin list attached; a drop reports the
/// new contents of both lists to the editor, which applies them together.
#[component]
pub fn DropList(
    list_key: ListKey,
    items: Vec<Block>,
    render_item: Callback<(usize, Block), Element>,
    #[props(default)] class: String,
) -> Element {
    let handle = use_context::<EditorHandle>();
    let len = items.len();
    let hovered = match *handle.hover.read() {
        Some((key, index)) if key == list_key => Some(index),
        _ => None,
    };
    let empty = items.is_empty();

    rsx! {
        div {
            class: "zyra-drop-list {class}",
            ondragover: move |e| {
                e.prevent_default();
                e.stop_propagation();
                if hovered.is_none() {
                    handle.hover_at(list_key, len);
                }
            },
            ondrop: move |e| {
                e.prevent_default();
                e.stop_propagation();
                handle.drop_on(list_key, len);
            },

            if empty {
                div { class: "zyra-drop-placeholder", "Drop blocks here" }
            }

            for (index, block) in items.into_iter().enumerate() {
                {
                    let id = block.id;
                    let dom_id = format!("zyra-slot-{}", id);
                    let dragged = block.clone();
                    let indicator = hovered == Some(index);
                    let content = render_item.call((index, block));
                    rsx! {
                        div {
                            key: "{id}",
                            id: "{dom_id}",
                            class: if indicator { "zyra-slot zyra-slot-before" } else { "zyra-slot" },
                            draggable: "true",
                            ondragstart: move |e| {
                                e.stop_propagation();
                                handle.start_drag(DragPayload::block(dragged.clone(), list_key));
                            },
                            ondragend: move |_| handle.end_drag(),
                            ondragover: {
                                let dom_id = dom_id.clone();
                                move |e: DragEvent| {
                                    e.prevent_default();
                                    e.stop_propagation();
                                    let y = e.client_coordinates().y;
                                    let slot = if dom::pointer_below_middle(&dom_id, y) { index + 1 } else { index };
                                    handle.hover_at(list_key, slot);
                                }
                            },
                            {content}
                        }
                    }
                }
            }

            if hovered == Some(len) && !empty {
                div { class: "zyra-drop-indicator" }
            }
        }
    }
}
