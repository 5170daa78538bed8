use dioxus::prelude::*;

use super::column_renderer::ColumnRenderer;
use super::fields::default_registry;
use super::registry::{unknown_type_message, Content, FieldProps, FieldRegistry};
use crate::blocks::{Block, BlockPatch};

/// One block: chrome (handle, delete, selection outline) around content from
/// the field registry. Columns blocks render their drop lists instead.
#[component]
pub fn BlockRenderer(
    block: Block,
    #[props(default = true)] show_meta: bool,
    #[props(default)] selected: bool,
    // canvas position, top-level blocks only
    top_index: Option<usize>,
    on_change: EventHandler<BlockPatch>,
    on_select: EventHandler<()>,
    on_delete: EventHandler<()>,
) -> Element {
    let registry = try_use_context::<FieldRegistry>().unwrap_or_else(default_registry);
    let dom_id = block.id.dom_id();
    let type_name = block.block_type.to_string();
    let border = if selected && show_meta { "2px solid #2271b1" } else { "1px dashed transparent" };
    let css = block.style.as_ref().map(|s| s.to_css()).unwrap_or_default();

    let content = if block.is_columns() {
        match top_index {
            Some(parent_index) => rsx! {
                ColumnRenderer { parent_index, block: block.clone(), show_meta }
            },
            None => rsx! {
                div { class: "zyra-unknown", "Columns cannot be placed inside columns" }
            },
        }
    } else {
        match registry.content_for(&block) {
            Content::Field(render) => render(FieldProps {
                block: block.clone(),
                on_change,
            }),
            Content::Unknown => {
                let message = unknown_type_message(&block);
                rsx! {
                    div {
                        class: "zyra-unknown",
                        style: "padding: 8px; border: 1px solid #d63638; color: #d63638;",
                        "{message}"
                    }
                }
            }
        }
    };

    rsx! {
        div {
            id: "{dom_id}",
            class: "zyra-block zyra-block-{type_name}",
            style: "position: relative; border: {border}; padding: 6px; {css}",
            tabindex: if show_meta { "0" },
            onclick: move |e| {
                e.stop_propagation();
                on_select.call(());
            },
            onkeydown: move |e| {
                if show_meta && selected && e.key() == Key::Delete {
                    e.stop_propagation();
                    on_delete.call(());
                }
            },

            if show_meta {
                div {
                    class: "zyra-block-meta",
                    style: "display: flex; justify-content: space-between; font-size: 11px; color: #666;",
                    span { class: "zyra-drag-handle", style: "cursor: grab;", "⠿ {type_name}" }
                    button {
                        class: "zyra-delete",
                        title: "Delete block",
                        onclick: move |e| {
                            e.stop_propagation();
                            on_delete.call(());
                        },
                        "✕"
                    }
                }
            }

            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockId, BlockType};

    fn render(app: fn() -> Element) -> String {
        let mut dom = VirtualDom::new(app);
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    fn unknown_block() -> Element {
        rsx! {
            BlockRenderer {
                block: Block::new(BlockId(41), BlockType::Unknown("hologram".to_string())),
                on_change: move |_: BlockPatch| {},
                on_select: move |_: ()| {},
                on_delete: move |_: ()| {},
            }
        }
    }

    fn divider_block() -> Element {
        rsx! {
            BlockRenderer {
                block: Block::new(BlockId(42), BlockType::Divider),
                show_meta: false,
                on_change: move |_: BlockPatch| {},
                on_select: move |_: ()| {},
                on_delete: move |_: ()| {},
            }
        }
    }

    #[test]
    fn unknown_type_renders_visible_placeholder() {
        let html = render(unknown_block);
        assert!(html.contains("Unknown block type: hologram"));
        assert!(html.contains("zyra-block-41"));
    }

    #[test]
    fn chrome_hidden_without_meta() {
        let html = render(divider_block);
        assert!(!html.contains("zyra-delete"));
        assert!(html.contains("zyra-block-42"));
    }
}
