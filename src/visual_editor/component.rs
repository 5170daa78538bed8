use dioxus::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

use super::block_renderer::BlockRenderer;
use super::drop_list::DropList;
use super::fields::default_registry;
use super::handle::EditorHandle;
use super::registry::FieldRegistry;
use super::settings::{SettingMetaBox, SettingMetaBoxProps, SettingsRenderer};
use crate::blocks::{default_palette, Block, BlockPatch, ListKey, PaletteItem};
use crate::config::EditorConfig;
use crate::editor::persist::settle;
use crate::editor::{CanvasModel, DragPayload, PersistGate};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditorMode {
    Editor,
    Preview,
}

/// The whole editor: palette, canvas and settings panel.
///
/// `blocks` is the host's copy of the document. Edits are handed back through
/// `on_change` once `persist_debounce_ms` passes without another edit; the
/// host is expected to feed them back in as `blocks`. Changing `document_key`
/// discards editor state and loads `blocks` as a new document.
#[component]
pub fn CanvasEditor(
    blocks: Vec<Block>,
    on_change: EventHandler<Vec<Block>>,
    #[props(default)] config: EditorConfig,
    #[props(default = default_palette())] palette: Vec<PaletteItem>,
    registry: Option<FieldRegistry>,
    document_key: Option<String>,
    settings: Option<SettingsRenderer>,
) -> Element {
    let initial = blocks.clone();
    let initial_config = config.clone();
    let model = use_signal(move || CanvasModel::new(initial, initial_config));
    let dragging = use_signal(|| None::<DragPayload>);
    let hover = use_signal(|| None);
    let mut gate = use_signal(PersistGate::new);
    let flush_request = use_signal(|| 0u64);
    let persist_request = use_signal(|| None);
    let mut mode = use_signal(|| EditorMode::Editor);
    let mut last_key = use_signal(|| document_key.clone());

    let handle = use_context_provider(|| EditorHandle {
        model,
        dragging,
        hover,
        gate,
        flush_request,
        persist_request,
    });
    use_context_provider(move || registry.unwrap_or_else(default_registry));

    use_effect(use_reactive((&blocks, &document_key), move |(blocks, key)| {
        let mut model = handle.model;
        if *last_key.peek() != key {
            debug!(?key, "switching document");
            last_key.set(key);
            gate.write().cancel();
            model.write().switch_document(blocks);
            return;
        }
        if model.peek().blocks() == blocks.as_slice() {
            return;
        }
        model.write().on_external_blocks_change(blocks);
    }));

    // Drop handlers only report lists; the batch is applied here, after every
    // handler for the same drop has run.
    use_effect(move || {
        if *flush_request.read() > 0 {
            handle.flush();
        }
    });

    use_effect(move || {
        let Some(ticket) = *persist_request.read() else {
            return;
        };
        let delay = model.peek().config().persist_debounce_ms;
        spawn(async move {
            let settled = settle(
                ticket,
                delay,
                |t| gate.peek().is_current(t),
                || {
                    let mut model = model;
                    let emitted = model.write().mark_emitted();
                    emitted
                },
            )
            .await;
            if let Some(blocks) = settled {
                debug!(blocks = blocks.len(), "persisting document");
                on_change.call(blocks);
            }
        });
    });

    let current_mode = *mode.read();
    let editor_bg = if current_mode == EditorMode::Editor { "var(--color-primary)" } else { "var(--color-secondary)" };
    let preview_bg = if current_mode == EditorMode::Preview { "var(--color-primary)" } else { "var(--color-secondary)" };
    let settings = settings.unwrap_or(SettingMetaBox);

    rsx! {
        div {
            class: "zyra-editor",
            style: "display: flex; min-height: 480px; font-family: system-ui;",

            div {
                class: "toolbox",
                style: "width: 200px; padding: 12px;",
                h2 { style: "margin: 0 0 16px 0; font-size: 18px;", "Blocks" }

                div {
                    class: "mode-toggle",
                    style: "margin-bottom: 16px; display: flex; gap: 8px;",
                    button {
                        onclick: move |_| mode.set(EditorMode::Editor),
                        style: "background: {editor_bg};",
                        "Editor"
                    }
                    button {
                        onclick: move |_| mode.set(EditorMode::Preview),
                        style: "background: {preview_bg};",
                        "Preview"
                    }
                }

                if current_mode == EditorMode::Editor {
                    div {
                        class: "component-buttons",
                        style: "display: flex; flex-direction: column; gap: 8px;",
                        for (i, item) in palette.iter().cloned().enumerate() {
                            PaletteButton { key: "{i}", item }
                        }
                    }
                }
            }

            div {
                class: "canvas-wrapper",
                style: "flex: 1; background: #f0f0f0; overflow-y: auto; padding: 16px;",
                if current_mode == EditorMode::Editor {
                    Canvas { show_meta: config.show_meta }
                } else {
                    PreviewCanvas {}
                }
            }

            if current_mode == EditorMode::Editor {
                div {
                    class: "properties",
                    style: "width: 280px;",
                    PropertiesPanel { settings, palette: palette.clone() }
                }
            }
        }
    }
}

#[component]
fn PaletteButton(item: PaletteItem) -> Element {
    let handle = use_context::<EditorHandle>();
    let label = item.display_label().to_string();
    let dragged = item.clone();

    rsx! {
        button {
            class: "zyra-palette-item",
            draggable: "true",
            ondragstart: move |_| handle.start_drag(DragPayload::palette(dragged.clone())),
            ondragend: move |_| handle.end_drag(),
            onclick: move |_| {
                handle.mutate(|model| model.append_from_palette(item.clone()));
            },
            "{label}"
        }
    }
}

#[component]
fn Canvas(show_meta: bool) -> Element {
    let handle = use_context::<EditorHandle>();
    let blocks = handle.blocks();
    let open = handle.open_id();

    rsx! {
        div {
            class: "canvas",
            style: "min-height: 100%; background: white; padding: 12px;",
            onclick: move |_| {
                let mut model = handle.model;
                model.write().close_selection();
            },
            DropList {
                list_key: ListKey::Canvas,
                items: blocks,
                render_item: move |(index, block): (usize, Block)| {
                    let selected = open == Some(block.id);
                    rsx! {
                        BlockRenderer {
                            block,
                            selected,
                            show_meta,
                            top_index: Some(index),
                            on_select: move |_| handle.select_block(index),
                            on_delete: move |_| {
                                handle.mutate(|model| model.delete_block(index));
                            },
                            on_change: move |patch: BlockPatch| {
                                handle.mutate(|model| model.update_block(index, &patch));
                            },
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn PropertiesPanel(settings: SettingsRenderer, palette: Vec<PaletteItem>) -> Element {
    let handle = use_context::<EditorHandle>();
    let open = handle.model.read().open_block().cloned();

    let Some(block) = open else {
        return rsx! {
            div {
                style: "color: slate; text-align: center; padding: 32px;",
                "Select a block"
            }
        };
    };

    let on_change = EventHandler::new(move |(key, value): (String, Value)| {
        let result = handle.mutate(|model| model.handle_settings_change(&key, value));
        if let Err(err) = result {
            warn!(%err, key = %key, "settings change rejected");
        }
    });
    let panel = settings(SettingMetaBoxProps {
        form_field: block,
        on_change,
        input_type_list: palette,
    });

    rsx! {
        div { class: "properties-panel",
            {panel}
            div { style: "margin-top: 24px; padding-inline: 12px",
                button {
                    onclick: move |_| {
                        handle.mutate(|model| model.delete_open());
                    },
                    style: "width: 100%; padding: 8px; cursor: pointer;
                            background: #f44336; color: white; border: none; border-radius: 4px;",
                    "Delete Block"
                }
            }
        }
    }
}

#[component]
fn PreviewCanvas() -> Element {
    let handle = use_context::<EditorHandle>();
    let blocks = handle.blocks();

    rsx! {
        div {
            style: "width: 100%; min-height: 100%; background: white; padding: 32px;",
            for (index, id, block) in blocks.into_iter().enumerate().map(|(i, b)| (i, b.id, b)) {
                BlockRenderer {
                    key: "{id}",
                    block,
                    show_meta: false,
                    top_index: Some(index),
                    on_select: move |_: ()| {},
                    on_delete: move |_: ()| {},
                    on_change: move |_: BlockPatch| {},
                }
            }
        }
    }
}
