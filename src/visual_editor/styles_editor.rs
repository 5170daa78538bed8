use dioxus::prelude::*;

use crate::blocks::{Block, BlockStyle};

/// Key/value editor for a block's style record.
///
/// Edits stay in a local buffer until Save; Cancel reloads from the block.
/// Render it with `key: "{block.id}"` so switching blocks starts a fresh buffer.
#[component]
pub fn StyleInput(block: Block, on_change: EventHandler<BlockStyle>) -> Element {
    let initial = block.style.clone().unwrap_or_default().entries();
    let mut buffer = use_signal(move || initial);
    let pairs_snapshot = buffer.read().clone();

    rsx! {
        div {
            class: "styles-editor",
            for (i, (key, value)) in pairs_snapshot.into_iter().enumerate() {
                div { key: "{i}",
                    input {
                        value: "{key}",
                        oninput: move |e| {
                            if let Some(pair) = buffer.write().get_mut(i) {
                                pair.0 = e.value();
                            }
                        }
                    }
                    input {
                        value: "{value}",
                        oninput: move |e| {
                            if let Some(pair) = buffer.write().get_mut(i) {
                                pair.1 = e.value();
                            }
                        }
                    }
                    button {
                        onclick: move |_| {
                            let mut pairs = buffer.write();
                            if i < pairs.len() {
                                pairs.remove(i);
                            }
                        },
                        "X"
                    }
                }
            }

            div { style: "margin-top: 8px; display:flex; gap:8px;",
                button {
                    onclick: move |_| {
                        let mut pairs = buffer.write();
                        let mut new_key = "new-property".to_string();
                        let mut counter = 1;
                        while pairs.iter().any(|(k, _)| k == &new_key) {
                            new_key = format!("new-property-{}", counter);
                            counter += 1;
                        }
                        pairs.push((new_key, String::new()));
                    },
                    "Add style"
                }

                button {
                    onclick: move |_| {
                        let pairs = buffer.read().clone();
                        let style = BlockStyle::from_entries(
                            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                        );
                        buffer.set(style.entries());
                        on_change.call(style);
                    },
                    "Save"
                }

                button {
                    onclick: {
                        let current = block.style.clone().unwrap_or_default();
                        move |_| buffer.set(current.entries())
                    },
                    "Cancel"
                }
            }
        }
    }
}
