//! Default settings panel for the open block.
//!
//! Hosts can swap in their own panel; it receives the open block and emits
//! `(key, value)` pairs that the editor routes to the right block.

use dioxus::prelude::*;
use serde_json::{json, Value};

use super::styles_editor::StyleInput;
use crate::blocks::{Block, BlockType, ChoiceOption, ColumnLayout, PaletteItem};

#[derive(Props, Clone, PartialEq)]
pub struct SettingMetaBoxProps {
    pub form_field: Block,
    pub on_change: EventHandler<(String, Value)>,
    #[props(default)]
    pub input_type_list: Vec<PaletteItem>,
}

/// Called as a plain function by the editor, so it must not use hooks.
pub type SettingsRenderer = fn(SettingMetaBoxProps) -> Element;

/// One choice per line, `value|label` or just a label.
pub fn parse_options(raw: &str) -> Vec<ChoiceOption> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('|') {
            Some((value, label)) => ChoiceOption::new(value.trim(), label.trim()),
            None => ChoiceOption::new(line.to_lowercase().replace(' ', "-"), line),
        })
        .collect()
}

pub fn format_options(options: &[ChoiceOption]) -> String {
    options
        .iter()
        .map(|o| format!("{}|{}", o.value, o.label))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Props, Clone, PartialEq)]
struct TextSettingProps {
    label: &'static str,
    key_name: &'static str,
    value: String,
    on_change: EventHandler<(String, Value)>,
}

#[allow(non_snake_case)]
fn TextSetting(props: TextSettingProps) -> Element {
    let key_name = props.key_name;
    let on_change = props.on_change;
    rsx! {
        label { class: "zyra-setting",
            span { "{props.label}" }
            input {
                r#type: "text",
                value: "{props.value}",
                oninput: move |e| on_change.call((key_name.to_string(), json!(e.value()))),
            }
        }
    }
}

#[allow(non_snake_case)]
pub fn SettingMetaBox(props: SettingMetaBoxProps) -> Element {
    let block = props.form_field;
    let on_change = props.on_change;
    let ty = block.block_type.clone();
    let type_label = props
        .input_type_list
        .iter()
        .find(|item| item.value == ty)
        .map(|item| item.display_label().to_string())
        .unwrap_or_else(|| ty.default_label().to_string());

    let is_input = matches!(
        ty,
        BlockType::Text | BlockType::Email | BlockType::Textarea | BlockType::DatePicker | BlockType::TimePicker
    );
    let has_text = matches!(ty, BlockType::Heading | BlockType::Title | BlockType::Button);
    let layout = block.layout.unwrap_or_default();
    let level = block.level.unwrap_or(2);
    let options_text = format_options(&block.options);
    let html = block.html.clone().unwrap_or_default();
    let layout_value = layout.as_str();

    rsx! {
        div { class: "properties-panel",
            h1 { style: "color:slate;text-align:center; margin: 24px 0 12px 0; font-size: 18px;", "{type_label}" }

            TextSetting { label: "Label", key_name: "label", value: block.label.clone(), on_change }
            if !ty.is_columns() {
                TextSetting { label: "Name", key_name: "name", value: block.name.clone(), on_change }
            }
            if is_input {
                TextSetting {
                    label: "Placeholder",
                    key_name: "placeholder",
                    value: block.placeholder.clone().unwrap_or_default(),
                    on_change,
                }
            }
            if is_input || ty.has_options() || ty == BlockType::Address {
                label { class: "zyra-setting",
                    input {
                        r#type: "checkbox",
                        checked: block.required,
                        onchange: move |e| on_change.call(("required".to_string(), json!(e.checked()))),
                    }
                    "Required"
                }
            }
            if has_text {
                TextSetting { label: "Text", key_name: "text", value: block.text.clone().unwrap_or_default(), on_change }
            }
            if ty == BlockType::Heading {
                label { class: "zyra-setting",
                    span { "Level" }
                    select {
                        value: "{level}",
                        onchange: move |e| {
                            if let Ok(level) = e.value().parse::<u8>() {
                                on_change.call(("level".to_string(), json!(level)));
                            }
                        },
                        for n in 1..=4u8 {
                            option { key: "{n}", value: "{n}", selected: n == level, "H{n}" }
                        }
                    }
                }
            }
            if ty == BlockType::Button {
                TextSetting { label: "Link", key_name: "url", value: block.url.clone().unwrap_or_default(), on_change }
            }
            if ty == BlockType::Image {
                TextSetting { label: "Image URL", key_name: "src", value: block.src.clone().unwrap_or_default(), on_change }
                TextSetting { label: "Alt text", key_name: "alt", value: block.alt.clone().unwrap_or_default(), on_change }
            }
            if ty == BlockType::RichText {
                label { class: "zyra-setting",
                    span { "Content" }
                    textarea {
                        value: "{html}",
                        oninput: move |e| on_change.call(("html".to_string(), json!(e.value()))),
                    }
                }
            }
            if ty.has_options() {
                label { class: "zyra-setting",
                    span { "Options (value|label per line)" }
                    textarea {
                        value: "{options_text}",
                        onchange: move |e| {
                            let options = parse_options(&e.value());
                            on_change.call(("options".to_string(), json!(options)));
                        },
                    }
                }
            }
            if ty.is_columns() {
                label { class: "zyra-setting",
                    span { "Layout" }
                    select {
                        value: "{layout_value}",
                        onchange: move |e| on_change.call(("layout".to_string(), json!(e.value()))),
                        for (name, selected) in ColumnLayout::ALL.iter().map(|l| (l.as_str(), *l == layout)) {
                            option { key: "{name}", value: "{name}", selected, "{name}" }
                        }
                    }
                }
            }

            h1 { style: "color:slate;text-align:center; margin: 24px 0 12px 0; font-size: 18px;", "Styles" }
            StyleInput {
                key: "{block.id}",
                block: block.clone(),
                on_change: move |style| on_change.call(("style".to_string(), json!(style))),
            }
        }
    }
}
