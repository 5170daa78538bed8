//! Minimal content renderers so the editor works without a host registry.

use dioxus::prelude::*;

use super::registry::{FieldProps, FieldRegistry, FieldRenderer};
use crate::blocks::{Block, BlockType};

pub fn default_registry() -> FieldRegistry {
    let input = FieldRenderer::new(input_field).with_validator(required);
    let choice = FieldRenderer::new(choice_field).with_validator(required);
    [
        (BlockType::Text, input),
        (BlockType::Email, FieldRenderer::new(input_field).with_validator(email)),
        (BlockType::Textarea, FieldRenderer::new(textarea_field).with_validator(required)),
        (BlockType::DatePicker, input),
        (BlockType::TimePicker, input),
        (BlockType::Attachment, input),
        (BlockType::Heading, FieldRenderer::new(heading_field)),
        (BlockType::Title, FieldRenderer::new(heading_field)),
        (BlockType::RichText, FieldRenderer::new(rich_text_field)),
        (BlockType::Image, FieldRenderer::new(image_field)),
        (BlockType::Button, FieldRenderer::new(button_field)),
        (BlockType::Divider, FieldRenderer::new(divider_field)),
        (BlockType::Section, FieldRenderer::new(divider_field)),
        (BlockType::Radio, choice),
        (BlockType::Checkboxes, choice),
        (BlockType::Dropdown, choice),
        (BlockType::MultiSelect, choice),
        (BlockType::Address, FieldRenderer::new(address_field)),
        (BlockType::Recaptcha, FieldRenderer::new(recaptcha_field)),
    ]
    .into_iter()
    .fold(FieldRegistry::new(), |registry, (ty, renderer)| {
        registry.register(ty, renderer)
    })
}

fn required(block: &Block, value: &str) -> Option<String> {
    (block.required && value.trim().is_empty()).then(|| format!("{} is required", block.label))
}

fn email(block: &Block, value: &str) -> Option<String> {
    required(block, value).or_else(|| {
        let value = value.trim();
        (!value.is_empty() && !value.contains('@')).then(|| "Enter a valid email address".to_string())
    })
}

fn input_type(block_type: &BlockType) -> &'static str {
    match block_type {
        BlockType::Email => "email",
        BlockType::DatePicker => "date",
        BlockType::TimePicker => "time",
        BlockType::Attachment => "file",
        _ => "text",
    }
}

fn input_field(props: FieldProps) -> Element {
    let block = props.block;
    let placeholder = block.placeholder.clone().unwrap_or_default();
    rsx! {
        label { class: "zyra-field",
            span { class: "zyra-field-label", "{block.label}" }
            if block.required {
                span { class: "zyra-required", " *" }
            }
            input {
                r#type: input_type(&block.block_type),
                name: "{block.name}",
                placeholder: "{placeholder}",
                readonly: true,
            }
        }
    }
}

fn textarea_field(props: FieldProps) -> Element {
    let block = props.block;
    let placeholder = block.placeholder.clone().unwrap_or_default();
    rsx! {
        label { class: "zyra-field",
            span { class: "zyra-field-label", "{block.label}" }
            textarea { name: "{block.name}", placeholder: "{placeholder}", readonly: true }
        }
    }
}

fn heading_field(props: FieldProps) -> Element {
    let text = props.block.text.clone().unwrap_or_else(|| props.block.label.clone());
    let style = props.block.style.as_ref().map(|s| s.to_css()).unwrap_or_default();
    match props.block.level.unwrap_or(2) {
        1 => rsx! { h1 { style: "{style}", "{text}" } },
        2 => rsx! { h2 { style: "{style}", "{text}" } },
        3 => rsx! { h3 { style: "{style}", "{text}" } },
        _ => rsx! { h4 { style: "{style}", "{text}" } },
    }
}

fn rich_text_field(props: FieldProps) -> Element {
    let html = props.block.html.clone().unwrap_or_default();
    let style = props.block.style.as_ref().map(|s| s.to_css()).unwrap_or_default();
    rsx! {
        div { class: "zyra-richtext", style: "{style}", dangerous_inner_html: "{html}" }
    }
}

fn image_field(props: FieldProps) -> Element {
    let block = props.block;
    match block.src.clone().filter(|src| !src.is_empty()) {
        Some(src) => {
            let alt = block.alt.clone().unwrap_or_default();
            rsx! { img { src: "{src}", alt: "{alt}", style: "max-width: 100%;" } }
        }
        None => rsx! {
            div { class: "zyra-image-empty", "No image selected" }
        },
    }
}

fn button_field(props: FieldProps) -> Element {
    let text = props.block.text.clone().unwrap_or_else(|| props.block.label.clone());
    let url = props.block.url.clone().unwrap_or_else(|| "#".to_string());
    let style = props.block.style.as_ref().map(|s| s.to_css()).unwrap_or_default();
    rsx! {
        a { class: "zyra-button", href: "{url}", style: "{style}",
            onclick: move |e| e.prevent_default(),
            "{text}"
        }
    }
}

fn divider_field(props: FieldProps) -> Element {
    let style = props.block.style.as_ref().map(|s| s.to_css()).unwrap_or_default();
    rsx! { hr { style: "{style}" } }
}

fn choice_field(props: FieldProps) -> Element {
    let block = props.block;
    let kind = match block.block_type {
        BlockType::Radio => "radio",
        _ => "checkbox",
    };
    let listed = matches!(block.block_type, BlockType::Radio | BlockType::Checkboxes);
    rsx! {
        fieldset { class: "zyra-field",
            legend { "{block.label}" }
            if listed {
                for choice in block.options.iter() {
                    label { key: "{choice.value}",
                        input { r#type: kind, name: "{block.name}", value: "{choice.value}", disabled: true }
                        "{choice.label}"
                    }
                }
            } else {
                select {
                    name: "{block.name}",
                    multiple: block.block_type == BlockType::MultiSelect,
                    disabled: true,
                    for choice in block.options.iter() {
                        option { key: "{choice.value}", value: "{choice.value}", "{choice.label}" }
                    }
                }
            }
        }
    }
}

fn address_field(props: FieldProps) -> Element {
    let block = props.block;
    rsx! {
        fieldset { class: "zyra-field",
            legend { "{block.label}" }
            for part in block.fields.iter() {
                input { key: "{part}", r#type: "text", placeholder: "{part}", readonly: true }
            }
        }
    }
}

fn recaptcha_field(_: FieldProps) -> Element {
    rsx! {
        div { class: "zyra-recaptcha", "reCAPTCHA is shown on the live form" }
    }
}
