use std::collections::HashMap;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::blocks::{Block, BlockPatch, BlockType};

#[derive(Props, Clone, PartialEq)]
pub struct FieldProps {
    pub block: Block,
    pub on_change: EventHandler<BlockPatch>,
}

/// Renders the content of one block. Called as a plain function inside the
/// block's own scope, so it must not use hooks.
pub type RenderFn = fn(FieldProps) -> Element;

/// Returns an error message for an invalid value.
pub type ValidateFn = fn(&Block, &str) -> Option<String>;

#[derive(Clone, Copy)]
pub struct FieldRenderer {
    pub render: RenderFn,
    pub validate: Option<ValidateFn>,
}

impl FieldRenderer {
    pub fn new(render: RenderFn) -> Self {
        Self {
            render,
            validate: None,
        }
    }

    pub fn with_validator(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }
}

/// What the block renderer should draw for a block's content.
#[derive(Clone, Copy)]
pub enum Content {
    Field(RenderFn),
    Unknown,
}

/// Block type -> content renderer.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    renderers: Rc<HashMap<BlockType, FieldRenderer>>,
}

impl PartialEq for FieldRegistry {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.renderers, &other.renderers)
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, block_type: BlockType, renderer: FieldRenderer) -> Self {
        Rc::make_mut(&mut self.renderers).insert(block_type, renderer);
        self
    }

    pub fn lookup(&self, block_type: &BlockType) -> Option<&FieldRenderer> {
        self.renderers.get(block_type)
    }

    pub fn content_for(&self, block: &Block) -> Content {
        match self.lookup(&block.block_type) {
            Some(renderer) => Content::Field(renderer.render),
            None => Content::Unknown,
        }
    }

    pub fn validate(&self, block: &Block, value: &str) -> Option<String> {
        self.lookup(&block.block_type)
            .and_then(|r| r.validate)
            .and_then(|validate| validate(block, value))
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

pub fn unknown_type_message(block: &Block) -> String {
    format!("Unknown block type: {}", block.block_type)
}
