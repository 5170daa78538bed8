//! Block data model: identity, type tags, type-specific payload and patches.
//!
//! A [`Block`] is one flat record. Only the fields relevant to its
//! [`BlockType`] are read by renderers; the rest ride along untouched, which
//! keeps persisted JSON lossless when a block changes type in a later version.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::columns;
use crate::config::EditorConfig;
use crate::error::{Result, ZyraError};

/// Process-unique block identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

fn id_counter() -> &'static AtomicU64 {
    static NEXT_ID: OnceLock<AtomicU64> = OnceLock::new();
    NEXT_ID.get_or_init(|| AtomicU64::new(clock_seed()))
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}

impl BlockId {
    /// Allocate a fresh id. Never returns the same value twice in a process.
    pub fn fresh() -> Self {
        Self(id_counter().fetch_add(1, Ordering::Relaxed))
    }

    /// Record an id that came from outside (persisted data) so later
    /// allocations skip past it.
    pub fn observe(id: BlockId) {
        id_counter().fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }

    /// DOM id for the block's chrome element.
    pub fn dom_id(&self) -> String {
        format!("zyra-block-{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Text,
    Email,
    Textarea,
    RichText,
    Heading,
    Image,
    Button,
    Divider,
    Columns,
    Radio,
    Dropdown,
    MultiSelect,
    Checkboxes,
    DatePicker,
    TimePicker,
    Attachment,
    Section,
    Recaptcha,
    Address,
    Title,
    /// A tag this build does not know. Kept verbatim so it survives a save.
    Unknown(String),
}

impl BlockType {
    pub const KNOWN: [BlockType; 20] = [
        BlockType::Text,
        BlockType::Email,
        BlockType::Textarea,
        BlockType::RichText,
        BlockType::Heading,
        BlockType::Image,
        BlockType::Button,
        BlockType::Divider,
        BlockType::Columns,
        BlockType::Radio,
        BlockType::Dropdown,
        BlockType::MultiSelect,
        BlockType::Checkboxes,
        BlockType::DatePicker,
        BlockType::TimePicker,
        BlockType::Attachment,
        BlockType::Section,
        BlockType::Recaptcha,
        BlockType::Address,
        BlockType::Title,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Text => "text",
            BlockType::Email => "email",
            BlockType::Textarea => "textarea",
            BlockType::RichText => "richtext",
            BlockType::Heading => "heading",
            BlockType::Image => "image",
            BlockType::Button => "button",
            BlockType::Divider => "divider",
            BlockType::Columns => "columns",
            BlockType::Radio => "radio",
            BlockType::Dropdown => "dropdown",
            BlockType::MultiSelect => "multi-select",
            BlockType::Checkboxes => "checkboxes",
            BlockType::DatePicker => "datepicker",
            BlockType::TimePicker => "time-picker",
            BlockType::Attachment => "attachment",
            BlockType::Section => "section",
            BlockType::Recaptcha => "recaptcha",
            BlockType::Address => "address",
            BlockType::Title => "title",
            BlockType::Unknown(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == tag)
            .cloned()
            .unwrap_or_else(|| BlockType::Unknown(tag.to_string()))
    }

    pub fn is_columns(&self) -> bool {
        matches!(self, BlockType::Columns)
    }

    /// Types that carry a list of choices.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            BlockType::Radio | BlockType::Dropdown | BlockType::MultiSelect | BlockType::Checkboxes
        )
    }

    pub fn default_label(&self) -> &str {
        match self {
            BlockType::Text => "Textbox",
            BlockType::Email => "Email",
            BlockType::Textarea => "Textarea",
            BlockType::RichText => "Rich Text",
            BlockType::Heading => "Heading",
            BlockType::Image => "Image",
            BlockType::Button => "Button",
            BlockType::Divider => "Divider",
            BlockType::Columns => "Columns",
            BlockType::Radio => "Radio",
            BlockType::Dropdown => "Dropdown",
            BlockType::MultiSelect => "Multi Select",
            BlockType::Checkboxes => "Checkboxes",
            BlockType::DatePicker => "Date Picker",
            BlockType::TimePicker => "Time Picker",
            BlockType::Attachment => "Attachment",
            BlockType::Section => "Section",
            BlockType::Recaptcha => "reCAPTCHA",
            BlockType::Address => "Address",
            BlockType::Title => "Title",
            BlockType::Unknown(tag) => tag,
        }
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        BlockType::parse(&tag)
    }
}

impl From<BlockType> for String {
    fn from(ty: BlockType) -> Self {
        match ty {
            BlockType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column count and width split of a columns block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LayoutRepr", into = "String")]
pub enum ColumnLayout {
    One,
    #[default]
    TwoEqual,
    TwoWide,
    Three,
    Four,
}

/// Persisted layouts show up both as `"3"` and as `3`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutRepr {
    Text(String),
    Number(u64),
}

impl From<LayoutRepr> for ColumnLayout {
    fn from(repr: LayoutRepr) -> Self {
        let parsed = match repr {
            LayoutRepr::Text(raw) => ColumnLayout::parse(&raw),
            LayoutRepr::Number(n) => ColumnLayout::parse(&n.to_string()),
        };
        parsed.unwrap_or_default()
    }
}

impl From<ColumnLayout> for String {
    fn from(layout: ColumnLayout) -> Self {
        layout.as_str().to_string()
    }
}

impl ColumnLayout {
    pub const ALL: [ColumnLayout; 5] = [
        ColumnLayout::One,
        ColumnLayout::TwoEqual,
        ColumnLayout::TwoWide,
        ColumnLayout::Three,
        ColumnLayout::Four,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnLayout::One => "1",
            ColumnLayout::TwoEqual => "2-50",
            ColumnLayout::TwoWide => "2-66",
            ColumnLayout::Three => "3",
            ColumnLayout::Four => "4",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layout| layout.as_str() == raw.trim())
    }

    pub fn column_count(self) -> usize {
        match self {
            ColumnLayout::One => 1,
            ColumnLayout::TwoEqual | ColumnLayout::TwoWide => 2,
            ColumnLayout::Three => 3,
            ColumnLayout::Four => 4,
        }
    }

    /// Width of each column in percent.
    pub fn widths(self) -> &'static [u8] {
        match self {
            ColumnLayout::One => &[100],
            ColumnLayout::TwoEqual => &[50, 50],
            ColumnLayout::TwoWide => &[66, 34],
            ColumnLayout::Three => &[33, 33, 34],
            ColumnLayout::Four => &[25, 25, 25, 25],
        }
    }

    /// Best layout for a matrix of `count` columns found without a layout tag.
    pub fn for_count(count: usize) -> Self {
        match count {
            1 => ColumnLayout::One,
            3 => ColumnLayout::Three,
            n if n >= 4 => ColumnLayout::Four,
            _ => ColumnLayout::TwoEqual,
        }
    }
}

/// Column count for a raw layout tag; unknown tags count as two columns.
pub fn column_count_for(layout: &str) -> usize {
    ColumnLayout::parse(layout).map_or(2, ColumnLayout::column_count)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Visual style shared by content blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Any other CSS property, keyed by its CSS name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl BlockStyle {
    const NAMED: [&'static str; 9] = [
        "color",
        "background",
        "padding",
        "margin",
        "border",
        "border-radius",
        "font-size",
        "font-weight",
        "text-align",
    ];

    fn slot(&mut self, property: &str) -> Option<&mut Option<String>> {
        match property {
            "color" => Some(&mut self.color),
            "background" => Some(&mut self.background),
            "padding" => Some(&mut self.padding),
            "margin" => Some(&mut self.margin),
            "border" => Some(&mut self.border),
            "border-radius" => Some(&mut self.border_radius),
            "font-size" => Some(&mut self.font_size),
            "font-weight" => Some(&mut self.font_weight),
            "text-align" => Some(&mut self.text_align),
            _ => None,
        }
    }

    fn named(&self) -> [(&'static str, &Option<String>); 9] {
        [
            (Self::NAMED[0], &self.color),
            (Self::NAMED[1], &self.background),
            (Self::NAMED[2], &self.padding),
            (Self::NAMED[3], &self.margin),
            (Self::NAMED[4], &self.border),
            (Self::NAMED[5], &self.border_radius),
            (Self::NAMED[6], &self.font_size),
            (Self::NAMED[7], &self.font_weight),
            (Self::NAMED[8], &self.text_align),
        ]
    }

    /// Set a CSS property; an empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.trim();
        if property.is_empty() {
            return;
        }
        let value = value.trim();
        let next = (!value.is_empty()).then(|| value.to_string());
        match self.slot(property) {
            Some(slot) => *slot = next,
            None => match next {
                Some(v) => {
                    self.extra.insert(property.to_string(), v);
                }
                None => {
                    self.extra.remove(property);
                }
            },
        }
    }

    /// All set properties as `(css-name, value)` pairs.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.named()
            .into_iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
            .chain(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }

    /// Build from ordered pairs; duplicate keys keep the last value.
    pub fn from_entries<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut style = Self::default();
        for (k, v) in pairs {
            style.set(k, v);
        }
        style
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn to_css(&self) -> String {
        self.entries()
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One unit of content on the canvas or inside a column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default = "BlockId::fresh")]
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BlockStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<ColumnLayout>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_columns"
    )]
    pub columns: Option<Vec<Vec<Block>>>,
}

/// A `columns` value that is not a matrix of blocks reads as missing; the
/// columns block is repaired afterwards instead of failing the whole load.
fn lenient_columns<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<Vec<Block>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match serde_json::from_value(value) {
        Ok(columns) => Some(columns),
        Err(err) => {
            warn!("discarding malformed columns matrix: {err}");
            None
        }
    }))
}

impl Block {
    /// Bare block with only identity filled in.
    pub fn new(id: BlockId, block_type: BlockType) -> Self {
        Self {
            id,
            name: format!("{}-{}", block_type, id),
            label: block_type.default_label().to_string(),
            block_type,
            placeholder: None,
            html: None,
            text: None,
            level: None,
            src: None,
            alt: None,
            url: None,
            options: Vec::new(),
            fields: Vec::new(),
            required: false,
            style: None,
            layout: None,
            columns: None,
        }
    }

    pub fn is_columns(&self) -> bool {
        self.block_type.is_columns()
    }

    /// Column count this block must carry, from its layout.
    pub fn expected_columns(&self) -> usize {
        self.layout.unwrap_or_default().column_count()
    }

    /// Every id in this block and its children, parent first.
    pub fn ids(&self) -> Vec<BlockId> {
        let mut ids = vec![self.id];
        if let Some(columns) = &self.columns {
            ids.extend(columns.iter().flatten().flat_map(Block::ids));
        }
        ids
    }
}

/// Palette descriptor for a block that does not exist yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteItem {
    pub value: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

impl PaletteItem {
    pub fn new(value: BlockType) -> Self {
        Self {
            value,
            fixed_name: None,
            placeholder: None,
            label: None,
            options: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_fixed_name(mut self, name: impl Into<String>) -> Self {
        self.fixed_name = Some(name.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .unwrap_or_else(|| self.value.default_label())
    }
}

/// One palette entry per known block type.
pub fn default_palette() -> Vec<PaletteItem> {
    BlockType::KNOWN.iter().cloned().map(PaletteItem::new).collect()
}

/// What a drag list holds: a real block, or a palette descriptor that becomes
/// one when dropped.
#[derive(Clone, Debug, PartialEq)]
pub enum ListEntry {
    Block(Block),
    Palette(PaletteItem),
}

impl ListEntry {
    pub fn block_id(&self) -> Option<BlockId> {
        match self {
            ListEntry::Block(block) => Some(block.id),
            ListEntry::Palette(_) => None,
        }
    }

    pub fn block_type(&self) -> &BlockType {
        match self {
            ListEntry::Block(block) => &block.block_type,
            ListEntry::Palette(item) => &item.value,
        }
    }
}

impl From<Block> for ListEntry {
    fn from(block: Block) -> Self {
        ListEntry::Block(block)
    }
}

impl From<PaletteItem> for ListEntry {
    fn from(item: PaletteItem) -> Self {
        ListEntry::Palette(item)
    }
}

const ADDRESS_FIELDS: [&str; 6] = ["address_1", "address_2", "city", "state", "country", "postcode"];

/// Materialize a list entry into a block.
///
/// Existing blocks pass through, with a malformed columns matrix repaired.
/// Palette items get a fresh id and the defaults for their type.
pub fn create_block(entry: ListEntry, config: &EditorConfig) -> Block {
    let item = match entry {
        ListEntry::Block(block) => return columns::normalize_columns(&block),
        ListEntry::Palette(item) => item,
    };

    let id = BlockId::fresh();
    let mut block = Block::new(id, item.value.clone());
    if let Some(name) = item.fixed_name {
        block.name = name;
    }
    if let Some(label) = item.label {
        block.label = label;
    }
    block.placeholder = item.placeholder;

    match block.block_type {
        BlockType::Heading | BlockType::Title => {
            block.level = Some(if block.block_type == BlockType::Title { 1 } else { 2 });
            block.text = Some("Heading Text".to_string());
        }
        BlockType::RichText => block.html = Some("<p>Paragraph text</p>".to_string()),
        BlockType::Button => {
            block.text = Some("Click me".to_string());
            block.url = Some("#".to_string());
        }
        BlockType::Image => block.alt = Some(String::new()),
        BlockType::Address => {
            block.fields = ADDRESS_FIELDS.iter().map(|f| f.to_string()).collect();
        }
        BlockType::Columns => {
            let layout = config.default_layout;
            block.layout = Some(layout);
            block.columns = Some(vec![Vec::new(); layout.column_count()]);
        }
        ref ty if ty.has_options() => {
            block.options = if item.options.is_empty() {
                vec![
                    ChoiceOption::new("option-1", "Option 1"),
                    ChoiceOption::new("option-2", "Option 2"),
                ]
            } else {
                item.options
            };
        }
        _ => {}
    }
    block
}

/// Partial update merged into a block. `id` and `type` are not patchable.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockPatch {
    pub name: Option<String>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub level: Option<u8>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub url: Option<String>,
    pub options: Option<Vec<ChoiceOption>>,
    pub fields: Option<Vec<String>>,
    pub required: Option<bool>,
    pub style: Option<BlockStyle>,
    pub layout: Option<ColumnLayout>,
    pub columns: Option<Vec<Vec<Block>>>,
}

impl BlockPatch {
    pub const KEYS: [&'static str; 15] = [
        "name",
        "label",
        "placeholder",
        "html",
        "text",
        "level",
        "src",
        "alt",
        "url",
        "options",
        "fields",
        "required",
        "style",
        "layout",
        "columns",
    ];

    /// Turn a settings-panel `(key, value)` pair into a patch.
    pub fn from_setting(key: &str, value: serde_json::Value) -> Result<Self> {
        if key == "id" || key == "type" {
            return Err(ZyraError::ImmutableField(key.to_string()));
        }
        if !Self::KEYS.contains(&key) {
            return Err(ZyraError::UnknownSetting(key.to_string()));
        }
        let mut object = serde_json::Map::new();
        object.insert(key.to_string(), value);
        serde_json::from_value(serde_json::Value::Object(object)).map_err(|source| {
            ZyraError::InvalidSetting {
                key: key.to_string(),
                source,
            }
        })
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn style(style: BlockStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }
}

/// Shallow-merge `patch` into a copy of `block`.
///
/// On a columns block a `layout` goes through the lossless layout change and a
/// `columns` matrix is fitted to the layout. Both are ignored elsewhere.
pub fn apply_patch(block: &Block, patch: &BlockPatch) -> Block {
    let mut next = block.clone();

    fn merge<T: Clone>(slot: &mut T, value: &Option<T>) {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }
    fn merge_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
        if value.is_some() {
            *slot = value.clone();
        }
    }

    merge(&mut next.name, &patch.name);
    merge(&mut next.label, &patch.label);
    merge_opt(&mut next.placeholder, &patch.placeholder);
    merge_opt(&mut next.html, &patch.html);
    merge_opt(&mut next.text, &patch.text);
    merge_opt(&mut next.level, &patch.level);
    merge_opt(&mut next.src, &patch.src);
    merge_opt(&mut next.alt, &patch.alt);
    merge_opt(&mut next.url, &patch.url);
    merge(&mut next.options, &patch.options);
    merge(&mut next.fields, &patch.fields);
    merge(&mut next.required, &patch.required);
    merge_opt(&mut next.style, &patch.style);

    if patch.columns.is_some() || patch.layout.is_some() {
        if !next.is_columns() {
            warn!(id = %block.id, ty = %block.block_type, "layout patch on a non-columns block ignored");
            return next;
        }
        if let Some(columns) = &patch.columns {
            next.columns = Some(columns.clone());
            next = columns::normalize_columns(&next);
        }
        if let Some(layout) = patch.layout {
            next = columns::change_layout(&next, layout);
        }
    }
    next
}
