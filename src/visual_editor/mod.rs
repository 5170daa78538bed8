pub mod block_renderer;
pub mod column_renderer;
pub mod component;
pub mod dom;
pub mod drop_list;
pub mod fields;
pub mod handle;
pub mod registry;
pub mod settings;
pub mod styles_editor;

pub use block_renderer::BlockRenderer;
pub use component::{CanvasEditor, EditorMode};
pub use fields::default_registry;
pub use handle::EditorHandle;
pub use registry::{Content, FieldProps, FieldRegistry, FieldRenderer};
pub use settings::{SettingMetaBox, SettingMetaBoxProps, SettingsRenderer};
pub use styles_editor::StyleInput;
