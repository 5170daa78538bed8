pub mod canvas;
pub mod drag;
pub mod persist;
pub mod selection;

pub use canvas::CanvasModel;
pub use drag::{DragBatch, DragPayload};
pub use persist::{PersistGate, PersistTicket};
pub use selection::Selection;
