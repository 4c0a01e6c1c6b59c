pub mod controller;
pub mod tool;
pub mod validate;

pub use controller::DrawController;
pub use tool::{DrawCreateEvent, DrawMode, DrawTool, DrawnFeature, DrawnGeometry};
pub use validate::{validate_create, DrawRejection};
