//! Client core for the Urban Doodle land-cover analysis map.
//!
//! Everything the map client decides lives here: the wire contract with the
//! analysis service, the analysis state machine, the drawing tool and its
//! validation, overlay grouping and hit testing, and the panel's derived view.
//! The GUI only translates these into widgets.

pub mod backend;
pub mod config;
pub mod contract;
pub mod draw;
pub mod present;
pub mod render;
pub mod session;
pub mod spatial;

pub use backend::{AnalysisBackend, AnalysisError};
pub use contract::{AnalysisResponse, Category, UserPolygon};
pub use session::{AnalysisSession, AnalysisState};
