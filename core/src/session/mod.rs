pub mod machine;
pub mod state;
pub mod visibility;

pub use machine::{AnalysisRequest, AnalysisSession, AnalysisTicket};
pub use state::{AnalysisState, Phase};
pub use visibility::LayerVisibility;
