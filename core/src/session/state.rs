use crate::contract::{AnalysisResponse, UserPolygon};

/// Everything the UI can be doing, with the data each phase owns.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Drawing,
    Ready(UserPolygon),
    Analyzing(UserPolygon),
    Complete {
        polygon: UserPolygon,
        result: AnalysisResponse,
    },
    Error(String),
}

/// Payload-free discriminant, used to detect phase changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Drawing,
    Ready,
    Analyzing,
    Complete,
    Error,
}

impl AnalysisState {
    pub fn phase(&self) -> Phase {
        match self {
            AnalysisState::Idle => Phase::Idle,
            AnalysisState::Drawing => Phase::Drawing,
            AnalysisState::Ready(_) => Phase::Ready,
            AnalysisState::Analyzing(_) => Phase::Analyzing,
            AnalysisState::Complete { .. } => Phase::Complete,
            AnalysisState::Error(_) => Phase::Error,
        }
    }

    /// The polygon currently shown on the map, if any.
    pub fn polygon(&self) -> Option<&UserPolygon> {
        match self {
            AnalysisState::Ready(polygon)
            | AnalysisState::Analyzing(polygon)
            | AnalysisState::Complete { polygon, .. } => Some(polygon),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResponse> {
        match self {
            AnalysisState::Complete { result, .. } => Some(result),
            _ => None,
        }
    }
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Drawing => "drawing",
            Phase::Ready => "ready",
            Phase::Analyzing => "analyzing",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }
}
