use crate::backend::{run_analysis, AnalysisBackend, AnalysisError};
use crate::contract::{AnalysisResponse, Category, UserPolygon};
use crate::session::state::{AnalysisState, Phase};
use crate::session::visibility::LayerVisibility;
use log::{debug, info};

/// Identifies one analysis attempt; outcomes with an outdated ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisTicket(u64);

/// What the caller must send once the session has entered `analyzing`.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticket: AnalysisTicket,
    pub polygon: UserPolygon,
}

/// Owns the analysis state and the layer toggles that reset with it.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: AnalysisState,
    visibility: LayerVisibility,
    issued: u64,
    in_flight: Option<AnalysisTicket>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn visibility(&self) -> &LayerVisibility {
        &self.visibility
    }

    fn transition(&mut self, next: AnalysisState) {
        info!("analysis {} -> {}", self.state.phase().as_str(), next.phase().as_str());
        self.state = next;
    }

    pub fn start_drawing(&mut self) -> bool {
        if self.phase() != Phase::Idle {
            debug!("start drawing ignored in {}", self.phase().as_str());
            return false;
        }
        self.transition(AnalysisState::Drawing);
        true
    }

    pub fn set_polygon(&mut self, polygon: UserPolygon) -> bool {
        if self.phase() != Phase::Drawing {
            debug!("polygon ignored in {}", self.phase().as_str());
            return false;
        }
        self.transition(AnalysisState::Ready(polygon));
        true
    }

    /// Moves `ready` to `analyzing`. Returns `None` from any other state, in which
    /// case no request must be issued.
    pub fn begin_analysis(&mut self) -> Option<AnalysisRequest> {
        let AnalysisState::Ready(polygon) = &self.state else {
            debug!("analyze ignored in {}", self.phase().as_str());
            return None;
        };
        let polygon = polygon.clone();
        self.issued += 1;
        let ticket = AnalysisTicket(self.issued);
        self.in_flight = Some(ticket);
        self.transition(AnalysisState::Analyzing(polygon.clone()));
        Some(AnalysisRequest { ticket, polygon })
    }

    /// Applies the outcome of the request identified by `ticket`.
    pub fn resolve(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<AnalysisResponse, AnalysisError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!("dropping outcome for stale ticket {:?}", ticket);
            return false;
        }
        let AnalysisState::Analyzing(polygon) = &self.state else {
            debug!("dropping outcome outside analyzing");
            return false;
        };
        let polygon = polygon.clone();
        self.in_flight = None;
        match outcome {
            Ok(result) => self.transition(AnalysisState::Complete { polygon, result }),
            Err(err) => self.transition(AnalysisState::Error(err.message())),
        }
        true
    }

    /// Runs the whole `ready -> analyzing -> complete | error` flow against a
    /// backend. A no-op returning `false` unless the session is `ready`.
    pub async fn analyze<B: AnalysisBackend>(&mut self, backend: &B) -> bool {
        let Some(request) = self.begin_analysis() else {
            return false;
        };
        let outcome = run_analysis(backend, &request.polygon).await;
        self.resolve(request.ticket, outcome)
    }

    pub fn clear(&mut self) {
        self.in_flight = None;
        self.visibility.reset();
        self.transition(AnalysisState::Idle);
    }

    pub fn toggle_layer(&mut self, category: Category) {
        self.visibility.toggle(category);
    }
}
