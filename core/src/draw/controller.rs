use crate::contract::{Position, UserPolygon};
use crate::draw::tool::{DrawCreateEvent, DrawMode, DrawTool};
use crate::draw::validate::{validate_create, DrawRejection};
use crate::session::{AnalysisState, Phase};
use log::{error, info, warn};

/// Owns the map's single drawing tool for as long as the map is mounted.
///
/// Creating the controller attaches the tool; dropping it detaches the tool and
/// discards everything drawn, however the map goes away.
#[derive(Debug)]
pub struct DrawController {
    tool: DrawTool,
    synced: Option<Phase>,
    notice: Option<DrawRejection>,
}

impl DrawController {
    pub fn attach() -> Self {
        info!("draw tool attached");
        Self {
            tool: DrawTool::new(),
            synced: None,
            notice: None,
        }
    }

    pub fn tool(&self) -> &DrawTool {
        &self.tool
    }

    /// Follows phase changes: entering `drawing` arms polygon mode, entering
    /// `idle` wipes the drawn geometry. Repeated calls in one phase do nothing.
    pub fn sync(&mut self, state: &AnalysisState) {
        let phase = state.phase();
        if self.synced == Some(phase) {
            return;
        }
        self.synced = Some(phase);
        match phase {
            Phase::Drawing => self.tool.change_mode(DrawMode::DrawPolygon),
            Phase::Idle => {
                self.tool.delete_all();
                self.tool.change_mode(DrawMode::SimpleSelect);
                self.notice = None;
            }
            _ => {}
        }
    }

    /// Pending validation message. While set, vertex input is blocked.
    pub fn notice(&self) -> Option<DrawRejection> {
        self.notice
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn add_vertex(&mut self, position: Position) -> bool {
        if self.notice.is_some() {
            return false;
        }
        self.tool.add_vertex(position)
    }

    /// Finishes the current gesture and validates it.
    pub fn finish(&mut self) -> Option<UserPolygon> {
        if self.notice.is_some() {
            return None;
        }
        let event = self.tool.finish()?;
        self.handle_create(event)
    }

    /// Only a polygon that passes validation is returned. A rejected shape is
    /// erased, polygon mode is re-armed and a notice is raised.
    pub fn handle_create(&mut self, event: DrawCreateEvent) -> Option<UserPolygon> {
        match validate_create(&event) {
            Ok(polygon) => Some(polygon),
            Err(DrawRejection::Empty) => {
                error!("draw event fired with no features");
                None
            }
            Err(rejection) => {
                warn!("drawn shape rejected: {}", rejection);
                self.tool.delete_all();
                self.tool.change_mode(DrawMode::DrawPolygon);
                self.notice = Some(rejection);
                None
            }
        }
    }
}

impl Drop for DrawController {
    fn drop(&mut self) {
        self.tool.delete_all();
        info!("draw tool detached");
    }
}
