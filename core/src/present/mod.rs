pub mod format;
pub mod panel;

pub use panel::{
    panel_view, popup_content, summarize, PanelAction, PanelControl, PanelView, PopupContent,
    ResultSummary, SummaryRow,
};
