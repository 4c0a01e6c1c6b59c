use crate::contract::{AnalysisMetadata, Category, Rgb};
use crate::present::format;
use crate::render::FeatureHit;
use crate::session::{AnalysisState, LayerVisibility};

/// What a panel control does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    StartDrawing,
    Analyze,
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelControl {
    Button {
        label: &'static str,
        action: PanelAction,
        primary: bool,
    },
    /// Non-interactive processing indicator.
    Indicator(&'static str),
    /// Error text shown above the retry button.
    ErrorBanner(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: Category,
    pub label: &'static str,
    pub marker: char,
    pub color: Rgb,
    pub percentage: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub total_area: String,
    pub total_acres: String,
    pub rows: Vec<SummaryRow>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub caption: &'static str,
    pub controls: Vec<PanelControl>,
    pub summary: Option<ResultSummary>,
}

fn button(label: &'static str, action: PanelAction, primary: bool) -> PanelControl {
    PanelControl::Button {
        label,
        action,
        primary,
    }
}

/// Rows for categories with a nonzero share, in legend order.
pub fn summarize(metadata: &AnalysisMetadata, visibility: &LayerVisibility) -> ResultSummary {
    let rows = Category::ALL
        .into_iter()
        .filter_map(|category| {
            let share = metadata.share(category);
            (share.pct > 0.0).then(|| SummaryRow {
                category,
                label: category.display_name(),
                marker: category.marker(),
                color: category.color(),
                percentage: format::percent(share.pct),
                visible: visibility.is_visible(category),
            })
        })
        .collect();

    ResultSummary {
        total_area: format::square_feet(metadata.total_area_sqft),
        total_acres: format::acres(metadata.total_area_sqft, 2),
        rows,
        footer: format!(
            "Processed {} tiles in {}",
            metadata.tiles_processed,
            format::seconds(metadata.processing_time_ms)
        ),
    }
}

/// Derives the whole panel from the current state; the panel keeps nothing.
pub fn panel_view(state: &AnalysisState, visibility: &LayerVisibility) -> PanelView {
    match state {
        AnalysisState::Idle => PanelView {
            caption: "Draw a zone to analyze land cover",
            controls: vec![button("Draw Zone", PanelAction::StartDrawing, true)],
            summary: None,
        },
        AnalysisState::Drawing => PanelView {
            caption: "Click on the map to draw vertices. Double click to finish.",
            controls: Vec::new(),
            summary: None,
        },
        AnalysisState::Ready(_) => PanelView {
            caption: "Zone drawn. Ready to analyze.",
            controls: vec![
                button("Analyze Zone", PanelAction::Analyze, true),
                button("Clear", PanelAction::Clear, false),
            ],
            summary: None,
        },
        AnalysisState::Analyzing(_) => PanelView {
            caption: "Analyzing satellite imagery...",
            controls: vec![PanelControl::Indicator("Processing...")],
            summary: None,
        },
        AnalysisState::Complete { result, .. } => PanelView {
            caption: "Analysis complete",
            controls: vec![button("Clear & Start Over", PanelAction::Clear, false)],
            summary: Some(summarize(&result.metadata, visibility)),
        },
        AnalysisState::Error(message) => PanelView {
            caption: "Analysis failed",
            controls: vec![
                PanelControl::ErrorBanner(message.clone()),
                button("Try Again", PanelAction::Clear, true),
            ],
            summary: None,
        },
    }
}

/// Text of the inspect popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    pub area: String,
    pub acres: String,
}

pub fn popup_content(hit: &FeatureHit) -> PopupContent {
    PopupContent {
        title: hit.category.title(),
        area: format::square_feet(hit.area_sqft),
        acres: format::acres(hit.area_sqft, 3),
    }
}
