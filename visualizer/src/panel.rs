use crate::map::to_color;
use crate::Message;
use doodlecore::present::{PanelControl, PanelView, ResultSummary};
use iced::{
    widget::{button, column, container, row, text, Column},
    Alignment, Color, Element, Length,
};

const ERROR_TEXT: Color = Color {
    r: 0.94,
    g: 0.42,
    b: 0.42,
    a: 1.0,
};
const MUTED_TEXT: Color = Color {
    r: 0.55,
    g: 0.57,
    b: 0.6,
    a: 1.0,
};

fn control<'a>(control: PanelControl) -> Element<'a, Message> {
    match control {
        PanelControl::Button {
            label,
            action,
            primary,
        } => button(text(label).size(15))
            .on_press(Message::Panel(action))
            .style(if primary {
                button::primary
            } else {
                button::secondary
            })
            .padding(10)
            .width(Length::Fill)
            .into(),
        PanelControl::Indicator(label) => text(label).size(15).color(MUTED_TEXT).into(),
        PanelControl::ErrorBanner(message) => text(message).size(14).color(ERROR_TEXT).into(),
    }
}

/// Legend rows double as layer toggles.
fn summary<'a>(summary: ResultSummary) -> Element<'a, Message> {
    let rows = summary
        .rows
        .into_iter()
        .fold(Column::new().spacing(4), |col, entry| {
            let swatch = if entry.visible {
                to_color(entry.color, 1.0)
            } else {
                MUTED_TEXT
            };
            let label_color = if entry.visible { Color::WHITE } else { MUTED_TEXT };
            col.push(
                button(
                    row![
                        text(entry.marker.to_string()).size(16).color(swatch),
                        text(entry.label).size(14).color(label_color).width(Length::Fill),
                        text(entry.percentage).size(14).color(label_color),
                    ]
                    .spacing(8)
                    .align_y(Alignment::Center),
                )
                .on_press(Message::ToggleLayer(entry.category))
                .style(button::text)
                .width(Length::Fill),
            )
        });

    column![
        text("Total area").size(13).color(MUTED_TEXT),
        text(summary.total_area).size(22),
        text(summary.total_acres).size(14),
        text("Land cover").size(16),
        rows,
        text(summary.footer).size(12).color(MUTED_TEXT),
    ]
    .spacing(8)
    .into()
}

pub fn view<'a>(panel: PanelView) -> Element<'a, Message> {
    let controls = panel
        .controls
        .into_iter()
        .fold(Column::new().spacing(8), |col, entry| col.push(control(entry)));

    let mut body = column![
        text("Urban Doodle").size(26),
        text(panel.caption).size(14),
        controls,
    ]
    .spacing(14);
    if let Some(result) = panel.summary {
        body = body.push(summary(result));
    }

    container(body)
        .padding(20)
        .width(Length::Fixed(300.0))
        .height(Length::Fill)
        .into()
}
