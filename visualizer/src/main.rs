use client::{fetch_basemap, HttpBackend};
use doodlecore::backend::run_analysis;
use doodlecore::config::ClientConfig;
use doodlecore::draw::DrawController;
use doodlecore::present::{panel_view, PanelAction};
use doodlecore::render::{category_overlays, pick_feature, FeatureHit};
use doodlecore::session::{AnalysisTicket, Phase};
use doodlecore::spatial::Viewport;
use doodlecore::{AnalysisError, AnalysisResponse, AnalysisSession, Category};
use iced::{
    widget::{button, canvas::Canvas, column, container, image, row, text, Stack},
    ContentFit, Element, Length, Size, Task, Theme,
};
use log::{debug, warn};
use map::{MapCanvas, MapEvent};

mod client;
mod map;
mod panel;

const INITIAL_MAP_SIZE: (u32, u32) = (1024, 768);

fn main() -> iced::Result {
    env_logger::init();
    iced::application(UrbanDoodle::boot, UrbanDoodle::update, UrbanDoodle::view)
        .title(application_title)
        .theme(application_theme)
        .window_size(Size::new(1320.0, 820.0))
        .run()
}

fn application_title(_: &UrbanDoodle) -> String {
    "Urban Doodle".into()
}

fn application_theme(_: &UrbanDoodle) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct UrbanDoodle {
    config: ClientConfig,
    backend: HttpBackend,
    session: AnalysisSession,
    draw: DrawController,
    viewport: Viewport,
    basemap: Option<(Viewport, image::Handle)>,
    popup: Option<FeatureHit>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Panel(PanelAction),
    ToggleLayer(Category),
    Map(MapEvent),
    DismissNotice,
    AnalysisFinished(AnalysisTicket, Result<AnalysisResponse, AnalysisError>),
    BasemapFetched(Viewport, Result<Vec<u8>, String>),
}

impl UrbanDoodle {
    fn boot() -> (Self, Task<Message>) {
        let config = ClientConfig::from_env();
        let viewport = Viewport::new(
            config.initial_center,
            config.initial_zoom,
            INITIAL_MAP_SIZE.0,
            INITIAL_MAP_SIZE.1,
        );
        let app = UrbanDoodle {
            backend: HttpBackend::new(&config),
            config,
            session: AnalysisSession::new(),
            draw: DrawController::attach(),
            viewport,
            basemap: None,
            popup: None,
        };
        let task = app.refresh_basemap();
        (app, task)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        let task = match message {
            Message::Panel(action) => state.handle_panel(action),
            Message::ToggleLayer(category) => {
                state.session.toggle_layer(category);
                Task::none()
            }
            Message::Map(event) => state.handle_map(event),
            Message::DismissNotice => {
                state.draw.dismiss_notice();
                Task::none()
            }
            Message::AnalysisFinished(ticket, outcome) => {
                state.session.resolve(ticket, outcome);
                Task::none()
            }
            Message::BasemapFetched(viewport, result) => {
                if viewport != state.viewport {
                    debug!("dropping basemap for a stale viewport");
                } else {
                    match result {
                        Ok(bytes) => {
                            state.basemap = Some((viewport, image::Handle::from_bytes(bytes)))
                        }
                        Err(err) => {
                            warn!("basemap fetch failed: {}", err);
                            state.basemap = None;
                        }
                    }
                }
                Task::none()
            }
        };
        state.draw.sync(state.session.state());
        task
    }

    fn handle_panel(&mut self, action: PanelAction) -> Task<Message> {
        match action {
            PanelAction::StartDrawing => {
                if self.session.start_drawing() {
                    self.popup = None;
                }
                Task::none()
            }
            PanelAction::Analyze => {
                let Some(request) = self.session.begin_analysis() else {
                    return Task::none();
                };
                let backend = self.backend.clone();
                let ticket = request.ticket;
                Task::perform(
                    async move { run_analysis(&backend, &request.polygon).await },
                    move |outcome| Message::AnalysisFinished(ticket, outcome),
                )
            }
            PanelAction::Clear => {
                self.session.clear();
                self.popup = None;
                Task::none()
            }
        }
    }

    fn handle_map(&mut self, event: MapEvent) -> Task<Message> {
        match event {
            MapEvent::Clicked(position) => {
                if self.session.phase() == Phase::Drawing {
                    self.draw.add_vertex(position);
                } else {
                    let overlays =
                        category_overlays(self.session.state(), self.session.visibility());
                    self.popup = pick_feature(&overlays, position);
                    if let Some(hit) = &self.popup {
                        debug!("inspected {} at {:?}", hit.layer_id, hit.anchor);
                    }
                }
                Task::none()
            }
            MapEvent::Finished => {
                if self.session.phase() == Phase::Drawing {
                    if let Some(polygon) = self.draw.finish() {
                        self.session.set_polygon(polygon);
                    }
                }
                Task::none()
            }
            MapEvent::Panned { dx, dy } => {
                self.viewport = self.viewport.panned(dx, dy);
                Task::none()
            }
            MapEvent::Settled => self.refresh_basemap(),
            MapEvent::Zoomed(delta) => {
                self.viewport = self.viewport.zoomed(delta);
                self.refresh_basemap()
            }
            MapEvent::Resized { width, height } => {
                self.viewport =
                    Viewport::new(self.viewport.center, self.viewport.zoom, width, height);
                self.refresh_basemap()
            }
        }
    }

    /// Requests imagery for the current viewport; without a token the canvas
    /// keeps its plain backdrop.
    fn refresh_basemap(&self) -> Task<Message> {
        let Some(url) = self.config.static_map_url(&self.viewport) else {
            return Task::none();
        };
        let viewport = self.viewport;
        let client = self.backend.http().clone();
        Task::perform(fetch_basemap(client, url), move |result| {
            Message::BasemapFetched(viewport, result)
        })
    }

    fn current_basemap(&self) -> Option<&image::Handle> {
        self.basemap
            .as_ref()
            .filter(|(viewport, _)| *viewport == self.viewport)
            .map(|(_, handle)| handle)
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let sidebar = panel::view(panel_view(
            state.session.state(),
            state.session.visibility(),
        ));

        let basemap = state.current_basemap();
        let canvas = Canvas::new(MapCanvas {
            viewport: state.viewport,
            state: state.session.state(),
            visibility: state.session.visibility(),
            vertices: state.draw.tool().vertices(),
            drawing: state.session.phase() == Phase::Drawing,
            popup: state.popup.as_ref(),
            has_basemap: basemap.is_some(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let mut map_area = Stack::new().width(Length::Fill).height(Length::Fill);
        if let Some(handle) = basemap {
            map_area = map_area.push(
                image(handle.clone())
                    .content_fit(ContentFit::Fill)
                    .width(Length::Fill)
                    .height(Length::Fill),
            );
        }
        map_area = map_area.push(canvas);
        if let Some(notice) = state.draw.notice() {
            map_area = map_area.push(
                container(
                    container(
                        column![
                            text(notice.to_string()).size(15),
                            button(text("OK")).on_press(Message::DismissNotice).padding(8),
                        ]
                        .spacing(12),
                    )
                    .padding(16)
                    .max_width(360.0)
                    .style(container::rounded_box),
                )
                .center(Length::Fill),
            );
        }

        row![sidebar, map_area].into()
    }
}
