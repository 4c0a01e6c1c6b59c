use crate::Message;
use doodlecore::contract::{Position, Rgb};
use doodlecore::present::popup_content;
use doodlecore::render::layers::{FILL_OPACITY, OUTLINE_OPACITY, OUTLINE_WIDTH};
use doodlecore::render::{category_overlays, FeatureHit};
use doodlecore::session::LayerVisibility;
use doodlecore::spatial::Viewport;
use doodlecore::AnalysisState;
use geo::{LineString, Polygon};
use iced::{
    mouse,
    widget::canvas::{self, fill, Fill, Frame, Geometry, Path, Stroke, Text},
    Color, Event, Point, Rectangle, Renderer, Size, Theme,
};
use std::time::{Duration, Instant};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const CLICK_SLOP: f32 = 4.0;
const FIRST_VERTEX_SNAP: f64 = 8.0;
const DRAW_ACCENT: Color = Color {
    r: 0.23,
    g: 0.70,
    b: 0.82,
    a: 1.0,
};

/// What the map surface reports to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Single click: a vertex while drawing, otherwise an inspect query.
    Clicked(Position),
    /// Double click or click on the first vertex while drawing.
    Finished,
    Panned { dx: f64, dy: f64 },
    /// Drag released; the view is stable again.
    Settled,
    Zoomed(i8),
    Resized { width: u32, height: u32 },
}

pub fn to_color(rgb: Rgb, alpha: f32) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, alpha)
}

/// Classifies a completed click at canvas point `at`.
pub fn click_event(
    view: &Viewport,
    vertices: &[Position],
    drawing: bool,
    double: bool,
    at: Point,
) -> MapEvent {
    if drawing {
        if double {
            return MapEvent::Finished;
        }
        if vertices.len() >= 3 {
            let (fx, fy) = view.to_pixel(vertices[0]);
            let distance = (fx - at.x as f64).hypot(fy - at.y as f64);
            if distance <= FIRST_VERTEX_SNAP {
                return MapEvent::Finished;
            }
        }
    }
    MapEvent::Clicked(view.to_position(at.x as f64, at.y as f64))
}

pub fn is_double_click(previous: Option<(Instant, Point)>, now: Instant, at: Point) -> bool {
    previous.is_some_and(|(when, spot)| {
        now.saturating_duration_since(when) <= DOUBLE_CLICK_WINDOW
            && spot.distance(at) <= CLICK_SLOP
    })
}

/// Grid step in degrees giving roughly four lines across `span`.
pub fn grid_step(span: f64) -> f64 {
    if span <= 0.0 || !span.is_finite() {
        return 1.0;
    }
    10f64.powf((span / 4.0).log10().floor())
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Point,
    last: Point,
    dragging: bool,
}

/// Per-widget gesture state.
#[derive(Debug, Default)]
pub struct Interaction {
    press: Option<Press>,
    last_click: Option<(Instant, Point)>,
}

/// The map surface: basemap backdrop, result overlays, zone outline, the
/// in-progress drawing and the inspect popup.
pub struct MapCanvas<'a> {
    pub viewport: Viewport,
    pub state: &'a AnalysisState,
    pub visibility: &'a LayerVisibility,
    pub vertices: &'a [Position],
    pub drawing: bool,
    pub popup: Option<&'a FeatureHit>,
    pub has_basemap: bool,
}

impl MapCanvas<'_> {
    fn view_for(&self, bounds: Rectangle) -> Viewport {
        Viewport::new(
            self.viewport.center,
            self.viewport.zoom,
            bounds.width.max(1.0) as u32,
            bounds.height.max(1.0) as u32,
        )
    }

    fn point(view: &Viewport, position: Position) -> Point {
        let (x, y) = view.to_pixel(position);
        Point::new(x as f32, y as f32)
    }

    fn polygon_path(view: &Viewport, polygon: &Polygon<f64>) -> Path {
        let ring = |builder: &mut canvas::path::Builder, line: &LineString<f64>| {
            for (idx, coord) in line.coords().enumerate() {
                let point = Self::point(view, Position::from(*coord));
                if idx == 0 {
                    builder.move_to(point);
                } else {
                    builder.line_to(point);
                }
            }
            builder.close();
        };
        Path::new(|builder| {
            ring(builder, polygon.exterior());
            for interior in polygon.interiors() {
                ring(builder, interior);
            }
        })
    }

    fn draw_backdrop(&self, frame: &mut Frame, view: &Viewport, size: Size) {
        frame.fill_rectangle(Point::ORIGIN, size, Color::from_rgb(0.08, 0.09, 0.11));

        let (west, south, east, north) = view.bounds();
        let step = grid_step((east - west).max(north - south));
        let grid = Stroke::default()
            .with_width(1.0)
            .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.08));

        let mut lng = (west / step).floor() * step;
        while lng <= east {
            let top = Self::point(view, Position::new(lng, north));
            let bottom = Self::point(view, Position::new(lng, south));
            frame.stroke(&Path::line(top, bottom), grid.clone());
            lng += step;
        }
        let mut lat = (south / step).floor() * step;
        while lat <= north {
            let left = Self::point(view, Position::new(west, lat));
            let right = Self::point(view, Position::new(east, lat));
            frame.stroke(&Path::line(left, right), grid.clone());
            lat += step;
        }
    }

    fn draw_overlays(&self, frame: &mut Frame, view: &Viewport) {
        for overlay in category_overlays(self.state, self.visibility) {
            if !overlay.visible {
                continue;
            }
            let fill_color = to_color(overlay.fill.color, FILL_OPACITY);
            let outline = Stroke::default()
                .with_width(OUTLINE_WIDTH)
                .with_color(to_color(overlay.outline.color, OUTLINE_OPACITY));
            for feature in &overlay.features {
                for polygon in feature.geometry.to_multi_polygon().iter() {
                    let path = Self::polygon_path(view, polygon);
                    frame.fill(
                        &path,
                        Fill {
                            rule: fill::Rule::EvenOdd,
                            ..Fill::from(fill_color)
                        },
                    );
                    frame.stroke(&path, outline.clone());
                }
            }
        }
    }

    fn draw_zone(&self, frame: &mut Frame, view: &Viewport) {
        let Some(zone) = self.state.polygon() else {
            return;
        };
        let path = Self::polygon_path(view, &zone.to_polygon());
        if self.state.result().is_none() {
            frame.fill(&path, Color { a: 0.1, ..DRAW_ACCENT });
        }
        frame.stroke(
            &path,
            Stroke::default().with_width(2.0).with_color(DRAW_ACCENT),
        );
    }

    fn draw_sketch(&self, frame: &mut Frame, view: &Viewport, cursor: Option<Point>) {
        if !self.drawing || self.vertices.is_empty() {
            return;
        }
        let points: Vec<Point> = self
            .vertices
            .iter()
            .map(|vertex| Self::point(view, *vertex))
            .collect();
        let sketch = Path::new(|builder| {
            builder.move_to(points[0]);
            for point in &points[1..] {
                builder.line_to(*point);
            }
            if let Some(cursor) = cursor {
                builder.line_to(cursor);
            }
        });
        frame.stroke(
            &sketch,
            Stroke::default().with_width(2.0).with_color(DRAW_ACCENT),
        );
        for point in &points {
            frame.fill(&Path::circle(*point, 4.0), Color::WHITE);
            frame.stroke(
                &Path::circle(*point, 4.0),
                Stroke::default().with_width(1.5).with_color(DRAW_ACCENT),
            );
        }
    }

    fn draw_popup(&self, frame: &mut Frame, view: &Viewport) {
        let Some(hit) = self.popup else {
            return;
        };
        let content = popup_content(hit);
        let anchor = Self::point(view, hit.anchor);
        let size = Size::new(180.0, 66.0);
        let origin = Point::new(anchor.x - size.width / 2.0, anchor.y - size.height - 10.0);

        frame.fill_rectangle(origin, size, Color::WHITE);
        frame.fill(
            &Path::new(|builder| {
                builder.move_to(Point::new(anchor.x - 6.0, origin.y + size.height));
                builder.line_to(Point::new(anchor.x + 6.0, origin.y + size.height));
                builder.line_to(anchor);
                builder.close();
            }),
            Color::WHITE,
        );

        let lines: [(String, f32); 3] = [
            (content.title, 15.0),
            (content.area, 13.0),
            (content.acres, 13.0),
        ];
        for (idx, (line, size)) in lines.into_iter().enumerate() {
            frame.fill_text(Text {
                content: line,
                position: Point::new(origin.x + 10.0, origin.y + 8.0 + idx as f32 * 18.0),
                color: Color::from_rgb(0.1, 0.1, 0.1),
                size: size.into(),
                ..Text::default()
            });
        }
    }
}

impl canvas::Program<Message> for MapCanvas<'_> {
    type State = Interaction;

    fn update(
        &self,
        interaction: &mut Interaction,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let view = self.view_for(bounds);
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let at = cursor.position_in(bounds)?;
                interaction.press = Some(Press {
                    origin: at,
                    last: at,
                    dragging: false,
                });
                Some(canvas::Action::capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let at = cursor.position_in(bounds);
                if let (Some(press), Some(at)) = (interaction.press.as_mut(), at) {
                    if !press.dragging && press.origin.distance(at) > CLICK_SLOP {
                        press.dragging = true;
                    }
                    if press.dragging {
                        let (dx, dy) = (at.x - press.last.x, at.y - press.last.y);
                        press.last = at;
                        return Some(
                            canvas::Action::publish(Message::Map(MapEvent::Panned {
                                dx: dx as f64,
                                dy: dy as f64,
                            }))
                            .and_capture(),
                        );
                    }
                }
                if view.width != self.viewport.width || view.height != self.viewport.height {
                    return Some(canvas::Action::publish(Message::Map(MapEvent::Resized {
                        width: view.width,
                        height: view.height,
                    })));
                }
                self.drawing.then(canvas::Action::request_redraw)
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let press = interaction.press.take()?;
                if press.dragging {
                    return Some(
                        canvas::Action::publish(Message::Map(MapEvent::Settled)).and_capture(),
                    );
                }
                let at = cursor.position_in(bounds).unwrap_or(press.origin);
                let now = Instant::now();
                let double = is_double_click(interaction.last_click, now, at);
                interaction.last_click = if double { None } else { Some((now, at)) };
                let event = click_event(&view, self.vertices, self.drawing, double, at);
                Some(canvas::Action::publish(Message::Map(event)).and_capture())
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds)?;
                let y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } | mouse::ScrollDelta::Pixels { y, .. } => {
                        *y
                    }
                };
                if y == 0.0 {
                    return None;
                }
                let step = if y > 0.0 { 1 } else { -1 };
                Some(canvas::Action::publish(Message::Map(MapEvent::Zoomed(step))).and_capture())
            }
            Event::Window(_) => {
                (view.width != self.viewport.width || view.height != self.viewport.height).then(
                    || {
                        canvas::Action::publish(Message::Map(MapEvent::Resized {
                            width: view.width,
                            height: view.height,
                        }))
                    },
                )
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _interaction: &Interaction,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let view = self.view_for(bounds);
        let mut frame = Frame::new(renderer, bounds.size());

        if !self.has_basemap {
            self.draw_backdrop(&mut frame, &view, bounds.size());
        }
        self.draw_overlays(&mut frame, &view);
        self.draw_zone(&mut frame, &view);
        self.draw_sketch(&mut frame, &view, cursor.position_in(bounds));
        self.draw_popup(&mut frame, &view);

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        interaction: &Interaction,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if interaction.press.is_some_and(|press| press.dragging) {
            mouse::Interaction::Grabbing
        } else if self.drawing && cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(Position::new(-117.16, 32.72), 15, 800, 600)
    }

    fn triangle(view: &Viewport) -> Vec<Position> {
        vec![
            view.to_position(100.0, 100.0),
            view.to_position(200.0, 100.0),
            view.to_position(200.0, 200.0),
        ]
    }

    #[test]
    fn click_near_first_vertex_finishes() {
        let view = view();
        let vertices = triangle(&view);
        assert_eq!(
            click_event(&view, &vertices, true, false, Point::new(103.0, 98.0)),
            MapEvent::Finished
        );
        assert!(matches!(
            click_event(&view, &vertices[..2], true, false, Point::new(103.0, 98.0)),
            MapEvent::Clicked(_)
        ));
    }

    #[test]
    fn double_click_finishes_only_while_drawing() {
        let view = view();
        let at = Point::new(400.0, 300.0);
        assert_eq!(click_event(&view, &[], true, true, at), MapEvent::Finished);
        match click_event(&view, &[], false, true, at) {
            MapEvent::Clicked(position) => {
                assert!((position.lng() - -117.16).abs() < 1e-9);
                assert!((position.lat() - 32.72).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn double_click_needs_time_and_proximity() {
        let start = Instant::now();
        let at = Point::new(10.0, 10.0);
        assert!(!is_double_click(None, start, at));
        assert!(is_double_click(
            Some((start, at)),
            start + Duration::from_millis(200),
            Point::new(12.0, 11.0)
        ));
        assert!(!is_double_click(
            Some((start, at)),
            start + Duration::from_millis(900),
            at
        ));
        assert!(!is_double_click(
            Some((start, at)),
            start + Duration::from_millis(100),
            Point::new(40.0, 10.0)
        ));
    }

    #[test]
    fn grid_step_tracks_span() {
        assert!((grid_step(0.06) - 0.01).abs() < 1e-12);
        assert_eq!(grid_step(60.0), 10.0);
        assert_eq!(grid_step(0.0), 1.0);
    }

    #[test]
    fn category_colors_keep_alpha() {
        let color = to_color(Rgb::new(0x4C, 0xAF, 0x50), FILL_OPACITY);
        assert!((color.a - 0.4).abs() < 1e-6);
        assert!((color.g - 0xAF as f32 / 255.0).abs() < 1e-6);
    }
}
