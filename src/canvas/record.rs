//! Canvas that records resolved draw calls instead of painting pixels.

use glam::Vec2;

use super::{Canvas, DrawState, Rgba, Style};

/// One resolved draw call, in canvas coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Background(Rgba),
    Ellipse {
        center: Vec2,
        diameter: f32,
        style: Style,
    },
    Polygon {
        points: Vec<Vec2>,
        style: Style,
    },
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        stop: f32,
        style: Style,
    },
    Text {
        position: Vec2,
        text: String,
        size: f32,
        style: Style,
    },
}

/// Recording canvas of fixed size
pub struct CommandRecorder {
    width: f32,
    height: f32,
    state: DrawState,
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            state: DrawState::default(),
            commands: Vec::new(),
        }
    }

    /// Change the reported size (resize event)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn ellipses(&self) -> impl Iterator<Item = (Vec2, f32, &Style)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Ellipse {
                center,
                diameter,
                style,
            } => Some((*center, *diameter, style)),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[Vec2], &Style)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polygon { points, style } => Some((points.as_slice(), style)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Canvas for CommandRecorder {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn state(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn background(&mut self, color: Rgba) {
        self.state.reset();
        self.commands.push(DrawCommand::Background(color));
    }

    fn ellipse(&mut self, x: f32, y: f32, diameter: f32) {
        self.commands.push(DrawCommand::Ellipse {
            center: self.state.transform.apply(Vec2::new(x, y)),
            diameter,
            style: self.state.style,
        });
    }

    fn polygon(&mut self, points: &[Vec2]) {
        let transform = self.state.transform;
        self.commands.push(DrawCommand::Polygon {
            points: points.iter().map(|&p| transform.apply(p)).collect(),
            style: self.state.style,
        });
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, stop: f32) {
        let angle = self.state.transform.angle;
        self.commands.push(DrawCommand::Arc {
            center: self.state.transform.apply(Vec2::new(x, y)),
            radius,
            start: start + angle,
            stop: stop + angle,
            style: self.state.style,
        });
    }

    fn text(&mut self, x: f32, y: f32, text: &str, size: f32) {
        self.commands.push(DrawCommand::Text {
            position: self.state.transform.apply(Vec2::new(x, y)),
            text: text.to_string(),
            size,
            style: self.state.style,
        });
    }
}
