use rand::Rng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Color;
use ratatui::widgets::Widget;

const STAR_COUNT: usize = 160;
const SPEED: f32 = 0.012;
const NEAR_PLANE: f32 = 0.05;

struct Star {
    x: f32,
    y: f32,
    z: f32,
}

/// Decorative background: stars rushing toward the viewer, re-seeded at the
/// far plane. Panels render on top of it.
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rng.random_range(-1.0..1.0),
                y: rng.random_range(-1.0..1.0),
                z: rng.random_range(NEAR_PLANE..1.0),
            })
            .collect();

        Self { stars }
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) {
        let mut rng = rand::rng();
        for star in &mut self.stars {
            star.z -= SPEED;
            if star.z < NEAR_PLANE {
                star.x = rng.random_range(-1.0..1.0);
                star.y = rng.random_range(-1.0..1.0);
                star.z = 1.0;
            }
        }
    }
}

impl Default for Starfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &Starfield {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let cx = area.x as f32 + area.width as f32 / 2.0;
        let cy = area.y as f32 + area.height as f32 / 2.0;

        for star in &self.stars {
            let sx = cx + (star.x / star.z) * area.width as f32 / 2.0;
            let sy = cy + (star.y / star.z) * area.height as f32 / 2.0;

            if sx < area.x as f32
                || sy < area.y as f32
                || sx >= (area.x + area.width) as f32
                || sy >= (area.y + area.height) as f32
            {
                continue;
            }

            // Closer stars draw bigger and brighter.
            let (symbol, color) = if star.z < 0.25 {
                ("✦", Color::White)
            } else if star.z < 0.6 {
                ("•", Color::Gray)
            } else {
                ("·", Color::DarkGray)
            };

            if let Some(cell) = buf.cell_mut(Position::new(sx as u16, sy as u16)) {
                cell.set_symbol(symbol);
                cell.set_fg(color);
            }
        }
    }
}
