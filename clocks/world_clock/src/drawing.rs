//! Drawing module - world map rendering
//!
//! Handles all nannou-based rendering: land outlines, graticule, city
//! markers, labels and the hover tooltip.

use nannou::prelude::*;

use crate::land::Ring;
use crate::theme::ColorScheme;
use crate::world_map::{
    LabelAnchor, MarkerView, WorldMap, DOT_RADIUS, HALO_RADIUS, MAP_HEIGHT, MAP_WIDTH,
};

/// Color palettes for both schemes
pub mod colors {
    use std::marker::PhantomData;

    use nannou::prelude::*;

    use crate::store::Accent;
    use crate::theme::ColorScheme;

    const fn rgb(red: u8, green: u8, blue: u8) -> Srgb<u8> {
        Srgb {
            red,
            green,
            blue,
            standard: PhantomData,
        }
    }

    /// Colors used by the map drawing
    #[derive(Debug, Clone, Copy)]
    pub struct Palette {
        pub background: Srgb<u8>,
        pub ocean: Srgb<u8>,
        pub land: Srgb<u8>,
        pub grid: Srgb<u8>,
        pub grid_major: Srgb<u8>,
        pub label: Srgb<u8>,
        pub tooltip_bg: Srgb<u8>,
        pub tooltip_text: Srgb<u8>,
        pub dot: Srgb<u8>,
    }

    pub const DARK: Palette = Palette {
        background: rgb(13, 15, 26),
        ocean: rgb(18, 22, 38),
        land: rgb(86, 98, 132),
        grid: rgb(36, 42, 64),
        grid_major: rgb(64, 74, 108),
        label: rgb(220, 225, 240),
        tooltip_bg: rgb(30, 35, 55),
        tooltip_text: rgb(245, 240, 235),
        dot: rgb(170, 178, 200),
    };

    pub const LIGHT: Palette = Palette {
        background: rgb(243, 247, 255),
        ocean: rgb(230, 238, 252),
        land: rgb(120, 136, 170),
        grid: rgb(206, 216, 236),
        grid_major: rgb(160, 176, 210),
        label: rgb(30, 36, 56),
        tooltip_bg: rgb(255, 255, 255),
        tooltip_text: rgb(20, 24, 40),
        dot: rgb(90, 100, 130),
    };

    pub const AQUA: Srgb<u8> = rgb(46, 230, 214);
    pub const PINK: Srgb<u8> = rgb(255, 92, 170);
    pub const LIME: Srgb<u8> = rgb(170, 230, 60);

    pub fn palette(scheme: ColorScheme) -> &'static Palette {
        match scheme {
            ColorScheme::Dark => &DARK,
            ColorScheme::Light => &LIGHT,
        }
    }

    pub fn accent(accent: Accent) -> Srgb<u8> {
        match accent {
            Accent::Aqua => AQUA,
            Accent::Pink => PINK,
            Accent::Lime => LIME,
        }
    }
}

/// Where the logical map sits on screen
#[derive(Debug, Clone, Copy)]
pub struct MapLayout {
    pub left: f32,
    pub top: f32,
    /// Screen units per logical map pixel
    pub scale: f32,
}

impl MapLayout {
    /// Fit the 2:1 map into the window area not covered by the panels
    pub fn calculate(window_rect: Rect, left_panel_width: f32, top_bar_height: f32) -> Self {
        let margin = 20.0;
        let area_left = window_rect.left() + left_panel_width + margin;
        let area_right = window_rect.right() - margin;
        let area_top = window_rect.top() - top_bar_height - margin;
        let area_bottom = window_rect.bottom() + margin;

        let width = (area_right - area_left).max(1.0);
        let height = (area_top - area_bottom).max(1.0);
        let scale = (width / MAP_WIDTH).min(height / MAP_HEIGHT);

        let left = area_left + (width - MAP_WIDTH * scale) / 2.0;
        let top = area_top - (height - MAP_HEIGHT * scale) / 2.0;
        Self { left, top, scale }
    }

    /// Logical map point to screen point
    pub fn to_screen(&self, x: f32, y: f32) -> Point2 {
        pt2(self.left + x * self.scale, self.top - y * self.scale)
    }

    /// Screen point to logical map point, `None` outside the map
    pub fn to_map(&self, point: Point2) -> Option<(f32, f32)> {
        let x = (point.x - self.left) / self.scale;
        let y = (self.top - point.y) / self.scale;
        let inside = (0.0..=MAP_WIDTH).contains(&x) && (0.0..=MAP_HEIGHT).contains(&y);
        inside.then_some((x, y))
    }

    fn rect(&self) -> Rect {
        let w = MAP_WIDTH * self.scale;
        let h = MAP_HEIGHT * self.scale;
        Rect::from_x_y_w_h(self.left + w / 2.0, self.top - h / 2.0, w, h)
    }
}

/// Draw the whole map region
pub fn draw_map(
    draw: &Draw,
    layout: &MapLayout,
    map: &WorldMap,
    scheme: ColorScheme,
    hovered: Option<usize>,
    pointer: Option<Point2>,
) {
    let palette = colors::palette(scheme);
    let frame = layout.rect();

    draw.rect()
        .xy(frame.xy())
        .wh(frame.wh())
        .color(palette.ocean);

    draw_land(draw, layout, map.land().rings(), palette.land);

    for line in map.grid() {
        let color = if line.major {
            palette.grid_major
        } else {
            palette.grid
        };
        draw.line()
            .start(layout.to_screen(line.start.0, line.start.1))
            .end(layout.to_screen(line.end.0, line.end.1))
            .weight(if line.major { 1.5 } else { 1.0 })
            .color(color);
    }

    for (i, marker) in map.markers().iter().enumerate() {
        draw_marker(draw, layout, marker, palette, hovered == Some(i));
    }

    if let (Some(index), Some(pointer)) = (hovered, pointer) {
        if let Some(marker) = map.markers().get(index) {
            draw_tooltip(draw, pointer, &marker.tooltip, palette);
        }
    }
}

fn draw_land(draw: &Draw, layout: &MapLayout, rings: &[Ring], color: Srgb<u8>) {
    for ring in rings {
        let points = ring.iter().map(|&(x, y)| layout.to_screen(x, y));
        draw.polyline().weight(1.0).points(points).color(color);
    }
}

fn draw_marker(
    draw: &Draw,
    layout: &MapLayout,
    marker: &MarkerView,
    palette: &colors::Palette,
    hovered: bool,
) {
    let center = layout.to_screen(marker.x, marker.y);
    let accent = colors::accent(marker.accent);
    let scale = layout.scale.max(0.5);

    // Halo only shows for selected or hovered cities
    if marker.selected || hovered {
        let alpha = if marker.selected { 0.45 } else { 0.2 };
        draw.ellipse()
            .xy(center)
            .radius(HALO_RADIUS * scale)
            .color(srgba(
                accent.red as f32 / 255.0,
                accent.green as f32 / 255.0,
                accent.blue as f32 / 255.0,
                alpha,
            ));
    }

    let dot_color = if marker.selected { accent } else { palette.dot };
    draw.ellipse()
        .xy(center)
        .radius(DOT_RADIUS * scale)
        .color(dot_color);

    let label_width = 140.0;
    let anchor = layout.to_screen(marker.label_x, marker.label_y);
    let text = draw
        .text(marker.name)
        .y(anchor.y)
        .w(label_width)
        .font_size((12.0 * scale).round().max(9.0) as u32)
        .color(if marker.selected { accent } else { palette.label });
    match marker.anchor {
        LabelAnchor::Start => text.x(anchor.x + label_width / 2.0).left_justify(),
        LabelAnchor::End => text.x(anchor.x - label_width / 2.0).right_justify(),
    };
}

fn draw_tooltip(draw: &Draw, pointer: Point2, text: &str, palette: &colors::Palette) {
    let width = 8.0 * text.chars().count() as f32 + 16.0;
    let height = 24.0;
    let center = pt2(pointer.x + width / 2.0 + 12.0, pointer.y - height / 2.0 - 12.0);

    draw.rect()
        .xy(center)
        .w_h(width, height)
        .color(palette.tooltip_bg)
        .stroke(palette.grid_major)
        .stroke_weight(1.0);
    draw.text(text)
        .xy(center)
        .w(width)
        .font_size(13)
        .color(palette.tooltip_text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_roundtrip() {
        let window = Rect::from_w_h(1400.0, 800.0);
        let layout = MapLayout::calculate(window, 340.0, 48.0);

        let screen = layout.to_screen(600.0, 300.0);
        let (x, y) = layout.to_map(screen).unwrap();
        assert!((x - 600.0).abs() < 1e-3);
        assert!((y - 300.0).abs() < 1e-3);

        // Panels are left of the map
        assert!(layout.to_screen(0.0, 0.0).x >= window.left() + 340.0);
        assert!(layout.to_map(pt2(window.left() + 10.0, 0.0)).is_none());
    }

    #[test]
    fn test_layout_keeps_aspect() {
        let layout = MapLayout::calculate(Rect::from_w_h(2000.0, 700.0), 300.0, 40.0);
        let top_left = layout.to_screen(0.0, 0.0);
        let bottom_right = layout.to_screen(MAP_WIDTH, MAP_HEIGHT);
        let w = bottom_right.x - top_left.x;
        let h = top_left.y - bottom_right.y;
        assert!((w / h - 2.0).abs() < 1e-3);
    }
}
