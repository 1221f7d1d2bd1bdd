//! World Clock
//!
//! A list of live clocks for user-selected timezones beside a world map whose
//! city markers add or remove clocks when clicked, with a system/light/dark
//! theme toggle.

mod catalog;
mod clock_list;
mod drawing;
mod land;
mod settings;
mod store;
mod theme;
mod ui;
mod world_map;

use std::time::Instant;

use chrono::Utc;
use nannou::prelude::*;
use nannou::winit::event::WindowEvent;
use nannou::winit::window::Theme;
use nannou_egui::Egui;
use shared::{MemoryStorage, SlotStorage};

use crate::catalog::MAP_CITIES;
use crate::clock_list::ClockList;
use crate::drawing::{colors, draw_map, MapLayout};
use crate::land::LandState;
use crate::settings::Settings;
use crate::store::ClockStore;
use crate::theme::{ColorScheme, ThemeManager};
use crate::ui::{draw_clock_list, draw_top_bar};
use crate::world_map::WorldMap;

pub const LEFT_PANEL_WIDTH: f32 = 340.0;
pub const TOP_BAR_HEIGHT: f32 = 48.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    nannou::app(model).update(update).run();
}

/// Application state
pub struct Model {
    /// Sole owner of the selected clocks
    pub store: ClockStore,
    pub clock_list: ClockList,
    pub world_map: WorldMap,
    pub theme: ThemeManager,
    /// Marker under the pointer (if any)
    pub hovered_marker: Option<usize>,
    pub pointer: Option<Point2>,
    /// Scheme last pushed into egui
    visuals_applied: Option<ColorScheme>,

    /// egui integration
    egui: Egui,
}

fn scheme_from_winit(theme: Theme) -> ColorScheme {
    match theme {
        Theme::Dark => ColorScheme::Dark,
        Theme::Light => ColorScheme::Light,
    }
}

fn winit_theme(scheme: ColorScheme) -> Theme {
    match scheme {
        ColorScheme::Dark => Theme::Dark,
        ColorScheme::Light => Theme::Light,
    }
}

/// Push the chrome override to the window
///
/// Under `system` the override is cleared and the OS scheme is read back,
/// since it may have changed while an explicit preference was active.
fn apply_window_theme(app: &App, theme: &mut ThemeManager) {
    let window = app.main_window();
    let winit_window = window.winit_window();
    let applied = theme.applied();
    let chrome = applied.chrome;
    log::debug!(
        "theme {} (override {:?}, chrome {})",
        theme.preference(),
        applied.marker,
        chrome.map(ColorScheme::chrome_color).unwrap_or("os"),
    );
    winit_window.set_theme(chrome.map(winit_theme));
    if chrome.is_none() {
        if let Some(os) = winit_window.theme() {
            theme.os_scheme_changed(scheme_from_winit(os));
        }
    }
}

/// One storage handle per component, both backed by the same slots
fn slot_storage(settings: &Settings) -> (Box<dyn SlotStorage>, Box<dyn SlotStorage>) {
    match settings.storage() {
        Ok(disk) => {
            log::info!("storage slots in {}", disk.root().display());
            (Box::new(disk.clone()), Box::new(disk))
        }
        Err(e) => {
            log::warn!("{}; clocks and theme will not persist", e);
            let memory = MemoryStorage::new();
            (Box::new(memory.clone()), Box::new(memory))
        }
    }
}

fn model(app: &App) -> Model {
    let settings = Settings::load();

    // Create window
    let window_id = app
        .new_window()
        .title("World Clock")
        .size(settings.window_width, settings.window_height)
        .min_size(900, 520)
        .view(view)
        .mouse_pressed(mouse_pressed)
        .mouse_moved(mouse_moved)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let (egui, os_scheme) = {
        let window = app.window(window_id).unwrap();
        let os_scheme = window
            .winit_window()
            .theme()
            .map(scheme_from_winit)
            .unwrap_or_default();
        (Egui::from_window(&window), os_scheme)
    };

    let (clock_slots, theme_slots) = slot_storage(&settings);

    // Theme first so nothing flashes in the wrong scheme
    let mut theme = ThemeManager::load(theme_slots, os_scheme);
    apply_window_theme(app, &mut theme);

    let mut store = ClockStore::load(clock_slots);
    let clock_list = ClockList::new(store.subscribe());

    let land = if settings.load_land {
        LandState::fetch(&settings.land_geometry_url)
    } else {
        LandState::Unavailable
    };
    let world_map = WorldMap::new(store.subscribe(), MAP_CITIES, land);

    Model {
        store,
        clock_list,
        world_map,
        theme,
        hovered_marker: None,
        pointer: None,
        visuals_applied: None,
        egui,
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    let instant = Instant::now();
    let now = Utc::now();

    model.world_map.poll_land();
    model.clock_list.sync(now);
    model.world_map.sync();
    model.clock_list.tick(instant, now);
    model.world_map.tick(instant, now);

    let applied = model.theme.applied();

    // Begin egui frame
    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    if model.visuals_applied != Some(applied.scheme) {
        ctx.set_visuals(ui::visuals(applied.scheme));
        model.visuals_applied = Some(applied.scheme);
    }

    let top_bar = draw_top_bar(&ctx, &applied);
    let list_result = draw_clock_list(&ctx, &mut model.clock_list, applied.scheme);

    drop(ctx);

    if top_bar.toggle_theme {
        model.theme.toggle();
        apply_window_theme(app, &mut model.theme);
    }
    if let Some(tz) = list_result.remove_zone {
        model.store.remove(&tz);
    }
    if list_result.submit {
        if let Err(e) = model.clock_list.form.submit(&mut model.store) {
            log::debug!("add rejected: {}", e);
        }
    }

    // Fold this frame's mutations in before the view runs
    model.clock_list.sync(now);
    model.world_map.sync();
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let scheme = model.theme.applied().scheme;

    draw.background().color(colors::palette(scheme).background);

    let layout = MapLayout::calculate(app.window_rect(), LEFT_PANEL_WIDTH, TOP_BAR_HEIGHT);
    draw_map(
        &draw,
        &layout,
        &model.world_map,
        scheme,
        model.hovered_marker,
        model.pointer,
    );

    if let Err(e) = draw.to_frame(app, &frame) {
        log::error!("failed to render map: {:?}", e);
    }

    // Render egui on top
    if let Err(e) = model.egui.draw_to_frame(&frame) {
        log::error!("failed to render panels: {:?}", e);
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.egui.ctx().is_pointer_over_area() {
        return;
    }
    let layout = MapLayout::calculate(app.window_rect(), LEFT_PANEL_WIDTH, TOP_BAR_HEIGHT);
    if let Some((x, y)) = layout.to_map(app.mouse.position()) {
        if model.world_map.click(x, y, &mut model.store).is_some() {
            model.world_map.sync();
        }
    }
}

fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    model.pointer = Some(pos);

    let layout = MapLayout::calculate(app.window_rect(), LEFT_PANEL_WIDTH, TOP_BAR_HEIGHT);
    model.hovered_marker = layout
        .to_map(pos)
        .and_then(|(x, y)| model.world_map.marker_index_at(x, y));
}

fn raw_window_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    // Let egui handle raw events
    model.egui.handle_raw_event(event);

    if let WindowEvent::ThemeChanged(theme) = event {
        if model.theme.os_scheme_changed(scheme_from_winit(*theme)) {
            log::debug!("OS scheme changed to {:?}", theme);
        }
    }
}
