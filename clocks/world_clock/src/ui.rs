//! UI module - egui panels
//!
//! Provides:
//! - Top bar: title and the theme toggle
//! - Clock list (left panel): add form with suggestions, clock cards

use nannou_egui::egui;

use crate::clock_list::ClockList;
use crate::store::Accent;
use crate::theme::{AppliedTheme, ColorScheme};

/// Result of top bar interactions
#[derive(Default)]
pub struct TopBarResult {
    /// Theme toggle clicked
    pub toggle_theme: bool,
}

/// Result of clock list interactions
#[derive(Default)]
pub struct ClockListResult {
    /// Add form submitted (button or Enter)
    pub submit: bool,
    /// Remove control clicked for this zone
    pub remove_zone: Option<String>,
}

fn accent_color(accent: Accent) -> egui::Color32 {
    match accent {
        Accent::Aqua => egui::Color32::from_rgb(46, 230, 214),
        Accent::Pink => egui::Color32::from_rgb(255, 92, 170),
        Accent::Lime => egui::Color32::from_rgb(170, 230, 60),
    }
}

fn muted(scheme: ColorScheme) -> egui::Color32 {
    match scheme {
        ColorScheme::Dark => egui::Color32::from_rgb(140, 145, 155),
        ColorScheme::Light => egui::Color32::from_rgb(95, 100, 115),
    }
}

/// egui visuals for a scheme
pub fn visuals(scheme: ColorScheme) -> egui::Visuals {
    match scheme {
        ColorScheme::Dark => egui::Visuals::dark(),
        ColorScheme::Light => egui::Visuals::light(),
    }
}

/// Draw the title bar with the theme toggle
pub fn draw_top_bar(ctx: &egui::Context, theme: &AppliedTheme) -> TopBarResult {
    let mut result = TopBarResult::default();

    egui::TopBottomPanel::top("top_bar")
        .exact_height(crate::TOP_BAR_HEIGHT)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.heading("World Clock");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button(theme.label)
                        .on_hover_text(theme.title())
                        .clicked()
                    {
                        result.toggle_theme = true;
                    }
                });
            });
        });

    result
}

/// Draw the clock list panel (left side)
pub fn draw_clock_list(
    ctx: &egui::Context,
    list: &mut ClockList,
    scheme: ColorScheme,
) -> ClockListResult {
    let mut result = ClockListResult::default();

    egui::SidePanel::left("clock_list_panel")
        .resizable(false)
        .exact_width(crate::LEFT_PANEL_WIDTH)
        .show(ctx, |ui| {
            ui.add_space(10.0);
            draw_add_form(ui, list, scheme, &mut result);

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(6.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                for card in list.cards() {
                    let accent = accent_color(card.accent);
                    egui::Frame::group(ui.style())
                        .stroke(egui::Stroke::new(1.5, accent))
                        .inner_margin(egui::Margin::same(10.0))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(&card.label).strong().color(accent),
                                );
                                ui.label(
                                    egui::RichText::new(&card.abbreviation)
                                        .size(11.0)
                                        .color(muted(scheme)),
                                )
                                .on_hover_text(card.utc_offset.as_str());
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui
                                            .small_button("×")
                                            .on_hover_text("Remove clock")
                                            .clicked()
                                        {
                                            result.remove_zone = Some(card.timezone_id.clone());
                                        }
                                    },
                                );
                            });

                            let time_size = if card.valid { 30.0 } else { 18.0 };
                            ui.label(egui::RichText::new(&card.time).size(time_size).monospace());
                            if !card.date.is_empty() {
                                ui.label(
                                    egui::RichText::new(&card.date)
                                        .size(12.0)
                                        .color(muted(scheme)),
                                );
                            }
                        });
                    ui.add_space(6.0);
                }
            });
        });

    result
}

fn draw_add_form(
    ui: &mut egui::Ui,
    list: &mut ClockList,
    scheme: ColorScheme,
    result: &mut ClockListResult,
) {
    ui.label("Add a clock");
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut list.form.input)
                .hint_text("Europe/Paris")
                .desired_width(ui.available_width() - 50.0),
        );
        if response.changed() {
            list.form.edited();
        }
        let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Add").clicked() || entered {
            result.submit = true;
        }
    });

    if let Some(error) = list.form.error() {
        ui.colored_label(egui::Color32::from_rgb(255, 107, 53), error.to_string());
    }

    // Suggestions only while typing
    if list.form.input.trim().is_empty() {
        return;
    }
    let mut chosen = None;
    egui::ScrollArea::vertical()
        .id_source("suggestions")
        .max_height(160.0)
        .show(ui, |ui| {
            for suggestion in list.form.suggestions() {
                if suggestion.timezone_id == list.form.input {
                    continue;
                }
                let text = egui::RichText::new(suggestion.display())
                    .size(12.0)
                    .color(muted(scheme));
                if ui.selectable_label(false, text).clicked() {
                    chosen = Some(suggestion.clone());
                }
            }
        });
    if let Some(suggestion) = chosen {
        list.form.choose(&suggestion);
    }
}
