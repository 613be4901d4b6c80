use crate::config::Config;
use crate::overlay::{IndicatorType, Thickness};
use crate::ui::UiAction;

pub fn show_settings_window(
    ctx: &egui::Context,
    show: &mut bool,
    config: &mut Config,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::Window::new("Settings")
        .open(show)
        .resizable(false)
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("Busy Overlay");
            ui.separator();

            let overlay = &mut config.overlay;
            let mut changed = false;

            ui.horizontal(|ui| {
                ui.label("Message:");
                changed |= ui
                    .text_edit_singleline(&mut overlay.busy_content)
                    .changed();
            });

            ui.horizontal(|ui| {
                ui.label("Indicator:");
                egui::ComboBox::from_id_salt("indicator_type")
                    .selected_text(overlay.indicator_type.label())
                    .show_ui(ui, |ui| {
                        for indicator in IndicatorType::ALL {
                            changed |= ui
                                .selectable_value(
                                    &mut overlay.indicator_type,
                                    indicator,
                                    indicator.label(),
                                )
                                .changed();
                        }
                    });
            });

            ui.horizontal(|ui| {
                ui.label("Progress colour:");
                changed |= ui
                    .color_edit_button_srgba(&mut overlay.progress_color)
                    .changed();
            });

            changed |= margin_editor(ui, &mut overlay.busy_content_margin);

            changed |= ui
                .checkbox(&mut overlay.show_cancel_button, "Show cancel button")
                .changed();
            changed |= ui
                .checkbox(&mut overlay.is_busy_at_startup, "Busy at startup")
                .on_hover_text("Takes effect the next time the app starts")
                .changed();

            ui.add_space(8.0);
            ui.heading("Simulated Job");
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Duration:");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut config.job_duration_ms)
                            .range(100..=60_000)
                            .speed(50.0)
                            .suffix(" ms"),
                    )
                    .changed();
            });

            ui.horizontal(|ui| {
                ui.label("Steps:");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.job_steps).range(1..=1000))
                    .changed();
            });

            ui.add_space(8.0);
            if ui.button("Reset to Defaults").clicked() {
                *config = Config::default();
                changed = true;
            }

            if changed {
                config.save();
                actions.push(UiAction::ConfigChanged);
            }
        });

    actions
}

fn margin_editor(ui: &mut egui::Ui, margin: &mut Thickness) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label("Margin:");
        for (name, side) in [
            ("T", &mut margin.top),
            ("R", &mut margin.right),
            ("B", &mut margin.bottom),
            ("L", &mut margin.left),
        ] {
            changed |= ui
                .add(
                    egui::DragValue::new(side)
                        .range(0.0..=64.0)
                        .prefix(name)
                        .speed(0.5),
                )
                .changed();
        }
    });
    changed
}
