use crate::overlay::BusyOverlay;
use crate::ui::{UiAction, UiState};

pub fn show_menu_bar(
    ctx: &egui::Context,
    ui_state: &mut UiState,
    overlay: &BusyOverlay,
    job_running: bool,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui
                    .add(egui::Button::new("Quit").shortcut_text("Esc"))
                    .clicked()
                {
                    actions.push(UiAction::Quit);
                    ui.close_menu();
                }
            });

            ui.menu_button("Job", |ui| {
                if ui
                    .add_enabled(!job_running, egui::Button::new("Start"))
                    .clicked()
                {
                    actions.push(UiAction::StartJob);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(job_running, egui::Button::new("Cancel"))
                    .clicked()
                {
                    actions.push(UiAction::CancelJob);
                    ui.close_menu();
                }
                ui.separator();
                // Drives the overlay directly, without a job behind it.
                let mut busy = overlay.is_busy();
                if ui
                    .add_enabled(!job_running, egui::Checkbox::new(&mut busy, "Busy"))
                    .clicked()
                {
                    actions.push(UiAction::SetBusy(busy));
                    ui.close_menu();
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("\u{2699}").clicked() {
                    ui_state.show_settings = !ui_state.show_settings;
                }
            });
        });
    });

    actions
}
