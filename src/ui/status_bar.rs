use crate::overlay::{BusyOverlay, IndicatorType};

pub fn show_status_bar(ctx: &egui::Context, overlay: &BusyOverlay, pending_tasks: usize) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if overlay.is_busy() {
                ui.colored_label(egui::Color32::from_rgb(66, 133, 244), "Busy");
            } else {
                ui.label("Idle");
            }
            ui.separator();
            ui.label(format!("State: {}", overlay.visual_state().name()));

            if overlay.indicator_type() == IndicatorType::ProgressBar {
                ui.separator();
                ui.label(format!("Progress: {:.0}%", overlay.progress_value()));
            }

            if overlay.has_pending_focus() {
                ui.separator();
                ui.label("Restoring focus...");
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} queued", pending_tasks));
            });
        });
    });
}
