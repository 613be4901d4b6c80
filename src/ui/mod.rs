pub mod busy_mask;
pub mod menu;
pub mod settings;
pub mod status_bar;

use crate::config::Config;
use crate::overlay::BusyOverlay;

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    StartJob,
    CancelJob,
    SetBusy(bool),
    ConfigChanged,
    Quit,
}

#[derive(Default)]
pub struct UiState {
    pub show_settings: bool,
    pub name: String,
    pub notes: String,
}

/// Id of the form field that gets focus back once a job ends.
pub fn name_field_id() -> egui::Id {
    egui::Id::new("demo_name_field")
}

/// Everything the demo UI reads or drives for one frame.
pub struct FrameInputs<'a> {
    pub ui_state: &'a mut UiState,
    pub overlay: &'a mut BusyOverlay,
    pub config: &'a mut Config,
    pub job_running: bool,
    pub pending_tasks: usize,
}

/// Build the entire egui UI. Returns a list of actions to process.
pub fn build_ui(ctx: &egui::Context, inputs: FrameInputs<'_>) -> Vec<UiAction> {
    let FrameInputs {
        ui_state,
        overlay,
        config,
        job_running,
        pending_tasks,
    } = inputs;
    let mut actions = Vec::new();

    actions.extend(menu::show_menu_bar(ctx, ui_state, overlay, job_running));

    status_bar::show_status_bar(ctx, overlay, pending_tasks);

    actions.extend(settings::show_settings_window(
        ctx,
        &mut ui_state.show_settings,
        config,
    ));

    egui::CentralPanel::default().show(ctx, |ui| {
        let masked = busy_mask::show(ui, overlay, |ui| {
            show_form(ui, ui_state, job_running)
        });
        if masked.cancel_clicked {
            actions.push(UiAction::CancelJob);
        }
        actions.extend(masked.inner);
    });

    actions
}

fn show_form(ui: &mut egui::Ui, ui_state: &mut UiState, job_running: bool) -> Vec<UiAction> {
    let mut actions = Vec::new();

    ui.heading("Order details");
    ui.add_space(8.0);

    egui::Grid::new("demo_form")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Name:");
            ui.add(
                egui::TextEdit::singleline(&mut ui_state.name)
                    .id(name_field_id())
                    .hint_text("Focused again after each job"),
            );
            ui.end_row();

            ui.label("Notes:");
            ui.add(egui::TextEdit::multiline(&mut ui_state.notes).desired_rows(4));
            ui.end_row();
        });

    ui.add_space(8.0);
    if ui
        .add_enabled(!job_running, egui::Button::new("Submit"))
        .clicked()
    {
        actions.push(UiAction::StartJob);
    }

    // Fill the panel so the mask covers all of it.
    ui.allocate_space(ui.available_size());

    actions
}
