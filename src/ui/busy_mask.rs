use crate::overlay::{BusyOverlay, IndicatorType, VisualState};

/// Seconds for the overlay to fade between Hidden and Visible.
const FADE_TIME: f32 = 0.15;
const DIM_ALPHA: u8 = 140;
const PROGRESS_WIDTH: f32 = 220.0;

pub struct BusyMaskResponse<R> {
    pub inner: R,
    /// Rect covered by the wrapped content.
    pub rect: egui::Rect,
    /// The cancel affordance was clicked this frame. Acting on it is up to the caller.
    pub cancel_clicked: bool,
}

/// Show `add_contents`, covered by the busy indicator while `overlay` is busy.
///
/// The first call attaches the overlay, which applies its startup busy flag
/// before anything is drawn.
pub fn show<R>(
    ui: &mut egui::Ui,
    overlay: &mut BusyOverlay,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> BusyMaskResponse<R> {
    if !overlay.is_attached() {
        overlay.on_attached_to_tree();
    }

    let id = ui.make_persistent_id("busy_mask");
    let visible = overlay.visual_state() == VisualState::Visible;
    let content = ui.add_enabled_ui(!visible, add_contents);
    let rect = content.response.rect;

    let t = ui
        .ctx()
        .animate_bool_with_time(id.with("fade"), visible, FADE_TIME);

    let mut cancel_clicked = false;
    if t > 0.0 {
        cancel_clicked = paint_mask(ui.ctx(), id, rect, t, overlay);
    }

    BusyMaskResponse {
        inner: content.inner,
        rect,
        cancel_clicked,
    }
}

fn paint_mask(
    ctx: &egui::Context,
    id: egui::Id,
    rect: egui::Rect,
    opacity: f32,
    overlay: &BusyOverlay,
) -> bool {
    let mut cancel_clicked = false;

    egui::Area::new(id.with("area"))
        .fixed_pos(rect.min)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.multiply_opacity(opacity);

            // Swallow pointer input aimed at the covered content.
            ui.allocate_rect(rect, egui::Sense::click_and_drag());
            ui.painter().rect_filled(
                rect,
                0.0,
                egui::Color32::from_black_alpha(DIM_ALPHA),
            );

            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(rect), |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space((rect.height() / 2.0 - 50.0).max(0.0));
                    egui::Frame::popup(ui.style())
                        .inner_margin(overlay.busy_content_margin().to_margin())
                        .show(ui, |ui| {
                            ui.vertical_centered(|ui| {
                                show_indicator(ui, overlay);
                                ui.add_space(6.0);
                                ui.label(overlay.busy_content());
                                if overlay.show_cancel_button() {
                                    ui.add_space(6.0);
                                    cancel_clicked = ui.button("Cancel").clicked();
                                }
                            });
                        });
                });
            });
        });

    cancel_clicked
}

fn show_indicator(ui: &mut egui::Ui, overlay: &BusyOverlay) {
    match overlay.indicator_type() {
        IndicatorType::Twist => {
            ui.add(egui::Spinner::new().size(28.0));
        }
        IndicatorType::ProgressBar => {
            ui.add(
                egui::ProgressBar::new(overlay.progress_fraction())
                    .fill(overlay.progress_color())
                    .desired_width(PROGRESS_WIDTH)
                    .show_percentage(),
            );
        }
    }
}
