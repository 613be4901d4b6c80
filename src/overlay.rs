//! Busy overlay state: display properties, the Hidden/Visible state machine,
//! and focus restoration once a busy period ends.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::dispatcher::{Dispatcher, TimerHandle};
use crate::property::Property;

/// Delay between leaving the busy state and moving focus to the target.
/// Gives the host a frame or two to re-enable the covered content first.
pub const FOCUS_RESTORE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndicatorType {
    #[default]
    Twist,
    ProgressBar,
}

impl IndicatorType {
    pub const ALL: [IndicatorType; 2] = [IndicatorType::Twist, IndicatorType::ProgressBar];

    pub fn label(self) -> &'static str {
        match self {
            IndicatorType::Twist => "Twist",
            IndicatorType::ProgressBar => "Progress bar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    #[default]
    Hidden,
    Visible,
}

impl VisualState {
    pub fn from_busy(busy: bool) -> Self {
        if busy {
            VisualState::Visible
        } else {
            VisualState::Hidden
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VisualState::Hidden => "Hidden",
            VisualState::Visible => "Visible",
        }
    }
}

/// Four-sided inset, in points.
///
/// egui stores margins as `i8`, so each side renders within
/// 0..=[`Thickness::MAX_SIDE`]. Config loading clamps stored values to that range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thickness {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Thickness {
    pub const MAX_SIDE: f32 = i8::MAX as f32;

    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Each side limited to what egui can draw. NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn side(v: f32) -> f32 {
            if v.is_nan() {
                return 0.0;
            }
            v.clamp(0.0, Thickness::MAX_SIDE)
        }
        Self {
            top: side(self.top),
            right: side(self.right),
            bottom: side(self.bottom),
            left: side(self.left),
        }
    }

    pub fn to_margin(self) -> egui::Margin {
        fn side(v: f32) -> i8 {
            v.round().clamp(i8::MIN as f32, i8::MAX as f32) as i8
        }
        egui::Margin {
            left: side(self.left),
            right: side(self.right),
            top: side(self.top),
            bottom: side(self.bottom),
        }
    }
}

type StateListener = Box<dyn FnMut(VisualState, bool)>;

/// Wraps hosted content and covers it with a waiting indicator while busy.
pub struct BusyOverlay {
    is_busy: Property<bool>,
    visual_state: VisualState,
    config: OverlayConfig,
    focus_target: Option<egui::Id>,
    attached: bool,
    was_attached: bool,
    dispatcher: Dispatcher,
    pending_focus: Option<TimerHandle>,
    state_listener: Option<StateListener>,
}

impl std::fmt::Debug for BusyOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyOverlay")
            .field("is_busy", &self.is_busy.value())
            .field("visual_state", &self.visual_state)
            .field("focus_target", &self.focus_target)
            .field("attached", &self.attached)
            .field("pending_focus", &self.pending_focus)
            .finish_non_exhaustive()
    }
}

impl BusyOverlay {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_config(dispatcher, OverlayConfig::default())
    }

    pub fn with_config(dispatcher: Dispatcher, config: OverlayConfig) -> Self {
        Self {
            is_busy: Property::new(false),
            visual_state: VisualState::Hidden,
            config,
            focus_target: None,
            attached: false,
            was_attached: false,
            dispatcher,
            pending_focus: None,
            state_listener: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy.value()
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual_state
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_busy(&mut self, busy: bool) {
        if self.is_busy.set(busy).is_some() {
            self.on_busy_changed(busy);
        }
    }

    fn on_busy_changed(&mut self, busy: bool) {
        // Any pending restore belongs to an earlier busy period.
        self.cancel_pending_focus();
        if !busy {
            self.schedule_focus_restore();
        }
        self.change_visual_state(busy);
    }

    fn schedule_focus_restore(&mut self) {
        let Some(target) = self.focus_target else {
            return;
        };
        if !self.attached {
            log::debug!("Busy overlay not attached, skipping focus restore");
            return;
        }
        let handle = self
            .dispatcher
            .delay(FOCUS_RESTORE_DELAY, move |host| {
                if !host.request_focus(target) {
                    log::debug!("Focus restore to {:?} had no effect", target);
                }
            });
        log::debug!("Scheduled focus restore to {:?} ({:?})", target, handle);
        self.pending_focus = Some(handle);
    }

    fn cancel_pending_focus(&mut self) {
        if let Some(handle) = self.pending_focus.take() {
            if self.dispatcher.cancel(handle) {
                log::debug!("Cancelled pending focus restore ({:?})", handle);
            }
        }
    }

    fn change_visual_state(&mut self, busy: bool) {
        let state = VisualState::from_busy(busy);
        self.visual_state = state;
        log::debug!("Busy overlay -> {}", state.name());
        if let Some(listener) = self.state_listener.as_mut() {
            listener(state, true);
        }
    }

    /// Called by the host the first time the overlay is materialized.
    pub fn on_attached_to_tree(&mut self) {
        if self.was_attached {
            if !self.attached {
                self.attached = true;
                log::debug!("Busy overlay re-attached");
            }
            return;
        }
        self.was_attached = true;
        self.attached = true;
        if self.config.is_busy_at_startup {
            self.is_busy.set(true);
        }
        self.change_visual_state(self.is_busy.value());
    }

    pub fn on_detached(&mut self) {
        self.attached = false;
        self.cancel_pending_focus();
    }

    /// Listener for visual-state requests: `(state, use_transitions)`.
    pub fn set_state_listener(&mut self, listener: impl FnMut(VisualState, bool) + 'static) {
        self.state_listener = Some(Box::new(listener));
    }

    pub fn has_pending_focus(&self) -> bool {
        self.pending_focus
            .is_some_and(|handle| self.dispatcher.is_pending(handle))
    }

    pub fn focus_target(&self) -> Option<egui::Id> {
        self.focus_target
    }

    pub fn set_focus_target(&mut self, target: Option<egui::Id>) {
        self.focus_target = target;
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Replace all display properties. Does not touch the busy state.
    pub fn apply_config(&mut self, config: OverlayConfig) {
        self.config = config;
    }

    pub fn busy_at_startup(&self) -> bool {
        self.config.is_busy_at_startup
    }

    pub fn set_busy_at_startup(&mut self, value: bool) {
        self.config.is_busy_at_startup = value;
    }

    pub fn busy_content(&self) -> &str {
        &self.config.busy_content
    }

    pub fn set_busy_content(&mut self, content: impl Into<String>) {
        self.config.busy_content = content.into();
    }

    pub fn busy_content_margin(&self) -> Thickness {
        self.config.busy_content_margin
    }

    pub fn set_busy_content_margin(&mut self, margin: Thickness) {
        self.config.busy_content_margin = margin;
    }

    pub fn indicator_type(&self) -> IndicatorType {
        self.config.indicator_type
    }

    pub fn set_indicator_type(&mut self, indicator: IndicatorType) {
        self.config.indicator_type = indicator;
    }

    pub fn show_cancel_button(&self) -> bool {
        self.config.show_cancel_button
    }

    pub fn set_show_cancel_button(&mut self, show: bool) {
        self.config.show_cancel_button = show;
    }

    pub fn progress_value(&self) -> f64 {
        self.config.progress_value
    }

    pub fn set_progress_value(&mut self, value: f64) {
        self.config.progress_value = value;
    }

    /// Progress as a 0.0–1.0 fraction for drawing. NaN draws as empty.
    pub fn progress_fraction(&self) -> f32 {
        let v = self.config.progress_value;
        if v.is_nan() {
            return 0.0;
        }
        (v.clamp(0.0, 100.0) / 100.0) as f32
    }

    pub fn progress_color(&self) -> egui::Color32 {
        self.config.progress_color
    }

    pub fn set_progress_color(&mut self, color: egui::Color32) {
        self.config.progress_color = color;
    }
}

impl Drop for BusyOverlay {
    fn drop(&mut self) {
        self.cancel_pending_focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::RecordingHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        clock: ManualClock,
        dispatcher: Dispatcher,
        host: RecordingHost,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = ManualClock::new();
            let dispatcher = Dispatcher::with_clock(Rc::new(clock.clone()));
            Self {
                clock,
                dispatcher,
                host: RecordingHost::default(),
            }
        }

        fn attached_overlay(&self) -> BusyOverlay {
            let mut overlay = BusyOverlay::new(self.dispatcher.clone());
            overlay.on_attached_to_tree();
            overlay
        }

        fn run_after(&mut self, ms: u64) -> usize {
            self.clock.advance(Duration::from_millis(ms));
            self.dispatcher.run_due(&mut self.host)
        }
    }

    fn target() -> egui::Id {
        egui::Id::new("name_field")
    }

    #[test]
    fn test_visual_state_follows_latest_value() {
        let fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        assert_eq!(overlay.visual_state(), VisualState::Hidden);

        for busy in [true, true, false, true, false, false, true] {
            overlay.set_busy(busy);
            assert_eq!(overlay.is_busy(), busy);
            assert_eq!(overlay.visual_state(), VisualState::from_busy(busy));
        }
    }

    #[test]
    fn test_visual_state_tracks_busy_before_attach() {
        let fx = Fixture::new();
        let mut overlay = BusyOverlay::new(fx.dispatcher.clone());
        overlay.set_busy(true);
        assert_eq!(overlay.visual_state(), VisualState::Visible);
    }

    #[test]
    fn test_busy_at_startup_applies_on_attach() {
        let fx = Fixture::new();
        let mut overlay = BusyOverlay::new(fx.dispatcher.clone());
        overlay.set_busy_at_startup(true);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        overlay.set_state_listener(move |state, animate| sink.borrow_mut().push((state, animate)));

        overlay.on_attached_to_tree();
        assert!(overlay.is_busy());
        assert_eq!(overlay.visual_state(), VisualState::Visible);
        assert_eq!(*seen.borrow(), vec![(VisualState::Visible, true)]);
    }

    #[test]
    fn test_attach_applies_state_once() {
        let fx = Fixture::new();
        let mut overlay = BusyOverlay::new(fx.dispatcher.clone());
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        overlay.set_state_listener(move |_, _| *sink.borrow_mut() += 1);

        overlay.on_attached_to_tree();
        overlay.on_attached_to_tree();
        assert_eq!(*count.borrow(), 1);
        assert_eq!(overlay.visual_state(), VisualState::Hidden);
    }

    #[test]
    fn test_listener_sees_each_transition() {
        let fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        overlay.set_state_listener(move |state, _| sink.borrow_mut().push(state));

        overlay.set_busy(true);
        overlay.set_busy(true);
        overlay.set_busy(false);
        assert_eq!(
            *seen.borrow(),
            vec![VisualState::Visible, VisualState::Hidden]
        );
    }

    #[test]
    fn test_focus_restored_after_delay() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_focus_target(Some(target()));

        overlay.set_busy(true);
        overlay.set_busy(false);
        assert!(overlay.has_pending_focus());

        assert_eq!(fx.run_after(99), 0);
        assert!(fx.host.focus_requests.is_empty());
        assert_eq!(fx.run_after(1), 1);
        assert_eq!(fx.host.focus_requests, vec![target()]);
        assert!(!overlay.has_pending_focus());

        assert_eq!(fx.run_after(500), 0);
        assert_eq!(fx.host.focus_requests.len(), 1);
    }

    #[test]
    fn test_no_focus_without_target() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_busy(true);
        overlay.set_busy(false);
        assert!(!overlay.has_pending_focus());
        assert_eq!(fx.run_after(200), 0);
        assert!(fx.host.focus_requests.is_empty());
    }

    #[test]
    fn test_repeated_idle_focuses_once() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_focus_target(Some(target()));
        overlay.set_busy(true);
        overlay.set_busy(false);
        fx.run_after(30);
        overlay.set_busy(false);
        fx.run_after(200);
        assert_eq!(fx.host.focus_requests, vec![target()]);
    }

    #[test]
    fn test_quick_cycles_keep_only_latest_request() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_focus_target(Some(egui::Id::new("old")));
        overlay.set_busy(true);
        overlay.set_busy(false);
        fx.run_after(50);
        overlay.set_focus_target(Some(target()));
        overlay.set_busy(true);
        overlay.set_busy(false);

        // First request would have been due here.
        assert_eq!(fx.run_after(60), 0);
        assert_eq!(fx.run_after(40), 1);
        assert_eq!(fx.host.focus_requests, vec![target()]);
        assert_eq!(fx.dispatcher.pending_count(), 0);
    }

    #[test]
    fn test_focus_target_captured_when_scheduled() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        let first = egui::Id::new("a");
        overlay.set_focus_target(Some(first));
        overlay.set_busy(true);
        overlay.set_busy(false);

        fx.run_after(40);
        overlay.set_focus_target(Some(egui::Id::new("b")));
        assert_eq!(fx.run_after(80), 1);
        assert_eq!(fx.host.focus_requests, vec![first]);
    }

    #[test]
    fn test_busy_again_cancels_pending_focus() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_focus_target(Some(target()));
        overlay.set_busy(true);
        overlay.set_busy(false);
        fx.run_after(40);
        overlay.set_busy(true);
        assert!(!overlay.has_pending_focus());
        fx.run_after(500);
        assert!(fx.host.focus_requests.is_empty());
        assert_eq!(overlay.visual_state(), VisualState::Visible);
    }

    #[test]
    fn test_detach_cancels_pending_focus() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_focus_target(Some(target()));
        overlay.set_busy(true);
        overlay.set_busy(false);
        overlay.on_detached();
        fx.run_after(200);
        assert!(fx.host.focus_requests.is_empty());

        // No scheduling while detached.
        overlay.set_busy(true);
        overlay.set_busy(false);
        assert_eq!(fx.dispatcher.pending_count(), 0);

        overlay.on_attached_to_tree();
        overlay.set_busy(true);
        overlay.set_busy(false);
        fx.run_after(100);
        assert_eq!(fx.host.focus_requests, vec![target()]);
    }

    #[test]
    fn test_drop_cancels_pending_focus() {
        let mut fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_focus_target(Some(target()));
        overlay.set_busy(true);
        overlay.set_busy(false);
        drop(overlay);
        assert_eq!(fx.dispatcher.pending_count(), 0);
        fx.run_after(200);
        assert!(fx.host.focus_requests.is_empty());
    }

    #[test]
    fn test_progress_is_stored_verbatim() {
        let fx = Fixture::new();
        let mut overlay = fx.attached_overlay();
        overlay.set_busy(true);
        for v in [-5.0, 0.0, 42.5, 100.0, 250.0] {
            overlay.set_progress_value(v);
            assert_eq!(overlay.progress_value(), v);
            assert_eq!(overlay.visual_state(), VisualState::Visible);
        }
        overlay.set_progress_color(egui::Color32::from_rgb(255, 0, 128));
        assert_eq!(overlay.progress_color(), egui::Color32::from_rgb(255, 0, 128));
        assert!(overlay.is_busy());
    }

    #[test]
    fn test_progress_fraction_clamps() {
        let fx = Fixture::new();
        let mut overlay = BusyOverlay::new(fx.dispatcher.clone());
        overlay.set_progress_value(50.0);
        assert_eq!(overlay.progress_fraction(), 0.5);
        overlay.set_progress_value(150.0);
        assert_eq!(overlay.progress_fraction(), 1.0);
        overlay.set_progress_value(-1.0);
        assert_eq!(overlay.progress_fraction(), 0.0);
        overlay.set_progress_value(f64::NAN);
        assert_eq!(overlay.progress_fraction(), 0.0);
    }

    #[test]
    fn test_thickness_to_margin() {
        let m = Thickness {
            top: 1.4,
            right: 2.6,
            bottom: 500.0,
            left: 0.0,
        }
        .to_margin();
        assert_eq!((m.top, m.right, m.bottom, m.left), (1, 3, 127, 0));
    }

    #[test]
    fn test_thickness_clamped() {
        let t = Thickness {
            top: 500.0,
            right: -3.0,
            bottom: f32::NAN,
            left: 12.5,
        }
        .clamped();
        assert_eq!(
            t,
            Thickness {
                top: 127.0,
                right: 0.0,
                bottom: 0.0,
                left: 12.5,
            }
        );
    }
}
