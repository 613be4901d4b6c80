/// Services the host framework provides to deferred UI tasks.
pub trait UiHost {
    /// Ask the host to move keyboard focus to `target`.
    ///
    /// Returns false when the host knows the request cannot take effect.
    /// egui cannot tell yet: focus on an id that no widget claims in the next
    /// frame is dropped silently.
    fn request_focus(&mut self, target: egui::Id) -> bool;
}

impl UiHost for egui::Context {
    fn request_focus(&mut self, target: egui::Id) -> bool {
        self.memory_mut(|mem| mem.request_focus(target));
        self.request_repaint();
        true
    }
}

/// Records focus requests instead of performing them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub focus_requests: Vec<egui::Id>,
}

#[cfg(test)]
impl UiHost for RecordingHost {
    fn request_focus(&mut self, target: egui::Id) -> bool {
        self.focus_requests.push(target);
        true
    }
}
