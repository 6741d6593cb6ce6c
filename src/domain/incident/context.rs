use crate::domain::percept::EventTag;

/// Per-incident data owned by one state machine instance
///
/// Written only when a state is entered: the triggering event is stored
/// on entering Alert and cleared on entering Completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncidentContext {
    current_event: Option<EventTag>,
}

impl IncidentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_event(&self) -> Option<EventTag> {
        self.current_event
    }

    pub fn is_empty(&self) -> bool {
        self.current_event.is_none()
    }

    pub(crate) fn open(&mut self, event: EventTag) {
        self.current_event = Some(event);
    }

    pub(crate) fn clear(&mut self) {
        self.current_event = None;
    }
}
