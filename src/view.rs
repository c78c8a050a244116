//! Observable state of a map view.

/// Lifecycle of a [`MapView`](../explorer/struct.MapView.html)
///
/// `Uninitialized → SdkReady → MapConstructed`, with `MapConstructed` reached either from a
/// position fix or from the default-location fallback. `Unmounted` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    SdkReady,
    MapConstructed,
    Unmounted,
}

/// What a front-end renders besides the map itself
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub phase: Phase,
    /// Shown until the first map construction, then hidden for good
    pub loading: bool,
    /// The single-slot status line; `None` hides it
    pub error_message: Option<String>,
    pub search_text: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            phase: Phase::Uninitialized,
            loading: true,
            error_message: None,
            search_text: String::new(),
        }
    }
}

impl ViewState {
    pub(crate) fn show_error<E: ToString>(&mut self, err: &E) {
        self.error_message = Some(err.to_string());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error_message = None;
    }
}
