//! Accessibility Event Model
//!
//! The engine consumes a single sequential stream of events delivered by the
//! platform's accessibility subsystem. Events carry an opaque handle to the
//! input field they originated from; the handle stays meaningful only while
//! that field keeps focus.

/// Opaque token for the accessibility node behind an input field.
///
/// Platform bridges mint these; the engine only passes them back through
/// [`crate::fill::FieldDriver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldHandle(u64);

impl FieldHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Kind of accessibility event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An input field gained focus.
    FocusGained,
    /// An input field was clicked. Follows the focus event when the click
    /// itself moved focus.
    Clicked,
    /// The foreground window changed.
    WindowStateChanged,
}

/// One event from the platform's accessibility stream.
#[derive(Debug, Clone)]
pub struct UiEvent {
    pub kind: EventKind,
    /// Package/application identity of the event's host app.
    pub app_identity: String,
    /// Human-readable label of the host app; empty when it cannot be resolved.
    pub app_label: String,
    /// Whether the source field is a password-type input.
    pub is_password: bool,
    /// Source field, when the event originated from an input node.
    pub field: Option<FieldHandle>,
    /// Window change caused by the on-screen keyboard appearing.
    pub from_input_method: bool,
}

impl UiEvent {
    pub fn focus(
        field: FieldHandle,
        app_identity: impl Into<String>,
        app_label: impl Into<String>,
        is_password: bool,
    ) -> Self {
        Self {
            kind: EventKind::FocusGained,
            app_identity: app_identity.into(),
            app_label: app_label.into(),
            is_password,
            field: Some(field),
            from_input_method: false,
        }
    }

    pub fn click(
        field: FieldHandle,
        app_identity: impl Into<String>,
        app_label: impl Into<String>,
        is_password: bool,
    ) -> Self {
        Self {
            kind: EventKind::Clicked,
            app_identity: app_identity.into(),
            app_label: app_label.into(),
            is_password,
            field: Some(field),
            from_input_method: false,
        }
    }

    pub fn window_change(app_identity: impl Into<String>, from_input_method: bool) -> Self {
        Self {
            kind: EventKind::WindowStateChanged,
            app_identity: app_identity.into(),
            app_label: String::new(),
            is_password: false,
            field: None,
            from_input_method,
        }
    }
}

/// What the host platform can do for us.
#[derive(Debug, Clone, Copy)]
pub struct PlatformCapabilities {
    /// Password-field focus reporting is available at all.
    pub password_focus_events: bool,
    /// Fields accept programmatic text injection; without it the engine
    /// stages values through the clipboard and pastes.
    pub direct_text_injection: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            password_focus_events: true,
            direct_text_injection: true,
        }
    }
}
