//! Projection of session state onto what the user sees.
//!
//! `project` is a pure function: front-ends render a `SessionView` and never
//! read or write `SessionState` directly.

pub mod terminal;

use uuid::Uuid;

use crate::models::{MessageBody, Sender};
use crate::session::state::{SessionPhase, SessionState};

#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub id: Uuid,
    pub sender: Sender,
    pub label: &'static str,
    pub css_class: &'static str,
    /// Visible text; markup already stripped.
    pub text: String,
    /// Sanitized markup for entries rendered as markup.
    pub markup: Option<String>,
    pub initial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub form_visible: bool,
    pub chat_visible: bool,
    pub heading: Option<String>,
    pub busy: bool,
    pub input_value: String,
    pub input_enabled: bool,
    pub input_focused: bool,
    pub send_enabled: bool,
    pub entries: Vec<EntryView>,
    pub scroll_anchor: Option<Uuid>,
    pub chat_scrolled_into_view: bool,
}

pub fn project(state: &SessionState) -> SessionView {
    let chatting = state.phase == SessionPhase::Chatting;
    let controls_enabled = state.controls_enabled();

    let heading = match (&state.submitted, chatting) {
        (Some(details), true) => Some(format!(
            "Welcome, {}! Let's explore your cosmic journey.",
            details.name
        )),
        _ => None,
    };

    let entries = state
        .transcript
        .messages()
        .iter()
        .map(|m| EntryView {
            id: m.id,
            sender: m.sender,
            label: m.sender.label(),
            css_class: m.sender.css_class(),
            text: m.text_content(),
            markup: match &m.body {
                MessageBody::Markup(html) => Some(html.clone()),
                MessageBody::Text(_) => None,
            },
            initial: m.initial,
        })
        .collect();

    SessionView {
        phase: state.phase,
        form_visible: !chatting,
        chat_visible: chatting,
        heading,
        busy: state.busy,
        input_value: state.input.value.clone(),
        input_enabled: controls_enabled,
        input_focused: state.input.focused && controls_enabled,
        send_enabled: controls_enabled,
        entries,
        scroll_anchor: state.transcript.scroll_anchor(),
        chat_scrolled_into_view: state.chat_scrolled_into_view,
    }
}
