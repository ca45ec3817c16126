use std::fmt;
use std::path::PathBuf;

use crate::models::{BirthDetails, BirthForm};
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingBirthDetails,
    /// Entered on the first successful prediction; never left.
    Chatting,
}

/// The operation currently holding the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Prediction,
    ChatTurn,
    Export,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Prediction => "prediction",
            RequestKind::ChatTurn => "chat turn",
            RequestKind::Export => "export",
        };
        f.write_str(name)
    }
}

/// One-shot alert for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ReportSaved { path: PathBuf },
    ExportFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ReportSaved { .. } => {
                f.write_str("Your astrological report is being downloaded!")
            }
            Notice::ExportFailed { reason } => write!(f, "Could not save your report: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInput {
    pub value: String,
    pub focused: bool,
}

/// Everything the page would otherwise keep in the DOM.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub form: BirthForm,
    /// Snapshot taken by the successful submission.
    pub submitted: Option<BirthDetails>,
    pub transcript: Transcript,
    pub input: ChatInput,
    pub busy: bool,
    pub in_flight: Option<RequestKind>,
    pub chat_scrolled_into_view: bool,
    pub notices: Vec<Notice>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::AwaitingBirthDetails,
            form: BirthForm::default(),
            submitted: None,
            transcript: Transcript::with_welcome(),
            input: ChatInput::default(),
            busy: false,
            in_flight: None,
            chat_scrolled_into_view: false,
            notices: Vec::new(),
        }
    }
}

impl SessionState {
    /// Chat input and send control are usable only while chatting and idle.
    pub fn controls_enabled(&self) -> bool {
        self.phase == SessionPhase::Chatting && self.in_flight.is_none()
    }
}
