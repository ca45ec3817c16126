use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::errors::ExportError;
use crate::export::{build_report, write_report, ExportSettings};
use crate::models::{BirthForm, FormError, RenderMode, Sender};
use crate::prediction_client::PredictionService;
use crate::session::guard::{lock, RequestGuard};
use crate::session::state::{Notice, RequestKind, SessionPhase, SessionState};
use crate::view::{project, SessionView};

/// How a handler invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The request succeeded and the transcript shows the result.
    Completed,
    /// The request failed; the failure is visible to the user.
    Failed,
    /// Nothing was sent and no state changed.
    Ignored(Ignored),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ignored {
    InvalidForm(FormError),
    AlreadyChatting,
    EmptyInput,
    ControlsDisabled,
    NotASendKey,
    Busy(RequestKind),
}

/// Owns the session state and runs the three user-facing handlers against a
/// prediction service.
///
/// Cloning is cheap and clones share state, so handlers may be driven from
/// several tasks. Only one request runs at a time: while one is in flight every
/// other submit, send or export is ignored.
#[derive(Clone)]
pub struct ChatSession {
    service: Arc<dyn PredictionService>,
    state: Arc<Mutex<SessionState>>,
    export: ExportSettings,
}

impl ChatSession {
    pub fn new(service: Arc<dyn PredictionService>, export: ExportSettings) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(SessionState::default())),
            export,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    /// Replaces the live form values. The exporter reads whatever is here.
    pub fn update_form(&self, form: BirthForm) {
        self.lock().form = form;
    }

    /// Types into the chat input.
    pub fn set_input(&self, text: impl Into<String>) {
        self.lock().input.value = text.into();
    }

    pub fn view(&self) -> SessionView {
        project(&self.lock())
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Form submission
    // ────────────────────────────────────────────────────────────────────────

    /// Sends the birth details and, on success, opens the conversation.
    pub async fn submit_birth_details(&self) -> Outcome {
        let (details, guard) = {
            let mut state = self.lock();
            if state.phase == SessionPhase::Chatting {
                return Outcome::Ignored(Ignored::AlreadyChatting);
            }
            if let Some(current) = state.in_flight {
                return Outcome::Ignored(Ignored::Busy(current));
            }
            let details = match state.form.to_details() {
                Ok(details) => details,
                Err(e) => return Outcome::Ignored(Ignored::InvalidForm(e)),
            };
            match RequestGuard::begin(&self.state, &mut state, RequestKind::Prediction) {
                Ok(guard) => (details, guard),
                Err(current) => return Outcome::Ignored(Ignored::Busy(current)),
            }
        };

        info!("Requesting prediction for {}", details.name);
        let result = self.service.predict(&details).await;

        let outcome = {
            let mut state = self.lock();
            match result {
                Ok(message) => {
                    state.transcript.reset_to_welcome();
                    state
                        .transcript
                        .render_message(&message, Sender::Bot, RenderMode::PlainText);
                    state.phase = SessionPhase::Chatting;
                    state.submitted = Some(details);
                    state.chat_scrolled_into_view = true;
                    info!("Prediction received; chat opened");
                    Outcome::Completed
                }
                Err(e) => {
                    warn!("Prediction failed: {e}");
                    state.transcript.render_message(
                        &format!("Oops! Something went wrong: {e}. Please try again."),
                        Sender::Bot,
                        RenderMode::PlainText,
                    );
                    Outcome::Failed
                }
            }
        };

        drop(guard);
        outcome
    }

    // ────────────────────────────────────────────────────────────────────────
    // Chat turn
    // ────────────────────────────────────────────────────────────────────────

    /// Sends the pending chat input as a follow-up question.
    pub async fn send_chat_message(&self) -> Outcome {
        let (question, guard) = {
            let mut state = self.lock();
            if !state.controls_enabled() {
                return match state.in_flight {
                    Some(current) => Outcome::Ignored(Ignored::Busy(current)),
                    None => Outcome::Ignored(Ignored::ControlsDisabled),
                };
            }
            let question = state.input.value.trim().to_string();
            if question.is_empty() {
                return Outcome::Ignored(Ignored::EmptyInput);
            }

            state
                .transcript
                .render_message(&question, Sender::User, RenderMode::PlainText);
            state.input.value.clear();
            state.input.focused = false;
            match RequestGuard::begin(&self.state, &mut state, RequestKind::ChatTurn) {
                Ok(guard) => (question, guard),
                Err(current) => return Outcome::Ignored(Ignored::Busy(current)),
            }
        };

        info!("Sending follow-up question ({} chars)", question.len());
        let result = self.service.chat(&question).await;

        let outcome = {
            let mut state = self.lock();
            match result {
                Ok(reply) => {
                    state
                        .transcript
                        .render_message(&reply, Sender::Bot, RenderMode::PlainText);
                    Outcome::Completed
                }
                Err(e) => {
                    warn!("Chat turn failed: {e}");
                    state.transcript.render_message(
                        &format!("I'm having trouble understanding right now: {e}."),
                        Sender::Bot,
                        RenderMode::PlainText,
                    );
                    Outcome::Failed
                }
            }
        };

        drop(guard);
        outcome
    }

    /// Keypress on the chat input. Only Enter sends.
    pub async fn handle_key(&self, key: &str) -> Outcome {
        if key == "Enter" {
            self.send_chat_message().await
        } else {
            Outcome::Ignored(Ignored::NotASendKey)
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Export
    // ────────────────────────────────────────────────────────────────────────

    /// Writes the transcript report as a PDF and raises a notice with the result.
    pub async fn export_transcript(&self) -> Outcome {
        let (text, guard) = {
            let mut state = self.lock();
            let text = build_report(&state.form, &state.transcript);
            match RequestGuard::begin(&self.state, &mut state, RequestKind::Export) {
                Ok(guard) => (text, guard),
                Err(current) => return Outcome::Ignored(Ignored::Busy(current)),
            }
        };

        let settings = self.export.clone();
        let result = tokio::task::spawn_blocking(move || write_report(&text, &settings))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))
            .and_then(|written| written);

        drop(guard);

        let (notice, outcome) = match result {
            Ok(path) => (Notice::ReportSaved { path }, Outcome::Completed),
            Err(e) => {
                warn!("Export failed: {e}");
                (
                    Notice::ExportFailed {
                        reason: e.to_string(),
                    },
                    Outcome::Failed,
                )
            }
        };
        self.lock().notices.push(notice);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use crate::prediction_client::fake::{Gate, Recorded, ScriptedService};
    use crate::transcript::WELCOME_TEXT;

    fn asha_form() -> BirthForm {
        BirthForm {
            name: "Asha".to_string(),
            gender: "female".to_string(),
            birth_date: "1990-01-01".to_string(),
            birth_time: "08:30".to_string(),
            birth_place: "Delhi".to_string(),
        }
    }

    fn session_with(service: Arc<ScriptedService>) -> ChatSession {
        let export = ExportSettings::new(std::env::temp_dir().join("unused.pdf"));
        ChatSession::new(service, export)
    }

    /// A session that already went through a successful prediction.
    async fn chatting_session(service: Arc<ScriptedService>) -> ChatSession {
        service.push_prediction(Ok("Your sun sign is Capricorn.".to_string()));
        let session = session_with(service);
        session.update_form(asha_form());
        assert_eq!(session.submit_birth_details().await, Outcome::Completed);
        session
    }

    fn texts(session: &ChatSession) -> Vec<String> {
        session.view().entries.into_iter().map(|e| e.text).collect()
    }

    // ── form submission ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_successful_prediction_opens_chat() {
        let service = Arc::new(ScriptedService::new());
        service.push_prediction(Ok("Your sun sign is Capricorn.".to_string()));
        let session = session_with(service.clone());
        session.update_form(asha_form());

        let before = session.view();
        assert!(!before.busy);
        assert!(!before.input_enabled);

        assert_eq!(session.submit_birth_details().await, Outcome::Completed);

        let view = session.view();
        assert_eq!(view.phase, SessionPhase::Chatting);
        assert_eq!(texts(&session), vec![WELCOME_TEXT, "Your sun sign is Capricorn."]);
        assert!(view.entries[0].initial);
        assert_eq!(view.entries[1].sender, Sender::Bot);
        assert!(view.input_enabled);
        assert!(view.send_enabled);
        assert!(view.chat_scrolled_into_view);
        assert!(!view.busy);

        let Recorded::Predict(sent) = &service.requests()[0] else {
            panic!("expected a prediction request");
        };
        assert_eq!(sent.name, "Asha");
        assert_eq!(sent.birth_place, "Delhi");
    }

    #[tokio::test]
    async fn test_success_clears_earlier_failures() {
        let service = Arc::new(ScriptedService::new());
        service.push_prediction(Err(ClientError::Server {
            status: 503,
            message: None,
        }));
        service.push_prediction(Ok("Welcome aboard.".to_string()));
        let session = session_with(service);
        session.update_form(asha_form());

        assert_eq!(session.submit_birth_details().await, Outcome::Failed);
        assert_eq!(session.view().entries.len(), 2);

        assert_eq!(session.submit_birth_details().await, Outcome::Completed);
        assert_eq!(texts(&session), vec![WELCOME_TEXT, "Welcome aboard."]);
    }

    #[tokio::test]
    async fn test_failed_prediction_reports_error_and_stays_on_form() {
        let service = Arc::new(ScriptedService::new());
        service.push_prediction(Err(ClientError::Server {
            status: 400,
            message: Some("birthPlace not found".to_string()),
        }));
        let session = session_with(service);
        session.update_form(asha_form());

        assert_eq!(session.submit_birth_details().await, Outcome::Failed);

        let view = session.view();
        assert_eq!(view.phase, SessionPhase::AwaitingBirthDetails);
        assert!(view.form_visible);
        assert!(!view.input_enabled);
        assert!(!view.busy);
        assert_eq!(
            view.entries.last().unwrap().text,
            "Oops! Something went wrong: birthPlace not found. Please try again."
        );
    }

    #[tokio::test]
    async fn test_failed_prediction_without_server_text_uses_status() {
        let service = Arc::new(ScriptedService::new());
        service.push_prediction(Err(ClientError::Server {
            status: 500,
            message: None,
        }));
        let session = session_with(service);
        session.update_form(asha_form());

        session.submit_birth_details().await;

        assert_eq!(
            session.view().entries.last().unwrap().text,
            "Oops! Something went wrong: HTTP error! status: 500. Please try again."
        );
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let service = Arc::new(ScriptedService::new());
        let session = session_with(service.clone());
        let mut form = asha_form();
        form.birth_place = String::new();
        session.update_form(form);

        assert_eq!(
            session.submit_birth_details().await,
            Outcome::Ignored(Ignored::InvalidForm(FormError::Missing("Place of Birth")))
        );
        assert!(service.requests().is_empty());
        assert_eq!(session.view().entries.len(), 1);
        assert!(!session.view().busy);
    }

    #[tokio::test]
    async fn test_submit_after_chat_opened_is_ignored() {
        let service = Arc::new(ScriptedService::new());
        let session = chatting_session(service.clone()).await;

        assert_eq!(
            session.submit_birth_details().await,
            Outcome::Ignored(Ignored::AlreadyChatting)
        );
        assert_eq!(service.requests().len(), 1);
    }

    // ── chat turns ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_chat_turn_appends_question_and_reply() {
        let service = Arc::new(ScriptedService::new());
        let session = chatting_session(service.clone()).await;
        service.push_reply(Ok("Jupiter favours your career this year.".to_string()));

        session.set_input("  What about my career?  ");
        assert_eq!(session.send_chat_message().await, Outcome::Completed);

        let view = session.view();
        let tail: Vec<_> = view.entries.iter().rev().take(2).rev().collect();
        assert_eq!(tail[0].sender, Sender::User);
        assert_eq!(tail[0].text, "What about my career?");
        assert_eq!(tail[1].sender, Sender::Bot);
        assert_eq!(tail[1].text, "Jupiter favours your career this year.");
        assert_eq!(view.input_value, "");
        assert!(view.input_enabled);
        assert!(view.input_focused);
        assert!(!view.busy);
        assert_eq!(view.scroll_anchor, Some(tail[1].id));
        assert_eq!(
            service.requests().last(),
            Some(&Recorded::Chat("What about my career?".to_string()))
        );
    }

    #[tokio::test]
    async fn test_chat_server_error_message() {
        let service = Arc::new(ScriptedService::new());
        let session = chatting_session(service.clone()).await;
        service.push_reply(Err(ClientError::Server {
            status: 500,
            message: Some("model unavailable".to_string()),
        }));

        session.set_input("Will I travel?");
        assert_eq!(session.send_chat_message().await, Outcome::Failed);

        let view = session.view();
        assert_eq!(
            view.entries.last().unwrap().text,
            "I'm having trouble understanding right now: model unavailable."
        );
        assert!(view.input_enabled);
        assert!(!view.busy);
    }

    #[tokio::test]
    async fn test_whitespace_input_is_a_no_op() {
        let service = Arc::new(ScriptedService::new());
        let session = chatting_session(service.clone()).await;
        let before = session.view().entries.len();

        session.set_input("   \t ");
        assert_eq!(
            session.send_chat_message().await,
            Outcome::Ignored(Ignored::EmptyInput)
        );

        let view = session.view();
        assert_eq!(view.entries.len(), before);
        assert!(view.input_enabled);
        assert_eq!(service.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_before_prediction_is_rejected() {
        let service = Arc::new(ScriptedService::new());
        let session = session_with(service.clone());

        session.set_input("Hello?");
        assert_eq!(
            session.send_chat_message().await,
            Outcome::Ignored(Ignored::ControlsDisabled)
        );
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_enter_key_sends_other_keys_do_not() {
        let service = Arc::new(ScriptedService::new());
        let session = chatting_session(service.clone()).await;
        service.push_reply(Ok("Yes.".to_string()));
        session.set_input("Is today lucky?");

        assert_eq!(
            session.handle_key("a").await,
            Outcome::Ignored(Ignored::NotASendKey)
        );
        assert_eq!(session.handle_key("Enter").await, Outcome::Completed);
        assert_eq!(texts(&session).last().map(String::as_str), Some("Yes."));
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_rejected() {
        let gate = Arc::new(Gate::default());
        let service = Arc::new(ScriptedService::gated(gate.clone()));
        service.push_prediction(Ok("Prediction.".to_string()));
        let session = session_with(service.clone());
        session.update_form(asha_form());

        let submit = tokio::spawn({
            let session = session.clone();
            async move { session.submit_birth_details().await }
        });
        gate.entered.notified().await;
        assert!(session.view().busy);
        gate.release.notify_one();
        assert_eq!(submit.await.unwrap(), Outcome::Completed);

        service.push_reply(Ok("First answer.".to_string()));
        session.set_input("First question");
        let first = tokio::spawn({
            let session = session.clone();
            async move { session.send_chat_message().await }
        });
        gate.entered.notified().await;

        // Optimistic echo is already visible and the controls are locked.
        let view = session.view();
        assert!(view.busy);
        assert!(!view.input_enabled);
        assert!(!view.send_enabled);
        assert_eq!(view.entries.last().unwrap().text, "First question");

        session.set_input("Second question");
        assert_eq!(
            session.send_chat_message().await,
            Outcome::Ignored(Ignored::Busy(RequestKind::ChatTurn))
        );
        assert_eq!(
            session.export_transcript().await,
            Outcome::Ignored(Ignored::Busy(RequestKind::ChatTurn))
        );

        gate.release.notify_one();
        assert_eq!(first.await.unwrap(), Outcome::Completed);

        let view = session.view();
        assert!(!view.busy);
        assert!(view.input_enabled);
        assert_eq!(view.input_value, "Second question");
        assert_eq!(
            service
                .requests()
                .iter()
                .filter(|r| matches!(r, Recorded::Chat(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_cancelled_request_still_clears_busy() {
        let gate = Arc::new(Gate::default());
        let service = Arc::new(ScriptedService::gated(gate.clone()));
        let session = session_with(service);
        session.update_form(asha_form());

        let submit = tokio::spawn({
            let session = session.clone();
            async move { session.submit_birth_details().await }
        });
        gate.entered.notified().await;
        assert!(session.view().busy);

        submit.abort();
        let _ = submit.await;

        let view = session.view();
        assert!(!view.busy);
        assert_eq!(view.phase, SessionPhase::AwaitingBirthDetails);
    }

    // ── export ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_export_writes_pdf_and_raises_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("JyotishAI_Astrology_Report.pdf");
        let service = Arc::new(ScriptedService::new());
        service.push_prediction(Ok("A".to_string()));
        service.push_reply(Ok("Saturn is kind.".to_string()));
        let session = ChatSession::new(service, ExportSettings::new(path.clone()));
        session.update_form(asha_form());
        session.submit_birth_details().await;
        session.set_input("Q");
        session.send_chat_message().await;

        assert_eq!(session.export_transcript().await, Outcome::Completed);

        assert!(!session.view().busy);
        assert_eq!(
            session.take_notices(),
            vec![Notice::ReportSaved { path: path.clone() }]
        );
        assert!(session.take_notices().is_empty());

        let bytes = std::fs::read(&path).unwrap();
        let text: String = pdf_extract::extract_text_from_mem(&bytes)
            .unwrap()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert!(text.contains("Name:Asha"), "{text}");
        assert!(text.contains("You:Q"));
        assert!(text.contains("AstroAI:Saturniskind."));
        assert!(!text.contains("Hello!Provideyourbirthdetails"));
    }

    #[tokio::test]
    async fn test_export_before_any_chat_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let session = ChatSession::new(
            Arc::new(ScriptedService::new()),
            ExportSettings::new(path.clone()),
        );
        session.update_form(asha_form());

        assert_eq!(session.export_transcript().await, Outcome::Completed);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_export_failure_becomes_notice() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let session = ChatSession::new(
            Arc::new(ScriptedService::new()),
            ExportSettings::new(blocker.join("report.pdf")),
        );

        assert_eq!(session.export_transcript().await, Outcome::Failed);

        assert!(!session.view().busy);
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0]
            .to_string()
            .starts_with("Could not save your report: "));
    }
}
