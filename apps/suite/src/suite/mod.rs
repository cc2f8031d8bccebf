//! Suite Controller: owns the AI Career Suite modal and its request lifecycle.
//!
//! Every user interaction is a trigger on [`SuiteController`]. A trigger either
//! changes the view synchronously or, for AI actions, returns a [`Dispatch`]
//! describing the one remote call to make. The caller runs the dispatch
//! outside the lock and hands the outcome back through
//! [`SuiteController::complete`], which ignores it if the session has moved on.
//!
//! Transitions:
//! ```text
//! closed ──open──▶ Menu ──pitch/interview──▶ gate ──▶ Loading ──▶ Result
//!                   ├──cover/gap──▶ InputForm ──submit──▶ gate
//!                   └──configure──▶ KeySetup ──save──▶ Menu
//! gate (no key) ──▶ KeySetup ──save──▶ Loading
//! Result(interview) ──answer──▶ gate
//! any ──reset──▶ Menu,  any ──close──▶ closed
//! ```

pub mod handlers;
pub mod view;

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::content::ResumeDocument;
use crate::download::DownloadControl;
use crate::i18n::Strings;
use crate::key_store::{KeyGate, KeyStore};
use crate::llm_client::prompts::PromptTemplates;
use crate::llm_client::{LlmError, TextGenerator};
use view::{FormKind, View, ViewModel};

pub type SharedSuite = Arc<Mutex<SuiteController>>;

// ────────────────────────────────────────────────────────────────────────────
// Triggers and requests
// ────────────────────────────────────────────────────────────────────────────

/// The four entries of the suite menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteAction {
    ElevatorPitch,
    MockInterview,
    CoverLetter,
    GapAnalysis,
}

impl FromStr for SuiteAction {
    type Err = SuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "elevator-pitch" => Ok(SuiteAction::ElevatorPitch),
            "mock-interview" => Ok(SuiteAction::MockInterview),
            "cover-letter" => Ok(SuiteAction::CoverLetter),
            "gap-analysis" => Ok(SuiteAction::GapAnalysis),
            other => Err(SuiteError::UnknownAction(other.to_string())),
        }
    }
}

/// Values typed into the input form. Which ones are required depends on the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
}

/// A remote call the suite can make, with the user input it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    ElevatorPitch,
    MockInterview,
    AnswerFeedback { question: String, answer: String },
    CoverLetter { company: String, role: String },
    GapAnalysis { target_role: String },
}

impl RemoteRequest {
    fn label(&self) -> &'static str {
        match self {
            RemoteRequest::ElevatorPitch => "elevator_pitch",
            RemoteRequest::MockInterview => "mock_interview",
            RemoteRequest::AnswerFeedback { .. } => "answer_feedback",
            RemoteRequest::CoverLetter { .. } => "cover_letter",
            RemoteRequest::GapAnalysis { .. } => "gap_analysis",
        }
    }

    fn prompt(&self, templates: &PromptTemplates, cv_text: &str) -> String {
        match self {
            RemoteRequest::ElevatorPitch => templates.render_elevator_pitch(cv_text),
            RemoteRequest::MockInterview => templates.render_mock_interview(cv_text),
            RemoteRequest::AnswerFeedback { question, answer } => {
                templates.render_answer_feedback(question, answer)
            }
            RemoteRequest::CoverLetter { company, role } => {
                templates.render_cover_letter(company, role, cv_text)
            }
            RemoteRequest::GapAnalysis { target_role } => {
                templates.render_gap_analysis(target_role, cv_text)
            }
        }
    }
}

/// One remote call to run outside the controller lock.
#[derive(Debug)]
pub struct Dispatch {
    pub ticket: Uuid,
    pub prompt: String,
    pub credential: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SuiteError {
    #[error("The career suite is closed")]
    ModalClosed,

    #[error("'{trigger}' is not available from the {view} view")]
    InvalidTrigger {
        trigger: &'static str,
        view: &'static str,
    },

    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Session state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct InFlight {
    ticket: Uuid,
    request: RemoteRequest,
}

/// Everything that is reset when the modal opens, closes or is reset.
#[derive(Debug, Default)]
struct SessionState {
    view: View,
    /// Set only while a mock-interview answer is awaited.
    current_question: Option<String>,
    /// A key-gated request waiting for the user to supply a key.
    pending: Option<RemoteRequest>,
    in_flight: Option<InFlight>,
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

pub struct SuiteController {
    key_store: KeyStore,
    strings: Arc<Strings>,
    templates: PromptTemplates,
    resume: Arc<ResumeDocument>,
    modal_open: bool,
    session: SessionState,
}

impl SuiteController {
    pub fn new(
        key_store: KeyStore,
        strings: Arc<Strings>,
        templates: PromptTemplates,
        resume: Arc<ResumeDocument>,
    ) -> Self {
        Self {
            key_store,
            strings,
            templates,
            resume,
            modal_open: false,
            session: SessionState::default(),
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.modal_open
    }

    #[cfg(test)]
    pub fn view(&self) -> &View {
        &self.session.view
    }

    #[cfg(test)]
    pub fn current_question(&self) -> Option<&str> {
        self.session.current_question.as_deref()
    }

    #[cfg(test)]
    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }

    /// Opens the modal on a fresh Menu. Opening an open modal resets it.
    pub fn open(&mut self) {
        self.modal_open = true;
        self.session = SessionState::default();
        debug!("Suite opened");
    }

    /// Closes the modal. An in-flight request keeps running but its result is discarded.
    pub fn close(&mut self) {
        if self.session.in_flight.is_some() {
            debug!("Suite closed with a request in flight; its result will be discarded");
        }
        self.modal_open = false;
        self.session = SessionState::default();
    }

    pub fn toggle(&mut self) {
        if self.modal_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Back to Menu, abandoning any form, pending key prompt or question.
    pub fn reset(&mut self) -> Result<(), SuiteError> {
        self.ensure_open()?;
        self.session = SessionState::default();
        Ok(())
    }

    pub fn choose(&mut self, action: SuiteAction) -> Result<Option<Dispatch>, SuiteError> {
        self.ensure_view("choose", |v| matches!(v, View::Menu))?;
        match action {
            SuiteAction::ElevatorPitch => Ok(self.gate(RemoteRequest::ElevatorPitch)),
            SuiteAction::MockInterview => Ok(self.gate(RemoteRequest::MockInterview)),
            SuiteAction::CoverLetter => {
                self.session.view = View::InputForm(FormKind::CoverLetter);
                Ok(None)
            }
            SuiteAction::GapAnalysis => {
                self.session.view = View::InputForm(FormKind::GapAnalysis);
                Ok(None)
            }
        }
    }

    /// Submits the input form. A blank required field leaves the form as it is.
    pub fn submit_form(&mut self, fields: FormFields) -> Result<Option<Dispatch>, SuiteError> {
        self.ensure_view("submit_form", |v| matches!(v, View::InputForm(_)))?;
        let View::InputForm(kind) = self.session.view else {
            return Ok(None);
        };

        let request = match kind {
            FormKind::CoverLetter => filled(fields.company).map(|company| {
                RemoteRequest::CoverLetter {
                    company,
                    role: filled(fields.role).unwrap_or_default(),
                }
            }),
            FormKind::GapAnalysis => {
                filled(fields.target_role).map(|target_role| RemoteRequest::GapAnalysis {
                    target_role,
                })
            }
        };

        match request {
            Some(request) => Ok(self.gate(request)),
            None => {
                debug!("Ignoring form submission with a blank required field");
                Ok(None)
            }
        }
    }

    /// Sends an answer to the question currently on screen. Blank answers are ignored.
    pub fn submit_answer(&mut self, answer: &str) -> Result<Option<Dispatch>, SuiteError> {
        self.ensure_view("submit_answer", |v| {
            matches!(v, View::Result { interview: true, .. })
        })?;
        let Some(question) = self.session.current_question.clone() else {
            return Err(SuiteError::InvalidTrigger {
                trigger: "submit_answer",
                view: self.session.view.name(),
            });
        };
        let Some(answer) = filled(Some(answer.to_string())) else {
            debug!("Ignoring blank interview answer");
            return Ok(None);
        };
        Ok(self.gate(RemoteRequest::AnswerFeedback { question, answer }))
    }

    /// Shows the key prompt without any action waiting on it.
    pub fn configure_key(&mut self) -> Result<(), SuiteError> {
        self.ensure_view("configure_key", |v| matches!(v, View::Menu))?;
        self.session.pending = None;
        self.session.view = View::KeySetup;
        Ok(())
    }

    /// Confirms the key prompt. A blank key keeps the prompt open. Otherwise
    /// the pending action (if any) runs now; without one the suite returns to Menu.
    pub fn submit_key(&mut self, key: &str) -> Result<Option<Dispatch>, SuiteError> {
        self.ensure_view("submit_key", |v| matches!(v, View::KeySetup))?;
        if !self.key_store.set(key) {
            return Ok(None);
        }
        info!("API key saved");

        match self.session.pending.take() {
            Some(request) => Ok(self.gate(request)),
            None => {
                self.session = SessionState::default();
                Ok(None)
            }
        }
    }

    pub fn clear_key(&mut self) -> Result<(), SuiteError> {
        self.ensure_open()?;
        self.key_store.clear();
        info!("API key cleared");
        self.session = SessionState::default();
        Ok(())
    }

    /// Applies the outcome of a dispatched call. Returns `false` when the
    /// ticket is stale (the modal was closed or reset since) and nothing changed.
    pub fn complete(&mut self, ticket: Uuid, outcome: Result<String, LlmError>) -> bool {
        let in_flight = match self.session.in_flight.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight,
            other => {
                self.session.in_flight = other;
                debug!("Discarding stale response for ticket {ticket}");
                return false;
            }
        };

        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!("{} request failed: {e}", in_flight.request.label());
                self.session.current_question = None;
                self.session.view = View::Result {
                    text: self.strings.connection_error.clone(),
                    interview: false,
                };
                return true;
            }
        };

        info!("{} request completed", in_flight.request.label());
        self.session.view = match in_flight.request {
            RemoteRequest::MockInterview => {
                let shown = format!(
                    "### {}:\n\n{}",
                    self.strings.interview_question_label, text
                );
                self.session.current_question = Some(text);
                View::Result {
                    text: shown,
                    interview: true,
                }
            }
            _ => {
                self.session.current_question = None;
                View::Result {
                    text,
                    interview: false,
                }
            }
        };
        true
    }

    pub fn view_model(&self, download: &DownloadControl) -> ViewModel {
        let current = &self.session.view;
        let form = match current {
            View::InputForm(kind) if self.modal_open => {
                Some(view::form_view(*kind, &self.strings))
            }
            _ => None,
        };
        let result = match current {
            View::Result { text, interview } if self.modal_open => Some(view::ResultView {
                markdown: text.clone(),
                markup: view::render_markdown(text),
                interview_input: *interview,
            }),
            _ => None,
        };

        ViewModel {
            modal_open: self.modal_open,
            view: self.modal_open.then(|| current.name()),
            visible_panes: view::visible_panes(self.modal_open, current),
            key_status: view::key_status(self.key_store.source(), &self.strings),
            form,
            result,
            download: view::download_view(download, &self.strings),
        }
    }

    // ── internals ──────────────────────────────────────────────────────────

    /// Runs `request` now if a key is available, otherwise parks it behind the key prompt.
    fn gate(&mut self, request: RemoteRequest) -> Option<Dispatch> {
        match self.key_store.require(request) {
            KeyGate::Ready { action, credential } => Some(self.start(action, credential)),
            KeyGate::Prompt(action) => {
                debug!("{} request waiting for an API key", action.label());
                self.session.pending = Some(action);
                self.session.view = View::KeySetup;
                None
            }
        }
    }

    fn start(&mut self, request: RemoteRequest, credential: String) -> Dispatch {
        let ticket = Uuid::new_v4();
        let prompt = request.prompt(&self.templates, self.resume.excerpt());
        info!("Dispatching {} request (ticket {ticket})", request.label());

        self.session.view = View::Loading;
        self.session.in_flight = Some(InFlight { ticket, request });

        Dispatch {
            ticket,
            prompt,
            credential,
        }
    }

    fn ensure_open(&self) -> Result<(), SuiteError> {
        if self.modal_open {
            Ok(())
        } else {
            Err(SuiteError::ModalClosed)
        }
    }

    fn ensure_view(
        &self,
        trigger: &'static str,
        allowed: impl Fn(&View) -> bool,
    ) -> Result<(), SuiteError> {
        self.ensure_open()?;
        if allowed(&self.session.view) {
            Ok(())
        } else {
            Err(SuiteError::InvalidTrigger {
                trigger,
                view: self.session.view.name(),
            })
        }
    }
}

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Runs `dispatch` on its own task and feeds the outcome back into the controller.
pub fn spawn_request(
    suite: SharedSuite,
    generator: Arc<dyn TextGenerator>,
    dispatch: Dispatch,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = generator
            .generate(&dispatch.prompt, &dispatch.credential)
            .await;
        suite.lock().await.complete(dispatch.ticket, outcome);
    })
}
