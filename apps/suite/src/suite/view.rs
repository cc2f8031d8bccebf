//! View projection: pure functions from controller state to what the page shows.
//!
//! Nothing here mutates state; the page renders whatever [`ViewModel`] says.

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

use crate::download::DownloadControl;
use crate::i18n::Strings;
use crate::key_store::KeySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    CoverLetter,
    GapAnalysis,
}

/// The logical view inside the modal. Exactly one is current at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum View {
    #[default]
    Menu,
    KeySetup,
    InputForm(FormKind),
    Loading,
    Result {
        /// Markdown returned by the model (or the localized error message).
        text: String,
        /// Whether the interview answer box is shown under the result.
        interview: bool,
    },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Menu => "menu",
            View::KeySetup => "key_setup",
            View::InputForm(_) => "input_form",
            View::Loading => "loading",
            View::Result { .. } => "result",
        }
    }
}

/// Identifiers of the panes the page can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    Menu,
    KeySetup,
    InputView,
    Loading,
    Result,
}

/// One pane while the modal is open, none while it is closed.
pub fn visible_panes(modal_open: bool, view: &View) -> Vec<Pane> {
    if !modal_open {
        return Vec::new();
    }
    let pane = match view {
        View::Menu => Pane::Menu,
        View::KeySetup => Pane::KeySetup,
        View::InputForm(_) => Pane::InputView,
        View::Loading => Pane::Loading,
        View::Result { .. } => Pane::Result,
    };
    vec![pane]
}

// ────────────────────────────────────────────────────────────────────────────
// View model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ViewModel {
    pub modal_open: bool,
    /// `None` while the modal is closed.
    pub view: Option<&'static str>,
    pub visible_panes: Vec<Pane>,
    pub key_status: KeyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
    pub download: DownloadView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatusAction {
    Clear,
    Configure,
}

#[derive(Debug, Serialize)]
pub struct KeyStatus {
    pub source: KeySource,
    pub label: String,
    pub action: KeyStatusAction,
    pub action_label: String,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: String,
    pub required: bool,
}

#[derive(Debug, Serialize)]
pub struct ResultView {
    pub markdown: String,
    pub markup: String,
    pub interview_input: bool,
}

#[derive(Debug, Serialize)]
pub struct DownloadView {
    pub busy: bool,
    pub label: String,
}

pub fn key_status(source: KeySource, strings: &Strings) -> KeyStatus {
    match source {
        KeySource::Build | KeySource::Browser => KeyStatus {
            source,
            label: if source == KeySource::Build {
                strings.key_from_build.clone()
            } else {
                strings.key_from_browser.clone()
            },
            action: KeyStatusAction::Clear,
            action_label: strings.clear_key.clone(),
        },
        KeySource::None => KeyStatus {
            source,
            label: strings.no_key.clone(),
            action: KeyStatusAction::Configure,
            action_label: strings.configure_key.clone(),
        },
    }
}

pub fn form_view(kind: FormKind, strings: &Strings) -> FormView {
    match kind {
        FormKind::CoverLetter => FormView {
            kind,
            title: strings.cover_letter.title.clone(),
            fields: vec![
                FieldView {
                    name: "company",
                    label: strings.cover_letter.company_placeholder.clone(),
                    required: true,
                },
                FieldView {
                    name: "role",
                    label: strings.cover_letter.role_placeholder.clone(),
                    required: false,
                },
            ],
        },
        FormKind::GapAnalysis => FormView {
            kind,
            title: strings.gap_analysis.title.clone(),
            fields: vec![FieldView {
                name: "target_role",
                label: strings.gap_analysis.placeholder.clone(),
                required: true,
            }],
        },
    }
}

pub fn download_view(control: &DownloadControl, strings: &Strings) -> DownloadView {
    let busy = control.is_busy();
    DownloadView {
        busy,
        label: if busy {
            strings.generating.clone()
        } else {
            strings.download.clone()
        },
    }
}

/// Markdown → HTML. Raw HTML in the model output is escaped, not passed through.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut markup = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut markup, events);
    markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    #[test]
    fn test_closed_modal_shows_nothing() {
        assert!(visible_panes(false, &View::Loading).is_empty());
    }

    #[test]
    fn test_open_modal_shows_exactly_one_pane() {
        let views = [
            View::Menu,
            View::KeySetup,
            View::InputForm(FormKind::CoverLetter),
            View::InputForm(FormKind::GapAnalysis),
            View::Loading,
            View::Result {
                text: "done".to_string(),
                interview: true,
            },
        ];
        for view in &views {
            assert_eq!(visible_panes(true, view).len(), 1, "{view:?}");
        }
        assert_eq!(
            visible_panes(true, &View::InputForm(FormKind::GapAnalysis)),
            vec![Pane::InputView]
        );
    }

    #[test]
    fn test_key_status_offers_the_matching_action() {
        let strings = Strings::for_locale(Locale::En);

        let status = key_status(KeySource::Build, &strings);
        assert_eq!(status.label, strings.key_from_build);
        assert_eq!(status.action, KeyStatusAction::Clear);

        let status = key_status(KeySource::None, &strings);
        assert_eq!(status.label, strings.no_key);
        assert_eq!(status.action, KeyStatusAction::Configure);
    }

    #[test]
    fn test_cover_letter_form_requires_company_only() {
        let strings = Strings::for_locale(Locale::Es);
        let form = form_view(FormKind::CoverLetter, &strings);
        let required: Vec<_> = form
            .fields
            .iter()
            .map(|f| (f.name, f.required))
            .collect();
        assert_eq!(required, vec![("company", true), ("role", false)]);
        assert_eq!(form.title, strings.cover_letter.title);
    }

    #[test]
    fn test_render_markdown_headings_and_lists() {
        let markup = render_markdown("### Interview Question:\n\n- one\n- two");
        assert!(markup.contains("<h3>Interview Question:</h3>"));
        assert!(markup.contains("<li>one</li>"));
    }

    #[test]
    fn test_render_markdown_escapes_raw_html() {
        let markup = render_markdown("hello <script>alert(1)</script>");
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("&lt;script&gt;"));
    }
}
