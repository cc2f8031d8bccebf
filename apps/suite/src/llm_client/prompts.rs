// Prompt templates for the career suite actions.
// Each template is filled by one-pass `{placeholder}` substitution; callers treat
// the rendered string as opaque and send it as-is.

use crate::i18n::Locale;

/// One set of templates per locale. Placeholders: `{cv_text}`, `{company}`,
/// `{role}`, `{target_role}`, `{question}`, `{answer}`.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub elevator_pitch: &'static str,
    pub mock_interview: &'static str,
    pub answer_feedback: &'static str,
    pub cover_letter: &'static str,
    pub gap_analysis: &'static str,
}

impl PromptTemplates {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => EN,
            Locale::Es => ES,
        }
    }

    pub fn render_elevator_pitch(&self, cv_text: &str) -> String {
        fill(self.elevator_pitch, &[("cv_text", cv_text)])
    }

    pub fn render_mock_interview(&self, cv_text: &str) -> String {
        fill(self.mock_interview, &[("cv_text", cv_text)])
    }

    pub fn render_answer_feedback(&self, question: &str, answer: &str) -> String {
        fill(
            self.answer_feedback,
            &[("question", question), ("answer", answer)],
        )
    }

    /// `role` may be empty; the template reads naturally either way.
    pub fn render_cover_letter(&self, company: &str, role: &str, cv_text: &str) -> String {
        fill(
            self.cover_letter,
            &[("company", company), ("role", role), ("cv_text", cv_text)],
        )
    }

    pub fn render_gap_analysis(&self, target_role: &str, cv_text: &str) -> String {
        fill(
            self.gap_analysis,
            &[("target_role", target_role), ("cv_text", cv_text)],
        )
    }
}

/// Substitutes `{name}` placeholders in one pass over `template`. Inserted
/// values are copied verbatim and never scanned for placeholders themselves.
/// Unknown `{...}` sequences are left as they are.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const EN: PromptTemplates = PromptTemplates {
    elevator_pitch: "Write a confident, first-person elevator pitch of about 30 seconds \
        (under 120 words) for the candidate whose résumé follows. \
        Highlight their strongest, most distinctive achievements. \
        Use Markdown.\n\nRÉSUMÉ:\n{cv_text}",
    mock_interview: "You are a senior technical interviewer. Based on the résumé below, \
        ask ONE challenging but fair interview question tailored to the candidate's experience. \
        Return only the question, with no preamble.\n\nRÉSUMÉ:\n{cv_text}",
    answer_feedback: "You are a senior technical interviewer giving feedback.\n\n\
        QUESTION:\n{question}\n\nCANDIDATE ANSWER:\n{answer}\n\n\
        Evaluate the answer: list its strengths, what is missing, and give a score from 1 to 10. \
        Finish with a stronger example answer. Use Markdown.",
    cover_letter: "Write a concise, professional cover letter (under 300 words) for the \
        candidate whose résumé follows, applying to {company} for the role: {role}. \
        If the role is blank, infer the best-fitting role from the résumé. \
        Only mention facts present in the résumé. Use Markdown.\n\nRÉSUMÉ:\n{cv_text}",
    gap_analysis: "Compare the résumé below against the target role \"{target_role}\". \
        List the skills and experience the candidate already has for it, the most important \
        gaps, and a short, concrete learning plan to close each gap. Use Markdown.\n\n\
        RÉSUMÉ:\n{cv_text}",
};

const ES: PromptTemplates = PromptTemplates {
    elevator_pitch: "Escribe un elevator pitch seguro, en primera persona y de unos 30 segundos \
        (menos de 120 palabras) para la persona cuyo currículum aparece a continuación. \
        Destaca sus logros más fuertes y distintivos. Usa Markdown.\n\nCURRÍCULUM:\n{cv_text}",
    mock_interview: "Eres un entrevistador técnico sénior. A partir del currículum, \
        formula UNA pregunta de entrevista exigente pero justa, adaptada a su experiencia. \
        Devuelve solo la pregunta, sin introducción.\n\nCURRÍCULUM:\n{cv_text}",
    answer_feedback: "Eres un entrevistador técnico sénior que da retroalimentación.\n\n\
        PREGUNTA:\n{question}\n\nRESPUESTA DEL CANDIDATO:\n{answer}\n\n\
        Evalúa la respuesta: enumera sus fortalezas, lo que falta y da una puntuación del 1 al 10. \
        Termina con un ejemplo de respuesta mejor. Usa Markdown.",
    cover_letter: "Escribe una carta de presentación concisa y profesional (menos de 300 palabras) \
        para la persona cuyo currículum aparece a continuación, dirigida a {company} para el \
        puesto: {role}. Si el puesto está vacío, deduce el más adecuado a partir del currículum. \
        Menciona solo hechos presentes en el currículum. Usa Markdown.\n\nCURRÍCULUM:\n{cv_text}",
    gap_analysis: "Compara el currículum con el puesto objetivo \"{target_role}\". \
        Enumera las habilidades y experiencia que ya tiene, las brechas más importantes y un \
        plan de aprendizaje breve y concreto para cerrar cada una. Usa Markdown.\n\n\
        CURRÍCULUM:\n{cv_text}",
};
