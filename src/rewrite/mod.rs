//! Section rewriting and summary generation through a text-completion backend.
//!
//! Backend failures never reach the caller of [`Rewriter::improve_section`]:
//! the original text comes back unchanged and the failure is logged.

#[cfg(feature = "gemini")]
mod gemini;
mod prompts;

#[cfg(feature = "gemini")]
pub use gemini::{DEFAULT_MODEL, GeminiClient};

use crate::error::{Error, Result};
use crate::model::Resume;

/// Something that turns a prompt into generated text.
pub trait TextCompletion {
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<C: TextCompletion + ?Sized> TextCompletion for &C {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

impl<C: TextCompletion + ?Sized> TextCompletion for Box<C> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

pub struct Rewriter<C> {
    backend: C,
}

impl<C: TextCompletion> Rewriter<C> {
    pub fn new(backend: C) -> Self {
        Rewriter { backend }
    }

    fn ask(&self, what: &str, prompt: &str) -> Option<String> {
        log::debug!("Sending prompt for {what} ({} chars)", prompt.len());
        match self.backend.complete(prompt) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    log::warn!("Received empty response for {what}");
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Err(e) => {
                log::error!("Completion for {what} failed: {e}");
                None
            }
        }
    }

    /// Rewrite `content` as a more professional version of the named
    /// section. Returns `content` itself when the backend fails or answers
    /// with nothing.
    pub fn improve_section(&self, section: &str, content: &str) -> String {
        self.ask(section, &prompts::improve_section(section, content))
            .unwrap_or_else(|| content.to_string())
    }

    /// Draft a professional summary from the resume's contact line,
    /// experiences and skills. Needs at least one experience and one skill.
    pub fn generate_summary(&self, resume: &Resume) -> Option<String> {
        if resume.experiences.is_empty() || resume.skills.is_empty() {
            log::warn!(
                "Not enough data to generate summary: {} experiences, {} skills",
                resume.experiences.len(),
                resume.skills.len()
            );
            return None;
        }
        let info = &resume.personal_info;
        let personal = format!("{}, {}", info.full_name, info.email);
        let experiences = resume
            .experiences
            .iter()
            .map(|e| format!("{} at {}: {}", e.job_title, e.company, e.description))
            .collect::<Vec<_>>()
            .join("\n");
        let skills = resume
            .skills
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.ask("summary", &prompts::summary(&personal, &experiences, &skills))
    }

    /// Rewrite one experience description in place. Errors only when no
    /// experience has `experience_id`; a failed rewrite keeps the old text.
    pub fn improve_experience(&self, resume: &mut Resume, experience_id: &str) -> Result<()> {
        let experience = resume
            .experiences
            .iter_mut()
            .find(|e| e.id == experience_id)
            .ok_or_else(|| Error::Config(format!("no experience with id {experience_id:?}")))?;
        experience.description = self.improve_section("work experience", &experience.description);
        Ok(())
    }
}
