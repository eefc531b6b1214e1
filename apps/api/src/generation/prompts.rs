// Prompt templates for the generation endpoints.
// Placeholders are `{name}` style and replaced before sending; user-supplied
// content is always substituted last.

use serde::Deserialize;

/// Replace `{name}`, `{title}`, `{skills}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "Craft a 3-4 sentence professional summary for {name} as {title}. Highlight key skills: {skills}.";

/// Replace `{role}`, `{company}`.
pub const DETAILS_PROMPT_TEMPLATE: &str = "Write 3-5 bullet points (concise, impact-driven) for the role {role} at {company}. Include metrics if reasonable.";

pub const FIX_GRAMMAR_PROMPT: &str = "Fix any grammar, spelling, and punctuation errors in the following text. Keep the same meaning and tone. Only return the corrected text.\n\n{content}";

pub const EXPAND_PROMPT: &str = "Expand and elaborate on the following text to make it more detailed and comprehensive while maintaining the original meaning and tone. Only return the expanded text.\n\n{content}";

pub const SHORTEN_PROMPT: &str = "Make the following text more concise while preserving the key information and meaning. Only return the shortened text.\n\n{content}";

pub const REFINE_TONE_PROMPT: &str = "Refine the following text to have a more professional and polished tone. Make it sound more impressive and engaging. Only return the refined text.\n\n{content}";

pub const CUSTOM_PROMPT: &str = "{instruction}\n\nHere's the current text to work with:\n{content}";

/// Replace `{tone}`, `{role}`, `{company}`, `{highlights}`, `{resume_text}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "Write a {tone} cover letter for the role \"{role}\" at \"{company}\". Use the candidate highlights: {highlights}. Base it on this resume:\n{resume_text}. Keep it concise (200-300 words).";

pub const DEFAULT_TONE: &str = "professional";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistAction {
    FixGrammar,
    Expand,
    Shorten,
    RefineTone,
    Custom,
}

pub fn summary_prompt(full_name: &str, title: &str, skills: &str) -> String {
    let name = match full_name.trim() {
        "" => "a candidate",
        name => name,
    };
    SUMMARY_PROMPT_TEMPLATE
        .replace("{name}", name)
        .replace("{title}", title)
        .replace("{skills}", skills)
}

pub fn details_prompt(role: &str, company: &str) -> String {
    DETAILS_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{company}", company)
}

/// `instruction` is only used by `AssistAction::Custom`.
pub fn assist_prompt(action: AssistAction, content: &str, instruction: &str) -> String {
    let template = match action {
        AssistAction::FixGrammar => FIX_GRAMMAR_PROMPT,
        AssistAction::Expand => EXPAND_PROMPT,
        AssistAction::Shorten => SHORTEN_PROMPT,
        AssistAction::RefineTone => REFINE_TONE_PROMPT,
        AssistAction::Custom => {
            return CUSTOM_PROMPT
                .replacen("{instruction}", instruction, 1)
                .replacen("{content}", content, 1);
        }
    };
    template.replace("{content}", content)
}

pub fn cover_letter_prompt(
    role: &str,
    company: &str,
    highlights: &str,
    resume_text: &str,
    tone: Option<&str>,
) -> String {
    let tone = tone
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TONE);
    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{tone}", tone)
        .replace("{role}", role)
        .replace("{company}", company)
        .replace("{highlights}", highlights)
        .replace("{resume_text}", resume_text)
}
