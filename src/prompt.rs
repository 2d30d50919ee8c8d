use crate::direction::Direction;
use crate::glossary::Glossary;

pub const CODING_CONTEXT: &str = "Coding context: This is a programming context translation. Technical terms should be translated accurately using standard programming terminology.";

/// Build the instruction prompt for the backend.
///
/// The instruction line is followed by exactly two blank lines before the
/// payload; the model's output conventions rely on that layout. A glossary
/// hint for `direction`, if any, goes after the payload.
pub fn build_prompt(text: &str, direction: Direction, glossary: &Glossary) -> String {
    let lang = direction.languages();

    let mut prompt = format!(
        "You are a professional {} ({}) to {} ({}) translator. Translate the following text accurately while preserving technical meaning and context.\n\n\n{}",
        lang.source_lang, lang.source_code, lang.target_lang, lang.target_code, text
    );

    let hint = glossary.build_hint(direction);
    if !hint.is_empty() {
        prompt.push('\n');
        prompt.push_str(CODING_CONTEXT);
        prompt.push_str("\nGlossary:\n");
        prompt.push_str(&hint);
    }

    prompt
}
