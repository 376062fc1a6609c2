//! Prompt construction for statement generation.

use std::fmt::Write as _;

use super::GenerationRequest;

/// Builds the system prompt: identity, duties, case, phase, and the role's
/// closing instruction.
#[must_use]
pub fn system_prompt(request: &GenerationRequest) -> String {
    let profile = request.role.profile();
    let mut prompt = format!(
        "You are {}, a {} in a mock courtroom simulation. {}\n\nYour role is to:\n",
        request.speaker_name, request.role_description, request.personality
    );
    for duty in profile.duties {
        let _ = writeln!(prompt, "- {duty}");
    }
    let _ = write!(
        prompt,
        "\nCase Context: {}\nCurrent Phase: {}\n\n{}",
        request.case_context, request.phase_label, profile.closing_instruction
    );
    prompt
}

/// Builds the user message: case, recent conversation, and the ask.
#[must_use]
pub fn user_content(request: &GenerationRequest) -> String {
    let conversation = request
        .prior_transcript_excerpt
        .iter()
        .map(|line| format!("{}: {}", line.speaker_name, line.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nPrevious conversation:\n{}\n\nPlease provide your {} response.",
        request.case_context, conversation, request.phase_label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::Role;
    use crate::generation::ExcerptLine;

    fn request() -> GenerationRequest {
        GenerationRequest {
            speaker_name: "Attorney Sarah Chen".to_string(),
            role: Role::CounselPlaintiff,
            role_description: "plaintiff's counsel".to_string(),
            personality: "Passionate.".to_string(),
            case_context: "Food went missing.".to_string(),
            prior_transcript_excerpt: vec![
                ExcerptLine {
                    speaker_name: "Judge Martinez".to_string(),
                    content: "Order.".to_string(),
                },
                ExcerptLine {
                    speaker_name: "Attorney Michael Torres".to_string(),
                    content: "Objection.".to_string(),
                },
            ],
            phase_label: "Closing Arguments".to_string(),
        }
    }

    #[test]
    fn system_prompt_names_speaker_duties_and_phase() {
        let prompt = system_prompt(&request());
        assert!(prompt.starts_with(
            "You are Attorney Sarah Chen, a plaintiff's counsel in a mock courtroom simulation. Passionate."
        ));
        assert!(prompt.contains("- Advocate strongly for the plaintiff's position\n"));
        assert!(prompt.contains("Case Context: Food went missing.\nCurrent Phase: Closing Arguments"));
        assert!(prompt.ends_with(Role::CounselPlaintiff.profile().closing_instruction));
    }

    #[test]
    fn user_content_lists_conversation_in_order() {
        assert_eq!(
            user_content(&request()),
            "Food went missing.\n\nPrevious conversation:\nJudge Martinez: Order.\n\
             Attorney Michael Torres: Objection.\n\nPlease provide your Closing Arguments response."
        );
    }
}
