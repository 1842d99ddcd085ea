//! Prompt assembly for persona-conditioned generation.
//!
//! The user content orders its sections persona → retrieved context →
//! question, so the model reads the framing before the facts before the ask.
//! Nothing is truncated here.

/// The two prompt parts handed to the generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system_instruction: String,
    pub user_content: String,
}

/// Combine a persona directive, a context block, and the raw query.
pub fn assemble(
    persona_instruction: &str,
    context_block: &str,
    user_query: &str,
    persona_label: &str,
) -> AssembledPrompt {
    let user_content = format!(
        "
You are an AI persona.

Persona Style: {persona_label}

RAG Context:
{context_block}

User Query:
{user_query}
"
    );

    AssembledPrompt {
        system_instruction: persona_instruction.to_string(),
        user_content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_is_verbatim() {
        let prompt = assemble("Respond neutrally.", "- fact", "why?", "neutral");
        assert_eq!(prompt.system_instruction, "Respond neutrally.");
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let prompt = assemble("x", "- Hello, visitor", "hello", "optimistic");
        let text = &prompt.user_content;

        let persona = text.find("Persona Style: optimistic").unwrap();
        let context = text.find("RAG Context:\n- Hello, visitor").unwrap();
        let query = text.find("User Query:\nhello").unwrap();
        assert!(persona < context && context < query);
        assert!(text.starts_with("\nYou are an AI persona.\n"));
    }

    #[test]
    fn assembly_is_deterministic_and_untruncated() {
        let long_query = "q".repeat(50_000);
        let a = assemble("x", "ctx", &long_query, "neutral");
        let b = assemble("x", "ctx", &long_query, "neutral");
        assert_eq!(a, b);
        assert!(a.user_content.contains(&long_query));
    }
}
