//! Persona directive table.
//!
//! Maps a persona label to the fixed system instruction that conditions the
//! tone of the answer. Lookup is total: any unknown label, including the
//! empty string, falls back to the default directive.

/// An immutable label → instruction pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaDirective {
    pub label: &'static str,
    pub instruction: &'static str,
}

/// The recognized personas. Labels match exactly (case-sensitive).
pub const DIRECTIVES: &[PersonaDirective] = &[
    PersonaDirective {
        label: "optimistic",
        instruction: "Respond with positivity, possibility-thinking, and supportive encouragement.",
    },
    PersonaDirective {
        label: "pessimistic",
        instruction: "Respond with caution, skepticism, and highlight risks or potential downsides.",
    },
    PersonaDirective {
        label: "neutral",
        instruction: "Respond with balanced, factual, even-toned reasoning with no emotional charge.",
    },
];

/// Used for every label not in [`DIRECTIVES`].
pub const DEFAULT_DIRECTIVE: PersonaDirective = PersonaDirective {
    label: "default",
    instruction: "Respond neutrally.",
};

/// Find the directive for `label`.
pub fn directive(label: &str) -> &'static PersonaDirective {
    DIRECTIVES
        .iter()
        .find(|d| d.label == label)
        .unwrap_or(&DEFAULT_DIRECTIVE)
}

/// Resolve a persona label to its instruction string.
pub fn resolve(label: &str) -> &'static str {
    directive(label).instruction
}
