//! Prompt construction and answer cleanup.

use crate::types::SearchResult;

/// Placeholder replaced by the user's question.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the retrieved context.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Instruction-style template for small local models.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "<s> [INST] You are a technical assistant good at searching documents. \
Answer using only the provided context. If the context does not contain the answer, say that you do not know. [/INST] </s>
[INST] {input}
       Context: {context}
       Answer:
[/INST]";

/// Join retrieved chunks into a single context block.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.document.content.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill a template in a single pass. Placeholders inside the substituted
/// question or context are never expanded.
pub fn render(template: &str, input: &str, context: &str) -> String {
    let mut out = String::with_capacity(template.len() + input.len() + context.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix(INPUT_PLACEHOLDER) {
            out.push_str(input);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
            out.push_str(context);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Trim model output and drop a leading `Answer:` label the template invites.
pub fn clean_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    let label = "answer:";
    match trimmed.get(..label.len()) {
        Some(head) if head.eq_ignore_ascii_case(label) => trimmed[label.len()..].trim().to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, DocumentMetadata};
    use chrono::Utc;

    fn result(content: &str) -> SearchResult {
        SearchResult {
            document: Document {
                id: "id".to_string(),
                content: content.to_string(),
                metadata: DocumentMetadata {
                    source: "pdf/a.pdf".to_string(),
                    page: 0,
                    chunk_index: 0,
                    created_at: Utc::now(),
                },
                embedding: None,
            },
            score: 0.9,
        }
    }

    #[test]
    fn test_default_template_has_placeholders() {
        assert!(DEFAULT_PROMPT_TEMPLATE.contains(INPUT_PLACEHOLDER));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains(CONTEXT_PLACEHOLDER));
    }

    #[test]
    fn test_render_substitutes_both() {
        let prompt = render("Q={input} C={context}", "why?", "because");
        assert_eq!(prompt, "Q=why? C=because");
    }

    #[test]
    fn test_render_does_not_expand_question_text() {
        let prompt = render("Q={input} C={context}", "what is {context}?", "ctx");
        assert_eq!(prompt, "Q=what is {context}? C=ctx");
    }

    #[test]
    fn test_render_does_not_expand_context_text() {
        let prompt = render("Q={input} C={context}", "why?", "see {input} in {braces}");
        assert_eq!(prompt, "Q=why? C=see {input} in {braces}");
    }

    #[test]
    fn test_render_keeps_stray_braces() {
        let prompt = render("{ {input}} {other} {", "q", "c");
        assert_eq!(prompt, "{ q} {other} {");
    }

    #[test]
    fn test_format_context_skips_blank_chunks() {
        let ctx = format_context(&[result(" first "), result("   "), result("second")]);
        assert_eq!(ctx, "first\n\nsecond");
    }

    #[test]
    fn test_clean_answer() {
        assert_eq!(clean_answer("  Paris.\n"), "Paris.");
        assert_eq!(clean_answer("Answer: Paris."), "Paris.");
        assert_eq!(clean_answer("ANSWER:\n  Paris."), "Paris.");
        assert_eq!(clean_answer("Answers vary."), "Answers vary.");
        assert_eq!(clean_answer(""), "");
    }

    #[test]
    fn test_clean_answer_multibyte_prefix() {
        assert_eq!(clean_answer("éé réponse"), "éé réponse");
    }
}
