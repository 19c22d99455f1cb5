//! Prompt assembly
//!
//! Retrieved chunk texts are joined with a fixed separator and substituted,
//! together with the question, into a fixed template. Nothing is truncated.

/// Separator placed between consecutive context chunks
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Template with `{context}` and `{question}` slots
pub const PROMPT_TEMPLATE: &str = "Answer the question based only on the following context:\n\n{context}\n\n---\n\nAnswer the question based on the above context: {question}";

/// Join chunk texts into a single context block
pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Fill the template with the joined context and the question
pub fn build_prompt<S: AsRef<str>>(chunks: &[S], question: &str) -> String {
    let context = build_context(chunks);
    // Question first, so placeholders inside chunk text stay literal
    PROMPT_TEMPLATE
        .replacen("{question}", question, 1)
        .replacen("{context}", &context, 1)
}
