use crate::api::Completion;

/// Formats a finished completion the way the CLI prints it: the text first,
/// then a usage block that also shows the limit the request was sent with.
pub fn render_completion(completion: &Completion, max_tokens: u32) -> String {
    let usage = &completion.usage;
    format!(
        "Response:\n{}\n\n---\nToken Usage:\n  Prompt tokens: {}\n  Completion tokens: {}\n  Total tokens: {}\n  Max tokens (limit): {}\n",
        completion.text,
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total_tokens,
        max_tokens
    )
}
