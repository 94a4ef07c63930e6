/*!
 * Cleanup of model replies before they are written to disk.
 */

use regex::Regex;
use std::sync::LazyLock;

/// A reply wrapped whole in a ```markdown (or bare ```) fence
static WRAPPING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*```(markdown|md)?[ \t]*\r?\n(.*?)\r?\n[ \t]*```\s*\z")
        .expect("fence pattern is valid")
});

/// Unwrap a reply the model wrapped in a single markdown code fence.
///
/// A bare ``` wrapper is only removed when the inner text has no fences of
/// its own, otherwise the outer backticks may belong to the document's code
/// blocks. A ```markdown wrapper needs balanced inner fences.
pub fn strip_code_fence(reply: &str) -> &str {
    let Some(captures) = WRAPPING_FENCE.captures(reply) else {
        return reply;
    };
    let Some(inner) = captures.get(2) else {
        return reply;
    };
    let tagged = captures.get(1).is_some();

    let inner_fences = inner.as_str()
        .lines()
        .filter(|line| line.trim_start().starts_with("```"))
        .count();

    let unwrap = if tagged {
        inner_fences % 2 == 0
    } else {
        inner_fences == 0
    };

    if unwrap { inner.as_str() } else { reply }
}
