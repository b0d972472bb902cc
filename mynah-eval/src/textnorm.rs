//! English text normalization applied before scoring.
//!
//! References and hypotheses go through the same canonical form: lowercase,
//! annotation markers removed, punctuation stripped, whitespace collapsed.
//! The transform is idempotent, so already-normalized manifests can be
//! re-scored safely.

/// Normalize a transcript for WER scoring.
pub fn normalize(text: &str) -> String {
    let text = strip_markers(text);
    let chars: Vec<char> = text.chars().collect();

    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if c == '\''
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric())
        {
            // Keep intra-word apostrophes: don't, it's
            out.push('\'');
        } else {
            out.push(' ');
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove bracketed and parenthesized annotation spans like `[noise]` or
/// `(laughs)`. Only spans that actually close are elided; unmatched openers
/// and closers are left as plain punctuation.
fn strip_markers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut elided = vec![false; chars.len()];
    let mut bracket_starts = Vec::new();
    let mut paren_starts = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '[' => bracket_starts.push(i),
            ']' => {
                if let Some(start) = bracket_starts.pop() {
                    elided[start..=i].fill(true);
                }
            }
            '(' => paren_starts.push(i),
            ')' => {
                if let Some(start) = paren_starts.pop() {
                    elided[start..=i].fill(true);
                }
            }
            _ => {}
        }
    }

    chars
        .iter()
        .zip(&elided)
        .map(|(&c, &gone)| if gone { ' ' } else { c })
        .collect()
}
