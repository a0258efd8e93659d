//! Judge verdict parsing for the vote and filter operations.
//!
//! These functions extract structured selections from free-form LLM judge
//! responses. They are pure domain logic — no I/O, no session management,
//! just text pattern matching.
//!
//! # Functions
//!
//! | Function | Use Case | Accepted forms |
//! |----------|----------|----------------|
//! | [`parse_choice`] | Vote: pick one winner | JSON `{"choice": N}`, "Response B", standalone number |
//! | [`parse_selection`] | Filter: keep a subset | JSON `{"keep": [...]}`, "Response A, Response C", numbers |
//!
//! All indices returned are 0-based positions into the candidate set the
//! judge was shown; out-of-range references are discarded. Callers apply
//! their own deterministic fallback when nothing parses.

/// Parse a vote verdict into the index of the chosen candidate.
///
/// Tries, in order:
/// 1. JSON: `{"choice": 2}` (1-based) or `{"choice": "Response B"}`
/// 2. A "Response X" label (letter or 1-based number)
/// 3. A standalone number between 1 and `count`
///
/// Returns `None` when no candidate reference is found — the caller
/// decides the fallback.
pub fn parse_choice(response: &str, count: usize) -> Option<usize> {
    if let Some(json) = extract_json(response) {
        if let Some(value) = json.get("choice") {
            if let Some(idx) = json_candidate_index(value, count) {
                return Some(idx);
            }
        }
    }

    if let Some(&idx) = scan_labels(response, count).first() {
        return Some(idx);
    }

    scan_numbers(response, count).first().copied()
}

/// Parse a filter verdict into the indices of the candidates to keep.
///
/// Tries, in order:
/// 1. JSON: `{"keep": [1, 3]}` (1-based) or `{"keep": ["Response A"]}`
/// 2. All "Response X" labels in the text
/// 3. All standalone numbers between 1 and `count`
///
/// The result is deduplicated and sorted ascending, so the kept subset
/// preserves the original candidate order. An empty result means the
/// verdict named nothing — the caller decides the fallback.
pub fn parse_selection(response: &str, count: usize) -> Vec<usize> {
    let json = extract_json(response);
    let mut indices = if let Some(keep) = json
        .as_ref()
        .and_then(|json| json.get("keep"))
        .and_then(|v| v.as_array())
    {
        keep.iter()
            .filter_map(|v| json_candidate_index(v, count))
            .collect()
    } else {
        let labels = scan_labels(response, count);
        if labels.is_empty() {
            scan_numbers(response, count)
        } else {
            labels
        }
    };

    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Find an embedded JSON object in a free-form response
fn extract_json(response: &str) -> Option<serde_json::Value> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    serde_json::from_str(&response[start..start + end + 1]).ok()
}

/// Interpret one JSON value as a candidate reference
fn json_candidate_index(value: &serde_json::Value, count: usize) -> Option<usize> {
    match value {
        serde_json::Value::Number(n) => {
            let n = n.as_u64()? as usize;
            (1..=count).contains(&n).then(|| n - 1)
        }
        serde_json::Value::String(s) => label_index(s, count),
        _ => None,
    }
}

/// "Response B" / "response 2" / "B" → index
fn label_index(s: &str, count: usize) -> Option<usize> {
    let s = s.trim();
    let tail = s
        .to_lowercase()
        .strip_prefix("response")
        .map(|t| t.trim_start().to_string())
        .unwrap_or_else(|| s.to_lowercase());

    let mut chars = tail.chars();
    let first = chars.next()?;
    if first.is_ascii_lowercase() && chars.next().is_none() {
        let idx = (first as u8 - b'a') as usize;
        return (idx < count).then_some(idx);
    }
    let n: usize = tail.parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

/// All "Response X" references in the text, in order of appearance
fn scan_labels(response: &str, count: usize) -> Vec<usize> {
    let lower = response.to_lowercase();
    let mut found = Vec::new();
    let mut rest = lower.as_str();

    while let Some(pos) = rest.find("response") {
        let after = rest[pos + "response".len()..].trim_start();
        let mut chars = after.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {
                // Single-letter label; reject when it's just the start of a word
                let is_word = chars.next().is_some_and(|n| n.is_ascii_alphanumeric());
                let idx = (c as u8 - b'a') as usize;
                if !is_word && idx < count {
                    found.push(idx);
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
                if let Ok(n) = digits.parse::<usize>()
                    && (1..=count).contains(&n)
                {
                    found.push(n - 1);
                }
            }
            _ => {}
        }
        rest = &rest[pos + "response".len()..];
    }
    found
}

/// All standalone in-range numbers in the text, in order of appearance
fn scan_numbers(response: &str, count: usize) -> Vec<usize> {
    response
        .split_whitespace()
        .filter_map(|word| {
            word.trim_matches(|c: char| c.is_ascii_punctuation())
                .parse::<usize>()
                .ok()
        })
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
        .collect()
}
