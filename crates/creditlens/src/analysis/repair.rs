//! Best-effort recovery of JSON emitted by a language model.
//!
//! Each stage is a plain string transformation so it can be exercised on its
//! own. Stages that rewrite syntax (arithmetic folding, trailing commas, bare
//! keys) only touch text outside string literals.

use serde_json::Value;

/// Reason the repaired text could not be turned into a JSON object.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("no JSON object found in model response")]
    NoObject,
    #[error("repaired payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("repaired payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Run every stage in order and parse the result.
pub fn repair(raw: &str) -> Result<Value, RepairError> {
    let object = extract_object(raw).ok_or(RepairError::NoObject)?;
    let text = strip_fences(object);
    let text = fold_arithmetic(&text);
    let text = remove_trailing_commas(&text);
    let text = quote_bare_keys(&text);
    let text = strip_control_chars(&text);

    let value: Value = serde_json::from_str(text.trim())?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Array(_) => Err(RepairError::NotAnObject("array")),
        Value::String(_) => Err(RepairError::NotAnObject("string")),
        Value::Number(_) => Err(RepairError::NotAnObject("number")),
        Value::Bool(_) => Err(RepairError::NotAnObject("boolean")),
        Value::Null => Err(RepairError::NotAnObject("null")),
    }
}

/// Span from the first `{` to the last `}`, discarding surrounding prose.
pub fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Replace `<number><op><number>` runs with their evaluated value.
///
/// Chains fold left to right without operator precedence (`2+3*4` is 20).
/// A zero divisor leaves the left operand unchanged. A chain whose next step
/// would overflow to a non-finite value stops folding at that step.
pub fn fold_arithmetic(text: &str) -> String {
    map_code(text, fold_code)
}

pub fn remove_trailing_commas(text: &str) -> String {
    map_code(text, |code| {
        let mut out = String::with_capacity(code.len());
        for (idx, ch) in code.char_indices() {
            if ch == ',' {
                let rest = code[idx + 1..].trim_start();
                if rest.starts_with('}') || rest.starts_with(']') {
                    continue;
                }
            }
            out.push(ch);
        }
        out
    })
}

/// Quote identifiers that appear in key position (`{key:` or `, key:`).
pub fn quote_bare_keys(text: &str) -> String {
    map_code(text, |code| {
        let mut out = String::with_capacity(code.len() + 8);
        let mut expect_key = false;
        let mut chars = code.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if expect_key && is_ident_char(ch) {
                let mut end = idx + ch.len_utf8();
                while let Some(&(next_idx, next)) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    end = next_idx + next.len_utf8();
                    chars.next();
                }
                let ident = &code[idx..end];
                if code[end..].trim_start().starts_with(':') {
                    out.push('"');
                    out.push_str(ident);
                    out.push('"');
                } else {
                    out.push_str(ident);
                }
                expect_key = false;
                continue;
            }

            match ch {
                '{' | ',' => expect_key = true,
                c if c.is_whitespace() => {}
                _ => expect_key = false,
            }
            out.push(ch);
        }
        out
    })
}

/// Drop C0 and C1 control characters, including raw newlines.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(*ch as u32, 0x00..=0x1F | 0x7F..=0x9F))
        .collect()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Apply `transform` to every run of text outside string literals.
fn map_code<F>(text: &str, transform: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut code_start = 0;
    let mut literal_start = None;
    let mut escape = false;

    for (idx, ch) in text.char_indices() {
        match literal_start {
            Some(start) => {
                if escape {
                    escape = false;
                } else if ch == '\\' {
                    escape = true;
                } else if ch == '"' {
                    out.push_str(&text[start..=idx]);
                    literal_start = None;
                    code_start = idx + 1;
                }
            }
            None => {
                if ch == '"' {
                    out.push_str(&transform(&text[code_start..idx]));
                    literal_start = Some(idx);
                }
            }
        }
    }

    match literal_start {
        Some(start) => out.push_str(&text[start..]),
        None => out.push_str(&transform(&text[code_start..])),
    }
    out
}

fn fold_code(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut idx = 0;

    while idx < code.len() {
        if let Some((mut value, mut end)) = operand_at(code, idx) {
            let start = idx;
            let mut folded = false;

            while let Some((op, rhs_start)) = operator_after(code, end) {
                let Some((rhs, rhs_end)) = unsigned_number(code, rhs_start) else {
                    break;
                };
                if code[rhs_end..]
                    .chars()
                    .next()
                    .is_some_and(|next| is_ident_char(next) || next == '.')
                {
                    break;
                }
                let Some(result) = apply(value, op, rhs) else {
                    break;
                };
                value = result;
                end = rhs_end;
                folded = true;
            }

            if folded {
                out.push_str(&value.to_string());
            } else {
                out.push_str(&code[start..end]);
            }
            idx = end;
            continue;
        }

        let Some(ch) = code[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }

    out
}

/// Number starting at `idx` that may begin an expression.
///
/// A leading `-` counts as a sign only after `:`, `,`, `[`, `(` or at the
/// start of the run. Digits glued to an identifier (`a1`, `1e5`) are skipped.
fn operand_at(code: &str, idx: usize) -> Option<(f64, usize)> {
    let before = code[..idx].chars().next_back();
    if before.is_some_and(|prev| is_ident_char(prev) || prev == '.') {
        return None;
    }

    let rest = &code[idx..];
    if let Some(unsigned) = rest.strip_prefix('-') {
        if !unsigned.starts_with(|ch: char| ch.is_ascii_digit()) {
            return None;
        }
        let sign_allowed = code[..idx]
            .trim_end()
            .chars()
            .next_back()
            .map_or(true, |prev| matches!(prev, ':' | ',' | '[' | '('));
        if !sign_allowed {
            return None;
        }
        let (value, end) = unsigned_number(code, idx + 1)?;
        return Some((-value, end));
    }

    unsigned_number(code, idx)
}

/// `\d+\.?\d*` starting exactly at `idx`.
fn unsigned_number(code: &str, idx: usize) -> Option<(f64, usize)> {
    let bytes = code.as_bytes();
    let mut end = idx;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == idx {
        return None;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    code[idx..end].parse::<f64>().ok().map(|value| (value, end))
}

fn operator_after(code: &str, idx: usize) -> Option<(char, usize)> {
    let rest = &code[idx..];
    let trimmed = rest.trim_start();
    let op = trimmed.chars().next()?;
    if !matches!(op, '+' | '-' | '*' | '/') {
        return None;
    }
    let after_op = &trimmed[op.len_utf8()..];
    let operand = after_op.trim_start();
    let rhs_start = code.len() - operand.len();
    Some((op, rhs_start))
}

fn apply(lhs: f64, op: char, rhs: f64) -> Option<f64> {
    let result = match op {
        '+' => lhs + rhs,
        '-' => lhs - rhs,
        '*' => lhs * rhs,
        '/' if rhs == 0.0 => lhs,
        '/' => lhs / rhs,
        _ => return None,
    };
    result.is_finite().then_some(result)
}
