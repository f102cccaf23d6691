//! Template source scanner.
//!
//! Splits the source into literal text and `{{ ... }}` actions. Supported
//! actions are `.Field`, comments (`/* ... */`), string constants
//! (`"..."` or `` `...` ``, used to emit a literal `{{`) and the `-` trim
//! markers.

use super::{Node, TemplateError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Whitespace recognised next to delimiters and removed by trim markers.
const SPACE: [char; 4] = [' ', '\t', '\r', '\n'];

/// Parse `source` into a node list.
pub(super) fn parse(source: &str) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;

    while let Some(rel) = source[pos..].find(OPEN) {
        let open_at = pos + rel;
        push_text(&mut nodes, &source[pos..open_at], trim_next);

        let mut cursor = open_at + OPEN.len();
        if has_trim_marker(&source[cursor..]) {
            trim_last_text(&mut nodes);
            cursor += 1;
        }

        let (body_end, close_end, trim_right) = find_close(source, open_at, cursor)?;
        let body = source[cursor..body_end].trim_matches(SPACE);
        if let Some(node) = parse_action(source, open_at, body)? {
            nodes.push(node);
        }

        trim_next = trim_right;
        pos = close_end;
    }

    push_text(&mut nodes, &source[pos..], trim_next);
    Ok(nodes)
}

/// Interpret the trimmed body of one action.
fn parse_action(source: &str, open_at: usize, body: &str) -> Result<Option<Node>, TemplateError> {
    let (line, column) = position(source, open_at);

    if body.starts_with("/*") {
        if body.len() >= 4 && body.ends_with("*/") {
            return Ok(None);
        }
        return Err(TemplateError::parse(line, column, "unclosed comment"));
    }

    if body.is_empty() {
        return Err(TemplateError::parse(line, column, "missing value for action"));
    }

    if body.starts_with('"') {
        return unquote(body)
            .map(|text| Some(Node::Literal(text)))
            .ok_or_else(|| TemplateError::parse(line, column, "malformed quoted string"));
    }

    if let Some(raw) = body.strip_prefix('`') {
        return match raw.strip_suffix('`') {
            Some(text) if !text.contains('`') => Ok(Some(Node::Literal(text.to_string()))),
            _ => Err(TemplateError::parse(line, column, "malformed raw string")),
        };
    }

    let Some(name) = body.strip_prefix('.') else {
        return Err(TemplateError::parse(
            line,
            column,
            format!("unsupported action '{}'", body),
        ));
    };

    if !is_identifier(name) {
        return Err(TemplateError::parse(
            line,
            column,
            format!("invalid field reference '.{}'", name),
        ));
    }

    Ok(Some(Node::Field {
        name: name.to_string(),
        line,
    }))
}

/// Locate the closing delimiter for the action opened at `open_at`.
///
/// Returns (end of action body, end of closing delimiter, right trim marker).
fn find_close(
    source: &str,
    open_at: usize,
    body_start: usize,
) -> Result<(usize, usize, bool), TemplateError> {
    let rest = &source[body_start..];
    let trimmed = rest.trim_start_matches(SPACE);
    let lead = rest.len() - trimmed.len();

    // Comments and string constants may contain "}}"; skip past them first.
    let skip = if let Some(comment) = trimmed.strip_prefix("/*") {
        comment.find("*/").map(|end| end + 4).ok_or("unclosed comment")
    } else if trimmed.starts_with('"') {
        quoted_len(trimmed).ok_or("unterminated quoted string")
    } else if let Some(raw) = trimmed.strip_prefix('`') {
        raw.find('`').map(|end| end + 2).ok_or("unterminated raw string")
    } else {
        Ok(0)
    };
    let search_from = match skip {
        Ok(len) => body_start + lead + len,
        Err(reason) => {
            let (line, column) = position(source, open_at);
            return Err(TemplateError::parse(line, column, reason));
        }
    };

    let Some(rel) = source[search_from..].find(CLOSE) else {
        let (line, column) = position(source, open_at);
        return Err(TemplateError::parse(line, column, "unclosed action"));
    };
    let close_at = search_from + rel;

    let inner = &source[body_start..close_at];
    if inner.ends_with('-') && inner[..inner.len() - 1].ends_with(SPACE) {
        Ok((close_at - 1, close_at + CLOSE.len(), true))
    } else {
        Ok((close_at, close_at + CLOSE.len(), false))
    }
}

/// `{{- ` only counts as a trim marker when followed by whitespace.
fn has_trim_marker(after_open: &str) -> bool {
    let mut chars = after_open.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| SPACE.contains(&c))
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool) {
    let text = if trim_start {
        text.trim_start_matches(SPACE)
    } else {
        text
    };
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn trim_last_text(nodes: &mut Vec<Node>) {
    if let Some(Node::Text(text)) = nodes.last_mut() {
        let kept = text.trim_end_matches(SPACE).len();
        text.truncate(kept);
        if text.is_empty() {
            nodes.pop();
        }
    }
}

/// Byte length of the double-quoted string at the start of `s`, quotes included.
fn quoted_len(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            '\n' => return None,
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Decode a double-quoted string constant that spans all of `body`.
fn unquote(body: &str) -> Option<String> {
    if quoted_len(body)? != body.len() {
        return None;
    }
    let inner = &body[1..body.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            c @ ('\\' | '"' | '\'') => out.push(c),
            _ => return None,
        }
    }
    Some(out)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 1-based line and column of a byte offset.
fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
