//! Expression substitution.
//!
//! Rule authors write expressions relative to the value being visualized
//! (`size`, `_Myfirst[$i]`, `(Node*)this->next`, `$T1`). Before the host
//! evaluator can run them they are rewritten against the live value:
//!
//! 1. `this` becomes `(&(<full name>))`, or `(<full name>)` when the value is
//!    already a pointer.
//! 2. The name of a direct child becomes that child's full name.
//! 3. A bound `$T<n>` placeholder becomes its concrete type text.
//! 4. Anything else is left as written.
//!
//! An identifier swallows any `.field` / `->field` chain that follows it, so
//! `head->next` is looked up as `head` and the `->next` tail travels with it
//! unchanged. Identifiers that are themselves member names (`x).size`,
//! `p->size`) are never substituted, and numeric or quoted literals are skipped.

use crate::resolver::VisualizerBinding;
use crate::variable::VariableRef;

/// Where an identifier sits relative to what precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position
{
    /// Start of an operand.
    Free,
    /// Right after `::`.
    Scoped,
    /// Right after `.` or `->`.
    Member,
}

/// Rewrite `template` into an expression evaluable against `context`.
pub fn substitute(template: &str, context: &VariableRef, binding: Option<&VisualizerBinding>) -> String
{
    rewrite_identifiers(template, |head, position| match position {
        Position::Member => None,
        Position::Scoped => binding.and_then(|binding| binding.type_param(head)).map(str::to_string),
        Position::Free => resolve_identifier(head, context, binding),
    })
}

/// Replace `$T<n>` placeholders with `args[n - 1]`; unbound placeholders stay.
pub(crate) fn replace_type_params(text: &str, args: &[String]) -> String
{
    rewrite_identifiers(text, |head, position| {
        if position == Position::Member {
            return None;
        }
        placeholder_index(head).and_then(|index| args.get(index)).cloned()
    })
}

/// Replace the `$i` placeholder with a literal index.
pub(crate) fn replace_index(template: &str, index: usize) -> String
{
    rewrite_identifiers(template, |head, _| (head == "$i").then(|| index.to_string()))
}

/// Zero-based index of a `$T<n>` placeholder.
pub(crate) fn placeholder_index(token: &str) -> Option<usize>
{
    let digits = token.strip_prefix("$T")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok()?.checked_sub(1)
}

fn resolve_identifier(head: &str, context: &VariableRef, binding: Option<&VisualizerBinding>) -> Option<String>
{
    if head == "this" {
        return Some(this_expression(context));
    }
    if let Some(child) = context.find_child(head) {
        return Some(child.full_name());
    }
    binding.and_then(|binding| binding.type_param(head)).map(str::to_string)
}

fn this_expression(context: &VariableRef) -> String
{
    let full_name = context.full_name();
    if context.type_name().trim_end().ends_with('*') {
        format!("({full_name})")
    } else {
        format!("(&({full_name}))")
    }
}

fn rewrite_identifiers<F>(template: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, Position) -> Option<String>,
{
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if is_identifier_start(byte) {
            out.push_str(&template[literal_start..pos]);
            let start = pos;
            let head_end = scan_identifier(bytes, pos);
            pos = scan_member_chain(bytes, head_end);

            let head = &template[start..head_end];
            let position = position_after(&template[..start]);
            match rewrite(head, position) {
                Some(replacement) => out.push_str(&replacement),
                None => out.push_str(head),
            }
            out.push_str(&template[head_end..pos]);
            literal_start = pos;
        } else if byte.is_ascii_digit() {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'.') {
                pos += 1;
            }
        } else if byte == b'"' || byte == b'\'' {
            pos = skip_quoted(bytes, pos);
        } else {
            pos += 1;
        }
    }

    out.push_str(&template[literal_start..]);
    out
}

fn is_identifier_start(byte: u8) -> bool
{
    byte.is_ascii_alphabetic() || byte == b'$' || byte == b'_'
}

fn is_identifier_continue(byte: u8) -> bool
{
    is_identifier_start(byte) || byte.is_ascii_digit()
}

fn scan_identifier(bytes: &[u8], start: usize) -> usize
{
    let mut pos = start + 1;
    while pos < bytes.len() && is_identifier_continue(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Extend past any `.field` / `->field` accesses following an identifier.
fn scan_member_chain(bytes: &[u8], mut pos: usize) -> usize
{
    loop {
        let field_start = if bytes[pos..].starts_with(b"->") {
            pos + 2
        } else if bytes[pos..].starts_with(b".") {
            pos + 1
        } else {
            return pos;
        };
        if field_start < bytes.len() && is_identifier_start(bytes[field_start]) {
            pos = scan_identifier(bytes, field_start);
        } else {
            return pos;
        }
    }
}

fn skip_quoted(bytes: &[u8], start: usize) -> usize
{
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            byte if byte == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn position_after(prefix: &str) -> Position
{
    let trimmed = prefix.trim_end();
    if trimmed.ends_with("->") || trimmed.ends_with('.') {
        Position::Member
    } else if trimmed.ends_with("::") {
        Position::Scoped
    } else {
        Position::Free
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_replace_type_params()
    {
        let args = vec!["int".to_string(), "std::string".to_string()];
        assert_eq!(replace_type_params("Map<$T1, $T2>", &args), "Map<int, std::string>");
        assert_eq!(replace_type_params("$T3*", &args), "$T3*");
        assert_eq!(replace_type_params("x.$T1", &args), "x.$T1");
    }

    #[test]
    fn test_replace_index_only_touches_placeholder()
    {
        assert_eq!(replace_index("*(v.arr[$i])", 2), "*(v.arr[2])");
        assert_eq!(replace_index("$items[$i] + $i0", 7), "$items[7] + $i0");
    }

    #[test]
    fn test_placeholder_index()
    {
        assert_eq!(placeholder_index("$T1"), Some(0));
        assert_eq!(placeholder_index("$T12"), Some(11));
        assert_eq!(placeholder_index("$T0"), None);
        assert_eq!(placeholder_index("$T"), None);
        assert_eq!(placeholder_index("$Tx"), None);
    }

    #[test]
    fn test_literals_are_not_identifiers()
    {
        let rewritten = rewrite_identifiers(r#"0x10 + x + "x" + 'x'"#, |head, _| (head == "x").then(|| "y".to_string()));
        assert_eq!(rewritten, r#"0x10 + y + "x" + 'x'"#);
    }

    #[test]
    fn test_member_chain_travels_with_head()
    {
        let mut heads = Vec::new();
        let rewritten = rewrite_identifiers("head->next.value + (p)->size", |head, position| {
            heads.push((head.to_string(), position));
            None
        });
        assert_eq!(rewritten, "head->next.value + (p)->size");
        assert_eq!(
            heads,
            vec![
                ("head".to_string(), Position::Free),
                ("p".to_string(), Position::Free),
                ("size".to_string(), Position::Member),
            ]
        );
    }
}
