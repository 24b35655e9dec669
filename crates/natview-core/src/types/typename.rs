//! Structured type names and wildcard pattern matching.
//!
//! Rule documents scope visualizers with C++-style type patterns such as
//! `std::vector<*>` or `Outer<*>::Inner<int, *>`. Both the patterns and the
//! runtime type names reported by the variable accessor are parsed into a
//! [`TypeName`]: a `::`-separated chain of [`QualifiedName`]s, each of which may
//! carry template arguments, followed by an optional declarator suffix
//! (`*`, `&`, `const *`, `[4]`).
//!
//! ## Matching rules
//!
//! - A pattern that is exactly `*` matches any type.
//! - Otherwise qualifier count, base names and suffix must be equal.
//! - Template arguments compare positionally; a `*` argument matches exactly one
//!   argument, and a `*` in the last position matches one or more remaining
//!   arguments.
//!
//! ```rust
//! use natview_core::types::TypeName;
//!
//! let pattern = TypeName::parse("std::map<*>").unwrap();
//! let concrete = TypeName::parse("std::map<int, std::string, std::less<int> >").unwrap();
//! assert!(concrete.matches(&pattern));
//! assert_eq!(concrete.template_args()[1], "std::string");
//! ```

use std::fmt;

use smallvec::SmallVec;

/// A parsed type name or type pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName
{
    qualifiers: SmallVec<[QualifiedName; 2]>,
    suffix: String,
    wildcard: bool,
}

/// One `::`-separated component of a [`TypeName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName
{
    base: String,
    args: Vec<TypeName>,
}

impl QualifiedName
{
    /// Identifier part, without template arguments.
    pub fn base(&self) -> &str
    {
        &self.base
    }

    /// Template arguments of this component.
    pub fn args(&self) -> &[TypeName]
    {
        &self.args
    }

    fn matches(&self, pattern: &QualifiedName) -> bool
    {
        if self.base != pattern.base {
            return false;
        }

        let last = pattern.args.len().saturating_sub(1);
        for (index, arg) in pattern.args.iter().enumerate() {
            if arg.wildcard && index == last {
                return self.args.len() >= pattern.args.len();
            }
            match self.args.get(index) {
                Some(candidate) if candidate.matches(arg) => {}
                _ => return false,
            }
        }
        self.args.len() == pattern.args.len()
    }
}

impl TypeName
{
    /// The `*` pattern, matching every type.
    #[must_use]
    pub fn wildcard() -> Self
    {
        Self {
            qualifiers: SmallVec::new(),
            suffix: String::new(),
            wildcard: true,
        }
    }

    /// Parse a raw type name or pattern.
    ///
    /// Returns `None` for empty input, unbalanced `<`/`>`, empty components or
    /// stray separators.
    pub fn parse(raw: &str) -> Option<Self>
    {
        parse_type(raw)
    }

    /// Whether this is the bare `*` pattern.
    pub fn is_wildcard(&self) -> bool
    {
        self.wildcard
    }

    /// The `::`-separated components, outermost first.
    pub fn qualifiers(&self) -> &[QualifiedName]
    {
        &self.qualifiers
    }

    /// Declarator suffix with whitespace removed (`*`, `&`, `const*`, `[4]`).
    pub fn suffix(&self) -> &str
    {
        &self.suffix
    }

    /// Whether the type ends in a pointer marker.
    pub fn is_pointer(&self) -> bool
    {
        self.suffix.ends_with('*')
    }

    /// Wildcard-aware match of `self` (a concrete name) against `pattern`.
    pub fn matches(&self, pattern: &TypeName) -> bool
    {
        if pattern.wildcard {
            return true;
        }
        if self.wildcard || self.suffix != pattern.suffix || self.qualifiers.len() != pattern.qualifiers.len() {
            return false;
        }
        self.qualifiers
            .iter()
            .zip(pattern.qualifiers.iter())
            .all(|(candidate, pattern)| candidate.matches(pattern))
    }

    /// All template arguments across the qualifier chain, in order, as text.
    ///
    /// `Outer<A>::Inner<B, C>` yields `["A", "B", "C"]`; these bind `$T1..$Tn`.
    pub fn template_args(&self) -> Vec<String>
    {
        self.qualifiers
            .iter()
            .flat_map(|qualifier| qualifier.args.iter().map(ToString::to_string))
            .collect()
    }

    /// Copy of this name with exactly one trailing `*` or `&` removed.
    ///
    /// Returns `None` if the name does not end in a pointer or reference marker.
    pub fn strip_pointer(&self) -> Option<TypeName>
    {
        let stripped = self.suffix.strip_suffix('*').or_else(|| self.suffix.strip_suffix('&'))?;
        Some(Self {
            qualifiers: self.qualifiers.clone(),
            suffix: stripped.to_string(),
            wildcard: false,
        })
    }
}

impl fmt::Display for TypeName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.wildcard {
            return f.write_str("*");
        }
        for (index, qualifier) in self.qualifiers.iter().enumerate() {
            if index > 0 {
                f.write_str("::")?;
            }
            f.write_str(&qualifier.base)?;
            if !qualifier.args.is_empty() {
                f.write_str("<")?;
                for (arg_index, arg) in qualifier.args.iter().enumerate() {
                    if arg_index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")?;
            }
        }
        f.write_str(&self.suffix)
    }
}

fn parse_type(raw: &str) -> Option<TypeName>
{
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if text == "*" {
        return Some(TypeName::wildcard());
    }

    let text = text.strip_prefix("::").unwrap_or(text);
    let bytes = text.as_bytes();
    let mut qualifiers = SmallVec::new();
    let mut pos = 0;

    loop {
        let start = pos;
        while pos < bytes.len() && !matches!(bytes[pos], b'<' | b'>' | b':' | b'*' | b'&' | b'[' | b',') {
            pos += 1;
        }
        let base = normalize_whitespace(&text[start..pos]);
        if base.is_empty() {
            return None;
        }

        let mut args = Vec::new();
        if bytes.get(pos) == Some(&b'<') {
            let close = matching_close(bytes, pos)?;
            let inner = &text[pos + 1..close];
            if !inner.trim().is_empty() {
                for piece in split_top_level(inner) {
                    args.push(parse_type(piece)?);
                }
            }
            pos = close + 1;
        }
        qualifiers.push(QualifiedName { base, args });

        while bytes.get(pos) == Some(&b' ') {
            pos += 1;
        }
        if text[pos..].starts_with("::") {
            pos += 2;
            continue;
        }
        break;
    }

    let suffix: String = text[pos..].chars().filter(|c| !c.is_whitespace()).collect();
    if suffix.contains(['<', '>', ':', ',']) {
        return None;
    }

    Some(TypeName {
        qualifiers,
        suffix,
        wildcard: false,
    })
}

/// Index of the `>` closing the `<` at `open`.
fn matching_close(bytes: &[u8], open: usize) -> Option<usize>
{
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split template arguments on commas that are not nested in `<>` or `()`.
fn split_top_level(inner: &str) -> Vec<&str>
{
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    pieces.push(&inner[start..]);
    pieces
}

fn normalize_whitespace(text: &str) -> String
{
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_split_top_level_respects_nesting()
    {
        assert_eq!(split_top_level("a, b<c, d>, e(f, g)"), vec!["a", " b<c, d>", " e(f, g)"]);
    }

    #[test]
    fn test_matching_close_nested()
    {
        let text = b"A<B<C>>::D";
        assert_eq!(matching_close(text, 1), Some(6));
        assert_eq!(matching_close(b"A<B<C>", 1), None);
    }
}
