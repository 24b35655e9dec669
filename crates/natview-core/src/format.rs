//! # Display String Formatter
//!
//! Produces the one-line summary a host shows next to a value.
//!
//! A template is literal text with `{expr}` spans. `{{` and `}}` are escaped
//! braces; spans do not nest and end at the first `}`. Each span is
//! substituted, evaluated and replaced by the result's own display text, which
//! may itself come from a rule. That recursion is bounded by
//! [`MAX_DISPLAY_DEPTH`]: at the limit the native text is returned.
//!
//! Any failure (bad template, evaluator error) falls back to the native text.

use tracing::debug;

use crate::config::DisplayStringMode;
use crate::definitions::UiVisualizerRef;
use crate::error::{VisualizerError, VisualizerResult};
use crate::guards::DepthGuard;
use crate::limits::MAX_DISPLAY_DEPTH;
use crate::resolver::VisualizerBinding;
use crate::session::VisualizerSession;
use crate::variable::VariableRef;

/// Result of [`VisualizerSession::format_display`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayText
{
    /// Text to show; the native value text when no rule applied.
    pub text: String,
    /// UI visualizers registered for the value's type.
    pub ui_visualizers: Vec<UiVisualizerRef>,
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a>
{
    Literal(String),
    Expression(&'a str),
}

impl VisualizerSession
{
    /// Summary text for `value`.
    ///
    /// Never fails: if no rule applies or the rule cannot be rendered, the
    /// value's own text is returned. On success the value is tracked as
    /// rule-rendered (see [`VisualizerSession::is_tracked`]).
    pub fn format_display(&self, value: &VariableRef) -> DisplayText
    {
        let raw = value.value();
        let Some(binding) = self.resolve(value) else {
            return DisplayText {
                text: raw,
                ui_visualizers: Vec::new(),
            };
        };
        let ui_visualizers = binding.visualizer().ui_visualizers.clone();

        let text = if self.display_enabled(value) {
            self.render(value, &binding).unwrap_or(raw)
        } else {
            raw
        };
        DisplayText { text, ui_visualizers }
    }

    fn display_enabled(&self, value: &VariableRef) -> bool
    {
        let mode_allows = match self.config.display_strings {
            DisplayStringMode::Always => true,
            DisplayStringMode::VisualizedOnly => value.is_visualized(),
            DisplayStringMode::Never => false,
        };
        let synthetic = value.as_view().is_some_and(|view| view.is_synthetic());
        mode_allows && !synthetic && !value.is_pre_rendered()
    }

    fn render(&self, value: &VariableRef, binding: &VisualizerBinding) -> Option<String>
    {
        let Some(_depth) = DepthGuard::enter(&self.display_depth, MAX_DISPLAY_DEPTH) else {
            debug!(type_name = %binding.type_name(), "display depth limit reached");
            return None;
        };

        let rule = binding
            .visualizer()
            .display_strings
            .iter()
            .find(|rule| self.guard_passes(rule.condition.as_deref(), value, Some(binding)))?;

        match self.render_template(&rule.template, value, binding) {
            Ok(text) => {
                self.track(value);
                Some(text)
            }
            Err(err) => {
                debug!(type_name = %binding.type_name(), error = %err, "display string fell back to raw value");
                None
            }
        }
    }

    fn render_template(&self, template: &str, value: &VariableRef, binding: &VisualizerBinding) -> VisualizerResult<String>
    {
        let mut text = String::new();
        for segment in parse_template(template)? {
            match segment {
                Segment::Literal(literal) => text.push_str(&literal),
                Segment::Expression(expression) => {
                    if let Some(type_text) = binding.type_param(expression.trim()) {
                        text.push_str(type_text);
                    } else {
                        text.push_str(&self.get_expression_value(expression, value, Some(binding))?);
                    }
                }
            }
        }
        Ok(text)
    }
}

fn parse_template(template: &str) -> VisualizerResult<Vec<Segment<'_>>>
{
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(next) = rest.find(['{', '}']) {
        literal.push_str(&rest[..next]);
        let tail = &rest[next..];
        if let Some(after) = tail.strip_prefix("{{") {
            literal.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            literal.push('}');
            rest = after;
        } else if tail.starts_with('}') {
            return Err(VisualizerError::MalformedTemplate(format!("unmatched '}}' in \"{template}\"")));
        } else {
            let body = &tail[1..];
            let close = body
                .find('}')
                .ok_or_else(|| VisualizerError::MalformedTemplate(format!("unterminated '{{' in \"{template}\"")))?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Expression(&body[..close]));
            rest = &body[close + 1..];
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_template_spans()
    {
        let segments = parse_template("size={size}, cap={capacity}").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("size=".to_string()),
                Segment::Expression("size"),
                Segment::Literal(", cap=".to_string()),
                Segment::Expression("capacity"),
            ]
        );
    }

    #[test]
    fn test_parse_template_escapes()
    {
        let segments = parse_template("{{ {x} }}").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("{ ".to_string()),
                Segment::Expression("x"),
                Segment::Literal(" }".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_template_rejects_unbalanced()
    {
        assert!(matches!(parse_template("a } b"), Err(VisualizerError::MalformedTemplate(_))));
        assert!(matches!(parse_template("a {b"), Err(VisualizerError::MalformedTemplate(_))));
    }
}
