//! # Error Types
//!
//! General error handling for the visualization engine.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! None of these errors ever reach the host through [`crate::VisualizerSession`]'s
//! entry points: resolution, formatting and expansion catch them at the top and
//! degrade to the native presentation of the value. They surface directly only
//! from loading APIs such as [`crate::VisualizerRegistry::load`].

use thiserror::Error;

use crate::variable::EvalError;

/// Main error type for visualization operations
///
/// ## Error Categories
///
/// 1. **Load errors**: InvalidDocument, InvalidTypeName, MissingField, InvalidAttribute, Io
/// 2. **Evaluation errors**: Evaluation (wraps the accessor's [`EvalError`])
/// 3. **Rule errors**: MalformedTemplate, InvalidSize
#[derive(Error, Debug)]
pub enum VisualizerError
{
    /// A rule document could not be parsed at all
    ///
    /// This happens when:
    /// - The XML is not well formed
    /// - The root element is not `AutoVisualizer`
    /// - The document is empty
    #[error("Invalid rule document {origin}: {reason}")]
    InvalidDocument
    {
        /// Where the document came from (file path or label)
        origin: String,
        /// What went wrong while reading it
        reason: String,
    },

    /// A type pattern or type name could not be parsed
    #[error("Invalid type name: {0}")]
    InvalidTypeName(String),

    /// A rule element is missing an attribute or child it cannot work without
    #[error("Missing required field `{field}` in <{element}>")]
    MissingField
    {
        /// Element that is incomplete (e.g. `TreeItems`)
        element: String,
        /// Attribute or child element that was expected
        field: String,
    },

    /// An attribute is present but its value is unusable (e.g. a non-numeric `Id`)
    #[error("Invalid value `{value}` for `{attribute}` in <{element}>")]
    InvalidAttribute
    {
        /// Element carrying the attribute
        element: String,
        /// Attribute name
        attribute: String,
        /// Offending value
        value: String,
    },

    /// The variable accessor failed to evaluate an expression
    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    /// A display string template is not well formed (e.g. an unmatched `}`)
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    /// A size expression did not evaluate to an unsigned integer
    ///
    /// This aborts only the rule item that owns the size expression.
    #[error("Invalid size value `{0}`")]
    InvalidSize(String),

    /// I/O error (reading rule documents from disk)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, VisualizerError>`
///
/// ```rust
/// use natview_core::error::VisualizerResult;
/// fn foo() -> VisualizerResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type VisualizerResult<T> = std::result::Result<T, VisualizerError>;
