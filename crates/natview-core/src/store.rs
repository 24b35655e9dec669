//! Definition stores: where rule documents come from.
//!
//! Discovering natvis files (project directories, user profile, registry keys)
//! is the host's business. A store only hands over the documents it was told
//! about, in order; the registry parses them.

use std::fs;
use std::io;
use std::path::PathBuf;

/// One rule document as supplied by a store.
#[derive(Debug)]
pub struct RuleDocument
{
    /// Path or label used in diagnostics.
    pub origin: String,
    /// Document text, or why it could not be read.
    pub contents: io::Result<String>,
}

impl RuleDocument
{
    /// A document whose text is already in memory.
    pub fn from_text(origin: impl Into<String>, text: impl Into<String>) -> Self
    {
        Self {
            origin: origin.into(),
            contents: Ok(text.into()),
        }
    }
}

/// Source of rule documents.
pub trait DefinitionStore
{
    /// All documents, in load order.
    fn documents(&self) -> Vec<RuleDocument>;
}

/// Reads an explicit list of files.
///
/// Unreadable files are still returned, carrying their I/O error, so the
/// registry can report them and move on.
#[derive(Debug, Clone, Default)]
pub struct FileStore
{
    paths: Vec<PathBuf>,
}

impl FileStore
{
    /// Create a store over the given paths.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Paths this store reads, in order.
    pub fn paths(&self) -> &[PathBuf]
    {
        &self.paths
    }
}

impl DefinitionStore for FileStore
{
    fn documents(&self) -> Vec<RuleDocument>
    {
        self.paths
            .iter()
            .map(|path| RuleDocument {
                origin: path.display().to_string(),
                contents: fs::read_to_string(path),
            })
            .collect()
    }
}

/// Documents held in memory (embedded rules, tests).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore
{
    documents: Vec<(String, String)>,
}

impl MemoryStore
{
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Append a document.
    #[must_use]
    pub fn with_document(mut self, origin: impl Into<String>, text: impl Into<String>) -> Self
    {
        self.documents.push((origin.into(), text.into()));
        self
    }
}

impl DefinitionStore for MemoryStore
{
    fn documents(&self) -> Vec<RuleDocument>
    {
        self.documents
            .iter()
            .map(|(origin, text)| RuleDocument::from_text(origin.clone(), text.clone()))
            .collect()
    }
}
