//! # Visualizer Registry
//!
//! Ordered collection of loaded rule documents.
//!
//! Search order is load order of the documents, then declaration order within
//! each document; the first match wins. Documents are only ever appended.
//!
//! ## Thread Safety
//!
//! Loading may happen on a different thread than lookups. Appends take the
//! write lock for the duration of one push, so a lookup sees either none or
//! all of a document. Parsing happens before the lock is taken.
//!
//! ```rust
//! use natview_core::VisualizerRegistry;
//!
//! let registry = VisualizerRegistry::new();
//! registry
//!     .load(
//!         "inline",
//!         r#"<AutoVisualizer><UIVisualizer ServiceId="{A452AFEA-3DF6-46BB-9177-C0B08F318025}" Id="1" MenuName="Image Watch"/></AutoVisualizer>"#,
//!     )
//!     .unwrap();
//! assert_eq!(
//!     registry.ui_visualizer_name("{A452AFEA-3DF6-46BB-9177-C0B08F318025}", 1).as_deref(),
//!     Some("Image Watch")
//! );
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::{info, warn};

use crate::definitions::{parse_document, DefinitionFile, VisualizerDefinition};
use crate::error::VisualizerResult;
use crate::store::{DefinitionStore, RuleDocument};
use crate::types::TypeName;

/// Append-only list of loaded rule documents.
#[derive(Debug, Default)]
pub struct VisualizerRegistry
{
    files: RwLock<Vec<Arc<DefinitionFile>>>,
}

impl VisualizerRegistry
{
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Parse a document and append it.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::VisualizerError::InvalidDocument`] if the document as a
    /// whole is unusable; nothing is appended in that case.
    pub fn load(&self, origin: &str, text: &str) -> VisualizerResult<Arc<DefinitionFile>>
    {
        let file = Arc::new(parse_document(origin, text)?);
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&file));
        Ok(file)
    }

    /// Load one document from a store, reporting instead of failing.
    ///
    /// Returns `true` if the document was appended.
    pub fn load_document(&self, document: RuleDocument) -> bool
    {
        let text = match document.contents {
            Ok(text) => text,
            Err(err) => {
                warn!(origin = %document.origin, error = %err, "cannot read rule document");
                return false;
            }
        };
        match self.load(&document.origin, &text) {
            Ok(_) => true,
            Err(err) => {
                warn!(origin = %document.origin, error = %err, "skipping rule document");
                false
            }
        }
    }

    /// Load every document a store yields, in order.
    ///
    /// Returns the number of documents appended.
    pub fn load_store(&self, store: &dyn DefinitionStore) -> usize
    {
        let documents = store.documents();
        let total = documents.len();
        let loaded = documents
            .into_iter()
            .map(|document| self.load_document(document))
            .filter(|appended| *appended)
            .count();
        info!(loaded, skipped = total - loaded, "loaded rule documents");
        loaded
    }

    /// Snapshot of the loaded documents, in search order.
    pub fn files(&self) -> Vec<Arc<DefinitionFile>>
    {
        self.read().clone()
    }

    /// First visualizer whose pattern (or alternative pattern) matches `name`.
    pub fn find_visualizer(&self, name: &TypeName) -> Option<Arc<VisualizerDefinition>>
    {
        self.read()
            .iter()
            .flat_map(|file| file.visualizers.iter())
            .find(|visualizer| visualizer.matches(name))
            .cloned()
    }

    /// Target template of the first alias whose pattern matches `name`.
    pub fn find_alias(&self, name: &TypeName) -> Option<String>
    {
        self.read()
            .iter()
            .flat_map(|file| file.aliases.iter())
            .find(|alias| name.matches(&alias.pattern))
            .map(|alias| alias.target.clone())
    }

    /// Menu label of a registered UI visualizer.
    pub fn ui_visualizer_name(&self, service_id: &str, id: u32) -> Option<String>
    {
        self.read()
            .iter()
            .flat_map(|file| file.ui_visualizers.iter())
            .find(|registration| registration.id == id && registration.service_id.eq_ignore_ascii_case(service_id))
            .map(|registration| registration.menu_name.clone())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<DefinitionFile>>>
    {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }
}
