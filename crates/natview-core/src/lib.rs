//! # natview-core
//!
//! Rule-driven presentation of debuggee values.
//!
//! Given natvis rule documents and a host that can evaluate expressions against
//! a live process, this crate decides what a debugger should show for a value:
//! - Which rule applies to a type, following aliases and base classes
//! - A one-line summary from `DisplayString` templates
//! - A synthesized child list from `Expand` rules (items, arrays, trees, lists)
//! - `[Visualizer View]` / `[Raw View]` alternate presentations
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use natview_core::{SessionConfig, VisualizerRegistry, VisualizerSession};
//!
//! let registry = Arc::new(VisualizerRegistry::new());
//! registry
//!     .load(
//!         "inline",
//!         r#"<AutoVisualizer>
//!              <Type Name="Vec&lt;*&gt;"><DisplayString>{{size={len}}}</DisplayString></Type>
//!            </AutoVisualizer>"#,
//!     )
//!     .unwrap();
//!
//! let session = VisualizerSession::new(registry, SessionConfig::default());
//! let binding = session.resolve_type_name("Vec<int>").unwrap();
//! assert_eq!(binding.type_param("$T1"), Some("int"));
//! ```
//!
//! ## Failure model
//!
//! Visualization is best effort. Loading reports problems and skips the bad
//! part; resolution, formatting and expansion never fail and fall back to the
//! value's native presentation.

pub mod config;
pub mod definitions;
pub mod error;
pub mod expand;
pub mod format;
mod guards;
pub mod limits;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod store;
pub mod substitute;
mod traverse;
pub mod types;
pub mod variable;
pub mod view;

pub use config::{DisplayStringMode, ExpansionMode, SessionConfig};
pub use error::{VisualizerError, VisualizerResult};
pub use format::DisplayText;
pub use registry::VisualizerRegistry;
pub use resolver::VisualizerBinding;
pub use session::VisualizerSession;
pub use store::{DefinitionStore, FileStore, MemoryStore, RuleDocument};
pub use types::{Address, TypeName};
pub use variable::{EvalError, Variable, VariableRef};
pub use view::ViewWrapper;
