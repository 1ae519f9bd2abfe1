//! 'format-string' - A template formatting node with a dynamic interface.
//!
//! This library implements the "FormatString" node for node-based editors such
//! as ComfyUI. A node holds a text template; the names the template refers to
//! become the node's inputs and outputs, and executing the node renders the
//! template and optionally saves its inputs to a JSON file.
//!
//! # Example
//!
//! ```rust
//! use format_string::{
//!     FormatRequest, FormatStringConfig, FormatStringNode, NodeConfigRegistry, TemplateType,
//! };
//! use std::sync::Arc;
//!
//! let node = FormatStringNode::new(
//!     FormatStringConfig::with_comfy_path("/tmp/comfy"),
//!     Arc::new(NodeConfigRegistry::new()),
//! );
//!
//! let config = node.update_widget("1", "Simple", "Hello {name}!");
//! assert_eq!(config.outputs.len(), 3);
//!
//! let request = FormatRequest::new(TemplateType::Simple, "Hello {name}!").with_value("name", "Ann");
//! let output = node.format_string(&request).unwrap();
//! assert_eq!(output.formatted_string, "Hello Ann!");
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod registry;
pub mod schema;
pub mod state;
pub mod template;
pub mod variables;

pub use config::FormatStringConfig;
pub use error::{FormatError, StateError};
pub use node::{
    ChangeSignal, FormatOutput, FormatRequest, FormatStringNode, Node, NodeDescriptor,
    find_node_class, node_class_mappings,
};
pub use registry::NodeConfigRegistry;
pub use schema::{InputSpec, InputTypes, NodeConfig, OutputSchema, OutputSpec};
pub use state::{LoadOutcome, SaveOutcome, SavedState, load_state};
pub use template::{SandboxRenderer, TemplateType};
pub use variables::extract_variables;
