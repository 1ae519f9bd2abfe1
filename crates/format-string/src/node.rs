//! The FormatString node and the protocol nodes expose to the editor.

use crate::config::FormatStringConfig;
use crate::error::FormatError;
use crate::registry::NodeConfigRegistry;
use crate::schema::{InputTypes, NodeConfig, OutputSchema};
use crate::state::{self, LoadOutcome, SaveOutcome, SavedState};
use crate::template::{self, SandboxRenderer, TemplateType};
use crate::variables::{extract_variables, mentions_builtin};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// A node type the editor can instantiate.
///
/// Implementors declare their identity and inputs statically; outputs may
/// vary per instance and are described by [`Node::default_outputs`] until an
/// instance is configured.
pub trait Node {
    /// Internal name the node is registered under.
    const NAME: &'static str;
    /// Human-readable name shown in the editor.
    const DISPLAY_NAME: &'static str;
    /// Menu category.
    const CATEGORY: &'static str;
    /// Name of the primary operation.
    const FUNCTION: &'static str;

    /// Inputs every instance accepts before any dynamic reconfiguration.
    fn input_types() -> InputTypes;

    /// Outputs of an instance that has not been configured yet.
    fn default_outputs() -> OutputSchema {
        OutputSchema::default()
    }

    /// Inputs supplied by the host rather than the user.
    fn hidden_inputs() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn descriptor() -> NodeDescriptor {
        let outputs = Self::default_outputs();
        NodeDescriptor {
            name: Self::NAME,
            display_name: Self::DISPLAY_NAME,
            category: Self::CATEGORY,
            function: Self::FUNCTION,
            input: NodeInputs {
                required: Self::input_types(),
                hidden: Self::hidden_inputs(),
            },
            output: outputs.return_types(),
            output_name: outputs.return_names(),
        }
    }
}

/// Declared inputs of a node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInputs {
    pub required: InputTypes,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hidden: BTreeMap<String, String>,
}

/// Static description of a registered node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub function: &'static str,
    pub input: NodeInputs,
    pub output: Vec<&'static str>,
    pub output_name: Vec<String>,
}

/// Every node type this crate provides.
pub fn node_class_mappings() -> Vec<NodeDescriptor> {
    vec![FormatStringNode::descriptor()]
}

/// Looks up a node type by its internal name.
pub fn find_node_class(name: &str) -> Option<NodeDescriptor> {
    node_class_mappings().into_iter().find(|d| d.name == name)
}

/// Inputs to one execution of the node.
///
/// Missing fields deserialize to their defaults: a `Simple` template type and
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatRequest {
    pub template_type: TemplateType,
    pub template: String,
    pub save_path: String,
    /// Values for the template's variables, keyed by variable name.
    pub values: BTreeMap<String, String>,
}

impl FormatRequest {
    pub fn new(template_type: TemplateType, template: impl Into<String>) -> Self {
        Self {
            template_type,
            template: template.into(),
            ..Default::default()
        }
    }

    pub fn with_save_path(mut self, save_path: impl Into<String>) -> Self {
        self.save_path = save_path.into();
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

/// Result of one execution, paired with the output layout it was produced for.
#[derive(Debug)]
pub struct FormatOutput {
    pub schema: OutputSchema,
    /// One value per `schema.variables()` entry, empty when not supplied.
    pub values: Vec<String>,
    pub formatted_string: String,
    pub saved: SaveOutcome,
}

impl FormatOutput {
    pub fn saved_file_path(&self) -> String {
        self.saved.saved_file_path()
    }

    /// Flattens to the node's positional outputs: variable values, rendered
    /// string, saved path.
    pub fn into_values(self) -> Vec<String> {
        let saved_file_path = self.saved.saved_file_path();
        let mut values = self.values;
        values.push(self.formatted_string);
        values.push(saved_file_path);
        values
    }
}

/// Whether a cached result may be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    /// The output depends on time or randomness; never reuse it.
    Volatile,
    /// The output is determined by these inputs.
    Inputs(FormatRequest),
}

impl ChangeSignal {
    /// Returns true when a result cached under `previous` must be recomputed.
    pub fn is_stale(&self, previous: Option<&ChangeSignal>) -> bool {
        match self {
            ChangeSignal::Volatile => true,
            ChangeSignal::Inputs(_) => previous != Some(self),
        }
    }
}

/// Renders a template from named values and optionally saves its inputs.
#[derive(Debug)]
pub struct FormatStringNode {
    config: FormatStringConfig,
    renderer: SandboxRenderer,
    registry: Arc<NodeConfigRegistry>,
}

impl Node for FormatStringNode {
    const NAME: &'static str = "FormatString";
    const DISPLAY_NAME: &'static str = "Format String";
    const CATEGORY: &'static str = "dv/string_operations";
    const FUNCTION: &'static str = "format_string";

    fn input_types() -> InputTypes {
        InputTypes::required()
    }

    fn hidden_inputs() -> BTreeMap<String, String> {
        BTreeMap::from([("unique_id".to_string(), "UNIQUE_ID".to_string())])
    }
}

impl FormatStringNode {
    pub fn new(config: FormatStringConfig, registry: Arc<NodeConfigRegistry>) -> Self {
        Self {
            config,
            renderer: SandboxRenderer::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<NodeConfigRegistry> {
        &self.registry
    }

    /// Renders the request's template and saves its state when a save path is given.
    ///
    /// # Errors
    ///
    /// Fails only when rendering fails: a missing simple-template key, or a
    /// non-syntax Jinja2 error. Save failures are reported in
    /// [`FormatOutput::saved`].
    pub fn format_string(&self, request: &FormatRequest) -> Result<FormatOutput, FormatError> {
        let variables = extract_variables(&request.template);

        let formatted_string = template::render(
            &self.renderer,
            request.template_type,
            &request.template,
            &request.values,
        )?;

        let saved_state = SavedState::new(
            request.template_type,
            request.template.as_str(),
            &variables,
            &request.values,
        );
        let saved = state::save_state(&self.config.output_dir, &request.save_path, &saved_state);

        let values = variables
            .iter()
            .map(|name| request.values.get(name).cloned().unwrap_or_default())
            .collect();

        Ok(FormatOutput {
            schema: OutputSchema::new(variables),
            values,
            formatted_string,
            saved,
        })
    }

    /// Change detection for the request.
    ///
    /// Jinja2 templates mentioning a built-in helper are always volatile.
    pub fn is_changed(&self, request: &FormatRequest) -> ChangeSignal {
        if request.template_type == TemplateType::Jinja2 && mentions_builtin(&request.template) {
            debug!("Template uses a built-in helper, forcing recompute");
            return ChangeSignal::Volatile;
        }
        ChangeSignal::Inputs(request.clone())
    }

    /// Recomputes a node's interface from its template and stores it under `node_id`.
    pub fn update_widget(&self, node_id: &str, template_type: &str, template: &str) -> NodeConfig {
        let schema = OutputSchema::new(extract_variables(template));
        let config = NodeConfig::from_schema(&schema);
        info!(
            "Reconfigured node {} ({} template) with variables {:?}",
            node_id,
            template_type,
            schema.variables()
        );
        self.registry.insert(node_id, config.clone());
        config
    }

    /// The last configuration computed for `node_id`.
    pub fn get_node_config(&self, node_id: &str) -> Option<NodeConfig> {
        self.registry.get(node_id)
    }

    /// Reads a saved state file.
    pub fn load_node_state(&self, path: impl AsRef<Path>) -> LoadOutcome {
        state::load_state(path)
    }
}
