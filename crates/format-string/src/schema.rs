//! Input and output schemas for the node.
//!
//! The node's outputs depend on its current template: one string output per
//! extracted variable, followed by the rendered string and the saved file path.
//! [`OutputSchema`] captures that per-template shape, and [`NodeConfig`] is the
//! document sent to the editor front end.
//!
//! Both serialize in the editor's tuple notation, preserving declaration order:
//!
//! ```json
//! {
//!   "inputs": {
//!     "template_type": [["Simple", "Jinja2"]],
//!     "template": ["STRING", {"multiline": true}],
//!     "save_path": ["STRING", {"default": ""}],
//!     "name": ["STRING", {"default": ""}]
//!   },
//!   "outputs": [
//!     {"name": "name", "type": "STRING"},
//!     {"name": "formatted_string", "type": "STRING"},
//!     {"name": "saved_file_path", "type": "STRING"}
//!   ]
//! }
//! ```

use crate::template::TemplateType;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// The only data type this node exchanges.
pub const STRING_TYPE: &str = "STRING";

/// Name of the output carrying the rendered template.
pub const FORMATTED_STRING: &str = "formatted_string";

/// Name of the output carrying the path the state was saved to.
pub const SAVED_FILE_PATH: &str = "saved_file_path";

/// Declaration of a single node input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSpec {
    /// A drop-down of fixed choices.
    Choice(Vec<String>),
    /// A text field.
    String {
        multiline: bool,
        default: Option<String>,
    },
}

impl InputSpec {
    pub fn multiline() -> Self {
        InputSpec::String {
            multiline: true,
            default: None,
        }
    }

    pub fn with_default(default: impl Into<String>) -> Self {
        InputSpec::String {
            multiline: false,
            default: Some(default.into()),
        }
    }
}

#[derive(Serialize)]
struct StringOptions<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    multiline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a str>,
}

impl Serialize for InputSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InputSpec::Choice(choices) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(choices)?;
                seq.end()
            }
            InputSpec::String { multiline, default } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(STRING_TYPE)?;
                seq.serialize_element(&StringOptions {
                    multiline: *multiline,
                    default: default.as_deref(),
                })?;
                seq.end()
            }
        }
    }
}

/// Declaration of a single node output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl OutputSpec {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: STRING_TYPE.to_string(),
        }
    }
}

/// Ordered input declarations, serialized as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTypes(Vec<(String, InputSpec)>);

impl InputTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The inputs every FormatString node has, regardless of its template.
    pub fn required() -> Self {
        let mut inputs = Self::new();
        inputs.insert("template_type", InputSpec::Choice(TemplateType::choices()));
        inputs.insert("template", InputSpec::multiline());
        inputs.insert("save_path", InputSpec::with_default(""));
        inputs
    }

    /// Adds an input, replacing any existing input of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, spec: InputSpec) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = spec,
            None => self.0.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&InputSpec> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for InputTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

/// The output layout produced for a particular template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSchema {
    variables: Vec<String>,
}

impl OutputSchema {
    pub fn new(variables: Vec<String>) -> Self {
        Self { variables }
    }

    /// The per-variable outputs, in extraction order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// All output names: the variables, then the two fixed trailing outputs.
    pub fn return_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .cloned()
            .chain([FORMATTED_STRING.to_string(), SAVED_FILE_PATH.to_string()])
            .collect()
    }

    /// One type per output; every output is a string.
    pub fn return_types(&self) -> Vec<&'static str> {
        vec![STRING_TYPE; self.variables.len() + 2]
    }

    pub fn outputs(&self) -> Vec<OutputSpec> {
        self.return_names()
            .into_iter()
            .map(OutputSpec::string)
            .collect()
    }
}

/// The dynamically computed interface of one node instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeConfig {
    pub inputs: InputTypes,
    pub outputs: Vec<OutputSpec>,
}

impl NodeConfig {
    /// Builds the configuration for a template whose variables are `schema.variables()`.
    pub fn from_schema(schema: &OutputSchema) -> Self {
        let mut inputs = InputTypes::required();
        for name in schema.variables() {
            inputs.insert(name.clone(), InputSpec::with_default(""));
        }
        Self {
            inputs,
            outputs: schema.outputs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_spec_serialization() {
        assert_eq!(
            serde_json::to_value(InputSpec::Choice(TemplateType::choices())).unwrap(),
            json!([["Simple", "Jinja2"]])
        );
        assert_eq!(
            serde_json::to_value(InputSpec::multiline()).unwrap(),
            json!(["STRING", {"multiline": true}])
        );
        assert_eq!(
            serde_json::to_value(InputSpec::with_default("")).unwrap(),
            json!(["STRING", {"default": ""}])
        );
    }

    #[test]
    fn test_input_types_preserve_order() {
        let config = NodeConfig::from_schema(&OutputSchema::new(vec![
            "zeta".to_string(),
            "alpha".to_string(),
        ]));
        let serialized = serde_json::to_string(&config.inputs).unwrap();
        let positions: Vec<usize> = ["template_type", "template\"", "save_path", "zeta", "alpha"]
            .iter()
            .map(|key| serialized.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{serialized}");
    }

    #[test]
    fn test_input_types_insert_replaces() {
        let mut inputs = InputTypes::required();
        inputs.insert("template", InputSpec::with_default("x"));
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs.get("template"), Some(&InputSpec::with_default("x")));
    }

    #[test]
    fn test_output_schema_trailing_outputs() {
        let schema = OutputSchema::new(vec!["name".to_string()]);
        assert_eq!(
            schema.return_names(),
            vec!["name", FORMATTED_STRING, SAVED_FILE_PATH]
        );
        assert_eq!(schema.return_types(), vec!["STRING"; 3]);
    }

    #[test]
    fn test_node_config_document() {
        let config = NodeConfig::from_schema(&OutputSchema::new(vec!["name".to_string()]));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["inputs"]["name"], json!(["STRING", {"default": ""}]));
        assert_eq!(
            value["outputs"],
            json!([
                {"name": "name", "type": "STRING"},
                {"name": "formatted_string", "type": "STRING"},
                {"name": "saved_file_path", "type": "STRING"}
            ])
        );
    }

    #[test]
    fn test_empty_schema_has_only_fixed_outputs() {
        let config = NodeConfig::from_schema(&OutputSchema::default());
        assert_eq!(config.inputs.len(), 3);
        assert_eq!(config.outputs.len(), 2);
    }
}
