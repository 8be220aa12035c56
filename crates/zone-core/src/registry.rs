use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Attrs;

/// Field schema handed to the property form generator. The core never
/// interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Field {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Textarea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Select {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        options: Vec<FieldOption>,
    },
    Radio {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        options: Vec<FieldOption>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        array_fields: BTreeMap<String, Field>,
        #[serde(default)]
        default_item_props: Attrs,
    },
    Custom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default)]
    pub default_props: Attrs,
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
}

impl BlockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.default_props.insert(key.into(), value);
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

/// Block types known to the editor, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: HashMap<String, BlockConfig>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, block_type: impl Into<String>, config: BlockConfig) -> Self {
        self.insert(block_type, config);
        self
    }

    pub fn insert(&mut self, block_type: impl Into<String>, config: BlockConfig) {
        self.blocks.insert(block_type.into(), config);
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockConfig> {
        self.blocks.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.blocks.contains_key(block_type)
    }

    pub fn default_props(&self, block_type: &str) -> Option<&Attrs> {
        self.get(block_type).map(|config| &config.default_props)
    }

    /// Registered type names, sorted, for the palette.
    pub fn block_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
