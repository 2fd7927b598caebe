//! Toolbox assembly
//!
//! Blocks opt into the toolbox by setting [`CATEGORY`] (and optionally
//! [`SHADOW`]) in their metadata. The plugin colours each block after its
//! category before registration and records the block's entry after it.
//! [`ToolboxPlugin::build_toolbox`] rebuilds the whole menu from those records
//! on every call.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::block::BlockDefinition;
use crate::core::meta::MetaKey;
use crate::core::plugin::BlockPlugin;
use crate::core::types::Colour;

/// Metadata key naming the block's toolbox category
pub const CATEGORY: MetaKey<String> = MetaKey::new("category");

/// Metadata key holding shadow blocks to pre-fill the block's inputs with
pub const SHADOW: MetaKey<ShadowConfig> = MetaKey::new("shadow");

/// Shadow templates by input name
pub type ShadowConfig = BTreeMap<String, Shadow>;

/// Template of a shadow block placed in an input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Shadows placed in this shadow's own inputs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, ShadowInput>,
}

impl Shadow {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            fields: BTreeMap::new(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, shadow: Shadow) -> Self {
        self.inputs.insert(name.into(), ShadowInput { shadow });
        self
    }
}

/// Input entry of a toolbox block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowInput {
    pub shadow: Shadow,
}

/// Menu tree handed to the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolboxDefinition {
    pub kind: String,
    pub contents: Vec<ToolboxItem>,
}

impl ToolboxDefinition {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Entry of a toolbox menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolboxItem {
    Category {
        name: String,
        colour: Colour,
        contents: Vec<ToolboxItem>,
    },
    Block {
        #[serde(rename = "type")]
        block_type: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        inputs: BTreeMap<String, ShadowInput>,
    },
    Sep,
    Label {
        text: String,
    },
}

/// Categories shown in the toolbox, in menu order
#[derive(Debug, Clone, Default)]
pub struct ToolboxConfig {
    pub categories: Vec<(String, Colour)>,
    /// Items appended after the generated categories
    pub extra_contents: Vec<ToolboxItem>,
}

impl ToolboxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, name: impl Into<String>, colour: impl Into<Colour>) -> Self {
        self.categories.push((name.into(), colour.into()));
        self
    }

    pub fn with_extra_contents(mut self, items: impl IntoIterator<Item = ToolboxItem>) -> Self {
        self.extra_contents.extend(items);
        self
    }

    fn colour_of(&self, category: &str) -> Option<&Colour> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, colour)| colour)
    }
}

#[derive(Debug, Clone)]
struct ToolboxEntry {
    category: Option<String>,
    shadow: ShadowConfig,
}

/// Plugin recording registered blocks for the toolbox
///
/// Clones share the record store, so the handle kept by the application sees
/// every block registered through the plugin handed to the factory.
#[derive(Debug, Clone)]
pub struct ToolboxPlugin {
    config: Arc<ToolboxConfig>,
    entries: Arc<RwLock<Vec<(String, ToolboxEntry)>>>,
}

impl ToolboxPlugin {
    pub fn new(config: ToolboxConfig) -> Self {
        Self {
            config: Arc::new(config),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Plugin handle for [`BlockFactory::new`](crate::core::factory::BlockFactory::new)
    pub fn register(&self) -> Arc<dyn BlockPlugin> {
        Arc::new(self.clone())
    }

    /// Build the category menu from every block recorded so far
    ///
    /// Blocks appear under their category in registration order. Blocks
    /// without a category, or naming one the config does not list, are left
    /// out.
    pub fn build_toolbox(&self) -> ToolboxDefinition {
        let entries = self.entries.read();

        let mut contents: Vec<ToolboxItem> = self
            .config
            .categories
            .iter()
            .map(|(category, colour)| ToolboxItem::Category {
                name: category.clone(),
                colour: colour.clone(),
                contents: entries
                    .iter()
                    .filter(|(_, entry)| entry.category.as_deref() == Some(category.as_str()))
                    .map(|(name, entry)| ToolboxItem::Block {
                        block_type: name.clone(),
                        inputs: entry
                            .shadow
                            .iter()
                            .map(|(input, shadow)| (input.clone(), ShadowInput { shadow: shadow.clone() }))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        contents.extend(self.config.extra_contents.iter().cloned());

        ToolboxDefinition {
            kind: "categoryToolbox".to_string(),
            contents,
        }
    }

    /// Number of blocks recorded
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl BlockPlugin for ToolboxPlugin {
    fn name(&self) -> &str {
        "toolbox"
    }

    fn will_register(&self, definition: &mut BlockDefinition) {
        let colour = definition
            .meta()
            .get(CATEGORY)
            .and_then(|category| self.config.colour_of(category))
            .cloned();
        if let Some(colour) = colour {
            definition.set_colour(colour);
        }
    }

    fn did_register(&self, definition: &BlockDefinition) {
        let entry = ToolboxEntry {
            category: definition.meta().get(CATEGORY).cloned(),
            shadow: definition.meta().get(SHADOW).cloned().unwrap_or_default(),
        };

        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(name, _)| name == definition.name()) {
            Some((_, existing)) => *existing = entry,
            None => entries.push((definition.name().to_string(), entry)),
        }
    }
}
