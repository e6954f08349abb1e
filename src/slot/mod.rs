//! The slot model: typed ports on nodes, group mirrors and the workflow
//! interface all share one [`SlotInfo`] shape. Where a slot *lives* is a
//! separate concern, carried by [`SlotOrigin`] and resolved once per lookup.

use serde::{Deserialize, Serialize};

pub mod compat;

/// Key identifying a slot within a node or interface map.
pub type SlotKey = String;

/// The data-flow type a slot declares.
///
/// `Wildcard` and `ConvertibleAny` are behavioral: a wildcard accepts and
/// emits anything without ever changing itself, while a convertible slot is
/// a placeholder that adopts the concrete type of its first peer and is
/// considered used up afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    String,
    Object,
    Array,
    Wildcard,
    ConvertibleAny,
}

impl DataType {
    pub fn is_wildcard(self) -> bool {
        self == DataType::Wildcard
    }

    pub fn is_convertible(self) -> bool {
        self == DataType::ConvertibleAny
    }

    /// True for the two placeholder-ish types that never take part in the
    /// concrete comparison rules.
    pub fn is_behavioral(self) -> bool {
        matches!(self, DataType::Wildcard | DataType::ConvertibleAny)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Boolean => "BOOLEAN",
            DataType::String => "STRING",
            DataType::Object => "OBJECT",
            DataType::Array => "ARRAY",
            DataType::Wildcard => "WILDCARD",
            DataType::ConvertibleAny => "CONVERTIBLE_ANY",
        };
        write!(f, "{}", name)
    }
}

/// Which side of a node a slot sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDirection {
    Input,
    Output,
}

/// Where a resolved slot actually lives.
///
/// Boundary pseudo-nodes expose views onto the workflow interface, and
/// group-reference nodes carry their own interface mirror; mutations must be
/// routed to the owning map, so the discriminant is resolved once per lookup
/// instead of being sniffed from field shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOrigin {
    Node,
    GroupInterface,
    WorkflowInterface,
}

/// Widget configuration carried by a slot definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Static description of a typed port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInfo {
    pub key: SlotKey,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_type: DataType,
    /// Semantic match tags checked before raw types (e.g. `"code"`,
    /// `"enum-option"`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Accepts an ordered list of connections instead of at most one.
    #[serde(default)]
    pub multi: bool,
    /// Marks an unconsumed CONVERTIBLE_ANY/WILDCARD placeholder.
    #[serde(default)]
    pub allow_dynamic_type: bool,
    #[serde(default)]
    pub config: SlotConfig,
}

impl SlotInfo {
    /// A slot with a concrete data-flow type.
    pub fn concrete(key: impl Into<SlotKey>, data_type: DataType) -> Self {
        let key = key.into();
        Self {
            display_name: key.clone(),
            key,
            description: None,
            data_type,
            categories: Vec::new(),
            multi: false,
            allow_dynamic_type: false,
            config: SlotConfig::default(),
        }
    }

    /// An unconsumed CONVERTIBLE_ANY placeholder.
    pub fn placeholder(key: impl Into<SlotKey>) -> Self {
        let key = key.into();
        Self {
            display_name: key.clone(),
            key,
            description: None,
            data_type: DataType::ConvertibleAny,
            categories: Vec::new(),
            multi: false,
            allow_dynamic_type: true,
            config: SlotConfig::default(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn with_config(mut self, config: SlotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Still waiting to adopt a concrete type from a peer.
    pub fn is_placeholder(&self) -> bool {
        self.data_type.is_convertible()
    }

    /// Turns this slot into a semantic clone of `peer`: type, categories,
    /// display name, description and widget config are carried over
    /// verbatim. Key and `multi` stay untouched, since they describe *this*
    /// port, not the peer's.
    pub(crate) fn adopt(&mut self, peer: &SlotInfo) {
        self.data_type = peer.data_type;
        self.categories = peer.categories.clone();
        self.display_name = peer.display_name.clone();
        self.description = peer.description.clone();
        self.config = peer.config.clone();
    }
}

/// Derives the key for the next placeholder after `consumed` was used up.
///
/// The numeric suffix of the consumed key names the series: `in_0` yields
/// `in_1`, `input_3` yields `input_4`, `input_conv_0` yields `input_conv_1`.
/// The successor index is one past the highest existing index in the same
/// series, so repeated consumption never collides.
pub(crate) fn successor_key<'a>(
    existing: impl Iterator<Item = &'a SlotKey>,
    consumed: &str,
) -> SlotKey {
    let stem = match consumed.rsplit_once('_') {
        Some((stem, suffix)) if suffix.parse::<usize>().is_ok() => stem,
        _ => consumed,
    };
    let prefix = format!("{}_", stem);
    let next = existing
        .filter_map(|k| k.strip_prefix(&prefix)?.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1);
    format!("{}{}", prefix, next)
}
