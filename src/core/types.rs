//! Type indicators for block connections
//!
//! Every connection point on a block (previous, next, output, value slot,
//! statement slot) is governed by a type indicator. Three families are
//! reserved: the wildcard `*`, the absent connection `none`, and the built-in
//! primitives. Anything else is a custom type that the factory's author must
//! declare up front.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicator accepting any type
pub const WILDCARD: &str = "*";

/// Indicator for an absent connection
pub const NEVER: &str = "none";

/// Built-in primitive types understood by every host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinType {
    /// Text value
    String,
    /// True / false value
    Boolean,
    /// Numeric value
    Number,
}

impl BuiltinType {
    /// All built-in types, in declaration order
    pub const ALL: [BuiltinType; 3] = [BuiltinType::String, BuiltinType::Boolean, BuiltinType::Number];

    /// Name the host uses for this type in connection checks
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinType::String => "String",
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Number => "Number",
        }
    }

    /// Look up a built-in type by its exact name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection type indicator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeIndicator {
    /// `*`: accepts any type
    Any,
    /// `none`: the connection does not exist
    Never,
    /// One of the host's primitive types
    Builtin(BuiltinType),
    /// An author-declared type name
    Custom(String),
}

impl TypeIndicator {
    /// Classify a type name
    pub fn parse(name: &str) -> Self {
        match name {
            WILDCARD => TypeIndicator::Any,
            NEVER => TypeIndicator::Never,
            other => match BuiltinType::parse(other) {
                Some(builtin) => TypeIndicator::Builtin(builtin),
                None => TypeIndicator::Custom(other.to_string()),
            },
        }
    }

    /// Whether `name` collides with a reserved indicator
    pub fn is_reserved(name: &str) -> bool {
        !matches!(Self::parse(name), TypeIndicator::Custom(_))
    }

    /// The textual form of this indicator
    pub fn name(&self) -> &str {
        match self {
            TypeIndicator::Any => WILDCARD,
            TypeIndicator::Never => NEVER,
            TypeIndicator::Builtin(builtin) => builtin.as_str(),
            TypeIndicator::Custom(name) => name,
        }
    }

    /// The check handed to the host for a connection of this type.
    ///
    /// The wildcard maps to "no explicit check". `Never` also yields `None`;
    /// callers are expected to drop the connection entirely instead.
    pub fn check(&self) -> Option<&str> {
        match self {
            TypeIndicator::Any | TypeIndicator::Never => None,
            TypeIndicator::Builtin(builtin) => Some(builtin.as_str()),
            TypeIndicator::Custom(name) => Some(name),
        }
    }

    /// The custom type name, if this is one
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            TypeIndicator::Custom(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for TypeIndicator {
    fn from(name: &str) -> Self {
        TypeIndicator::parse(name)
    }
}

impl From<String> for TypeIndicator {
    fn from(name: String) -> Self {
        TypeIndicator::parse(&name)
    }
}

impl From<BuiltinType> for TypeIndicator {
    fn from(builtin: BuiltinType) -> Self {
        TypeIndicator::Builtin(builtin)
    }
}

impl fmt::Display for TypeIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Visual colour of a block or toolbox category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colour {
    /// Hue on the host's colour wheel (0-360)
    Hue(u16),
    /// Explicit colour string such as `#a55b80`
    Hex(String),
}

impl Default for Colour {
    fn default() -> Self {
        Colour::Hue(120)
    }
}

impl From<u16> for Colour {
    fn from(hue: u16) -> Self {
        Colour::Hue(hue)
    }
}

impl From<&str> for Colour {
    fn from(hex: &str) -> Self {
        Colour::Hex(hex.to_string())
    }
}

impl From<String> for Colour {
    fn from(hex: String) -> Self {
        Colour::Hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reserved_indicators() {
        assert_eq!(TypeIndicator::parse("*"), TypeIndicator::Any);
        assert_eq!(TypeIndicator::parse("none"), TypeIndicator::Never);
        assert_eq!(
            TypeIndicator::parse("Number"),
            TypeIndicator::Builtin(BuiltinType::Number)
        );
        assert_eq!(
            TypeIndicator::parse("Sprite"),
            TypeIndicator::Custom("Sprite".to_string())
        );
    }

    #[test]
    fn test_is_reserved() {
        for name in ["*", "none", "String", "Boolean", "Number"] {
            assert!(TypeIndicator::is_reserved(name), "{name} should be reserved");
        }
        assert!(!TypeIndicator::is_reserved("number"));
        assert!(!TypeIndicator::is_reserved("Vector"));
    }

    #[test]
    fn test_wildcard_has_no_check() {
        assert_eq!(TypeIndicator::Any.check(), None);
        assert_eq!(TypeIndicator::from("Boolean").check(), Some("Boolean"));
        assert_eq!(TypeIndicator::from("Vector").check(), Some("Vector"));
    }

    #[test]
    fn test_colour_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Colour::Hue(210)).unwrap(), "210");
        assert_eq!(
            serde_json::to_string(&Colour::from("#ff0000")).unwrap(),
            "\"#ff0000\""
        );
    }
}
