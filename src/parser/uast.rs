//! Universal AST node as returned by the parser service

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a node boundary within the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub col: u32,
}

/// A language-agnostic syntax tree node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uast {
    /// Node type in the native grammar of the language
    pub internal_type: String,
    #[serde(default)]
    pub token: String,
    /// Language-independent annotations such as "Identifier" or "Function"
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_position: Option<Position>,
    #[serde(default)]
    pub children: Vec<Uast>,
}

impl Uast {
    pub fn new(internal_type: impl Into<String>) -> Self {
        Self {
            internal_type: internal_type.into(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<Uast>) -> Self {
        self.children = children;
        self
    }

    /// Total number of nodes in this subtree, including the root
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Uast::node_count).sum::<usize>()
    }

    /// Encode for storage in a model's `uasts` column
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        rmp_serde::to_vec_named(self).map_err(|e| ModelError::EncodeFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        rmp_serde::from_slice(bytes).map_err(|e| ModelError::DecodeFailed(e.to_string()))
    }
}
