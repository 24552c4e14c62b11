//! Schema patches
//!
//! Provides [`JsonPatch`], the RFC 6902 flavoured operation list sent to the
//! schema-update mutation. Only `add`, `remove`, `replace` and `move` are
//! ever produced.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::json_schema::JsonSchema;
use crate::pointer::JsonPointer;

/// One schema patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JsonPatch {
    /// Insert a schema at `path`
    Add {
        /// Target location
        path: JsonPointer,
        /// Schema to insert
        value: JsonSchema,
    },

    /// Delete the schema at `path`
    Remove {
        /// Target location
        path: JsonPointer,
    },

    /// Overwrite the schema at `path`
    Replace {
        /// Target location
        path: JsonPointer,
        /// New schema
        value: JsonSchema,
    },

    /// Relocate the schema at `from` to `path`
    Move {
        /// Source location
        from: JsonPointer,
        /// Target location
        path: JsonPointer,
    },
}

impl JsonPatch {
    /// `add` operation
    #[inline]
    #[must_use]
    pub fn add(path: JsonPointer, value: JsonSchema) -> Self {
        Self::Add { path, value }
    }

    /// `remove` operation
    #[inline]
    #[must_use]
    pub fn remove(path: JsonPointer) -> Self {
        Self::Remove { path }
    }

    /// `replace` operation
    #[inline]
    #[must_use]
    pub fn replace(path: JsonPointer, value: JsonSchema) -> Self {
        Self::Replace { path, value }
    }

    /// `move` operation
    #[inline]
    #[must_use]
    pub fn move_to(from: JsonPointer, path: JsonPointer) -> Self {
        Self::Move { from, path }
    }

    /// Operation kind
    #[inline]
    #[must_use]
    pub fn op(&self) -> PatchOp {
        match self {
            Self::Add { .. } => PatchOp::Add,
            Self::Remove { .. } => PatchOp::Remove,
            Self::Replace { .. } => PatchOp::Replace,
            Self::Move { .. } => PatchOp::Move,
        }
    }

    /// Target location
    #[inline]
    #[must_use]
    pub fn path(&self) -> &JsonPointer {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Move { path, .. } => path,
        }
    }

    /// Schema carried by `add`/`replace`
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&JsonSchema> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } => Some(value),
            Self::Remove { .. } | Self::Move { .. } => None,
        }
    }

    /// Check if operation reads existing state
    #[inline]
    #[must_use]
    pub fn reads_state(&self) -> bool {
        !matches!(self, Self::Add { .. })
    }
}

/// Patch operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    /// `add`
    Add,
    /// `remove`
    Remove,
    /// `replace`
    Replace,
    /// `move`
    Move,
}

impl Display for PatchOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
        })
    }
}

impl Display for JsonPatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { from, path } => write!(f, "move {from} -> {path}"),
            other => write!(f, "{} {}", other.op(), other.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_schema::JsonStringSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn patch_add_wire_shape() {
        let patch = JsonPatch::add(
            JsonPointer::root().property("title"),
            JsonStringSchema::new().into(),
        );
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "op": "add",
                "path": "/properties/title",
                "value": { "type": "string", "default": "" }
            })
        );
    }

    #[test]
    fn patch_move_wire_shape() {
        let patch = JsonPatch::move_to(
            JsonPointer::root().property("a"),
            JsonPointer::root().property("b"),
        );
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "op": "move", "from": "/properties/a", "path": "/properties/b" })
        );
    }

    #[test]
    fn patch_remove_has_no_value() {
        let patch = JsonPatch::remove(JsonPointer::root().property("gone"));
        assert_eq!(patch.op(), PatchOp::Remove);
        assert!(patch.value().is_none());
        assert!(patch.reads_state());
    }

    #[test]
    fn patch_deserialize() {
        let patch: JsonPatch = serde_json::from_value(json!({
            "op": "replace",
            "path": "",
            "value": { "type": "number", "default": 0 }
        }))
        .unwrap();
        assert_eq!(patch.op(), PatchOp::Replace);
        assert!(patch.path().is_empty());
    }

    #[test]
    fn patch_display() {
        let patch = JsonPatch::remove(JsonPointer::root().property("x"));
        assert_eq!(patch.to_string(), "remove /properties/x");
    }
}
