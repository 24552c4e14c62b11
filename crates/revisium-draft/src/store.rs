//! Node store protocol
//!
//! Every editor node carries the same positional state (`id`, `parent`,
//! `connected_to_parent`) in committed and draft form, plus type-specific
//! fields that follow the same submit/reset rules.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::draft::{Draft, View};

/// Key of a node inside a [`RootNodeStore`](crate::RootNodeStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub(crate) usize);

impl NodeKey {
    /// Arena slot
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Position of a node relative to its parent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeState {
    /// Property name; empty for roots and array items
    pub id: String,
    /// Owning object or array
    pub parent: Option<NodeKey>,
    /// Attached to `parent`
    pub connected_to_parent: bool,
}

/// Dual-state protocol shared by all node stores
///
/// Implementors expose their positional state and hook their own fields
/// into dirty tracking, submit and reset.
pub trait NodeStore {
    /// Positional state
    fn node_state(&self) -> &Draft<NodeState>;

    /// Positional state for edits
    fn node_state_mut(&mut self) -> &mut Draft<NodeState>;

    /// Type-specific fields differ between draft and committed
    fn fields_dirty(&self) -> bool {
        false
    }

    /// Promote type-specific fields
    fn submit_fields(&mut self) {}

    /// Discard type-specific fields
    fn reset_fields(&mut self) {}

    /// Committed id
    fn id(&self) -> &str {
        &self.node_state().committed().id
    }

    /// Pending id
    fn draft_id(&self) -> &str {
        &self.node_state().draft().id
    }

    /// Id in either view
    fn id_in(&self, view: View) -> &str {
        &self.node_state().get(view).id
    }

    /// Rename (draft)
    fn set_id(&mut self, id: impl Into<String>) {
        self.node_state_mut().draft_mut().id = id.into();
    }

    /// Committed parent
    fn parent(&self) -> Option<NodeKey> {
        self.node_state().committed().parent
    }

    /// Pending parent
    fn draft_parent(&self) -> Option<NodeKey> {
        self.node_state().draft().parent
    }

    /// Attach to `parent` (draft)
    fn set_parent(&mut self, parent: NodeKey) {
        let state = self.node_state_mut().draft_mut();
        state.parent = Some(parent);
        state.connected_to_parent = true;
    }

    /// Detach from the parent, keeping other pending edits
    fn on_remove_from_parent(&mut self) {
        self.node_state_mut().draft_mut().connected_to_parent = false;
    }

    /// Committed attachment
    fn connected_to_parent(&self) -> bool {
        self.node_state().committed().connected_to_parent
    }

    /// Pending attachment
    fn draft_connected_to_parent(&self) -> bool {
        self.node_state().draft().connected_to_parent
    }

    /// This node, not its descendants, has pending edits
    fn is_dirty_itself(&self) -> bool {
        self.node_state().is_dirty() || self.fields_dirty()
    }

    /// Promote all pending edits of this node
    fn submit_changes(&mut self) {
        self.node_state_mut().submit();
        self.submit_fields();
    }

    /// Discard all pending edits of this node
    fn reset_changes(&mut self) {
        self.node_state_mut().reset();
        self.reset_fields();
    }
}
