//! Leaf node stores

use revisium_schema::{
    JsonBooleanSchema, JsonNumberSchema, JsonRefSchema, JsonSchema, JsonStringSchema,
};
use serde_json::Number;

use crate::draft::{Draft, View};
use crate::store::{NodeState, NodeStore};

/// Foreign-key target of a string node
#[derive(Debug, Clone, Default)]
pub struct StringForeignKeyNodeStore {
    state: Draft<NodeState>,
    foreign_key: Draft<Option<String>>,
}

impl StringForeignKeyNodeStore {
    /// No target
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed target `table`
    #[must_use]
    pub fn with_foreign_key(table: impl Into<String>) -> Self {
        Self {
            state: Draft::default(),
            foreign_key: Draft::new(Some(table.into())),
        }
    }

    /// Committed target
    #[inline]
    #[must_use]
    pub fn foreign_key(&self) -> Option<&str> {
        self.foreign_key.committed().as_deref()
    }

    /// Pending target
    #[inline]
    #[must_use]
    pub fn draft_foreign_key(&self) -> Option<&str> {
        self.foreign_key.draft().as_deref()
    }

    /// Target in either view
    #[inline]
    #[must_use]
    pub fn foreign_key_in(&self, view: View) -> Option<&str> {
        self.foreign_key.get(view).as_deref()
    }

    /// Point at `table` (draft)
    pub fn set_foreign_key(&mut self, table: impl Into<String>) {
        self.foreign_key.set(Some(table.into()));
    }

    /// Drop the target (draft)
    pub fn clear_foreign_key(&mut self) {
        self.foreign_key.set(None);
    }
}

impl NodeStore for StringForeignKeyNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }

    fn fields_dirty(&self) -> bool {
        self.foreign_key.is_dirty()
    }

    fn submit_fields(&mut self) {
        self.foreign_key.submit();
    }

    fn reset_fields(&mut self) {
        self.foreign_key.reset();
    }
}

/// String field
#[derive(Debug, Clone, Default)]
pub struct StringNodeStore {
    state: Draft<NodeState>,
    default: Draft<String>,
    foreign_key: StringForeignKeyNodeStore,
    template: JsonStringSchema,
}

impl StringNodeStore {
    /// Empty default, no foreign key
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state taken from `schema`
    #[must_use]
    pub fn from_schema(schema: &JsonStringSchema) -> Self {
        let foreign_key = schema
            .effective_foreign_key()
            .map(StringForeignKeyNodeStore::with_foreign_key)
            .unwrap_or_default();
        Self {
            state: Draft::default(),
            default: Draft::new(schema.default.clone()),
            foreign_key,
            template: schema.clone(),
        }
    }

    /// Committed default
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> &str {
        self.default.committed()
    }

    /// Pending default
    #[inline]
    #[must_use]
    pub fn draft_default(&self) -> &str {
        self.default.draft()
    }

    /// Change the default (draft)
    pub fn set_default(&mut self, default: impl Into<String>) {
        self.default.set(default.into());
    }

    /// Attached foreign-key store
    #[inline]
    #[must_use]
    pub fn foreign_key(&self) -> &StringForeignKeyNodeStore {
        &self.foreign_key
    }

    /// Attached foreign-key store for edits
    #[inline]
    pub fn foreign_key_mut(&mut self) -> &mut StringForeignKeyNodeStore {
        &mut self.foreign_key
    }

    /// Point at `table` (draft)
    pub fn set_foreign_key(&mut self, table: impl Into<String>) {
        self.foreign_key.set_foreign_key(table);
    }

    /// Wire schema in either view
    ///
    /// The foreign key keeps the spelling (`foreignKey` or legacy
    /// `reference`) the node was loaded with. A node loaded with both
    /// writes an edited table to both.
    #[must_use]
    pub fn schema(&self, view: View) -> JsonStringSchema {
        let mut schema = self.template.clone();
        schema.default = self.default.get(view).clone();
        let table = self.foreign_key.foreign_key_in(view).map(str::to_string);
        if schema.reference.is_some() && schema.foreign_key.is_none() {
            schema.reference = table;
        } else if table != self.template.foreign_key {
            if schema.reference.is_some() {
                schema.reference.clone_from(&table);
            }
            schema.foreign_key = table;
        }
        schema
    }

    /// Pending wire schema
    #[must_use]
    pub fn get_schema(&self) -> JsonSchema {
        self.schema(View::Draft).into()
    }
}

impl NodeStore for StringNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }

    fn fields_dirty(&self) -> bool {
        self.default.is_dirty() || self.foreign_key.is_dirty_itself()
    }

    fn submit_fields(&mut self) {
        self.default.submit();
        self.foreign_key.submit_changes();
    }

    fn reset_fields(&mut self) {
        self.default.reset();
        self.foreign_key.reset_changes();
    }
}

/// Number field
#[derive(Debug, Clone)]
pub struct NumberNodeStore {
    state: Draft<NodeState>,
    default: Draft<Number>,
    template: JsonNumberSchema,
}

impl NumberNodeStore {
    /// Zero default
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_schema(&JsonNumberSchema::new())
    }

    /// Committed state taken from `schema`
    #[must_use]
    pub fn from_schema(schema: &JsonNumberSchema) -> Self {
        Self {
            state: Draft::default(),
            default: Draft::new(schema.default.clone()),
            template: schema.clone(),
        }
    }

    /// Committed default
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> &Number {
        self.default.committed()
    }

    /// Pending default
    #[inline]
    #[must_use]
    pub fn draft_default(&self) -> &Number {
        self.default.draft()
    }

    /// Change the default (draft)
    pub fn set_default(&mut self, default: impl Into<Number>) {
        self.default.set(default.into());
    }

    /// Wire schema in either view
    #[must_use]
    pub fn schema(&self, view: View) -> JsonNumberSchema {
        let mut schema = self.template.clone();
        schema.default = self.default.get(view).clone();
        schema
    }

    /// Pending wire schema
    #[must_use]
    pub fn get_schema(&self) -> JsonSchema {
        self.schema(View::Draft).into()
    }
}

impl Default for NumberNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for NumberNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }

    fn fields_dirty(&self) -> bool {
        self.default.is_dirty()
    }

    fn submit_fields(&mut self) {
        self.default.submit();
    }

    fn reset_fields(&mut self) {
        self.default.reset();
    }
}

/// Boolean field
#[derive(Debug, Clone, Default)]
pub struct BooleanNodeStore {
    state: Draft<NodeState>,
    default: Draft<bool>,
    template: JsonBooleanSchema,
}

impl BooleanNodeStore {
    /// `false` default
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state taken from `schema`
    #[must_use]
    pub fn from_schema(schema: &JsonBooleanSchema) -> Self {
        Self {
            state: Draft::default(),
            default: Draft::new(schema.default),
            template: schema.clone(),
        }
    }

    /// Committed default
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> bool {
        *self.default.committed()
    }

    /// Pending default
    #[inline]
    #[must_use]
    pub fn draft_default(&self) -> bool {
        *self.default.draft()
    }

    /// Change the default (draft)
    pub fn set_default(&mut self, default: bool) {
        self.default.set(default);
    }

    /// Wire schema in either view
    #[must_use]
    pub fn schema(&self, view: View) -> JsonBooleanSchema {
        let mut schema = self.template.clone();
        schema.default = *self.default.get(view);
        schema
    }

    /// Pending wire schema
    #[must_use]
    pub fn get_schema(&self) -> JsonSchema {
        self.schema(View::Draft).into()
    }
}

impl NodeStore for BooleanNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }

    fn fields_dirty(&self) -> bool {
        self.default.is_dirty()
    }

    fn submit_fields(&mut self) {
        self.default.submit();
    }

    fn reset_fields(&mut self) {
        self.default.reset();
    }
}

/// `$ref` field, kept opaque
#[derive(Debug, Clone)]
pub struct RefNodeStore {
    state: Draft<NodeState>,
    site: JsonRefSchema,
}

impl RefNodeStore {
    /// Reference to `uri`
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self::from_schema(&JsonRefSchema::new(uri))
    }

    /// Reference site including its meta
    #[must_use]
    pub fn from_schema(site: &JsonRefSchema) -> Self {
        Self {
            state: Draft::default(),
            site: site.clone(),
        }
    }

    /// Referenced URI
    #[inline]
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.site.reference
    }

    /// Wire schema
    #[must_use]
    pub fn get_schema(&self) -> JsonSchema {
        JsonSchema::Ref(self.site.clone())
    }
}

impl NodeStore for RefNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }
}
