//! Explanations for invalid values

use std::fmt::{self, Display};

use revisium_schema::JsonPointer;
use serde::Serialize;

use crate::store::ValueStore;
use crate::traverse::traverse_value;

/// Why a value makes its parent invalid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IssueKind {
    /// Foreign-key string left empty
    EmptyForeignKey {
        /// Referenced table
        table: String,
    },
}

/// One reason for `is_valid() == false`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path, e.g. `comments[0].by`
    pub path: String,
    /// Pointer to the offending value
    pub pointer: JsonPointer,
    /// What is wrong
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::EmptyForeignKey { table } => {
                write!(f, "{}: reference to {} must not be empty", self.path, table)
            }
        }
    }
}

/// Issues below `store`, empty exactly when `store.is_valid()`
#[must_use]
pub fn validation_issues(store: ValueStore<'_>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    traverse_value(store, |node| {
        if node.handle() == store.handle() || !node.is_empty_foreign_key() {
            return;
        }
        if let Some(table) = node.foreign_key() {
            issues.push(ValidationIssue {
                path: node.compute_value_path(),
                pointer: node.json_pointer(),
                kind: IssueKind::EmptyForeignKey {
                    table: table.to_string(),
                },
            });
        }
    });
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ValueTree;
    use pretty_assertions::assert_eq;
    use revisium_test_utils::{build_post, post_row};
    use serde_json::json;

    #[test]
    fn reports_each_empty_foreign_key() {
        let mut row = post_row();
        row["author"] = json!("");
        row["comments"][1]["by"] = json!("");
        let tree = ValueTree::from_value(build_post(), &row);

        let issues = validation_issues(tree.root_store());
        assert!(!tree.root_store().is_valid());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].path, "comments[1].by");
        assert_eq!(issues[1].pointer.to_string(), "/comments/1/by");
        assert_eq!(
            issues[0].kind,
            IssueKind::EmptyForeignKey {
                table: "User".to_string()
            }
        );
        assert_eq!(
            issues[0].to_string(),
            "author: reference to User must not be empty"
        );
    }

    #[test]
    fn valid_tree_has_no_issues() {
        let tree = ValueTree::from_value(build_post(), &post_row());
        assert!(tree.root_store().is_valid());
        assert!(validation_issues(tree.root_store()).is_empty());
    }

    #[test]
    fn issue_serializes_flat() {
        let issue = ValidationIssue {
            path: "author".to_string(),
            pointer: "/author".parse().unwrap(),
            kind: IssueKind::EmptyForeignKey {
                table: "User".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({ "path": "author", "pointer": "/author", "kind": "emptyForeignKey", "table": "User" })
        );
    }
}
