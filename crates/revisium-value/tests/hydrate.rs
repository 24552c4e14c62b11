use std::cmp::Ordering;

use proptest::prelude::*;
use revisium_test_utils::{build_post, post_row};
use revisium_value::{priority_sort_comparator, ValueTree};
use serde_json::{json, Value};

fn comment() -> impl Strategy<Value = Value> {
    ("[a-z ]{0,12}", "[a-z0-9-]{0,8}").prop_map(|(text, by)| json!({ "text": text, "by": by }))
}

fn post() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z ]{0,16}",
        any::<u32>(),
        any::<bool>(),
        "[a-z0-9-]{0,8}",
        proptest::collection::vec("[a-z]{1,6}", 0..5),
        proptest::collection::vec(comment(), 0..4),
    )
        .prop_map(|(title, views, published, author, tags, comments)| {
            json!({
                "title": title,
                "views": views,
                "published": published,
                "author": author,
                "tags": tags,
                "comments": comments,
            })
        })
}

proptest! {
    #[test]
    fn hydrate_is_idempotent(row in post()) {
        let mut tree = ValueTree::new(build_post());
        let root = tree.root();

        for _ in 0..2 {
            tree.update_base_value(root, &row).unwrap();
            prop_assert!(!tree.root_store().touched());
            prop_assert_eq!(tree.root_store().get_plain_value(), row.clone());
        }
    }

    #[test]
    fn validity_matches_empty_references(row in post()) {
        let tree = ValueTree::from_value(build_post(), &row);
        let empty_refs = row["author"] == json!("")
            || row["comments"]
                .as_array()
                .unwrap()
                .iter()
                .any(|comment| comment["by"] == json!(""));
        prop_assert_eq!(tree.root_store().is_valid(), !empty_refs);
    }

    #[test]
    fn structural_edit_then_rehydrate_clears_touched(row in post(), extra in 1usize..4) {
        let mut tree = ValueTree::from_value(build_post(), &row);
        let tags = tree.root_store().child("tags").unwrap().handle();
        for _ in 0..extra {
            tree.create_item(tags).unwrap();
        }
        prop_assert!(tree.root_store().touched());

        let root = tree.root();
        tree.update_base_value(root, &row).unwrap();
        prop_assert!(!tree.root_store().touched());
    }
}

#[test]
fn comparator_is_a_total_order() {
    let tree = ValueTree::from_value(build_post(), &post_row());
    let entries = tree.root_store().children();

    for a in &entries {
        assert_eq!(priority_sort_comparator(*a, *a), Ordering::Equal);
        for b in &entries {
            assert_eq!(
                priority_sort_comparator(*a, *b),
                priority_sort_comparator(*b, *a).reverse()
            );
            for c in &entries {
                if priority_sort_comparator(*a, *b) == Ordering::Less
                    && priority_sort_comparator(*b, *c) == Ordering::Less
                {
                    assert_eq!(priority_sort_comparator(*a, *c), Ordering::Less);
                }
            }
        }
    }
}

#[test]
fn sorted_export_orders_post_fields() {
    let tree = ValueTree::from_value(build_post(), &post_row());
    let sorted = tree.root_store().to_sorted_json_value();
    let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();

    assert_eq!(
        keys,
        ["author", "published", "title", "views", "comments", "tags"]
    );
    assert_eq!(sorted, post_row());
}
