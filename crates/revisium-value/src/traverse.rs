//! Depth-first value traversal

use revisium_schema::Traversal;

use crate::store::ValueStore;

/// Pre-order visit of a value and everything below it
///
/// Object properties are visited in schema order, array items in their
/// current order. Detached items are not reached.
pub fn traverse_value<'a, F>(store: ValueStore<'a>, mut visit: F)
where
    F: FnMut(ValueStore<'a>),
{
    traverse_value_with_skip(store, |store| {
        visit(store);
        Traversal::Continue
    });
}

/// Pre-order visit that lets `visit` prune subtrees
pub fn traverse_value_with_skip<'a, F>(store: ValueStore<'a>, mut visit: F)
where
    F: FnMut(ValueStore<'a>) -> Traversal,
{
    walk(store, &mut visit);
}

fn walk<'a, F>(store: ValueStore<'a>, visit: &mut F)
where
    F: FnMut(ValueStore<'a>) -> Traversal,
{
    if visit(store) == Traversal::Skip {
        return;
    }
    for (_, child) in store.children() {
        walk(child, visit);
    }
    for item in store.items() {
        walk(item, visit);
    }
}
