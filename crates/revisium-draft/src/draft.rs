//! Committed/draft value pairs

use serde::{Deserialize, Serialize};

/// Which half of a [`Draft`] to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Last submitted state
    Committed,
    /// Pending edits
    Draft,
}

/// Value with a committed copy and a pending draft copy
///
/// Edits go to the draft. [`submit`](Self::submit) copies the draft into
/// the committed copy, [`reset`](Self::reset) copies it back.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Draft<T> {
    committed: T,
    draft: T,
}

impl<T: Clone + PartialEq> Draft<T> {
    /// Both copies equal to `value`
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            draft: value.clone(),
            committed: value,
        }
    }

    /// Last submitted value
    #[inline]
    #[must_use]
    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// Pending value
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &T {
        &self.draft
    }

    /// Either copy
    #[inline]
    #[must_use]
    pub fn get(&self, view: View) -> &T {
        match view {
            View::Committed => &self.committed,
            View::Draft => &self.draft,
        }
    }

    /// Pending value for in-place edits
    #[inline]
    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    /// Replace the pending value
    #[inline]
    pub fn set(&mut self, value: T) {
        self.draft = value;
    }

    /// Draft differs from committed
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Promote draft to committed
    pub fn submit(&mut self) {
        self.committed = self.draft.clone();
    }

    /// Discard draft
    pub fn reset(&mut self) {
        self.draft = self.committed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn edit_submit_reset() {
        let mut value = Draft::new(1);
        value.set(2);
        assert!(value.is_dirty());
        assert_eq!(*value.committed(), 1);
        assert_eq!(*value.get(View::Draft), 2);

        value.submit();
        assert!(!value.is_dirty());
        assert_eq!(*value.committed(), 2);

        *value.draft_mut() = 3;
        value.reset();
        assert_eq!(*value.draft(), 2);
    }

    proptest! {
        #[test]
        fn submit_then_reset_keeps_draft(start in any::<i64>(), edits in proptest::collection::vec(any::<i64>(), 0..8)) {
            let mut value = Draft::new(start);
            for edit in &edits {
                value.set(*edit);
            }
            let expected = *value.draft();
            value.submit();
            value.reset();
            prop_assert_eq!(*value.draft(), expected);
            prop_assert!(!value.is_dirty());
        }

        #[test]
        fn reset_restores_committed(start in any::<i64>(), edit in any::<i64>()) {
            let mut value = Draft::new(start);
            value.set(edit);
            value.reset();
            prop_assert_eq!(*value.draft(), start);
        }
    }
}
