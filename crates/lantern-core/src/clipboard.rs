//! Clipboard aggregation for harvested reply snippets.
//!
//! This module contains the ordered collection of text snippets copied out of
//! assistant replies, with selection, merge, and deletion operations.

use crate::error::{LanternError, Result};

/// Separator placed between snippets when they are merged or exported.
pub const SNIPPET_SEPARATOR: &str = "\n\n";

/// A single harvested snippet.
///
/// The selection flag is transient: it is meaningful only while the item
/// exists and is never persisted or exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    /// The snippet text.
    pub content: String,
    /// Whether the item is currently selected for a merge.
    pub selected: bool,
}

impl ClipboardItem {
    fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            selected: false,
        }
    }
}

/// Holds an ordered collection of text snippets supporting selection,
/// merge, and deletion.
///
/// Items keep their relative order through every operation. Selection is
/// tracked per item, so deleting an item implicitly renumbers the selection:
/// positions after the removed one shift down by one and the removed position
/// drops out.
#[derive(Debug, Default)]
pub struct ClipboardAggregator {
    items: Vec<ClipboardItem>,
}

impl ClipboardAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snippet at the end, unselected.
    pub fn add_item(&mut self, content: impl Into<String>) {
        self.items.push(ClipboardItem::new(content));
    }

    /// Removes the item at `index`.
    ///
    /// Items after it shift down by one, which keeps the remaining
    /// selection flags attached to the right snippets.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `index` is out of range.
    pub fn delete_item(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.items.remove(index);
        Ok(())
    }

    /// Flips whether the item at `index` is selected.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `index` is out of range.
    pub fn toggle_select(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.items[index].selected = !self.items[index].selected;
        Ok(())
    }

    /// Merges every item into one.
    ///
    /// Concatenates all contents in order, separated by a blank line, and
    /// replaces the whole collection with that single unselected item.
    /// No-op when fewer than 2 items exist.
    pub fn merge_all(&mut self) {
        if self.items.len() < 2 {
            return;
        }

        let merged = self
            .items
            .iter()
            .map(|item| item.content.as_str())
            .collect::<Vec<_>>()
            .join(SNIPPET_SEPARATOR);

        self.items = vec![ClipboardItem::new(merged)];
    }

    /// Merges the selected items into one.
    ///
    /// Concatenates the selected contents in ascending position order
    /// (independent of the order they were toggled in), removes them, and
    /// inserts the merged item at the position the earliest-selected item
    /// occupied. The selection is cleared. No-op when fewer than 2 items
    /// are selected.
    pub fn merge_selected(&mut self) {
        let selected = self.selected_indices();
        if selected.len() < 2 {
            return;
        }

        let merged = selected
            .iter()
            .map(|&i| self.items[i].content.as_str())
            .collect::<Vec<_>>()
            .join(SNIPPET_SEPARATOR);

        // The earliest-selected position receives the merged item; the other
        // selected items are removed back to front so indices stay valid.
        let first = selected[0];
        self.items[first] = ClipboardItem::new(merged);
        for &i in selected[1..].iter().rev() {
            self.items.remove(i);
        }
    }

    /// The snippets in order.
    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    /// The snippet texts in order.
    pub fn contents(&self) -> Vec<String> {
        self.items.iter().map(|item| item.content.clone()).collect()
    }

    /// Positions of the currently selected items, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.selected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of snippets held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the aggregator holds no snippets.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(LanternError::not_found("clipboard item", index.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator_with(contents: &[&str]) -> ClipboardAggregator {
        let mut aggregator = ClipboardAggregator::new();
        for content in contents {
            aggregator.add_item(*content);
        }
        aggregator
    }

    #[test]
    fn test_add_item_appends_unselected() {
        let aggregator = aggregator_with(&["a", "b"]);
        assert_eq!(aggregator.contents(), vec!["a", "b"]);
        assert!(aggregator.selected_indices().is_empty());
    }

    #[test]
    fn test_delete_item_out_of_range() {
        let mut aggregator = aggregator_with(&["a"]);
        let err = aggregator.delete_item(1).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_delete_item_renumbers_selection() {
        let mut aggregator = aggregator_with(&["a", "b", "c", "d"]);
        aggregator.toggle_select(3).unwrap();

        aggregator.delete_item(1).unwrap();

        // The selected snippet "d" now lives at position 2
        assert_eq!(aggregator.selected_indices(), vec![2]);
        assert_eq!(aggregator.items()[2].content, "d");
    }

    #[test]
    fn test_delete_selected_item_drops_it_from_selection() {
        let mut aggregator = aggregator_with(&["a", "b", "c"]);
        aggregator.toggle_select(1).unwrap();

        aggregator.delete_item(1).unwrap();

        assert!(aggregator.selected_indices().is_empty());
        assert_eq!(aggregator.contents(), vec!["a", "c"]);
    }

    #[test]
    fn test_delete_then_toggle_matches_renumbered_collection() {
        // Operating on the original collection after a delete...
        let mut left = aggregator_with(&["a", "b", "c", "d"]);
        left.delete_item(1).unwrap();
        left.toggle_select(2).unwrap();

        // ...behaves identically to operating on the post-delete collection.
        let mut right = aggregator_with(&["a", "c", "d"]);
        right.toggle_select(2).unwrap();

        assert_eq!(left.contents(), right.contents());
        assert_eq!(left.selected_indices(), right.selected_indices());
    }

    #[test]
    fn test_toggle_select_out_of_range() {
        let mut aggregator = aggregator_with(&[]);
        let err = aggregator.toggle_select(0).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_toggle_select_flips_membership() {
        let mut aggregator = aggregator_with(&["a", "b"]);

        aggregator.toggle_select(1).unwrap();
        assert_eq!(aggregator.selected_indices(), vec![1]);

        aggregator.toggle_select(1).unwrap();
        assert!(aggregator.selected_indices().is_empty());
    }

    #[test]
    fn test_merge_all_joins_in_order() {
        let mut aggregator = aggregator_with(&["x", "y", "z"]);
        aggregator.toggle_select(0).unwrap();

        aggregator.merge_all();

        assert_eq!(aggregator.contents(), vec!["x\n\ny\n\nz"]);
        assert!(aggregator.selected_indices().is_empty());
    }

    #[test]
    fn test_merge_all_noop_below_two_items() {
        let mut aggregator = aggregator_with(&["only"]);
        aggregator.merge_all();
        assert_eq!(aggregator.contents(), vec!["only"]);

        let mut empty = ClipboardAggregator::new();
        empty.merge_all();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_merge_selected_inserts_at_earliest_position() {
        let mut aggregator = aggregator_with(&["x", "y", "z"]);
        aggregator.toggle_select(0).unwrap();
        aggregator.toggle_select(2).unwrap();

        aggregator.merge_selected();

        assert_eq!(aggregator.contents(), vec!["x\n\nz", "y"]);
        assert!(aggregator.selected_indices().is_empty());
    }

    #[test]
    fn test_merge_selected_commutative_over_toggle_order() {
        let mut forward = aggregator_with(&["x", "y", "z"]);
        forward.toggle_select(0).unwrap();
        forward.toggle_select(2).unwrap();
        forward.merge_selected();

        let mut reverse = aggregator_with(&["x", "y", "z"]);
        reverse.toggle_select(2).unwrap();
        reverse.toggle_select(0).unwrap();
        reverse.merge_selected();

        assert_eq!(forward.contents(), reverse.contents());
        assert_eq!(forward.contents(), vec!["x\n\nz", "y"]);
    }

    #[test]
    fn test_merge_selected_noop_below_two_selected() {
        let mut aggregator = aggregator_with(&["a", "b", "c"]);
        aggregator.toggle_select(1).unwrap();

        aggregator.merge_selected();

        assert_eq!(aggregator.contents(), vec!["a", "b", "c"]);
        // The lone selection survives an ignored merge
        assert_eq!(aggregator.selected_indices(), vec![1]);
    }

    #[test]
    fn test_merge_selected_middle_items() {
        let mut aggregator = aggregator_with(&["a", "b", "c", "d"]);
        aggregator.toggle_select(1).unwrap();
        aggregator.toggle_select(2).unwrap();

        aggregator.merge_selected();

        assert_eq!(aggregator.contents(), vec!["a", "b\n\nc", "d"]);
    }
}
