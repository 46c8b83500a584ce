//! Palette lifecycle states and keyboard selection.

use std::ops::Range;

use serde::Serialize;

/// Where the palette is in its lifecycle.
///
/// ```text
/// Closed --open--> OpenEmpty --query >= min--> OpenLoading
/// OpenLoading --merge--> OpenResults | OpenNoResults
/// any open state --Escape / close / dismiss / Enter--> Closed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteState {
    #[default]
    Closed,
    /// Nothing typed yet: recents and quick-links.
    OpenEmpty,
    OpenLoading,
    OpenResults,
    OpenNoResults,
}

impl PaletteState {
    pub fn is_open(self) -> bool {
        self != PaletteState::Closed
    }
}

/// Keys the palette reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKey {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Escape,
}

/// Selected row plus the scroll window over the result list.
///
/// `selected_index` stays within `0..max(result_count, 1)` and never wraps.
/// Moving the selection scrolls the window the minimum amount needed to
/// keep the selected row visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    selected_index: usize,
    result_count: usize,
    scroll_offset: usize,
    visible_rows: usize,
}

impl SelectionState {
    pub fn new(visible_rows: usize) -> Self {
        Self {
            selected_index: 0,
            result_count: 0,
            scroll_offset: 0,
            visible_rows: visible_rows.max(1),
        }
    }

    /// A new result list replaced the old one.
    pub fn reset(&mut self, result_count: usize) {
        self.result_count = result_count;
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    pub fn move_down(&mut self) {
        self.select(self.selected_index.saturating_add(1));
    }

    pub fn move_up(&mut self) {
        self.select(self.selected_index.saturating_sub(1));
    }

    pub fn first(&mut self) {
        self.select(0);
    }

    pub fn last(&mut self) {
        self.select(self.result_count.saturating_sub(1));
    }

    /// Select `index`, clamped to the last row.
    pub fn select(&mut self, index: usize) {
        self.selected_index = index.min(self.result_count.saturating_sub(1));
        self.scroll_into_view();
    }

    fn scroll_into_view(&mut self) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + self.visible_rows {
            self.scroll_offset = self.selected_index + 1 - self.visible_rows;
        }
    }

    /// Selected row, if there are any rows.
    pub fn selected(&self) -> Option<usize> {
        (self.result_count > 0).then_some(self.selected_index)
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Rows currently inside the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.scroll_offset + self.visible_rows).min(self.result_count);
        self.scroll_offset.min(end)..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_down_clamps_at_last_row() {
        let mut selection = SelectionState::new(8);
        selection.reset(3);

        for _ in 0..50 {
            selection.move_down();
        }
        assert_eq!(selection.selected_index(), 2);
        assert_eq!(selection.selected(), Some(2));
    }

    #[test]
    fn test_arrow_up_clamps_at_first_row() {
        let mut selection = SelectionState::new(8);
        selection.reset(3);
        selection.move_down();

        for _ in 0..10 {
            selection.move_up();
        }
        assert_eq!(selection.selected_index(), 0);
    }

    #[test]
    fn test_any_key_sequence_stays_in_bounds() {
        for count in 0..6 {
            let mut selection = SelectionState::new(2);
            selection.reset(count);
            // deterministic pseudo-random walk
            let mut seed: u32 = 7 + count as u32;
            for _ in 0..200 {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                match seed % 4 {
                    0 => selection.move_up(),
                    1 => selection.move_down(),
                    2 => selection.first(),
                    _ => selection.last(),
                }
                assert!(selection.selected_index() < count.max(1));
                assert!(selection.visible_range().contains(&selection.selected_index()) || count == 0);
            }
        }
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut selection = SelectionState::new(8);
        selection.reset(0);
        selection.move_down();

        assert_eq!(selection.selected_index(), 0);
        assert_eq!(selection.selected(), None);
        assert!(selection.visible_range().is_empty());
    }

    #[test]
    fn test_scroll_uses_nearest_alignment() {
        let mut selection = SelectionState::new(3);
        selection.reset(10);

        selection.move_down();
        selection.move_down();
        assert_eq!(selection.scroll_offset(), 0);

        selection.move_down();
        assert_eq!(selection.scroll_offset(), 1);
        assert_eq!(selection.visible_range(), 1..4);

        selection.last();
        assert_eq!(selection.scroll_offset(), 7);

        selection.move_up();
        selection.move_up();
        assert_eq!(selection.scroll_offset(), 7);
        selection.move_up();
        assert_eq!(selection.scroll_offset(), 6);

        selection.first();
        assert_eq!(selection.scroll_offset(), 0);
    }

    #[test]
    fn test_reset_returns_to_top() {
        let mut selection = SelectionState::new(3);
        selection.reset(10);
        selection.last();
        selection.reset(4);

        assert_eq!(selection.selected_index(), 0);
        assert_eq!(selection.scroll_offset(), 0);
    }

    #[test]
    fn test_state_is_open() {
        assert!(!PaletteState::Closed.is_open());
        assert!(PaletteState::OpenEmpty.is_open());
        assert!(PaletteState::OpenNoResults.is_open());
    }
}
