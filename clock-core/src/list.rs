//! Paginated single-selection list used by every menu level.
//!
//! The list tracks a window of `visible_rows` entries and a cursor inside that
//! window. It never navigates on its own; [`ScrollableList::selected`] only
//! reports which entry the cursor is on.

use crate::display::{Frame, Line};
use crate::display::glyphs::{CURSOR, CURSOR_CHAR, CURSOR_SLOT};

/// Rows the menu window spans on the 20x4 panel.
pub const VISIBLE_ROWS: usize = 4;

/// Anything that can be shown as a list row.
pub trait ListEntry {
    fn label(&self) -> &str;
}

/// Cursor movement.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Next,
    Previous,
}

/// Window over a static slice of entries.
#[derive(Debug)]
pub struct ScrollableList<T: 'static> {
    items: &'static [T],
    window_start: usize,
    cursor_in_window: usize,
    visible_rows: usize,
}

impl<T: 'static> Clone for ScrollableList<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for ScrollableList<T> {}

impl<T: 'static> ScrollableList<T> {
    /// List with the standard four-row window.
    pub const fn new(items: &'static [T]) -> Self {
        Self::with_rows(items, VISIBLE_ROWS)
    }

    /// List with a custom window height (at least one row).
    pub const fn with_rows(items: &'static [T], visible_rows: usize) -> Self {
        Self {
            items,
            window_start: 0,
            cursor_in_window: 0,
            visible_rows: if visible_rows == 0 { 1 } else { visible_rows },
        }
    }

    pub const fn items(&self) -> &'static [T] {
        self.items
    }

    pub const fn window_start(&self) -> usize {
        self.window_start
    }

    pub const fn cursor_in_window(&self) -> usize {
        self.cursor_in_window
    }

    pub const fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Absolute index of the highlighted entry.
    pub const fn selected_index(&self) -> usize {
        self.window_start + self.cursor_in_window
    }

    /// Entry under the cursor, or `None` for an empty list.
    pub fn selected(&self) -> Option<&'static T> {
        self.items.get(self.selected_index())
    }

    /// Moves the cursor to the first entry.
    pub fn reset(&mut self) {
        self.window_start = 0;
        self.cursor_in_window = 0;
    }

    /// Moves the cursor one entry, scrolling and wrapping as needed.
    ///
    /// Moving past the last entry returns to the top; moving before the first
    /// entry shows the last full window with the cursor on its bottom row.
    pub fn advance(&mut self, direction: Direction) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let rows = self.visible_rows.min(len);
        match direction {
            Direction::Next => {
                if self.selected_index() + 1 >= len {
                    self.reset();
                } else if self.cursor_in_window + 1 < rows {
                    self.cursor_in_window += 1;
                } else {
                    self.window_start += 1;
                }
            }
            Direction::Previous => {
                if self.selected_index() == 0 {
                    self.window_start = len - rows;
                    self.cursor_in_window = rows - 1;
                } else if self.cursor_in_window > 0 {
                    self.cursor_in_window -= 1;
                } else {
                    self.window_start -= 1;
                }
            }
        }
    }
}

impl<T: ListEntry + 'static> ScrollableList<T> {
    /// Renders the window into `frame` starting at `first_row`.
    ///
    /// The highlighted row starts with the cursor glyph; rows past the end of
    /// the list are blank.
    pub fn render_into(&self, frame: &mut Frame, first_row: usize) {
        frame.set_glyph(CURSOR_SLOT, CURSOR);
        for offset in 0..self.visible_rows {
            let row = first_row + offset;
            let Some(item) = self.items.get(self.window_start + offset) else {
                frame.set_row(row, "");
                continue;
            };
            let marker = if offset == self.cursor_in_window {
                CURSOR_CHAR
            } else {
                ' '
            };
            let mut text = Line::new();
            let _ = text.push(marker);
            let _ = text.push(' ');
            for ch in item.label().chars() {
                if text.push(ch).is_err() {
                    break;
                }
            }
            frame.set_row(row, &text);
        }
    }

    /// Renders the window as a full frame.
    pub fn render(&self) -> Frame {
        let mut frame = Frame::blank();
        self.render_into(&mut frame, 0);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry(&'static str);

    impl ListEntry for Entry {
        fn label(&self) -> &str {
            self.0
        }
    }

    static SIX: [Entry; 6] = [
        Entry("one"),
        Entry("two"),
        Entry("three"),
        Entry("four"),
        Entry("five"),
        Entry("six"),
    ];

    static TWO: [Entry; 2] = [Entry("alpha"), Entry("beta")];

    static EIGHT: [Entry; 8] = [
        Entry("a"),
        Entry("b"),
        Entry("c"),
        Entry("d"),
        Entry("e"),
        Entry("f"),
        Entry("g"),
        Entry("h"),
    ];

    fn state(list: &ScrollableList<Entry>) -> (usize, usize) {
        (list.window_start(), list.cursor_in_window())
    }

    fn assert_window(list: &ScrollableList<Entry>) {
        let len = list.items().len();
        let rows = VISIBLE_ROWS.min(len);
        assert!(list.cursor_in_window() < rows);
        assert!(list.window_start() + rows <= len);
        assert!(list.selected_index() < len);
    }

    /// Navigates from the top of `items` to the given window state.
    fn reach(
        items: &'static [Entry],
        window_start: usize,
        cursor: usize,
    ) -> ScrollableList<Entry> {
        let rows = VISIBLE_ROWS.min(items.len());
        let mut list = ScrollableList::new(items);
        for _ in 0..rows {
            list.advance(Direction::Previous);
        }
        for _ in window_start..items.len() - rows {
            list.advance(Direction::Previous);
        }
        for _ in 0..cursor {
            list.advance(Direction::Next);
        }
        assert_eq!(state(&list), (window_start, cursor));
        list
    }

    #[test]
    fn every_window_state_walks_back_to_its_entry() {
        for len in 1..=EIGHT.len() {
            let items = &EIGHT[..len];
            let rows = VISIBLE_ROWS.min(len);
            for window_start in 0..=len - rows {
                for cursor in 0..rows {
                    let start = reach(items, window_start, cursor);
                    for steps in 0..=2 * len {
                        let mut list = start;
                        for _ in 0..steps {
                            list.advance(Direction::Next);
                            assert_window(&list);
                        }
                        for _ in 0..steps {
                            list.advance(Direction::Previous);
                            assert_window(&list);
                        }
                        assert_eq!(list.selected_index(), start.selected_index());
                        // The window keeps its scroll position on the way
                        // back, so the exact state only returns from the top
                        // row or when the whole list fits.
                        if cursor == 0 || len <= VISIBLE_ROWS {
                            assert_eq!(state(&list), state(&start));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn scroll_position_is_kept_when_walking_back() {
        let mut list = reach(&SIX, 0, 1);
        for _ in 0..4 {
            list.advance(Direction::Next);
        }
        assert_eq!(state(&list), (2, 3));
        for _ in 0..4 {
            list.advance(Direction::Previous);
        }
        assert_eq!(state(&list), (1, 0));
        assert_eq!(list.selected().map(ListEntry::label), Some("two"));
    }

    #[test]
    fn short_lists_pad_with_blank_rows() {
        for len in 0..VISIBLE_ROWS {
            let frame = ScrollableList::new(&EIGHT[..len]).render();
            for row in len..VISIBLE_ROWS {
                assert_eq!(frame.row(row), "                    ");
            }
            if len > 0 {
                assert_eq!(frame.row(0), "\u{0} a                 ");
            }
        }
    }

    #[test]
    fn next_scrolls_then_wraps_to_top() {
        let mut list = ScrollableList::new(&SIX);
        for _ in 0..3 {
            list.advance(Direction::Next);
        }
        assert_eq!((list.window_start(), list.cursor_in_window()), (0, 3));
        list.advance(Direction::Next);
        assert_eq!((list.window_start(), list.cursor_in_window()), (1, 3));
        list.advance(Direction::Next);
        assert_eq!(list.selected().map(ListEntry::label), Some("six"));
        list.advance(Direction::Next);
        assert_eq!((list.window_start(), list.cursor_in_window()), (0, 0));
    }

    #[test]
    fn previous_from_top_shows_last_full_window() {
        let mut list = ScrollableList::new(&SIX);
        list.advance(Direction::Previous);
        assert_eq!((list.window_start(), list.cursor_in_window()), (2, 3));
        assert_eq!(list.selected().map(ListEntry::label), Some("six"));
        list.advance(Direction::Previous);
        assert_eq!((list.window_start(), list.cursor_in_window()), (2, 2));
    }

    #[test]
    fn short_lists_never_scroll() {
        let mut list = ScrollableList::new(&TWO);
        list.advance(Direction::Next);
        assert_eq!((list.window_start(), list.cursor_in_window()), (0, 1));
        list.advance(Direction::Next);
        assert_eq!((list.window_start(), list.cursor_in_window()), (0, 0));
        list.advance(Direction::Previous);
        assert_eq!((list.window_start(), list.cursor_in_window()), (0, 1));

        let frame = list.render();
        assert_eq!(frame.row(0), "  alpha             ");
        assert_eq!(frame.row(1), "\u{0} beta              ");
        assert_eq!(frame.row(2), "                    ");
        assert_eq!(frame.row(3), "                    ");
    }

    #[test]
    fn render_marks_cursor_row_and_loads_glyph() {
        let mut list = ScrollableList::new(&SIX);
        list.advance(Direction::Next);
        let frame = list.render();
        assert_eq!(frame.row(0), "  one               ");
        assert_eq!(frame.row(1), "\u{0} two               ");
        assert_eq!(frame.glyph(CURSOR_SLOT), Some(&CURSOR));
    }

    #[test]
    fn empty_list_is_inert() {
        static NONE: [Entry; 0] = [];
        let mut list = ScrollableList::new(&NONE);
        list.advance(Direction::Next);
        list.advance(Direction::Previous);
        assert!(list.selected().is_none());
        assert_eq!(list.render().row(0), "                    ");
    }
}
