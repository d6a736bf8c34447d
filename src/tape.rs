//! This module defines the `Tape`, the machine's unbounded storage.
//!
//! Only a finite window of the conceptually infinite tape is stored. The head may move
//! anywhere, including to negative positions or past the right end of the window;
//! cells outside the window read as the blank symbol. Storage only grows when a symbol
//! is written outside the window.

use crate::types::Direction;
use std::collections::VecDeque;

/// A single-head tape with a blank fill symbol.
///
/// Cells are kept in a `VecDeque` so that extending the window to the left does not
/// shift the existing cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<char>,
    blank: char,
    head: isize,
}

impl Tape {
    /// Creates a tape holding `content` with the head on its first cell.
    pub fn new(content: &str, blank: char) -> Self {
        Self {
            cells: content.chars().collect(),
            blank,
            head: 0,
        }
    }

    /// Returns the symbol under the head.
    ///
    /// Positions outside the stored window read as blank; reading never grows the tape.
    pub fn current_symbol(&self) -> char {
        self.index().map_or(self.blank, |i| self.cells[i])
    }

    /// Writes `symbol` under the head, first extending the window to cover the head.
    ///
    /// Extending to the left prepends blanks and renumbers the window so that the head,
    /// and the new leftmost cell, are at position 0.
    ///
    /// ```
    /// use tape_machine::{Direction, Tape};
    ///
    /// let mut tape = Tape::new("ab", '_');
    /// tape.move_head(Direction::Left);
    /// tape.move_head(Direction::Left);
    /// tape.write('x');
    ///
    /// assert_eq!(tape.contents(), "x_ab");
    /// assert_eq!(tape.head_position(), 0);
    /// ```
    pub fn write(&mut self, symbol: char) {
        if self.head < 0 {
            for _ in 0..self.head.unsigned_abs() {
                self.cells.push_front(self.blank);
            }
            self.head = 0;
        } else if self.head as usize >= self.cells.len() {
            self.cells.resize(self.head as usize + 1, self.blank);
        }

        let i = self.head as usize;
        self.cells[i] = symbol;
    }

    /// Moves the head one cell. No storage is touched.
    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.head -= 1,
            Direction::Right => self.head += 1,
        }
    }

    /// Returns the stored window as a string.
    pub fn contents(&self) -> String {
        self.cells.iter().collect()
    }

    /// Returns the head position relative to the first stored cell. May be negative or
    /// past the end of the window.
    pub fn head_position(&self) -> isize {
        self.head
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Maps the head position to a stored cell, if it lies inside the window.
    fn index(&self) -> Option<usize> {
        usize::try_from(self.head)
            .ok()
            .filter(|&i| i < self.cells.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tape() {
        let tape = Tape::new("abc", '_');

        assert_eq!(tape.contents(), "abc");
        assert_eq!(tape.head_position(), 0);
        assert_eq!(tape.current_symbol(), 'a');
        assert_eq!(tape.len(), 3);
        assert_eq!(tape.blank(), '_');
    }

    #[test]
    fn test_empty_tape_reads_blank() {
        let tape = Tape::new("", ' ');

        assert!(tape.is_empty());
        assert_eq!(tape.current_symbol(), ' ');
    }

    #[test]
    fn test_read_outside_window_does_not_grow() {
        let mut tape = Tape::new("ab", '_');

        tape.move_head(Direction::Left);
        assert_eq!(tape.current_symbol(), '_');
        assert_eq!(tape.head_position(), -1);

        for _ in 0..5 {
            tape.move_head(Direction::Right);
        }
        assert_eq!(tape.current_symbol(), '_');
        assert_eq!(tape.head_position(), 4);
        assert_eq!(tape.contents(), "ab");
    }

    #[test]
    fn test_write_in_window() {
        let mut tape = Tape::new("abc", '_');
        tape.move_head(Direction::Right);
        tape.write('x');

        assert_eq!(tape.contents(), "axc");
        assert_eq!(tape.head_position(), 1);
    }

    #[test]
    fn test_write_extends_right() {
        let mut tape = Tape::new("ab", '_');
        for _ in 0..4 {
            tape.move_head(Direction::Right);
        }
        tape.write('x');

        assert_eq!(tape.contents(), "ab__x");
        assert_eq!(tape.head_position(), 4);
        assert_eq!(tape.current_symbol(), 'x');
    }

    #[test]
    fn test_write_extends_left_and_renumbers_head() {
        let mut tape = Tape::new("ab", '_');
        for _ in 0..3 {
            tape.move_head(Direction::Left);
        }
        tape.write('x');

        assert_eq!(tape.contents(), "x__ab");
        assert_eq!(tape.head_position(), 0);
        assert_eq!(tape.current_symbol(), 'x');

        // The old first cell is now at position 3.
        for _ in 0..3 {
            tape.move_head(Direction::Right);
        }
        assert_eq!(tape.current_symbol(), 'a');
    }

    #[test]
    fn test_write_on_empty_tape() {
        let mut tape = Tape::new("", ' ');
        tape.write('1');

        assert_eq!(tape.contents(), "1");
        assert_eq!(tape.head_position(), 0);
    }

    #[test]
    fn test_move_does_not_change_contents() {
        let mut tape = Tape::new("abc", '_');
        tape.move_head(Direction::Left);
        tape.move_head(Direction::Right);

        assert_eq!(tape.head_position(), 0);
        assert_eq!(tape.contents(), "abc");
    }
}
