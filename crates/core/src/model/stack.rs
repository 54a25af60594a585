//! Auxiliary stacks that follow `q`/`Q` nesting.
//!
//! The color-space and font stacks start empty and only gain an entry once a
//! space or font is first selected. Saving duplicates the top when there is
//! one and does nothing otherwise; restoring pops when non-empty. Their depth
//! therefore tracks save/restore nesting only after the first selection.

/// Stack with duplicate-top-or-no-op push and pop-if-present semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct StateStack<T> {
    items: Vec<T>,
}

impl<T: Clone> StateStack<T> {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Duplicate the top entry. No-op on an empty stack.
    pub fn push_duplicate(&mut self) {
        if let Some(top) = self.items.last() {
            let top = top.clone();
            self.items.push(top);
        }
    }

    /// Pop the top entry if there is one.
    pub fn pop_if_present(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Replace the top entry, or push one onto an empty stack.
    pub fn set_top(&mut self, value: T) {
        match self.items.last_mut() {
            Some(top) => *top = value,
            None => self.items.push(value),
        }
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> Default for StateStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_on_empty_is_noop() {
        let mut stack: StateStack<i32> = StateStack::new();
        stack.push_duplicate();
        assert!(stack.is_empty());
        assert_eq!(stack.pop_if_present(), None);
    }

    #[test]
    fn duplicate_then_restore() {
        let mut stack = StateStack::new();
        stack.set_top(1);
        stack.push_duplicate();
        stack.set_top(2);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.peek(), Some(&2));
        stack.pop_if_present();
        assert_eq!(stack.peek(), Some(&1));
    }
}
