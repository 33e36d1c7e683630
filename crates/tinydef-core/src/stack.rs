//! Bounded LIFO stack with inline storage.

use smallvec::SmallVec;

/// A stack holding at most `N` elements, stored inline.
///
/// Pushing onto a full stack hands the value back instead of spilling to
/// the heap.
#[derive(Clone, Debug)]
pub struct Stack<T, const N: usize> {
    items: SmallVec<[T; N]>,
}

impl<T, const N: usize> Stack<T, N> {
    /// Maximum number of elements.
    pub const CAPACITY: usize = N;

    /// An empty stack.
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Push `value`, or return it if the stack is full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.items.push(value);
        Ok(())
    }

    /// Remove and return the top element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// The top element.
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Mutable access to the top element.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if another push would fail.
    pub fn is_full(&self) -> bool {
        self.items.len() >= N
    }

    /// Drop every element.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Elements from bottom to top.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T, const N: usize> Default for Stack<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut stack = Stack::<u32, 4>::new();
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();
        assert_eq!(stack.peek(), Some(&3));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.as_slice(), &[1u32]);
    }

    #[test]
    fn full_stack_returns_value() {
        let mut stack = Stack::<&str, 2>::new();
        stack.push("a").unwrap();
        stack.push("b").unwrap();
        assert!(stack.is_full());
        assert_eq!(stack.push("c"), Err("c"));
        assert_eq!(stack.len(), Stack::<&str, 2>::CAPACITY);
    }

    #[test]
    fn empty_pop_and_peek() {
        let mut stack = Stack::<String, 3>::default();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
        assert!(stack.peek().is_none());
    }

    #[test]
    fn reset_and_peek_mut() {
        let mut stack = Stack::<i32, 3>::new();
        stack.push(5).unwrap();
        *stack.peek_mut().unwrap() += 1;
        assert_eq!(stack.pop(), Some(6));
        stack.push(1).unwrap();
        stack.reset();
        assert!(stack.is_empty());
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut stack = Stack::<u8, 0>::new();
        assert!(stack.is_full());
        assert_eq!(stack.push(1), Err(1));
    }
}
