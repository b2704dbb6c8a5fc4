//! Parser utilities.

use alloc::vec::Vec;

use heapless::Deque;

use crate::parser::{Element, Parser};

/// A growable circular FIFO buffer.
///
/// The buffer only grows (doubling its capacity) when it is full, and never shrinks.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    const MIN_CAPACITY: usize = 4;

    /// Create an empty buffer. Does not allocate until the first push.
    pub const fn new() -> Self {
        RingBuffer {
            slots: Vec::new(),
            head: 0,
            len: 0,
        }
    }

    /// Number of items in the buffer.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no item.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of items the buffer can hold before growing.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Append an item at the back.
    pub fn push_back(&mut self, item: T) {
        if self.len == self.slots.len() {
            self.grow();
        }

        let tail = (self.head + self.len) % self.slots.len();
        self.slots[tail] = Some(item);
        self.len += 1;
    }

    /// Remove and return the item at the front.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;

        item
    }

    /// Peek at the item at the front.
    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }

        self.slots[self.head].as_ref()
    }

    /// Iterate over the items from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let capacity = self.slots.len();

        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }

    /// Drop every item, keeping the allocated capacity.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
        self.head = 0;
    }

    fn grow(&mut self) {
        let capacity = core::cmp::max(Self::MIN_CAPACITY, self.slots.len() * 2);
        let old = self.slots.len();

        // Unroll the wrapped content so that the front lands at index 0.
        let mut slots = Vec::with_capacity(capacity);
        for i in 0..self.len {
            slots.push(self.slots[(self.head + i) % old].take());
        }
        slots.resize_with(capacity, || None);

        self.slots = slots;
        self.head = 0;
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximum number of elements that can be pushed back into a [`Lookahead`].
pub const LOOKAHEAD_DEPTH: usize = 2;

/// An element cursor with bounded pushback.
///
/// Elements given back with [`Lookahead::unread`] are returned first, most recent first.
#[derive(Clone, Debug)]
pub struct Lookahead<'a> {
    elements: Parser<'a>,
    pushback: Deque<Element, LOOKAHEAD_DEPTH>,
}

impl<'a> Lookahead<'a> {
    /// Create a lookahead cursor over an element parser.
    pub fn new(elements: Parser<'a>) -> Self {
        Lookahead {
            elements,
            pushback: Deque::new(),
        }
    }

    /// Retrieve the next element, either a pushed-back one or a freshly parsed one.
    pub fn next_element(&mut self) -> Element {
        match self.pushback.pop_front() {
            Some(element) => element,
            None => self.elements.next_element(),
        }
    }

    /// Give an element back so that the next call to [`Lookahead::next_element`] returns it.
    ///
    /// # Panics
    ///
    /// Panics if more than [`LOOKAHEAD_DEPTH`] elements are pending, which is an interpreter bug.
    pub fn unread(&mut self, element: Element) {
        if self.pushback.push_front(element).is_err() {
            unreachable!("lookahead pushback is limited to {} elements", LOOKAHEAD_DEPTH);
        }
    }

    /// Peek at the next element without consuming it.
    pub fn peek(&mut self) -> &Element {
        if self.pushback.is_empty() {
            let element = self.elements.next_element();
            self.unread(element);
        }

        match self.pushback.front() {
            Some(element) => element,
            None => unreachable!("lookahead pushback cannot be empty after a refill"),
        }
    }

    /// Check if the underlying parser switched to passthrough mode.
    #[inline(always)]
    pub fn is_passthrough(&self) -> bool {
        self.elements.is_passthrough()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use googletest::prelude::*;

    use super::*;

    #[test]
    fn it_should_pop_in_push_order() {
        let mut buffer = RingBuffer::new();
        buffer.push_back(1);
        buffer.push_back(2);
        buffer.push_back(3);

        assert_that!(buffer.len(), eq(3));
        assert_that!(buffer.pop_front(), eq(Some(1)));
        assert_that!(buffer.pop_front(), eq(Some(2)));
        assert_that!(buffer.pop_front(), eq(Some(3)));
        assert_that!(buffer.pop_front(), eq(None));
        assert_that!(buffer.is_empty(), eq(true));
    }

    #[test]
    fn it_should_keep_order_when_growing_while_wrapped() {
        let mut buffer = RingBuffer::new();
        for i in 0..4 {
            buffer.push_back(i);
        }

        // Move the head forward so that the next pushes wrap around.
        assert_that!(buffer.pop_front(), eq(Some(0)));
        assert_that!(buffer.pop_front(), eq(Some(1)));
        for i in 4..10 {
            buffer.push_back(i);
        }

        assert_that!(buffer.capacity(), eq(8));
        assert_that!(buffer.front().copied(), eq(Some(2)));

        let items: Vec<i32> = buffer.iter().copied().collect();
        assert_that!(items.as_slice(), eq(&[2, 3, 4, 5, 6, 7, 8, 9]));
    }

    #[test]
    fn it_should_clear_items() {
        let mut buffer = RingBuffer::new();
        buffer.push_back(String::from("a"));
        buffer.push_back(String::from("b"));
        buffer.clear();

        assert_that!(buffer.is_empty(), eq(true));
        assert_that!(buffer.iter().count(), eq(0));
    }

    #[test]
    fn it_should_return_unread_elements_first() {
        let mut lookahead = Lookahead::new(Parser::new(&["-a", "value"]));

        let first = lookahead.next_element();
        assert_that!(first == Element::ShortBlockSolo(String::from("a")), eq(true));

        lookahead.unread(first.clone());
        assert_that!(lookahead.next_element() == first, eq(true));
        assert_that!(
            lookahead.next_element() == Element::PlainText(String::from("value")),
            eq(true)
        );
        assert_that!(lookahead.next_element() == Element::End, eq(true));
    }

    #[test]
    fn it_should_peek_without_consuming() {
        let mut lookahead = Lookahead::new(Parser::new(&["--flag"]));

        assert_that!(
            *lookahead.peek() == Element::LongFlagSolo(String::from("flag")),
            eq(true)
        );
        assert_that!(
            lookahead.next_element() == Element::LongFlagSolo(String::from("flag")),
            eq(true)
        );
        assert_that!(*lookahead.peek() == Element::End, eq(true));
    }

    #[test]
    fn it_should_report_passthrough_once_boundary_is_read() {
        let mut lookahead = Lookahead::new(Parser::new(&["--", "-x"]));

        assert_that!(lookahead.is_passthrough(), eq(false));
        assert_that!(lookahead.next_element() == Element::Boundary, eq(true));
        assert_that!(lookahead.is_passthrough(), eq(true));
        assert_that!(
            lookahead.next_element() == Element::PlainText(String::from("-x")),
            eq(true)
        );
    }
}
