//! Linked lists.
//!
//! [`DoublyLinkedList`] keeps its nodes in an arena and hands out [`NodeId`]
//! handles, so nodes can be created, linked, unlinked and relinked without
//! raw pointers. Handles carry the owning list and a slot generation: a
//! handle from another list, or to a removed node, is rejected instead of
//! aliasing whatever now occupies the slot.

use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

const EINVAL: i32 = 22;
const ENOLINK: i32 = 67;

static NEXT_LIST_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("invalid node handle or argument")]
    InvalidArgument,

    #[error("node is not linked into the list")]
    NoLink,
}

impl ListError {
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument => EINVAL,
            Self::NoLink => ENOLINK,
        }
    }
}

pub type ListResult<T> = std::result::Result<T, ListError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    list: u32,
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Node<T> {
    data: T,
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

#[derive(Debug)]
pub struct DoublyLinkedList<T> {
    id: u32,
    slots: Vec<Option<Node<T>>>,
    generations: Vec<u32>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    count: usize,
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DoublyLinkedList<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            count: 0,
        }
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn handle(&self, index: usize) -> NodeId {
        NodeId {
            list: self.id,
            index,
            generation: self.generations[index],
        }
    }

    fn resolve(&self, id: NodeId) -> ListResult<usize> {
        let live = id.list == self.id
            && self.generations.get(id.index) == Some(&id.generation)
            && matches!(self.slots.get(id.index), Some(Some(_)));
        if !live {
            return Err(ListError::InvalidArgument);
        }
        Ok(id.index)
    }

    // a missing neighbour means the chain is broken
    fn node(&self, index: usize) -> ListResult<&Node<T>> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(ListError::NoLink)
    }

    fn node_mut(&mut self, index: usize) -> ListResult<&mut Node<T>> {
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(ListError::NoLink)
    }

    /// Allocates an unlinked node holding `data`.
    pub fn create_node(&mut self, data: T) -> NodeId {
        let node = Node {
            data,
            prev: None,
            next: None,
            linked: false,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.generations.push(0);
                self.slots.len() - 1
            }
        };
        self.handle(index)
    }

    /// Creates a node and links it at the end of the list.
    pub fn push_back(&mut self, data: T) -> ListResult<NodeId> {
        let id = self.create_node(data);
        self.link_after_tail(id.index)?;
        Ok(id)
    }

    fn link_after_tail(&mut self, index: usize) -> ListResult<()> {
        let tail = self.tail;
        if let Some(t) = tail {
            self.node_mut(t)?.next = Some(index);
        }

        let node = self.node_mut(index)?;
        node.prev = tail;
        node.next = None;
        node.linked = true;

        if tail.is_none() {
            self.head = Some(index);
        }
        self.tail = Some(index);
        self.count += 1;
        Ok(())
    }

    /// Links an unlinked node at the end of the list.
    pub fn append(&mut self, id: NodeId) -> ListResult<()> {
        let index = self.resolve(id)?;
        if self.node(index)?.linked {
            return Err(ListError::InvalidArgument);
        }
        self.link_after_tail(index)
    }

    /// Links an unlinked node directly before `at`.
    pub fn insert_before(&mut self, id: NodeId, at: NodeId) -> ListResult<()> {
        let index = self.resolve(id)?;
        let at_index = self.resolve(at)?;
        if self.node(index)?.linked || index == at_index {
            return Err(ListError::InvalidArgument);
        }
        let at_node = self.node(at_index)?;
        if !at_node.linked {
            return Err(ListError::NoLink);
        }

        let prev = at_node.prev;
        match prev {
            Some(p) => self.node_mut(p)?.next = Some(index),
            None => self.head = Some(index),
        }
        self.node_mut(at_index)?.prev = Some(index);

        let node = self.node_mut(index)?;
        node.prev = prev;
        node.next = Some(at_index);
        node.linked = true;
        self.count += 1;
        Ok(())
    }

    /// Unlinks a node, keeping it allocated so it can be linked again.
    pub fn unlink(&mut self, id: NodeId) -> ListResult<()> {
        let index = self.resolve(id)?;
        let node = self.node(index)?;
        if !node.linked {
            return Err(ListError::NoLink);
        }

        let (prev, next) = (node.prev, node.next);
        match prev {
            Some(p) => self.node_mut(p)?.next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n)?.prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(index)?;
        node.prev = None;
        node.next = None;
        node.linked = false;
        self.count -= 1;
        Ok(())
    }

    /// Unlinks (if linked) and frees a node, returning its data.
    pub fn remove(&mut self, id: NodeId) -> ListResult<T> {
        let index = self.resolve(id)?;
        if self.node(index)?.linked {
            self.unlink(id)?;
        }
        let node = self.slots[index].take().ok_or(ListError::InvalidArgument)?;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free.push(index);
        Ok(node.data)
    }

    /// Moves every linked node of `src` to the end of this list, leaving
    /// `src` empty. Returns the handles of the moved nodes, in order.
    pub fn append_list(&mut self, src: &mut DoublyLinkedList<T>) -> ListResult<Vec<NodeId>> {
        if src.id == self.id {
            return Err(ListError::InvalidArgument);
        }

        let mut moved = Vec::with_capacity(src.count);
        while let Some(head) = src.head {
            let id = src.handle(head);
            let data = src.remove(id)?;
            moved.push(self.push_back(data)?);
        }
        Ok(moved)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.head.map(|i| self.handle(i))
    }

    pub fn last(&self) -> Option<NodeId> {
        self.tail.map(|i| self.handle(i))
    }

    pub fn next(&self, id: NodeId) -> ListResult<Option<NodeId>> {
        let index = self.resolve(id)?;
        Ok(self.node(index)?.next.map(|i| self.handle(i)))
    }

    pub fn prev(&self, id: NodeId) -> ListResult<Option<NodeId>> {
        let index = self.resolve(id)?;
        Ok(self.node(index)?.prev.map(|i| self.handle(i)))
    }

    pub fn get(&self, id: NodeId) -> ListResult<&T> {
        let index = self.resolve(id)?;
        Ok(&self.node(index)?.data)
    }

    pub fn get_mut(&mut self, id: NodeId) -> ListResult<&mut T> {
        let index = self.resolve(id)?;
        Ok(&mut self.node_mut(index)?.data)
    }

    pub fn is_linked(&self, id: NodeId) -> bool {
        self.resolve(id)
            .and_then(|index| self.node(index))
            .map(|node| node.linked)
            .unwrap_or(false)
    }

    /// Iterates linked data from head to tail.
    pub fn iter(&self) -> DoublyIter<'_, T> {
        DoublyIter {
            list: self,
            cursor: self.head,
        }
    }
}

pub struct DoublyIter<'a, T> {
    list: &'a DoublyLinkedList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for DoublyIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?).ok()?;
        self.cursor = node.next;
        Some(&node.data)
    }
}

#[derive(Debug)]
struct SinglyNode<T> {
    data: T,
    next: Option<Box<SinglyNode<T>>>,
}

/// A stack-like singly linked list: push and pop at the head.
#[derive(Debug)]
pub struct SinglyLinkedList<T> {
    head: Option<Box<SinglyNode<T>>>,
    count: usize,
}

impl<T> Default for SinglyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SinglyLinkedList<T> {
    pub fn new() -> Self {
        Self {
            head: None,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn push(&mut self, data: T) {
        let next = self.head.take();
        self.head = Some(Box::new(SinglyNode { data, next }));
        self.count += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        let node = self.head.take()?;
        self.head = node.next;
        self.count -= 1;
        Some(node.data)
    }

    pub fn peek(&self) -> Option<&T> {
        self.head.as_ref().map(|n| &n.data)
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.head.as_mut().map(|n| &mut n.data)
    }

    pub fn iter(&self) -> SinglyIter<'_, T> {
        SinglyIter {
            cursor: self.head.as_deref(),
        }
    }
}

impl<T> Drop for SinglyLinkedList<T> {
    fn drop(&mut self) {
        // iterative, so long lists don't recurse through Box drops
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

pub struct SinglyIter<'a, T> {
    cursor: Option<&'a SinglyNode<T>>,
}

impl<'a, T> Iterator for SinglyIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor?;
        self.cursor = node.next.as_deref();
        Some(&node.data)
    }
}
