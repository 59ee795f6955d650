//! Slot arena and intrusive doubly-linked list.
//!
//! Every level of the layout tree (windows in a column, columns in a
//! workspace, workspaces on the desktop) is an ordered list whose nodes live
//! in an [`Arena`]. Nodes embed a [`Link`] and are addressed by typed keys,
//! so `prev`/`next` are plain indices instead of references.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A typed index into an [`Arena`].
pub trait Key: Copy + Eq + fmt::Debug {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

/// Declare a newtype key for one arena.
macro_rules! arena_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $crate::list::Key for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}
pub(crate) use arena_key;

/// Slot storage with index reuse.
#[derive(Debug, Clone)]
pub struct Arena<K, T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    _key: PhantomData<K>,
}

impl<K, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            _key: PhantomData,
        }
    }
}

impl<K: Key, T> Arena<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value and return its key.
    pub fn insert(&mut self, value: T) -> K {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                K::from_index(index)
            }
            None => {
                self.slots.push(Some(value));
                K::from_index(self.slots.len() - 1)
            }
        }
    }

    /// Take a value out; its slot becomes reusable.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let value = self.slots.get_mut(key.index())?.take();
        if value.is_some() {
            self.free.push(key.index());
        }
        value
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Key, T> Index<K> for Arena<K, T> {
    type Output = T;

    fn index(&self, key: K) -> &T {
        match self.get(key) {
            Some(value) => value,
            None => panic!("stale arena key {key:?}"),
        }
    }
}

impl<K: Key, T> IndexMut<K> for Arena<K, T> {
    fn index_mut(&mut self, key: K) -> &mut T {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("stale arena key {key:?}"),
        }
    }
}

/// Neighbour pointers embedded in every list node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<K> {
    pub prev: Option<K>,
    pub next: Option<K>,
}

impl<K> Default for Link<K> {
    fn default() -> Self {
        Self {
            prev: None,
            next: None,
        }
    }
}

/// A value that can be threaded onto a [`List`].
pub trait Linked<K> {
    fn link(&self) -> &Link<K>;
    fn link_mut(&mut self) -> &mut Link<K>;
}

/// Ordered doubly-linked list over nodes stored in an arena.
///
/// The list only records its head and live size; all other structure sits in
/// the nodes' [`Link`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct List<K> {
    head: Option<K>,
    len: usize,
}

impl<K> Default for List<K> {
    fn default() -> Self {
        Self { head: None, len: 0 }
    }
}

impl<K: Key> List<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(&self) -> Option<K> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn prev<T: Linked<K>>(&self, arena: &Arena<K, T>, node: K) -> Option<K> {
        arena[node].link().prev
    }

    pub fn next<T: Linked<K>>(&self, arena: &Arena<K, T>, node: K) -> Option<K> {
        arena[node].link().next
    }

    /// Neighbour of `node` in the given direction.
    pub fn step<T: Linked<K>>(
        &self,
        arena: &Arena<K, T>,
        node: K,
        direction: crate::Direction,
    ) -> Option<K> {
        match direction {
            crate::Direction::Backward => self.prev(arena, node),
            crate::Direction::Forward => self.next(arena, node),
        }
    }

    /// Link `node` in right after `after`, or at the head when `after` is `None`.
    pub fn insert<T: Linked<K>>(&mut self, arena: &mut Arena<K, T>, node: K, after: Option<K>) {
        let next = match after {
            Some(anchor) => arena[anchor].link().next,
            None => self.head,
        };

        *arena[node].link_mut() = Link { prev: after, next };
        self.point_after(arena, after, node);
        if let Some(next) = next {
            arena[next].link_mut().prev = Some(node);
        }
        self.len += 1;
    }

    /// Unlink `node`, joining its neighbours. The node's own links are cleared.
    pub fn remove<T: Linked<K>>(&mut self, arena: &mut Arena<K, T>, node: K) {
        let Link { prev, next } = *arena[node].link();

        match prev {
            Some(prev) => arena[prev].link_mut().next = next,
            None => self.head = next,
        }
        if let Some(next) = next {
            arena[next].link_mut().prev = prev;
        }

        *arena[node].link_mut() = Link::default();
        self.len -= 1;
    }

    /// Exchange the positions of two members.
    pub fn swap<T: Linked<K>>(&mut self, arena: &mut Arena<K, T>, a: K, b: K) {
        if a == b {
            return;
        }

        // Adjacent pairs are handled with `a` directly before `b`.
        let (a, b) = if arena[b].link().next == Some(a) {
            (b, a)
        } else {
            (a, b)
        };

        let Link {
            prev: a_prev,
            next: a_next,
        } = *arena[a].link();
        let Link {
            prev: b_prev,
            next: b_next,
        } = *arena[b].link();

        if a_next == Some(b) {
            *arena[b].link_mut() = Link {
                prev: a_prev,
                next: Some(a),
            };
            *arena[a].link_mut() = Link {
                prev: Some(b),
                next: b_next,
            };
            self.point_after(arena, a_prev, b);
            if let Some(next) = b_next {
                arena[next].link_mut().prev = Some(a);
            }
        } else {
            *arena[a].link_mut() = Link {
                prev: b_prev,
                next: b_next,
            };
            *arena[b].link_mut() = Link {
                prev: a_prev,
                next: a_next,
            };
            self.point_after(arena, a_prev, b);
            if let Some(next) = a_next {
                arena[next].link_mut().prev = Some(b);
            }
            self.point_after(arena, b_prev, a);
            if let Some(next) = b_next {
                arena[next].link_mut().prev = Some(a);
            }
        }
    }

    /// Iterate keys from head to tail.
    pub fn iter<'a, T: Linked<K>>(&self, arena: &'a Arena<K, T>) -> Iter<'a, K, T> {
        Iter {
            arena,
            cursor: self.head,
        }
    }

    /// Snapshot of the keys, for loops that mutate the arena.
    pub fn keys<T: Linked<K>>(&self, arena: &Arena<K, T>) -> Vec<K> {
        self.iter(arena).collect()
    }

    fn point_after<T: Linked<K>>(&mut self, arena: &mut Arena<K, T>, prev: Option<K>, node: K) {
        match prev {
            Some(prev) => arena[prev].link_mut().next = Some(node),
            None => self.head = Some(node),
        }
    }
}

/// Head-to-tail iterator returned by [`List::iter`].
pub struct Iter<'a, K, T> {
    arena: &'a Arena<K, T>,
    cursor: Option<K>,
}

impl<'a, K: Key, T: Linked<K>> Iterator for Iter<'a, K, T> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let key = self.cursor?;
        self.cursor = self.arena[key].link().next;
        Some(key)
    }
}
