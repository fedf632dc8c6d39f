//! `SlotArena` — generational, index-addressed storage that reuses vacated slots.
//!
//! Graphs keep their live nodes and edges here and refer to them by [`SlotKey`], so
//! adjacency never needs references between the stored values themselves.
//!
//! # Features
//! - **Free List Reuse**: vacated slots are threaded into a singly linked free list
//!   and handed out again LIFO in O(1).
//! - **Generational Keys**: every removal bumps the slot's generation, so a key kept
//!   past removal never resolves to whatever is stored there next.
//! - **Bounded Scratch Tables**: [`SlotArena::slot_count`] bounds every index, so
//!   per-slot side tables (visited flags during a walk) are plain vectors.

/// A slot index paired with the generation it was filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    index: u32,
    generation: u32,
}

impl SlotKey {
    #[inline]
    fn new(index: usize, generation: u32) -> Self {
        let Ok(index) = u32::try_from(index) else {
            panic!("slot arena exceeded {} slots", u32::MAX);
        };
        Self { index, generation }
    }

    /// Slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when the key was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

/// A slot in the arena.
#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    entry: Entry<T>,
}

/// An arena of `T` addressed by generational [`SlotKey`]s.
#[derive(Debug, Clone)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    /// Creates an empty arena.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Creates an empty arena with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Stores `value`, returning its key.
    #[inline]
    pub fn insert(&mut self, value: T) -> SlotKey {
        self.len += 1;

        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index];
            let Entry::Vacant { next_free } = slot.entry else {
                unreachable!("free list points at occupied slot {index}");
            };
            self.free_head = next_free;
            slot.entry = Entry::Occupied(value);
            SlotKey::new(index, slot.generation)
        } else {
            let key = SlotKey::new(self.slots.len(), 0);
            self.slots.push(Slot {
                generation: 0,
                entry: Entry::Occupied(value),
            });
            key
        }
    }

    /// Removes and returns the value behind `key`, if it is still current.
    #[inline]
    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        let slot = self.slots.get_mut(key.index())?;
        if slot.generation != key.generation || matches!(slot.entry, Entry::Vacant { .. }) {
            return None;
        }

        let previous = core::mem::replace(
            &mut slot.entry,
            Entry::Vacant {
                next_free: self.free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(key.index());
        self.len -= 1;

        match previous {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Shared access to the value behind `key`.
    #[inline]
    pub fn get(&self, key: SlotKey) -> Option<&T> {
        match self.slots.get(key.index())? {
            Slot {
                generation,
                entry: Entry::Occupied(value),
            } if *generation == key.generation => Some(value),
            _ => None,
        }
    }

    /// Exclusive access to the value behind `key`.
    #[inline]
    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        match self.slots.get_mut(key.index())? {
            Slot {
                generation,
                entry: Entry::Occupied(value),
            } if *generation == key.generation => Some(value),
            _ => None,
        }
    }

    /// Whether `key` still resolves.
    #[inline]
    pub fn contains(&self, key: SlotKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no slot is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever created, occupied or not. Every valid index is below this.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match &slot.entry {
            Entry::Occupied(value) => Some((SlotKey::new(index, slot.generation), value)),
            Entry::Vacant { .. } => None,
        })
    }

    /// Removes every value, yielding them in index order.
    ///
    /// Slots stay allocated and move to the next generation, so keys issued
    /// before the drain never resolve again.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.len = 0;
        let mut next_free = None;
        let mut taken = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            let previous = core::mem::replace(&mut slot.entry, Entry::Vacant { next_free });
            if let Entry::Occupied(value) = previous {
                slot.generation = slot.generation.wrapping_add(1);
                taken.push(value);
            }
            next_free = Some(index);
        }
        self.free_head = next_free;
        taken.reverse();
        taken.into_iter()
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
