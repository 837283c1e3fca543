//! Generation-checked handles for values owned across the C boundary.
//!
//! Foreign code only ever sees a `u64`. A destroyed handle keeps its slot
//! index but carries an old generation, so lookups through it fail
//! cleanly instead of reaching a reused slot. Destroying twice is a
//! no-op.

/// A slot index plus the generation it was issued under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    /// Slot in the upper 32 bits, generation in the lower 32.
    fn to_raw(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn from_raw(raw: u64) -> Self {
        Self {
            slot: (raw >> 32) as u32,
            generation: raw as u32,
        }
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Values addressed by raw `u64` handles.
///
/// Freed slots are reused. When a slot's generation would wrap back to
/// zero it is retired instead, so no stale handle can ever match again.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// An empty table; usable in a `static`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value` and return its raw handle.
    pub fn insert(&mut self, value: T) -> u64 {
        let handle = match self.vacant.pop() {
            Some(slot) => {
                let entry = &mut self.entries[slot as usize];
                entry.value = Some(value);
                Handle {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = u32::try_from(self.entries.len()).unwrap_or_else(|_| {
                    panic!("handle table exhausted: more than {} slots", u32::MAX)
                });
                self.entries.push(Entry {
                    generation: 0,
                    value: Some(value),
                });
                Handle {
                    slot,
                    generation: 0,
                }
            }
        };
        handle.to_raw()
    }

    fn entry(&self, handle: Handle) -> Option<&Entry<T>> {
        self.entries
            .get(handle.slot as usize)
            .filter(|entry| entry.generation == handle.generation)
    }

    /// The value behind `raw`, unless it is stale or was never issued.
    pub fn get(&self, raw: u64) -> Option<&T> {
        self.entry(Handle::from_raw(raw))?.value.as_ref()
    }

    /// Take the value behind `raw` out of the table.
    pub fn remove(&mut self, raw: u64) -> Option<T> {
        let handle = Handle::from_raw(raw);
        let entry = self.entries.get_mut(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(handle.slot);
        }
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.entries.len() - self.vacant.len() - self.retired()
    }

    fn retired(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value.is_none() && entry.generation == 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut table = HandleTable::new();
        let h = table.insert("a");
        assert_eq!(table.get(h), Some(&"a"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut table = HandleTable::new();
        let h = table.insert(5u8);
        assert_eq!(table.remove(h), Some(5));
        assert_eq!(table.get(h), None);
        assert_eq!(table.remove(h), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut table = HandleTable::new();
        let first = table.insert(1);
        table.remove(first);
        let second = table.insert(2);
        let (a, b) = (Handle::from_raw(first), Handle::from_raw(second));
        assert_eq!(a.slot, b.slot);
        assert_eq!(b.generation, a.generation + 1);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&2));
    }

    #[test]
    fn never_issued_handle_is_rejected() {
        let table = HandleTable::<u8>::new();
        assert_eq!(table.get(Handle { slot: 7, generation: 0 }.to_raw()), None);
    }

    #[test]
    fn wrapped_slot_is_retired() {
        let mut table = HandleTable::new();
        let h = table.insert(0);
        table.remove(h);
        table.entries[0].generation = u32::MAX;
        let last = table.insert(1);
        assert_eq!(Handle::from_raw(last).generation, u32::MAX);
        table.remove(last);
        assert!(!table.vacant.contains(&0));
        assert_eq!(table.get(Handle { slot: 0, generation: 0 }.to_raw()), None);
        let fresh = table.insert(2);
        assert_eq!(Handle::from_raw(fresh).slot, 1);
        assert_eq!(table.len(), 1);
    }
}
