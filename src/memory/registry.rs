#![doc = r#"
Generational arena used wherever the engine needs a stable handle to an
object that may be destroyed out from under a holder — listeners observing
a sender, a collider referencing its owner, a sprite registered with the
render scheduler. Per DESIGN NOTES §9 ("Cyclic parent/child references" and
"Event/message substrate vs. ownership"): replace raw pointers/references
with index + generation, so a destroyed object's handle simply stops
resolving instead of dangling.
"#]

use std::marker::PhantomData;

#[derive(Debug)]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}
impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Handle<T> {
    /// Packs index+generation into a single opaque key, used by the
    /// messaging substrate to address arbitrary objects uniformly (sender,
    /// receiver) without the message queue needing to be generic over every
    /// possible object type.
    pub fn raw(self) -> u64 {
        ((self.index as u64) << 32) | self.generation as u64
    }

    pub fn from_raw(raw: u64) -> Self {
        Handle {
            index: (raw >> 32) as u32,
            generation: raw as u32,
            _marker: PhantomData,
        }
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A generational arena: `insert` returns a `Handle<T>` that stays valid
/// until the slot is `remove`d, at which point the generation bumps and any
/// previously issued handle to that slot resolves to `None` forever after.
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry { slots: Vec::new(), free_list: Vec::new() }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Handle<T> {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            Handle { index, generation: slot.generation, _marker: PhantomData }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, value: Some(value) });
            Handle { index, generation: 0, _marker: PhantomData }
        }
    }

    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take();
        if value.is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(handle.index);
        }
        value
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| {
                (
                    Handle { index: i as u32, generation: slot.generation, _marker: PhantomData },
                    v,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(move |v| {
                (Handle { index: i as u32, generation, _marker: PhantomData }, v)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
