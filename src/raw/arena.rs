use alloc::vec::Vec;

use super::handle::Handle;

#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    element: Option<T>,
}

/// Slot storage for tree nodes. Freed slots are recycled with a bumped
/// generation, so stale handles are detectable through [`Arena::try_get`].
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(index) = self.free.pop() {
            // Reuse a free slot under its current generation.
            let slot = &mut self.slots[index];
            slot.element = Some(element);
            Handle::new(index, slot.generation)
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            Handle::new(self.slots.len() - 1, 0)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.try_get(handle).expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.try_get_mut(handle).expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns the element behind `handle`, or `None` if the slot was freed
    /// (or freed and reused) since the handle was issued.
    #[inline]
    pub(crate) fn try_get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.to_index())?;
        if slot.generation == handle.generation() {
            slot.element.as_ref()
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn try_get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.to_index())?;
        if slot.generation == handle.generation() {
            slot.element.as_mut()
        } else {
            None
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let index = handle.to_index();
        let slot = &mut self.slots[index];
        assert!(slot.generation == handle.generation(), "`Arena::take()` - `handle` is invalid!");
        let element = slot.element.take().expect("`Arena::take()` - `handle` is invalid!");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
