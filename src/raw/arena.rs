use super::handle::Handle;

struct Slot<T> {
    // Bumped every time the slot is vacated so that old handles can be told apart
    // from handles to whatever element reuses the slot.
    generation: u32,
    element: Option<T>,
}

pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            // Vacated slots keep their bumped generation.
            self.slots[handle.to_index()].element = Some(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - no slot id left below `Handle::MAX` ({})",
                Handle::MAX
            );
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            Handle::from_index(self.slots.len() - 1)
        }
    }

    /// Returns the current generation of the slot behind `handle`.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> u32 {
        self.slots[handle.to_index()].generation
    }

    /// Returns true if `handle` refers to an occupied slot that has not been
    /// vacated since `generation` was observed.
    pub(crate) fn is_live(&self, handle: Handle, generation: u32) -> bool {
        !handle.is_sentinel()
            && self
                .slots
                .get(handle.to_index())
                .is_some_and(|slot| slot.generation == generation && slot.element.is_some())
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].element.as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].element.as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.to_index()];
        let element = slot.element.take().expect("`Arena::take()` - `handle` is invalid!");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle);
        element
    }

    /// Drops every element. Generations survive so that handles issued before the
    /// clear stay dead.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.element.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(Handle::from_index(index));
        }
        // Hand out low slots first after a clear.
        self.free.reverse();
    }
}
