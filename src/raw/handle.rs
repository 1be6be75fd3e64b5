use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// A generation-checked reference to an arena slot.
///
/// A slot's generation is bumped every time it is freed, so a handle kept past
/// the lifetime of its node no longer matches the slot it points into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Handle {
    index: NonZero<RawHandle>,
    generation: u32,
}

impl Handle {
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        assert!(index <= Self::MAX, "`Handle::new()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let Some(index) = NonZero::new((index + 1) as RawHandle) else {
            unreachable!()
        };
        Self { index, generation }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.index.get() - 1) as usize
    }

    #[inline]
    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}
