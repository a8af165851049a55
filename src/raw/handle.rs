#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Slot id of a tree node. The two lowest ids are reserved for the sentinels,
/// every other id maps onto an arena index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(RawHandle);

impl Handle {
    /// The "no child / no parent" sentinel.
    pub(crate) const NIL: Self = Self(0);
    /// The header sentinel whose left child is the real root.
    pub(crate) const ROOT: Self = Self(1);

    const RESERVED: RawHandle = 2;

    pub(crate) const MAX: usize = (RawHandle::MAX - Self::RESERVED) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(index as RawHandle + Self::RESERVED)
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        assert!(!self.is_sentinel(), "`Handle::to_index()` - sentinels have no arena index!");
        (self.0 - Self::RESERVED) as usize
    }

    #[inline]
    pub(crate) const fn is_sentinel(self) -> bool {
        self.0 < Self::RESERVED
    }
}
