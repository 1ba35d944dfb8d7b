//! Per-page metadata encoding.
//!
//! Every tracked page owns one byte in its area's metadata table: the block
//! order in the low six bits plus two status flags. Exactly one of
//! {linked on a free list, ALLOC, SPECIAL} holds for any tracked page.
//!
//! The allocator's hot paths work on the raw byte. [`PageState`] is the
//! abstract view of the same information, used at the introspection
//! boundary and by tests to check the packed representation against the
//! model it stands for.

use bitflags::bitflags;

/// Low six bits of the metadata byte: the block order, 0..=63.
pub const ORDER_MASK: u8 = 0x3f;

bitflags! {
    /// Status bits of the per-page metadata byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PageStateFlags: u8 {
        /// The page is handed out to a caller.
        const ALLOC = 0x40;
        /// The page is reserved for an external agent.
        const SPECIAL = 0x80;
    }
}

/// Abstract per-page state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    /// Part of a free block of the given order, linked on a free list.
    Free { order: u8 },
    /// Part of an allocated block of the given order.
    Allocated { order: u8 },
    /// Reserved: owned by an external agent, order 0, on no free list.
    Reserved,
}

impl PageState {
    /// Pack into the metadata byte representation.
    pub const fn encode(self) -> u8 {
        match self {
            Self::Free { order } => order,
            Self::Allocated { order } => PageStateFlags::ALLOC.bits() | order,
            Self::Reserved => PageStateFlags::SPECIAL.bits(),
        }
    }

    /// Unpack a metadata byte.
    ///
    /// Returns `None` for byte patterns the model has no meaning for: a
    /// reserved page with a nonzero order or the ALLOC bit, or both flags
    /// at once.
    pub const fn decode(byte: u8) -> Option<Self> {
        let order = byte & ORDER_MASK;
        let flags = byte & !ORDER_MASK;
        if flags & PageStateFlags::SPECIAL.bits() != 0 {
            if byte == PageStateFlags::SPECIAL.bits() {
                Some(Self::Reserved)
            } else {
                None
            }
        } else if flags & PageStateFlags::ALLOC.bits() != 0 {
            Some(Self::Allocated { order })
        } else {
            Some(Self::Free { order })
        }
    }

    /// The order field, 0 for reserved pages.
    pub const fn order(self) -> u8 {
        match self {
            Self::Free { order } | Self::Allocated { order } => order,
            Self::Reserved => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        for order in 0..64u8 {
            let free = PageState::Free { order };
            assert_eq!(PageState::decode(free.encode()), Some(free));

            let alloc = PageState::Allocated { order };
            assert_eq!(PageState::decode(alloc.encode()), Some(alloc));
        }
        assert_eq!(
            PageState::decode(PageState::Reserved.encode()),
            Some(PageState::Reserved)
        );
    }

    #[test]
    fn packed_layout_matches_model() {
        assert_eq!(PageState::Free { order: 3 }.encode(), 0x03);
        assert_eq!(PageState::Allocated { order: 3 }.encode(), 0x43);
        assert_eq!(PageState::Reserved.encode(), 0x80);
    }

    #[test]
    fn invalid_bytes_rejected() {
        // Reserved with a nonzero order.
        assert_eq!(PageState::decode(0x81), None);
        // Reserved and allocated at once.
        assert_eq!(PageState::decode(0xC0), None);
    }
}
