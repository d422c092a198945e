//! Handler return flags and keyboard modifiers.

use bitflags::bitflags;

bitflags! {
    /// What a widget handler reports back after processing an event.
    ///
    /// The same type doubles as a widget's *return policy*: the set of
    /// results the application wants to hear about. See
    /// [`ReturnFlags::filter`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReturnFlags: u32 {
        /// The widget's value changed.
        const CHANGED = 1;
        /// An interaction ended (e.g. mouse released, input left).
        const END = 1 << 1;
        /// Policy only: report only when an interaction ended with a change.
        const END_CHANGED = 1 << 2;
        /// An item was selected.
        const SELECTION = 1 << 3;
        /// An item was deselected.
        const DESELECTION = 1 << 4;
        /// The widget was triggered programmatically.
        const TRIGGERED = 1 << 10;
        /// Policy only: report every non-empty result.
        const ALWAYS = !(1 << 2);
    }
}

impl ReturnFlags {
    /// The "no event" sentinel.
    pub const NONE: ReturnFlags = ReturnFlags::empty();

    pub fn is_none(self) -> bool {
        self.is_empty()
    }

    pub fn is_changed(self) -> bool {
        self.contains(ReturnFlags::CHANGED)
    }

    pub fn is_end(self) -> bool {
        self.contains(ReturnFlags::END)
    }

    pub fn is_selection(self) -> bool {
        self.contains(ReturnFlags::SELECTION)
    }

    pub fn is_deselection(self) -> bool {
        self.contains(ReturnFlags::DESELECTION)
    }

    pub fn is_triggered(self) -> bool {
        self.contains(ReturnFlags::TRIGGERED)
    }

    /// Normalize a value used as a return policy.
    ///
    /// `END_CHANGED` is exclusive with its parts: asking for it drops plain
    /// `END` and `CHANGED`.
    pub fn normalize_policy(self) -> ReturnFlags {
        if self.contains(ReturnFlags::END_CHANGED) {
            self - (ReturnFlags::END | ReturnFlags::CHANGED)
        } else {
            self
        }
    }

    /// Reduce a handler result to what `policy` lets through.
    pub fn filter(self, policy: ReturnFlags) -> ReturnFlags {
        if policy.contains(ReturnFlags::END_CHANGED) {
            let mut result = self;
            if !result.contains(ReturnFlags::END | ReturnFlags::CHANGED) {
                result -= ReturnFlags::END | ReturnFlags::CHANGED;
            }
            result & ((policy | ReturnFlags::END | ReturnFlags::CHANGED) - ReturnFlags::END_CHANGED)
        } else {
            self & policy
        }
    }
}

bitflags! {
    /// Keyboard modifier state accompanying input events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
    }
}

static_assertions::assert_impl_all!(ReturnFlags: Send, Sync, Copy);
