//! One-shot warning latch.

/// Emits one warning per fault episode.
///
/// `raise` returns true only on the first call of an episode; `clear` ends
/// the episode so the next fault is reported again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarnLatch {
    raised: bool,
}

impl WarnLatch {
    pub const fn new() -> Self {
        Self { raised: false }
    }

    #[inline]
    #[must_use]
    pub fn raise(&mut self) -> bool {
        !std::mem::replace(&mut self.raised, true)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.raised = false;
    }

    #[inline]
    pub const fn is_raised(&self) -> bool {
        self.raised
    }
}
