//! Per-axis ownership of the ENABLE/DIR/STEP lines.
//!
//! The button edge arrives from interrupt context while the step scheduler
//! may be mid-profile. Both sides go through an [`AxisArbiter`]: the
//! scheduler must hold [`LineOwner::Auto`] to pulse, and a manual override
//! claim revokes it unconditionally. The scheduler observes the revocation on
//! its next tick and discards its profile.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Which control path currently owns an axis's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LineOwner {
    /// Nobody; lines are parked.
    Free = 0,
    /// The step scheduler running a motion profile.
    Auto = 1,
    /// The encoder jog loop.
    Manual = 2,
}

impl LineOwner {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LineOwner::Auto,
            2 => LineOwner::Manual,
            _ => LineOwner::Free,
        }
    }
}

/// Result of feeding a button edge to the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAction {
    /// Within the debounce window of the previous accepted edge.
    Ignored,
    /// The axis now belongs to the manual override; any profile is revoked.
    EnterJog,
    /// Trailing release of the press that ended a jog.
    ExitConfirmed,
}

/// Mutual-exclusion token for one axis.
///
/// All methods take `&self` and are safe to call from an interrupt handler
/// or another thread, so an arbiter is typically a `static`.
#[derive(Debug)]
pub struct AxisArbiter {
    owner: AtomicU8,
    debounce_ms: u32,
    last_edge_ms: AtomicU32,
    seen_edge: AtomicBool,
    latched: AtomicBool,
}

impl AxisArbiter {
    /// Create a free arbiter with the given button debounce window.
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            owner: AtomicU8::new(LineOwner::Free as u8),
            debounce_ms,
            last_edge_ms: AtomicU32::new(0),
            seen_edge: AtomicBool::new(false),
            latched: AtomicBool::new(false),
        }
    }

    /// Button debounce window in milliseconds.
    #[inline]
    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    /// Current owner.
    #[inline]
    pub fn owner(&self) -> LineOwner {
        LineOwner::from_u8(self.owner.load(Ordering::Acquire))
    }

    /// Whether `who` currently holds the lines.
    #[inline]
    pub fn is_held_by(&self, who: LineOwner) -> bool {
        self.owner() == who
    }

    /// Whether a manual override holds (or has just claimed) the axis.
    #[inline]
    pub fn manual_requested(&self) -> bool {
        self.is_held_by(LineOwner::Manual)
    }

    /// Claim the lines for the step scheduler.
    ///
    /// Succeeds when the lines are free or already held by the scheduler;
    /// fails while a manual override holds them.
    pub fn try_claim_auto(&self) -> bool {
        match self.owner.compare_exchange(
            LineOwner::Free as u8,
            LineOwner::Auto as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => current == LineOwner::Auto as u8,
        }
    }

    /// Take the lines for the manual override, revoking any other owner.
    ///
    /// Returns the previous owner.
    pub fn claim_manual(&self) -> LineOwner {
        LineOwner::from_u8(self.owner.swap(LineOwner::Manual as u8, Ordering::AcqRel))
    }

    /// Give the lines back if `who` still holds them.
    pub fn release(&self, who: LineOwner) {
        let _ = self.owner.compare_exchange(
            who as u8,
            LineOwner::Free as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Feed a rising edge of the axis button, timestamped in milliseconds.
    ///
    /// Edges closer than the debounce window to the last accepted edge are
    /// dropped. Accepted edges alternate between starting a jog and
    /// confirming its end.
    pub fn on_button_edge(&self, now_ms: u32) -> EdgeAction {
        if self.seen_edge.load(Ordering::Acquire) {
            let last = self.last_edge_ms.load(Ordering::Acquire);
            if now_ms.wrapping_sub(last) < self.debounce_ms {
                return EdgeAction::Ignored;
            }
        }
        self.last_edge_ms.store(now_ms, Ordering::Release);
        self.seen_edge.store(true, Ordering::Release);

        let was_latched = self.latched.fetch_xor(true, Ordering::AcqRel);
        if was_latched {
            EdgeAction::ExitConfirmed
        } else {
            self.claim_manual();
            EdgeAction::EnterJog
        }
    }
}

impl Default for AxisArbiter {
    fn default() -> Self {
        Self::new(500)
    }
}
