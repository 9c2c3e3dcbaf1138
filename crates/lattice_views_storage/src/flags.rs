//! Quality bits attached to every index of a `Flagged` overlay.
//!
//! Bit 0 is reserved for `DISCARD`. The remaining bits are free for callers to assign meanings to.

/// One word of quality bits.
pub type FlagBits = u64;

/// Set on indices whose sample was thrown away with `discard`.
pub const DISCARD: FlagBits = 1;

/// The first bit that is free for caller-defined flags.
pub const FIRST_USER_FLAG: FlagBits = 1 << 1;

pub const NO_FLAGS: FlagBits = 0;
pub const ALL_FLAGS: FlagBits = !0;

/// Returns `true` iff `bits` has any bit of `pattern` set.
#[inline]
pub fn any_set(bits: FlagBits, pattern: FlagBits) -> bool {
    bits & pattern != 0
}
