//! Schema version constants.

/// Schema revision a persisted state blob conforms to.
pub type Version = u32;

/// Highest schema version this build understands.
///
/// Bump whenever the persisted state shape changes. A bump without a structural
/// change needs no registry entry.
pub const CURRENT_VERSION: Version = 13;

/// Version assumed for state that was persisted before versions were recorded.
pub const BASELINE_VERSION: Version = 1;

const _: () = assert!(BASELINE_VERSION <= CURRENT_VERSION);

/// Versions a state tagged `stored` must still pass through, ascending.
///
/// Empty when `stored >= current`.
pub fn pending_versions(stored: Version, current: Version) -> std::ops::RangeInclusive<Version> {
    // saturating_add: `u32::MAX..=current` is already an empty range.
    stored.saturating_add(1)..=current
}
