//! The four-slot admin-levels tuple `[country, sector, province, cluster]`.
//!
//! A slot is meaningful only when every slot before it is set. Stored data
//! is loose (short arrays, non-integers, missing fields), so decoding always
//! normalises to exactly four slots instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Number of levels in the political hierarchy.
pub const ADMIN_DEPTH: usize = 4;

/// Errors produced when manipulating an [`AdminLevels`] tuple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminLevelsError {
    /// The slot index is outside `0..ADMIN_DEPTH`.
    #[error("admin slot {slot} out of range")]
    SlotOutOfRange {
        /// The offending slot.
        slot: usize,
    },

    /// A slot was set while one of its ancestors is unassigned.
    #[error("admin slot {slot} cannot be set while slot {missing} is unassigned")]
    DetachedSlot {
        /// The slot being set.
        slot: usize,
        /// The first unassigned ancestor slot.
        missing: usize,
    },
}

/// A star's assignment to the country → sector → province → cluster tree.
///
/// Each entry is an index into the parent's child list (or `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdminLevels(pub [Option<usize>; ADMIN_DEPTH]);

impl AdminLevels {
    /// No division assigned at any level.
    pub const EMPTY: Self = Self([None; ADMIN_DEPTH]);

    /// Build a tuple from loose JSON entries: missing or non-integer entries
    /// become `None`, extra entries are ignored.
    pub fn from_loose(values: &[Value]) -> Self {
        let mut levels = Self::EMPTY;
        for (slot, value) in levels.0.iter_mut().zip(values) {
            *slot = value.as_u64().and_then(|v| usize::try_from(v).ok());
        }
        levels
    }

    /// Build a tuple from an arbitrary JSON value; anything but an array
    /// yields [`AdminLevels::EMPTY`].
    pub fn from_value(value: &Value) -> Self {
        value
            .as_array()
            .map_or(Self::EMPTY, |values| Self::from_loose(values))
    }

    /// Encode as a JSON array of four nullable indices.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|slot| slot.map_or(Value::Null, |idx| Value::from(idx)))
                .collect(),
        )
    }

    /// The index stored at `slot`.
    pub fn get(&self, slot: usize) -> Option<usize> {
        self.0.get(slot).copied().flatten()
    }

    /// True when no slot is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Number of leading assigned slots.
    pub fn depth(&self) -> usize {
        self.0.iter().take_while(|slot| slot.is_some()).count()
    }

    /// True when no slot is set below an unassigned one.
    pub fn is_well_formed(&self) -> bool {
        self.0.iter().skip(self.depth()).all(Option::is_none)
    }

    /// The leading assigned indices, i.e. the path into the division tree.
    pub fn path(&self) -> Vec<usize> {
        self.0.iter().map_while(|slot| *slot).collect()
    }

    /// Return a copy with `slot` set to `value` and every deeper slot
    /// cleared. Demoting or reassigning a level invalidates its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`AdminLevelsError::SlotOutOfRange`] for `slot >= 4` and
    /// [`AdminLevelsError::DetachedSlot`] when assigning below an
    /// unassigned ancestor.
    pub fn with_slot(&self, slot: usize, value: Option<usize>) -> Result<Self, AdminLevelsError> {
        if slot >= ADMIN_DEPTH {
            return Err(AdminLevelsError::SlotOutOfRange { slot });
        }
        if value.is_some()
            && let Some(missing) = self.0.iter().take(slot).position(Option::is_none)
        {
            return Err(AdminLevelsError::DetachedSlot { slot, missing });
        }

        let mut next = *self;
        for (idx, entry) in next.0.iter_mut().enumerate().skip(slot) {
            *entry = if idx == slot { value } else { None };
        }
        Ok(next)
    }

    /// Build a tuple from a path prefix followed by one more index at the
    /// next depth. Slots beyond the path are `None`.
    pub fn from_path(path: &[usize]) -> Self {
        let mut levels = Self::EMPTY;
        for (slot, idx) in levels.0.iter_mut().zip(path) {
            *slot = Some(*idx);
        }
        levels
    }
}

impl<'de> Deserialize<'de> for AdminLevels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::EMPTY, |values| Self::from_loose(&values)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn loose_input_is_normalised_to_four_slots() {
        let levels: AdminLevels = serde_json::from_value(json!([2, "x", 1])).unwrap();
        assert_eq!(levels, AdminLevels([Some(2), None, Some(1), None]));

        let levels: AdminLevels = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(levels, AdminLevels::EMPTY);

        let levels = AdminLevels::from_value(&json!([0, 1, 2, 3, 4, 5]));
        assert_eq!(levels, AdminLevels([Some(0), Some(1), Some(2), Some(3)]));
    }

    #[test]
    fn serializes_as_nullable_array() {
        let levels = AdminLevels([Some(1), Some(0), None, None]);
        assert_eq!(serde_json::to_value(levels).unwrap(), json!([1, 0, null, null]));
        assert_eq!(levels.to_value(), json!([1, 0, null, null]));
    }

    #[test]
    fn setting_a_slot_clears_descendants() {
        let levels = AdminLevels([Some(1), Some(2), Some(3), Some(4)]);
        let demoted = levels.with_slot(1, Some(7)).unwrap();
        assert_eq!(demoted, AdminLevels([Some(1), Some(7), None, None]));

        let cleared = levels.with_slot(0, None).unwrap();
        assert!(cleared.is_empty());
    }

    #[test]
    fn detached_slots_are_rejected() {
        let levels = AdminLevels([Some(1), None, None, None]);
        assert_eq!(
            levels.with_slot(2, Some(0)),
            Err(AdminLevelsError::DetachedSlot { slot: 2, missing: 1 })
        );
        assert_eq!(
            levels.with_slot(4, None),
            Err(AdminLevelsError::SlotOutOfRange { slot: 4 })
        );
    }

    #[test]
    fn depth_and_path_follow_leading_slots() {
        let levels = AdminLevels([Some(3), Some(0), None, Some(9)]);
        assert_eq!(levels.depth(), 2);
        assert_eq!(levels.path(), vec![3, 0]);
        assert!(!levels.is_well_formed());
        assert_eq!(AdminLevels::from_path(&[3, 0]).path(), vec![3, 0]);
    }
}
