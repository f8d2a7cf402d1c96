//! Primary-relationship cap enforcement.
//!
//! Readers filtering by primary relationship need a small, meaningful set,
//! so no work exposes more than `cap` primary relationship tags. Excess tags
//! stay attached and searchable; they are only demoted to secondary.
//!
//! # Algorithm
//! - Micro and secondary tags are never touched and never counted.
//! - If the primary bucket exceeds the cap, it is ordered by author-set
//!   first, then insertion order; the first `cap` keep primary.
//! - The remainder become secondary and lose their author-set flag, since
//!   the prominence no longer reflects the author's choice.
//!
//! Running the enforcer on its own output changes nothing.

use nuclear_core::Prominence;
use tracing::debug;

/// The fields of a relationship tag the enforcer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipSlot {
    pub prominence: Prominence,
    pub is_user_set: bool,
}

impl RelationshipSlot {
    pub fn new(prominence: Prominence, is_user_set: bool) -> Self {
        Self {
            prominence,
            is_user_set,
        }
    }
}

/// Enforce the cap over relationship slots given in insertion order.
///
/// Returns the indices of demoted slots in ascending order.
pub fn enforce_primary_cap(slots: &mut [RelationshipSlot], cap: usize) -> Vec<usize> {
    let mut primaries: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.prominence == Prominence::Primary)
        .map(|(i, _)| i)
        .collect();

    if primaries.len() <= cap {
        return Vec::new();
    }

    // Stable sort: insertion order is kept within each group.
    primaries.sort_by_key(|&i| !slots[i].is_user_set);

    let mut demoted = primaries.split_off(cap);
    demoted.sort_unstable();

    for &i in &demoted {
        slots[i].prominence = Prominence::Secondary;
        slots[i].is_user_set = false;
    }

    debug!(
        cap,
        kept = primaries.len(),
        demoted = demoted.len(),
        "Primary relationship cap enforced"
    );

    demoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto(p: Prominence) -> RelationshipSlot {
        RelationshipSlot::new(p, false)
    }

    fn user(p: Prominence) -> RelationshipSlot {
        RelationshipSlot::new(p, true)
    }

    fn primary_count(slots: &[RelationshipSlot]) -> usize {
        slots
            .iter()
            .filter(|s| s.prominence == Prominence::Primary)
            .count()
    }

    #[test]
    fn test_under_cap_is_untouched() {
        let mut slots = vec![auto(Prominence::Primary), auto(Prominence::Secondary)];
        let before = slots.clone();
        assert!(enforce_primary_cap(&mut slots, 2).is_empty());
        assert_eq!(slots, before);
    }

    #[test]
    fn test_excess_demoted_by_insertion_order() {
        let mut slots = vec![auto(Prominence::Primary); 5];
        let demoted = enforce_primary_cap(&mut slots, 2);
        assert_eq!(demoted, vec![2, 3, 4]);
        assert_eq!(primary_count(&slots), 2);
        assert_eq!(slots[0].prominence, Prominence::Primary);
        assert_eq!(slots[1].prominence, Prominence::Primary);
    }

    #[test]
    fn test_user_set_preserved_over_auto() {
        let mut slots = vec![
            auto(Prominence::Primary),
            auto(Prominence::Primary),
            user(Prominence::Primary),
            user(Prominence::Primary),
        ];
        let demoted = enforce_primary_cap(&mut slots, 2);
        assert_eq!(demoted, vec![0, 1]);
        assert_eq!(slots[2].prominence, Prominence::Primary);
        assert_eq!(slots[3].prominence, Prominence::Primary);
    }

    #[test]
    fn test_user_set_ties_broken_by_insertion_order() {
        let mut slots = vec![
            user(Prominence::Primary),
            auto(Prominence::Primary),
            user(Prominence::Primary),
            user(Prominence::Primary),
        ];
        let demoted = enforce_primary_cap(&mut slots, 2);
        assert_eq!(demoted, vec![1, 3]);
        assert!(!slots[3].is_user_set);
    }

    #[test]
    fn test_micro_and_secondary_not_counted() {
        let mut slots = vec![
            auto(Prominence::Micro),
            auto(Prominence::Primary),
            auto(Prominence::Secondary),
            auto(Prominence::Micro),
            auto(Prominence::Primary),
        ];
        assert!(enforce_primary_cap(&mut slots, 2).is_empty());
        assert_eq!(slots[0].prominence, Prominence::Micro);
    }

    #[test]
    fn test_idempotent() {
        let mut slots = vec![
            user(Prominence::Primary),
            auto(Prominence::Primary),
            auto(Prominence::Micro),
            auto(Prominence::Primary),
            user(Prominence::Primary),
        ];
        enforce_primary_cap(&mut slots, 2);
        let once = slots.clone();
        assert!(enforce_primary_cap(&mut slots, 2).is_empty());
        assert_eq!(slots, once);
    }

    #[test]
    fn test_cap_of_one() {
        let mut slots = vec![auto(Prominence::Primary), auto(Prominence::Primary)];
        assert_eq!(enforce_primary_cap(&mut slots, 1), vec![1]);
        assert_eq!(primary_count(&slots), 1);
    }
}
