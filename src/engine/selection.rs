/*
 *  Copyright 2026 Callboard Maintainers
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Next-candidate selection for the cascade.
//!
//! Pure logic over rows already loaded (and locked) by the cascade
//! transaction. Keeping this out of SQL makes the ordering contract
//! explicit and directly testable:
//!
//! - only candidates with rank strictly greater than the just-terminated
//!   offer's rank are considered
//! - opted-out or unconfirmed candidates are skipped
//! - ordering is `(priority_rank, offer id)` so duplicate ranks resolve
//!   deterministically

use uuid::Uuid;

/// One pending offer joined with its candidate's consent flags.
#[derive(Debug, Clone)]
pub struct CascadeCandidate {
    /// The pending offer
    pub offer_id: Uuid,
    /// The candidate
    pub crew_member_id: Uuid,
    /// Rank copied from the list at offer creation
    pub priority_rank: i32,
    /// Candidate completed double opt-in
    pub sms_confirmed: bool,
    /// Candidate replied STOP at some point
    pub opted_out: bool,
    /// Candidate phone for the queued message
    pub phone: String,
    /// The pending offer's response token
    pub response_token: String,
}

impl CascadeCandidate {
    /// Consent gate: confirmed and not opted out.
    pub fn eligible(&self) -> bool {
        self.sms_confirmed && !self.opted_out
    }
}

/// Selects the next offer to send after an offer at `after_rank` was
/// terminated: the eligible candidate with the smallest rank strictly
/// greater than `after_rank`, ties broken by offer id.
pub fn next_eligible(
    candidates: &[CascadeCandidate],
    after_rank: i32,
) -> Option<&CascadeCandidate> {
    candidates
        .iter()
        .filter(|c| c.priority_rank > after_rank && c.eligible())
        .min_by_key(|c| (c.priority_rank, c.offer_id))
}

/// Selects the first offer to send for a freshly opened position: the
/// eligible candidate with the smallest rank overall.
pub fn first_eligible(candidates: &[CascadeCandidate]) -> Option<&CascadeCandidate> {
    candidates
        .iter()
        .filter(|c| c.eligible())
        .min_by_key(|c| (c.priority_rank, c.offer_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(rank: i32, confirmed: bool, opted_out: bool) -> CascadeCandidate {
        CascadeCandidate {
            offer_id: Uuid::new_v4(),
            crew_member_id: Uuid::new_v4(),
            priority_rank: rank,
            sms_confirmed: confirmed,
            opted_out,
            phone: format!("+1555000{:04}", rank),
            response_token: format!("tok-{}", rank),
        }
    }

    #[test]
    fn test_cascade_picks_next_rank_not_later_ones() {
        // Ranks [1,2,3], declining rank 1 must reach rank 2, never rank 3
        let candidates = vec![candidate(2, true, false), candidate(3, true, false)];
        let next = next_eligible(&candidates, 1).unwrap();
        assert_eq!(next.priority_rank, 2);
    }

    #[test]
    fn test_cascade_skips_ineligible_candidates() {
        // Rank 2 opted out: declining rank 1 cascades directly to rank 3
        let candidates = vec![candidate(2, true, true), candidate(3, true, false)];
        let next = next_eligible(&candidates, 1).unwrap();
        assert_eq!(next.priority_rank, 3);

        // Unconfirmed candidates are skipped the same way
        let candidates = vec![candidate(2, false, false), candidate(3, true, false)];
        assert_eq!(next_eligible(&candidates, 1).unwrap().priority_rank, 3);
    }

    #[test]
    fn test_exhausted_list_yields_none() {
        assert_eq!(next_eligible(&[], 1).map(|c| c.offer_id), None);

        let candidates = vec![candidate(2, true, true), candidate(3, false, false)];
        assert!(next_eligible(&candidates, 1).is_none());
    }

    #[test]
    fn test_strictly_greater_rank_required() {
        // The terminated offer's own rank is never reselected
        let candidates = vec![candidate(5, true, false)];
        assert!(next_eligible(&candidates, 5).is_none());
        assert!(next_eligible(&candidates, 4).is_some());
    }

    #[test]
    fn test_non_contiguous_ranks() {
        let candidates = vec![candidate(10, true, false), candidate(40, true, false)];
        assert_eq!(next_eligible(&candidates, 3).unwrap().priority_rank, 10);
        assert_eq!(next_eligible(&candidates, 10).unwrap().priority_rank, 40);
    }

    #[test]
    fn test_duplicate_ranks_break_ties_by_offer_id() {
        let mut a = candidate(2, true, false);
        let mut b = candidate(2, true, false);
        // Force a known ordering between the two ids
        if b.offer_id < a.offer_id {
            std::mem::swap(&mut a, &mut b);
        }
        let expected = a.offer_id;
        let candidates = vec![b, a];
        assert_eq!(next_eligible(&candidates, 1).unwrap().offer_id, expected);
    }

    #[test]
    fn test_first_eligible_takes_lowest_rank() {
        let candidates = vec![
            candidate(3, true, false),
            candidate(1, false, false),
            candidate(2, true, false),
        ];
        assert_eq!(first_eligible(&candidates).unwrap().priority_rank, 2);
    }
}
