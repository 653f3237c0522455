//! Fuzzy name matching for the last-resort reconciliation strategy.

use std::collections::HashSet;

use roastery_stripe::StripeProduct;

/// Minimum score a fuzzy candidate needs to be accepted as a match.
pub const FUZZY_ACCEPT_THRESHOLD: u32 = 70;

/// Score a candidate name against a local product name.
///
/// 100 for equality after case-fold and trim, 80 when either string contains
/// the other, otherwise `shared_words * 100 / max(word_count)` over
/// case-folded whitespace tokens.
#[must_use]
pub fn fuzzy_score(local: &str, candidate: &str) -> u32 {
    let a = local.trim().to_lowercase();
    let b = candidate.trim().to_lowercase();

    if a == b {
        return 100;
    }
    if !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a)) {
        return 80;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let max_words = words_a.len().max(words_b.len());
    if max_words == 0 {
        return 0;
    }

    let shared = words_a.intersection(&words_b).count();
    (shared * 100 / max_words) as u32
}

/// Best-scoring candidate at or above the acceptance threshold.
#[must_use]
pub fn best_fuzzy_match<'a>(
    local_name: &str,
    candidates: &'a [StripeProduct],
) -> Option<(&'a StripeProduct, u32)> {
    candidates
        .iter()
        .map(|candidate| (candidate, fuzzy_score(local_name, &candidate.name)))
        .max_by_key(|(_, score)| *score)
        .filter(|(_, score)| *score >= FUZZY_ACCEPT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn candidate(name: &str) -> StripeProduct {
        StripeProduct {
            id: format!("prod_{}", name.len()),
            name: name.to_string(),
            description: None,
            active: true,
            images: Vec::new(),
            metadata: BTreeMap::new(),
            created: 0,
        }
    }

    #[test]
    fn exact_match_after_casefold_scores_100() {
        assert_eq!(fuzzy_score("Ethiopia Yirgacheffe", "ethiopia yirgacheffe"), 100);
        assert_eq!(fuzzy_score("  Beans  ", "beans"), 100);
    }

    #[test]
    fn containment_scores_80() {
        assert_eq!(
            fuzzy_score("Ethiopia Yirgacheffe", "Ethiopia Yirgacheffe - 12oz"),
            80
        );
        assert_eq!(fuzzy_score("Yirgacheffe - 12oz", "Yirgacheffe"), 80);
    }

    #[test]
    fn shared_words_ratio() {
        // 3 of 4 words shared -> 75
        assert_eq!(
            fuzzy_score(
                "Ethiopia Yirgacheffe Natural",
                "Ethiopia Yirgacheffe Natural Process"
            ),
            75
        );
        // 2 of 3 words shared -> 66
        assert_eq!(
            fuzzy_score("Ethiopia Yirgacheffe Natural", "Ethiopia Yirgacheffe Washed"),
            66
        );
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 7 of 10 words shared -> exactly 70
        let local = "a b c d e f g h i j";
        let other = "a b c d e f g x y z";
        assert_eq!(fuzzy_score(local, other), 70);

        let candidates = vec![candidate(other)];
        assert!(best_fuzzy_match(local, &candidates).is_some());

        // 69 rejected: 9 of 13
        let local_13 = "a b c d e f g h i j k l m";
        let other_13 = "a b c d e f g h i x y z w";
        assert_eq!(fuzzy_score(local_13, other_13), 69);
        let candidates = vec![candidate(other_13)];
        assert!(best_fuzzy_match(local_13, &candidates).is_none());
    }

    #[test]
    fn best_candidate_wins() {
        let candidates = vec![
            candidate("Ethiopia Yirgacheffe Washed"),
            candidate("Ethiopia Yirgacheffe Natural Process"),
            candidate("Colombia Supremo"),
        ];

        let (best, score) =
            best_fuzzy_match("Ethiopia Yirgacheffe Natural", &candidates).unwrap();
        assert_eq!(best.name, "Ethiopia Yirgacheffe Natural Process");
        assert_eq!(score, 75);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(fuzzy_score("", "anything"), 0);
        assert_eq!(fuzzy_score("anything", ""), 0);
        assert!(best_fuzzy_match("name", &[]).is_none());
    }
}
