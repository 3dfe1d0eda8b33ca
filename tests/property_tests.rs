//! Randomized checks of the algebraic properties of the operators.

mod test_data_gen;

use std::collections::HashSet;

use lazyseq_operators::Sequence;
use proptest::prelude::*;
use test_data_gen::counted;

fn small_values() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-20i64..20, 0..40)
}

proptest! {
    #[test]
    fn distinct_is_idempotent(values in small_values()) {
        let once = Sequence::from_vec(values).distinct_by(|x| x.rem_euclid(7));
        let twice = once.distinct_by(|x| x.rem_euclid(7));
        prop_assert_eq!(once.to_vec().unwrap(), twice.to_vec().unwrap());
    }

    #[test]
    fn except_and_intersect_partition_the_left_side(
        left in small_values(),
        right in small_values(),
    ) {
        let a = Sequence::from_vec(left.clone());
        let except = a.except(right.clone()).to_vec().unwrap();
        let intersect = a.intersect(right.clone()).to_vec().unwrap();

        let right: HashSet<i64> = right.into_iter().collect();
        let mut seen = HashSet::new();
        let firsts: Vec<i64> = left.into_iter().filter(|x| seen.insert(*x)).collect();
        for x in &firsts {
            let in_except = except.contains(x);
            let in_intersect = intersect.contains(x);
            prop_assert!(in_except != in_intersect);
            prop_assert_eq!(in_intersect, right.contains(x));
        }
        prop_assert_eq!(except.len() + intersect.len(), firsts.len());
    }

    #[test]
    fn order_by_matches_a_stable_sort(values in small_values()) {
        let tagged: Vec<(i64, usize)> = values.into_iter().zip(0..).collect();
        let mut expected = tagged.clone();
        expected.sort_by_key(|p| p.0.abs());
        let sorted = Sequence::from_vec(tagged.clone())
            .order_by(|p| p.0.abs())
            .to_vec()
            .unwrap();
        prop_assert_eq!(sorted, expected);

        let mut expected_desc = tagged.clone();
        expected_desc.sort_by(|a, b| b.0.abs().cmp(&a.0.abs()));
        let sorted_desc = Sequence::from_vec(tagged)
            .order_by_descending(|p| p.0.abs())
            .to_vec()
            .unwrap();
        prop_assert_eq!(sorted_desc, expected_desc);
    }

    #[test]
    fn lookup_round_trip_reproduces_every_element(values in small_values()) {
        let lookup = Sequence::from_vec(values.clone())
            .to_lookup(|x| x.rem_euclid(5))
            .unwrap();
        let flattened = lookup
            .to_sequence()
            .select_many(|g| g.elements().clone())
            .to_vec()
            .unwrap();
        prop_assert_eq!(flattened.len(), values.len());
        for g in lookup.groupings() {
            let expected: Vec<i64> = values
                .iter()
                .copied()
                .filter(|x| x.rem_euclid(5) == *g.key())
                .collect();
            prop_assert_eq!(g.elements().to_vec().unwrap(), expected);
        }
    }

    #[test]
    fn fresh_traversals_are_identical(values in small_values(), n in 0usize..10) {
        let seq = Sequence::from_vec(values)
            .select(|x| x * 3)
            .filter(|x| x % 2 == 0)
            .skip(n)
            .reverse();
        prop_assert_eq!(seq.to_vec().unwrap(), seq.to_vec().unwrap());
    }

    #[test]
    fn take_releases_exactly_once(values in small_values(), n in 0usize..50) {
        let (seq, releases) = counted(values.clone());
        let out = seq.take(n).to_vec().unwrap();
        prop_assert_eq!(out.len(), n.min(values.len()));
        // a zero-length take never starts the source
        let expected = usize::from(n > 0);
        prop_assert_eq!(releases.get(), expected);
    }
}
