use std::collections::BTreeSet;

use super::model::{CustomerDataset, CustomerRecord};

// ---------------------------------------------------------------------------
// Filter predicate: age range + selected locations
// ---------------------------------------------------------------------------

/// The current selection of the two filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Inclusive lower age bound.
    pub age_min: u32,
    /// Inclusive upper age bound.
    pub age_max: u32,
    /// Locations to keep. An empty set keeps nothing.
    pub locations: BTreeSet<String>,
}

impl FilterState {
    /// Full age range and every location selected (i.e., show everything).
    pub fn full(dataset: &CustomerDataset) -> Self {
        let (age_min, age_max) = dataset.age_bounds;
        FilterState {
            age_min,
            age_max,
            locations: dataset.locations.iter().cloned().collect(),
        }
    }

    /// Apply this selection to the dataset.
    pub fn apply<'a>(&self, dataset: &'a CustomerDataset) -> Vec<&'a CustomerRecord> {
        filter(&dataset.records, self.age_min, self.age_max, &self.locations)
    }
}

/// Return the records with `age_min <= age <= age_max` whose location is in
/// `locations`, in source order.
///
/// An inverted range or an empty location set yields an empty subset.
pub fn filter<'a>(
    records: &'a [CustomerRecord],
    age_min: u32,
    age_max: u32,
    locations: &BTreeSet<String>,
) -> Vec<&'a CustomerRecord> {
    if locations.is_empty() || age_min > age_max {
        return Vec::new();
    }
    records
        .iter()
        .filter(|rec| (age_min..=age_max).contains(&rec.age))
        .filter(|rec| locations.contains(&rec.location))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::record;

    fn locs(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<CustomerRecord> {
        vec![record(25, "NY", 4.0), record(40, "NY", 2.0), record(30, "LA", 5.0)]
    }

    #[test]
    fn keeps_rows_matching_both_predicates_in_order() {
        let rows = sample();
        let subset = filter(&rows, 20, 35, &locs(&["NY", "LA"]));
        assert_eq!(subset, vec![&rows[0], &rows[2]]);
    }

    #[test]
    fn full_selection_returns_whole_table() {
        let ds = CustomerDataset::from_records(sample()).unwrap();
        let subset = FilterState::full(&ds).apply(&ds);
        let expected: Vec<&CustomerRecord> = ds.records.iter().collect();
        assert_eq!(subset, expected);
    }

    #[test]
    fn single_age_range_matches_exact_age_only() {
        let rows = sample();
        let subset = filter(&rows, 40, 40, &locs(&["NY", "LA"]));
        assert_eq!(subset, vec![&rows[1]]);
    }

    #[test]
    fn empty_location_set_yields_empty_subset() {
        let rows = sample();
        assert!(filter(&rows, 0, 100, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn inverted_range_yields_empty_subset() {
        let rows = sample();
        assert!(filter(&rows, 35, 20, &locs(&["NY", "LA"])).is_empty());
    }

    #[test]
    fn unknown_location_matches_nothing() {
        let rows = sample();
        assert!(filter(&rows, 0, 100, &locs(&["SF"])).is_empty());
    }

    prop_compose! {
        fn arb_record()(age in 18u32..80, loc in 0usize..4, sat in 1u32..=10) -> CustomerRecord {
            record(age, ["Urban", "Rural", "Suburban", "Remote"][loc], sat as f64)
        }
    }

    proptest! {
        #[test]
        fn filter_is_sound_and_complete(
            rows in prop::collection::vec(arb_record(), 0..60),
            a in 10u32..90,
            b in 10u32..90,
            picked in prop::collection::btree_set(
                prop::sample::select(vec!["Urban", "Rural", "Suburban", "Remote"]),
                0..4,
            ),
        ) {
            let (lo, hi) = (a.min(b), a.max(b));
            let selected: BTreeSet<String> = picked.iter().map(|s| s.to_string()).collect();
            let subset = filter(&rows, lo, hi, &selected);

            let matches = |r: &CustomerRecord| {
                r.age >= lo && r.age <= hi && selected.contains(&r.location)
            };
            for r in &subset {
                prop_assert!(matches(*r));
            }
            let expected: Vec<&CustomerRecord> = rows.iter().filter(|r| matches(*r)).collect();
            prop_assert_eq!(subset, expected);
        }
    }
}
