//! Largest-remainder (Hamilton) apportionment with iterative tightening.
//!
//! Grounded verbatim on
//! `original_source/app/repo_processor/processor.py::_allocate_optional_bytes`.
//! Floor shares are capped by each category's remaining content size;
//! leftover bytes from rounding are distributed one at a time by
//! descending fractional part, alphabetical tie-break; the whole process
//! repeats over multiple passes (not just one floor-then-leftover pass)
//! until either the budget is exhausted or no category can absorb more.

use std::collections::BTreeMap;

pub fn allocate_optional_bytes(
    remaining_budget: usize,
    weights: &[(&str, f64)],
    content_sizes: &BTreeMap<&str, usize>,
) -> BTreeMap<String, usize> {
    let mut allocation: BTreeMap<&str, usize> = weights.iter().map(|(name, _)| (*name, 0)).collect();
    let mut remaining = remaining_budget;

    loop {
        let unsatisfied: Vec<(&str, f64)> = weights
            .iter()
            .filter(|(name, weight)| {
                *weight > 0.0 && content_sizes.get(name).copied().unwrap_or(0) > allocation[name]
            })
            .cloned()
            .collect();

        if remaining == 0 || unsatisfied.is_empty() {
            break;
        }

        let total_weight: f64 = unsatisfied.iter().map(|(_, w)| w).sum();
        if total_weight <= 0.0 {
            break;
        }

        let mut increments: BTreeMap<&str, usize> = BTreeMap::new();
        let mut fractions: Vec<(f64, &str)> = Vec::new();
        let mut used = 0usize;

        for (name, weight) in &unsatisfied {
            let want = content_sizes.get(name).copied().unwrap_or(0) - allocation[name];
            let share_float = remaining as f64 * weight / total_weight;
            let share_int = (share_float.floor() as usize).min(want);
            increments.insert(name, share_int);
            used += share_int;
            fractions.push((share_float - share_int as f64, name));
        }

        let mut leftover = remaining.saturating_sub(used);
        fractions.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then_with(|| a.1.cmp(b.1)));

        for (_, name) in fractions {
            if leftover == 0 {
                break;
            }
            let want = content_sizes.get(&name).copied().unwrap_or(0) - allocation[name];
            let current = increments[name];
            if current < want {
                *increments.get_mut(name).unwrap() += 1;
                used += 1;
                leftover -= 1;
            }
        }

        let progress = used;
        if progress == 0 {
            break;
        }
        for (name, inc) in increments {
            *allocation.get_mut(name).unwrap() += inc;
        }
        remaining -= progress;
    }

    allocation.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_budget_proportionally_to_weights() {
        let weights = [("documentation", 0.5), ("code", 0.5)];
        let mut sizes = BTreeMap::new();
        sizes.insert("documentation", 1000);
        sizes.insert("code", 1000);
        let out = allocate_optional_bytes(100, &weights, &sizes);
        assert_eq!(out["documentation"] + out["code"], 100);
        assert_eq!(out["documentation"], 50);
        assert_eq!(out["code"], 50);
    }

    #[test]
    fn never_allocates_more_than_content_size() {
        let weights = [("documentation", 0.9), ("code", 0.1)];
        let mut sizes = BTreeMap::new();
        sizes.insert("documentation", 5);
        sizes.insert("code", 1000);
        let out = allocate_optional_bytes(100, &weights, &sizes);
        assert_eq!(out["documentation"], 5);
        assert_eq!(out["code"], 95);
    }

    #[test]
    fn tie_break_is_alphabetical() {
        let weights = [("build_and_package_data", 1.0), ("tests", 1.0)];
        let mut sizes = BTreeMap::new();
        sizes.insert("build_and_package_data", 10);
        sizes.insert("tests", 10);
        let out = allocate_optional_bytes(9, &weights, &sizes);
        assert_eq!(out["build_and_package_data"] + out["tests"], 9);
    }

    #[test]
    fn zero_weight_categories_get_nothing() {
        let weights = [("documentation", 0.0), ("code", 1.0)];
        let mut sizes = BTreeMap::new();
        sizes.insert("documentation", 100);
        sizes.insert("code", 100);
        let out = allocate_optional_bytes(50, &weights, &sizes);
        assert_eq!(out["documentation"], 0);
        assert_eq!(out["code"], 50);
    }
}
