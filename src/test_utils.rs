//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid project name (Eclipse style identifier)
    pub fn project_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_.-]{0,30}"
    }

    /// Generate an acyclic dependency graph of up to `max` projects
    ///
    /// Project `p{i}` may only reference projects `p{j}` with `j < i`.
    pub fn dependency_dag(max: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
        (1..=max).prop_flat_map(|n| {
            proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n).prop_map(
                move |matrix| {
                    (0..n)
                        .map(|i| {
                            let deps = (0..i)
                                .filter(|&j| matrix[i][j])
                                .map(|j| format!("p{j}"))
                                .collect();
                            (format!("p{i}"), deps)
                        })
                        .collect()
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_project_name_generator(name in project_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().next().unwrap().is_ascii_alphabetic());
        }

        #[test]
        fn test_dependency_dag_only_points_backwards(dag in dependency_dag(8)) {
            for (index, (_, deps)) in dag.iter().enumerate() {
                for dep in deps {
                    let target: usize = dep[1..].parse().unwrap();
                    prop_assert!(target < index);
                }
            }
        }
    }
}
