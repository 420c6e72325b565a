//! Proptest strategies for registry inputs.

use proptest::collection::{hash_set, vec};
use proptest::prelude::*;

/// Plain definition name; never contains `_`
pub fn object_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}"
}

/// Distinct definition names
pub fn distinct_names(max: usize) -> impl Strategy<Value = Vec<String>> {
    hash_set(object_name(), 1..=max).prop_map(|names| names.into_iter().collect())
}

/// One alias in a generated plan
#[derive(Debug, Clone)]
pub struct AliasStep {
    pub alias: String,
    /// Index of the definition the alias (or its chain) ends at
    pub target: usize,
    /// Point at the previous alias instead of the definition directly
    pub chained: bool,
}

/// Definition names plus aliases over them.
///
/// Aliases carry an `alias_` prefix, so they never collide with a
/// definition name.
pub fn alias_plan(max_names: usize) -> impl Strategy<Value = (Vec<String>, Vec<AliasStep>)> {
    distinct_names(max_names).prop_flat_map(|names| {
        let count = names.len();
        let steps = hash_set("alias_[a-z]{1,8}", 0..8).prop_flat_map(move |aliases| {
            let aliases: Vec<String> = aliases.into_iter().collect();
            let len = aliases.len();
            vec((0..count, any::<bool>()), len).prop_map(move |targets| {
                aliases
                    .iter()
                    .cloned()
                    .zip(targets)
                    .map(|(alias, (target, chained))| AliasStep {
                        alias,
                        target,
                        chained,
                    })
                    .collect::<Vec<_>>()
            })
        });
        (Just(names), steps)
    })
}

/// Number of threads racing for one shared object
pub fn racer_count() -> impl Strategy<Value = usize> {
    2usize..12
}
