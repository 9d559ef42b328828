//! Set reconciliation for remote collections without a bulk replace
//!
//! Some NextDNS collections (rewrites) only offer per-element create and
//! per-element delete, and reject a create that duplicates an existing
//! element. Reconciling a declared set against such a collection means
//! computing which existing elements to delete and which declared elements
//! to create, leaving everything that already matches untouched.
//!
//! Elements are compared by a natural key (for rewrites: `(name, content)`),
//! never by the server-issued id. Both sides are human-curated and small,
//! so the comparison is a plain pairwise scan.

/// Outcome of diffing an existing collection against a desired one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan<E, D> {
    /// Existing elements whose key is not declared
    pub to_remove: Vec<E>,
    /// Declared elements whose key does not exist yet
    pub to_add: Vec<D>,
}

impl<E, D> ReconcilePlan<E, D> {
    /// Whether applying the plan would issue no remote calls
    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Diff `existing` against `desired` by natural key
///
/// Declared duplicates are added once, since the remote collection would
/// reject the second create. Existing duplicates that are declared are
/// kept; undeclared ones are all removed.
pub fn plan<E, D, K>(
    existing: &[E],
    desired: &[D],
    existing_key: impl Fn(&E) -> K,
    desired_key: impl Fn(&D) -> K,
) -> ReconcilePlan<E, D>
where
    E: Clone,
    D: Clone,
    K: PartialEq,
{
    let desired_keys: Vec<K> = desired.iter().map(&desired_key).collect();
    let existing_keys: Vec<K> = existing.iter().map(&existing_key).collect();

    let to_remove = existing
        .iter()
        .zip(&existing_keys)
        .filter(|(_, key)| !desired_keys.contains(key))
        .map(|(entry, _)| entry.clone())
        .collect();

    let mut added_keys: Vec<&K> = Vec::new();
    let mut to_add = Vec::new();
    for (entry, key) in desired.iter().zip(&desired_keys) {
        if existing_keys.contains(key) || added_keys.contains(&key) {
            continue;
        }
        added_keys.push(key);
        to_add.push(entry.clone());
    }

    ReconcilePlan { to_remove, to_add }
}
