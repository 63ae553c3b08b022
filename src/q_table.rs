use std::fmt::Debug;
use std::hash::Hash;

use fxhash::{FxBuildHasher, FxHashMap};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{Error, Result};

/// Action values of one state, kept in the table's canonical action order.
pub type Row<A> = IndexMap<A, f64, FxBuildHasher>;

/// First action, in row order, holding the highest value.
pub fn max_entry<A: Copy>(row: &Row<A>) -> Option<(A, f64)> {
    let mut best: Option<(A, f64)> = None;
    for (action, value) in row {
        if best.map_or(true, |(_, max)| *value > max) {
            best = Some((*action, *value));
        }
    }
    best
}

/// Two-level table `state -> action -> value`.
///
/// Rows only come into existence through [`QTable::ensure_row`] and are
/// never removed or reset afterwards.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    actions: Vec<A>,
    rows: FxHashMap<S, Row<A>>,
}

impl<S, A> QTable<S, A>
where
    S: Hash + Eq + Clone + Debug,
    A: Hash + Eq + Copy + Debug,
{
    /// Repeated actions are dropped, keeping the first occurrence.
    pub fn new(actions: impl IntoIterator<Item = A>) -> Result<Self> {
        let actions: IndexSet<A, FxBuildHasher> = actions.into_iter().collect();
        if actions.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        Ok(Self {
            actions: actions.into_iter().collect(),
            rows: FxHashMap::default(),
        })
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Adds a zeroed row for `state` unless it already has one. Returns
    /// whether a row was created.
    pub fn ensure_row(&mut self, state: &S) -> bool {
        if self.rows.contains_key(state) {
            return false;
        }
        let row: Row<A> = self.actions.iter().map(|action| (*action, 0.0)).collect();
        self.rows.insert(state.clone(), row);
        debug!("new q-table row for {:?} ({} states)", state, self.rows.len());
        true
    }

    pub fn contains(&self, state: &S) -> bool {
        self.rows.contains_key(state)
    }

    pub fn row_of(&self, state: &S) -> Option<&Row<A>> {
        self.rows.get(state)
    }

    pub fn row_of_mut(&mut self, state: &S) -> Option<&mut Row<A>> {
        self.rows.get_mut(state)
    }

    pub fn value(&self, state: &S, action: &A) -> Option<f64> {
        self.rows.get(state)?.get(action).copied()
    }

    pub fn get_max_action(&self, state: &S) -> Option<A> {
        self.rows.get(state).and_then(max_entry).map(|(action, _)| action)
    }

    pub fn max_value(&self, state: &S) -> Option<f64> {
        self.rows.get(state).and_then(max_entry).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Row<A>)> {
        self.rows.iter()
    }
}
