use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use wfc_core::errors::{ErrorInfo, WfcError};
use wfc_core::{NodeId, State};

use crate::node::Node;

/// Interned identifier for an edge-matching token.
///
/// Token values of any ordered type are interned at construction time so
/// the engine never carries the token type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(u64);

impl TokenId {
    /// Creates an identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Signature of a hand-written compatibility predicate.
///
/// The predicate must be symmetric in the swap of its two (node, state)
/// pairs; the engine consults it in both orders interchangeably.
pub type CompatibilityFn<S> =
    Arc<dyn Fn(&Node<S>, &S, &Node<S>, &S) -> bool + Send + Sync>;

/// One binary rule per grid axis, stated in the canonical
/// negative-to-positive orientation for that axis.
pub type AxisRule<S> = Arc<dyn Fn(&S, &S) -> bool + Send + Sync>;

/// Per-state allowed-neighbor sets, one set per direction slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedNeighbors<S> {
    directions: usize,
    allowed: BTreeMap<S, Vec<BTreeSet<S>>>,
}

impl<S: State> AllowedNeighbors<S> {
    /// Builds the table, checking that every state lists exactly
    /// `directions` neighbor sets.
    pub fn new(
        directions: usize,
        allowed: BTreeMap<S, Vec<Vec<S>>>,
    ) -> Result<Self, WfcError> {
        let mut table = BTreeMap::new();
        for (state, lists) in allowed {
            check_arity(directions, lists.len(), &state)?;
            let sets: Vec<BTreeSet<S>> = lists
                .into_iter()
                .map(|list| list.into_iter().collect())
                .collect();
            table.insert(state, sets);
        }
        Ok(Self {
            directions,
            allowed: table,
        })
    }

    /// Number of direction slots per state.
    pub fn directions(&self) -> usize {
        self.directions
    }

    /// The states covered by the table, in deterministic order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.allowed.keys()
    }

    /// Whether `to` may sit in direction `direction` of a cell holding
    /// `from`. Unknown states or directions allow nothing.
    pub fn allows(&self, from: &S, direction: usize, to: &S) -> bool {
        self.allowed
            .get(from)
            .and_then(|sets| sets.get(direction))
            .is_some_and(|set| set.contains(to))
    }
}

/// Per-axis binary rules in canonical negative-to-positive orientation.
#[derive(Clone)]
pub struct AxisRules<S> {
    rules: Vec<AxisRule<S>>,
}

impl<S> AxisRules<S> {
    /// Wraps one rule per axis.
    pub fn new(rules: Vec<AxisRule<S>>) -> Self {
        Self { rules }
    }

    /// Number of axes covered.
    pub fn axes(&self) -> usize {
        self.rules.len()
    }

    /// Evaluates the rule for a pair seen across direction slot
    /// `direction`.
    ///
    /// The rule for axis `direction / 2` is always evaluated with the
    /// negative-side state first: when `direction` is the positive slot
    /// the caller's own state is the negative endpoint, otherwise the
    /// neighbor's is.
    pub fn holds(&self, direction: usize, own: &S, neighbor: &S) -> bool {
        let Some(rule) = self.rules.get(direction / 2) else {
            return false;
        };
        if direction & 1 == 1 {
            rule(own, neighbor)
        } else {
            rule(neighbor, own)
        }
    }
}

impl<S> fmt::Debug for AxisRules<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisRules")
            .field("axes", &self.rules.len())
            .finish_non_exhaustive()
    }
}

/// Per-state edge token sets, one set per direction slot.
///
/// Two states facing each other across an edge are compatible when the
/// token sets on the meeting edges share at least one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTokens<S> {
    directions: usize,
    tokens: BTreeMap<S, Vec<BTreeSet<TokenId>>>,
}

impl<S: State> EdgeTokens<S> {
    /// Interns the raw token table, checking that every state lists
    /// exactly `directions` token sequences.
    ///
    /// Identifiers are assigned in the token values' sort order, so equal
    /// tables intern identically regardless of insertion history.
    pub fn intern<T: Ord + Clone>(
        directions: usize,
        raw: BTreeMap<S, Vec<Vec<T>>>,
    ) -> Result<Self, WfcError> {
        let mut universe: BTreeSet<T> = BTreeSet::new();
        for lists in raw.values() {
            for list in lists {
                universe.extend(list.iter().cloned());
            }
        }
        let ids: BTreeMap<T, TokenId> = universe
            .into_iter()
            .enumerate()
            .map(|(index, token)| (token, TokenId::from_raw(index as u64)))
            .collect();

        let mut tokens = BTreeMap::new();
        for (state, lists) in raw {
            check_arity(directions, lists.len(), &state)?;
            let sets: Vec<BTreeSet<TokenId>> = lists
                .into_iter()
                .map(|list| list.into_iter().map(|token| ids[&token]).collect())
                .collect();
            tokens.insert(state, sets);
        }
        Ok(Self { directions, tokens })
    }

    /// Number of direction slots per state.
    pub fn directions(&self) -> usize {
        self.directions
    }

    /// The states covered by the table, in deterministic order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.tokens.keys()
    }

    /// Whether the edge of `own` in direction `direction` shares a token
    /// with the facing edge of `neighbor`.
    pub fn share_token(&self, own: &S, direction: usize, neighbor: &S) -> bool {
        let own_edge = self
            .tokens
            .get(own)
            .and_then(|sets| sets.get(direction));
        let facing = self
            .tokens
            .get(neighbor)
            .and_then(|sets| sets.get(direction ^ 1));
        match (own_edge, facing) {
            (Some(a), Some(b)) => a.intersection(b).next().is_some(),
            _ => false,
        }
    }
}

/// Compatibility strategy consulted across every edge of a topology.
///
/// A single dispatch point replaces per-builder closures; the directional
/// variants first locate the direction slot `i` with
/// `a.adjacent[i] == Some(b)` and `b.adjacent[i ^ 1] == Some(a)` and treat
/// pairs with no such slot as incompatible.
#[derive(Clone)]
pub enum Compatibility<S> {
    /// Every pair of states is compatible.
    Free,
    /// Allowed-neighbor sets; both facing directions must agree.
    Adjacent(AllowedNeighbors<S>),
    /// One binary rule per axis in negative-to-positive orientation.
    AxisRules(AxisRules<S>),
    /// Facing edge token sets must intersect.
    Tokens(EdgeTokens<S>),
    /// Hand-written symmetric predicate over (node, state) pairs.
    Predicate(CompatibilityFn<S>),
}

impl<S> Default for Compatibility<S> {
    fn default() -> Self {
        Compatibility::Free
    }
}

impl<S> fmt::Debug for Compatibility<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compatibility::Free => f.write_str("Free"),
            Compatibility::Adjacent(table) => f.debug_tuple("Adjacent").field(table).finish(),
            Compatibility::AxisRules(rules) => f.debug_tuple("AxisRules").field(rules).finish(),
            Compatibility::Tokens(tokens) => f.debug_tuple("Tokens").field(tokens).finish(),
            Compatibility::Predicate(_) => f.debug_struct("Predicate").finish_non_exhaustive(),
        }
    }
}

impl<S: State> Compatibility<S> {
    /// Wraps a hand-written predicate.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Node<S>, &S, &Node<S>, &S) -> bool + Send + Sync + 'static,
    {
        Compatibility::Predicate(Arc::new(predicate))
    }

    /// Decides whether `a` holding `sa` and `b` holding `sb` may sit on
    /// the two ends of an edge.
    pub fn matches(
        &self,
        a: &Node<S>,
        a_id: NodeId,
        sa: &S,
        b: &Node<S>,
        b_id: NodeId,
        sb: &S,
    ) -> bool {
        match self {
            Compatibility::Free => true,
            Compatibility::Predicate(predicate) => predicate(a, sa, b, sb),
            Compatibility::Adjacent(table) => match shared_direction(a, a_id, b, b_id) {
                Some(direction) => {
                    table.allows(sa, direction, sb) && table.allows(sb, direction ^ 1, sa)
                }
                None => false,
            },
            Compatibility::AxisRules(rules) => shared_direction(a, a_id, b, b_id)
                .is_some_and(|direction| rules.holds(direction, sa, sb)),
            Compatibility::Tokens(tokens) => shared_direction(a, a_id, b, b_id)
                .is_some_and(|direction| tokens.share_token(sa, direction, sb)),
        }
    }
}

/// Locates the direction slot through which `a` sees `b`.
///
/// Returns the first `i` with `a.adjacent[i] == Some(b)` and
/// `b.adjacent[i ^ 1] == Some(a)`, or `None` when the nodes are not
/// mutually adjacent under the slot-parity convention.
pub fn shared_direction<S>(
    a: &Node<S>,
    a_id: NodeId,
    b: &Node<S>,
    b_id: NodeId,
) -> Option<usize> {
    for (direction, slot) in a.adjacent.iter().enumerate() {
        if *slot != Some(b_id) {
            continue;
        }
        let facing = b.adjacent.get(direction ^ 1).copied().flatten();
        if facing == Some(a_id) {
            return Some(direction);
        }
    }
    None
}

fn check_arity<S: fmt::Debug>(
    expected: usize,
    found: usize,
    state: &S,
) -> Result<(), WfcError> {
    if found == expected {
        return Ok(());
    }
    Err(WfcError::Structure(
        ErrorInfo::new(
            "direction-arity",
            "state lists the wrong number of direction entries",
        )
        .with_context("state", format!("{state:?}"))
        .with_context("expected", expected)
        .with_context("found", found),
    ))
}
