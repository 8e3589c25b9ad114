//! Candidate grouping
//!
//! Records that share a cheap exact key (street number plus address prefix,
//! or a full phone number) land in the same group, and only pairs inside a
//! group are scored. Group members are batch positions, not record ids.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use bizdir_domain::RecordId;

use crate::config::GroupingConfig;
use crate::normalization::NormalizedView;

/// Which key produced a candidate group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Address,
    Phone,
}

/// Records sharing one grouping key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateGroup {
    pub kind: GroupKind,
    pub key: String,
    /// Batch positions in input order
    pub members: Vec<usize>,
}

impl CandidateGroup {
    /// Whether the group yields any candidate pair
    pub fn is_candidate(&self) -> bool {
        self.members.len() >= 2
    }

    /// Every unordered pair of members, earlier position first
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.members.iter().enumerate().flat_map(move |(n, &i)| {
            self.members[n + 1..].iter().map(move |&j| (i, j))
        })
    }
}

/// Address and phone groups of one batch, each in first-seen key order
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateGroups {
    pub address: Vec<CandidateGroup>,
    pub phone: Vec<CandidateGroup>,
}

impl CandidateGroups {
    /// Number of candidate pairs across all groups, before de-duplication
    pub fn pair_count(&self) -> usize {
        self.address
            .iter()
            .chain(&self.phone)
            .map(|g| g.members.len() * g.members.len().saturating_sub(1) / 2)
            .sum()
    }
}

/// Unordered pair of record ids, smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(RecordId, RecordId);

impl PairKey {
    pub fn new(a: RecordId, b: RecordId) -> Self {
        if a <= b {
            PairKey(a, b)
        } else {
            PairKey(b, a)
        }
    }
}

/// Pairs already classified during one run
#[derive(Debug, Default)]
pub struct SeenPairs {
    pairs: HashSet<PairKey>,
}

impl SeenPairs {
    pub fn contains(&self, key: &PairKey) -> bool {
        self.pairs.contains(key)
    }

    /// Record a pair; returns false if it was already present
    pub fn insert(&mut self, key: PairKey) -> bool {
        self.pairs.insert(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Builds candidate groups from normalized views
#[derive(Debug, Clone, Default)]
pub struct CandidateGrouper {
    config: GroupingConfig,
}

impl CandidateGrouper {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// `<street number>_<first N chars of normalized address>`
    ///
    /// `None` when the address has no leading street number.
    pub fn address_key(&self, view: &NormalizedView) -> Option<String> {
        if view.street_number.is_empty() {
            return None;
        }
        let prefix: String = view
            .normalized_address
            .chars()
            .take(self.config.address_key_chars)
            .collect();
        Some(format!("{}_{}", view.street_number, prefix))
    }

    /// The digits-only phone, if it is long enough to be trusted
    pub fn phone_key(&self, view: &NormalizedView) -> Option<String> {
        if view.normalized_phone.len() >= self.config.min_phone_digits {
            Some(view.normalized_phone.clone())
        } else {
            None
        }
    }

    pub fn address_groups(&self, views: &[NormalizedView]) -> Vec<CandidateGroup> {
        collect_groups(
            GroupKind::Address,
            views.iter().map(|view| self.address_key(view)),
        )
    }

    pub fn phone_groups(&self, views: &[NormalizedView]) -> Vec<CandidateGroup> {
        collect_groups(
            GroupKind::Phone,
            views.iter().map(|view| self.phone_key(view)),
        )
    }

    pub fn group(&self, views: &[NormalizedView]) -> CandidateGroups {
        let groups = CandidateGroups {
            address: self.address_groups(views),
            phone: self.phone_groups(views),
        };
        debug!(
            records = views.len(),
            address_groups = groups.address.len(),
            phone_groups = groups.phone.len(),
            candidate_pairs = groups.pair_count(),
            "built candidate groups"
        );
        groups
    }
}

/// All unordered position pairs of a batch, for the name scan
pub fn all_pairs(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len).flat_map(move |i| (i + 1..len).map(move |j| (i, j)))
}

fn collect_groups(
    kind: GroupKind,
    keys: impl Iterator<Item = Option<String>>,
) -> Vec<CandidateGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CandidateGroup> = Vec::new();

    for (position, key) in keys.enumerate() {
        let Some(key) = key else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => groups[slot].members.push(position),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(CandidateGroup {
                    kind,
                    key,
                    members: vec![position],
                });
            }
        }
    }

    groups
}
