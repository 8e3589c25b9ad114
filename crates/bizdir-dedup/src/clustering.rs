//! Cluster pairwise findings into connected components
//!
//! Pairwise findings are not transitive: A~B and B~C can remove B in one
//! finding and keep it in another. Clustering unions every finding and keeps
//! exactly one record per component.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use bizdir_domain::{Record, RecordId};

use crate::resolution::{completeness_score, DuplicateFinding};

/// One connected component of duplicate findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCluster {
    pub survivor: RecordId,
    /// All member ids in input order, survivor included
    pub members: Vec<RecordId>,
    /// Members other than the survivor, in input order
    pub removed: Vec<RecordId>,
}

/// Union-find over batch positions
#[derive(Debug, Clone)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Group findings into clusters and choose one survivor per cluster
///
/// The survivor is the member with the highest completeness score; ties go to
/// the earliest input position. Clusters are ordered by their earliest member.
/// Findings that name ids absent from `records` are ignored.
pub fn cluster_findings(records: &[Record], findings: &[DuplicateFinding]) -> Vec<DuplicateCluster> {
    let positions: HashMap<RecordId, usize> = records
        .iter()
        .enumerate()
        .map(|(position, record)| (record.id, position))
        .collect();

    let mut sets = DisjointSet::new(records.len());
    let mut touched = vec![false; records.len()];

    for finding in findings {
        let (Some(&a), Some(&b)) = (positions.get(&finding.record_a), positions.get(&finding.record_b))
        else {
            continue;
        };
        touched[a] = true;
        touched[b] = true;
        sets.union(a, b);
    }

    let mut by_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for position in (0..records.len()).filter(|&p| touched[p]) {
        let root = sets.find(position);
        let slot = *by_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(position);
    }

    components
        .into_iter()
        .filter(|members| members.len() >= 2)
        .map(|members| {
            let mut survivor = members[0];
            for &position in &members[1..] {
                if completeness_score(&records[position]) > completeness_score(&records[survivor]) {
                    survivor = position;
                }
            }
            DuplicateCluster {
                survivor: records[survivor].id,
                members: members.iter().map(|&p| records[p].id).collect(),
                removed: members
                    .iter()
                    .filter(|&&p| p != survivor)
                    .map(|&p| records[p].id)
                    .collect(),
            }
        })
        .collect()
}
