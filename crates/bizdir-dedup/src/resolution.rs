//! Duplicate resolution
//!
//! Scores candidate pairs, classifies each match by reason and picks the
//! record to keep. Passes run in a fixed order (address groups, phone groups,
//! then the full name scan) and share one seen-pairs set, so a pair is
//! reported under the first reason that claims it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bizdir_domain::{is_blank, Record, RecordId};

use crate::clustering::{cluster_findings, DuplicateCluster};
use crate::config::DedupConfig;
use crate::error::Result;
use crate::grouping::{all_pairs, CandidateGroup, CandidateGrouper, PairKey, SeenPairs};
use crate::normalization::{NormalizedView, Normalizer};
use crate::similarity::name_similarity;

/// Why two records were flagged as duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchReason {
    #[serde(rename = "Similar address")]
    SimilarAddress,
    #[serde(rename = "Same phone")]
    SamePhone,
    #[serde(rename = "Very similar name")]
    VerySimilarName,
}

impl MatchReason {
    pub fn label(&self) -> &'static str {
        match self {
            MatchReason::SimilarAddress => "Similar address",
            MatchReason::SamePhone => "Same phone",
            MatchReason::VerySimilarName => "Very similar name",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scored duplicate verdict between two records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateFinding {
    pub reason: MatchReason,
    /// Name similarity of the pair, whatever the reason
    pub similarity: f64,
    /// Earlier record in input order
    pub record_a: RecordId,
    pub record_b: RecordId,
    pub keep: RecordId,
    pub remove: RecordId,
    /// Matched only because the normalized addresses are equal
    pub needs_review: bool,
}

/// Output of one duplicate scan
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResolution {
    /// Findings, similarity descending
    pub findings: Vec<DuplicateFinding>,
    /// Each id at most once, in first-selected order
    pub ids_to_remove: Vec<RecordId>,
    /// Connected components of the findings, only when clustering is enabled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<DuplicateCluster>,
}

impl DuplicateResolution {
    pub fn needs_review_count(&self) -> usize {
        self.findings.iter().filter(|f| f.needs_review).count()
    }
}

/// Number of non-empty contact and content fields
///
/// Counts phone, website, email, description and the external map link.
pub fn completeness_score(record: &Record) -> usize {
    [
        &record.phone,
        &record.website,
        &record.email,
        &record.description,
        &record.external_map_link,
    ]
    .into_iter()
    .filter(|field| !is_blank(field))
    .count()
}

/// Pick the record to keep from a pair, as `(keep, remove)`
///
/// The strictly more complete record wins; on a tie `a` is kept.
pub fn choose_survivor(a: &Record, b: &Record) -> (RecordId, RecordId) {
    if completeness_score(a) >= completeness_score(b) {
        (a.id, b.id)
    } else {
        (b.id, a.id)
    }
}

/// Duplicate detection engine
#[derive(Debug, Clone)]
pub struct DuplicateResolver {
    config: DedupConfig,
    normalizer: Normalizer,
    grouper: CandidateGrouper,
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        let config = DedupConfig::default();
        Self {
            grouper: CandidateGrouper::new(config.grouping.clone()),
            normalizer: Normalizer::default(),
            config,
        }
    }
}

impl DuplicateResolver {
    /// Build a resolver, validating the configuration and compiling its rules
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = Normalizer::from_config(&config.normalizer)?;
        let grouper = CandidateGrouper::new(config.grouping.clone());
        Ok(Self {
            config,
            normalizer,
            grouper,
        })
    }

    /// Find duplicate pairs in a batch and the ids to remove
    ///
    /// Tie-breaks depend on input order, so callers should pass a stable
    /// ordering such as ascending id.
    pub fn find_duplicates(&self, records: &[Record]) -> DuplicateResolution {
        let views: Vec<NormalizedView> = records.iter().map(|r| self.normalizer.view(r)).collect();
        let groups = self.grouper.group(&views);

        let mut scan = PairScan {
            resolver: self,
            records,
            views: &views,
            seen: SeenPairs::default(),
            findings: Vec::new(),
        };

        for group in groups.address.iter().filter(|g| g.is_candidate()) {
            scan.address_group(group);
        }
        let after_address = scan.findings.len();

        for group in groups.phone.iter().filter(|g| g.is_candidate()) {
            scan.phone_group(group);
        }
        let after_phone = scan.findings.len();

        scan.name_pass();

        debug!(
            address = after_address,
            phone = after_phone - after_address,
            name = scan.findings.len() - after_phone,
            seen = scan.seen.len(),
            "classified candidate pairs"
        );

        let mut findings = scan.findings;
        findings.sort_by(|x, y| y.similarity.total_cmp(&x.similarity));

        let (ids_to_remove, clusters) = if self.config.resolution.cluster_findings {
            let clusters = cluster_findings(records, &findings);
            (cluster_removals(&findings, &clusters), clusters)
        } else {
            (pairwise_removals(&findings), Vec::new())
        };

        let resolution = DuplicateResolution {
            findings,
            ids_to_remove,
            clusters,
        };

        info!(
            records = records.len(),
            findings = resolution.findings.len(),
            needs_review = resolution.needs_review_count(),
            ids_to_remove = resolution.ids_to_remove.len(),
            "duplicate scan complete"
        );

        resolution
    }

    fn similarity(&self, a: &Record, b: &Record) -> f64 {
        name_similarity(&a.name, &b.name, self.config.resolution.fold_name_diacritics)
    }
}

/// State of one scan over a batch
struct PairScan<'a> {
    resolver: &'a DuplicateResolver,
    records: &'a [Record],
    views: &'a [NormalizedView],
    seen: SeenPairs,
    findings: Vec<DuplicateFinding>,
}

impl PairScan<'_> {
    /// Unseen pair of distinct records, or `None`
    fn candidate(&self, i: usize, j: usize) -> Option<PairKey> {
        let (a, b) = (&self.records[i], &self.records[j]);
        if a.id == b.id {
            return None;
        }
        let key = PairKey::new(a.id, b.id);
        (!self.seen.contains(&key)).then_some(key)
    }

    fn address_group(&mut self, group: &CandidateGroup) {
        let threshold = self.resolver.config.thresholds.address_name_similarity;
        for (i, j) in group.pairs() {
            let Some(key) = self.candidate(i, j) else {
                continue;
            };
            let similarity = self.resolver.similarity(&self.records[i], &self.records[j]);
            let names_match = similarity > threshold;
            let same_address =
                self.views[i].normalized_address == self.views[j].normalized_address;

            if names_match || same_address {
                self.seen.insert(key);
                self.push(MatchReason::SimilarAddress, similarity, i, j, !names_match);
            }
        }
    }

    fn phone_group(&mut self, group: &CandidateGroup) {
        for (i, j) in group.pairs() {
            let Some(key) = self.candidate(i, j) else {
                continue;
            };
            let similarity = self.resolver.similarity(&self.records[i], &self.records[j]);
            self.seen.insert(key);
            self.push(MatchReason::SamePhone, similarity, i, j, false);
        }
    }

    fn name_pass(&mut self) {
        let threshold = self.resolver.config.thresholds.name_only_similarity;
        for (i, j) in all_pairs(self.records.len()) {
            let Some(key) = self.candidate(i, j) else {
                continue;
            };
            let similarity = self.resolver.similarity(&self.records[i], &self.records[j]);
            if similarity > threshold {
                self.seen.insert(key);
                self.push(MatchReason::VerySimilarName, similarity, i, j, false);
            }
        }
    }

    fn push(&mut self, reason: MatchReason, similarity: f64, i: usize, j: usize, needs_review: bool) {
        let (a, b) = (&self.records[i], &self.records[j]);
        let (keep, remove) = choose_survivor(a, b);
        self.findings.push(DuplicateFinding {
            reason,
            similarity,
            record_a: a.id,
            record_b: b.id,
            keep,
            remove,
            needs_review,
        });
    }
}

fn pairwise_removals(findings: &[DuplicateFinding]) -> Vec<RecordId> {
    let mut listed = HashSet::new();
    findings
        .iter()
        .map(|f| f.remove)
        .filter(|id| listed.insert(*id))
        .collect()
}

/// Removed cluster members, ordered by the first finding that mentions them
fn cluster_removals(findings: &[DuplicateFinding], clusters: &[DuplicateCluster]) -> Vec<RecordId> {
    let removed: HashSet<RecordId> = clusters
        .iter()
        .flat_map(|c| c.removed.iter().copied())
        .collect();

    let mut listed = HashSet::new();
    findings
        .iter()
        .flat_map(|f| [f.record_a, f.record_b])
        .filter(|id| removed.contains(id) && listed.insert(*id))
        .collect()
}
