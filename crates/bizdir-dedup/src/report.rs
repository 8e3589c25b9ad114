//! Duplicate reports and removal logs
//!
//! A report is the reviewable form of a scan: every finding with enough of
//! both records to judge it by eye. After review, a confirmed id list is
//! applied to the batch with [`apply_removals`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizdir_domain::{Record, RecordId};

use crate::error::Result;
use crate::resolution::{DuplicateResolution, MatchReason};

const RULE_WIDTH: usize = 60;

/// The fields of a record shown next to a finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSummary {
    pub id: RecordId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slug: Option<String>,
}

impl From<&Record> for BusinessSummary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            address: record.address.clone(),
            phone: record.phone.clone(),
            slug: record.slug().map(str::to_string),
        }
    }
}

/// One finding as written to the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    pub reason: MatchReason,
    pub similarity: f64,
    #[serde(alias = "business_a")]
    pub business_a: BusinessSummary,
    #[serde(alias = "business_b")]
    pub business_b: BusinessSummary,
    /// Absent in snake_case reports; filled in by [`DuplicateReport::from_json`]
    #[serde(default)]
    pub keep: RecordId,
    #[serde(default)]
    pub remove: RecordId,
    #[serde(default, alias = "needs_review")]
    pub needs_review: bool,
}

impl ReportDetail {
    fn other(&self, id: RecordId) -> Option<&BusinessSummary> {
        if self.business_a.id == id {
            Some(&self.business_b)
        } else if self.business_b.id == id {
            Some(&self.business_a)
        } else {
            None
        }
    }
}

/// Reviewable result of a duplicate scan
///
/// Written with camelCase keys. Reading also accepts the snake_case layout
/// of older reports, which carry no timestamp or keep/remove verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    #[serde(default = "Utc::now", alias = "generated_at")]
    pub generated_at: DateTime<Utc>,
    #[serde(alias = "total_businesses")]
    pub total_businesses: usize,
    #[serde(alias = "duplicates_found")]
    pub duplicates_found: usize,
    #[serde(alias = "suggested_ids_to_remove")]
    pub suggested_ids_to_remove: Vec<RecordId>,
    pub details: Vec<ReportDetail>,
}

impl DuplicateReport {
    /// Build a report for `records` from a scan over the same batch
    pub fn build(records: &[Record], resolution: &DuplicateResolution) -> Self {
        let by_id: HashMap<RecordId, &Record> = records.iter().map(|r| (r.id, r)).collect();

        let details: Vec<ReportDetail> = resolution
            .findings
            .iter()
            .filter_map(|finding| {
                let a = by_id.get(&finding.record_a)?;
                let b = by_id.get(&finding.record_b)?;
                Some(ReportDetail {
                    reason: finding.reason,
                    similarity: finding.similarity,
                    business_a: BusinessSummary::from(*a),
                    business_b: BusinessSummary::from(*b),
                    keep: finding.keep,
                    remove: finding.remove,
                    needs_review: finding.needs_review,
                })
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            total_businesses: records.len(),
            duplicates_found: details.len(),
            suggested_ids_to_remove: resolution.ids_to_remove.clone(),
            details,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report; details without verdicts remove the suggested id
    pub fn from_json(json: &str) -> Result<Self> {
        let mut report: Self = serde_json::from_str(json)?;
        for detail in report.details.iter_mut().filter(|d| d.keep == d.remove) {
            let (a, b) = (detail.business_a.id, detail.business_b.id);
            (detail.keep, detail.remove) = if report.suggested_ids_to_remove.contains(&a) {
                (b, a)
            } else {
                (a, b)
            };
        }
        Ok(report)
    }

    /// Suggested removals with a human-readable reason for each
    pub fn removal_reasons(&self) -> BTreeMap<RecordId, String> {
        self.suggested_ids_to_remove
            .iter()
            .map(|&id| {
                let reason = self
                    .details
                    .iter()
                    .find_map(|detail| {
                        detail.other(id).map(|other| {
                            format!(
                                "{} duplicate of ID {} ({})",
                                detail.reason, other.id, other.name
                            )
                        })
                    })
                    .unwrap_or_else(|| "suggested by duplicate report".to_string());
                (id, reason)
            })
            .collect()
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let thin = "─".repeat(RULE_WIDTH);
        let thick = "=".repeat(RULE_WIDTH);

        for (n, detail) in self.details.iter().enumerate() {
            writeln!(f, "{thin}")?;
            writeln!(
                f,
                "Duplicate #{} ({}, similarity: {:.0}%)",
                n + 1,
                detail.reason,
                detail.similarity * 100.0
            )?;
            writeln!(f, "{thin}")?;
            write_business(f, "A", &detail.business_a)?;
            writeln!(f)?;
            write_business(f, "B", &detail.business_b)?;

            let (keep_side, remove_side) = if detail.keep == detail.business_a.id {
                ("A", "B")
            } else {
                ("B", "A")
            };
            writeln!(
                f,
                "  Suggest: KEEP {keep_side} (ID: {}), REMOVE {remove_side} (ID: {})",
                detail.keep, detail.remove
            )?;
            if detail.needs_review {
                writeln!(f, "  Needs review: matched on identical address only")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "{thick}")?;
        writeln!(f, "SUMMARY")?;
        writeln!(f, "{thick}")?;
        writeln!(f, "Total businesses: {}", self.total_businesses)?;
        writeln!(f, "Total potential duplicates: {}", self.duplicates_found)?;
        writeln!(f, "Suggested IDs to remove: {:?}", self.suggested_ids_to_remove)
    }
}

fn write_business(f: &mut fmt::Formatter<'_>, side: &str, business: &BusinessSummary) -> fmt::Result {
    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
    writeln!(f, "  Business {side} (ID: {}):", business.id)?;
    writeln!(f, "     Name:    {}", business.name)?;
    writeln!(f, "     Address: {}", or_na(&business.address))?;
    writeln!(f, "     Phone:   {}", or_na(&business.phone))?;
    writeln!(f, "     Slug:    {}", or_na(&business.slug))
}

/// A record taken out of the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedRecord {
    pub id: RecordId,
    pub name: String,
    pub address: Option<String>,
    pub reason: String,
}

/// Log of an applied removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalLog {
    #[serde(alias = "removed_count")]
    pub removed_count: usize,
    #[serde(alias = "original_count")]
    pub original_count: usize,
    #[serde(alias = "new_count")]
    pub new_count: usize,
    pub removed: Vec<RemovedRecord>,
}

impl RemovalLog {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drop every record whose id is in `removals`, keeping batch order
///
/// Ids in `removals` that are not in the batch are ignored.
pub fn apply_removals(
    records: Vec<Record>,
    removals: &BTreeMap<RecordId, String>,
) -> (Vec<Record>, RemovalLog) {
    let original_count = records.len();
    let mut kept = Vec::with_capacity(original_count);
    let mut removed = Vec::new();

    for record in records {
        match removals.get(&record.id) {
            Some(reason) => {
                tracing::info!(id = record.id, name = %record.name, %reason, "removing record");
                removed.push(RemovedRecord {
                    id: record.id,
                    name: record.name,
                    address: record.address,
                    reason: reason.clone(),
                });
            }
            None => kept.push(record),
        }
    }

    let log = RemovalLog {
        removed_count: removed.len(),
        original_count,
        new_count: kept.len(),
        removed,
    };
    (kept, log)
}
