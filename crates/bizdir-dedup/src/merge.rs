//! Exact-address merge
//!
//! A stricter cleanup than the scored scan: records whose full address text is
//! identical collapse into one. The survivor is the most reviewed listing and
//! picks up contact fields it lacks from the records it replaces.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use bizdir_domain::{is_blank, Record, RecordId};

/// Summary of one collapsed address group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressMerge {
    pub address: String,
    pub survivor: RecordId,
    pub survivor_name: String,
    pub removed: Vec<RecordId>,
    /// Fields copied into the survivor, e.g. `"email"`
    pub filled_fields: Vec<&'static str>,
}

/// Result of an exact-address merge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// One record per address group, in first-seen group order
    pub records: Vec<Record>,
    pub removed_count: usize,
    pub merges: Vec<AddressMerge>,
}

/// Collapse records that share the exact same address text
///
/// Within a group the survivor has the highest review count, then the highest
/// rating (absent counts as 0); ties keep input order. Missing phone, website
/// and email on the survivor are filled from the other members in that same
/// priority order. An absent address groups as the empty string.
pub fn merge_exact_address_duplicates(records: Vec<Record>) -> MergeOutcome {
    let mut slots: Vec<Vec<Record>> = Vec::new();
    let mut by_address: HashMap<String, usize> = HashMap::new();

    for record in records {
        let address = record.address_text();
        match by_address.get(address) {
            Some(&slot) => slots[slot].push(record),
            None => {
                by_address.insert(address.to_string(), slots.len());
                slots.push(vec![record]);
            }
        }
    }

    let mut merged = Vec::with_capacity(slots.len());
    let mut merges = Vec::new();
    let mut removed_count = 0;

    for mut group in slots {
        if group.len() == 1 {
            merged.extend(group);
            continue;
        }

        // Stable: equal keys keep input order
        group.sort_by(|a, b| {
            b.review_count
                .unwrap_or(0)
                .cmp(&a.review_count.unwrap_or(0))
                .then_with(|| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)))
        });

        let mut members = group.into_iter();
        let Some(mut survivor) = members.next() else {
            continue;
        };
        let others: Vec<Record> = members.collect();

        let mut filled_fields = Vec::new();
        for other in &others {
            for (field, name) in [
                (FillField::Phone, "phone"),
                (FillField::Website, "website"),
                (FillField::Email, "email"),
            ] {
                if field.fill(&mut survivor, other) && !filled_fields.contains(&name) {
                    filled_fields.push(name);
                }
            }
        }

        let merge = AddressMerge {
            address: survivor.address_text().to_string(),
            survivor: survivor.id,
            survivor_name: survivor.name.clone(),
            removed: others.iter().map(|r| r.id).collect(),
            filled_fields,
        };
        debug!(
            address = %merge.address,
            survivor = merge.survivor,
            removed = merge.removed.len(),
            "collapsed exact-address group"
        );

        removed_count += others.len();
        merges.push(merge);
        merged.push(survivor);
    }

    MergeOutcome {
        records: merged,
        removed_count,
        merges,
    }
}

#[derive(Debug, Clone, Copy)]
enum FillField {
    Phone,
    Website,
    Email,
}

impl FillField {
    fn slot<'r>(&self, record: &'r mut Record) -> &'r mut Option<String> {
        match self {
            FillField::Phone => &mut record.phone,
            FillField::Website => &mut record.website,
            FillField::Email => &mut record.email,
        }
    }

    /// Copy the field from `donor` if the survivor lacks it
    fn fill(&self, survivor: &mut Record, donor: &Record) -> bool {
        let value = match self {
            FillField::Phone => &donor.phone,
            FillField::Website => &donor.website,
            FillField::Email => &donor.email,
        };
        let slot = self.slot(survivor);
        if is_blank(slot) && !is_blank(value) {
            *slot = value.clone();
            true
        } else {
            false
        }
    }
}
