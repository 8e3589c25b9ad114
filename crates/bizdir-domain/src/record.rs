//! Business record domain model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable identifier of a record within one batch
pub type RecordId = i64;

/// A business directory entry
///
/// Only the fields the duplicate engine reads are typed. Everything else in
/// the source JSON (slug, category, city, translations, ...) is kept in
/// `extra` so a cleaned batch can be written back without losing data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    // Completeness fields: presence matters, content is opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to the listing on an external map service.
    ///
    /// Serialized under the directory's historical `googleMapsLink` key.
    #[serde(
        default,
        rename = "googleMapsLink",
        alias = "externalMapLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_map_link: Option<String>,

    // Quality signals, only read by the exact-address cleanup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a record with the required fields only
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: None,
            phone: None,
            website: None,
            email: None,
            description: None,
            external_map_link: None,
            review_count: None,
            rating: None,
            extra: Map::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_external_map_link(mut self, link: impl Into<String>) -> Self {
        self.external_map_link = Some(link.into());
        self
    }

    pub fn with_review_count(mut self, review_count: u64) -> Self {
        self.review_count = Some(review_count);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Address text, empty when absent
    pub fn address_text(&self) -> &str {
        self.address.as_deref().unwrap_or("")
    }

    /// Phone text, empty when absent
    pub fn phone_text(&self) -> &str {
        self.phone.as_deref().unwrap_or("")
    }

    /// URL slug assigned by the directory, if any
    pub fn slug(&self) -> Option<&str> {
        self.extra.get("slug").and_then(Value::as_str)
    }
}

/// True when an optional text field is absent or empty
pub fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

/// Reassign ids sequentially starting at 1, in batch order
pub fn renumber_ids(records: &mut [Record]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.id = index as RecordId + 1;
    }
}
