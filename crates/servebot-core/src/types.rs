//! Shared data types: intents, collections, documents, search results, chat
//! messages, and the catalog batch shape handed over by content acquisition.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServebotError};

/// Document metadata: a flat string→scalar mapping.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The coarse category a query is routed to before retrieval and prompting.
///
/// `ALL` is the fixed priority order used for classification tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Careers,
    Services,
    General,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Careers, Intent::Services, Intent::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Careers => "careers",
            Intent::Services => "services",
            Intent::General => "general",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named partition of the similarity index.
///
/// `ALL` is the fixed collection order; search ties resolve in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    General,
    Services,
    Careers,
}

impl Collection {
    pub const ALL: [Collection; 3] =
        [Collection::General, Collection::Services, Collection::Careers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::General => "general",
            Collection::Services => "services",
            Collection::Careers => "careers",
        }
    }

    /// Parse a collection name; unknown names are an explicit rejection.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "general" => Ok(Collection::General),
            "services" => Ok(Collection::Services),
            "careers" => Ok(Collection::Careers),
            other => Err(ServebotError::UnknownCollection(other.to_string())),
        }
    }

    /// Target collection for a document, chosen by its `type` metadata tag.
    pub fn for_doc_type(doc_type: &str) -> Self {
        match doc_type {
            "service" => Collection::Services,
            "career" => Collection::Careers,
            _ => Collection::General,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked retrieval result. Derived per query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: String,
    pub metadata: Metadata,
    /// Cosine similarity, in [-1, 1].
    pub similarity: f32,
    /// 1 - similarity.
    pub distance: f32,
    pub collection: Collection,
}

/// A chat message sent to the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self { role: Role::System, content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }
}

/// The structured result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub query: String,
    pub intent: Intent,
    pub response: String,
    pub sources: Vec<SourceRef>,
    pub num_sources: usize,
}

/// A source citation attached to a response.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    /// Document content, truncated for display.
    pub content: String,
    pub metadata: Metadata,
    /// 1 - distance.
    pub relevance_score: f32,
}

// ─── Catalog batch (content-acquisition hand-off) ──────────────────────────

/// The raw batch produced by content acquisition. The core only consumes this
/// shape; how it was obtained (scraping, static extraction) is external.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogBatch {
    #[serde(default)]
    pub general_content: GeneralContent,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub job_listings: Vec<JobRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralContent {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services_offered: Vec<String>,
    #[serde(default)]
    pub how_it_works: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
}

impl GeneralContent {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_empty()
            && self.tagline.is_empty()
            && self.description.is_empty()
            && self.services_offered.is_empty()
            && self.how_it_works.is_empty()
            && self.key_features.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_services: Vec<String>,
    #[serde(default)]
    pub starting_price: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub description: String,
}
