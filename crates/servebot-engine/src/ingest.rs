//! Catalog batch normalization: turns the raw records handed over by
//! content acquisition into typed documents ready for embedding. The `type`
//! metadata tag written here is what drives collection routing on insert.

use serde_json::json;

use servebot_core::types::{CatalogBatch, Metadata};

/// A normalized document before embedding.
#[derive(Debug, Clone)]
pub struct RawDoc {
    pub content: String,
    pub metadata: Metadata,
}

fn metadata_from(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

/// Flatten a catalog batch into documents.
///
/// General content becomes four overview documents; each service record and
/// each job listing becomes one document carrying the record's fields as
/// metadata.
pub fn prepare_documents(batch: &CatalogBatch) -> Vec<RawDoc> {
    let mut documents = Vec::new();

    let general = &batch.general_content;
    if !general.is_empty() {
        documents.push(RawDoc {
            content: format!(
                "Company: {} - {}. Description: {}",
                general.company_name, general.tagline, general.description
            ),
            metadata: metadata_from(json!({
                "type": "general",
                "category": "company_info",
            })),
        });

        documents.push(RawDoc {
            content: format!("Services offered: {}", general.services_offered.join(", ")),
            metadata: metadata_from(json!({
                "type": "general",
                "category": "services_overview",
            })),
        });

        documents.push(RawDoc {
            content: format!("How it works: {}", general.how_it_works.join(". ")),
            metadata: metadata_from(json!({
                "type": "general",
                "category": "process",
            })),
        });

        documents.push(RawDoc {
            content: format!("Key features: {}", general.key_features.join(", ")),
            metadata: metadata_from(json!({
                "type": "general",
                "category": "features",
            })),
        });
    }

    for service in &batch.services {
        documents.push(RawDoc {
            content: format!(
                "Service: {}. Sub-services: {}. Starting price: {}. Description: {}",
                service.title,
                service.sub_services.join(", "),
                service.starting_price,
                service.description
            ),
            metadata: metadata_from(json!({
                "type": "service",
                "service_name": service.title,
                "starting_price": service.starting_price,
                "category": "service_details",
            })),
        });
    }

    for job in &batch.job_listings {
        documents.push(RawDoc {
            content: format!(
                "Job: {} at {} department. Location: {}. Experience: {}. Salary: {}. \
                 Skills: {}. Type: {}. Description: {}",
                job.title,
                job.department,
                job.location,
                job.experience,
                job.salary,
                job.skills.join(", "),
                job.job_type,
                job.description
            ),
            metadata: metadata_from(json!({
                "type": "career",
                "job_id": job.id,
                "title": job.title,
                "department": job.department,
                "location": job.location,
                "experience": job.experience,
                "salary": job.salary,
                "job_type": job.job_type,
                "category": "job_listing",
            })),
        });
    }

    documents
}
