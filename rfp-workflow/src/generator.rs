use rfp_sdk::client::GenerationService;
use rfp_sdk::types::{EnrichRequest, GenerateRequest, SimilarQuestion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Result, WorkflowError};

/// One generated answer, immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub query_text: String,
    pub category: String,
    pub response_text: String,
}

/// Previously answered question ranked by similarity, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPrecedent {
    pub question: String,
    pub answer: String,
    pub similarity_score: f64,
}

impl SimilarPrecedent {
    /// Score as a whole percentage clamped to 0..=100
    pub fn score_percent(&self) -> u8 {
        (self.similarity_score.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

impl From<SimilarQuestion> for SimilarPrecedent {
    fn from(question: SimilarQuestion) -> Self {
        Self {
            question: question.question,
            answer: question.answer,
            similarity_score: question.similarity_score,
        }
    }
}

pub struct ResponseGenerator {
    service: Arc<dyn GenerationService>,
}

impl ResponseGenerator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    /// Generate an answer for `query` steered by `category`. Not retried.
    pub async fn generate(&self, query: &str, category: &str) -> Result<GeneratedResponse> {
        let query = query.trim();
        let category = category.trim();
        if query.is_empty() {
            return Err(WorkflowError::validation("Query cannot be empty"));
        }
        if category.is_empty() {
            return Err(WorkflowError::validation("Please select a category first."));
        }

        debug!(category, "Requesting generated response");
        let response = self
            .service
            .generate_response(GenerateRequest {
                query: query.to_string(),
                label: category.to_string(),
            })
            .await
            .map_err(|e| {
                warn!(error = %e, status = e.status(), "Generation failed");
                WorkflowError::generation(&e)
            })?;

        info!(category, chars = response.response.len(), "Generated response");
        Ok(GeneratedResponse {
            query_text: query.to_string(),
            category: category.to_string(),
            response_text: response.response,
        })
    }

    /// Precedents in the order the service ranked them
    pub async fn fetch_similar(&self, query: &str) -> Result<Vec<SimilarPrecedent>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WorkflowError::validation("Query cannot be empty"));
        }

        let response = self.service.fetch_similar(query).await.map_err(|e| {
            warn!(error = %e, "Similar question lookup failed");
            WorkflowError::unavailable(e)
        })?;

        debug!(count = response.similar_questions.len(), "Fetched precedents");
        Ok(response
            .similar_questions
            .into_iter()
            .map(SimilarPrecedent::from)
            .collect())
    }

    /// Ask the model service to polish an existing answer
    pub async fn enrich(&self, query: &str, category: &str, response: &str) -> Result<String> {
        if response.trim().is_empty() {
            return Err(WorkflowError::validation("No response to enrich"));
        }
        let category = match category.trim() {
            "" => crate::category::NO_CATEGORY,
            category => category,
        };

        let enriched = self
            .service
            .enrich_response(EnrichRequest {
                query: query.trim().to_string(),
                label: category.to_string(),
                response_to_enrich: response.to_string(),
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "Enrichment failed");
                WorkflowError::enrichment(e)
            })?;

        if let Some(error) = enriched.error {
            return Err(WorkflowError::enrichment(error));
        }
        enriched
            .enriched_response
            .ok_or_else(|| WorkflowError::enrichment("response did not include enriched_response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_percent_rounds_and_clamps() {
        let precedent = |score| SimilarPrecedent {
            question: "q".to_string(),
            answer: "a".to_string(),
            similarity_score: score,
        };
        assert_eq!(precedent(0.916).score_percent(), 92);
        assert_eq!(precedent(0.0).score_percent(), 0);
        assert_eq!(precedent(1.3).score_percent(), 100);
        assert_eq!(precedent(-0.2).score_percent(), 0);
    }
}
