use async_trait::async_trait;
use tracing::debug;

use super::{endpoints, response::json_or_error, RfpHttpClient};
use crate::{
    client::GenerationService,
    error::SdkError,
    types::{
        EnrichRequest, EnrichResponse, GenerateRequest, GenerateResponse, QueryRequest,
        SimilarQuestionsResponse,
    },
};

#[async_trait]
impl GenerationService for RfpHttpClient {
    async fn generate_response(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, SdkError> {
        let url = self.model_endpoint(endpoints::GENERATE);
        debug!(%url, label = %request.label, "Generating response");

        let response = self
            .http_client
            .post(&url)
            .headers(self.model_headers())
            .json(&request)
            .send()
            .await?;

        json_or_error(response).await
    }

    async fn fetch_similar(&self, query: &str) -> Result<SimilarQuestionsResponse, SdkError> {
        let url = self.model_endpoint(endpoints::SIMILAR_QUESTIONS);
        debug!(%url, "Fetching similar questions");

        let response = self
            .http_client
            .post(&url)
            .headers(self.model_headers())
            .json(&QueryRequest::new(query))
            .send()
            .await?;

        json_or_error(response).await
    }

    async fn enrich_response(&self, request: EnrichRequest) -> Result<EnrichResponse, SdkError> {
        let url = self.model_endpoint(endpoints::ENRICH);
        debug!(%url, label = %request.label, "Enriching response");

        let response = self
            .http_client
            .post(&url)
            .headers(self.model_headers())
            .json(&request)
            .send()
            .await?;

        json_or_error(response).await
    }
}
