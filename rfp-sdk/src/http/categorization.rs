use async_trait::async_trait;
use tracing::debug;

use super::{endpoints, response::json_or_error, RfpHttpClient};
use crate::{
    client::CategorizationService,
    error::SdkError,
    types::{CategoryRecord, PredictCategoryResponse, QueryRequest},
};

#[async_trait]
impl CategorizationService for RfpHttpClient {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SdkError> {
        let url = self.portal_endpoint(endpoints::LIST_CATEGORIES);
        debug!(%url, "Listing categories");

        let response = self
            .http_client
            .post(&url)
            .headers(self.portal_headers()?)
            .send()
            .await?;

        json_or_error(response).await
    }

    async fn predict_category(&self, query: &str) -> Result<PredictCategoryResponse, SdkError> {
        let url = self.model_endpoint(endpoints::PREDICT_CATEGORY);
        debug!(%url, "Predicting category");

        let response = self
            .http_client
            .post(&url)
            .headers(self.model_headers())
            .json(&QueryRequest::new(query))
            .send()
            .await?;

        json_or_error(response).await
    }
}
