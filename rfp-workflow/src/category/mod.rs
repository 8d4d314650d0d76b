//! Category listing, prediction and description lookup.

pub mod taxonomy;

use rfp_sdk::client::CategorizationService;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::error::{Result, WorkflowError};
pub use taxonomy::{Taxonomy, NO_DESCRIPTION};

/// Label used when no usable prediction exists
pub const NO_CATEGORY: &str = "None";

/// Trim, collapse inner whitespace and case-fold a category name
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Default)]
struct CategorySet {
    fetched: Vec<String>,
    predicted: Vec<String>,
}

impl CategorySet {
    fn contains(&self, name: &str) -> bool {
        let needle = normalize(name);
        self.fetched
            .iter()
            .chain(self.predicted.iter())
            .any(|known| normalize(known) == needle)
    }

    fn names(&self) -> Vec<String> {
        let mut names = self.fetched.clone();
        for name in &self.predicted {
            if !self.fetched.iter().any(|f| normalize(f) == normalize(name)) {
                names.push(name.clone());
            }
        }
        names
    }
}

pub struct CategoryResolver {
    service: Arc<dyn CategorizationService>,
    taxonomy: Taxonomy,
    categories: Mutex<CategorySet>,
}

impl CategoryResolver {
    pub fn new(service: Arc<dyn CategorizationService>, taxonomy: Taxonomy) -> Self {
        Self {
            service,
            taxonomy,
            categories: Mutex::new(CategorySet::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CategorySet> {
        self.categories.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refresh the session set from the portal.
    ///
    /// Names appended by earlier predictions survive the refresh.
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let records = self.service.list_categories().await.map_err(|e| {
            warn!(error = %e, "Failed to fetch categories");
            WorkflowError::unavailable(e)
        })?;

        let mut fetched: Vec<String> = Vec::with_capacity(records.len());
        for record in records {
            let name = record.category_name.trim();
            if name.is_empty() || fetched.iter().any(|f| normalize(f) == normalize(name)) {
                continue;
            }
            fetched.push(name.to_string());
        }
        info!(count = fetched.len(), "Fetched categories");

        let mut set = self.lock();
        set.fetched = fetched;
        Ok(set.names())
    }

    /// Predict the category of `query`. Never fails: anything unusable
    /// resolves to [`NO_CATEGORY`].
    pub async fn predict(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return NO_CATEGORY.to_string();
        }

        let label = match self.service.predict_category(query).await {
            Ok(response) => response.label().map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Category prediction failed");
                None
            }
        };

        let Some(label) = label else {
            debug!("Prediction produced no usable label");
            return NO_CATEGORY.to_string();
        };

        let mut set = self.lock();
        if !set.contains(&label) {
            debug!(category = %label, "Adding predicted category to session set");
            set.predicted.push(label.clone());
        }
        info!(category = %label, "Predicted category");
        label
    }

    pub fn describe(&self, name: &str) -> Vec<String> {
        self.taxonomy.describe(name)
    }

    /// Current session set: fetched names followed by appended predictions
    pub fn categories(&self) -> Vec<String> {
        self.lock().names()
    }
}
