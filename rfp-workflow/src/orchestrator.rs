//! Drives one question through categorization, generation, editing and
//! review, and exposes the document and review actions.

use rfp_sdk::client::{CategorizationService, GenerationService, PersistenceService};
use rfp_sdk::http::RfpHttpClient;
use rfp_sdk::types::{QuestionId, ReviewDecision, RfpId, UserId, VersionNumber};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::category::{CategoryResolver, Taxonomy};
use crate::config::{UserConfig, WorkflowConfig};
use crate::documents::{
    DocumentVersionCoordinator, RfpDocument, RfpSummary, RfpVersion, SourceDocument,
    UploadMetadata, UserSummary,
};
use crate::error::{Result, WorkflowError};
use crate::events::WorkflowEvent;
use crate::generator::{GeneratedResponse, ResponseGenerator};
use crate::review::{ReviewDiff, ReviewItem, ReviewReceipt, ReviewRequest, ReviewStateMachine};
use crate::session::{Session, SessionContext, SessionState};

pub struct Workflow {
    categories: CategoryResolver,
    generator: ResponseGenerator,
    documents: DocumentVersionCoordinator,
    reviews: ReviewStateMachine,
    user: UserConfig,
    session: Mutex<Session>,
    events: Option<mpsc::UnboundedSender<WorkflowEvent>>,
}

impl Workflow {
    pub fn new(
        categorization: Arc<dyn CategorizationService>,
        generation: Arc<dyn GenerationService>,
        persistence: Arc<dyn PersistenceService>,
        taxonomy: Taxonomy,
        user: UserConfig,
    ) -> Self {
        Self {
            categories: CategoryResolver::new(categorization, taxonomy),
            generator: ResponseGenerator::new(generation),
            documents: DocumentVersionCoordinator::new(persistence.clone(), user.clone()),
            reviews: ReviewStateMachine::new(persistence),
            user,
            session: Mutex::new(Session::new()),
            events: None,
        }
    }

    /// Wire the workflow to the HTTP services named in `config`
    pub fn from_config(config: &WorkflowConfig) -> Result<Self> {
        let client = RfpHttpClient::new(&config.services.portal_url, &config.services.model_url)
            .and_then(|client| client.with_timeout(config.services.request_timeout_secs))
            .map_err(|e| {
                WorkflowError::Config(config::ConfigError::Message(format!(
                    "Invalid service configuration: {e}"
                )))
            })?;
        let client = match &config.services.auth_token {
            Some(token) => client.with_auth_token(token.as_str()),
            None => client,
        };
        let client = Arc::new(client);

        let taxonomy = match config.taxonomy_path() {
            Some(path) => Taxonomy::load(path)?,
            None => Taxonomy::builtin(),
        };

        Ok(Self::new(
            client.clone(),
            client.clone(),
            client,
            taxonomy,
            config.user.clone(),
        ))
    }

    /// Receive [`WorkflowEvent`]s from now on; replaces any earlier receiver
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WorkflowEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone means nobody is listening
            let _ = tx.send(event);
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the session and report any state change
    fn transition<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let (from, to, out) = {
            let mut session = self.session();
            let from = session.state();
            let out = f(&mut session);
            (from, session.state(), out)
        };
        if from != to {
            debug!(%from, %to, "Session state changed");
            self.emit(WorkflowEvent::StateChanged { from, to });
        }
        out
    }

    fn failed(&self, action: &'static str, err: &WorkflowError) {
        self.emit(WorkflowEvent::ActionFailed {
            action,
            message: err.user_message(),
        });
    }

    pub fn user(&self) -> &UserConfig {
        &self.user
    }

    pub fn categories(&self) -> &CategoryResolver {
        &self.categories
    }

    pub fn documents(&self) -> &DocumentVersionCoordinator {
        &self.documents
    }

    pub fn reviews(&self) -> &ReviewStateMachine {
        &self.reviews
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    pub fn context(&self) -> SessionContext {
        self.session().context().clone()
    }

    /// Abandon the current session; in-flight results for it are discarded
    pub fn new_session(&self) {
        let epoch = self.transition(|session| session.reset());
        info!(epoch, "Started new session");
    }

    pub fn set_query(&self, query: &str) -> Result<()> {
        self.transition(|session| session.set_query(query))
    }

    pub async fn load_categories(&self) -> Result<Vec<String>> {
        match self.categories.list_categories().await {
            Ok(names) => {
                self.emit(WorkflowEvent::CategoriesLoaded { count: names.len() });
                Ok(names)
            }
            Err(e) => {
                self.failed("load categories", &e);
                Err(e)
            }
        }
    }

    /// Predict and select a category for the current query
    pub async fn categorize(&self) -> Result<String> {
        let (epoch, query) = self.transition(|session| session.begin_categorize())?;

        let category = self.categories.predict(&query).await;
        let description = self.categories.describe(&category);

        let applied = self.transition(|session| {
            session.finish_categorize(epoch, category.clone(), description)
        });
        if !applied {
            self.emit(WorkflowEvent::StaleResultDiscarded {
                action: "categorize",
            });
            return Err(WorkflowError::Superseded {
                action: "categorize",
            });
        }

        self.emit(WorkflowEvent::CategoryPredicted {
            category: category.clone(),
        });
        Ok(category)
    }

    /// Select `name` and return its description lines
    pub fn select_category(&self, name: &str) -> Result<Vec<String>> {
        let description = self.categories.describe(name);
        self.transition(|session| session.select_category(name, description.clone()))?;
        Ok(description)
    }

    /// Generate a response and fetch precedents concurrently
    pub async fn generate(&self) -> Result<GeneratedResponse> {
        let pending = self.transition(|session| session.begin_generate())?;

        let (generated, similar) = tokio::join!(
            self.generator.generate(&pending.query, &pending.category),
            self.generator.fetch_similar(&pending.query),
        );

        let precedents = similar.map_err(|e| e.to_string());
        let applied = self.transition(|session| {
            session.finish_generate(
                pending.epoch,
                generated.as_ref().ok().cloned(),
                precedents.clone(),
            )
        });
        if !applied {
            self.emit(WorkflowEvent::StaleResultDiscarded { action: "generate" });
            return Err(WorkflowError::Superseded { action: "generate" });
        }

        match generated {
            Ok(response) => {
                match precedents {
                    Ok(precedents) => self.emit(WorkflowEvent::ResponseGenerated {
                        category: response.category.clone(),
                        precedents: precedents.len(),
                    }),
                    Err(message) => {
                        warn!(%message, "Generated without precedents");
                        self.emit(WorkflowEvent::ResponseGenerated {
                            category: response.category.clone(),
                            precedents: 0,
                        });
                        self.emit(WorkflowEvent::SimilarityUnavailable { message });
                    }
                }
                Ok(response)
            }
            Err(e) => {
                self.failed("generate", &e);
                Err(e)
            }
        }
    }

    pub fn edit_response(&self, text: &str) -> Result<()> {
        self.transition(|session| session.edit_response(text))
    }

    /// Standalone enrichment of an arbitrary response; the session is untouched
    pub async fn enrich(&self, query: &str, category: &str, response: &str) -> Result<String> {
        self.generator
            .enrich(query, category, response)
            .await
            .inspect_err(|e| self.failed("enrich", e))
    }

    /// Hand the current (possibly edited) response to reviewers
    pub async fn submit_for_review(&self) -> Result<ReviewReceipt> {
        let pending = self.transition(|session| session.begin_submit())?;

        let outcome = self
            .reviews
            .submit_for_review(ReviewRequest {
                question_text: pending.question_text,
                original_response: pending.original_response,
                edited_response: pending.edited_response,
                submitted_by: self.user.user_id,
            })
            .await;

        match outcome {
            Ok(receipt) => {
                let applied = self
                    .transition(|session| session.finish_submit(pending.epoch, Some(receipt.clone())));
                if !applied {
                    self.emit(WorkflowEvent::StaleResultDiscarded {
                        action: "submit for review",
                    });
                }
                self.emit(WorkflowEvent::ReviewSubmitted {
                    question_id: receipt.question_id,
                });
                Ok(receipt)
            }
            Err(e) => {
                self.transition(|session| session.finish_submit(pending.epoch, None));
                self.failed("submit for review", &e);
                Err(e)
            }
        }
    }

    /// Upload a spreadsheet and fetch the artifact of the version it created
    pub async fn upload_and_download(
        &self,
        document: SourceDocument,
        metadata: UploadMetadata,
    ) -> Result<(RfpVersion, Vec<u8>)> {
        self.emit(WorkflowEvent::UploadStarted {
            name: metadata.name.clone(),
        });
        let version = self
            .documents
            .upload(document, metadata)
            .await
            .inspect_err(|e| self.failed("upload", e))?;
        self.emit(WorkflowEvent::VersionCreated {
            rfp_id: version.rfp_id,
            version: version.version.clone(),
        });

        let bytes = self.download(version.rfp_id, Some(&version.version)).await?;
        Ok((version, bytes))
    }

    pub async fn regenerate_and_download(
        &self,
        document: &RfpDocument,
    ) -> Result<(RfpVersion, Vec<u8>)> {
        self.emit(WorkflowEvent::UploadStarted {
            name: document.name.clone(),
        });
        let version = self
            .documents
            .regenerate(document)
            .await
            .inspect_err(|e| self.failed("regenerate", e))?;
        self.emit(WorkflowEvent::VersionCreated {
            rfp_id: version.rfp_id,
            version: version.version.clone(),
        });

        let bytes = self.download(version.rfp_id, Some(&version.version)).await?;
        Ok((version, bytes))
    }

    /// Latest artifact, or the artifact of `version` when given
    pub async fn download(
        &self,
        rfp_id: RfpId,
        version: Option<&VersionNumber>,
    ) -> Result<Vec<u8>> {
        let bytes = match version {
            Some(version) => self.documents.download_version(rfp_id, version).await,
            None => self.documents.download(rfp_id).await,
        }
        .inspect_err(|e| self.failed("download", e))?;

        self.emit(WorkflowEvent::Downloaded {
            rfp_id,
            bytes: bytes.len(),
        });
        Ok(bytes)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<RfpSummary>> {
        self.documents
            .search(query)
            .await
            .inspect_err(|e| self.failed("search", e))
    }

    pub async fn assignable_users(&self) -> Result<Vec<UserSummary>> {
        self.documents
            .assignable_users()
            .await
            .inspect_err(|e| self.failed("list users", e))
    }

    pub async fn assign(&self, rfp_id: RfpId, user_id: UserId) -> Result<()> {
        self.documents
            .assign(rfp_id, user_id)
            .await
            .inspect_err(|e| self.failed("assign", e))
    }

    pub async fn refresh_reviews(&self) -> Result<Vec<ReviewItem>> {
        self.reviews
            .refresh_pending()
            .await
            .inspect_err(|e| self.failed("refresh reviews", e))
    }

    pub fn pending_reviews(&self) -> Vec<ReviewItem> {
        self.reviews.list_pending()
    }

    pub fn review_diff(&self, question_id: QuestionId) -> Option<ReviewDiff> {
        self.reviews
            .find_pending(question_id)
            .map(|item| ReviewStateMachine::render_diff(&item))
    }

    pub async fn resolve_review(
        &self,
        question_id: QuestionId,
        decision: ReviewDecision,
    ) -> Result<()> {
        match self.reviews.resolve(question_id, decision).await {
            Ok(()) => {
                self.emit(WorkflowEvent::ReviewResolved {
                    question_id,
                    decision,
                });
                Ok(())
            }
            Err(e @ WorkflowError::AlreadyResolved { .. }) => {
                self.emit(WorkflowEvent::ReviewAlreadyResolved { question_id });
                Err(e)
            }
            Err(e) => {
                self.failed("resolve review", &e);
                Err(e)
            }
        }
    }
}
