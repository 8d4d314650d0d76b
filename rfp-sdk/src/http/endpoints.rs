//! Endpoint path constants
//!
//! Paths are relative to the portal or model service base URL.

/// Portal: list categories
pub const LIST_CATEGORIES: &str = "/RFP/getAllCategory";

/// Portal: generated artifact, suffixed with `/{rfpid}`
pub const DOWNLOAD: &str = "/RFP/download";

/// Portal: original source spreadsheet, suffixed with `/{rfpid}`
pub const SOURCE_FILE: &str = "/RFP/getFile";

/// Portal: search documents visible to a user
pub const SEARCH: &str = "/RFP/search";

/// Portal: share a document with another user
pub const ASSIGN: &str = "/RFP/assignRFP";

/// Portal: list users
pub const USERS: &str = "/auth/users";

/// Portal: create a review record
pub const SEND_FOR_REVIEW: &str = "/RFP/sendForReview";

/// Portal: list review records
pub const LIST_REVIEWS: &str = "/RFP/getAllReviewQueries";

/// Portal: resolve a review record
pub const REVIEW_STATUS: &str = "/RFP/reviewStatus";

/// Model service: category prediction
pub const PREDICT_CATEGORY: &str = "/get_category";

/// Model service: answer generation
pub const GENERATE: &str = "/generate";

/// Model service: precedent lookup
pub const SIMILAR_QUESTIONS: &str = "/similar_questions";

/// Model service: answer enrichment
pub const ENRICH: &str = "/enrich";

/// Model service: spreadsheet upload and bulk generation
pub const UPLOAD_RFP: &str = "/upload_rfp/";

/// Spreadsheet MIME type requested for downloads
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
