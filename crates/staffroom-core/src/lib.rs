pub mod error;
pub mod records;
pub mod request;
pub mod role;
pub mod tag;

pub use error::{ApiError, ErrorBody, ErrorCategory, Result};
pub use records::{
    Application, ApplicationRequest, ApplicationStatus, CareerArticle, CurrentUser, Interview,
    InterviewStatus, JobDraft, JobOffer, JobPosting, JobStatus, JobSummary, LoginRequest,
    Notification, OfferStatus, ProfileUpdate, SalaryBand, SignupRequest,
};
pub use request::{HttpMethod, MultipartField, RequestBody, RequestSpec};
pub use role::Role;
pub use tag::{invalidation_matches, Tag, TagKind, TagSelector};
