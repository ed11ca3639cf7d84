//! `sigma-recruitment`: the public application form and the recruiter's
//! review queue.

pub mod api;
pub mod error;
pub mod form;
pub mod model;
pub mod queue;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::RecruitmentApi;
pub use error::{ReviewError, SubmitError};
pub use form::{FormErrors, RecruitmentField, RecruitmentForm};
pub use model::{Profession, Recruitment, RecruitmentEnvelope, RecruitmentRequest};
pub use queue::{QueueSnapshot, ReviewQueue};
