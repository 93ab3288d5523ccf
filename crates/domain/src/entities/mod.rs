pub mod job_application;

pub use job_application::{ApplicationStatus, JobApplication, PostStatus};
