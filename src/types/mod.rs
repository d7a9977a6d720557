pub mod job;
pub mod response;

pub use job::{Job, JobStatus, Notice, NoticeLevel, ResultPost};
