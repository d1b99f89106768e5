#[path = "gateway/submission.rs"]
mod submission;
