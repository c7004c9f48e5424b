pub mod comments;
pub mod models;
pub mod posts;
