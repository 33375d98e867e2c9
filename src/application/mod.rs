pub mod categories;
pub mod comments;
pub mod error;
pub mod knowledge;
pub mod pagination;
pub mod posts;
pub mod repos;
