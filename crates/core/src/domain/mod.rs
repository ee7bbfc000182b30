pub mod recommendation;
pub mod service;
pub mod user;
