//! Collaborator traits consumed by the engine.

mod cache;
mod retriever;
mod suggest;

pub use cache::ResultCache;
pub use retriever::{ProductRetriever, ShopRetriever};
pub use suggest::SuggestionBackend;
