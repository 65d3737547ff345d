pub mod catalog;
pub mod corpus;
pub mod favorites;
pub mod recommendations;
pub mod similarity;
pub mod similarity_job;
pub mod tfidf;

pub use catalog::Catalog;
pub use favorites::FavoriteService;
pub use recommendations::Recommender;
pub use similarity::SimilarityEngine;
