pub mod cards;
pub mod classifier;
pub mod collection;
pub mod normalizer;
pub mod providers;
pub mod resolver;
pub mod videos;
