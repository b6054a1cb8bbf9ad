pub mod model;
pub mod ranker;
