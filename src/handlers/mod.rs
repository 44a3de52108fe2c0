pub mod health;
pub mod matching;
pub mod skills;

pub use health::{health_handler, ready_handler};
pub use matching::match_handler;
pub use skills::{definition_handler, index_handler};
