mod store;
mod types;

pub use store::QuestionStore;
pub use types::*;
