//! Generative backend abstraction

mod backend;

pub use backend::AnswerBackend;

#[cfg(test)]
pub use backend::mock::MockAnswerBackend;
