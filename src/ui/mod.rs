pub mod queue;
pub mod view;
