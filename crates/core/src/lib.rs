pub mod entity;
pub mod error;
pub mod forms;
pub mod validate;
