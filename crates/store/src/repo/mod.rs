pub mod banner;
pub mod catalog;
pub mod favorites;
pub mod feedback;
