pub mod catalog;
pub mod library;
