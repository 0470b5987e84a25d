pub mod input;
pub mod parse;
pub mod project;
