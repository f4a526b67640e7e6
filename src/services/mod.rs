pub mod errors;
pub mod todos;
