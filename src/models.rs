pub mod favorites;
pub mod quotes;
