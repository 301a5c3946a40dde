pub mod bridge;
pub mod variants;
