pub mod filter;
pub mod pipeline;
pub mod skin;
