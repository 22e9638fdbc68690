pub mod booth;
pub mod recompose;
