pub mod composite;
pub mod compositor;
pub mod export;
pub mod text;
