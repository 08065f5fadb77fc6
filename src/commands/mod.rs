pub mod purchases;
pub mod settings;
