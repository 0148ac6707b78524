pub mod intent;
pub mod protocol;
pub mod types;
