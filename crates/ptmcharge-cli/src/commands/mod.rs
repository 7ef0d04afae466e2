pub mod compare;
pub mod compute;
pub mod generate;
pub mod validate;
