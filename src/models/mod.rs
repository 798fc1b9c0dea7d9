pub mod member;
pub mod token;
