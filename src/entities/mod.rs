pub mod aspect;
pub mod grid;
pub mod member;
pub mod rate_limit;
