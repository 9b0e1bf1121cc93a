pub mod analyse;
pub mod bosses;
pub mod cache;
