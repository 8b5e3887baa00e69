pub mod collector;
pub mod interface;
pub mod network;
