pub mod engine;
pub mod hierarchy;
pub mod noc;
pub mod sim;
