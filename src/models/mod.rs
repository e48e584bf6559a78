pub mod order;
pub mod point;
