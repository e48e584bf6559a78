pub mod placement;
pub mod pricing;
