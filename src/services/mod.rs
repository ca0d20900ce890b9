pub mod aggregation;
pub mod integrity;
pub mod validation;
