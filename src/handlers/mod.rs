pub mod client;
pub mod dashboard;
pub mod employee;
pub mod expense;
pub mod general;
pub mod income;
