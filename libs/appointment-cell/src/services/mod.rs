pub mod authz;
pub mod booking;
pub mod lifecycle;
pub mod locks;
pub mod metrics;
