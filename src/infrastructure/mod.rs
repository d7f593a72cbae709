//! Infrastructure layer - Storage, service and observability implementations

pub mod logging;
pub mod observability;
pub mod storage;
pub mod subscription;
