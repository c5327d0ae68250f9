pub mod handle;
pub mod responses;
pub mod tracking;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
