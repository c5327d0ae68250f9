pub mod pretty;
pub mod retry;
pub mod shutdown;
