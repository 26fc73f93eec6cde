pub mod app;
pub mod apps;
pub mod batch;
pub mod config;
pub mod engine;
pub mod explain;
pub mod labels;
pub mod monitor;
pub mod notify;
pub mod shared;
pub mod storage;
pub mod validate;
