pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod graph;
pub mod output;
pub mod rehearse;
pub mod reply;
pub mod runtime;
