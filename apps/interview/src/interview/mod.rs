pub mod finalize;
pub mod flow;
pub mod handlers;
pub mod service;
pub mod timer;
pub mod view;
