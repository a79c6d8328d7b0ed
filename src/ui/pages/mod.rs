//! Page components rendered by the server.

pub mod demo;

pub use demo::DemoPage;
