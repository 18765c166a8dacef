pub mod balloon;
pub mod canvas;
pub mod composite;
pub mod page;
pub mod panel;
pub mod pipeline;
