//! Terminal front-end: table rendering and one-shot commands.

pub mod market;
pub mod setup;
pub mod ui;
