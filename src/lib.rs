pub mod classify;
pub mod engine;
pub mod entry;
pub mod export;
pub mod filter;
pub mod frequency;
pub mod io;
pub mod parser;
pub mod registry;
pub mod render;
pub mod report;

pub mod prelude {
    pub use crate::classify::{Classification, ConfigError, Level, classify};
    pub use crate::engine::Engine;
    pub use crate::entry::Entry;
    pub use crate::filter::FilterConfig;
    pub use crate::report::{Mode, Report};
}
