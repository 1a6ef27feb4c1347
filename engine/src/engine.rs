pub mod book;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod pool;
pub mod sink;
pub mod types;

pub mod prelude {
    pub use super::book::*;
    pub use super::clock::*;
    pub use super::config::*;
    pub use super::dispatch::*;
    pub use super::error::*;
    pub use super::pool::*;
    pub use super::sink::*;
    pub use super::types::*;
}
