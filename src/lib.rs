pub mod config;
pub mod core;
pub mod io;
pub mod net;
pub mod print;
pub mod thread;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ExtConfig;

pub use print::{PrintLevel, Printer};
pub use utils::error::{ExtError, Result};
