//! CLI support for the chatline binary.
//!
//! - Argument parsing
//! - Version and usage text
//! - Ctrl+C handling at the prompt
//!
//! ```ignore
//! use chatline::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Version => println!("{}", chatline::cli::version_line()),
//!     command => run(command).await?,
//! }
//! ```

pub mod args;
pub mod interrupt;
pub mod version;

pub use args::{parse_args, ArgsError, CliCommand, CliOptions, USAGE};
pub use interrupt::PromptInterrupt;
pub use version::{version_line, VERSION};
