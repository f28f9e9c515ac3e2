//! Command handlers - one module per subcommand
//!
//! Each handler loads what it needs from the project file, calls into
//! `forja`, and renders the result.

pub mod archive;
pub mod coverage;
pub mod flags;
pub mod modules;
pub mod notice;

pub use archive::{default_output, execute_archive};
pub use coverage::{build_aggregator, execute_coverage};
pub use flags::{execute_flags, render_flags};
pub use modules::{execute_modules, render_modules};
pub use notice::{execute_notice, notice_path};
