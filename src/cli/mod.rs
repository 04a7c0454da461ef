//! # Command-Line Interface
//!
//! The `wiki` binary: edits a wiki project through the same store and
//! coordinator an embedding application would use.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project and whole document | `init`, `status`, `export`, `import`, `validate` |
//! | Page | Page lifecycle and metadata | `page add`, `page show`, `page meta` |
//! | Nav | Navigation tree | `nav list`, `nav add`, `nav up` |
//! | Block | Page content | `block add`, `block set`, `block move` |
//! | Settings | Site settings | `settings show`, `settings set` |
//!
//! Every editing command loads the document (seeding an empty backend),
//! applies one change and flushes it before exiting.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including autosave logs:
//! ```bash
//! wiki --verbose block add faq paragraph
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod block;
mod nav;
mod output;
mod page;
mod project_cmd;
mod session;
mod settings;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
