//! dephash CLI entry point
//!
//! Parses arguments, runs the selected command and turns failures into a
//! readable report on stderr. Exit status is 0 on success and 1 on any
//! failure, argument errors included.

use clap::Parser;
use dephash::cli;
use dephash::core::user_friendly_error;

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here too
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute().await {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
