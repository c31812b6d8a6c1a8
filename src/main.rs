//! tcxlog main entrypoint.

use tcxlog::run;
use tcxlog::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
