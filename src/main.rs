//! Zukunftstag main entrypoint.

use zukunftstag::run;
use zukunftstag::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        if e.is_integrity_breach() {
            error("Session integrity breach: run `zukunftstag db --check`");
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
