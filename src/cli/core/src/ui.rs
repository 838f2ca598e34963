/* src/cli/core/src/ui.rs */

// Status output goes to stderr so stdout stays free for rendered HTML.
#![allow(clippy::print_stderr)]

pub const RESET: &str = "\x1b[0m";
pub const DIM: &str = "\x1b[2m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub fn banner(title: &str, subtitle: Option<&str>) {
  eprintln!();
  match subtitle {
    Some(sub) => eprintln!("  {BOLD}{CYAN}mirror {title}{RESET} {DIM}{sub}{RESET}"),
    None => eprintln!("  {BOLD}{CYAN}mirror {title}{RESET}"),
  }
  eprintln!();
}

pub fn step(n: usize, total: usize, msg: &str) {
  eprintln!("  {DIM}[{n}/{total}]{RESET} {msg}");
}

pub fn detail(msg: &str) {
  eprintln!("        {msg}");
}

pub fn detail_ok(msg: &str) {
  eprintln!("        {GREEN}✓{RESET} {msg}");
}

pub fn warn(msg: &str) {
  eprintln!("        {YELLOW}warning{RESET}: {msg}");
}

pub fn error(msg: &str) {
  eprintln!("  {RED}error{RESET}: {msg}");
}

pub fn blank() {
  eprintln!();
}
