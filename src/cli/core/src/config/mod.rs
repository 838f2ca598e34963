/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{load_or_discover, resolve_inputs};
pub use types::{InputOverrides, ResolvedInputs};
