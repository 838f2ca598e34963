/* src/server/injector/rust/src/log.rs */

/// Prefix carried by every slot warning line.
pub const SLOT_PREFIX: &str = "[mirror slots]";

/// Collects non-fatal slot warnings for one render call.
///
/// Each warning is emitted through `tracing` as it happens and kept as a
/// formatted line so callers can surface or assert on it afterwards.
#[derive(Debug, Default, Clone)]
pub struct SlotLog {
  warnings: Vec<String>,
}

impl SlotLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn warn(&mut self, slot: &str, message: impl AsRef<str>) {
    let message = message.as_ref();
    tracing::warn!(slot, "{message}");
    self.warnings.push(format!("{SLOT_PREFIX} {slot}: {message}"));
  }

  pub fn warnings(&self) -> &[String] {
    &self.warnings
  }

  pub fn into_warnings(self) -> Vec<String> {
    self.warnings
  }

  pub fn is_empty(&self) -> bool {
    self.warnings.is_empty()
  }

  pub fn len(&self) -> usize {
    self.warnings.len()
  }
}
