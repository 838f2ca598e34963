/* src/server/engine/rust/src/error.rs */

use std::path::PathBuf;

use thiserror::Error;

/// Fatal render failures. Slot drift is never an error; it is reported as a
/// warning in the `PatchReport`.
#[derive(Debug, Error)]
pub enum MirrorError {
  #[error("missing snapshot {}. Run: npm run clone:live", .0.display())]
  MissingSnapshot(PathBuf),

  #[error("missing injection file {}", .0.display())]
  MissingInjection(PathBuf),

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

/// Media manifest failures other than a missing file or unparsable JSON,
/// which both degrade to an empty map.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to stat manifest {}: {source}", path.display())]
  Metadata {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read manifest {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
