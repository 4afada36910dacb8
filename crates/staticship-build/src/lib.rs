//! Fetch & build phase, artifact enumeration, and archive packaging.
//!
//! # Fetch & build
//!
//! ```text
//! FetchBuild::run
//!   1. Clean   ── purge everything under the scratch root
//!   2. Clone   ── git clone <git_base_url>/<repo>.git
//!   3. Install ── npm install          (NPM_CONFIG_CACHE=<scratch>/.npm)
//!   4. Build   ── npm run build        (+ NEXT_PUBLIC_API_URL=<api url>)
//! ```
//!
//! Steps run strictly in order and the first failure aborts the run. The
//! package manager cache location and the API URL are passed to each child
//! process explicitly; the process environment is never modified.
//!
//! # Publishing inputs
//!
//! - [`artifact::list_files`] enumerates the static export for per-file sync
//! - [`archive::create_archive`] zips it for platform deployment

pub mod archive;
pub mod artifact;
pub mod pipeline;
pub mod runner;

pub use archive::{ArchiveError, ArchiveSummary, create_archive};
pub use artifact::{ArtifactError, ArtifactFile, list_files};
pub use pipeline::{BuildError, BuildOutput, BuildStep, FetchBuild, StepReport};
pub use runner::{CommandError, CommandOutput, CommandRunner, CommandSpec, RealRunner};
