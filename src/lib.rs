//! Single-file branch extraction for the git-recycle-bin pattern
//!
//! Binary assets are kept out of source repositories and consumed as
//! submodules pinned to tiny branches. This crate produces those branches:
//! given one tracked file, it creates `subset/<UTC timestamp>/<stem>`, an
//! orphan branch with exactly one commit whose tree contains only that file.
//!
//! Pushing the branch and adding the submodule are left to the caller.
//!
//! # Known limitation
//!
//! Consumers usually add the branch with `git submodule add --depth 1 -b
//! <branch>`. Some Git hosts do not honour shallow fetches of orphan branches
//! the way a normal branch is fetched; when that happens the submodule still
//! resolves to the pinned commit, but the fetch may transfer more than one
//! commit's worth of objects or need a full fetch of the branch.

mod config;
mod extract;
pub mod git;
mod naming;
mod report;
mod target;

#[cfg(test)]
mod test_support;

pub use config::{CheckoutPolicy, ConfigError, ExtractMode, ExtractOptions, PREFIX_CONFIG_KEY};
pub use extract::{ExtractError, Extractor, Step};
pub use naming::{DEFAULT_PREFIX, NamingError, SubsetBranch, TIMESTAMP_FORMAT};
pub use report::Extraction;
pub use target::{TargetError, TargetPath};
