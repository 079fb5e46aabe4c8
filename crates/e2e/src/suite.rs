//! Built-in IMDb check catalog

use crate::error::E2eResult;
use crate::spec::CheckSpec;

/// Site under test
pub const IMDB_BASE_URL: &str = "https://www.imdb.com";

const BUILTIN_SUITE: &str = include_str!("../specs/imdb.yaml");

/// The checks shipped with the binary, in execution order
pub fn builtin_checks() -> E2eResult<Vec<CheckSpec>> {
    CheckSpec::parse_many(BUILTIN_SUITE)
}
