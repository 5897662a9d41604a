//! Illustrative vendor validators built on the `HttpValidatorTemplate`
//! (spec §4.6/§6). Concrete secret regexes for every possible vendor are
//! explicitly out-of-scope collaborators; these four exist to exercise the
//! template the way format parsers exercise the extractor contract.

pub mod bitwarden;
pub mod heroku;
pub mod ibm_cloud;
pub mod nuget;
