mod fetch;
mod script;

pub use fetch::{HttpFetcher, LoadError, ResourceFetcher};
pub use script::{LoadCallback, ScriptDocument, ScriptKind, ScriptRequest};
