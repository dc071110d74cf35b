//! Document sources implementing the [`DocumentSource`](filing_application::DocumentSource) port.

mod json_dir;

pub use json_dir::JsonDirectorySource;
