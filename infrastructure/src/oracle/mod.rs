//! Oracle adapters implementing the [`OracleClient`](filing_application::OracleClient) port.

mod openai;

pub use openai::{OpenAiOracle, OracleSetupError};
