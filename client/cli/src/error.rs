use oseme_tiers::error::OsemeError;
use solana_client::client_error::ClientError;
use solana_program::pubkey::Pubkey;
use thiserror::Error;

pub type CliResult<T = ()> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Policy(#[from] OsemeError),
    #[error("RPC error: {0}")]
    Rpc(#[from] ClientError),
    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 1,
            CliError::Policy(_) => 2,
            CliError::Rpc(_) | CliError::RetriesExhausted { .. } => 3,
            CliError::AccountNotFound(_) => 4,
            CliError::Io(_) => 5,
            CliError::Json(_) => 6,
            CliError::Task(_) => 10,
        }
    }
}
