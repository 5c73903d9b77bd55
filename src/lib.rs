#![warn(clippy::all)]
pub mod config;
pub mod crypt;
pub mod model;

use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

#[derive(Error, Debug)]
pub enum OldentideError {
    #[error("key length needs to be greater than zero")]
    InvalidKeyLength,

    #[error("salt needs to be at least {0} bytes long")]
    SaltTooShort(usize),

    #[error("account {0} not found")]
    AccountNotFound(String),
}
