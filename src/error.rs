use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Errors that may be returned by the lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum LotteryError {
    /// Entry payment is below the entrance fee
    #[error("Entry payment is below the entrance fee")]
    InsufficientPayment,

    /// Round is not open for entries
    #[error("Round is not open")]
    RoundNotOpen,

    /// Upkeep conditions are not met
    #[error("Upkeep is not eligible to run")]
    UpkeepNotEligible,

    /// Fulfillment does not match the outstanding randomness request
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Prize transfer to the winner failed
    #[error("Prize payout failed")]
    PayoutFailed,

    /// Player index is out of range
    #[error("Player index out of range")]
    IndexOutOfRange,

    /// Player registry for the current round is full
    #[error("Player registry is full")]
    PlayerCapacityReached,

    /// Fulfillment signer is not the configured oracle authority
    #[error("Fulfillment signer is not the oracle authority")]
    InvalidOracleAuthority,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
