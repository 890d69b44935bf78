//! Interface boundary with the external randomness oracle.
//!
//! The oracle is a collaborator, not part of this program: a request is
//! published for it to observe, and it later submits the random words in a
//! separate `FulfillRandomness` invocation of its own. That caller is only
//! semi-trusted, so every callback is validated against the configured
//! oracle authority and the single outstanding request identifier.

use solana_program::{
    account_info::AccountInfo, msg, program_error::ProgramError,
};

use crate::error::LotteryError;
use crate::state::{Lottery, RaffleState};

/// Publish the round's randomness request in the program log for the
/// oracle to pick up. The full parameter block stays readable in the
/// lottery account.
pub fn publish_request(lottery: &Lottery) {
    msg!(
        "Randomness requested: id={}, subscription={}, confirmations={}, gas_limit={}, words={}",
        lottery.last_request_id,
        lottery.oracle.subscription_id,
        lottery.oracle.request_confirmations,
        lottery.oracle.callback_gas_limit,
        lottery.oracle.num_words,
    );
}

/// Gate an incoming fulfillment callback.
///
/// The signer must be the configured oracle authority, and the identifier
/// must match the single outstanding request. A request is outstanding only
/// while the round is calculating, which rejects stale, forged, and
/// already-settled callbacks alike.
pub fn validate_fulfillment(
    lottery: &Lottery,
    oracle_authority_info: &AccountInfo,
    request_id: u64,
) -> Result<(), ProgramError> {
    if !oracle_authority_info.is_signer {
        msg!("Oracle authority must sign the fulfillment");
        return Err(ProgramError::MissingRequiredSignature);
    }

    if *oracle_authority_info.key != lottery.oracle.authority {
        msg!("Fulfillment signed by {} instead of the oracle authority", oracle_authority_info.key);
        return Err(LotteryError::InvalidOracleAuthority.into());
    }

    if lottery.state != RaffleState::Calculating || request_id != lottery.last_request_id {
        msg!("No outstanding request matches id {}", request_id);
        return Err(LotteryError::UnknownRequest.into());
    }

    Ok(())
}

/// Map a random word onto the player registry.
///
/// Plain modulo selection; it carries a small statistical bias for very
/// large registries, which is accepted. `player_count == 0` is unreachable
/// here: a request is only ever issued for a round with at least one
/// entry, and no entries leave the registry while one is outstanding.
pub fn winner_index(random_word: u64, player_count: u32) -> u32 {
    debug_assert!(player_count > 0);
    (random_word % player_count as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_index_wraps_modulo_player_count() {
        // 4 players, random word 7 -> index 3
        assert_eq!(winner_index(7, 4), 3);
        assert_eq!(winner_index(0, 4), 0);
        assert_eq!(winner_index(4, 4), 0);
        assert_eq!(winner_index(u64::MAX, 4), 3);
    }

    #[test]
    fn winner_index_is_identity_for_single_player() {
        assert_eq!(winner_index(0, 1), 0);
        assert_eq!(winner_index(987_654_321, 1), 0);
    }
}
