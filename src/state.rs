use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::{Pubkey, PUBKEY_BYTES},
};
use std::convert::TryFrom;

use crate::error::LotteryError;

/// Maximum entries a single round can hold, bounded by the account size
/// allocated at initialization.
pub const MAX_PLAYERS: usize = 100;

/// Phase of the current round
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RaffleState {
    /// Round accepts entries and may be advanced
    Open,
    /// A randomness request is outstanding; entries are rejected
    Calculating,
}

impl TryFrom<u8> for RaffleState {
    type Error = &'static str;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleState::Open),
            1 => Ok(RaffleState::Calculating),
            _ => Err("Invalid raffle state"),
        }
    }
}

impl From<RaffleState> for u8 {
    fn from(state: RaffleState) -> Self {
        match state {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }
}

/// Parameters for the external randomness oracle, frozen at initialization
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OracleConfig {
    /// The only key allowed to sign fulfillment callbacks
    pub authority: Pubkey,
    /// Identifier for the oracle's signing material
    pub key_hash: [u8; 32],
    /// Subscription handle that funds requests
    pub subscription_id: u64,
    /// Confirmation depth the oracle waits for before responding
    pub request_confirmations: u16,
    /// Ceiling on the compute spent in the fulfillment callback
    pub callback_gas_limit: u32,
    /// Number of random words requested per round
    pub num_words: u32,
}

/// Lottery account data
///
/// A single instance lives in a PDA for the lifetime of the deployment and
/// owns the full round state: configuration, the player registry, the
/// randomness request tracker, the round timer, and the most recent winner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lottery {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Phase of the current round
    pub state: RaffleState,
    /// Minimum payment required to enter, in lamports
    pub entrance_fee: u64,
    /// Round interval in seconds
    pub interval: i64,
    /// When the current round started (or last reset)
    pub last_timestamp: UnixTimestamp,
    /// Identifier of the most recently issued randomness request; zero
    /// until the first request. Outstanding only while `Calculating`; the
    /// value is kept as history after fulfillment and overwritten by the
    /// next request.
    pub last_request_id: u64,
    /// Collected balance of the current round, in lamports, excluding the
    /// account's rent reserve
    pub prize_pool: u64,
    /// Number of occupied slots in `players`
    pub player_count: u32,
    /// Winner of the most recently completed round; `Pubkey::default()`
    /// before the first round completes
    pub recent_winner: Pubkey,
    /// Randomness oracle parameters
    pub oracle: OracleConfig,
    /// Ordered registry of entries for the current round. Duplicates are
    /// allowed: each entry occupies its own slot and weighs separately in
    /// winner selection.
    pub players: [Pubkey; MAX_PLAYERS],
}

impl Lottery {
    /// Upkeep predicate for the automation collaborator: true iff the round
    /// is open, the interval has elapsed, and at least one funded entry
    /// exists. Pure, so it can be polled off-path at no cost.
    pub fn upkeep_needed(&self, now: UnixTimestamp) -> bool {
        self.state == RaffleState::Open
            && now - self.last_timestamp >= self.interval
            && self.player_count > 0
            && self.prize_pool > 0
    }

    /// Append a player to the current round's registry
    pub fn push_player(&mut self, player: Pubkey) -> Result<(), LotteryError> {
        if self.player_count as usize >= MAX_PLAYERS {
            return Err(LotteryError::PlayerCapacityReached);
        }
        self.players[self.player_count as usize] = player;
        self.player_count += 1;
        Ok(())
    }

    /// Drop all entries. Called exactly once per completed round, after the
    /// winner has been read out and before the payout.
    pub fn clear_players(&mut self) {
        self.players = [Pubkey::default(); MAX_PLAYERS];
        self.player_count = 0;
    }

    /// Player at `index` in entry order
    pub fn player(&self, index: u32) -> Result<Pubkey, LotteryError> {
        if index >= self.player_count {
            return Err(LotteryError::IndexOutOfRange);
        }
        Ok(self.players[index as usize])
    }

    /// Winner of the most recently completed round, if any round has
    /// completed yet
    pub fn recent_winner(&self) -> Option<Pubkey> {
        if self.recent_winner == Pubkey::default() {
            None
        } else {
            Some(self.recent_winner)
        }
    }
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Lottery {
    const LEN: usize = 1 + 1 + 8 + 8 + 8 + 8 + 8 + 4 + 32 + 32 + 32 + 8 + 2 + 4 + 4
        + PUBKEY_BYTES * MAX_PLAYERS;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Lottery::LEN];
        let (
            is_initialized,
            state,
            entrance_fee,
            interval,
            last_timestamp,
            last_request_id,
            prize_pool,
            player_count,
            recent_winner,
            oracle_authority,
            key_hash,
            subscription_id,
            request_confirmations,
            callback_gas_limit,
            num_words,
            players_flat,
        ) = array_refs![src, 1, 1, 8, 8, 8, 8, 8, 4, 32, 32, 32, 8, 2, 4, 4, 3200];

        let state = RaffleState::try_from(state[0])
            .map_err(|_| ProgramError::InvalidAccountData)?;

        let player_count = u32::from_le_bytes(*player_count);
        if player_count as usize > MAX_PLAYERS {
            return Err(ProgramError::InvalidAccountData);
        }

        let mut players = [Pubkey::default(); MAX_PLAYERS];
        for (i, chunk) in players_flat.chunks_exact(PUBKEY_BYTES).enumerate() {
            players[i] = Pubkey::try_from(chunk)
                .map_err(|_| ProgramError::InvalidAccountData)?;
        }

        Ok(Lottery {
            is_initialized: is_initialized[0] != 0,
            state,
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: i64::from_le_bytes(*interval),
            last_timestamp: UnixTimestamp::from_le_bytes(*last_timestamp),
            last_request_id: u64::from_le_bytes(*last_request_id),
            prize_pool: u64::from_le_bytes(*prize_pool),
            player_count,
            recent_winner: Pubkey::new_from_array(*recent_winner),
            oracle: OracleConfig {
                authority: Pubkey::new_from_array(*oracle_authority),
                key_hash: *key_hash,
                subscription_id: u64::from_le_bytes(*subscription_id),
                request_confirmations: u16::from_le_bytes(*request_confirmations),
                callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
                num_words: u32::from_le_bytes(*num_words),
            },
            players,
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Lottery::LEN];
        let (
            is_initialized_dst,
            state_dst,
            entrance_fee_dst,
            interval_dst,
            last_timestamp_dst,
            last_request_id_dst,
            prize_pool_dst,
            player_count_dst,
            recent_winner_dst,
            oracle_authority_dst,
            key_hash_dst,
            subscription_id_dst,
            request_confirmations_dst,
            callback_gas_limit_dst,
            num_words_dst,
            players_dst,
        ) = mut_array_refs![dst, 1, 1, 8, 8, 8, 8, 8, 4, 32, 32, 32, 8, 2, 4, 4, 3200];

        is_initialized_dst[0] = self.is_initialized as u8;
        state_dst[0] = self.state.into();
        *entrance_fee_dst = self.entrance_fee.to_le_bytes();
        *interval_dst = self.interval.to_le_bytes();
        *last_timestamp_dst = self.last_timestamp.to_le_bytes();
        *last_request_id_dst = self.last_request_id.to_le_bytes();
        *prize_pool_dst = self.prize_pool.to_le_bytes();
        *player_count_dst = self.player_count.to_le_bytes();
        recent_winner_dst.copy_from_slice(self.recent_winner.as_ref());
        oracle_authority_dst.copy_from_slice(self.oracle.authority.as_ref());
        key_hash_dst.copy_from_slice(&self.oracle.key_hash);
        *subscription_id_dst = self.oracle.subscription_id.to_le_bytes();
        *request_confirmations_dst = self.oracle.request_confirmations.to_le_bytes();
        *callback_gas_limit_dst = self.oracle.callback_gas_limit.to_le_bytes();
        *num_words_dst = self.oracle.num_words.to_le_bytes();
        for (i, player) in self.players.iter().enumerate() {
            players_dst[i * PUBKEY_BYTES..(i + 1) * PUBKEY_BYTES]
                .copy_from_slice(player.as_ref());
        }
    }
}
