use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::utils::find_lottery_address;

/// Instructions supported by the lottery program
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Create the lottery instance and freeze its round configuration.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Funding account paying rent for the state account
    /// 1. `[writable]` The lottery state account (PDA, seeds: ["lottery"])
    /// 2. `[]` The oracle authority allowed to fulfill randomness requests
    /// 3. `[]` The system program
    InitializeLottery {
        /// Minimum payment required to enter, in lamports
        entrance_fee: u64,
        /// Round interval in seconds
        interval: i64,
        /// Identifier for the oracle's signing material
        key_hash: [u8; 32],
        /// Oracle subscription handle that funds requests
        subscription_id: u64,
        /// Confirmation depth the oracle waits for before responding
        request_confirmations: u16,
        /// Ceiling on the compute spent in the fulfillment callback
        callback_gas_limit: u32,
        /// Number of random words requested per round
        num_words: u32,
    },

    /// Enter the current round by paying at least the entrance fee.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The entering player (pays `amount`)
    /// 1. `[writable]` The lottery state account
    /// 2. `[]` The system program
    Enter {
        /// Payment in lamports; must be at least the entrance fee
        amount: u64,
    },

    /// Read-only upkeep poll: logs whether the round is eligible to
    /// advance and changes nothing. Meant to be simulated off-path by the
    /// automation collaborator at no cost.
    ///
    /// Accounts expected:
    /// 0. `[]` The lottery state account
    CheckUpkeep,

    /// Advance the round: re-verify eligibility, move to calculating, and
    /// issue a randomness request to the oracle.
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any caller (upkeep is permissionless)
    /// 1. `[writable]` The lottery state account
    PerformUpkeep,

    /// Oracle callback delivering the random words for an outstanding
    /// request. Selects the winner, resets the round, and pays out the
    /// collected balance.
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority
    /// 1. `[writable]` The lottery state account
    /// 2. `[writable]` The winner account selected by the random value
    FulfillRandomness {
        /// Identifier of the request being fulfilled
        request_id: u64,
        /// Random words produced by the oracle; the first selects the winner
        random_words: Vec<u64>,
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|_| ProgramError::InvalidInstructionData)
    }
}

/// Create an initialize_lottery instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize_lottery(
    program_id: &Pubkey,
    payer: &Pubkey,
    oracle_authority: &Pubkey,
    entrance_fee: u64,
    interval: i64,
    key_hash: [u8; 32],
    subscription_id: u64,
    request_confirmations: u16,
    callback_gas_limit: u32,
    num_words: u32,
) -> Result<Instruction, ProgramError> {
    let (lottery_address, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::InitializeLottery {
        entrance_fee,
        interval,
        key_hash,
        subscription_id,
        request_confirmations,
        callback_gas_limit,
        num_words,
    }
    .pack()?;

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(lottery_address, false),
        AccountMeta::new_readonly(*oracle_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create an enter instruction
pub fn enter(
    program_id: &Pubkey,
    player: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let (lottery_address, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::Enter { amount }.pack()?;

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(lottery_address, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey) -> Result<Instruction, ProgramError> {
    let (lottery_address, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::CheckUpkeep.pack()?;

    let accounts = vec![AccountMeta::new_readonly(lottery_address, false)];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (lottery_address, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::PerformUpkeep.pack()?;

    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(lottery_address, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a fulfill_randomness instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Result<Instruction, ProgramError> {
    let (lottery_address, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::FulfillRandomness {
        request_id,
        random_words,
    }
    .pack()?;

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(lottery_address, false),
        AccountMeta::new(*winner, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}
