use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::error::LotteryError;
use crate::instruction::LotteryInstruction;
use crate::oracle;
use crate::state::{Lottery, OracleConfig, RaffleState, MAX_PLAYERS};
use crate::utils::{find_lottery_address, LOTTERY_SEED};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::InitializeLottery {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                request_confirmations,
                callback_gas_limit,
                num_words,
            } => {
                msg!("Instruction: Initialize Lottery");
                Self::process_initialize_lottery(
                    accounts,
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    request_confirmations,
                    callback_gas_limit,
                    num_words,
                    program_id,
                )
            }
            LotteryInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(accounts, amount, program_id)
            }
            LotteryInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            LotteryInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            LotteryInstruction::FulfillRandomness {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(accounts, request_id, random_words, program_id)
            }
        }
    }

    /// Process the InitializeLottery instruction
    ///
    /// Creates the single lottery state account and freezes the round
    /// configuration. Called once per deployment.
    #[allow(clippy::too_many_arguments)]
    fn process_initialize_lottery(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: i64,
        key_hash: [u8; 32],
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if entrance_fee == 0 {
            msg!("Entrance fee must be greater than zero");
            return Err(ProgramError::InvalidArgument);
        }

        if interval < 0 {
            msg!("Interval cannot be negative");
            return Err(ProgramError::InvalidArgument);
        }

        // The lottery lives at a fixed PDA: one instance, one round at a time
        let (expected_lottery_pubkey, bump_seed) = find_lottery_address(program_id);
        if *lottery_info.key != expected_lottery_pubkey {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidArgument);
        }

        if lottery_info.owner != program_id {
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(Lottery::LEN);

            invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    lottery_info.key,
                    rent_lamports,
                    Lottery::LEN as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    lottery_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[LOTTERY_SEED, &[bump_seed]]],
            )?;
        }

        let lottery = Lottery::unpack_unchecked(&lottery_info.data.borrow())?;
        if lottery.is_initialized {
            msg!("Lottery account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let clock = Clock::get()?;

        let lottery = Lottery {
            is_initialized: true,
            state: RaffleState::Open,
            entrance_fee,
            interval,
            last_timestamp: clock.unix_timestamp,
            last_request_id: 0,
            prize_pool: 0,
            player_count: 0,
            recent_winner: Pubkey::default(),
            oracle: OracleConfig {
                authority: *oracle_authority_info.key,
                key_hash,
                subscription_id,
                request_confirmations,
                callback_gas_limit,
                num_words,
            },
            players: [Pubkey::default(); MAX_PLAYERS],
        };

        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: fee={} lamports, interval={}s, oracle={}",
            entrance_fee,
            interval,
            oracle_authority_info.key
        );
        Ok(())
    }

    /// Process the Enter instruction
    ///
    /// The player pays `amount` lamports into the prize pool and takes one
    /// slot in the round's registry. Entering twice takes two slots.
    fn process_enter(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;

        if amount < lottery.entrance_fee {
            msg!(
                "Payment of {} lamports is below the entrance fee of {}",
                amount,
                lottery.entrance_fee
            );
            return Err(LotteryError::InsufficientPayment.into());
        }

        if lottery.state != RaffleState::Open {
            msg!("Round is calculating a winner, entries are closed");
            return Err(LotteryError::RoundNotOpen.into());
        }

        lottery.push_player(*player_info.key)?;
        lottery.prize_pool = lottery
            .prize_pool
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        invoke(
            &system_instruction::transfer(player_info.key, lottery_info.key, amount),
            &[
                player_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!("Player entered: {}", player_info.key);
        Ok(())
    }

    /// Process the CheckUpkeep instruction
    ///
    /// Read-only poll for the automation collaborator: evaluates the upkeep
    /// predicate against the current clock and logs the verdict. Succeeds
    /// either way and mutates nothing, so it can be simulated repeatedly.
    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let lottery_info = next_account_info(account_info_iter)?;

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        let clock = Clock::get()?;

        msg!("Upkeep needed: {}", lottery.upkeep_needed(clock.unix_timestamp));
        Ok(())
    }

    /// Process the PerformUpkeep instruction
    ///
    /// Re-checks eligibility against the current clock (time may have moved
    /// and state may have changed since the caller polled), then moves the
    /// round to calculating and issues a randomness request. A second call
    /// while calculating fails the same eligibility check, so at most one
    /// request is ever outstanding.
    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Upkeep caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        let clock = Clock::get()?;

        if !lottery.upkeep_needed(clock.unix_timestamp) {
            msg!(
                "Upkeep not eligible: state={:?}, players={}, pool={} lamports",
                lottery.state,
                lottery.player_count,
                lottery.prize_pool
            );
            return Err(LotteryError::UpkeepNotEligible.into());
        }

        lottery.state = RaffleState::Calculating;
        lottery.last_request_id = lottery
            .last_request_id
            .checked_add(1)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        oracle::publish_request(&lottery);

        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!("Round advancing: request_id={}", lottery.last_request_id);
        Ok(())
    }

    /// Process the FulfillRandomness instruction
    ///
    /// Invoked by the oracle authority with the random words for the
    /// outstanding request. Selects the winner, resets the round, and pays
    /// out the whole prize pool.
    ///
    /// Effect order is load-bearing: the registry is cleared and the round
    /// reset to open in memory before any balance moves, and the state
    /// account is written back only after the payout succeeds. A failed
    /// payout therefore returns an error with the stored state untouched,
    /// and the runtime rolls back the whole invocation: the round stays
    /// calculating with its entries intact and the same request identifier
    /// remains fulfillable.
    fn process_fulfill_randomness(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: Vec<u64>,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;

        oracle::validate_fulfillment(&lottery, oracle_authority_info, request_id)?;

        if random_words.is_empty() {
            msg!("Fulfillment carried no random words");
            return Err(ProgramError::InvalidInstructionData);
        }

        // (1) read the winner out of the registry before it is cleared
        let index = oracle::winner_index(random_words[0], lottery.player_count);
        let winner = lottery.player(index)?;
        msg!("Winner index: {} of {}", index, lottery.player_count);

        // (2)-(5) reset the round before any lamports move
        lottery.clear_players();
        lottery.state = RaffleState::Open;
        lottery.last_timestamp = Clock::get()?.unix_timestamp;
        lottery.recent_winner = winner;

        // (6) pay the whole pool to the winner, leaving the rent reserve
        if *winner_info.key != winner {
            msg!(
                "Winner account {} does not match selected winner {}",
                winner_info.key,
                winner
            );
            return Err(LotteryError::PayoutFailed.into());
        }

        let prize = lottery.prize_pool;
        lottery.prize_pool = 0;

        let debited = lottery_info
            .lamports()
            .checked_sub(prize)
            .ok_or(LotteryError::PayoutFailed)?;
        let credited = winner_info
            .lamports()
            .checked_add(prize)
            .ok_or(LotteryError::PayoutFailed)?;
        **lottery_info.try_borrow_mut_lamports()? = debited;
        **winner_info.try_borrow_mut_lamports()? = credited;

        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!("Winner picked: {} wins {} lamports", winner, prize);
        Ok(())
    }
}
