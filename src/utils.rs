use solana_program::pubkey::Pubkey;

/// Seed of the single lottery instance account
pub const LOTTERY_SEED: &[u8] = b"lottery";

/// Find the program derived address holding the lottery state
pub fn find_lottery_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LOTTERY_SEED], program_id)
}
