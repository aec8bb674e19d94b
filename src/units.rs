//! BTC/satoshi and SOL/lamport unit conversions plus fee helpers
//!
//! Pure functions shared by the deposit and withdrawal paths. Amounts on
//! the wire are integers in the smallest unit; display amounts are floats.

/// Satoshis per BTC (1 unit = 1e-8 BTC)
pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Flat service fee charged per deposit, in BTC
pub const DEPOSIT_SERVICE_FEE_BTC: f64 = 0.0001;

/// Base infrastructure fee for a withdrawal, in SOL
pub const BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL: f64 = 0.0001;

/// Convert a display BTC amount to satoshi, rounding to the nearest unit
pub fn btc_to_satoshi(btc: f64) -> u64 {
    (btc * SATOSHIS_PER_BTC as f64).round() as u64
}

/// Convert a satoshi amount to display BTC
pub fn satoshi_to_btc(satoshi: u64) -> f64 {
    satoshi as f64 / SATOSHIS_PER_BTC as f64
}

/// Convert a lamport amount to display SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a display SOL amount to lamports, rounding to the nearest unit
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Infrastructure fee (in SOL) for a withdrawal of the given BTC amount.
///
/// Tiered: below 0.1 BTC the base fee applies, below 1 BTC the base fee
/// times 20, and above that the base fee times 40.
pub fn infrastructure_fee_sol(withdraw_amount_btc: f64) -> f64 {
    if withdraw_amount_btc < 0.1 {
        BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL
    } else if withdraw_amount_btc < 1.0 {
        BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL * 20.0
    } else {
        BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL * 40.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn btc_satoshi_round_trip() {
        assert_eq!(btc_to_satoshi(1.0), 100_000_000);
        assert_eq!(btc_to_satoshi(0.00000001), 1);
        assert_eq!(btc_to_satoshi(0.1), 10_000_000);
        assert_eq!(satoshi_to_btc(150_000_000), 1.5);
    }

    #[test]
    fn btc_to_satoshi_rounds_to_nearest() {
        // 0.1 + 0.2 style float noise must not truncate a satoshi away
        assert_eq!(btc_to_satoshi(0.29999999999999993), 30_000_000);
    }

    #[test]
    fn lamport_conversions() {
        assert_eq!(sol_to_lamports(1.5), 1_500_000_000);
        assert_eq!(lamports_to_sol(250_000_000), 0.25);
    }

    #[test]
    fn infrastructure_fee_tiers() {
        assert_eq!(
            infrastructure_fee_sol(0.05),
            BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL
        );
        assert_eq!(
            infrastructure_fee_sol(0.5),
            BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL * 20.0
        );
        assert_eq!(
            infrastructure_fee_sol(2.0),
            BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL * 40.0
        );
        // boundaries belong to the higher tier
        assert_eq!(
            infrastructure_fee_sol(0.1),
            BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL * 20.0
        );
        assert_eq!(
            infrastructure_fee_sol(1.0),
            BASE_WITHDRAW_INFRASTRUCTURE_FEE_SOL * 40.0
        );
    }
}
