//! Tax-adjusted profit computation.
//!
//! The Black Market deducts a sales tax from the sell price: 4% with
//! premium, 8% without. Profit is what remains after the acquisition
//! cost and the tax, floored to whole silver.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const PREMIUM_TAX: Decimal = dec!(0.04);
const STANDARD_TAX: Decimal = dec!(0.08);

/// Profit under both tax regimes for the same trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profit {
    pub premium: i64,
    pub standard: i64,
}

impl Profit {
    /// Whether the trade clears a profit for a premium seller — the
    /// retention criterion for flip candidates.
    pub fn is_worthwhile(&self) -> bool {
        self.premium > 0
    }
}

/// Compute premium and standard profit for a sell price and total
/// acquisition cost.
pub fn taxed_profit(sell_price: i64, total_cost: i64) -> Profit {
    Profit {
        premium: profit_at(sell_price, total_cost, PREMIUM_TAX),
        standard: profit_at(sell_price, total_cost, STANDARD_TAX),
    }
}

fn profit_at(sell_price: i64, total_cost: i64, tax_rate: Decimal) -> i64 {
    let sell = Decimal::from(sell_price);
    let net = sell - Decimal::from(total_cost) - sell * tax_rate;
    net.floor().to_i64().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_rates_applied() {
        // sell 2000, cost 1384: prem = 2000 − 1384 − 80 = 536,
        // standard = 2000 − 1384 − 160 = 456.
        let p = taxed_profit(2000, 1384);
        assert_eq!(p.premium, 536);
        assert_eq!(p.standard, 456);
        assert!(p.is_worthwhile());
    }

    #[test]
    fn test_thin_margin_eaten_by_tax() {
        // sell 1400, cost 1384: prem = 1400 − 1384 − 56 = −40.
        let p = taxed_profit(1400, 1384);
        assert_eq!(p.premium, -40);
        assert!(!p.is_worthwhile());
    }

    #[test]
    fn test_standard_never_exceeds_premium() {
        for (sell, cost) in [(1, 1), (100, 50), (2000, 1384), (999_999, 1), (1, 999_999)] {
            let p = taxed_profit(sell, cost);
            assert!(
                p.standard <= p.premium,
                "standard {} > premium {} for sell={sell} cost={cost}",
                p.standard,
                p.premium
            );
        }
    }

    #[test]
    fn test_fractional_tax_floors() {
        // sell 25: premium tax = 1.0 exactly, standard tax = 2.0.
        let p = taxed_profit(25, 10);
        assert_eq!(p.premium, 14);
        assert_eq!(p.standard, 13);

        // sell 33: 4% = 1.32 → profit 33 − 10 − 1.32 = 21.68 → 21.
        let p = taxed_profit(33, 10);
        assert_eq!(p.premium, 21);
        // 8% = 2.64 → 20.36 → 20.
        assert_eq!(p.standard, 20);
    }

    #[test]
    fn test_negative_profit_floors_downward() {
        // 33 − 40 − 1.32 = −8.32 → floor −9 (Math.floor semantics).
        let p = taxed_profit(33, 40);
        assert_eq!(p.premium, -9);
    }

    #[test]
    fn test_zero_margin_not_worthwhile() {
        // sell 100, cost 96: prem = 100 − 96 − 4 = 0, strictly positive
        // is required.
        let p = taxed_profit(100, 96);
        assert_eq!(p.premium, 0);
        assert!(!p.is_worthwhile());
    }

    #[test]
    fn test_large_prices_do_not_overflow() {
        let p = taxed_profit(5_000_000_000, 1_000_000_000);
        assert_eq!(p.premium, 5_000_000_000 - 1_000_000_000 - 200_000_000);
    }
}
