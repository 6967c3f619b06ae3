//! Acquisition strategy evaluation.
//!
//! For one (tier, base item, quality, target enchant) cell, pick the
//! cheapest way to end up holding the item at the target level:
//!
//! - Direct Flip — buy it already at the target level.
//! - Incremental Enchant — buy one level below, apply one material step.
//! - Full Enchant — buy the base item, apply all three steps (target 3).
//!
//! Strategies are compared in that fixed order and a later strategy
//! replaces the best only when strictly cheaper, so an exact cost tie
//! keeps the earlier one. Callers depend on that tie-break being
//! stable across runs.

use crate::types::{MaterialKind, MaterialPrices, Strategy, UpgradeMaterial, MAX_ENCHANT};

/// The selected cheapest acquisition for one target level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub strategy: Strategy,
    /// Enchant level of the item actually bought.
    pub start_level: u8,
    pub start_price: i64,
    pub upgrade_cost: i64,
    pub materials: Vec<UpgradeMaterial>,
}

impl Acquisition {
    pub fn total_cost(&self) -> i64 {
        self.start_price + self.upgrade_cost
    }
}

/// Evaluate all valid strategies for `target` and return the cheapest.
///
/// `buy_prices[level]` is the buy-side price of the item at that
/// enchant level in the scan city, `None` when unquoted. A strategy
/// whose precursor price or required material is unavailable is simply
/// not valid. Returns `None` when no strategy is valid.
pub fn best_acquisition(
    target: u8,
    buy_prices: &[Option<i64>; 4],
    mats: &MaterialPrices,
    mat_count: u32,
) -> Option<Acquisition> {
    debug_assert!(target <= MAX_ENCHANT);
    let mut best: Option<Acquisition> = None;

    // Direct Flip
    if let Some(price) = buy_prices[target as usize] {
        best = Some(Acquisition {
            strategy: Strategy::DirectFlip,
            start_level: target,
            start_price: price,
            upgrade_cost: 0,
            materials: Vec::new(),
        });
    }

    // Incremental Enchant: previous level + one material step.
    if target > 0 {
        let prev = target - 1;
        if let (Some(prev_price), Some(kind)) =
            (buy_prices[prev as usize], MaterialKind::for_target(target))
        {
            if let Some(unit) = mats.get(kind) {
                let upgrade_cost = unit * i64::from(mat_count);
                let candidate = Acquisition {
                    strategy: Strategy::Enchant { from: prev, to: target },
                    start_level: prev,
                    start_price: prev_price,
                    upgrade_cost,
                    materials: vec![UpgradeMaterial {
                        name: kind,
                        count: mat_count,
                        price: unit,
                    }],
                };
                replace_if_cheaper(&mut best, candidate);
            }
        }
    }

    // Full Enchant: base item + all three steps, target 3 only.
    if target == MAX_ENCHANT {
        if let (Some(base_price), Some(rune), Some(soul), Some(relic)) =
            (buy_prices[0], mats.rune, mats.soul, mats.relic)
        {
            let count = i64::from(mat_count);
            let upgrade_cost = (rune + soul + relic) * count;
            let candidate = Acquisition {
                strategy: Strategy::FullEnchant,
                start_level: 0,
                start_price: base_price,
                upgrade_cost,
                materials: MaterialKind::ALL
                    .iter()
                    .map(|&kind| UpgradeMaterial {
                        name: kind,
                        count: mat_count,
                        price: mats.get(kind).unwrap_or(0),
                    })
                    .collect(),
            };
            replace_if_cheaper(&mut best, candidate);
        }
    }

    best
}

/// Strict-less-than replacement: ties keep the incumbent.
fn replace_if_cheaper(best: &mut Option<Acquisition>, candidate: Acquisition) {
    let cheaper = best
        .as_ref()
        .map_or(true, |b| candidate.total_cost() < b.total_cost());
    if cheaper {
        *best = Some(candidate);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
