//! Shared types for the FLIPSCOUT scanner.
//!
//! These types form the data model used across all modules: item
//! identifiers, upstream price quotes, enchanting materials, and the
//! flip candidates returned to the dashboard. Wire types keep the
//! camelCase field names the dashboard expects.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Tiers the scanner covers.
pub const TIERS: [u8; 5] = [4, 5, 6, 7, 8];

/// Quality levels 1 (Normal) through 5 (Masterpiece).
pub const QUALITIES: [u8; 5] = [1, 2, 3, 4, 5];

/// Maximum enchantment level reachable with runes/souls/relics.
pub const MAX_ENCHANT: u8 = 3;

/// The sell-side venue every flip is realised at.
pub const BLACK_MARKET: &str = "Black Market";

/// Display name for a quality level.
pub fn quality_name(quality: u8) -> &'static str {
    match quality {
        1 => "Normal",
        2 => "Good",
        3 => "Outstanding",
        4 => "Excellent",
        5 => "Masterpiece",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Item identifiers
// ---------------------------------------------------------------------------

/// An item identity: tier, base item code, enchantment level.
///
/// String form is the upstream unique name: `T{tier}_{base}` with an
/// `@{n}` suffix for enchantment 1–3 and no suffix at 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId {
    pub tier: u8,
    pub base: String,
    pub enchant: u8,
}

impl ItemId {
    pub fn new(tier: u8, base: &str, enchant: u8) -> Self {
        Self {
            tier,
            base: base.to_string(),
            enchant,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enchant == 0 {
            write!(f, "T{}_{}", self.tier, self.base)
        } else {
            write!(f, "T{}_{}@{}", self.tier, self.base, self.enchant)
        }
    }
}

impl std::str::FromStr for ItemId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, enchant) = match s.split_once('@') {
            Some((body, tag)) => (body, tag.parse::<u8>().map_err(|_| {
                anyhow!("Invalid enchant suffix in item id: {s}")
            })?),
            None => (s, 0),
        };
        let rest = body
            .strip_prefix('T')
            .ok_or_else(|| anyhow!("Item id missing tier prefix: {s}"))?;
        let (tier_str, base) = rest
            .split_once('_')
            .ok_or_else(|| anyhow!("Item id missing base code: {s}"))?;
        let tier = tier_str
            .parse::<u8>()
            .map_err(|_| anyhow!("Invalid tier in item id: {s}"))?;
        if base.is_empty() {
            return Err(anyhow!("Item id missing base code: {s}"));
        }
        Ok(ItemId::new(tier, base, enchant))
    }
}

/// Enchantment level encoded in an item id string.
///
/// Ids without a readable `@n` suffix count as level 0 — the upstream
/// encodes base items with no suffix at all.
pub fn enchant_level(item_id: &str) -> u8 {
    item_id
        .split_once('@')
        .and_then(|(_, tag)| tag.parse::<u8>().ok())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Price quotes
// ---------------------------------------------------------------------------

/// One price observation from the upstream market data service.
///
/// Order-book naming is inverted relative to the trader's view:
/// `sell_price_min` is the cheapest standing sell order (what buying
/// the item costs), `buy_price_max` is the best standing buy order
/// (what an instant sale realises). Zero means no observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub item_id: String,
    pub city: String,
    pub quality: u8,
    #[serde(default)]
    pub sell_price_min: i64,
    #[serde(default)]
    pub buy_price_max: i64,
}

// ---------------------------------------------------------------------------
// Enchanting materials
// ---------------------------------------------------------------------------

/// The three consumable material kinds, one per enchantment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    Rune,
    Soul,
    Relic,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 3] =
        [MaterialKind::Rune, MaterialKind::Soul, MaterialKind::Relic];

    /// The material consumed by the enchant step that ends at `target`.
    pub fn for_target(target: u8) -> Option<MaterialKind> {
        match target {
            1 => Some(MaterialKind::Rune),
            2 => Some(MaterialKind::Soul),
            3 => Some(MaterialKind::Relic),
            _ => None,
        }
    }

    /// Upstream item id of this material at the given tier.
    pub fn item_id(&self, tier: u8) -> String {
        match self {
            MaterialKind::Rune => format!("T{tier}_RUNE"),
            MaterialKind::Soul => format!("T{tier}_SOUL"),
            MaterialKind::Relic => format!("T{tier}_RELIC"),
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialKind::Rune => write!(f, "Rune"),
            MaterialKind::Soul => write!(f, "Soul"),
            MaterialKind::Relic => write!(f, "Relic"),
        }
    }
}

/// Cheapest observed unit price per material kind for one tier.
///
/// A missing observation is `None`, never a sentinel price, so it can
/// never leak into cost arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialPrices {
    pub rune: Option<i64>,
    pub soul: Option<i64>,
    pub relic: Option<i64>,
}

impl MaterialPrices {
    /// All kinds unobserved (used when a whole tier fetch fails).
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MaterialKind) -> Option<i64> {
        match kind {
            MaterialKind::Rune => self.rune,
            MaterialKind::Soul => self.soul,
            MaterialKind::Relic => self.relic,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// An acquisition path for reaching a target enchantment level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Buy the item already at the target level.
    DirectFlip,
    /// Buy one level below and apply a single material step.
    Enchant { from: u8, to: u8 },
    /// Buy the base item and apply all three steps at once (target 3).
    FullEnchant,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DirectFlip => write!(f, "Direct Flip"),
            Strategy::Enchant { from, to } => write!(f, "Enchant .{from} -> .{to}"),
            Strategy::FullEnchant => write!(f, "Enchant .0 -> .3"),
        }
    }
}

impl Serialize for Strategy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Flip candidates
// ---------------------------------------------------------------------------

/// One line of the itemised upgrade cost breakdown.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpgradeMaterial {
    pub name: MaterialKind,
    pub count: u32,
    /// Unit price at fetch time.
    pub price: i64,
}

/// A profitable flip found by a scan. Immutable snapshot — verification
/// produces a fresh value rather than mutating this one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipCandidate {
    pub item_start: String,
    pub item_end: String,
    pub tier: u8,
    pub quality: u8,
    pub quality_name: &'static str,
    pub strategy: Strategy,
    pub start_price: i64,
    pub upgrade_cost: i64,
    pub upgrade_details: Vec<UpgradeMaterial>,
    pub sell_price: i64,
    pub profit_prem: i64,
    pub profit_non_prem: i64,
    /// Material units per enchant step for this category; the dashboard
    /// echoes it back on verification.
    pub mat_count: u32,
}

// ---------------------------------------------------------------------------
// Verification wire types
// ---------------------------------------------------------------------------

/// One previously returned candidate submitted for re-verification.
///
/// Only the identity fields are interpreted; anything else the client
/// sends rides along in `extra` and is echoed back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyItem {
    pub start_id: String,
    pub end_id: String,
    pub tier: u8,
    pub quality: u8,
    pub mat_count: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A verify item that survived re-verification, with price-dependent
/// fields refreshed and all other metadata preserved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedItem {
    #[serde(flatten)]
    pub item: VerifyItem,
    pub start_price: i64,
    pub sell_price: i64,
    pub upgrade_cost: i64,
    pub profit_prem: i64,
    pub profit_non_prem: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
