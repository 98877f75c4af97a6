//! Issuance Ledger Shared Primitives
//!
//! Common types used by the issuance pallet and by whatever provides its
//! price feeds.

#![cfg_attr(not(feature = "std"), no_std)]

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

// ============================================================================
// Common ID Types
// ============================================================================

/// Position identifier
pub type PositionId = u64;

/// Price feed identifier (one per quoted pair, plus one per liveness guard)
pub type FeedId = u32;

/// Round identifier reported by a price feed
pub type RoundId = u128;

// ============================================================================
// Fixed-point Constants
// ============================================================================

/// Decimals of the common accounting unit and of the claim token
pub const ACCOUNTING_DECIMALS: u32 = 18;

/// One whole accounting unit (1e18)
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// How long a liveness guard must have reported "up" before prices are trusted (1 hour)
pub const GRACE_PERIOD_SECS: u64 = 3_600;

// ============================================================================
// Assets
// ============================================================================

/// An asset the ledger can hold in custody.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Encode,
    Decode,
    DecodeWithMemTracking,
    TypeInfo,
    MaxEncodedLen,
)]
pub enum AssetKind<AssetId> {
    /// The chain's native currency
    Native,
    /// An asset registered with the fungibles (assets) pallet
    Registered(AssetId),
}

impl<AssetId> AssetKind<AssetId> {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetKind::Native)
    }
}

/// Oracle binding of an accepted asset.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Encode,
    Decode,
    DecodeWithMemTracking,
    TypeInfo,
    MaxEncodedLen,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct OracleBinding {
    /// Feed quoting the asset in USD. `None` means the binding is unset.
    pub feed: Option<FeedId>,
    /// Maximum accepted quote age in seconds, 0 disables the check
    pub staleness_threshold: u64,
    /// Optional upstream liveness guard (answer 0 = up, positive = down)
    pub liveness_guard: Option<FeedId>,
}

impl OracleBinding {
    pub fn new(feed: FeedId) -> Self {
        Self { feed: Some(feed), staleness_threshold: 0, liveness_guard: None }
    }

    pub fn with_staleness(mut self, threshold_secs: u64) -> Self {
        self.staleness_threshold = threshold_secs;
        self
    }

    pub fn with_liveness_guard(mut self, guard: FeedId) -> Self {
        self.liveness_guard = Some(guard);
        self
    }
}

// ============================================================================
// Price Feeds
// ============================================================================

/// Latest round reported by a round-based price feed.
///
/// Timestamps are unix seconds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Encode, Decode, TypeInfo, MaxEncodedLen)]
pub struct RoundData {
    pub round_id: RoundId,
    /// Quoted value scaled by the feed's decimals; may be zero or negative on a broken feed
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: RoundId,
}

/// Source of round-based price quotes.
pub trait RoundFeeds {
    /// Latest round of `feed`, `None` if the feed is unknown
    fn latest_round_data(feed: FeedId) -> Option<RoundData>;

    /// Number of decimals in the feed's answers
    fn decimals(feed: FeedId) -> Option<u8>;
}

/// No feeds at all; every lookup fails.
impl RoundFeeds for () {
    fn latest_round_data(_feed: FeedId) -> Option<RoundData> {
        None
    }

    fn decimals(_feed: FeedId) -> Option<u8> {
        None
    }
}
