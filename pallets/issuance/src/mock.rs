//! Test runtime for the issuance pallet.

use crate as pallet_issuance;
use core::cell::RefCell;
use frame_support::{
    derive_impl, parameter_types,
    traits::{AsEnsureOriginWithArg, ConstU128, ConstU32, ConstU64, ConstU8},
};
use frame_system::{EnsureRoot, EnsureSigned};
use issuance_primitives::{AssetKind, FeedId, OracleBinding, RoundData, RoundFeeds, ONE};
use sp_runtime::BuildStorage;
use std::collections::BTreeMap;

type Block = frame_system::mocking::MockBlock<Test>;

pub type AccountId = u64;
pub type Balance = u128;
pub type AssetId = u32;

frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Balances: pallet_balances,
        Assets: pallet_assets,
        Timestamp: pallet_timestamp,
        Issuance: pallet_issuance,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type Block = Block;
    type AccountData = pallet_balances::AccountData<Balance>;
}

impl pallet_balances::Config for Test {
    type MaxLocks = ConstU32<50>;
    type MaxReserves = ConstU32<50>;
    type ReserveIdentifier = [u8; 8];
    type Balance = Balance;
    type RuntimeEvent = RuntimeEvent;
    type DustRemoval = ();
    type ExistentialDeposit = ConstU128<1>;
    type AccountStore = System;
    type WeightInfo = ();
    type FreezeIdentifier = ();
    type MaxFreezes = ConstU32<0>;
    type RuntimeHoldReason = ();
    type RuntimeFreezeReason = ();
    type DoneSlashHandler = ();
}

impl pallet_assets::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Balance = Balance;
    type AssetId = AssetId;
    type AssetIdParameter = codec::Compact<AssetId>;
    type Currency = Balances;
    type CreateOrigin = AsEnsureOriginWithArg<EnsureSigned<AccountId>>;
    type ForceOrigin = EnsureRoot<AccountId>;
    type AssetDeposit = ConstU128<1>;
    type AssetAccountDeposit = ConstU128<1>;
    type MetadataDepositBase = ConstU128<1>;
    type MetadataDepositPerByte = ConstU128<1>;
    type ApprovalDeposit = ConstU128<1>;
    type StringLimit = ConstU32<50>;
    type Freezer = ();
    type Extra = ();
    type WeightInfo = ();
    type Holder = ();
    type CallbackHandle = ();
    type RemoveItemsLimit = ConstU32<1000>;
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper = ();
}

impl pallet_timestamp::Config for Test {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<1>;
    type WeightInfo = ();
}

parameter_types! {
    pub const ClaimAssetId: AssetId = CLAIM;
}

impl pallet_issuance::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Balance = Balance;
    type AssetId = AssetId;
    type Currency = Balances;
    type Assets = Assets;
    type ClaimAssetId = ClaimAssetId;
    type NativeDecimals = ConstU8<18>;
    type Feeds = MockFeeds;
    type InitOrigin = EnsureRoot<AccountId>;
    type MaxAcceptedAssets = ConstU32<4>;
    type WeightInfo = ();
}

// =============================================================================
//                                Price Feeds
// =============================================================================

thread_local! {
    static FEEDS: RefCell<BTreeMap<FeedId, (u8, RoundData)>> = RefCell::new(BTreeMap::new());
}

/// Round feeds backed by a thread-local table.
pub struct MockFeeds;

impl RoundFeeds for MockFeeds {
    fn latest_round_data(feed: FeedId) -> Option<RoundData> {
        FEEDS.with(|f| f.borrow().get(&feed).map(|(_, round)| *round))
    }

    fn decimals(feed: FeedId) -> Option<u8> {
        FEEDS.with(|f| f.borrow().get(&feed).map(|(decimals, _)| *decimals))
    }
}

pub fn clear_feeds() {
    FEEDS.with(|f| f.borrow_mut().clear());
}

pub fn set_feed(feed: FeedId, decimals: u8, round: RoundData) {
    FEEDS.with(|f| f.borrow_mut().insert(feed, (decimals, round)));
}

/// Publish a fresh complete round at `now` with an 8-decimal `price`.
pub fn set_price(feed: FeedId, price: i128) {
    let now = now_secs();
    set_feed(
        feed,
        8,
        RoundData { round_id: 1, answer: price, started_at: now, updated_at: now, answered_in_round: 1 },
    );
}

/// Liveness guard reporting `status` (0 = up) since `since`.
pub fn set_guard(feed: FeedId, status: i128, since: u64) {
    set_feed(
        feed,
        0,
        RoundData { round_id: 1, answer: status, started_at: since, updated_at: since, answered_in_round: 1 },
    );
}

// =============================================================================
//                                 Fixtures
// =============================================================================

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const TREASURY: AccountId = 99;

pub const CLAIM: AssetId = 0;
pub const USDC: AssetId = 1;
pub const WBTC: AssetId = 2;
/// Registered with the assets pallet but never accepted by the ledger
pub const JUNK: AssetId = 3;
/// Accepted asset whose minimum balance is well above one unit
pub const EURC: AssetId = 4;

pub const ETH_FEED: FeedId = 10;
pub const USDC_FEED: FeedId = 11;
pub const WBTC_FEED: FeedId = 12;
pub const GUARD_FEED: FeedId = 20;

pub const USDC_UNIT: u128 = 1_000_000;
pub const WBTC_UNIT: u128 = 100_000_000;
pub const EURC_MIN: u128 = 10_000;

/// 8-decimal feed scale
pub const PRICE_UNIT: i128 = 100_000_000;

pub const START_SECS: u64 = 1_700_000_000;
pub const STALENESS_SECS: u64 = 3_600;

pub fn now_secs() -> u64 {
    Timestamp::get() / 1000
}

pub fn set_now(secs: u64) {
    Timestamp::set_timestamp(secs * 1000);
}

pub fn native() -> AssetKind<AssetId> {
    AssetKind::Native
}

pub fn usdc() -> AssetKind<AssetId> {
    AssetKind::Registered(USDC)
}

pub fn wbtc() -> AssetKind<AssetId> {
    AssetKind::Registered(WBTC)
}

pub fn eurc() -> AssetKind<AssetId> {
    AssetKind::Registered(EURC)
}

pub fn custody() -> AccountId {
    Issuance::account_id()
}

pub fn claim_balance(who: AccountId) -> u128 {
    pallet_assets::Pallet::<Test>::balance(CLAIM, who)
}

/// Outstanding claim tokens, without the custody floor
pub fn claim_supply() -> u128 {
    Issuance::claim_supply()
}

pub fn eurc_balance(who: AccountId) -> u128 {
    pallet_assets::Pallet::<Test>::balance(EURC, who)
}

pub fn usdc_balance(who: AccountId) -> u128 {
    pallet_assets::Pallet::<Test>::balance(USDC, who)
}

/// Accepted assets and their bindings used by every fixture.
pub fn default_bindings() -> Vec<(AssetKind<AssetId>, OracleBinding)> {
    vec![
        (native(), OracleBinding::new(ETH_FEED).with_staleness(STALENESS_SECS)),
        (usdc(), OracleBinding::new(USDC_FEED).with_staleness(STALENESS_SECS)),
        (
            wbtc(),
            OracleBinding::new(WBTC_FEED)
                .with_staleness(STALENESS_SECS)
                .with_liveness_guard(GUARD_FEED),
        ),
        (eurc(), OracleBinding::new(USDC_FEED).with_staleness(STALENESS_SECS)),
    ]
}

pub struct ExtBuilder {
    issuance_cap: u128,
    conversion_rate: u128,
    initialized: bool,
}

impl Default for ExtBuilder {
    fn default() -> Self {
        Self { issuance_cap: 1_000_000 * ONE, conversion_rate: ONE, initialized: true }
    }
}

impl ExtBuilder {
    pub fn issuance_cap(mut self, cap: u128) -> Self {
        self.issuance_cap = cap;
        self
    }

    pub fn conversion_rate(mut self, rate: u128) -> Self {
        self.conversion_rate = rate;
        self
    }

    /// Leave the ledger unconfigured so `initialize` can be exercised.
    pub fn uninitialized(mut self) -> Self {
        self.initialized = false;
        self
    }

    pub fn build(self) -> sp_io::TestExternalities {
        let mut storage = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

        pallet_balances::GenesisConfig::<Test> {
            balances: vec![
                (ALICE, 1_000 * ONE),
                (BOB, 1_000 * ONE),
                (TREASURY, 1),
            ],
            ..Default::default()
        }
        .assimilate_storage(&mut storage)
        .unwrap();

        pallet_assets::GenesisConfig::<Test> {
            assets: vec![
                (CLAIM, custody(), true, 1),
                (USDC, ALICE, true, 1),
                (WBTC, ALICE, true, 1),
                (JUNK, ALICE, true, 1),
                (EURC, ALICE, true, EURC_MIN),
            ],
            metadata: vec![
                (CLAIM, b"Claim".to_vec(), b"CLM".to_vec(), 18),
                (USDC, b"USD Coin".to_vec(), b"USDC".to_vec(), 6),
                (WBTC, b"Wrapped BTC".to_vec(), b"WBTC".to_vec(), 8),
                (JUNK, b"Junk".to_vec(), b"JNK".to_vec(), 6),
                (EURC, b"Euro Coin".to_vec(), b"EURC".to_vec(), 6),
            ],
            accounts: vec![
                (USDC, ALICE, 1_000_000 * USDC_UNIT),
                (USDC, BOB, 1_000_000 * USDC_UNIT),
                (WBTC, ALICE, 100 * WBTC_UNIT),
                (JUNK, ALICE, 1_000 * USDC_UNIT),
                (EURC, ALICE, 1_000 * USDC_UNIT),
            ],
            ..Default::default()
        }
        .assimilate_storage(&mut storage)
        .unwrap();

        if self.initialized {
            pallet_issuance::GenesisConfig::<Test> {
                name: b"Redeemable Claim".to_vec(),
                symbol: b"RCLM".to_vec(),
                issuance_cap: self.issuance_cap,
                conversion_rate: self.conversion_rate,
                treasury: Some(TREASURY),
                accepted_assets: default_bindings()
                    .into_iter()
                    .map(|(asset, oracle)| pallet_issuance::GenesisAsset {
                        registered_id: match asset {
                            AssetKind::Native => None,
                            AssetKind::Registered(id) => Some(id),
                        },
                        oracle,
                    })
                    .collect(),
                ..Default::default()
            }
            .assimilate_storage(&mut storage)
            .unwrap();
        }

        let mut ext = sp_io::TestExternalities::new(storage);
        ext.execute_with(|| {
            System::set_block_number(1);
            set_now(START_SECS);
            clear_feeds();
            set_price(ETH_FEED, 2_000 * PRICE_UNIT);
            set_price(USDC_FEED, PRICE_UNIT);
            set_price(WBTC_FEED, 60_000 * PRICE_UNIT);
            set_guard(GUARD_FEED, 0, START_SECS - 2 * issuance_primitives::GRACE_PERIOD_SECS);
        });
        ext
    }
}

pub fn new_test_ext() -> sp_io::TestExternalities {
    ExtBuilder::default().build()
}
