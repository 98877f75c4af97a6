//! # Issuance Pallet
//!
//! Oracle-priced issuance of a claim token against deposited assets, with a
//! standing right to redeem each deposit at par.
//!
//! ## Overview
//!
//! - Depositors `invest` an accepted asset. The deposit is valued through a
//!   validated oracle quote, converted into claim tokens at a fixed rate and
//!   recorded as a **position**. The tokens stay locked in pallet custody.
//! - `divest` burns locked tokens and returns the matching slice of the
//!   deposit. `withdraw` releases locked tokens to the owner without burning;
//!   the matching slice of the deposit stays in custody, unbacked.
//! - Every position keeps its own asset/token ratio. Redemptions are priced
//!   off that ratio, never off the current oracle price.
//! - **Backing** tracks, per asset, how much custody is still owed to open
//!   positions. Anything above it can be sent to the treasury with
//!   `take_to_treasury`.
//! - Total claim supply is capped.
//!
//! ## Configuration
//!
//! Accepted assets, their oracle bindings, the cap, the conversion rate and
//! the treasury are set exactly once, either at genesis or through
//! `initialize`. There is no path to change them afterwards.
//!
//! Initialization also mints the minimum balance of the native currency,
//! of every accepted asset and of the claim token into custody. The claim
//! asset and every registered asset must therefore exist by then; at
//! genesis this pallet has to be built after the balances and assets
//! pallets.
//!
//! ## Errors
//!
//! [`Error::class`] separates caller mistakes, oracle rejections and
//! bookkeeping invariant breaches. The last kind should be unreachable and
//! is also logged at `error` level.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod conversion;
pub mod custody;
pub mod ledger;
pub mod oracle;

#[cfg(test)]
mod mock;


pub use issuance_primitives::{AssetKind, FeedId, OracleBinding, PositionId, RoundData, RoundFeeds};

/// Log target for this pallet.
pub(crate) const LOG_TARGET: &str = "issuance";

/// Pallet ID for the custody account
pub const PALLET_ID: frame_support::PalletId = frame_support::PalletId(*b"issuance");

/// Longest accepted claim token name or symbol
pub const MAX_LABEL_LEN: u32 = 32;

/// Which kind of failure an [`Error`] reports.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorClass {
    /// Bad input or authorization; the caller can retry with different arguments
    Input,
    /// The price feed could not be trusted
    Oracle,
    /// Ledger bookkeeping is inconsistent; treat as a bug
    Invariant,
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use crate::conversion::ConversionError;
    use crate::oracle::OracleError;
    use alloc::{collections::BTreeSet, vec::Vec};
    use frame_support::pallet_prelude::*;
    use frame_support::traits::tokens::{Fortitude, Precision, Preservation};
    use frame_support::traits::{fungible, fungibles, Time};
    use frame_system::pallet_prelude::*;
    use sp_runtime::traits::TrailingZeroInput;

    // =========================================================================
    //                                  Types
    // =========================================================================

    /// Claim token name or symbol
    pub type TokenLabel = BoundedVec<u8, ConstU32<MAX_LABEL_LEN>>;

    pub type AssetOf<T> = AssetKind<<T as Config>::AssetId>;

    /// Parameters fixed at initialization.
    #[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
    #[scale_info(skip_type_params(T))]
    pub struct IssuanceSettings<T: Config> {
        pub name: TokenLabel,
        pub symbol: TokenLabel,
        /// Ceiling on total claim supply (18 decimals)
        pub issuance_cap: u128,
        /// Claim tokens per unit of value, 18 decimals
        pub conversion_rate: u128,
        /// Receives custody held above backing
        pub treasury: T::AccountId,
        /// Claim tokens minted into custody at initialization to keep the
        /// account alive; never part of the outstanding supply
        pub claim_floor: u128,
    }

    /// A deposit and the claim tokens still locked against it.
    #[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
    #[scale_info(skip_type_params(T))]
    pub struct PositionInfo<T: Config> {
        pub position_id: PositionId,
        pub owner: T::AccountId,
        pub asset: AssetOf<T>,
        /// Remaining redeemable deposit, in the asset's own precision
        pub asset_amount: u128,
        /// Remaining locked claim tokens
        pub token_amount: u128,
    }

    impl<T: Config> PositionInfo<T> {
        /// Fully redeemed or released; no further reduction is possible.
        pub fn is_closed(&self) -> bool {
            self.asset_amount == 0 && self.token_amount == 0
        }
    }

    // =========================================================================
    //                                  Config
    // =========================================================================

    #[pallet::config]
    pub trait Config: frame_system::Config + pallet_timestamp::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Balance type shared by the native currency and the assets pallet
        type Balance: Parameter + Member + From<u128> + Into<u128> + Copy + Default + MaxEncodedLen;

        /// Asset ID type
        type AssetId: Parameter + Member + Copy + Ord + MaxEncodedLen + From<u32>;

        /// Native currency, accepted as a deposit asset
        type Currency: fungible::Mutate<Self::AccountId, Balance = Self::Balance>;

        /// Registered deposit assets and the claim token
        type Assets: fungibles::Mutate<Self::AccountId, AssetId = Self::AssetId, Balance = Self::Balance>
            + fungibles::metadata::Inspect<Self::AccountId>;

        /// Asset ID of the claim token. The asset must exist before the first investment.
        #[pallet::constant]
        type ClaimAssetId: Get<Self::AssetId>;

        /// Decimals of the native currency
        #[pallet::constant]
        type NativeDecimals: Get<u8>;

        /// Round-based price feeds
        type Feeds: RoundFeeds;

        /// Origin allowed to call `initialize`
        type InitOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Maximum number of accepted assets
        #[pallet::constant]
        type MaxAcceptedAssets: Get<u32>;

        type WeightInfo: WeightInfo;
    }

    /// Weight info trait
    pub trait WeightInfo {
        fn initialize() -> Weight;
        fn invest() -> Weight;
        fn divest() -> Weight;
        fn withdraw() -> Weight;
        fn take_to_treasury() -> Weight;
    }

    impl WeightInfo for () {
        fn initialize() -> Weight {
            Weight::from_parts(50_000, 0)
        }
        fn invest() -> Weight {
            Weight::from_parts(100_000, 0)
        }
        fn divest() -> Weight {
            Weight::from_parts(80_000, 0)
        }
        fn withdraw() -> Weight {
            Weight::from_parts(80_000, 0)
        }
        fn take_to_treasury() -> Weight {
            Weight::from_parts(40_000, 0)
        }
    }

    // =========================================================================
    //                                  Storage
    // =========================================================================

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Issuance parameters. `None` until initialized.
    #[pallet::storage]
    pub type Settings<T: Config> = StorageValue<_, IssuanceSettings<T>, OptionQuery>;

    /// Accepted assets and their oracle bindings
    #[pallet::storage]
    pub type AcceptedAssets<T: Config> = StorageMap<
        _,
        Blake2_128Concat,
        AssetOf<T>,
        OracleBinding,
        OptionQuery,
    >;

    /// Next position ID
    #[pallet::storage]
    pub type NextPositionId<T> = StorageValue<_, PositionId, ValueQuery>;

    /// Positions by ID
    #[pallet::storage]
    pub type Positions<T: Config> = StorageMap<
        _,
        Blake2_128Concat,
        PositionId,
        PositionInfo<T>,
        OptionQuery,
    >;

    /// Positions by owner (index)
    #[pallet::storage]
    pub type PositionsByOwner<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        PositionId,
        (),
        OptionQuery,
    >;

    /// Custody reserved for open positions, per asset
    #[pallet::storage]
    pub type Backing<T: Config> = StorageMap<
        _,
        Blake2_128Concat,
        AssetOf<T>,
        u128,
        ValueQuery,
    >;

    /// Re-entrancy guard shared by every mutating call
    #[pallet::storage]
    pub type Locked<T> = StorageValue<_, bool, ValueQuery>;

    // =========================================================================
    //                           Genesis Configuration
    // =========================================================================

    /// Genesis asset entry using concrete types for serde compatibility
    #[derive(
        Clone,
        PartialEq,
        Eq,
        Debug,
        Encode,
        Decode,
        scale_info::TypeInfo,
        serde::Serialize,
        serde::Deserialize,
    )]
    #[serde(rename_all = "camelCase")]
    pub struct GenesisAsset {
        /// Registered asset ID, `None` for the native currency
        pub registered_id: Option<u32>,
        pub oracle: OracleBinding,
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        pub name: Vec<u8>,
        pub symbol: Vec<u8>,
        pub issuance_cap: u128,
        pub conversion_rate: u128,
        /// Leave unset to configure through `initialize` instead
        pub treasury: Option<T::AccountId>,
        pub accepted_assets: Vec<GenesisAsset>,
        #[serde(skip)]
        pub _phantom: core::marker::PhantomData<T>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            let Some(treasury) = self.treasury.clone() else {
                return;
            };

            let (assets, bindings): (Vec<AssetOf<T>>, Vec<OracleBinding>) = self
                .accepted_assets
                .iter()
                .map(|entry| {
                    let asset = match entry.registered_id {
                        Some(id) => AssetKind::Registered(id.into()),
                        None => AssetKind::Native,
                    };
                    (asset, entry.oracle)
                })
                .unzip();

            Pallet::<T>::do_initialize(
                self.name.clone(),
                self.symbol.clone(),
                self.issuance_cap,
                self.conversion_rate,
                assets,
                bindings,
                treasury,
            )
            .expect("invalid issuance genesis configuration");
        }
    }

    // =========================================================================
    //                                  Events
    // =========================================================================

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// Issuance configured. [name, symbol, issuance_cap, conversion_rate, treasury, accepted_assets]
        Initialized {
            name: TokenLabel,
            symbol: TokenLabel,
            issuance_cap: u128,
            conversion_rate: u128,
            treasury: T::AccountId,
            accepted_assets: BoundedVec<(AssetOf<T>, OracleBinding), T::MaxAcceptedAssets>,
        },
        /// Deposit locked and claim tokens minted into custody. [owner, position_id, asset, asset_amount, tokens_minted]
        Invested {
            owner: T::AccountId,
            position_id: PositionId,
            asset: AssetOf<T>,
            asset_amount: u128,
            tokens_minted: u128,
        },
        /// Locked tokens burned and deposit slice returned. [owner, position_id, tokens_burned, asset, asset_returned]
        Divested {
            owner: T::AccountId,
            position_id: PositionId,
            tokens_burned: u128,
            asset: AssetOf<T>,
            asset_returned: u128,
        },
        /// Locked tokens released to the owner, guarantee dropped. [owner, position_id, tokens_unlocked, asset, asset_released]
        Withdrawn {
            owner: T::AccountId,
            position_id: PositionId,
            tokens_unlocked: u128,
            asset: AssetOf<T>,
            asset_released: u128,
        },
        /// Unbacked custody sent to the treasury. [caller, treasury, asset, amount]
        TakenToTreasury {
            caller: T::AccountId,
            treasury: T::AccountId,
            asset: AssetOf<T>,
            amount: u128,
        },
    }

    // =========================================================================
    //                                  Errors
    // =========================================================================

    #[pallet::error]
    pub enum Error<T> {
        /// Issuance has not been configured yet.
        NotInitialized,
        /// Issuance is already configured.
        AlreadyInitialized,
        /// Asset and oracle binding lists differ in length.
        LengthMismatch,
        /// Treasury is the all-zero account.
        InvalidTreasury,
        /// Issuance cap must be positive.
        InvalidIssuanceCap,
        /// Conversion rate must be positive.
        InvalidConversionRate,
        /// Token name or symbol too long.
        LabelTooLong,
        /// Too many accepted assets.
        TooManyAssets,
        /// Asset listed twice.
        DuplicateAsset,
        /// Amount must be positive.
        ZeroAmount,
        /// Asset is not accepted.
        AssetNotAccepted,
        /// Deposit too small to mint any claim tokens.
        ZeroTokens,
        /// Minting would exceed the issuance cap.
        CapExceeded,
        /// Position not found.
        PositionNotFound,
        /// Caller does not own the position.
        NotPositionOwner,
        /// More tokens requested than the position has locked.
        InsufficientLockedTokens,
        /// Position has no locked tokens left.
        EmptyPosition,
        /// Requested slice redeems nothing after rounding.
        ZeroRedemption,
        /// Amount exceeds custody held above backing.
        InsufficientAvailableBacking,
        /// A call is already in progress.
        ReentrantCall,
        /// Arithmetic overflow.
        ArithmeticOverflow,
        /// Asset transfer failed.
        TransferFailed,
        /// Claim token mint, burn or transfer failed.
        ClaimTokenFailed,
        /// Asset has no oracle feed bound.
        OracleNotConfigured,
        /// Oracle feed returned no data.
        OracleUnavailable,
        /// Oracle answer is zero or negative.
        OracleInvalidPrice,
        /// Oracle round is incomplete.
        OracleIncompleteRound,
        /// Oracle round has no update time.
        OracleMissingTimestamp,
        /// Oracle price is stale.
        OracleStalePrice,
        /// Upstream liveness guard reports an outage.
        OracleGuardTripped,
        /// Upstream recovered too recently.
        OracleGracePeriodNotOver,
        /// Invariant: redemption exceeds what the position holds.
        RedemptionExceedsPosition,
        /// Invariant: redemption exceeds the asset's backing total.
        RedemptionExceedsBacking,
        /// Invariant: backing exceeds custody.
        BackingExceedsHoldings,
    }

    impl<T> Error<T> {
        pub fn class(&self) -> ErrorClass {
            match self {
                Error::OracleNotConfigured
                | Error::OracleUnavailable
                | Error::OracleInvalidPrice
                | Error::OracleIncompleteRound
                | Error::OracleMissingTimestamp
                | Error::OracleStalePrice
                | Error::OracleGuardTripped
                | Error::OracleGracePeriodNotOver => ErrorClass::Oracle,
                Error::RedemptionExceedsPosition
                | Error::RedemptionExceedsBacking
                | Error::BackingExceedsHoldings => ErrorClass::Invariant,
                _ => ErrorClass::Input,
            }
        }
    }

    impl<T> From<OracleError> for Error<T> {
        fn from(err: OracleError) -> Self {
            match err {
                OracleError::NotConfigured => Error::OracleNotConfigured,
                OracleError::Unavailable => Error::OracleUnavailable,
                OracleError::InvalidPrice => Error::OracleInvalidPrice,
                OracleError::IncompleteRound => Error::OracleIncompleteRound,
                OracleError::MissingTimestamp => Error::OracleMissingTimestamp,
                OracleError::StalePrice => Error::OracleStalePrice,
                OracleError::GuardTripped => Error::OracleGuardTripped,
                OracleError::GracePeriodNotOver => Error::OracleGracePeriodNotOver,
            }
        }
    }

    impl<T> From<ConversionError> for Error<T> {
        fn from(err: ConversionError) -> Self {
            match err {
                ConversionError::Overflow => Error::ArithmeticOverflow,
                ConversionError::ZeroTokens => Error::ZeroTokens,
                ConversionError::CapExceeded => Error::CapExceeded,
                ConversionError::EmptyPosition => Error::EmptyPosition,
                ConversionError::ZeroRedemption => Error::ZeroRedemption,
                ConversionError::ExceedsPosition => Error::RedemptionExceedsPosition,
                ConversionError::ExceedsBacking => Error::RedemptionExceedsBacking,
            }
        }
    }

    // =========================================================================
    //                                Extrinsics
    // =========================================================================

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Configure issuance. Succeeds once; genesis counts as the first call
        /// when it sets a treasury.
        ///
        /// `assets[i]` is priced by `bindings[i]`.
        #[pallet::call_index(0)]
        #[pallet::weight(<T as Config>::WeightInfo::initialize())]
        pub fn initialize(
            origin: OriginFor<T>,
            name: Vec<u8>,
            symbol: Vec<u8>,
            issuance_cap: u128,
            conversion_rate: u128,
            assets: Vec<AssetOf<T>>,
            bindings: Vec<OracleBinding>,
            treasury: T::AccountId,
        ) -> DispatchResult {
            T::InitOrigin::ensure_origin(origin)?;
            Self::do_initialize(name, symbol, issuance_cap, conversion_rate, assets, bindings, treasury)
        }

        /// Deposit `amount` of `asset` and open a position.
        ///
        /// This will:
        /// 1. Price the deposit through the asset's oracle binding.
        /// 2. Mint the resulting claim tokens into custody, within the cap.
        /// 3. Record the position and its backing.
        /// 4. Pull the deposit from the caller into custody.
        #[pallet::call_index(1)]
        #[pallet::weight(<T as Config>::WeightInfo::invest())]
        pub fn invest(origin: OriginFor<T>, asset: AssetOf<T>, amount: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;

            Self::with_guard(|| {
                ensure!(amount > 0, Error::<T>::ZeroAmount);
                let tokens = Self::quote_invest(asset, amount)?;
                let custody = Self::account_id();

                <T::Assets as fungibles::Mutate<T::AccountId>>::mint_into(
                    T::ClaimAssetId::get(),
                    &custody,
                    tokens.into(),
                )
                .map_err(|_| Error::<T>::ClaimTokenFailed)?;

                let position_id = Self::open_position(&who, asset, amount, tokens)?;

                Self::transfer_asset(asset, &who, &custody, amount)?;

                log::info!(
                    target: LOG_TARGET,
                    "📥 Position {} opened: {:?} {} -> {} claim tokens",
                    position_id,
                    asset,
                    amount,
                    tokens
                );

                Self::deposit_event(Event::Invested {
                    owner: who.clone(),
                    position_id,
                    asset,
                    asset_amount: amount,
                    tokens_minted: tokens,
                });

                Ok(())
            })
        }

        /// Burn `tokens` locked in a position and get the matching deposit slice back.
        #[pallet::call_index(2)]
        #[pallet::weight(<T as Config>::WeightInfo::divest())]
        pub fn divest(origin: OriginFor<T>, position_id: PositionId, tokens: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;

            Self::with_guard(|| {
                let (asset, asset_returned) = Self::reduce_position(&who, position_id, tokens)?;
                let custody = Self::account_id();

                <T::Assets as fungibles::Mutate<T::AccountId>>::burn_from(
                    T::ClaimAssetId::get(),
                    &custody,
                    tokens.into(),
                    Preservation::Preserve,
                    Precision::Exact,
                    Fortitude::Polite,
                )
                .map_err(|_| Error::<T>::ClaimTokenFailed)?;

                Self::transfer_asset(asset, &custody, &who, asset_returned)?;

                log::info!(
                    target: LOG_TARGET,
                    "📤 Position {} divested: {} tokens burned, {:?} {} returned",
                    position_id,
                    tokens,
                    asset,
                    asset_returned
                );

                Self::deposit_event(Event::Divested {
                    owner: who.clone(),
                    position_id,
                    tokens_burned: tokens,
                    asset,
                    asset_returned,
                });

                Ok(())
            })
        }

        /// Release `tokens` locked in a position to the owner.
        ///
        /// The tokens keep circulating but lose their redemption guarantee. The
        /// matching deposit slice stays in custody and becomes available to
        /// the treasury.
        #[pallet::call_index(3)]
        #[pallet::weight(<T as Config>::WeightInfo::withdraw())]
        pub fn withdraw(origin: OriginFor<T>, position_id: PositionId, tokens: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;

            Self::with_guard(|| {
                let (asset, asset_released) = Self::reduce_position(&who, position_id, tokens)?;

                <T::Assets as fungibles::Mutate<T::AccountId>>::transfer(
                    T::ClaimAssetId::get(),
                    &Self::account_id(),
                    &who,
                    tokens.into(),
                    Preservation::Preserve,
                )
                .map_err(|_| Error::<T>::ClaimTokenFailed)?;

                log::info!(
                    target: LOG_TARGET,
                    "🔓 Position {} withdrawn: {} tokens released, {:?} {} unbacked",
                    position_id,
                    tokens,
                    asset,
                    asset_released
                );

                Self::deposit_event(Event::Withdrawn {
                    owner: who.clone(),
                    position_id,
                    tokens_unlocked: tokens,
                    asset,
                    asset_released,
                });

                Ok(())
            })
        }

        /// Send custody held above backing to the treasury.
        ///
        /// Permissionless: any signed account may trigger it, funds only ever
        /// go to the configured treasury.
        #[pallet::call_index(4)]
        #[pallet::weight(<T as Config>::WeightInfo::take_to_treasury())]
        pub fn take_to_treasury(origin: OriginFor<T>, asset: AssetOf<T>, amount: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;

            Self::with_guard(|| {
                ensure!(amount > 0, Error::<T>::ZeroAmount);
                let settings = Settings::<T>::get().ok_or(Error::<T>::NotInitialized)?;
                ensure!(AcceptedAssets::<T>::contains_key(asset), Error::<T>::AssetNotAccepted);

                let available = Self::available_for_skim(asset)?;
                ensure!(amount <= available, Error::<T>::InsufficientAvailableBacking);

                Self::transfer_asset(asset, &Self::account_id(), &settings.treasury, amount)?;

                log::info!(
                    target: LOG_TARGET,
                    "🏦 {:?} {} sent to treasury ({} was available)",
                    asset,
                    amount,
                    available
                );

                Self::deposit_event(Event::TakenToTreasury {
                    caller: who.clone(),
                    treasury: settings.treasury,
                    asset,
                    amount,
                });

                Ok(())
            })
        }
    }

    // =========================================================================
    //                           Helper Functions
    // =========================================================================

    impl<T: Config> Pallet<T> {
        pub fn do_initialize(
            name: Vec<u8>,
            symbol: Vec<u8>,
            issuance_cap: u128,
            conversion_rate: u128,
            assets: Vec<AssetOf<T>>,
            bindings: Vec<OracleBinding>,
            treasury: T::AccountId,
        ) -> DispatchResult {
            ensure!(!Settings::<T>::exists(), Error::<T>::AlreadyInitialized);
            ensure!(assets.len() == bindings.len(), Error::<T>::LengthMismatch);
            let accepted: BoundedVec<(AssetOf<T>, OracleBinding), T::MaxAcceptedAssets> = assets
                .iter()
                .copied()
                .zip(bindings)
                .collect::<Vec<_>>()
                .try_into()
                .map_err(|_| Error::<T>::TooManyAssets)?;
            ensure!(issuance_cap > 0, Error::<T>::InvalidIssuanceCap);
            ensure!(conversion_rate > 0, Error::<T>::InvalidConversionRate);

            let zero_account = T::AccountId::decode(&mut TrailingZeroInput::zeroes()).ok();
            ensure!(zero_account.as_ref() != Some(&treasury), Error::<T>::InvalidTreasury);

            let name: TokenLabel = name.try_into().map_err(|_| Error::<T>::LabelTooLong)?;
            let symbol: TokenLabel = symbol.try_into().map_err(|_| Error::<T>::LabelTooLong)?;

            let mut seen = BTreeSet::new();
            for (asset, _) in accepted.iter() {
                ensure!(seen.insert(*asset), Error::<T>::DuplicateAsset);
            }

            // Floors first; every outflow from custody leaves them behind.
            Self::endow_custody(AssetKind::Native)?;
            for (asset, binding) in accepted.iter() {
                Self::endow_custody(*asset)?;
                AcceptedAssets::<T>::insert(asset, binding);
            }
            let claim_floor = Self::endow_claim_custody()?;

            Settings::<T>::put(IssuanceSettings {
                name: name.clone(),
                symbol: symbol.clone(),
                issuance_cap,
                conversion_rate,
                treasury: treasury.clone(),
                claim_floor,
            });

            log::info!(
                target: LOG_TARGET,
                "✅ Issuance initialized: cap {}, rate {}, {} accepted assets",
                issuance_cap,
                conversion_rate,
                accepted.len()
            );

            Self::deposit_event(Event::Initialized {
                name,
                symbol,
                issuance_cap,
                conversion_rate,
                treasury,
                accepted_assets: accepted,
            });

            Ok(())
        }

        /// Claim tokens `amount` of `asset` would mint right now.
        ///
        /// Runs the same oracle validation and cap check as `invest` without
        /// touching storage.
        pub fn quote_invest(asset: AssetOf<T>, amount: u128) -> Result<u128, DispatchError> {
            ensure!(amount > 0, Error::<T>::ZeroAmount);
            let settings = Settings::<T>::get().ok_or(Error::<T>::NotInitialized)?;
            let binding = AcceptedAssets::<T>::get(asset).ok_or(Error::<T>::AssetNotAccepted)?;

            let quote = oracle::validated_price::<T::Feeds>(&binding, Self::current_timestamp())
                .map_err(|err| {
                    log::warn!(target: LOG_TARGET, "Quote for {:?} rejected: {:?}", asset, err);
                    Error::<T>::from(err)
                })?;

            let value = conversion::asset_to_value(
                amount,
                quote.price,
                Self::asset_decimals(asset),
                quote.decimals,
            )
            .map_err(Error::<T>::from)?;
            let tokens = conversion::value_to_tokens(value, settings.conversion_rate)
                .map_err(Error::<T>::from)?;
            conversion::supply_after_mint(Self::claim_supply(), tokens, settings.issuance_cap)
                .map_err(Error::<T>::from)?;

            log::debug!(
                target: LOG_TARGET,
                "{:?} {} at price {} ({} decimals) is worth {} -> {} tokens",
                asset,
                amount,
                quote.price,
                quote.decimals,
                value,
                tokens
            );

            Ok(tokens)
        }

        /// Run `f` with the re-entrancy guard held. The guard is released on
        /// every exit path.
        fn with_guard<R>(f: impl FnOnce() -> Result<R, DispatchError>) -> Result<R, DispatchError> {
            ensure!(!Locked::<T>::get(), Error::<T>::ReentrantCall);
            Locked::<T>::put(true);
            let result = f();
            Locked::<T>::kill();
            result
        }

        /// Current timestamp from pallet_timestamp, in seconds
        pub(crate) fn current_timestamp() -> u64 {
            let now_ms: u64 = pallet_timestamp::Pallet::<T>::now()
                .try_into()
                .unwrap_or(0);
            now_ms / 1000
        }

        pub fn is_initialized() -> bool {
            Settings::<T>::exists()
        }

        pub fn settings() -> Option<IssuanceSettings<T>> {
            Settings::<T>::get()
        }

        /// Oracle binding of an accepted asset
        pub fn binding(asset: AssetOf<T>) -> Option<OracleBinding> {
            AcceptedAssets::<T>::get(asset)
        }

        /// Outstanding claim token supply, excluding the custody floor
        pub fn claim_supply() -> u128 {
            let total: u128 =
                <T::Assets as fungibles::Inspect<T::AccountId>>::total_issuance(T::ClaimAssetId::get())
                    .into();
            let floor = Settings::<T>::get().map(|s| s.claim_floor).unwrap_or(0);
            total.saturating_sub(floor)
        }
    }
}
