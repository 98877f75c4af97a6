//! # Custody
//!
//! Asset movement in and out of the pallet account. Native currency and
//! registered assets go through different traits; callers only see
//! [`AssetKind`](issuance_primitives::AssetKind).
//!
//! The custody account holds a floor of every asset it deals in, equal to
//! the asset's minimum balance, minted once at initialization. Outflows keep
//! the account alive, so the ledger never loses dust to account reaping and
//! the floor is never available to the treasury.

use crate::pallet::{AssetOf, Backing, Config, Error, Pallet};
use crate::{LOG_TARGET, PALLET_ID};
use frame_support::traits::{fungible, fungibles, tokens::Preservation, Get};
use issuance_primitives::AssetKind;
use sp_runtime::{traits::AccountIdConversion, DispatchError, DispatchResult};

impl<T: Config> Pallet<T> {
    /// Account holding deposits and locked claim tokens
    pub fn account_id() -> T::AccountId {
        PALLET_ID.into_account_truncating()
    }

    /// Move `amount` of `asset` between accounts, failing loudly.
    ///
    /// Moves out of custody never reap it.
    pub(crate) fn transfer_asset(
        asset: AssetOf<T>,
        from: &T::AccountId,
        to: &T::AccountId,
        amount: u128,
    ) -> DispatchResult {
        let preservation = if *from == Self::account_id() {
            Preservation::Preserve
        } else {
            Preservation::Expendable
        };

        let moved = match asset {
            AssetKind::Native => <T::Currency as fungible::Mutate<T::AccountId>>::transfer(
                from,
                to,
                amount.into(),
                preservation,
            ),
            AssetKind::Registered(id) => <T::Assets as fungibles::Mutate<T::AccountId>>::transfer(
                id,
                from,
                to,
                amount.into(),
                preservation,
            ),
        };

        moved.map(|_| ()).map_err(|err| {
            log::warn!(
                target: LOG_TARGET,
                "Transfer of {:?} {} failed: {:?}",
                asset,
                amount,
                err
            );
            Error::<T>::TransferFailed.into()
        })
    }

    /// Custody balance of `asset`
    pub fn held_balance(asset: AssetOf<T>) -> u128 {
        let custody = Self::account_id();
        match asset {
            AssetKind::Native => {
                <T::Currency as fungible::Inspect<T::AccountId>>::balance(&custody).into()
            }
            AssetKind::Registered(id) => {
                <T::Assets as fungibles::Inspect<T::AccountId>>::balance(id, &custody).into()
            }
        }
    }

    /// Minimum balance of `asset`; custody never holds less once initialized.
    pub fn custody_floor(asset: AssetOf<T>) -> u128 {
        match asset {
            AssetKind::Native => {
                <T::Currency as fungible::Inspect<T::AccountId>>::minimum_balance().into()
            }
            AssetKind::Registered(id) => {
                <T::Assets as fungibles::Inspect<T::AccountId>>::minimum_balance(id).into()
            }
        }
    }

    /// Custody of `asset` not reserved for any position, less the floor.
    ///
    /// Backing above custody means the books are broken and is reported as
    /// such rather than clamped to zero.
    pub fn available_for_skim(asset: AssetOf<T>) -> Result<u128, DispatchError> {
        let held = Self::held_balance(asset);
        let backing = Backing::<T>::get(asset);

        let unbacked = held.checked_sub(backing).ok_or_else(|| {
            log::error!(
                target: LOG_TARGET,
                "🚨 Backing of {:?} ({}) exceeds custody ({})",
                asset,
                backing,
                held
            );
            Error::<T>::BackingExceedsHoldings
        })?;

        Ok(unbacked.saturating_sub(Self::custody_floor(asset)))
    }

    /// Top custody up to the floor of `asset`.
    pub(crate) fn endow_custody(asset: AssetOf<T>) -> DispatchResult {
        let custody = Self::account_id();
        let shortfall = Self::custody_floor(asset).saturating_sub(Self::held_balance(asset));
        if shortfall == 0 {
            return Ok(());
        }

        let minted = match asset {
            AssetKind::Native => {
                <T::Currency as fungible::Mutate<T::AccountId>>::mint_into(&custody, shortfall.into())
            }
            AssetKind::Registered(id) => <T::Assets as fungibles::Mutate<T::AccountId>>::mint_into(
                id,
                &custody,
                shortfall.into(),
            ),
        };

        minted.map(|_| ()).map_err(|err| {
            log::warn!(target: LOG_TARGET, "Endowing custody with {:?} failed: {:?}", asset, err);
            Error::<T>::TransferFailed.into()
        })
    }

    /// Top custody up to the claim token's minimum balance. Returns the
    /// floor, which is excluded from the outstanding supply.
    pub(crate) fn endow_claim_custody() -> Result<u128, DispatchError> {
        let claim = T::ClaimAssetId::get();
        let custody = Self::account_id();
        let floor: u128 =
            <T::Assets as fungibles::Inspect<T::AccountId>>::minimum_balance(claim).into();
        let held: u128 =
            <T::Assets as fungibles::Inspect<T::AccountId>>::balance(claim, &custody).into();

        let shortfall = floor.saturating_sub(held);
        if shortfall > 0 {
            <T::Assets as fungibles::Mutate<T::AccountId>>::mint_into(
                claim,
                &custody,
                shortfall.into(),
            )
            .map_err(|_| Error::<T>::ClaimTokenFailed)?;
        }

        Ok(floor)
    }

    /// Decimals of `asset`'s smallest unit
    pub(crate) fn asset_decimals(asset: AssetOf<T>) -> u8 {
        match asset {
            AssetKind::Native => T::NativeDecimals::get(),
            AssetKind::Registered(id) => {
                <T::Assets as fungibles::metadata::Inspect<T::AccountId>>::decimals(id)
            }
        }
    }
}
