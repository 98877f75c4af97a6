//! # Position Ledger
//!
//! Bookkeeping for positions and per-asset backing. Only the pallet's own
//! calls mutate these maps; positions are never removed, a fully redeemed
//! one just stays at (0, 0).

use crate::conversion;
use crate::pallet::{
    AssetOf, Backing, Config, Error, NextPositionId, Pallet, PositionInfo, Positions,
    PositionsByOwner,
};
use crate::LOG_TARGET;
use alloc::vec::Vec;
use frame_support::ensure;
use issuance_primitives::PositionId;
use sp_runtime::DispatchError;

impl<T: Config> Pallet<T> {
    /// Record a new position and reserve its deposit in backing.
    pub(crate) fn open_position(
        owner: &T::AccountId,
        asset: AssetOf<T>,
        asset_amount: u128,
        token_amount: u128,
    ) -> Result<PositionId, DispatchError> {
        let position_id = NextPositionId::<T>::get();
        let next_id = position_id.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;

        Backing::<T>::try_mutate(asset, |backing| -> Result<(), DispatchError> {
            *backing = backing.checked_add(asset_amount).ok_or(Error::<T>::ArithmeticOverflow)?;
            Ok(())
        })?;

        PositionsByOwner::<T>::insert(owner, position_id, ());

        Positions::<T>::insert(
            position_id,
            PositionInfo {
                position_id,
                owner: owner.clone(),
                asset,
                asset_amount,
                token_amount,
            },
        );
        NextPositionId::<T>::put(next_id);

        Ok(position_id)
    }

    /// Take `tokens` out of `who`'s position together with the matching
    /// slice of its deposit, and drop that slice from backing.
    ///
    /// Returns the position's asset and the size of the slice. The slice is
    /// priced off the position's own ratio.
    pub(crate) fn reduce_position(
        who: &T::AccountId,
        position_id: PositionId,
        tokens: u128,
    ) -> Result<(AssetOf<T>, u128), DispatchError> {
        ensure!(tokens > 0, Error::<T>::ZeroAmount);
        let mut position = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotFound)?;
        ensure!(position.owner == *who, Error::<T>::NotPositionOwner);
        ensure!(tokens <= position.token_amount, Error::<T>::InsufficientLockedTokens);

        let backing = Backing::<T>::get(position.asset);
        let asset_amount = conversion::proportional_asset_amount(
            tokens,
            position.asset_amount,
            position.token_amount,
            backing,
        )
        .map_err(|err| {
            let err = Error::<T>::from(err);
            if err.class() == crate::ErrorClass::Invariant {
                log::error!(
                    target: LOG_TARGET,
                    "🚨 Ledger invariant broken on position {}: {:?} (tokens {}, position {}/{}, backing {})",
                    position_id,
                    err,
                    tokens,
                    position.asset_amount,
                    position.token_amount,
                    backing
                );
            }
            err
        })?;

        position.token_amount = position.token_amount.saturating_sub(tokens);
        position.asset_amount = position.asset_amount.saturating_sub(asset_amount);
        Backing::<T>::insert(position.asset, backing.saturating_sub(asset_amount));
        Positions::<T>::insert(position_id, &position);

        Ok((position.asset, asset_amount))
    }

    /// Position info
    pub fn position(position_id: PositionId) -> Option<PositionInfo<T>> {
        Positions::<T>::get(position_id)
    }

    /// IDs of every position `owner` opened, closed ones included, oldest first
    pub fn positions_of(owner: &T::AccountId) -> Vec<PositionId> {
        let mut ids: Vec<PositionId> = PositionsByOwner::<T>::iter_key_prefix(owner).collect();
        ids.sort_unstable();
        ids
    }

    /// Custody reserved for open positions in `asset`
    pub fn backing(asset: AssetOf<T>) -> u128 {
        Backing::<T>::get(asset)
    }
}
