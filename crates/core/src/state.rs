//! State.
//!
//! This module contains the storage and the logic of the FundMe contract.

use alloy_primitives::{Address, U256};
use tracing::{debug, info};

use crate::{
    converter::get_conversion_rate,
    errors::{FundMeError, FundMePanic, FundMeRevert, INSUFFICIENT_FUNDS_MESSAGE},
    gas::{self, Slot},
    host::{CallContext, Host},
    receipts::{FundOutcome, ReceiptAction, WithdrawOutcome},
    sparse::SparseStorage,
    storage::{Storage, StorageKey},
    transactions::FundMeCall,
};

/// The minimum contribution, in USD with 18 decimals.
pub const MINIMUM_USD: u128 = 50 * 10u128.pow(18);

/// The FundMe contract as deployed on a [`crate::chain::LocalChain`].
pub type LocalFundMe = FundMe<SparseStorage<Address, U256>>;

/// The state of a FundMe contract.
///
/// The ledger `address_to_amount_funded` and the `funders` list are only ever written together:
/// every listed funder has a non-zero entry, and each funder is listed once.
#[derive(Debug, Clone)]
pub struct FundMe<A: Storage<Address, U256>> {
    /// The address the contract is deployed at.
    address: Address,
    /// The only account allowed to withdraw. Fixed at deployment.
    owner: Address,
    /// The ETH/USD price feed.
    price_feed: Address,
    /// The cumulative contribution of each funder since the last withdrawal.
    address_to_amount_funded: A,
    /// The funders since the last withdrawal, in order of their first contribution.
    funders: Vec<Address>,
}

impl<A: Storage<Address, U256>> FundMe<A> {
    /// Creates a new [`FundMe`] owned by `owner`.
    #[must_use]
    pub fn new(address: Address, owner: Address, price_feed: Address) -> Self {
        Self { address, owner, price_feed, address_to_amount_funded: A::new(), funders: Vec::new() }
    }

    /// Executes a [`FundMeCall`] and returns the resulting [`ReceiptAction`].
    ///
    /// On error the contract state is left untouched.
    pub fn execute<H: Host>(
        &mut self,
        call: FundMeCall,
        ctx: &mut CallContext<'_, H>,
    ) -> Result<ReceiptAction, FundMeError> {
        match call {
            FundMeCall::Fund | FundMeCall::Receive => {
                info!("CALL {}: {}(sender={}, value={})", self.address, call.name(), ctx.sender, ctx.value);
                self.fund(ctx).map(ReceiptAction::Fund)
            }
            FundMeCall::Withdraw => {
                info!("CALL {}: WITHDRAW(sender={})", self.address, ctx.sender);
                self.withdraw(ctx).map(ReceiptAction::Withdraw)
            }
            FundMeCall::CheaperWithdraw => {
                info!("CALL {}: CHEAPER_WITHDRAW(sender={})", self.address, ctx.sender);
                self.cheaper_withdraw(ctx).map(ReceiptAction::CheaperWithdraw)
            }
        }
    }

    /// Records a contribution of the attached value from the sender.
    ///
    /// Fails with [`FundMeRevert::InsufficientContribution`] if the value is worth less than
    /// [`MINIMUM_USD`].
    pub fn fund<H: Host>(
        &mut self,
        ctx: &mut CallContext<'_, H>,
    ) -> Result<FundOutcome, FundMeError> {
        // Convert the attached value to USD.
        debug!("read price feed");
        ctx.gas.sload(Slot::PriceFeed)?;
        ctx.gas.account_access(self.price_feed)?;
        let feed = ctx
            .host
            .price_feed(self.price_feed)
            .ok_or(FundMePanic::PriceFeedDoesNotExist { address: self.price_feed })?;
        let value_usd = get_conversion_rate(ctx.value, feed)?;

        // Validate that the contribution reaches the minimum.
        debug!("check contribution of {} USD reaches minimum", value_usd);
        if value_usd < U256::from(MINIMUM_USD) {
            return Err(FundMeRevert::InsufficientContribution {
                message: INSUFFICIENT_FUNDS_MESSAGE.to_string(),
            }
            .into());
        }

        // Charge the ledger writes before applying any of them.
        debug!("charge ledger writes");
        let funder = ctx.sender;
        let slot = Slot::AmountFunded(funder);
        ctx.gas.sload(slot)?;
        let before = self.get_address_to_amount_funded(funder);
        let total = crate::u256::add(before, ctx.value)?;
        ctx.gas.sstore(slot, before, total)?;
        let new_funder = before.is_zero();
        if new_funder {
            let len = self.funders.len();
            ctx.gas.sload(Slot::FundersLength)?;
            ctx.gas.sstore(Slot::FundersLength, U256::from(len), U256::from(len + 1))?;
            ctx.gas.sstore(Slot::Funder(len), U256::ZERO, funder.index())?;
        }

        // Update the ledger.
        info!("├── Funder({}): + {} wei", funder, ctx.value);
        self.address_to_amount_funded.insert(funder, total);
        if new_funder {
            info!("├── Funders[{}] = {}", self.funders.len(), funder);
            self.funders.push(funder);
        }

        Ok(FundOutcome { funder, amount: ctx.value, total })
    }

    /// Sends the whole balance to the owner and resets the ledger.
    ///
    /// Reads the funder list length from storage on every iteration.
    pub fn withdraw<H: Host>(
        &mut self,
        ctx: &mut CallContext<'_, H>,
    ) -> Result<WithdrawOutcome, FundMeError> {
        self.only_owner(ctx)?;

        debug!("charge ledger reset");
        let mut index = 0;
        loop {
            ctx.gas.sload(Slot::FundersLength)?;
            if index >= self.funders.len() {
                break;
            }
            ctx.gas.sload(Slot::Funder(index))?;
            let funder = self.funders[index];
            self.charge_ledger_clear(ctx, funder)?;
            index += 1;
        }

        self.settle_withdrawal(ctx)
    }

    /// Sends the whole balance to the owner and resets the ledger.
    ///
    /// Copies the funder list to memory once. Observable behavior is the same as
    /// [`FundMe::withdraw`].
    pub fn cheaper_withdraw<H: Host>(
        &mut self,
        ctx: &mut CallContext<'_, H>,
    ) -> Result<WithdrawOutcome, FundMeError> {
        self.only_owner(ctx)?;

        debug!("copy funders to memory");
        ctx.gas.sload(Slot::FundersLength)?;
        let mut funders = Vec::with_capacity(self.funders.len());
        for (index, funder) in self.funders.iter().enumerate() {
            ctx.gas.sload(Slot::Funder(index))?;
            ctx.gas.memory(1)?;
            funders.push(*funder);
        }

        debug!("charge ledger reset");
        for funder in funders {
            ctx.gas.memory(1)?;
            self.charge_ledger_clear(ctx, funder)?;
        }

        self.settle_withdrawal(ctx)
    }

    /// Returns the owner.
    #[must_use]
    pub fn get_owner(&self) -> Address {
        self.owner
    }

    /// Returns the address of the price feed.
    #[must_use]
    pub fn get_price_feed(&self) -> Address {
        self.price_feed
    }

    /// Returns the address the contract is deployed at.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Returns the funder at `index`.
    pub fn get_funder(&self, index: usize) -> Result<Address, FundMeRevert> {
        self.funders
            .get(index)
            .copied()
            .ok_or(FundMeRevert::FunderIndexOutOfBounds { index, len: self.funders.len() })
    }

    /// Returns the number of funders since the last withdrawal.
    #[must_use]
    pub fn get_funders_count(&self) -> usize {
        self.funders.len()
    }

    /// Returns the amount `funder` contributed since the last withdrawal.
    #[must_use]
    pub fn get_address_to_amount_funded(&self, funder: Address) -> U256 {
        self.address_to_amount_funded.get(&funder).copied().unwrap_or_default()
    }

    /// Returns the version of the price feed.
    pub fn get_version<H: Host>(&self, host: &H) -> Result<U256, FundMeError> {
        let feed = host
            .price_feed(self.price_feed)
            .ok_or(FundMePanic::PriceFeedDoesNotExist { address: self.price_feed })?;
        Ok(feed.version())
    }

    /// Validates that the sender is the owner.
    fn only_owner<H: Host>(&self, ctx: &mut CallContext<'_, H>) -> Result<(), FundMeError> {
        debug!("check sender is owner");
        ctx.gas.charge(gas::VERY_LOW)?;
        if ctx.sender != self.owner {
            return Err(FundMeRevert::NotOwner.into());
        }
        Ok(())
    }

    /// Charges zeroing the ledger entry of `funder`.
    fn charge_ledger_clear<H: Host>(
        &self,
        ctx: &mut CallContext<'_, H>,
        funder: Address,
    ) -> Result<(), FundMeError> {
        let before = self.get_address_to_amount_funded(funder);
        ctx.gas.sstore(Slot::AmountFunded(funder), before, U256::ZERO)?;
        Ok(())
    }

    /// Charges emptying the funder list, transfers the balance to the owner and resets the ledger.
    fn settle_withdrawal<H: Host>(
        &mut self,
        ctx: &mut CallContext<'_, H>,
    ) -> Result<WithdrawOutcome, FundMeError> {
        // Charge emptying the funder list.
        let len = self.funders.len();
        ctx.gas.sstore(Slot::FundersLength, U256::from(len), U256::ZERO)?;
        for (index, funder) in self.funders.iter().enumerate() {
            ctx.gas.sstore(Slot::Funder(index), funder.index(), U256::ZERO)?;
        }

        // Transfer the whole balance to the owner.
        ctx.gas.charge(gas::SELF_BALANCE)?;
        ctx.gas.account_access(self.owner)?;
        ctx.gas.charge(gas::CALL_VALUE)?;
        let amount = ctx.host.balance(self.address);
        info!("├── Contract({}): - {} wei", self.address, amount);
        info!("├── Owner({}): + {} wei", self.owner, amount);
        ctx.host.transfer(self.address, self.owner, amount)?;

        // Reset the ledger.
        for funder in &self.funders {
            self.address_to_amount_funded.remove(*funder);
        }
        self.funders.clear();
        info!("└── Funders reset ({} cleared)", len);

        Ok(WithdrawOutcome { owner: self.owner, amount, funders: len as u64 })
    }
}
