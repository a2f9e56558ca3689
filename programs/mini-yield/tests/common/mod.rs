// In-memory test doubles for driving the vault controller without a runtime:
// a mock token holding user wallets and a mock yield protocol that accrues
// basis-point yield and can be told to fail.

#![allow(dead_code)]

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use mini_yield::{
    adapters::{AssetCustody, YieldAdapter},
    errors::VaultError,
    events::*,
    state::{AdapterHandle, AssetState, UserBalance, VaultConfig},
    vault,
};

pub const ONE_TOKEN: u64 = 1_000_000; // 6 decimals, like the mock USDC

pub fn vault_error(e: VaultError) -> anchor_lang::error::Error {
    e.into()
}

/// Wallet balances of the asset, keyed by user
#[derive(Default)]
pub struct MockToken {
    pub balances: BTreeMap<Pubkey, u64>,
    pub fail_transfers: bool,
}

impl MockToken {
    pub fn mint(&mut self, to: Pubkey, amount: u64) {
        *self.balances.entry(to).or_default() += amount;
    }

    pub fn balance_of(&self, who: &Pubkey) -> u64 {
        self.balances.get(who).copied().unwrap_or_default()
    }
}

/// Custody view of one user's wallet
pub struct MockCustody<'a> {
    pub token: &'a mut MockToken,
    pub user: Pubkey,
}

impl AssetCustody for MockCustody<'_> {
    fn collect(&mut self, amount: u64) -> Result<()> {
        require!(!self.token.fail_transfers, VaultError::TransferFailed);
        let balance = self.token.balances.entry(self.user).or_default();
        require!(*balance >= amount, VaultError::TransferFailed);
        *balance -= amount;
        Ok(())
    }

    fn pay_out(&mut self, amount: u64) -> Result<()> {
        require!(!self.token.fail_transfers, VaultError::TransferFailed);
        *self.token.balances.entry(self.user).or_default() += amount;
        Ok(())
    }
}

/// Yield source whose balance grows by `accrue`
pub struct MockYieldProtocol {
    pub key: Pubkey,
    pub asset: Pubkey,
    pub balance: u64,
    pub fail_deposits: bool,
    /// Withheld from every withdrawal, simulating a partial return
    pub withdraw_shortfall: u64,
}

impl MockYieldProtocol {
    pub fn new(asset: Pubkey) -> Self {
        Self {
            key: Pubkey::new_unique(),
            asset,
            balance: 0,
            fail_deposits: false,
            withdraw_shortfall: 0,
        }
    }

    pub fn handle(&self) -> AdapterHandle {
        AdapterHandle::reserve(self.key)
    }

    pub fn accrue(&mut self, bps: u64) {
        self.balance += self.balance * bps / 10_000;
    }
}

impl YieldAdapter for MockYieldProtocol {
    fn target(&self) -> Pubkey {
        self.key
    }

    fn asset(&self) -> Pubkey {
        self.asset
    }

    fn deposit_into(&mut self, amount: u64) -> Result<()> {
        require!(!self.fail_deposits, VaultError::AdapterFailure);
        self.balance += amount;
        Ok(())
    }

    fn withdraw_from(&mut self, amount: u64) -> Result<u64> {
        require!(self.balance >= amount, VaultError::AdapterFailure);
        self.balance -= amount;
        Ok(amount.saturating_sub(self.withdraw_shortfall))
    }

    fn current_balance(&self) -> Result<u64> {
        Ok(self.balance)
    }
}

/// One vault with one asset and a set of candidate protocols
pub struct Harness {
    pub owner: Pubkey,
    pub config: VaultConfig,
    pub asset: AssetState,
    pub protocols: Vec<MockYieldProtocol>,
    pub balances: BTreeMap<Pubkey, UserBalance>,
    pub token: MockToken,
    pub clock: i64,
}

impl Harness {
    /// `protocols` candidates are created but none is registered yet
    pub fn new(protocols: usize) -> Self {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        Self {
            owner,
            config: VaultConfig::new(owner, 255, 254),
            asset: AssetState::new(mint, 253),
            protocols: (0..protocols).map(|_| MockYieldProtocol::new(mint)).collect(),
            balances: BTreeMap::new(),
            token: MockToken::default(),
            clock: 1_700_000_000,
        }
    }

    /// Registers every candidate protocol in order
    pub fn with_registered(protocols: usize) -> Self {
        let mut harness = Self::new(protocols);
        for i in 0..protocols {
            let owner = harness.owner;
            harness.add_protocol(&owner, i).unwrap();
        }
        harness
    }

    pub fn mint(&self) -> Pubkey {
        self.asset.mint
    }

    fn tick(&mut self) -> i64 {
        self.clock += 12;
        self.clock
    }

    /// New user funded with `amount` tokens
    pub fn user(&mut self, amount: u64) -> Pubkey {
        let user = Pubkey::new_unique();
        self.token.mint(user, amount);
        user
    }

    pub fn add_protocol(&mut self, caller: &Pubkey, candidate: usize) -> Result<ProtocolAdded> {
        let now = self.tick();
        let handle = self.protocols[candidate].handle();
        vault::add_protocol(&mut self.config, &mut self.asset, caller, handle, now)
    }

    pub fn pause(&mut self) -> Result<Paused> {
        let now = self.tick();
        let owner = self.owner;
        vault::pause(&mut self.config, &owner, now)
    }

    pub fn unpause(&mut self) -> Result<Unpaused> {
        let now = self.tick();
        let owner = self.owner;
        vault::unpause(&mut self.config, &owner, now)
    }

    fn active(&self) -> usize {
        self.asset.active_index as usize
    }

    pub fn deposit(&mut self, user: &Pubkey, amount: u64) -> Result<Deposited> {
        let now = self.tick();
        let active = self.active();
        let mint = self.asset.mint;
        let balance = self
            .balances
            .entry(*user)
            .or_insert_with(|| UserBalance::new(*user, mint, 0));
        let mut custody = MockCustody {
            token: &mut self.token,
            user: *user,
        };
        vault::deposit(
            &self.config,
            &mut self.asset,
            balance,
            &mut self.protocols[active],
            &mut custody,
            amount,
            now,
        )
    }

    pub fn withdraw(&mut self, user: &Pubkey, amount: u64) -> Result<Withdrawn> {
        let now = self.tick();
        let active = self.active();
        let mint = self.asset.mint;
        let balance = self
            .balances
            .entry(*user)
            .or_insert_with(|| UserBalance::new(*user, mint, 0));
        let mut custody = MockCustody {
            token: &mut self.token,
            user: *user,
        };
        vault::withdraw(
            &mut self.asset,
            balance,
            &mut self.protocols[active],
            &mut custody,
            amount,
            now,
        )
    }

    pub fn withdraw_all(&mut self, user: &Pubkey) -> Result<Withdrawn> {
        let now = self.tick();
        let active = self.active();
        let mint = self.asset.mint;
        let balance = self
            .balances
            .entry(*user)
            .or_insert_with(|| UserBalance::new(*user, mint, 0));
        let mut custody = MockCustody {
            token: &mut self.token,
            user: *user,
        };
        vault::withdraw_all(&mut self.asset, balance, &mut self.protocols[active], &mut custody, now)
    }

    pub fn switch(&mut self, caller: &Pubkey, new_index: u8) -> Result<ProtocolSwitched> {
        let now = self.tick();
        let old = self.active();
        let new = (new_index as usize).min(self.protocols.len() - 1);

        // Out-of-range and no-op ids are handed a stand-in adapter; the
        // controller must reject them before touching it.
        let mut stand_in = MockYieldProtocol::new(self.asset.mint);
        let (from, to): (&mut MockYieldProtocol, &mut MockYieldProtocol) = if old == new {
            (&mut self.protocols[old], &mut stand_in)
        } else if old < new {
            let (head, tail) = self.protocols.split_at_mut(new);
            (&mut head[old], &mut tail[0])
        } else {
            let (head, tail) = self.protocols.split_at_mut(old);
            (&mut tail[0], &mut head[new])
        };

        vault::switch_protocol(&self.config, &mut self.asset, caller, from, to, new_index, now)
    }

    pub fn user_total_value(&self, user: &Pubkey) -> Result<u64> {
        let balance = self
            .balances
            .get(user)
            .cloned()
            .unwrap_or_else(|| UserBalance::new(*user, self.asset.mint, 0));
        vault::user_total_value(&self.asset, &balance, &self.protocols[self.active()])
    }

    pub fn calculate_shares(&self, amount: u64) -> Result<u64> {
        vault::calculate_shares(&self.asset, &self.protocols[self.active()], amount)
    }

    pub fn shares_of(&self, user: &Pubkey) -> u64 {
        self.balances.get(user).map(|b| b.shares).unwrap_or_default()
    }

    /// Value held across every adapter, registered or not
    pub fn total_value(&self) -> u64 {
        self.protocols.iter().map(|p| p.balance).sum()
    }

    pub fn sum_of_user_shares(&self) -> u64 {
        self.balances.values().map(|b| b.shares).sum()
    }

    pub fn funded_adapters(&self) -> usize {
        self.protocols.iter().filter(|p| p.balance > 0).count()
    }
}
