//! In-memory account store
//!
//! Same contract as the SQLite store, held in a `BTreeMap` behind a single
//! lock. Used by unit tests and anywhere a throwaway store is handy.

use super::{AccountStore, StoreError, TransferOutcome};
use crate::account::{Account, NewAccount};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    accounts: BTreeMap<i64, Account>,
    last_id: i64,
}

impl Inner {
    fn find_by_number(&self, number: i64) -> Option<&Account> {
        self.accounts.values().find(|a| a.number == number)
    }

    fn id_for_number(&self, number: i64) -> Result<i64, StoreError> {
        self.find_by_number(number)
            .map(|a| a.id)
            .ok_or_else(|| StoreError::NotFound(format!("account with number [{}] not found", number)))
    }
}

/// Account store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Inner>,
}

impl MemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.find_by_number(account.number).is_some() {
            return Err(StoreError::Conflict(format!(
                "account number {} already exists",
                account.number
            )));
        }

        inner.last_id += 1;
        let account = account.into_account(inner.last_id);
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.values().cloned().collect())
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Account, StoreError> {
        let inner = self.inner.read().await;
        inner
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account {} not found", id)))
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, StoreError> {
        let inner = self.inner.read().await;
        inner.find_by_number(number).cloned().ok_or_else(|| {
            StoreError::NotFound(format!("account with number [{}] not found", number))
        })
    }

    async fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.accounts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("no account found with id {}", id))),
        }
    }

    async fn transfer(
        &self,
        from_number: i64,
        to_number: i64,
        amount: i64,
    ) -> Result<TransferOutcome, StoreError> {
        // Both balances change under one write guard.
        let mut inner = self.inner.write().await;
        let from_id = inner.id_for_number(from_number)?;
        let to_id = inner.id_for_number(to_number)?;

        let from_balance = inner.accounts[&from_id].balance;
        if from_balance < amount {
            return Err(StoreError::InsufficientFunds);
        }

        if let Some(from) = inner.accounts.get_mut(&from_id) {
            from.balance -= amount;
        }
        if let Some(to) = inner.accounts.get_mut(&to_id) {
            to.balance += amount;
        }

        Ok(TransferOutcome {
            from_balance: inner.accounts[&from_id].balance,
            to_balance: inner.accounts[&to_id].balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn new_account(number: i64, balance: i64) -> NewAccount {
        let mut account = NewAccount::new("Ann".into(), "Lee".into(), "hash".into());
        account.number = number;
        account.balance = balance;
        account
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let store = MemoryAccountStore::new();
        let created = store.create_account(new_account(42, 0)).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = store.get_account_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(store.get_account_by_number(42).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account(42, 0)).await.unwrap();
        let result = store.create_account(new_account(42, 0)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryAccountStore::new();
        let first = store.create_account(new_account(1, 0)).await.unwrap();
        store.delete_account(first.id).await.unwrap();
        let second = store.create_account(new_account(2, 0)).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = MemoryAccountStore::new();
        let created = store.create_account(new_account(7, 0)).await.unwrap();

        assert!(store.delete_account(created.id).await.is_ok());
        match store.delete_account(created.id).await {
            Err(StoreError::NotFound(_)) => {}
            other => panic!("Expected NotFound, got: {:?}", other),
        }
        assert!(matches!(
            store.get_account_by_id(created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transfer_moves_balance() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account(1, 100)).await.unwrap();
        store.create_account(new_account(2, 5)).await.unwrap();

        let outcome = store.transfer(1, 2, 40).await.unwrap();
        assert_eq!(outcome.from_balance, 60);
        assert_eq!(outcome.to_balance, 45);
    }

    #[tokio::test]
    async fn test_transfer_rejects_overdraft_without_changes() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account(1, 10)).await.unwrap();
        store.create_account(new_account(2, 0)).await.unwrap();

        let result = store.transfer(1, 2, 11).await;
        assert!(matches!(result, Err(StoreError::InsufficientFunds)));
        assert_eq!(store.get_account_by_number(1).await.unwrap().balance, 10);
        assert_eq!(store.get_account_by_number(2).await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_transfer_to_missing_account() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account(1, 10)).await.unwrap();

        let result = store.transfer(1, 999, 5).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.get_account_by_number(1).await.unwrap().balance, 10);
    }

    #[tokio::test]
    async fn test_concurrent_transfers_conserve_total() {
        let store = Arc::new(MemoryAccountStore::new());
        store.create_account(new_account(1, 1_000)).await.unwrap();
        store.create_account(new_account(2, 1_000)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            let (from, to) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
            handles.push(tokio::spawn(async move { store.transfer(from, to, 30).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let accounts = store.get_accounts().await.unwrap();
        let total: i64 = accounts.iter().map(|a| a.balance).sum();
        assert_eq!(total, 2_000);
        let numbers: HashSet<i64> = accounts.iter().map(|a| a.number).collect();
        assert_eq!(numbers.len(), 2);
    }
}
