//! # Chain and Token Registries
//!
//! Read-only directories of supported chains and tradeable tokens.
//!
//! Both registries are built once from configuration and never mutated
//! afterwards, so they can be shared across concurrent calls without
//! locks. Adding a chain or token requires a restart with updated
//! configuration.

use crate::domain::chain::{Chain, ChainId};
use crate::domain::token::{same_address, Token};
use crate::error::{CoreError, CoreResult};
use crate::infrastructure::config::CoreConfig;
use std::collections::HashMap;

/// Directory of supported chains, looked up by numeric id.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, Chain>,
}

impl ChainRegistry {
    /// Builds a registry from chain descriptors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any descriptor fails validation or a
    /// chain id appears twice.
    pub fn new(chains: Vec<Chain>) -> CoreResult<Self> {
        let mut map = HashMap::with_capacity(chains.len());

        for chain in chains {
            chain.validate()?;
            let id = chain.id;
            if map.insert(id, chain).is_some() {
                return Err(CoreError::invalid_input(format!(
                    "duplicate chain id {}",
                    id
                )));
            }
        }

        Ok(Self { chains: map })
    }

    /// Looks up a chain by id.
    #[must_use]
    pub fn get(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(&id)
    }

    /// Looks up a chain by id, failing when unregistered.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the chain is not registered.
    pub fn chain_by_id(&self, id: ChainId) -> CoreResult<&Chain> {
        self.get(id)
            .ok_or_else(|| CoreError::not_found(format!("chain {} is not registered", id)))
    }

    /// Returns true if the chain is registered.
    #[must_use]
    pub fn contains(&self, id: ChainId) -> bool {
        self.chains.contains_key(&id)
    }

    /// Iterates over all registered chains.
    pub fn all(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    /// Returns the number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if no chains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Directory of tradeable tokens, grouped per chain.
///
/// Tokens keep their configuration order within a chain.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    by_chain: HashMap<ChainId, Vec<Token>>,
}

impl TokenRegistry {
    /// Builds a registry from token descriptors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any token fails validation, references
    /// a chain absent from `chains`, or duplicates a (chain, address)
    /// pair.
    pub fn new(tokens: Vec<Token>, chains: &ChainRegistry) -> CoreResult<Self> {
        let mut by_chain: HashMap<ChainId, Vec<Token>> = HashMap::new();

        for token in tokens {
            token.validate()?;

            if !chains.contains(token.chain_id) {
                return Err(CoreError::invalid_input(format!(
                    "token '{}' references unknown chain {}",
                    token.symbol, token.chain_id
                )));
            }

            let entries = by_chain.entry(token.chain_id).or_default();
            if entries.iter().any(|t| t.same_asset(&token)) {
                return Err(CoreError::invalid_input(format!(
                    "duplicate token {} on chain {}",
                    token.address, token.chain_id
                )));
            }

            entries.push(token);
        }

        Ok(Self { by_chain })
    }

    /// Returns the tokens registered on a chain, in configuration
    /// order. Unknown chains yield an empty slice.
    #[must_use]
    pub fn tokens_for_chain(&self, chain_id: ChainId) -> &[Token] {
        self.by_chain
            .get(&chain_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a token by address on a chain, case-insensitively.
    #[must_use]
    pub fn token_by_address(&self, chain_id: ChainId, address: &str) -> Option<&Token> {
        self.tokens_for_chain(chain_id)
            .iter()
            .find(|t| same_address(&t.address, address))
    }

    /// Looks up a token by address, failing when unregistered.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no token with that address exists on the
    /// chain.
    pub fn require_token(&self, chain_id: ChainId, address: &str) -> CoreResult<&Token> {
        self.token_by_address(chain_id, address).ok_or_else(|| {
            CoreError::not_found(format!("no token {} on chain {}", address, chain_id))
        })
    }

    /// Returns the total number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_chain.values().map(Vec::len).sum()
    }

    /// Returns true if no tokens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_chain.values().all(Vec::is_empty)
    }
}

/// Builds the registry pair from one configuration.
///
/// # Errors
///
/// Returns `InvalidInput` if any chain or token entry is invalid.
pub fn build_registries(config: CoreConfig) -> CoreResult<(ChainRegistry, TokenRegistry)> {
    let chains = ChainRegistry::new(config.chains)?;
    let tokens = TokenRegistry::new(config.tokens, &chains)?;
    tracing::info!(
        "Registered {} chains and {} tokens",
        chains.len(),
        tokens.len()
    );
    Ok((chains, tokens))
}
