//! Trading pair -> fallback asset id translation

use std::collections::HashMap;

/// Built-in pairs the fallback source knows under a different id
const DEFAULT_COIN_IDS: [(&str, &str); 10] = [
    ("BTCUSDT", "bitcoin"),
    ("ETHUSDT", "ethereum"),
    ("ADAUSDT", "cardano"),
    ("SOLUSDT", "solana"),
    ("DOTUSDT", "polkadot"),
    ("LINKUSDT", "chainlink"),
    ("MATICUSDT", "polygon"),
    ("AVAXUSDT", "avalanche-2"),
    ("ATOMUSDT", "cosmos"),
    ("LTCUSDT", "litecoin"),
];

/// Injectable symbol table; keys are stored uppercase
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMap {
    ids: HashMap<String, String>,
}

impl SymbolMap {
    /// Empty table: every lookup goes through the suffix heuristic
    pub fn empty() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    /// Built-in table with `overrides` layered on top
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut map = Self::default();
        for (symbol, id) in overrides {
            map.insert(symbol, id);
        }
        map
    }

    pub fn insert(&mut self, symbol: &str, coin_id: &str) {
        self.ids
            .insert(symbol.trim().to_uppercase(), coin_id.trim().to_string());
    }

    /// Resolve a trading pair; unmapped pairs drop the `usdt` quote
    pub fn coin_id(&self, symbol: &str) -> String {
        let key = symbol.trim().to_uppercase();
        match self.ids.get(&key) {
            Some(id) => id.clone(),
            None => key.to_lowercase().replace("usdt", ""),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for SymbolMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (symbol, id) in DEFAULT_COIN_IDS {
            map.insert(symbol, id);
        }
        map
    }
}
