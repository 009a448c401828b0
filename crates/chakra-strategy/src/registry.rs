use crate::error::StrategyError;
use crate::strategy::Strategy;

/// A factory closure that builds a fresh strategy instance from a JSON
/// parameter-override blob (the CLI's `--params`, spec §6). Each call
/// produces an independent instance — strategies carry mutable per-symbol
/// state, so instances must never be shared across symbols.
pub type StrategyFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError> + Send + Sync>;

/// Static metadata about a registered strategy, queryable without
/// instantiating it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyMeta {
    pub key: String,
    pub description: String,
}

struct Entry {
    meta: StrategyMeta,
    factory: StrategyFactory,
}

/// Maps string keys to strategy constructors (spec §4.3: "a registry maps
/// string keys to strategy constructors with parameter overrides").
/// Insertion order is preserved for `list()`.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<Entry>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, key: &str, description: &str, factory: F)
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        self.entries.push(Entry {
            meta: StrategyMeta {
                key: key.to_string(),
                description: description.to_string(),
            },
            factory: Box::new(factory),
        });
    }

    pub fn list(&self) -> Vec<&StrategyMeta> {
        self.entries.iter().map(|e| &e.meta).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.meta.key == key)
    }

    /// Build a fresh strategy for `key`, applying `params` as overrides.
    /// Every call instantiates a brand-new strategy (no shared state
    /// across symbols, per spec §4.3).
    pub fn build(
        &self,
        key: &str,
        params: &serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.meta.key == key)
            .ok_or_else(|| StrategyError::UnknownStrategy(key.to_string()))?;
        (entry.factory)(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::IndicatorBinder;
    use crate::strategy::{BarContext, BarDirective, StrategyState};
    use chakra_schemas::Series;

    struct NoopStrategy;
    impl Strategy for NoopStrategy {
        fn initialize(
            &mut self,
            _series: &Series,
            _binder: &mut IndicatorBinder,
        ) -> Result<(), StrategyError> {
            Ok(())
        }
        fn on_bar(&mut self, _ctx: &BarContext, _state: &StrategyState) -> BarDirective {
            BarDirective::default()
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        let registry = StrategyRegistry::new();
        let err = registry.build("nope", &serde_json::Value::Null);
        assert_eq!(err.unwrap_err(), StrategyError::UnknownStrategy("nope".to_string()));
    }

    #[test]
    fn build_produces_independent_instances() {
        let mut registry = StrategyRegistry::new();
        registry.register("noop", "does nothing", |_params| Ok(Box::new(NoopStrategy)));
        assert!(registry.contains("noop"));
        let a = registry.build("noop", &serde_json::Value::Null);
        let b = registry.build("noop", &serde_json::Value::Null);
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut registry = StrategyRegistry::new();
        registry.register("a", "first", |_| Ok(Box::new(NoopStrategy)));
        registry.register("b", "second", |_| Ok(Box::new(NoopStrategy)));
        let keys: Vec<&str> = registry.list().iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
    }
}
