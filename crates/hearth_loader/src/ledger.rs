//! Per-context record of which modules were compiled with a code cache.

use std::collections::{BTreeMap, BTreeSet};

use hearth_common::ModuleId;
use hearth_engine::Value;
use serde::Serialize;

/// Two sets of module ids: compiled with an accepted cache, and compiled
/// from source text.
///
/// A module lands in "with cache" only when the engine actually consumed the
/// blob. An id can appear in both sets if it was compiled more than once
/// under different outcomes. Sets never shrink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLedger {
    compiled_with_cache: BTreeSet<ModuleId>,
    compiled_without_cache: BTreeSet<ModuleId>,
}

impl UsageLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` was compiled from an accepted code cache.
    pub fn record_with_cache(&mut self, id: &ModuleId) {
        self.compiled_with_cache.insert(id.clone());
    }

    /// Records that `id` was compiled from source text.
    pub fn record_without_cache(&mut self, id: &ModuleId) {
        self.compiled_without_cache.insert(id.clone());
    }

    /// Ids compiled from an accepted code cache.
    pub fn compiled_with_cache(&self) -> &BTreeSet<ModuleId> {
        &self.compiled_with_cache
    }

    /// Ids compiled from source text.
    pub fn compiled_without_cache(&self) -> &BTreeSet<ModuleId> {
        &self.compiled_without_cache
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.compiled_with_cache.is_empty() && self.compiled_without_cache.is_empty()
    }

    /// Snapshots the ledger as a script value: an object with
    /// `compiledWithCache` and `compiledWithoutCache` set members.
    pub fn to_value(&self) -> Value {
        let as_set = |ids: &BTreeSet<ModuleId>| {
            Value::Set(ids.iter().map(|id| id.as_str().to_string()).collect())
        };
        let mut object = BTreeMap::new();
        object.insert(
            "compiledWithCache".to_string(),
            as_set(&self.compiled_with_cache),
        );
        object.insert(
            "compiledWithoutCache".to_string(),
            as_set(&self.compiled_without_cache),
        );
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_sets() {
        let mut ledger = UsageLedger::new();
        let fs = ModuleId::new("fs");
        ledger.record_with_cache(&fs);
        ledger.record_with_cache(&fs);
        ledger.record_without_cache(&ModuleId::new("path"));
        assert_eq!(ledger.compiled_with_cache().len(), 1);
        assert!(ledger.compiled_without_cache().contains("path"));
    }

    #[test]
    fn id_may_appear_in_both_sets() {
        let mut ledger = UsageLedger::new();
        let fs = ModuleId::new("fs");
        ledger.record_with_cache(&fs);
        ledger.record_without_cache(&fs);
        assert!(ledger.compiled_with_cache().contains("fs"));
        assert!(ledger.compiled_without_cache().contains("fs"));
    }

    #[test]
    fn to_value_shape() {
        let mut ledger = UsageLedger::new();
        ledger.record_with_cache(&ModuleId::new("internal/bootstrap/loaders"));
        let Value::Object(object) = ledger.to_value() else {
            panic!("expected object");
        };
        assert_eq!(
            object["compiledWithCache"],
            Value::Set(["internal/bootstrap/loaders".to_string()].into())
        );
        assert_eq!(object["compiledWithoutCache"], Value::Set(BTreeSet::new()));
    }

    #[test]
    fn serializes_camel_case() {
        let mut ledger = UsageLedger::new();
        ledger.record_without_cache(&ModuleId::new("fs"));
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["compiledWithoutCache"], serde_json::json!(["fs"]));
        assert_eq!(json["compiledWithCache"], serde_json::json!([]));
    }
}
