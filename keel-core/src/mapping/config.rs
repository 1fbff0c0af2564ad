use crate::PrimitiveNullPolicy;
use std::collections::HashMap;

/// How result columns are matched to properties.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    /// Fail when a column of a multi column result matches no property.
    pub strict: bool,
    /// Disable the case insensitive fallback when matching names.
    pub case_sensitive: bool,
    /// Try the snake_case form of a column label (`userName` -> `user_name`).
    pub auto_derive_column_names: bool,
    /// Column label to property name (or dotted path).
    pub column_aliases: HashMap<String, String>,
    pub primitive_null_policy: PrimitiveNullPolicy,
    /// Maximum number of cached extractors, unbounded when `None`.
    pub extractor_cache_capacity: Option<usize>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            strict: true,
            case_sensitive: false,
            auto_derive_column_names: true,
            column_aliases: HashMap::new(),
            primitive_null_policy: PrimitiveNullPolicy::Ignore,
            extractor_cache_capacity: None,
        }
    }
}

impl MappingConfig {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
    pub fn auto_derive_column_names(mut self, auto_derive: bool) -> Self {
        self.auto_derive_column_names = auto_derive;
        self
    }
    pub fn alias(mut self, column: impl Into<String>, property: impl Into<String>) -> Self {
        self.column_aliases.insert(column.into(), property.into());
        self
    }
    pub fn primitive_null_policy(mut self, policy: PrimitiveNullPolicy) -> Self {
        self.primitive_null_policy = policy;
        self
    }
    pub fn extractor_cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.extractor_cache_capacity = capacity;
        self
    }
    /// The property name configured for `column`.
    pub fn alias_of(&self, column: &str) -> Option<&str> {
        if let Some(v) = self.column_aliases.get(column) {
            return Some(v);
        }
        if self.case_sensitive {
            return None;
        }
        self.column_aliases
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MappingConfig::default();
        assert!(config.strict);
        assert!(!config.case_sensitive);
        assert!(config.auto_derive_column_names);
        assert!(config.column_aliases.is_empty());
        assert!(matches!(
            config.primitive_null_policy,
            PrimitiveNullPolicy::Ignore
        ));
        assert_eq!(config.extractor_cache_capacity, None);
    }

    #[test]
    fn aliases() {
        let config = MappingConfig::default().alias("USER_ID", "id");
        assert_eq!(config.alias_of("USER_ID"), Some("id"));
        assert_eq!(config.alias_of("user_id"), Some("id"));
        let config = config.case_sensitive(true);
        assert_eq!(config.alias_of("user_id"), None);
    }
}
