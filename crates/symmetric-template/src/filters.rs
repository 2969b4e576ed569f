//! Named text filters
//!
//! A filter is a pure `&str -> String` transform applied to the output text
//! of a variable. Filters are looked up by name when a template is rendered,
//! so templates may be compiled before the filters they use are registered.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use once_cell::sync::Lazy;
use tracing::warn;

/// A text filter
pub type FilterFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Process-wide registry used by [`Template::render`](crate::Template::render)
///
/// Writers copy the table and swap it in, so renders keep the snapshot they
/// started with and filters may register other filters.
static GLOBAL_FILTERS: Lazy<RwLock<Arc<FilterRegistry>>> =
    Lazy::new(|| RwLock::new(Arc::new(FilterRegistry::new())));

/// Name to filter table
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// Create a registry holding the built-in filters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("upper", |s: &str| s.to_uppercase());
        registry.register("lower", |s: &str| s.to_lowercase());
        registry.register("title", title);
        registry.register("capfirst", capfirst);
        registry.register("lowerfirst", lowerfirst);
        registry.register("camel", |s: &str| s.to_lower_camel_case());
        registry.register("pascal", |s: &str| s.to_pascal_case());
        registry.register("snake", |s: &str| s.to_snake_case());
        registry.register("kebab", |s: &str| s.to_kebab_case());
        registry
    }

    /// Create a registry with no filters at all
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Add a filter, replacing any filter of the same name
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let name = name.into();
        if self.filters.insert(name.clone(), Arc::new(filter)).is_some() {
            warn!(filter = %name, "replaced existing filter");
        }
    }

    /// Filter by name
    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    /// Whether a filter is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// Register a filter in the process-wide registry
///
/// Registration is meant to happen during start-up, before templates using
/// the filter are rendered.
pub fn register_filter<F>(name: impl Into<String>, filter: F)
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let mut registry = GLOBAL_FILTERS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *registry).register(name, filter);
}

/// Current snapshot of the process-wide registry
pub fn global_filters() -> Arc<FilterRegistry> {
    let registry = GLOBAL_FILTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&*registry)
}

/// Run `f` against a snapshot of the process-wide registry
///
/// No lock is held while `f` runs.
pub fn with_global_filters<R>(f: impl FnOnce(&FilterRegistry) -> R) -> R {
    let registry = global_filters();
    f(&registry)
}

/// Uppercase the first letter of each word and lowercase the rest
///
/// A letter starts a word when the previous character is not a letter, except
/// after a digit (`1st`) or an apostrophe inside a word (`don't`).
fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev: Option<char> = None;
    let mut before_prev: Option<char> = None;

    for c in s.chars() {
        let starts_word = match prev {
            None => true,
            Some(p) if p.is_alphabetic() || p.is_numeric() => false,
            Some('\'') => !before_prev.is_some_and(char::is_lowercase),
            Some(_) => true,
        };
        if starts_word {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        before_prev = out.chars().nth_back(1);
        prev = Some(c);
    }

    out
}

fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowerfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(registry: &FilterRegistry, name: &str, input: &str) -> String {
        registry.get(name).map(|f| f(input)).unwrap()
    }

    #[test]
    fn test_builtin_case_folding() {
        let registry = FilterRegistry::new();
        assert_eq!(apply(&registry, "upper", "AbC"), "ABC");
        assert_eq!(apply(&registry, "lower", "AbC"), "abc");
        assert_eq!(apply(&registry, "title", "firstName"), "Firstname");
        assert_eq!(apply(&registry, "title", "date of BIRTH"), "Date Of Birth");
    }

    #[test]
    fn test_title_word_boundaries() {
        assert_eq!(title("user_id"), "User_Id");
        assert_eq!(title("1st place"), "1st Place");
        assert_eq!(title("don't stop"), "Don't Stop");
        assert_eq!(title("o'NEIL"), "O'Neil");
        assert_eq!(title(""), "");
    }

    #[test]
    fn test_builtin_first_letter() {
        let registry = FilterRegistry::new();
        assert_eq!(apply(&registry, "capfirst", "userProfile"), "UserProfile");
        assert_eq!(apply(&registry, "lowerfirst", "UserProfile"), "userProfile");
        assert_eq!(apply(&registry, "capfirst", ""), "");
    }

    #[test]
    fn test_builtin_case_conversion() {
        let registry = FilterRegistry::new();
        assert_eq!(apply(&registry, "camel", "date_created"), "dateCreated");
        assert_eq!(apply(&registry, "pascal", "date_created"), "DateCreated");
        assert_eq!(apply(&registry, "snake", "DateCreated"), "date_created");
        assert_eq!(apply(&registry, "kebab", "DateCreated"), "date-created");
    }

    #[test]
    fn test_empty_registry() {
        let registry = FilterRegistry::empty();
        assert!(registry.names().is_empty());
        assert!(!registry.contains("upper"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FilterRegistry::empty();
        registry.register("wrap", |s: &str| format!("[{}]", s));
        registry.register("wrap", |s: &str| format!("<{}>", s));
        assert_eq!(apply(&registry, "wrap", "x"), "<x>");
        assert_eq!(registry.names(), vec!["wrap"]);
    }

    #[test]
    fn test_global_registration() {
        register_filter("test_reverse_global", |s: &str| s.chars().rev().collect());
        let result = with_global_filters(|registry| {
            registry.get("test_reverse_global").map(|f| f("abc"))
        });
        assert_eq!(result.as_deref(), Some("cba"));
    }

    #[test]
    fn test_registration_from_inside_a_filter() {
        register_filter("test_registers_sibling", |s: &str| {
            register_filter("test_registered_late", |s: &str| s.to_string());
            s.to_string()
        });
        let output = with_global_filters(|registry| {
            registry.get("test_registers_sibling").map(|f| f("x"))
        });
        assert_eq!(output.as_deref(), Some("x"));
        assert!(global_filters().contains("test_registered_late"));
    }
}
