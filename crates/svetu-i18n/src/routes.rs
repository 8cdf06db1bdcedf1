//! Route prefix to module tables.

use crate::error::I18nResult;
use crate::locale::Locale;
use crate::module::ModuleName;
use serde::Serialize;
use svetu_config::RouteModules;

/// Ordered, duplicate-free list of modules a page needs. The base module is
/// always first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequiredModuleSet {
    modules: Vec<ModuleName>,
}

impl RequiredModuleSet {
    fn with_base(base: &ModuleName) -> Self {
        Self {
            modules: vec![base.clone()],
        }
    }

    fn push(&mut self, module: &ModuleName) {
        if !self.modules.contains(module) {
            self.modules.push(module.clone());
        }
    }

    /// Modules in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, ModuleName> {
        self.modules.iter()
    }

    /// Modules in load order.
    pub fn as_slice(&self) -> &[ModuleName] {
        &self.modules
    }

    /// Whether `name` is part of the set.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m == name)
    }

    /// Module names as plain strings.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(ModuleName::as_str).collect()
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Always `false`: the base module is always present.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Consumes the set.
    pub fn into_vec(self) -> Vec<ModuleName> {
        self.modules
    }
}

impl IntoIterator for RequiredModuleSet {
    type Item = ModuleName;
    type IntoIter = std::vec::IntoIter<ModuleName>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RequiredModuleSet {
    type Item = &'a ModuleName;
    type IntoIter = std::slice::Iter<'a, ModuleName>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteEntry {
    /// Stored without a trailing slash; the root route is the empty string.
    prefix: String,
    modules: Vec<ModuleName>,
}

impl RouteEntry {
    fn matches(&self, path: &str) -> bool {
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Static mapping from URL path prefixes to the modules a page needs.
///
/// A prefix matches a path when the path equals it or continues with a `/`
/// after it, so `/marketplace` matches `/marketplace/123` but not
/// `/marketplaces`. The longest matching prefix wins. Query strings,
/// fragments and a leading locale segment (`/sr/marketplace`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    base: ModuleName,
    /// Sorted by descending prefix length.
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Creates a table with no routes; every path resolves to `base` alone.
    pub const fn new(base: ModuleName) -> Self {
        Self {
            base,
            entries: Vec::new(),
        }
    }

    /// Builds a table from configuration rows.
    ///
    /// # Errors
    ///
    /// Fails if a row names an invalid module.
    pub fn from_rows(base: ModuleName, rows: &[RouteModules]) -> I18nResult<Self> {
        let mut table = Self::new(base);
        for row in rows {
            let modules = row
                .modules
                .iter()
                .map(|name| ModuleName::new(name.as_str()))
                .collect::<I18nResult<Vec<_>>>()?;
            table.insert(&row.prefix, modules);
        }
        Ok(table)
    }

    /// Adds or replaces the modules for a prefix.
    pub fn insert(&mut self, prefix: &str, modules: Vec<ModuleName>) {
        let prefix = normalize_prefix(prefix);
        self.entries.retain(|entry| entry.prefix != prefix);
        self.entries.push(RouteEntry { prefix, modules });
        self.entries
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()).then_with(|| a.prefix.cmp(&b.prefix)));
    }

    /// The module every page needs.
    pub const fn base(&self) -> &ModuleName {
        &self.base
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Modules of the longest prefix matching `pathname`, without the base.
    pub fn matched(&self, pathname: &str) -> Option<&[ModuleName]> {
        let path = normalize_path(pathname);
        self.entries
            .iter()
            .find(|entry| entry.matches(&path))
            .map(|entry| entry.modules.as_slice())
    }

    /// Base module followed by the modules of the matching route. Paths
    /// that match no route need only the base module.
    pub fn required_modules(&self, pathname: &str) -> RequiredModuleSet {
        let mut set = RequiredModuleSet::with_base(&self.base);
        for module in self.matched(pathname).unwrap_or_default() {
            set.push(module);
        }
        set
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Cuts query and fragment, ensures a leading slash and strips a leading
/// locale segment.
fn normalize_path(pathname: &str) -> String {
    let end = pathname.find(['?', '#']).unwrap_or(pathname.len());
    let path = pathname[..end].trim();
    let path = path.strip_prefix('/').unwrap_or(path);

    let (first, rest) = path.split_once('/').unwrap_or((path, ""));
    if Locale::from_code(first).is_some() {
        format!("/{rest}")
    } else {
        format!("/{path}")
    }
}
