//! Environment-driven configuration.

use anyhow::{bail, Context};

use skuforge_catalog::KeyCollisionPolicy;

use crate::document_store::PageRequest;

pub const KEY_COLLISION_VAR: &str = "SKUFORGE_KEY_COLLISION";
pub const DEFAULT_PAGE_SIZE_VAR: &str = "SKUFORGE_DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_VAR: &str = "SKUFORGE_MAX_PAGE_SIZE";

/// Caller-side paging parameters; unset fields fall back to the config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn first(limit: usize) -> Self {
        Self {
            offset: None,
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    pub key_collision: KeyCollisionPolicy,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            key_collision: KeyCollisionPolicy::Reject,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl CatalogConfig {
    /// Read configuration from the process environment; unset variables
    /// keep their defaults, malformed ones are errors.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let key_collision = match lookup(KEY_COLLISION_VAR) {
            Some(raw) => raw
                .parse::<KeyCollisionPolicy>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {KEY_COLLISION_VAR}: '{raw}'"))?,
            None => defaults.key_collision,
        };

        let default_page_size = parse_size(&lookup, DEFAULT_PAGE_SIZE_VAR, defaults.default_page_size)?;
        let max_page_size = parse_size(&lookup, MAX_PAGE_SIZE_VAR, defaults.max_page_size)?;

        if default_page_size > max_page_size {
            bail!(
                "{DEFAULT_PAGE_SIZE_VAR} ({default_page_size}) exceeds {MAX_PAGE_SIZE_VAR} ({max_page_size})"
            );
        }

        Ok(Self {
            key_collision,
            default_page_size,
            max_page_size,
        })
    }

    /// Page window for a caller query: missing limit takes `default_page_size`,
    /// any limit is clamped to `max_page_size`.
    pub fn page(&self, query: PageQuery) -> PageRequest {
        PageRequest::new(
            query.offset.unwrap_or(0),
            query.limit.unwrap_or(self.default_page_size),
        )
        .clamped(self.max_page_size)
    }
}

fn parse_size(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: usize,
) -> anyhow::Result<usize> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid {name}: '{raw}'"))?;
    if value == 0 {
        bail!("{name} must be at least 1");
    }
    Ok(value)
}
