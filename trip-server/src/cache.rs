//! Caching layer for product catalog lookups.
//!
//! The products on offer change slowly and barely differ between points a
//! few hundred metres apart, so lookups are keyed by coordinates rounded to
//! a grid cell. Only successful, non-empty answers are cached; an empty
//! catalog is asked again next time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::Coordinates;
use crate::ride::{Product, RideError};
use crate::trips::ProductCatalog;

/// Cache key: latitude and longitude scaled by `10^decimals` and rounded.
type CellKey = (i64, i64);

/// Cached catalog entry.
type CatalogEntry = Arc<Vec<Product>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Decimal places coordinates are rounded to before lookup.
    pub decimals: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
            decimals: 2,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, n: u64) -> Self {
        self.max_capacity = n;
        self
    }
}

/// Cache for product catalogs.
pub struct CatalogCache {
    /// Product lists keyed by grid cell.
    cells: MokaCache<CellKey, CatalogEntry>,

    /// `10^decimals`.
    scale: f64,
}

impl CatalogCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cells = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            cells,
            scale: 10f64.powi(config.decimals as i32),
        }
    }

    /// Grid cell containing `at`.
    fn cell(&self, at: Coordinates) -> CellKey {
        (
            (at.lat() * self.scale).round() as i64,
            (at.lng() * self.scale).round() as i64,
        )
    }

    pub async fn get(&self, at: Coordinates) -> Option<CatalogEntry> {
        self.cells.get(&self.cell(at)).await
    }

    pub async fn insert(&self, at: Coordinates, entry: CatalogEntry) {
        self.cells.insert(self.cell(at), entry).await;
    }
}

/// Product catalog with caching.
///
/// Wraps any [`ProductCatalog`] and caches non-empty answers per grid cell.
pub struct CachedCatalog<C> {
    inner: C,
    cache: CatalogCache,
}

impl<C: ProductCatalog> CachedCatalog<C> {
    pub fn new(inner: C, config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: CatalogCache::new(config),
        }
    }
}

impl<C: ProductCatalog> ProductCatalog for CachedCatalog<C> {
    async fn products(&self, at: Coordinates) -> Result<Vec<Product>, RideError> {
        if let Some(cached) = self.cache.get(at).await {
            trace!(%at, "product catalog cache hit");
            return Ok(cached.as_ref().clone());
        }

        let products = self.inner.products(at).await?;
        if !products.is_empty() {
            self.cache.insert(at, Arc::new(products.clone())).await;
        }
        Ok(products)
    }
}
