//! Paginated, filtered and sorted listing of one owner's collection.
//!
//! Sort inputs arrive as raw strings and are resolved leniently: an unknown
//! `sortBy` means `caughtAt` and anything but `asc` means descending. Page
//! numbers are validated since a zero page or page size has no meaning.

use crate::catalog::CatalogStore;
use crate::errors::{OwnershipResult, ValidationError};
use crate::store::{
    OwnershipStore, PageRequest, RecordSort, ScanFilter, ScanRequest, SortField, SortOrder,
};
use crate::views::{OwnedPokemonView, PagedResult};
use schema::OwnershipRecord;
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A list request as received from the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub favorite_only: Option<bool>,
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
}

/// What the listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Record(SortField),
    /// The joined catalog name
    Name,
}

impl SortKey {
    pub fn resolve(sort_by: Option<&str>) -> Self {
        let Some(raw) = sort_by else {
            return SortKey::Record(SortField::CaughtAt);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "level" => SortKey::Record(SortField::Level),
            "experience" => SortKey::Record(SortField::Experience),
            "name" => SortKey::Name,
            _ => SortKey::Record(SortField::CaughtAt),
        }
    }
}

pub fn resolve_order(sort_order: Option<&str>) -> SortOrder {
    match sort_order {
        Some(raw) if raw.trim().eq_ignore_ascii_case("asc") => SortOrder::Ascending,
        _ => SortOrder::Descending,
    }
}

impl ListQuery {
    pub fn filter(&self) -> ScanFilter {
        ScanFilter {
            favorite_only: self.favorite_only.unwrap_or(false),
            min_level: self.min_level,
            max_level: self.max_level,
        }
    }

    pub fn page_request(&self, default_page_size: u32) -> Result<PageRequest, ValidationError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(default_page_size);
        if page == 0 {
            return Err(ValidationError::ZeroPagination { field: "page" });
        }
        if page_size == 0 {
            return Err(ValidationError::ZeroPagination { field: "pageSize" });
        }
        Ok(PageRequest { page, page_size })
    }
}

/// Run a list request against the store, joining each record with the catalog.
///
/// Records whose species has vanished from the catalog still count towards
/// `total_count` but are left out of `items`. They are dropped after the page
/// is cut, so such a page can hold fewer than `page_size` items even when
/// later pages exist.
pub async fn list(
    store: &dyn OwnershipStore,
    catalog: &dyn CatalogStore,
    owner_id: &str,
    query: &ListQuery,
    default_page_size: u32,
) -> OwnershipResult<PagedResult<OwnedPokemonView>> {
    let page = query.page_request(default_page_size)?;
    let filter = query.filter();
    let order = resolve_order(query.sort_order.as_deref());

    let (views, total_count) = match SortKey::resolve(query.sort_by.as_deref()) {
        SortKey::Record(field) => {
            let request = ScanRequest {
                filter,
                sort: RecordSort { field, order },
                page,
            };
            let scanned = store.scan(owner_id, &request).await?;
            (join(catalog, scanned.records).await?, scanned.total_count)
        }
        SortKey::Name => {
            let matching: Vec<OwnershipRecord> = store
                .owner_records(owner_id)
                .await?
                .into_iter()
                .filter(|record| filter.matches(record))
                .collect();
            let total_count = matching.len() as u64;

            let mut views = join(catalog, matching).await?;
            views.sort_by(|a, b| {
                order
                    .apply(a.species_name().cmp(b.species_name()))
                    .then_with(|| a.record.species_id.cmp(&b.record.species_id))
            });
            (page.slice(views), total_count)
        }
    };

    let items: Vec<OwnedPokemonView> = views
        .into_iter()
        .filter(|view| {
            if view.pokemon.is_none() {
                tracing::warn!(
                    owner_id,
                    species_id = view.record.species_id,
                    "owned species missing from catalog, leaving it out of the listing"
                );
            }
            view.pokemon.is_some()
        })
        .collect();

    Ok(PagedResult {
        items,
        total_count,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages(total_count),
    })
}

async fn join(
    catalog: &dyn CatalogStore,
    records: Vec<OwnershipRecord>,
) -> OwnershipResult<Vec<OwnedPokemonView>> {
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        let pokemon = catalog.get_by_id(record.species_id).await?;
        views.push(OwnedPokemonView::new(record, pokemon));
    }
    Ok(views)
}
