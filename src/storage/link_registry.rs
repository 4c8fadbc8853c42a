//! In-memory link registry
//!
//! Holds every live `ShortLink` and two secondary indices (owner+URL and
//! owner). Records sit behind their own mutex inside a sharded map, so clicks
//! on unrelated codes never contend. Structural changes (create, delete,
//! sweep) serialize on the owner-index lock and touch the by-code map inside
//! it: inserts go to the owner index first, removals leave the by-code map
//! first. A by-code hit therefore always has its owner-index entries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{LinkshelfError, Result};
use crate::storage::models::{LinkState, ShortLink};
use crate::utils::{Clock, CodeGenerator, normalize_url, validate_url};

/// Registry settings taken from `[links]`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub code_length: usize,
    pub default_ttl: Duration,
    pub default_click_limit: u32,
}

impl RegistryConfig {
    pub fn from_links_config(links: &crate::config::LinksConfig) -> Self {
        Self {
            code_length: links.code_length,
            default_ttl: Duration::hours(i64::from(links.default_ttl_hours)),
            default_click_limit: links.default_click_limit,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::from_links_config(&crate::config::LinksConfig::default())
    }
}

/// Counts by derived state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub limit_exceeded: usize,
}

#[derive(Debug)]
struct LinkSlot {
    link: ShortLink,
    // Set under the slot lock when the record leaves the registry.
    removed: bool,
}

type LinkCell = Arc<Mutex<LinkSlot>>;

#[derive(Debug, Default)]
struct OwnerIndex {
    by_owner_url: HashMap<(Uuid, String), String>,
    by_owner: HashMap<Uuid, Vec<String>>,
}

impl OwnerIndex {
    fn attach(&mut self, link: &ShortLink) {
        self.by_owner_url.insert(
            (link.owner_id, link.original_url.clone()),
            link.short_code.clone(),
        );
        self.by_owner
            .entry(link.owner_id)
            .or_default()
            .push(link.short_code.clone());
    }

    fn detach(&mut self, owner_id: Uuid, original_url: &str, code: &str) {
        let key = (owner_id, original_url.to_string());
        if self.by_owner_url.get(&key).is_some_and(|c| c == code) {
            self.by_owner_url.remove(&key);
        }

        if let Some(codes) = self.by_owner.get_mut(&owner_id) {
            codes.retain(|c| c != code);
            if codes.is_empty() {
                self.by_owner.remove(&owner_id);
            }
        }
    }
}

pub struct LinkRegistry {
    records: DashMap<String, LinkCell>,
    index: RwLock<OwnerIndex>,
    codes: Arc<CodeGenerator>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
}

impl LinkRegistry {
    pub fn new(config: RegistryConfig, codes: Arc<CodeGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            index: RwLock::new(OwnerIndex::default()),
            codes,
            clock,
            config,
        }
    }

    fn cell(&self, code: &str) -> Option<LinkCell> {
        self.records.get(code).map(|entry| Arc::clone(entry.value()))
    }

    fn not_found(code: &str) -> LinkshelfError {
        LinkshelfError::not_found(format!("Link '{}' not found", code))
    }

    /// Create a link, or return the owner's existing link for the same URL.
    pub fn create(
        &self,
        url: &str,
        owner_id: Uuid,
        click_limit: Option<u32>,
    ) -> Result<ShortLink> {
        let url = normalize_url(url);
        validate_url(&url)
            .map_err(|e| LinkshelfError::invalid_url(format!("'{}': {}", url, e)))?;

        let mut index = self.index.write();

        if let Some(code) = index.by_owner_url.get(&(owner_id, url.clone()))
            && let Some(cell) = self.cell(code)
        {
            let existing = cell.lock().link.clone();
            debug!(
                "LinkRegistry: reusing '{}' for owner {} -> '{}'",
                existing.short_code, owner_id, url
            );
            return Ok(existing);
        }

        let code = self.codes.generate(self.config.code_length)?;
        let click_limit = click_limit
            .filter(|&limit| limit > 0)
            .unwrap_or(self.config.default_click_limit);

        let link = match ShortLink::new(
            url,
            code.clone(),
            owner_id,
            click_limit,
            self.config.default_ttl,
            self.clock.now(),
        ) {
            Ok(link) => link,
            Err(e) => {
                self.codes.release(&code);
                return Err(e);
            }
        };

        index.attach(&link);
        self.records.insert(
            link.short_code.clone(),
            Arc::new(Mutex::new(LinkSlot {
                link: link.clone(),
                removed: false,
            })),
        );

        info!(
            "LinkRegistry: created '{}' -> '{}' (owner {}, limit {})",
            link.short_code, link.original_url, owner_id, link.click_limit
        );
        Ok(link)
    }

    /// Resolve a code to its URL, counting one click.
    pub fn resolve(&self, code: &str) -> Result<String> {
        let cell = self.cell(code).ok_or_else(|| Self::not_found(code))?;
        let mut slot = cell.lock();
        if slot.removed {
            return Err(Self::not_found(code));
        }

        slot.link.register_click(self.clock.now())?;
        debug!(
            "LinkRegistry: '{}' clicked ({}/{})",
            code, slot.link.clicks_count, slot.link.click_limit
        );
        Ok(slot.link.original_url.clone())
    }

    /// Snapshot of a record, without an ownership check.
    pub fn peek(&self, code: &str) -> Option<ShortLink> {
        let cell = self.cell(code)?;
        let slot = cell.lock();
        (!slot.removed).then(|| slot.link.clone())
    }

    fn owned_cell(&self, code: &str, owner_id: Uuid) -> Result<LinkCell> {
        let cell = self.cell(code).ok_or_else(|| Self::not_found(code))?;
        let owner = {
            let slot = cell.lock();
            if slot.removed {
                return Err(Self::not_found(code));
            }
            slot.link.owner_id
        };
        if owner != owner_id {
            return Err(LinkshelfError::access_denied(format!(
                "Link '{}' belongs to another user",
                code
            )));
        }
        Ok(cell)
    }

    pub fn get(&self, code: &str, owner_id: Uuid) -> Result<ShortLink> {
        let cell = self.owned_cell(code, owner_id)?;
        let slot = cell.lock();
        if slot.removed {
            return Err(Self::not_found(code));
        }
        Ok(slot.link.clone())
    }

    pub fn update_click_limit(
        &self,
        code: &str,
        owner_id: Uuid,
        new_limit: u32,
    ) -> Result<ShortLink> {
        if new_limit == 0 {
            return Err(LinkshelfError::invalid_click_limit(
                "Click limit must be positive",
            ));
        }

        let cell = self.owned_cell(code, owner_id)?;
        let mut slot = cell.lock();
        if slot.removed {
            return Err(Self::not_found(code));
        }

        slot.link.apply_click_limit(new_limit, self.clock.now());
        info!(
            "LinkRegistry: '{}' click limit set to {} (active: {})",
            code, new_limit, slot.link.active
        );
        Ok(slot.link.clone())
    }

    /// Remove a link owned by `owner_id`. Returns false when absent or not owned.
    pub fn delete(&self, code: &str, owner_id: Uuid) -> bool {
        let mut index = self.index.write();

        let Some(cell) = self.cell(code) else {
            return false;
        };

        let link = {
            let mut slot = cell.lock();
            if slot.removed || slot.link.owner_id != owner_id {
                return false;
            }
            slot.removed = true;
            slot.link.clone()
        };

        self.records.remove(code);
        index.detach(link.owner_id, &link.original_url, code);
        self.codes.release(code);

        info!("LinkRegistry: deleted '{}' (owner {})", code, owner_id);
        true
    }

    /// The owner's links in creation order.
    pub fn list_by_owner(&self, owner_id: Uuid) -> Vec<ShortLink> {
        let index = self.index.read();
        let Some(codes) = index.by_owner.get(&owner_id) else {
            return Vec::new();
        };

        codes
            .iter()
            .filter_map(|code| self.peek(code))
            .collect()
    }

    /// Remove every expired record and return what was removed.
    pub fn sweep_expired(&self) -> Vec<ShortLink> {
        let mut index = self.index.write();
        let now = self.clock.now();

        let candidates: Vec<(String, LinkCell)> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut removed = Vec::new();
        for (code, cell) in candidates {
            let link = {
                let mut slot = cell.lock();
                if slot.removed || !slot.link.is_expired_at(now) {
                    continue;
                }
                slot.removed = true;
                slot.link.active = false;
                slot.link.clone()
            };

            self.records.remove(&code);
            index.detach(link.owner_id, &link.original_url, &code);
            self.codes.release(&code);
            removed.push(link);
        }

        if !removed.is_empty() {
            info!("LinkRegistry: swept {} expired links", removed.len());
        }
        removed
    }

    pub fn stats(&self) -> RegistryStats {
        let now = self.clock.now();
        let mut stats = RegistryStats::default();

        for entry in self.records.iter() {
            let slot = entry.value().lock();
            if slot.removed {
                continue;
            }
            stats.total += 1;
            match slot.link.state_at(now) {
                LinkState::Active => stats.active += 1,
                LinkState::Expired => stats.expired += 1,
                LinkState::LimitExceeded => stats.limit_exceeded += 1,
            }
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
