//! House listing service.
//!
//! Reads go through a read-through cache in front of the house store; writes
//! go to the store first and then invalidate the affected cache scopes
//! (cache-aside). A reader racing a write may observe the pre-write value
//! until invalidation lands or the TTL expires; that bounded staleness is the
//! accepted trade-off. Correctness never depends on the cache: every cache
//! failure is logged and degrades to a direct store access.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use renthub_common::{AppError, AppResult, CacheBackend, IdGenerator};
use renthub_db::{
    entities::house::{self, Decoration, HouseStatus, HouseType, PaymentType},
    repositories::{HouseQuery, HouseRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use validator::Validate;

/// TTL for a cached single house.
const HOUSE_TTL: Duration = Duration::from_secs(30 * 60);
/// TTL for the negative marker cached for nonexistent ids.
const NEGATIVE_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for a cached non-empty query result.
const LIST_TTL: Duration = Duration::from_secs(15 * 60);
/// TTL for a cached empty query result.
const EMPTY_LIST_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for a cached per-landlord listing.
const LANDLORD_TTL: Duration = Duration::from_secs(20 * 60);

/// Negative-cache marker: deserializes as `None::<house::Model>`.
const NEGATIVE_MARKER: &str = "null";

fn house_key(id: &str) -> String {
    format!("house:{id}")
}

fn landlord_key(landlord_id: &str) -> String {
    format!("houses:landlord:{landlord_id}")
}

/// Cache key for a query: a fingerprint of its serialized form, so equal
/// filter sets always map to the same entry.
fn list_key(query: &HouseQuery) -> String {
    if query.is_empty() {
        return "houses:list:all".to_string();
    }
    match serde_json::to_vec(query) {
        Ok(bytes) => {
            let digest = Sha256::digest(&bytes);
            format!("houses:list:{}", hex::encode(digest))
        }
        Err(_) => "houses:list:default".to_string(),
    }
}

/// Input for publishing a listing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHouseInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[validate(length(max = 4096))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 255))]
    pub address: String,

    #[validate(range(min = 1.0))]
    pub area: f64,

    #[serde(default)]
    pub floor: i32,

    #[serde(default)]
    pub total_floor: i32,

    #[validate(range(min = 1))]
    pub rooms: i32,

    pub halls: i32,

    pub bathrooms: i32,

    #[validate(range(min = 0.0))]
    pub rent_price: f64,

    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub deposit: f64,

    #[serde(default)]
    pub payment_type: PaymentType,

    #[serde(default)]
    pub house_type: HouseType,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub orientation: String,

    #[serde(default)]
    pub decoration: Decoration,

    #[serde(default)]
    pub facilities: Vec<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub latitude: f64,

    #[serde(default)]
    pub longitude: f64,

    #[serde(default)]
    pub is_elevator: bool,
}

/// Input for editing a listing. Absent fields are left untouched;
/// `landlord_id` is not editable at all.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHouseInput {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,

    #[validate(range(min = 1.0))]
    pub area: Option<f64>,

    pub floor: Option<i32>,
    pub total_floor: Option<i32>,
    pub rooms: Option<i32>,
    pub halls: Option<i32>,
    pub bathrooms: Option<i32>,

    #[validate(range(min = 0.0))]
    pub rent_price: Option<f64>,

    #[validate(range(min = 0.0))]
    pub deposit: Option<f64>,

    pub payment_type: Option<PaymentType>,
    pub house_type: Option<HouseType>,

    #[validate(length(max = 20))]
    pub orientation: Option<String>,

    pub decoration: Option<Decoration>,
    pub facilities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_elevator: Option<bool>,
    pub status: Option<HouseStatus>,
}

/// House service: listing reads through the cache, writes with invalidation.
#[derive(Clone)]
pub struct HouseService {
    repo: HouseRepository,
    cache: Arc<dyn CacheBackend>,
    id_gen: IdGenerator,
}

impl HouseService {
    /// Create a new house service.
    #[must_use]
    pub fn new(repo: HouseRepository, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new listing owned by `landlord_id`.
    ///
    /// A fresh id has no single-house cache entry, but existing list entries
    /// may now be stale by omission, so the list scopes are invalidated.
    pub async fn create(
        &self,
        landlord_id: &str,
        input: CreateHouseInput,
    ) -> AppResult<house::Model> {
        input.validate()?;

        let model = house::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            address: Set(input.address),
            area: Set(input.area),
            floor: Set(input.floor),
            total_floor: Set(input.total_floor),
            rooms: Set(input.rooms),
            halls: Set(input.halls),
            bathrooms: Set(input.bathrooms),
            rent_price: Set(input.rent_price),
            deposit: Set(input.deposit),
            payment_type: Set(input.payment_type),
            house_type: Set(input.house_type),
            orientation: Set(input.orientation),
            decoration: Set(input.decoration),
            facilities: Set(serde_json::json!(input.facilities)),
            images: Set(serde_json::json!(input.images)),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            is_elevator: Set(input.is_elevator),
            status: Set(HouseStatus::Listed),
            view_count: Set(0),
            landlord_id: Set(landlord_id.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            deleted_at: Set(None),
        };

        let house = self.repo.create(model).await?;
        self.invalidate_lists(landlord_id).await;
        Ok(house)
    }

    /// Fetch a single listing, read-through.
    ///
    /// A cached negative marker answers probes for nonexistent ids without
    /// touching the store. An undecodable cache entry counts as a miss.
    pub async fn get_by_id(&self, id: &str) -> AppResult<house::Model> {
        let key = house_key(id);

        if let Some(raw) = self.cache_get(&key).await {
            match serde_json::from_str::<Option<house::Model>>(&raw) {
                Ok(Some(house)) => {
                    debug!(house_id = id, "Cache hit for house");
                    return Ok(house);
                }
                Ok(None) => {
                    debug!(house_id = id, "Negative cache hit for house");
                    return Err(AppError::HouseNotFound(id.to_string()));
                }
                Err(e) => {
                    debug!(house_id = id, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        match self.repo.find_by_id(id).await? {
            Some(house) => {
                if let Ok(payload) = serde_json::to_string(&house) {
                    self.cache_set(&key, &payload, HOUSE_TTL).await;
                }
                Ok(house)
            }
            None => {
                self.cache_set(&key, NEGATIVE_MARKER, NEGATIVE_TTL).await;
                Err(AppError::HouseNotFound(id.to_string()))
            }
        }
    }

    /// Query listings by filter set, read-through.
    ///
    /// Empty result sets are cached too, with a shorter TTL.
    pub async fn list(&self, query: &HouseQuery) -> AppResult<Vec<house::Model>> {
        let key = list_key(query);

        if let Some(raw) = self.cache_get(&key).await {
            match serde_json::from_str::<Vec<house::Model>>(&raw) {
                Ok(houses) => {
                    debug!(key = %key, "Cache hit for house list");
                    return Ok(houses);
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        let houses = self.repo.query(query).await?;
        let ttl = if houses.is_empty() { EMPTY_LIST_TTL } else { LIST_TTL };
        if let Ok(payload) = serde_json::to_string(&houses) {
            self.cache_set(&key, &payload, ttl).await;
        }
        Ok(houses)
    }

    /// Listings owned by a landlord, read-through.
    pub async fn list_by_landlord(&self, landlord_id: &str) -> AppResult<Vec<house::Model>> {
        let key = landlord_key(landlord_id);

        if let Some(raw) = self.cache_get(&key).await {
            match serde_json::from_str::<Vec<house::Model>>(&raw) {
                Ok(houses) => return Ok(houses),
                Err(e) => {
                    debug!(key = %key, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        let houses = self.repo.find_by_landlord(landlord_id).await?;
        let ttl = if houses.is_empty() { EMPTY_LIST_TTL } else { LANDLORD_TTL };
        if let Ok(payload) = serde_json::to_string(&houses) {
            self.cache_set(&key, &payload, ttl).await;
        }
        Ok(houses)
    }

    /// Edit a listing. Only the owning landlord may edit.
    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        input: UpdateHouseInput,
    ) -> AppResult<house::Model> {
        input.validate()?;

        // Read-for-write goes to the store, not the cache.
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::HouseNotFound(id.to_string()))?;

        if existing.landlord_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the owning landlord may edit a listing".to_string(),
            ));
        }

        let landlord_id = existing.landlord_id.clone();
        let mut active: house::ActiveModel = existing.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(area) = input.area {
            active.area = Set(area);
        }
        if let Some(floor) = input.floor {
            active.floor = Set(floor);
        }
        if let Some(total_floor) = input.total_floor {
            active.total_floor = Set(total_floor);
        }
        if let Some(rooms) = input.rooms {
            active.rooms = Set(rooms);
        }
        if let Some(halls) = input.halls {
            active.halls = Set(halls);
        }
        if let Some(bathrooms) = input.bathrooms {
            active.bathrooms = Set(bathrooms);
        }
        if let Some(rent_price) = input.rent_price {
            active.rent_price = Set(rent_price);
        }
        if let Some(deposit) = input.deposit {
            active.deposit = Set(deposit);
        }
        if let Some(payment_type) = input.payment_type {
            active.payment_type = Set(payment_type);
        }
        if let Some(house_type) = input.house_type {
            active.house_type = Set(house_type);
        }
        if let Some(orientation) = input.orientation {
            active.orientation = Set(orientation);
        }
        if let Some(decoration) = input.decoration {
            active.decoration = Set(decoration);
        }
        if let Some(facilities) = input.facilities {
            active.facilities = Set(serde_json::json!(facilities));
        }
        if let Some(images) = input.images {
            active.images = Set(serde_json::json!(images));
        }
        if let Some(latitude) = input.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = input.longitude {
            active.longitude = Set(longitude);
        }
        if let Some(is_elevator) = input.is_elevator {
            active.is_elevator = Set(is_elevator);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.repo.update(active).await?;

        self.cache_delete(&house_key(id)).await;
        self.invalidate_lists(&landlord_id).await;

        Ok(updated)
    }

    /// Take a listing off the books (soft delete). Only the owning landlord
    /// may delete. The house is read first to learn the landlord id for
    /// targeted invalidation.
    pub async fn delete(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::HouseNotFound(id.to_string()))?;

        if existing.landlord_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the owning landlord may delete a listing".to_string(),
            ));
        }

        if !self.repo.soft_delete(id, Utc::now().into()).await? {
            return Err(AppError::HouseNotFound(id.to_string()));
        }

        self.cache_delete(&house_key(id)).await;
        self.invalidate_lists(&existing.landlord_id).await;

        Ok(())
    }

    /// Bump the view counter.
    ///
    /// The store-side increment is atomic, so concurrent bumps are never
    /// lost. Only the single-house entry is invalidated; list entries are not
    /// required to reflect exact view counts.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        self.repo.increment_view_count(id).await?;
        self.cache_delete(&house_key(id)).await;
        Ok(())
    }

    async fn invalidate_lists(&self, landlord_id: &str) {
        self.cache_delete_pattern("houses:list:*").await;
        self.cache_delete(&landlord_key(landlord_id)).await;
    }

    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = key, error = %e, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            warn!(key = key, error = %e, "Cache populate failed");
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            // The write of record already landed; staleness is bounded by TTL.
            warn!(key = key, error = %e, "Cache invalidation failed");
        }
    }

    async fn cache_delete_pattern(&self, pattern: &str) {
        if let Err(e) = self.cache.delete_by_pattern(pattern).await {
            warn!(pattern = pattern, error = %e, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use renthub_common::{CacheError, MemoryCache};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_house(id: &str, landlord_id: &str, rent_price: f64) -> house::Model {
        house::Model {
            id: id.to_string(),
            title: "Bright two-room flat".to_string(),
            description: "South-facing, near the metro".to_string(),
            address: "12 Willow Lane".to_string(),
            area: 58.5,
            floor: 3,
            total_floor: 6,
            rooms: 2,
            halls: 1,
            bathrooms: 1,
            rent_price,
            deposit: 4200.0,
            payment_type: PaymentType::Monthly,
            house_type: HouseType::Apartment,
            orientation: "south".to_string(),
            decoration: Decoration::Refined,
            facilities: serde_json::json!(["wifi"]),
            images: serde_json::json!([]),
            latitude: 31.23,
            longitude: 121.47,
            is_elevator: true,
            status: HouseStatus::Listed,
            view_count: 0,
            landlord_id: landlord_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
            deleted_at: None,
        }
    }

    fn service_with(
        db: MockDatabase,
        cache: Arc<dyn CacheBackend>,
    ) -> HouseService {
        let db = Arc::new(db.into_connection());
        HouseService::new(HouseRepository::new(db), cache)
    }

    /// Cache backend that fails every operation.
    struct BrokenCache;

    #[async_trait]
    impl CacheBackend for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Timeout)
        }
        async fn delete_by_pattern(&self, _pattern: &str) -> Result<(), CacheError> {
            Err(CacheError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_get_by_id_cold_then_warm() {
        let house = test_house("h1", "u1", 4200.0);

        // Exactly one DB result: the warm read must come from the cache.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[house.clone()]]);
        let service = service_with(db, Arc::new(MemoryCache::new()));

        let cold = service.get_by_id("h1").await.unwrap();
        let warm = service.get_by_id("h1").await.unwrap();

        assert_eq!(cold, house);
        assert_eq!(warm, house);
    }

    #[tokio::test]
    async fn test_get_by_id_negative_cache() {
        // One empty DB result; the second probe is answered by the negative
        // marker without touching the store.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<house::Model>::new()]);
        let service = service_with(db, Arc::new(MemoryCache::new()));

        let first = service.get_by_id("ghost").await.unwrap_err();
        let second = service.get_by_id("ghost").await.unwrap_err();

        assert!(matches!(first, AppError::HouseNotFound(_)));
        assert!(matches!(second, AppError::HouseNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_by_id_survives_broken_cache() {
        let house = test_house("h1", "u1", 4200.0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[house.clone()]]);
        let service = service_with(db, Arc::new(BrokenCache));

        let result = service.get_by_id("h1").await.unwrap();
        assert_eq!(result.id, "h1");
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_house() {
        let stale = test_house("h1", "u1", 4200.0);
        let fresh = test_house("h1", "u1", 6000.0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // warm-up read
            .append_query_results([[stale.clone()]])
            // update: read-for-write, then UPDATE ... RETURNING
            .append_query_results([[stale.clone()]])
            .append_query_results([[fresh.clone()]])
            // post-invalidation read reloads from the store
            .append_query_results([[fresh.clone()]]);
        let service = service_with(db, Arc::new(MemoryCache::new()));

        assert_eq!(service.get_by_id("h1").await.unwrap().rent_price, 4200.0);

        let input = UpdateHouseInput {
            rent_price: Some(6000.0),
            ..Default::default()
        };
        service.update("u1", "h1", input).await.unwrap();

        // Next read must observe the new value, not the stale cached copy.
        assert_eq!(service.get_by_id("h1").await.unwrap().rent_price, 6000.0);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let house = test_house("h1", "u1", 4200.0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[house]]);
        let service = service_with(db, Arc::new(MemoryCache::new()));

        let result = service
            .update("intruder", "h1", UpdateHouseInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_increment_view_count_invalidates_single_entry() {
        let before = test_house("h1", "u1", 4200.0);
        let mut after = before.clone();
        after.view_count = 1;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[before.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[after.clone()]]);
        let service = service_with(db, Arc::new(MemoryCache::new()));

        assert_eq!(service.get_by_id("h1").await.unwrap().view_count, 0);
        service.increment_view_count("h1").await.unwrap();
        assert_eq!(service.get_by_id("h1").await.unwrap().view_count, 1);
    }

    #[tokio::test]
    async fn test_list_warm_hit_and_distinct_fingerprints() {
        let house = test_house("h1", "u1", 4200.0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // one result per distinct fingerprint
            .append_query_results([[house.clone()]])
            .append_query_results([Vec::<house::Model>::new()]);
        let service = service_with(db, Arc::new(MemoryCache::new()));

        let cheap = HouseQuery {
            max_price: Some(5000.0),
            ..Default::default()
        };
        let pricey = HouseQuery {
            min_price: Some(10_000.0),
            ..Default::default()
        };

        // Warm repeat of the same filter set is served from cache.
        assert_eq!(service.list(&cheap).await.unwrap().len(), 1);
        assert_eq!(service.list(&cheap).await.unwrap().len(), 1);

        // A different filter set has its own entry and hits the store.
        assert_eq!(service.list(&pricey).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_invalidates_list_scopes() {
        let house = test_house("h1", "u1", 4200.0);

        let cache = Arc::new(MemoryCache::new());
        cache
            .set("houses:list:all", "[]", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("houses:landlord:u1", "[]", Duration::from_secs(60))
            .await
            .unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[house]]);
        let service = service_with(db, cache.clone());

        let input = CreateHouseInput {
            title: "Bright two-room flat".to_string(),
            description: String::new(),
            address: "12 Willow Lane".to_string(),
            area: 58.5,
            floor: 3,
            total_floor: 6,
            rooms: 2,
            halls: 1,
            bathrooms: 1,
            rent_price: 4200.0,
            deposit: 4200.0,
            payment_type: PaymentType::Monthly,
            house_type: HouseType::Apartment,
            orientation: "south".to_string(),
            decoration: Decoration::Refined,
            facilities: vec!["wifi".to_string()],
            images: vec![],
            latitude: 31.23,
            longitude: 121.47,
            is_elevator: true,
        };
        service.create("u1", input).await.unwrap();

        assert_eq!(cache.get("houses:list:all").await.unwrap(), None);
        assert_eq!(cache.get("houses:landlord:u1").await.unwrap(), None);
    }

    #[test]
    fn test_list_key_is_deterministic() {
        let a = HouseQuery {
            rooms: Some(2),
            max_price: Some(5000.0),
            ..Default::default()
        };
        let b = HouseQuery {
            rooms: Some(2),
            max_price: Some(5000.0),
            ..Default::default()
        };
        let c = HouseQuery {
            rooms: Some(3),
            ..Default::default()
        };

        assert_eq!(list_key(&a), list_key(&b));
        assert_ne!(list_key(&a), list_key(&c));
        assert_eq!(list_key(&HouseQuery::default()), "houses:list:all");
    }
}
