//! House repository.

use std::sync::Arc;

use crate::entities::{
    House,
    house::{self, HouseStatus, HouseType},
};
use renthub_common::{AppError, AppResult};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

/// Sort order for listing queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSort {
    /// Newest listings first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Smallest first.
    AreaAsc,
    /// Largest first.
    AreaDesc,
}

/// Filter set for listing queries.
///
/// Serializes deterministically (field order is fixed by the struct), which
/// the caching layer relies on when fingerprinting a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseQuery {
    /// Listing status.
    pub status: Option<HouseStatus>,
    /// Owning landlord.
    pub landlord_id: Option<String>,
    /// Minimum monthly rent.
    pub min_price: Option<f64>,
    /// Maximum monthly rent.
    pub max_price: Option<f64>,
    /// Minimum floor area.
    pub min_area: Option<f64>,
    /// Maximum floor area.
    pub max_area: Option<f64>,
    /// Exact room count.
    pub rooms: Option<i32>,
    /// Property kind.
    pub house_type: Option<HouseType>,
    /// Substring match over title/description/address.
    pub keyword: Option<String>,
    /// Sort key.
    pub sort: Option<HouseSort>,
    /// Page size.
    pub limit: Option<u64>,
    /// Page offset.
    pub offset: Option<u64>,
}

impl HouseQuery {
    /// Whether no filter, sort, or pagination is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// House repository for database operations.
#[derive(Clone)]
pub struct HouseRepository {
    db: Arc<DatabaseConnection>,
}

impl HouseRepository {
    /// Create a new house repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new house.
    pub async fn create(&self, model: house::ActiveModel) -> AppResult<house::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a live (not soft-deleted) house by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<house::Model>> {
        House::find_by_id(id)
            .filter(house::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Query live houses by filter set.
    pub async fn query(&self, query: &HouseQuery) -> AppResult<Vec<house::Model>> {
        let mut condition = Condition::all().add(house::Column::DeletedAt.is_null());

        if let Some(status) = query.status {
            condition = condition.add(house::Column::Status.eq(status));
        }
        if let Some(landlord_id) = &query.landlord_id {
            condition = condition.add(house::Column::LandlordId.eq(landlord_id));
        }
        if let Some(min_price) = query.min_price {
            condition = condition.add(house::Column::RentPrice.gte(min_price));
        }
        if let Some(max_price) = query.max_price {
            condition = condition.add(house::Column::RentPrice.lte(max_price));
        }
        if let Some(min_area) = query.min_area {
            condition = condition.add(house::Column::Area.gte(min_area));
        }
        if let Some(max_area) = query.max_area {
            condition = condition.add(house::Column::Area.lte(max_area));
        }
        if let Some(rooms) = query.rooms {
            condition = condition.add(house::Column::Rooms.eq(rooms));
        }
        if let Some(house_type) = query.house_type {
            condition = condition.add(house::Column::HouseType.eq(house_type));
        }
        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(house::Column::Title.contains(keyword))
                    .add(house::Column::Description.contains(keyword))
                    .add(house::Column::Address.contains(keyword)),
            );
        }

        let mut select = House::find().filter(condition);
        select = match query.sort.unwrap_or_default() {
            HouseSort::Newest => select.order_by_desc(house::Column::CreatedAt),
            HouseSort::PriceAsc => select.order_by_asc(house::Column::RentPrice),
            HouseSort::PriceDesc => select.order_by_desc(house::Column::RentPrice),
            HouseSort::AreaAsc => select.order_by_asc(house::Column::Area),
            HouseSort::AreaDesc => select.order_by_desc(house::Column::Area),
        };

        if let Some(limit) = query.limit {
            select = select.limit(limit);
            if let Some(offset) = query.offset {
                select = select.offset(offset);
            }
        }

        select
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing house.
    pub async fn update(&self, model: house::ActiveModel) -> AppResult<house::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Soft-delete a house. Returns `false` if it was already gone.
    pub async fn soft_delete(&self, id: &str, now: DateTimeWithTimeZone) -> AppResult<bool> {
        let result = House::update_many()
            .col_expr(house::Column::DeletedAt, Expr::value(Some(now)))
            .filter(house::Column::Id.eq(id))
            .filter(house::Column::DeletedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Live houses owned by a landlord, newest first.
    pub async fn find_by_landlord(&self, landlord_id: &str) -> AppResult<Vec<house::Model>> {
        House::find()
            .filter(house::Column::LandlordId.eq(landlord_id))
            .filter(house::Column::DeletedAt.is_null())
            .order_by_desc(house::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the view counter atomically (single UPDATE query, no fetch).
    ///
    /// Concurrent increments must not be lost, so this never does
    /// read-modify-write.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        House::update_many()
            .col_expr(
                house::Column::ViewCount,
                Expr::col(house::Column::ViewCount).add(1),
            )
            .filter(house::Column::Id.eq(id))
            .filter(house::Column::DeletedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::house::{Decoration, PaymentType};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_house(id: &str, landlord_id: &str) -> house::Model {
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
            rent_price: 4200.0,
            deposit: 4200.0,
            payment_type: PaymentType::Monthly,
            house_type: HouseType::Apartment,
            orientation: "south".to_string(),
            decoration: Decoration::Refined,
            facilities: json!(["wifi", "washer"]),
            images: json!([]),
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

    #[tokio::test]
    async fn test_find_by_id() {
        let house = create_test_house("h1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[house.clone()]])
                .into_connection(),
        );

        let repo = HouseRepository::new(db);
        let result = repo.find_by_id("h1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "h1");
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<house::Model>::new()])
                .into_connection(),
        );

        let repo = HouseRepository::new(db);
        let result = repo.find_by_id("nope").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_query_returns_rows() {
        let h1 = create_test_house("h1", "u1");
        let h2 = create_test_house("h2", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[h1, h2]])
                .into_connection(),
        );

        let repo = HouseRepository::new(db);
        let query = HouseQuery {
            status: Some(HouseStatus::Listed),
            min_price: Some(1000.0),
            max_price: Some(5000.0),
            keyword: Some("flat".to_string()),
            limit: Some(20),
            offset: Some(0),
            ..Default::default()
        };
        let result = repo.query(&query).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_soft_delete_reports_whether_row_was_live() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = HouseRepository::new(db);
        let now = Utc::now().into();

        assert!(repo.soft_delete("h1", now).await.unwrap());
        assert!(!repo.soft_delete("h1", now).await.unwrap());
    }

    #[tokio::test]
    async fn test_increment_view_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = HouseRepository::new(db);
        repo.increment_view_count("h1").await.unwrap();
    }

    #[test]
    fn test_empty_query_detection() {
        assert!(HouseQuery::default().is_empty());

        let query = HouseQuery {
            rooms: Some(2),
            ..Default::default()
        };
        assert!(!query.is_empty());
    }
}
