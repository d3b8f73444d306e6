//! Database operations for the `productos` table.

use catalogo_core::Product;
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `productos` table.
///
/// Every non-key column is nullable: the mapper hands through whatever it
/// could coerce out of a cell, and the store accepts it as-is.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub image_src: Option<String>,
    pub category: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            original_price: row.original_price,
            image_src: row.image_src,
            category: row.category,
        }
    }
}

/// Upserts a product row.
///
/// Conflicts on `id` overwrite every non-key column in place — last write
/// wins, no merge logic. Generic over the executor so the upload pipeline
/// can run it inside its transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product<'e, E>(executor: E, product: &Product) -> Result<(), DbError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO productos (id, name, price, original_price, image_src, category) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(id) DO UPDATE SET \
             name           = excluded.name, \
             price          = excluded.price, \
             original_price = excluded.original_price, \
             image_src      = excluded.image_src, \
             category       = excluded.category",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.original_price)
    .bind(&product.image_src)
    .bind(&product.category)
    .execute(executor)
    .await?;

    Ok(())
}

/// Returns every product record. No ordering guarantee, no pagination.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &SqlitePool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, price, original_price, image_src, category FROM productos",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    fn sample(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: Some(name.to_string()),
            price: Some(price),
            original_price: Some(price + 3.0),
            image_src: Some(format!("https://img.example.com/{id}.png")),
            category: Some("tools".to_string()),
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn upsert_inserts_new_record(pool: SqlitePool) {
        upsert_product(&pool, &sample("p1", "Widget", 9.99))
            .await
            .expect("upsert");

        let rows = list_products(&pool).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "p1");
        assert_eq!(rows[0].name.as_deref(), Some("Widget"));
        assert_eq!(rows[0].price, Some(9.99));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn upsert_overwrites_existing_record_by_id(pool: SqlitePool) {
        upsert_product(&pool, &sample("p1", "Widget", 9.99))
            .await
            .expect("first upsert");
        upsert_product(&pool, &sample("p1", "Widget v2", 7.50))
            .await
            .expect("second upsert");

        let rows = list_products(&pool).await.expect("list");
        assert_eq!(rows.len(), 1, "same id must stay a single record");
        assert_eq!(rows[0].name.as_deref(), Some("Widget v2"));
        assert_eq!(rows[0].price, Some(7.50));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn upsert_accepts_null_fields(pool: SqlitePool) {
        let product = Product {
            id: "bare".to_string(),
            name: None,
            price: None,
            original_price: None,
            image_src: None,
            category: None,
        };
        upsert_product(&pool, &product).await.expect("upsert");

        let rows = list_products(&pool).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].name.is_none());
        assert!(rows[0].price.is_none());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_products_on_empty_table_is_empty(pool: SqlitePool) {
        let rows = list_products(&pool).await.expect("list");
        assert!(rows.is_empty());
    }
}
