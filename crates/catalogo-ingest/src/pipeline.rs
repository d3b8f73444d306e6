//! Applies mapped rows to the record store.

use catalogo_core::Product;
use catalogo_db::DbError;
use sqlx::SqlitePool;

use crate::error::IngestError;
use crate::workbook::SheetReader;

/// Upsert every product in file-row order inside a single transaction.
///
/// Later rows with the same `id` overwrite earlier ones, within one upload
/// and across uploads. The transaction makes row-level failures all-or-
/// nothing: either every row lands or none does.
///
/// Returns the number of rows applied.
///
/// # Errors
///
/// Returns [`IngestError::Db`] if any upsert or the commit fails; the
/// transaction rolls back on drop.
pub async fn upsert_all<I>(pool: &SqlitePool, products: I) -> Result<u64, IngestError>
where
    I: IntoIterator<Item = Product>,
{
    let mut tx = pool.begin().await.map_err(DbError::from)?;
    let mut applied: u64 = 0;
    for product in products {
        catalogo_db::upsert_product(&mut *tx, &product).await?;
        applied += 1;
    }
    tx.commit().await.map_err(DbError::from)?;
    Ok(applied)
}

/// Parse an uploaded workbook and apply every mapped row.
///
/// # Errors
///
/// Parse-class failures surface before any row is applied; store failures
/// roll back the whole batch.
pub async fn ingest_workbook(pool: &SqlitePool, bytes: &[u8]) -> Result<u64, IngestError> {
    let reader = SheetReader::from_bytes(bytes)?;
    let products: Vec<Product> = reader.products().collect();
    upsert_all(pool, products).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use sqlx::SqlitePool;

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: Some(name.to_string()),
            price: Some(price),
            original_price: None,
            image_src: None,
            category: None,
        }
    }

    fn sheet_with_rows(rows: &[(&str, &str, f64, f64, &str, &str)]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, title) in ["id", "name", "price", "originalPrice", "imageSrc", "category"]
            .iter()
            .enumerate()
        {
            worksheet
                .write_string(0, u16::try_from(col).unwrap(), *title)
                .unwrap();
        }
        for (i, row) in rows.iter().enumerate() {
            let r = u32::try_from(i).unwrap() + 1;
            worksheet.write_string(r, 0, row.0).unwrap();
            worksheet.write_string(r, 1, row.1).unwrap();
            worksheet.write_number(r, 2, row.2).unwrap();
            worksheet.write_number(r, 3, row.3).unwrap();
            worksheet.write_string(r, 4, row.4).unwrap();
            worksheet.write_string(r, 5, row.5).unwrap();
        }
        workbook.save_to_buffer().expect("save workbook")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn upsert_all_applies_every_row(pool: SqlitePool) {
        let applied = upsert_all(
            &pool,
            vec![product("a", "A", 1.0), product("b", "B", 2.0)],
        )
        .await
        .expect("upsert_all");

        assert_eq!(applied, 2);
        let rows = catalogo_db::list_products(&pool).await.expect("list");
        assert_eq!(rows.len(), 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn duplicate_ids_within_one_upload_resolve_to_last_row(pool: SqlitePool) {
        upsert_all(
            &pool,
            vec![product("X", "earlier", 1.0), product("X", "later", 9.0)],
        )
        .await
        .expect("upsert_all");

        let rows = catalogo_db::list_products(&pool).await.expect("list");
        assert_eq!(rows.len(), 1, "one record per id");
        assert_eq!(rows[0].name.as_deref(), Some("later"));
        assert_eq!(rows[0].price, Some(9.0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn ingest_workbook_maps_sheet_rows_into_the_store(pool: SqlitePool) {
        let bytes = sheet_with_rows(&[
            ("p1", "Widget", 9.99, 12.99, "http://x/img.png", "tools"),
            ("p2", "Gadget", 3.5, 5.0, "http://x/g.png", "toys"),
        ]);

        let applied = ingest_workbook(&pool, &bytes).await.expect("ingest");
        assert_eq!(applied, 2);

        let mut rows = catalogo_db::list_products(&pool).await.expect("list");
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(rows[0].id, "p1");
        assert_eq!(rows[0].image_src.as_deref(), Some("http://x/img.png"));
        assert_eq!(rows[1].category.as_deref(), Some("toys"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn reingesting_the_same_workbook_is_idempotent(pool: SqlitePool) {
        let bytes = sheet_with_rows(&[("p1", "Widget", 9.99, 12.99, "http://x/img.png", "tools")]);

        ingest_workbook(&pool, &bytes).await.expect("first ingest");
        ingest_workbook(&pool, &bytes).await.expect("second ingest");

        let rows = catalogo_db::list_products(&pool).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Widget"));
        assert_eq!(rows[0].price, Some(9.99));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn corrupt_workbook_applies_nothing(pool: SqlitePool) {
        let err = ingest_workbook(&pool, b"not an xlsx")
            .await
            .expect_err("must fail");
        assert!(matches!(err, IngestError::Workbook(_)));

        let rows = catalogo_db::list_products(&pool).await.expect("list");
        assert!(rows.is_empty(), "parse failure must not mutate the store");
    }
}
