use crate::catalog::CatalogItem;
use sqlx::SqlitePool;

/// Statistics from an import operation
#[derive(Debug, Default)]
pub struct ImportStats {
    /// Number of entries read from the catalog
    pub read: usize,
    /// Number of rows inserted (existing ids are left alone)
    pub inserted: usize,
}

const BATCH_SIZE: usize = 500;

/// Insert catalog items into `items`. Uses INSERT OR IGNORE, so re-running
/// the import only adds new ids.
pub async fn import_items(
    pool: &SqlitePool,
    items: &[CatalogItem],
) -> Result<ImportStats, Box<dyn std::error::Error>> {
    let mut stats = ImportStats {
        read: items.len(),
        ..Default::default()
    };

    for chunk in items.chunks(BATCH_SIZE) {
        let mut query = String::from("INSERT OR IGNORE INTO items (id, name) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            query.push_str("(?, ?)");
        }

        let mut q = sqlx::query(&query);
        for item in chunk {
            q = q.bind(&item.id).bind(&item.name);
        }

        let result = q.execute(pool).await?;
        stats.inserted += result.rows_affected() as usize;
    }

    Ok(stats)
}
