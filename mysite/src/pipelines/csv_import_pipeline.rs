// mysite/src/pipelines/csv_import_pipeline.rs

use crate::db;
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::CsvImportCtxData;
use crate::services::product_csv;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{event, info, Level};

/// Registers the product CSV import pipeline: parse everything first, then
/// insert all rows in one transaction owned by the requesting user.
pub fn register_csv_import_pipeline(registry: &Registry<AppError>) -> AppResult<()> {
  let mut import_p = Pipeline::<CsvImportCtxData, AppError>::new(&[
    ("parse_csv_rows", false, None),
    ("insert_products", false, None),
  ]);

  import_p.on("parse_csv_rows", |ctx_data: ContextData<CsvImportCtxData>| async move {
    let rows = {
      let guard = ctx_data.read();
      product_csv::parse_products(&guard.raw_csv)?
    };

    event!(Level::DEBUG, rows = rows.len(), "CSV rows validated.");
    let mut guard = ctx_data.write();
    guard.parsed_rows = rows;
    guard.raw_csv.clear();
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  import_p.on("insert_products", |ctx_data: ContextData<CsvImportCtxData>| async move {
    let (rows, owner_id, db_pool) = {
      let guard = ctx_data.read();
      (guard.parsed_rows.clone(), guard.owner_id, guard.app_state.db_pool.clone())
    };

    let mut tx = db_pool.begin().await?;
    let mut created = Vec::with_capacity(rows.len());
    for fields in &rows {
      created.push(db::products::insert(&mut *tx, fields, owner_id).await?);
    }
    tx.commit().await?;

    info!(owner_id, count = created.len(), "Products imported from CSV.");
    ctx_data.write().created_products = created;
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  registry.register_pipeline(import_p);
  tracing::info!("CSV import pipeline registered.");
  Ok(())
}
