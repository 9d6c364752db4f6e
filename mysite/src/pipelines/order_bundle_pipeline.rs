// mysite/src/pipelines/order_bundle_pipeline.rs

use crate::db;
use crate::db::orders::OrderFields;
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::OrderBundleCtxData;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{event, info, Level};

/// Registers the order bundle pipeline used by the `create-order` command.
pub fn register_order_bundle_pipeline(registry: &Registry<AppError>) -> AppResult<()> {
  let mut bundle_p = Pipeline::<OrderBundleCtxData, AppError>::new(&[
    ("resolve_order_owner", false, None),
    ("assemble_order", false, None),
    ("report_order", true, None),
  ]);

  bundle_p.on("resolve_order_owner", |ctx_data: ContextData<OrderBundleCtxData>| async move {
    let (username, db_pool) = {
      let guard = ctx_data.read();
      (guard.username.clone(), guard.app_state.db_pool.clone())
    };

    let user = db::users::find_by_username(&db_pool, &username)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("User '{}' not found.", username)))?;
    ctx_data.write().owner_id = Some(user.id);
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  // Get-or-create and product attachment commit together or not at all.
  bundle_p.on("assemble_order", |ctx_data: ContextData<OrderBundleCtxData>| async move {
    let (owner_id, delivery_address, promocode, db_pool) = {
      let guard = ctx_data.read();
      (
        guard.owner_id,
        guard.delivery_address.clone(),
        guard.promocode.clone(),
        guard.app_state.db_pool.clone(),
      )
    };
    let owner_id = owner_id.ok_or_else(|| AppError::Internal("Order owner was not resolved.".to_string()))?;

    let mut tx = db_pool.begin().await?;
    let existing = db::orders::find_matching(&mut *tx, owner_id, &delivery_address, &promocode).await?;
    let (order, created) = match existing {
      Some(order) => (order, false),
      None => {
        let fields = OrderFields {
          user_id: owner_id,
          delivery_address: Some(delivery_address),
          promocode,
        };
        (db::orders::insert(&mut *tx, &fields).await?, true)
      }
    };
    let product_ids: Vec<i64> = db::products::list_all(&mut *tx).await?.iter().map(|p| p.id).collect();
    db::orders::set_products(&mut *tx, order.id, &product_ids).await?;
    tx.commit().await?;

    let mut guard = ctx_data.write();
    guard.order = Some(order);
    guard.order_created = created;
    guard.product_ids = product_ids;
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  bundle_p.on("report_order", |ctx_data: ContextData<OrderBundleCtxData>| async move {
    let guard = ctx_data.read();
    if let Some(order) = &guard.order {
      info!(
        order_id = order.id,
        created = guard.order_created,
        products = guard.product_ids.len(),
        "Order bundle ready."
      );
    } else {
      event!(Level::WARN, "Order bundle finished without an order.");
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  registry.register_pipeline(bundle_p);
  tracing::info!("Order bundle pipeline registered.");
  Ok(())
}
