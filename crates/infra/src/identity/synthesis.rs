use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use mandi_core::ProductId;

use crate::store::{ProductStore, sequence_rank};

pub(crate) struct MintedId {
    pub id: ProductId,
    pub degraded: bool,
}

/// Mints identifiers as "highest known id + 1".
///
/// Minted ids are not written back to the store, so the highest id handed out
/// by this process is remembered and also counts as "known". The lock is held
/// across the store query so that concurrent mints never see the same base.
#[derive(Debug, Default)]
pub(crate) struct IdSynthesizer {
    high_water: Mutex<Option<ProductId>>,
}

impl IdSynthesizer {
    pub(crate) async fn next_id(&self, store: &dyn ProductStore) -> MintedId {
        let mut high_water = self.high_water.lock().await;

        match store.fetch_highest_product_id().await {
            Ok(highest) => {
                let base = highest
                    .into_iter()
                    .filter(ProductId::is_sequenced)
                    .chain(high_water.clone())
                    .max_by_key(sequence_rank);
                let id = base.map_or_else(ProductId::first, |b| b.successor());
                debug!(product_id = %id, "minted product id");
                *high_water = Some(id.clone());
                MintedId {
                    id,
                    degraded: false,
                }
            }
            Err(e) => {
                let id = ProductId::from_timestamp_millis(Utc::now().timestamp_millis());
                warn!(error = %e, product_id = %id, "highest product id unavailable; minted time-derived id");
                MintedId { id, degraded: true }
            }
        }
    }
}
