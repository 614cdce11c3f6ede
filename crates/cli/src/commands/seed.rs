//! Sample data for local development.
//!
//! Inserts one area (`Tokyo`) and one shop (`Test Shop`) in it, so a shop
//! user can register straight away. Existing rows with the same names are
//! reused, so the command can be run repeatedly.

use menuhub_api::db::{AreaRepository, ShopRepository};
use menuhub_api::models::{Area, NewShop, Shop};
use sqlx::PgPool;

use super::{CliError, connect};

const SAMPLE_AREA: &str = "Tokyo";
const SAMPLE_SHOP: &str = "Test Shop";

/// Insert the sample area and shop unless they already exist.
///
/// # Errors
///
/// Returns `CliError` if configuration is missing or a query fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    let area = ensure_area(&pool).await?;
    let shop = ensure_shop(&pool, &area).await?;

    tracing::info!(
        area_id = %area.id,
        shop_id = %shop.id,
        "Sample data ready"
    );
    Ok(())
}

async fn ensure_area(pool: &PgPool) -> Result<Area, CliError> {
    let areas = AreaRepository::new(pool);
    if let Some(area) = areas
        .list()
        .await?
        .into_iter()
        .find(|area| area.name == SAMPLE_AREA)
    {
        tracing::info!(area_id = %area.id, "Sample area already exists");
        return Ok(area);
    }

    let area = areas.create(SAMPLE_AREA).await?;
    tracing::info!(area_id = %area.id, "Created sample area");
    Ok(area)
}

async fn ensure_shop(pool: &PgPool, area: &Area) -> Result<Shop, CliError> {
    let shops = ShopRepository::new(pool);
    if let Some(shop) = shops
        .list_by_area(area.id)
        .await?
        .into_iter()
        .find(|shop| shop.shop_name == SAMPLE_SHOP)
    {
        tracing::info!(shop_id = %shop.id, "Sample shop already exists");
        return Ok(shop);
    }

    let shop = shops.create(&sample_shop(area)).await?;
    tracing::info!(shop_id = %shop.id, "Created sample shop");
    Ok(shop)
}

fn sample_shop(area: &Area) -> NewShop {
    NewShop {
        area_id: area.id,
        shop_name: SAMPLE_SHOP.to_owned(),
        shop_detail: Some("Test shop description".to_owned()),
        image_path: None,
        homepage_url: None,
        address: Some("Test Address".to_owned()),
        phone: Some("123-456-7890".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use menuhub_core::AreaId;

    use super::*;

    #[test]
    fn test_sample_shop_is_valid() {
        let area = Area {
            id: AreaId::new(7),
            name: SAMPLE_AREA.to_owned(),
            created_at: Utc::now(),
        };
        let shop = sample_shop(&area);
        assert_eq!(shop.area_id, AreaId::new(7));
        assert!(shop.validate().is_ok());
    }
}
