//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        carts::{
            aggregate::{CartAggregate, LineChange},
            data::{NewCartItem, Quantity},
            errors::{CartsServiceError, equipment_lookup_error},
            models::Cart,
            records::CartItemUuid,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        equipment::repository::PgEquipmentRepository,
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    equipment_repository: PgEquipmentRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            equipment_repository: PgEquipmentRepository::new(),
        }
    }

    /// Read the cart as stored, with catalog display fields joined in.
    async fn read_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Cart, CartsServiceError> {
        let Some(record) = self.carts_repository.get_cart(tx, user).await? else {
            return Ok(Cart::empty(user));
        };

        let items = self.items_repository.get_cart_items(tx, user).await?;

        Ok(Cart::from_parts(record, items))
    }

    /// Load the locked cart's lines, or `None` when the user has no cart.
    async fn lock_aggregate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartAggregate>, CartsServiceError> {
        if self.carts_repository.lock_cart(tx, user).await?.is_none() {
            return Ok(None);
        }

        let lines = self.items_repository.get_cart_lines(tx, user).await?;

        Ok(Some(CartAggregate::new(lines)))
    }

    /// Write one line change and the recomputed totals.
    async fn persist(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        aggregate: &CartAggregate,
        change: LineChange,
    ) -> Result<(), CartsServiceError> {
        if !change.is_effective() {
            return Ok(());
        }

        let totals = aggregate.totals()?;

        match change {
            LineChange::Inserted(line) => {
                self.items_repository
                    .create_cart_item(tx, user, &line)
                    .await?;
            }
            LineChange::QuantityChanged { uuid, quantity } => {
                let rows_affected = self
                    .items_repository
                    .update_cart_item_quantity(tx, user, uuid, quantity)
                    .await?;

                if rows_affected == 0 {
                    return Err(CartsServiceError::NotFound);
                }
            }
            LineChange::Removed(uuid) => {
                self.items_repository
                    .delete_cart_item(tx, user, uuid)
                    .await?;
            }
            LineChange::Cleared => {
                self.items_repository.delete_cart_items(tx, user).await?;
            }
            LineChange::Unchanged => {}
        }

        self.carts_repository
            .update_cart_totals(tx, user, totals)
            .await?;

        debug!(
            total_items = totals.total_items,
            total_price = totals.total_price,
            "cart totals recomputed"
        );

        Ok(())
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self.read_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn add_item(&self, user: UserUuid, item: NewCartItem) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let equipment = self
            .equipment_repository
            .get_equipment(&mut tx, item.equipment_uuid)
            .await
            .map_err(equipment_lookup_error)?;

        if !equipment.in_stock {
            return Err(CartsServiceError::Unavailable);
        }

        self.carts_repository.create_cart(&mut tx, user).await?;

        let mut aggregate = self
            .lock_aggregate(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::InvalidData)?;

        let change = aggregate.add(item, &equipment)?;

        self.persist(&mut tx, user, &aggregate, change).await?;

        let cart = self.read_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn update_item_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: Quantity,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let mut aggregate = self
            .lock_aggregate(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let change = aggregate.set_quantity(item, quantity)?;

        self.persist(&mut tx, user, &aggregate, change).await?;

        let cart = self.read_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let Some(mut aggregate) = self.lock_aggregate(&mut tx, user).await? else {
            return Ok(Cart::empty(user));
        };

        let change = aggregate.remove(item);

        self.persist(&mut tx, user, &aggregate, change).await?;

        let cart = self.read_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn clear(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let Some(mut aggregate) = self.lock_aggregate(&mut tx, user).await? else {
            return Ok(Cart::empty(user));
        };

        let change = aggregate.clear();

        self.persist(&mut tx, user, &aggregate, change).await?;

        let cart = self.read_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart; an empty cart when none exists yet.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add equipment to the user's cart, creating the cart on first use.
    ///
    /// Adding equipment already in the cart increases that line's quantity.
    async fn add_item(&self, user: UserUuid, item: NewCartItem) -> Result<Cart, CartsServiceError>;

    /// Replace the quantity of a line item.
    async fn update_item_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: Quantity,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line item. Removing an absent item returns the cart unchanged.
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<Cart, CartsServiceError>;

    /// Remove every line item.
    async fn clear(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;
}
