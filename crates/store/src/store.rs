use async_trait::async_trait;
use common::{
    Customer, CustomerId, CustomerOrder, NewCustomer, NewOrder, NewProduct, OrderId, Product,
    ProductId,
};

use crate::Result;

/// Core trait for storage backends.
///
/// A store hands out transactions; it holds no per-request state itself.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    /// Begins a new transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// A unit of work against the store.
///
/// Writes made through a transaction become visible to others only after
/// [`commit`](Transaction::commit). Dropping a transaction without
/// committing discards its writes.
#[async_trait]
pub trait Transaction: Send {
    /// Loads a customer by id.
    ///
    /// Backends with row-level locking hold a lock on the row until the
    /// transaction ends, so a read-then-update cannot lose a concurrent write.
    async fn find_customer(&mut self, id: CustomerId) -> Result<Option<Customer>>;

    /// Loads a product by id.
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Loads an order by id.
    async fn find_order(&mut self, id: OrderId) -> Result<Option<CustomerOrder>>;

    /// Lists a customer's orders, oldest first.
    async fn orders_for_customer(&mut self, id: CustomerId) -> Result<Vec<CustomerOrder>>;

    /// Inserts a customer and returns it with its assigned id.
    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer>;

    /// Inserts products in order and returns them with their assigned ids.
    async fn insert_products(&mut self, products: Vec<NewProduct>) -> Result<Vec<Product>>;

    /// Overwrites an existing customer's name and balance.
    ///
    /// Fails with `CustomerNotFound` if the row does not exist.
    async fn update_customer(&mut self, customer: &Customer) -> Result<()>;

    /// Inserts an order and returns it with its assigned id and timestamp.
    async fn insert_order(&mut self, order: NewOrder) -> Result<CustomerOrder>;

    /// Makes all writes of this transaction durable.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards all writes of this transaction.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Extension trait providing single-statement convenience methods.
///
/// Each method runs in its own transaction.
#[async_trait]
pub trait StoreExt: Store {
    /// Loads a customer by id.
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let mut tx = self.begin().await?;
        let customer = tx.find_customer(id).await?;
        tx.commit().await?;
        Ok(customer)
    }

    /// Loads a product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let mut tx = self.begin().await?;
        let product = tx.find_product(id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Lists a customer's orders, oldest first.
    async fn orders_for_customer(&self, id: CustomerId) -> Result<Vec<CustomerOrder>> {
        let mut tx = self.begin().await?;
        let orders = tx.orders_for_customer(id).await?;
        tx.commit().await?;
        Ok(orders)
    }

    /// Inserts a single customer.
    async fn save_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let mut tx = self.begin().await?;
        let customer = tx.insert_customer(customer).await?;
        tx.commit().await?;
        Ok(customer)
    }

    /// Inserts all products atomically.
    async fn save_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut tx = self.begin().await?;
        let products = tx.insert_products(products).await?;
        tx.commit().await?;
        Ok(products)
    }
}

// Blanket implementation for all Store implementations
impl<T: Store + ?Sized> StoreExt for T {}
