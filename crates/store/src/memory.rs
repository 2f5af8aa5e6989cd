use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    Customer, CustomerId, CustomerOrder, NewCustomer, NewOrder, NewProduct, OrderId, Product,
    ProductId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Result, StoreError,
    store::{Store, Transaction},
};

#[derive(Debug, Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, CustomerOrder>,
    last_customer_id: i64,
    last_product_id: i64,
    last_order_id: i64,
}

#[derive(Debug, Default)]
struct Faults {
    fail_customer_update: AtomicBool,
    fail_order_insert: AtomicBool,
}

/// In-memory store implementation for testing and local runs.
///
/// A transaction holds the store lock from `begin` until it is committed,
/// rolled back, or dropped, so transactions are fully serialized. Writes are
/// staged in the transaction and applied to the shared tables on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
    committed_writes: Arc<AtomicU64>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of row writes made durable by committed transactions.
    pub fn committed_writes(&self) -> u64 {
        self.committed_writes.load(Ordering::SeqCst)
    }

    /// Returns the total number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Configures customer updates to fail until reset.
    pub fn set_fail_on_customer_update(&self, fail: bool) {
        self.faults.fail_customer_update.store(fail, Ordering::SeqCst);
    }

    /// Configures order inserts to fail until reset.
    pub fn set_fail_on_order_insert(&self, fail: bool) {
        self.faults.fail_order_insert.store(fail, Ordering::SeqCst);
    }

    /// Clears all rows and resets id sequences.
    pub async fn clear(&self) {
        *self.tables.lock().await = Tables::default();
        self.committed_writes.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let pending = Pending {
            last_customer_id: guard.last_customer_id,
            last_product_id: guard.last_product_id,
            last_order_id: guard.last_order_id,
            ..Pending::default()
        };

        Ok(Box::new(InMemoryTransaction {
            guard,
            pending,
            faults: self.faults.clone(),
            committed_writes: self.committed_writes.clone(),
        }))
    }
}

/// Rows written by a transaction that has not committed yet.
#[derive(Debug, Default)]
struct Pending {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, CustomerOrder>,
    last_customer_id: i64,
    last_product_id: i64,
    last_order_id: i64,
    writes: u64,
}

/// Transaction over an [`InMemoryStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    pending: Pending,
    faults: Arc<Faults>,
    committed_writes: Arc<AtomicU64>,
}

impl InMemoryTransaction {
    fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.pending
            .customers
            .get(&id)
            .or_else(|| self.guard.customers.get(&id))
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.pending
            .products
            .get(&id)
            .or_else(|| self.guard.products.get(&id))
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn find_customer(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.customer(id).cloned())
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.product(id).cloned())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<CustomerOrder>> {
        Ok(self
            .pending
            .orders
            .get(&id)
            .or_else(|| self.guard.orders.get(&id))
            .cloned())
    }

    async fn orders_for_customer(&mut self, id: CustomerId) -> Result<Vec<CustomerOrder>> {
        // Pending ids are always above committed ids
        Ok(self
            .guard
            .orders
            .values()
            .chain(self.pending.orders.values())
            .filter(|o| o.customer_id == id)
            .cloned()
            .collect())
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer> {
        self.pending.last_customer_id += 1;
        let customer = Customer {
            id: CustomerId::new(self.pending.last_customer_id),
            name: customer.name,
            balance: customer.balance,
        };
        self.pending.customers.insert(customer.id, customer.clone());
        self.pending.writes += 1;
        Ok(customer)
    }

    async fn insert_products(&mut self, products: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut inserted = Vec::with_capacity(products.len());
        for product in products {
            self.pending.last_product_id += 1;
            let product = Product {
                id: ProductId::new(self.pending.last_product_id),
                name: product.name,
                price: product.price,
            };
            self.pending.products.insert(product.id, product.clone());
            self.pending.writes += 1;
            inserted.push(product);
        }
        Ok(inserted)
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<()> {
        if self.faults.fail_customer_update.load(Ordering::SeqCst) {
            return Err(StoreError::InjectedFault("customer update"));
        }
        if self.customer(customer.id).is_none() {
            return Err(StoreError::CustomerNotFound(customer.id));
        }

        self.pending.customers.insert(customer.id, customer.clone());
        self.pending.writes += 1;
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<CustomerOrder> {
        if self.faults.fail_order_insert.load(Ordering::SeqCst) {
            return Err(StoreError::InjectedFault("order insert"));
        }

        // Foreign key checks
        if self.customer(order.customer_id).is_none() {
            return Err(StoreError::CustomerNotFound(order.customer_id));
        }
        if self.product(order.product_id).is_none() {
            return Err(StoreError::ProductNotFound(order.product_id));
        }

        self.pending.last_order_id += 1;
        let order = CustomerOrder {
            id: OrderId::new(self.pending.last_order_id),
            customer_id: order.customer_id,
            product_id: order.product_id,
            created_at: Utc::now(),
        };
        self.pending.orders.insert(order.id, order.clone());
        self.pending.writes += 1;
        Ok(order)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Self {
            mut guard,
            pending,
            committed_writes,
            ..
        } = *self;

        guard.customers.extend(pending.customers);
        guard.products.extend(pending.products);
        guard.orders.extend(pending.orders);
        guard.last_customer_id = pending.last_customer_id;
        guard.last_product_id = pending.last_product_id;
        guard.last_order_id = pending.last_order_id;
        committed_writes.fetch_add(pending.writes, Ordering::SeqCst);
        tracing::debug!(writes = pending.writes, "in-memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping the pending rows discards them; the guard releases the lock.
        Ok(())
    }
}
