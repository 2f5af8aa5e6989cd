use async_trait::async_trait;
use common::{
    Customer, CustomerId, CustomerOrder, Money, NewCustomer, NewOrder, NewProduct, OrderId,
    Product, ProductId,
};
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{Store, Transaction},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// Transaction over a [`PostgresStore`].
///
/// Runs at the server's default isolation level (read committed). Customer
/// reads take a row lock, which serializes concurrent read-modify-write
/// cycles on the same customer.
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

fn row_to_customer(row: PgRow) -> Result<Customer> {
    Ok(Customer {
        id: CustomerId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        balance: Money::new(row.try_get("balance")?)?,
    })
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        price: Money::new(row.try_get("price")?)?,
    })
}

fn row_to_order(row: PgRow) -> Result<CustomerOrder> {
    Ok(CustomerOrder {
        id: OrderId::new(row.try_get("id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn find_customer(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, balance FROM customer WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(row_to_customer).transpose()
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price FROM product WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(row_to_product).transpose()
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<CustomerOrder>> {
        let row = sqlx::query(
            "SELECT id, customer_id, product_id, created_at FROM customer_order WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_order).transpose()
    }

    async fn orders_for_customer(&mut self, id: CustomerId) -> Result<Vec<CustomerOrder>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, product_id, created_at
            FROM customer_order
            WHERE customer_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id.as_i64())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer> {
        let row = sqlx::query(
            "INSERT INTO customer (name, balance) VALUES ($1, $2) RETURNING id, name, balance",
        )
        .bind(&customer.name)
        .bind(customer.balance.amount())
        .fetch_one(&mut *self.tx)
        .await?;

        row_to_customer(row)
    }

    async fn insert_products(&mut self, products: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut inserted = Vec::with_capacity(products.len());
        for product in products {
            let row = sqlx::query(
                "INSERT INTO product (name, price) VALUES ($1, $2) RETURNING id, name, price",
            )
            .bind(&product.name)
            .bind(product.price.amount())
            .fetch_one(&mut *self.tx)
            .await?;

            inserted.push(row_to_product(row)?);
        }
        Ok(inserted)
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<()> {
        let result = sqlx::query("UPDATE customer SET name = $2, balance = $3 WHERE id = $1")
            .bind(customer.id.as_i64())
            .bind(&customer.name)
            .bind(customer.balance.amount())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CustomerNotFound(customer.id));
        }
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<CustomerOrder> {
        let row = sqlx::query(
            r#"
            INSERT INTO customer_order (customer_id, product_id)
            VALUES ($1, $2)
            RETURNING id, customer_id, product_id, created_at
            "#,
        )
        .bind(order.customer_id.as_i64())
        .bind(order.product_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            // Map foreign key violations onto the missing row
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some("customer_order_customer_id_fkey") => {
                        return StoreError::CustomerNotFound(order.customer_id);
                    }
                    Some("customer_order_product_id_fkey") => {
                        return StoreError::ProductNotFound(order.product_id);
                    }
                    _ => {}
                }
            }
            StoreError::Database(e)
        })?;

        row_to_order(row)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }
}
