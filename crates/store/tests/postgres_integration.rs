//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;
use std::time::Duration;

use common::{CustomerId, Money, NewCustomer, NewOrder, NewProduct, ProductId};
use serial_test::serial;
use sqlx::PgPool;
use store::{PostgresStore, Store, StoreError, StoreExt};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE customer_order, customer, product RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn money(amount: f64) -> Money {
    Money::new(amount).unwrap()
}

#[tokio::test]
#[serial]
async fn insert_and_find_rows() {
    let store = get_test_store().await;

    let customer = store
        .save_customer(NewCustomer::new("Vivek Singh", money(100.0)))
        .await
        .unwrap();
    let products = store
        .save_products(vec![
            NewProduct::new("Laptop", money(80.0)),
            NewProduct::new("Phone", money(50.0)),
        ])
        .await
        .unwrap();

    assert_eq!(customer.id, CustomerId::new(1));
    assert_eq!(products.len(), 2);
    assert_eq!(products[1].id, ProductId::new(2));

    let loaded = store.customer(customer.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Vivek Singh");
    assert_eq!(loaded.balance, money(100.0));

    let phone = store.product(products[1].id).await.unwrap().unwrap();
    assert_eq!(phone.price, money(50.0));
}

#[tokio::test]
#[serial]
async fn missing_rows_return_none() {
    let store = get_test_store().await;

    assert!(store.customer(CustomerId::new(42)).await.unwrap().is_none());
    assert!(store.product(ProductId::new(42)).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn update_and_insert_order_commit_together() {
    let store = get_test_store().await;
    let mut customer = store
        .save_customer(NewCustomer::new("Ada", money(100.0)))
        .await
        .unwrap();
    let product = store
        .save_products(vec![NewProduct::new("Laptop", money(80.0))])
        .await
        .unwrap()
        .remove(0);

    let mut tx = store.begin().await.unwrap();
    customer.balance = money(20.0);
    tx.update_customer(&customer).await.unwrap();
    let order = tx
        .insert_order(NewOrder::new(customer.id, product.id))
        .await
        .unwrap();
    let found = tx.find_order(order.id).await.unwrap();
    assert_eq!(found.as_ref(), Some(&order));
    tx.commit().await.unwrap();

    let loaded = store.customer(customer.id).await.unwrap().unwrap();
    assert_eq!(loaded.balance, money(20.0));

    let orders = store.orders_for_customer(customer.id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product_id, product.id);
}

#[tokio::test]
#[serial]
async fn rollback_discards_update_and_order() {
    let store = get_test_store().await;
    let mut customer = store
        .save_customer(NewCustomer::new("Ada", money(100.0)))
        .await
        .unwrap();
    let product = store
        .save_products(vec![NewProduct::new("Laptop", money(80.0))])
        .await
        .unwrap()
        .remove(0);

    let mut tx = store.begin().await.unwrap();
    customer.balance = money(20.0);
    tx.update_customer(&customer).await.unwrap();
    tx.insert_order(NewOrder::new(customer.id, product.id))
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    let loaded = store.customer(customer.id).await.unwrap().unwrap();
    assert_eq!(loaded.balance, money(100.0));
    assert!(
        store
            .orders_for_customer(customer.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[serial]
async fn insert_order_with_unknown_product_is_rejected() {
    let store = get_test_store().await;
    let customer = store
        .save_customer(NewCustomer::new("Ada", money(100.0)))
        .await
        .unwrap();

    let mut tx = store.begin().await.unwrap();
    let result = tx
        .insert_order(NewOrder::new(customer.id, ProductId::new(404)))
        .await;

    assert!(matches!(result, Err(StoreError::ProductNotFound(id)) if id == ProductId::new(404)));
}

#[tokio::test]
#[serial]
async fn update_unknown_customer_is_rejected() {
    let store = get_test_store().await;
    let ghost = common::Customer {
        id: CustomerId::new(404),
        name: "Ghost".to_string(),
        balance: money(1.0),
    };

    let mut tx = store.begin().await.unwrap();
    let result = tx.update_customer(&ghost).await;
    assert!(matches!(result, Err(StoreError::CustomerNotFound(_))));
}

#[tokio::test]
#[serial]
async fn customer_reads_lock_the_row() {
    let store = get_test_store().await;
    let customer = store
        .save_customer(NewCustomer::new("Ada", money(100.0)))
        .await
        .unwrap();

    let mut first = store.begin().await.unwrap();
    let mut locked = first.find_customer(customer.id).await.unwrap().unwrap();

    // The second reader blocks on the row lock until the first commits
    let contender = tokio::spawn({
        let store = store.clone();
        let id = customer.id;
        async move {
            let mut tx = store.begin().await.unwrap();
            let seen = tx.find_customer(id).await.unwrap().unwrap();
            tx.commit().await.unwrap();
            seen.balance
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!contender.is_finished());

    locked.balance = money(20.0);
    first.update_customer(&locked).await.unwrap();
    first.commit().await.unwrap();

    assert_eq!(contender.await.unwrap(), money(20.0));
}
