use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::warn;

pub type TxnFuture<'c, R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>;

/// Run `f` as one unit of work: committed on `Ok`, rolled back on `Err`.
///
/// Every batch of match events goes through here, so the log, the ledger
/// and the match row move together or not at all.
pub async fn with_txn<R, E, F>(db: &DatabaseConnection, f: F) -> Result<R, E>
where
    E: From<DbErr>,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, R, E>,
{
    let txn = db.begin().await?;
    match f(&txn).await {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback after failed unit of work also failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Database, Statement};

    use super::*;

    async fn scratch() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.execute_unprepared("CREATE TABLE t (v INTEGER NOT NULL)")
            .await
            .unwrap();
        db
    }

    async fn rows(db: &DatabaseConnection) -> usize {
        db.query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT v FROM t",
        ))
        .await
        .unwrap()
        .len()
    }

    #[tokio::test]
    async fn ok_commits_and_err_rolls_back() {
        let db = scratch().await;

        with_txn(&db, |txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO t (v) VALUES (1)").await?;
                Ok::<_, DbErr>(())
            })
        })
        .await
        .unwrap();
        assert_eq!(rows(&db).await, 1);

        let failed = with_txn(&db, |txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO t (v) VALUES (2)").await?;
                Err::<(), _>(DbErr::Custom("boom".into()))
            })
        })
        .await;
        assert!(failed.is_err());
        assert_eq!(rows(&db).await, 1);
    }
}
