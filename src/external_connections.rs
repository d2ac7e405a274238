use sqlx::PgConnection;

/// A handle to an active database connection. Data access code borrows the raw
/// connection from the handle for the duration of a query.
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Owns the clients used to reach external systems. Business logic receives an
/// implementation of this trait rather than concrete clients so driven adapters
/// can be swapped out for fakes in tests.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// Implemented by connectivity providers that can open a database transaction.
pub trait Transactable: Sync {
    type Handle: ExternalConnectivity + TransactionHandle + Send;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// An in-progress transaction which must be committed for its writes to stick.
pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}
