//! Mock driver implementations for testing.
//!
//! [`MockDriver`] builds an in-memory object graph whose capability surface
//! is chosen at construction time, so tests can exercise any combination of
//! optional capabilities. Every forwarded operation is appended to a shared
//! [`CallLog`], and [`FailSwitch`] injects backend errors per operation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::capability::{
    CapabilitySet, ConnectionCapability, DriverCapability, RowsCapability, StatementCapability,
};
use crate::driver::{
    BeginWithOptions, BoundValue, BoundValueChecker, CallContext, Connection, Connector,
    ConnectorOpener, Driver, DriverError, ExecOutcome, ExecWithContext, Pinger,
    PrepareWithContext, QueryWithContext, Result, ResultSetAdvancer, Rows, SessionResetter,
    Statement, Transaction, TxOptions, Value,
};

/// Shared, ordered record of every operation the mock graph actually ran.
#[derive(Clone, Default)]
pub struct CallLog(Arc<RwLock<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, name: &str) {
        self.0.write().await.push(name.to_string());
    }

    pub async fn calls(&self) -> Vec<String> {
        self.0.read().await.clone()
    }

    pub async fn count(&self, name: &str) -> usize {
        self.0.read().await.iter().filter(|c| *c == name).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.read().await.is_empty()
    }
}

/// Per-operation fault injection. Armed operations fail with a backend
/// error after they are logged, as a real backend failure would.
#[derive(Clone, Default)]
pub struct FailSwitch(Arc<RwLock<HashSet<String>>>);

impl FailSwitch {
    pub async fn arm(&self, operation: &str) {
        self.0.write().await.insert(operation.to_string());
    }

    pub async fn disarm(&self, operation: &str) {
        self.0.write().await.remove(operation);
    }

    async fn check(&self, operation: &str) -> Result<()> {
        if self.0.read().await.contains(operation) {
            return Err(DriverError::Backend(format!(
                "injected {operation} failure"
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
struct MockConfig {
    log: CallLog,
    fail: FailSwitch,
    connector: bool,
    connection_caps: CapabilitySet,
    statement_caps: CapabilitySet,
    rows_caps: CapabilitySet,
    bound_value_checking: bool,
    columns: Vec<String>,
    result_sets: Vec<Vec<Vec<Value>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            log: CallLog::new(),
            fail: FailSwitch::default(),
            connector: false,
            connection_caps: CapabilitySet::EMPTY,
            statement_caps: CapabilitySet::EMPTY,
            rows_caps: CapabilitySet::EMPTY,
            bound_value_checking: false,
            columns: vec!["value".to_string()],
            result_sets: vec![vec![vec![Value::Int(1)], vec![Value::Int(2)]]],
        }
    }
}

/// In-memory driver with a configurable capability surface.
#[derive(Default)]
pub struct MockDriver {
    config: MockConfig,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver with every optional capability enabled at every role.
    pub fn full() -> Self {
        Self::new()
            .with_connector()
            .with_connection_capabilities(&ConnectionCapability::ALL.map(|c| c.index()))
            .with_statement_capabilities(&StatementCapability::ALL.map(|c| c.index()))
            .with_rows_capabilities(&RowsCapability::ALL.map(|c| c.index()))
            .with_bound_value_checking()
    }

    pub fn with_connector(mut self) -> Self {
        self.config.connector = true;
        self
    }

    pub fn with_connection_capabilities(mut self, indices: &[usize]) -> Self {
        self.config.connection_caps = CapabilitySet::from_indices(indices);
        self
    }

    pub fn with_statement_capabilities(mut self, indices: &[usize]) -> Self {
        self.config.statement_caps = CapabilitySet::from_indices(indices);
        self
    }

    pub fn with_rows_capabilities(mut self, indices: &[usize]) -> Self {
        self.config.rows_caps = CapabilitySet::from_indices(indices);
        self
    }

    pub fn with_bound_value_checking(mut self) -> Self {
        self.config.bound_value_checking = true;
        self
    }

    /// Replace the result sets served by every query. Each result set is a
    /// list of rows; each row has one slot per column.
    pub fn with_result_sets(
        mut self,
        columns: Vec<String>,
        result_sets: Vec<Vec<Vec<Value>>>,
    ) -> Self {
        self.config.columns = columns;
        self.config.result_sets = result_sets;
        self
    }

    pub fn log(&self) -> CallLog {
        self.config.log.clone()
    }

    pub fn fail(&self) -> FailSwitch {
        self.config.fail.clone()
    }

    pub fn capabilities(&self) -> CapabilitySet {
        if self.config.connector {
            CapabilitySet::from_indices(&[DriverCapability::OpenConnector.index()])
        } else {
            CapabilitySet::EMPTY
        }
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn open(&self, _dsn: &str) -> Result<Box<dyn Connection>> {
        self.config.log.record("driver.open").await;
        self.config.fail.check("driver.open").await?;
        Ok(Box::new(MockConnection::new(self.config.clone())))
    }

    fn as_connector_opener(&self) -> Option<&dyn ConnectorOpener> {
        if self.config.connector {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ConnectorOpener for MockDriver {
    async fn open_connector(&self, _dsn: &str) -> Result<Box<dyn Connector>> {
        self.config.log.record("driver.open-connector").await;
        self.config.fail.check("driver.open-connector").await?;
        Ok(Box::new(MockConnector {
            config: self.config.clone(),
        }))
    }
}

struct MockConnector {
    config: MockConfig,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _cx: &CallContext) -> Result<Box<dyn Connection>> {
        self.config.log.record("connector.connect").await;
        self.config.fail.check("connector.connect").await?;
        Ok(Box::new(MockConnection::new(self.config.clone())))
    }
}

pub struct MockConnection {
    config: MockConfig,
    closed: bool,
}

impl MockConnection {
    fn new(config: MockConfig) -> Self {
        Self {
            config,
            closed: false,
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn prepare(&mut self, _statement: &str) -> Result<Box<dyn Statement>> {
        self.config.log.record("connection.prepare").await;
        self.config.fail.check("connection.prepare").await?;
        Ok(Box::new(MockStatement::new(self.config.clone())))
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        self.config.log.record("connection.begin").await;
        self.config.fail.check("connection.begin").await?;
        Ok(Box::new(MockTransaction {
            config: self.config.clone(),
        }))
    }

    async fn exec(&mut self, _statement: &str, _params: &[Value]) -> Result<ExecOutcome> {
        self.config.log.record("connection.exec").await;
        self.config.fail.check("connection.exec").await?;
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query(&mut self, _statement: &str, _params: &[Value]) -> Result<Box<dyn Rows>> {
        self.config.log.record("connection.query").await;
        self.config.fail.check("connection.query").await?;
        Ok(Box::new(MockRows::new(self.config.clone())))
    }

    async fn close(&mut self) -> Result<()> {
        self.config.log.record("connection.close").await;
        if self.closed {
            return Err(DriverError::Closed);
        }
        self.closed = true;
        Ok(())
    }

    fn as_begin_with_options(&mut self) -> Option<&mut dyn BeginWithOptions> {
        if self
            .config
            .connection_caps
            .contains(ConnectionCapability::BeginWithOptions.index())
        {
            Some(self)
        } else {
            None
        }
    }

    fn as_prepare_with_context(&mut self) -> Option<&mut dyn PrepareWithContext> {
        if self
            .config
            .connection_caps
            .contains(ConnectionCapability::PrepareWithContext.index())
        {
            Some(self)
        } else {
            None
        }
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        if self
            .config
            .connection_caps
            .contains(ConnectionCapability::Ping.index())
        {
            Some(self)
        } else {
            None
        }
    }

    fn as_session_resetter(&mut self) -> Option<&mut dyn SessionResetter> {
        if self
            .config
            .connection_caps
            .contains(ConnectionCapability::ResetSession.index())
        {
            Some(self)
        } else {
            None
        }
    }

    fn as_bound_value_checker(&mut self) -> Option<&mut dyn BoundValueChecker> {
        if self.config.bound_value_checking {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl BeginWithOptions for MockConnection {
    async fn begin_with_options(
        &mut self,
        _cx: &CallContext,
        _options: TxOptions,
    ) -> Result<Box<dyn Transaction>> {
        self.config.log.record("connection.begin-with-options").await;
        self.config
            .fail
            .check("connection.begin-with-options")
            .await?;
        Ok(Box::new(MockTransaction {
            config: self.config.clone(),
        }))
    }
}

#[async_trait]
impl PrepareWithContext for MockConnection {
    async fn prepare_with_context(
        &mut self,
        _cx: &CallContext,
        _statement: &str,
    ) -> Result<Box<dyn Statement>> {
        self.config
            .log
            .record("connection.prepare-with-context")
            .await;
        self.config
            .fail
            .check("connection.prepare-with-context")
            .await?;
        Ok(Box::new(MockStatement::new(self.config.clone())))
    }
}

#[async_trait]
impl Pinger for MockConnection {
    async fn ping(&mut self, _cx: &CallContext) -> Result<()> {
        self.config.log.record("connection.ping").await;
        self.config.fail.check("connection.ping").await
    }
}

#[async_trait]
impl SessionResetter for MockConnection {
    async fn reset_session(&mut self, _cx: &CallContext) -> Result<()> {
        self.config.log.record("connection.reset-session").await;
        self.config.fail.check("connection.reset-session").await
    }
}

#[async_trait]
impl BoundValueChecker for MockConnection {
    async fn check_bound_value(&mut self, _value: &mut BoundValue) -> Result<()> {
        self.config.log.record("connection.check-bound-value").await;
        self.config
            .fail
            .check("connection.check-bound-value")
            .await
    }
}

pub struct MockStatement {
    config: MockConfig,
}

impl MockStatement {
    fn new(config: MockConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Statement for MockStatement {
    fn num_params(&self) -> Option<usize> {
        None
    }

    async fn exec(&mut self, _params: &[Value]) -> Result<ExecOutcome> {
        self.config.log.record("statement.exec").await;
        self.config.fail.check("statement.exec").await?;
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query(&mut self, _params: &[Value]) -> Result<Box<dyn Rows>> {
        self.config.log.record("statement.query").await;
        self.config.fail.check("statement.query").await?;
        Ok(Box::new(MockRows::new(self.config.clone())))
    }

    async fn close(&mut self) -> Result<()> {
        self.config.log.record("statement.close").await;
        Ok(())
    }

    fn as_exec_with_context(&mut self) -> Option<&mut dyn ExecWithContext> {
        if self
            .config
            .statement_caps
            .contains(StatementCapability::ExecWithContext.index())
        {
            Some(self)
        } else {
            None
        }
    }

    fn as_query_with_context(&mut self) -> Option<&mut dyn QueryWithContext> {
        if self
            .config
            .statement_caps
            .contains(StatementCapability::QueryWithContext.index())
        {
            Some(self)
        } else {
            None
        }
    }

    fn as_bound_value_checker(&mut self) -> Option<&mut dyn BoundValueChecker> {
        if self.config.bound_value_checking {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ExecWithContext for MockStatement {
    async fn exec_with_context(
        &mut self,
        _cx: &CallContext,
        _params: &[BoundValue],
    ) -> Result<ExecOutcome> {
        self.config.log.record("statement.exec-with-context").await;
        self.config
            .fail
            .check("statement.exec-with-context")
            .await?;
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: None,
        })
    }
}

#[async_trait]
impl QueryWithContext for MockStatement {
    async fn query_with_context(
        &mut self,
        _cx: &CallContext,
        _params: &[BoundValue],
    ) -> Result<Box<dyn Rows>> {
        self.config.log.record("statement.query-with-context").await;
        self.config
            .fail
            .check("statement.query-with-context")
            .await?;
        Ok(Box::new(MockRows::new(self.config.clone())))
    }
}

#[async_trait]
impl BoundValueChecker for MockStatement {
    async fn check_bound_value(&mut self, _value: &mut BoundValue) -> Result<()> {
        self.config.log.record("statement.check-bound-value").await;
        self.config.fail.check("statement.check-bound-value").await
    }
}

pub struct MockRows {
    config: MockConfig,
    active_set: usize,
    cursor: usize,
}

impl MockRows {
    fn new(config: MockConfig) -> Self {
        Self {
            config,
            active_set: 0,
            cursor: 0,
        }
    }

    fn current_set(&self) -> &[Vec<Value>] {
        self.config
            .result_sets
            .get(self.active_set)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl Rows for MockRows {
    fn columns(&self) -> Vec<String> {
        self.config.columns.clone()
    }

    async fn next_row(&mut self, row: &mut [Value]) -> Result<bool> {
        self.config.log.record("rows.next-row").await;
        self.config.fail.check("rows.next-row").await?;
        let Some(source) = self.current_set().get(self.cursor) else {
            return Ok(false);
        };
        for (slot, value) in row.iter_mut().zip(source.clone()) {
            *slot = value;
        }
        self.cursor += 1;
        Ok(true)
    }

    async fn close(&mut self) -> Result<()> {
        self.config.log.record("rows.close").await;
        Ok(())
    }

    fn as_result_set_advancer(&mut self) -> Option<&mut dyn ResultSetAdvancer> {
        if self
            .config
            .rows_caps
            .contains(RowsCapability::NextResultSet.index())
        {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ResultSetAdvancer for MockRows {
    fn has_next_result_set(&mut self) -> bool {
        self.active_set + 1 < self.config.result_sets.len()
    }

    async fn next_result_set(&mut self) -> Result<()> {
        self.config.log.record("rows.next-result-set").await;
        self.config.fail.check("rows.next-result-set").await?;
        if self.active_set + 1 >= self.config.result_sets.len() {
            return Err(DriverError::Backend("no further result set".to_string()));
        }
        self.active_set += 1;
        self.cursor = 0;
        Ok(())
    }
}

pub struct MockTransaction {
    config: MockConfig,
}

#[async_trait]
impl Transaction for MockTransaction {
    async fn commit(&mut self) -> Result<()> {
        self.config.log.record("transaction.commit").await;
        self.config.fail.check("transaction.commit").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.config.log.record("transaction.rollback").await;
        self.config.fail.check("transaction.rollback").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{connection_capabilities, driver_capabilities};

    #[tokio::test]
    async fn capability_surface_matches_configuration() {
        let driver = MockDriver::new().with_connection_capabilities(&[
            ConnectionCapability::Ping.index(),
            ConnectionCapability::ResetSession.index(),
        ]);
        assert!(driver_capabilities(&driver).is_empty());

        let mut conn = driver.open("mock://db").await.expect("open");
        let caps = connection_capabilities(conn.as_mut());
        assert!(caps.contains(ConnectionCapability::Ping.index()));
        assert!(caps.contains(ConnectionCapability::ResetSession.index()));
        assert!(!caps.contains(ConnectionCapability::BeginWithOptions.index()));
        assert!(!caps.contains(ConnectionCapability::PrepareWithContext.index()));
    }

    #[tokio::test]
    async fn call_log_records_forwarded_operations_in_order() {
        let driver = MockDriver::new();
        let log = driver.log();

        let mut conn = driver.open("mock://db").await.expect("open");
        conn.exec("insert", &[]).await.expect("exec");
        conn.close().await.expect("close");

        assert_eq!(
            log.calls().await,
            vec!["driver.open", "connection.exec", "connection.close"],
        );
    }

    #[tokio::test]
    async fn fail_switch_injects_a_backend_error() {
        let driver = MockDriver::new();
        driver.fail().arm("connection.exec").await;

        let mut conn = driver.open("mock://db").await.expect("open");
        let err = conn.exec("insert", &[]).await.expect_err("armed failure");
        assert!(matches!(err, DriverError::Backend(_)));

        driver.fail().disarm("connection.exec").await;
        conn.exec("insert", &[]).await.expect("disarmed");
    }

    #[tokio::test]
    async fn rows_serve_the_configured_result_sets() {
        let driver = MockDriver::new()
            .with_rows_capabilities(&[RowsCapability::NextResultSet.index()])
            .with_result_sets(
                vec!["n".to_string()],
                vec![
                    vec![vec![Value::Int(1)]],
                    vec![vec![Value::Int(2)], vec![Value::Int(3)]],
                ],
            );

        let mut conn = driver.open("mock://db").await.expect("open");
        let mut rows = conn.query("select", &[]).await.expect("query");
        assert_eq!(rows.columns(), vec!["n".to_string()]);

        let mut buf = vec![Value::Null];
        assert!(rows.next_row(&mut buf).await.expect("row"));
        assert_eq!(buf[0], Value::Int(1));
        assert!(!rows.next_row(&mut buf).await.expect("exhausted"));

        let advancer = rows.as_result_set_advancer().expect("advancer");
        assert!(advancer.has_next_result_set());
        advancer.next_result_set().await.expect("advance");
        assert!(rows.next_row(&mut buf).await.expect("row"));
        assert_eq!(buf[0], Value::Int(2));
    }

    #[tokio::test]
    async fn double_close_reports_closed() {
        let driver = MockDriver::new();
        let mut conn = driver.open("mock://db").await.expect("open");
        conn.close().await.expect("first close");
        let err = conn.close().await.expect_err("second close");
        assert!(matches!(err, DriverError::Closed));
    }
}
