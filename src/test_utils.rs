//! Scriptable in-process driver for exercising the bridge without a real
//! database. Enabled with the `test-utils` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::driver::{Driver, DriverConnection, DriverRows, NativeValue, SqlType};
use crate::error::BridgeError;

/// Handler invoked for every callable statement the mock receives.
pub type CallHandler = dyn Fn(&str, &[(String, NativeValue)], &[(String, SqlType)]) -> Result<Vec<(String, NativeValue)>, BridgeError>
    + Send
    + Sync;

/// A scripted result set: one entry is consumed per query.
struct ScriptedRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<NativeValue>>,
}

struct Shared {
    opens: AtomicUsize,
    queries: AtomicUsize,
    calls: AtomicUsize,
    open_delay: Mutex<Option<Duration>>,
    scripted: Mutex<VecDeque<ScriptedRows>>,
    call_handler: Mutex<Option<Box<CallHandler>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Driver whose connections replay scripted results and count activity.
///
/// Construct one, script it through the `&self` setters, then hand an
/// `Arc<MockDriver>` to [`crate::Connector::new`] while keeping a second
/// handle for assertions.
pub struct MockDriver {
    shared: Arc<Shared>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                opens: AtomicUsize::new(0),
                queries: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                open_delay: Mutex::new(None),
                scripted: Mutex::new(VecDeque::new()),
                call_handler: Mutex::new(None),
            }),
        }
    }

    /// Make every open sleep for `delay` first. Widens race windows in
    /// concurrency tests.
    pub fn set_open_delay(&self, delay: Duration) {
        *lock(&self.shared.open_delay) = Some(delay);
    }

    /// Queue a result set; each query consumes one queued entry. Queries
    /// beyond the script see an empty, column-less result.
    pub fn push_query_result<C>(&self, columns: &[C], rows: Vec<Vec<NativeValue>>)
    where
        C: AsRef<str>,
    {
        lock(&self.shared.scripted).push_back(ScriptedRows {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: rows.into(),
        });
    }

    /// Install the handler invoked for callable statements. Without one,
    /// every call fails.
    pub fn set_call_handler<F>(&self, handler: F)
    where
        F: Fn(&str, &[(String, NativeValue)], &[(String, SqlType)]) -> Result<Vec<(String, NativeValue)>, BridgeError>
            + Send
            + Sync
            + 'static,
    {
        *lock(&self.shared.call_handler) = Some(Box::new(handler));
    }

    /// Number of connections opened so far.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Number of queries that reached the driver.
    #[must_use]
    pub fn queries_executed(&self) -> usize {
        self.shared.queries.load(Ordering::SeqCst)
    }

    /// Number of callable statements that reached the driver.
    #[must_use]
    pub fn calls_executed(&self) -> usize {
        self.shared.calls.load(Ordering::SeqCst)
    }

    fn open(&self) -> Box<dyn DriverConnection> {
        let delay = *lock(&self.shared.open_delay);
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Box::new(MockConnection {
            shared: Arc::clone(&self.shared),
            closed: false,
        })
    }
}

impl Driver for MockDriver {
    fn connect_default(&self) -> Result<Box<dyn DriverConnection>, BridgeError> {
        Ok(self.open())
    }

    fn connect(
        &self,
        _url: &str,
        _user: &str,
        _password: &str,
    ) -> Result<Box<dyn DriverConnection>, BridgeError> {
        Ok(self.open())
    }
}

struct MockConnection {
    shared: Arc<Shared>,
    closed: bool,
}

impl DriverConnection for MockConnection {
    fn execute_query(
        &mut self,
        _sql: &str,
        _binds: &[NativeValue],
    ) -> Result<Box<dyn DriverRows>, BridgeError> {
        if self.closed {
            return Err(BridgeError::ConnectionError(
                "mock connection is closed".to_string(),
            ));
        }
        self.shared.queries.fetch_add(1, Ordering::SeqCst);
        let scripted = lock(&self.shared.scripted).pop_front();
        let (columns, rows) = match scripted {
            Some(s) => (s.columns, s.rows),
            None => (Vec::new(), VecDeque::new()),
        };
        Ok(Box::new(MockRows { columns, rows }))
    }

    fn execute_call(
        &mut self,
        statement: &str,
        inputs: &[(String, NativeValue)],
        outputs: &[(String, SqlType)],
    ) -> Result<Vec<(String, NativeValue)>, BridgeError> {
        if self.closed {
            return Err(BridgeError::ConnectionError(
                "mock connection is closed".to_string(),
            ));
        }
        self.shared.calls.fetch_add(1, Ordering::SeqCst);
        let handler = lock(&self.shared.call_handler);
        match handler.as_ref() {
            Some(handler) => handler(statement, inputs, outputs),
            None => Err(BridgeError::CallError(
                "no call handler configured".to_string(),
            )),
        }
    }

    fn close(&mut self) -> Result<(), BridgeError> {
        if self.closed {
            return Err(BridgeError::ConnectionError(
                "mock connection is already closed".to_string(),
            ));
        }
        self.closed = true;
        Ok(())
    }
}

struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<NativeValue>>,
}

impl DriverRows for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<NativeValue>>, BridgeError> {
        Ok(self.rows.pop_front())
    }
}
