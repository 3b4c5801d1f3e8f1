//! Scripted in-memory connector for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::clients::driver::{Connector, DbHandle, DriverError};
use crate::domain::{BindParams, ConnectParams, Row};

#[derive(Debug, Clone)]
pub enum Reply {
    Rows(Vec<Row>),
    Affected(u64),
    Fail(String),
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    statements: Vec<(String, BindParams)>,
    opened: Vec<ConnectParams>,
    fail_open: Option<String>,
    closed: usize,
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn reply(&self, r: Reply) -> &Self {
        self.inner.lock().unwrap().replies.push_back(r);
        self
    }

    pub fn fail_open(&self, msg: &str) {
        self.inner.lock().unwrap().fail_open = Some(msg.into());
    }

    pub fn statements(&self) -> Vec<String> {
        let s = self.inner.lock().unwrap();
        s.statements.iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn binds(&self) -> Vec<BindParams> {
        let s = self.inner.lock().unwrap();
        s.statements.iter().map(|(_, b)| b.clone()).collect()
    }

    pub fn opened(&self) -> Vec<ConnectParams> {
        self.inner.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> usize {
        self.inner.lock().unwrap().closed
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn open(&self, params: &ConnectParams) -> Result<Box<dyn DbHandle>, DriverError> {
        let mut s = self.inner.lock().unwrap();
        if let Some(msg) = s.fail_open.take() {
            return Err(DriverError::new(msg));
        }
        s.opened.push(params.clone());
        Ok(Box::new(ScriptedHandle {
            inner: self.inner.clone(),
        }))
    }
}

struct ScriptedHandle {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedHandle {
    fn next(&self, sql: &str, binds: &BindParams) -> Option<Reply> {
        let mut s = self.inner.lock().unwrap();
        s.statements.push((sql.to_string(), binds.clone()));
        s.replies.pop_front()
    }
}

#[async_trait]
impl DbHandle for ScriptedHandle {
    async fn fetch_all(&mut self, sql: &str, binds: &BindParams) -> Result<Vec<Row>, DriverError> {
        match self.next(sql, binds) {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(msg)) => Err(DriverError::new(msg)),
            Some(Reply::Affected(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&mut self, sql: &str, binds: &BindParams) -> Result<u64, DriverError> {
        match self.next(sql, binds) {
            Some(Reply::Affected(n)) => Ok(n),
            Some(Reply::Fail(msg)) => Err(DriverError::new(msg)),
            Some(Reply::Rows(_)) | None => Ok(0),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.inner.lock().unwrap().closed += 1;
        Ok(())
    }
}

pub fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
