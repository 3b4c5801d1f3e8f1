#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::task::JoinHandle;

use mysql_mcp_gateway::clients::driver::{Connector, DbHandle, DriverError};
use mysql_mcp_gateway::domain::{BindParams, ConnectParams, Row};
use mysql_mcp_gateway::infra::boot;
use mysql_mcp_gateway::infra::config::Config;
use mysql_mcp_gateway::infra::runtime::output::OutputChannel;
use mysql_mcp_gateway::infra::runtime::transport::ExitReason;

/// Toy engine that understands just enough SQL to exercise every tool.
#[derive(Default)]
struct Engine {
    tables: BTreeMap<String, Vec<String>>,
    log: Vec<String>,
    opens: usize,
    closes: usize,
    refuse_password: Option<String>,
}

#[derive(Clone, Default)]
pub struct MemoryConnector {
    engine: Arc<Mutex<Engine>>,
}

impl MemoryConnector {
    pub fn refusing_password(pw: &str) -> Self {
        let c = Self::default();
        c.engine.lock().unwrap().refuse_password = Some(pw.into());
        c
    }

    pub fn log(&self) -> Vec<String> {
        self.engine.lock().unwrap().log.clone()
    }

    pub fn opens(&self) -> usize {
        self.engine.lock().unwrap().opens
    }

    pub fn closes(&self) -> usize {
        self.engine.lock().unwrap().closes
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, params: &ConnectParams) -> Result<Box<dyn DbHandle>, DriverError> {
        let mut e = self.engine.lock().unwrap();
        if e.refuse_password.as_deref() == Some(params.password.as_str()) {
            return Err(DriverError::new(format!(
                "Access denied for user '{}'@'{}'",
                params.user, params.host
            )));
        }
        e.opens += 1;
        Ok(Box::new(MemoryHandle {
            engine: self.engine.clone(),
        }))
    }
}

struct MemoryHandle {
    engine: Arc<Mutex<Engine>>,
}

fn words(sql: &str) -> Vec<String> {
    sql.split(|c: char| c.is_whitespace() || c == '(')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl DbHandle for MemoryHandle {
    async fn fetch_all(&mut self, sql: &str, _binds: &BindParams) -> Result<Vec<Row>, DriverError> {
        let mut e = self.engine.lock().unwrap();
        e.log.push(sql.to_string());
        let w = words(sql);
        match w.first().map(|s| s.to_ascii_uppercase()).as_deref() {
            Some("SHOW") => Ok(e
                .tables
                .keys()
                .map(|t| row(&[("Tables_in_app", json!(t))]))
                .collect()),
            Some("DESCRIBE") => {
                let table = w.get(1).cloned().unwrap_or_default();
                let cols = e.tables.get(&table).ok_or_else(|| {
                    DriverError::new(format!("Table 'app.{table}' doesn't exist"))
                })?;
                Ok(cols
                    .iter()
                    .map(|c| row(&[("Field", json!(c)), ("Type", json!("int"))]))
                    .collect())
            }
            Some("SELECT") => Ok(vec![row(&[("n", json!(1))])]),
            _ => Err(DriverError::new(format!(
                "You have an error in your SQL syntax near '{sql}'"
            ))),
        }
    }

    async fn execute(&mut self, sql: &str, _binds: &BindParams) -> Result<u64, DriverError> {
        let mut e = self.engine.lock().unwrap();
        e.log.push(sql.to_string());
        let w = words(sql);
        match w.first().map(|s| s.to_ascii_uppercase()).as_deref() {
            Some("CREATE") => {
                let name = w.get(2).cloned().unwrap_or_default();
                let body = sql.split_once('(').map(|(_, b)| b).unwrap_or("");
                let cols = body
                    .split(',')
                    .filter_map(|c| c.split_whitespace().next())
                    .filter(|c| !c.eq_ignore_ascii_case("UNIQUE"))
                    .map(str::to_string)
                    .collect();
                e.tables.insert(name, cols);
                Ok(0)
            }
            Some("DROP") => {
                let name = w.last().cloned().unwrap_or_default();
                e.tables.remove(&name);
                Ok(0)
            }
            Some("INSERT") | Some("UPDATE") | Some("DELETE") => Ok(1),
            _ => Err(DriverError::new(format!(
                "You have an error in your SQL syntax near '{sql}'"
            ))),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.engine.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// A running gateway wired to in-memory pipes.
pub struct Harness {
    pub stdin: DuplexStream,
    pub stdout: Lines<BufReader<DuplexStream>>,
    pub task: JoinHandle<anyhow::Result<ExitReason>>,
}

impl Harness {
    pub fn start(cfg: Config, connector: Arc<dyn Connector>) -> Self {
        let (stdin, server_in) = tokio::io::duplex(1 << 16);
        let (server_out, client_out) = tokio::io::duplex(1 << 16);
        let task = tokio::spawn(boot::run_with(
            cfg,
            connector,
            BufReader::new(server_in),
            OutputChannel::new(server_out),
            std::future::pending(),
        ));
        Self {
            stdin,
            stdout: BufReader::new(client_out).lines(),
            task,
        }
    }

    pub async fn send(&mut self, line: &str) {
        self.stdin.write_all(line.as_bytes()).await.unwrap();
        self.stdin.write_all(b"\n").await.unwrap();
    }

    pub async fn recv(&mut self) -> Value {
        let line = self
            .stdout
            .next_line()
            .await
            .unwrap()
            .expect("gateway closed stdout");
        serde_json::from_str(&line).unwrap()
    }

    pub async fn call(&mut self, line: &str) -> Value {
        self.send(line).await;
        self.recv().await
    }

    /// Closes stdin and waits for the gateway to finish.
    pub async fn finish(self) -> ExitReason {
        drop(self.stdin);
        self.task.await.unwrap().unwrap()
    }
}
