//! Needs a reachable MySQL server:
//! `MYSQL_HOST=127.0.0.1 MYSQL_USER=root MYSQL_PASSWORD=.. MYSQL_DATABASE=test cargo test -- --ignored`

mod common;

use std::sync::Arc;

use serde_json::json;

use common::Harness;
use mysql_mcp_gateway::clients::mysql::MySqlConnector;
use mysql_mcp_gateway::infra::config::Config;

fn env(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

#[tokio::test]
#[ignore]
async fn round_trip_against_real_mysql() {
    let mut h = Harness::start(Config::default(), Arc::new(MySqlConnector));
    h.call(r#"{"jsonrpc":"2.0","id":0,"method":"initialize"}"#).await;

    let conn = h
        .call(
            &json!({
                "jsonrpc": "2.0", "id": 1, "method": "connect_db",
                "params": {
                    "host": env("MYSQL_HOST", "127.0.0.1"),
                    "port": env("MYSQL_PORT", "3306").parse::<u16>().unwrap(),
                    "user": env("MYSQL_USER", "root"),
                    "password": env("MYSQL_PASSWORD", ""),
                    "database": env("MYSQL_DATABASE", "test"),
                }
            })
            .to_string(),
        )
        .await;
    assert_eq!(conn["result"]["status"], "success", "{conn}");

    let create = h
        .call(
            &json!({
                "jsonrpc": "2.0", "id": 2, "method": "create_or_modify_table",
                "params": {
                    "table_name": "mcp_gateway_probe",
                    "columns": [
                        {"name": "id", "type": "INT", "not_null": true, "auto_increment": true, "primary_key": true},
                        {"name": "label", "type": "VARCHAR(32)", "default": "'none'"},
                        {"name": "created", "type": "DATETIME", "default": "CURRENT_TIMESTAMP"}
                    ]
                }
            })
            .to_string(),
        )
        .await;
    assert_eq!(create["result"]["status"], "success", "{create}");

    let insert = h
        .call(r#"{"jsonrpc":"2.0","id":3,"method":"execute","params":{"sql":"INSERT INTO mcp_gateway_probe (label) VALUES (?), (?)","params":["a","b"]}}"#)
        .await;
    assert_eq!(insert["result"]["affected_rows"], 2);

    let rows = h
        .call(r#"{"jsonrpc":"2.0","id":4,"method":"query","params":{"sql":"SELECT id, label FROM mcp_gateway_probe ORDER BY id"}}"#)
        .await;
    assert_eq!(rows["result"]["rows"], json!([{"id": 1, "label": "a"}, {"id": 2, "label": "b"}]));

    let tables = h.call(r#"{"jsonrpc":"2.0","id":5,"method":"list_tables"}"#).await;
    assert!(tables["result"]["tables"]
        .as_array()
        .unwrap()
        .contains(&json!("mcp_gateway_probe")));

    let cols = h
        .call(r#"{"jsonrpc":"2.0","id":6,"method":"describe_table","params":{"table_name":"mcp_gateway_probe"}}"#)
        .await;
    assert_eq!(cols["result"]["columns"][0]["Field"], "id");

    for expected in [1, 0] {
        let del = h
            .call(r#"{"jsonrpc":"2.0","id":7,"method":"execute_command","params":{"sql":"DELETE FROM mcp_gateway_probe WHERE id=1"}}"#)
            .await;
        assert_eq!(del["result"]["affected_rows"], expected);
    }

    let recreated = h
        .call(
            &json!({
                "jsonrpc": "2.0", "id": 22, "method": "create_table",
                "params": {
                    "table_name": "mcp_gateway_probe",
                    "columns": [
                        {"name": "id", "type": "INT", "not_null": true, "auto_increment": true, "primary_key": true},
                        {"name": "label", "type": "VARCHAR(32)", "default": "'none'"},
                        {"name": "created", "type": "DATETIME", "default": "CURRENT_TIMESTAMP"}
                    ]
                }
            })
            .to_string(),
        )
        .await;
    assert_eq!(recreated["result"]["status"], "success");
    let count = h
        .call(r#"{"jsonrpc":"2.0","id":23,"method":"query","params":{"sql":"SELECT COUNT(*) AS n FROM mcp_gateway_probe"}}"#)
        .await;
    assert_eq!(count["result"]["rows"][0]["n"], 0, "recreating discards old rows");

    let bad = h
        .call(r#"{"jsonrpc":"2.0","id":7,"method":"query","params":{"sql":"SELEC nonsense"}}"#)
        .await;
    assert_eq!(bad["error"]["code"], -32000);

    // Statements MySQL refuses to prepare must still pass through.
    for (id, sql) in [
        (30, "LOCK TABLES mcp_gateway_probe WRITE"),
        (31, "UNLOCK TABLES"),
        (
            32,
            "CREATE TRIGGER mcp_gateway_probe_bi BEFORE INSERT ON mcp_gateway_probe \
             FOR EACH ROW SET NEW.label = UPPER(NEW.label)",
        ),
    ] {
        let req = json!({
            "jsonrpc": "2.0", "id": id, "method": "execute_command", "params": {"sql": sql}
        });
        let resp = h.call(&req.to_string()).await;
        assert!(resp.get("error").is_none(), "{sql}: {resp}");
    }

    h.call(r#"{"jsonrpc":"2.0","id":8,"method":"execute","params":{"sql":"DROP TABLE mcp_gateway_probe"}}"#)
        .await;
    h.finish().await;
}
