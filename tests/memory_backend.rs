#![cfg(feature = "memory")]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use search_bridge::sdk::memory::MemoryDriver;
use search_bridge::sdk::SdkError;
use search_bridge::{ConnectionConfig, ConnectionManager, Error, Forwarded};
use serde_json::{json, Value};
use tempfile::TempDir;

mod common;
use common::init_test_logging;

const DEMO_INI: &str = "\
project.name = demo
project.default_charset = utf-8
server.index = 8383

[pid]
type = id

[subject]
type = title

[message]
type = body
";

fn ini_dir() -> anyhow::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("demo.ini"), DEMO_INI)?;
    fs::write(dir.path().join("nokey.ini"), "project.name = nokey\n[subject]\ntype = title\n")?;
    Ok(dir)
}

fn manager(dir: &Path, config: ConnectionConfig) -> ConnectionManager {
    let config = ConnectionConfig {
        ini_directory: dir.to_path_buf(),
        ..config
    };
    ConnectionManager::new(config, Arc::new(MemoryDriver::new())).expect("valid config")
}

fn value(result: Forwarded<'_>) -> Value {
    result.into_value().expect("expected a plain value")
}

#[test]
fn overrides_fill_missing_keys_unless_overwrite_is_set() -> anyhow::Result<()> {
    init_test_logging();
    let dir = ini_dir()?;
    let overrides = json!({"server.index": 9999, "server.search": 8384});

    let keep = manager(
        dir.path(),
        ConnectionConfig::default().with_project_config("*", overrides.clone()),
    );
    let demo = keep.project("demo")?;
    assert_eq!(value(demo.call("get_config", &[json!("server.index")])?), json!("8383"));
    assert_eq!(value(demo.call("get_config", &[json!("server.search")])?), json!("8384"));

    let replace = manager(
        dir.path(),
        ConnectionConfig::default()
            .with_project_config("*", overrides)
            .with_overwrite(true),
    );
    let demo = replace.project("demo")?;
    assert_eq!(value(demo.call("get_config", &[json!("server.index")])?), json!("9999"));
    Ok(())
}

#[test]
fn index_and_search_round_trip() -> anyhow::Result<()> {
    let dir = ini_dir()?;
    let manager = manager(dir.path(), ConnectionConfig::default());
    let demo = manager.project("demo")?;

    demo.add([("pid", "1"), ("subject", "Rust search"), ("message", "fast and safe")])?;
    demo.add([("pid", "2"), ("subject", "PHP search"), ("message", "glue code")])?;
    demo.update([("pid", "2"), ("subject", "Go search"), ("message", "simple")], false)?;

    let searcher = demo.searcher()?;
    assert_eq!(searcher.count(Some("search"))?, 2);
    assert_eq!(searcher.count(Some("php"))?, 0, "update replaced the old document");

    let hits = searcher.search(Some("subject:rust"))?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].get("pid"), Some("1"));
    assert_eq!(hits[0].charset(), Some("utf-8"));

    assert!(demo.call("set_query", &[json!("search")])?.is_handle());
    assert!(demo.call("set_limit", &[json!(1)])?.is_handle());
    assert_eq!(value(demo.call("search", &[])?).as_array().map(Vec::len), Some(1));
    assert_eq!(value(demo.call("count", &[])?), json!(2));
    Ok(())
}

#[test]
fn blind_inserts_keep_duplicate_keys() -> anyhow::Result<()> {
    let dir = ini_dir()?;
    let manager = manager(dir.path(), ConnectionConfig::default());
    let demo = manager.project("demo")?;

    demo.add([("pid", "1"), ("subject", "first")])?;
    demo.add([("pid", "1"), ("subject", "second")])?;
    assert_eq!(demo.searcher()?.count(None)?, 2);

    demo.update([("pid", "1"), ("subject", "third")], false)?;
    assert_eq!(demo.searcher()?.count(None)?, 1);
    Ok(())
}

#[test]
fn index_operations_chain_and_delete_by_key() -> anyhow::Result<()> {
    let dir = ini_dir()?;
    let manager = manager(dir.path(), ConnectionConfig::default());
    let demo = manager.project("demo")?;

    for pid in ["1", "2", "3"] {
        demo.add([("pid", pid), ("subject", "x")])?;
    }
    assert!(demo.call("delete", &[json!("1"), json!("3")])?.is_handle());
    assert_eq!(demo.searcher()?.count(None)?, 1);

    assert!(demo.call("clean", &[])?.is_handle());
    assert_eq!(demo.searcher()?.count(None)?, 0);
    assert_eq!(value(demo.call("flush_index", &[])?), json!(true));
    Ok(())
}

#[test]
fn client_operations_describe_the_project() -> anyhow::Result<()> {
    let dir = ini_dir()?;
    let manager = manager(dir.path(), ConnectionConfig::default().with_charset(Some("gbk")));
    let demo = manager.project("demo")?;

    assert_eq!(value(demo.call("get_name", &[])?), json!("demo"));
    assert_eq!(value(demo.call("get_default_charset", &[])?), json!("gbk"));
    assert_eq!(
        value(demo.call("get_fields", &[])?),
        json!(["pid", "subject", "message"])
    );
    assert!(matches!(
        demo.call("rank", &[]),
        Err(Error::MethodNotFound { .. })
    ));
    Ok(())
}

#[test]
fn missing_or_invalid_ini_files_fail_to_open() -> anyhow::Result<()> {
    let dir = ini_dir()?;
    let manager = manager(dir.path(), ConnectionConfig::default());

    match manager.project("absent") {
        Err(Error::Open {
            source: SdkError::Io(e),
            ..
        }) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected a not-found open error, got {other:?}"),
    }
    assert!(matches!(
        manager.project("nokey"),
        Err(Error::Open {
            source: SdkError::Other(_),
            ..
        })
    ));
    Ok(())
}

#[test]
fn default_tokenizer_handles_mixed_text() -> anyhow::Result<()> {
    let dir = ini_dir()?;
    let manager = manager(dir.path(), ConnectionConfig::default());
    let tokens = manager.project("demo")?.tokenizer()?.tokenize("Hello 世界");
    assert_eq!(tokens, ["hello", "世", "界"]);
    assert!(!manager.version()?.is_empty());
    Ok(())
}
