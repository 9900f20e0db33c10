//! Integration tests for the wiregen binary.
//!
//! Runs generate, check and describe against schema files in a temporary
//! directory and inspects exit status, stdout and written files.

#![allow(non_snake_case)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ORDERS: &str = r#"
namespace = "org.example.orders"

[[enums]]
name = "Status"
encoding = "integer"
values = [{ label = "OPEN", value = 1 }, { label = "CLOSED", value = 2 }]

[[messages]]
name = "Order"

[[messages.fields]]
name = "id"
type = "long"
required = true

[[messages.fields]]
name = "status"
type = "Status"
required = true

[[messages.fields]]
name = "lines"
type = "string"
repeated = true
"#;

fn wiregen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wiregen"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn write_schema(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("orders.toml");
    fs::write(&path, ORDERS).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// Generate
// =============================================================================

mod generate {
    use super::*;

    #[test]
    fn generate___default_config___writes_java_sources() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir);

        let output = wiregen(dir.path(), &["generate", "--schema", "orders.toml", "-o", "out"]);

        assert!(output.status.success(), "{output:?}");
        assert!(stdout(&output).contains("✓ Generated"));
        assert!(dir.path().join("out/org/example/orders/Order.java").exists());
        assert!(dir.path().join("out/org/example/orders/Status.java").exists());
    }

    #[test]
    fn generate___config_in_working_directory___is_picked_up() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir);
        fs::write(
            dir.path().join("wiregen.toml"),
            "backends = [\"json-schema\"]\noutput_dir = \"gen\"\n",
        )
        .unwrap();

        let output = wiregen(dir.path(), &["generate", "--schema", "orders.toml"]);

        assert!(output.status.success(), "{output:?}");
        let text = fs::read_to_string(dir.path().join("gen/org.example.orders.schema.json")).unwrap();
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(document.is_object());
    }

    #[test]
    fn generate___unknown_lang___fails() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir);

        let output = wiregen(
            dir.path(),
            &["generate", "--schema", "orders.toml", "--lang", "cobol"],
        );

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("cobol"));
    }

    #[test]
    fn generate___missing_schema_flag___is_usage_error() {
        let dir = TempDir::new().unwrap();

        let output = wiregen(dir.path(), &["generate"]);

        assert!(!output.status.success());
    }
}

// =============================================================================
// Check
// =============================================================================

mod check {
    use super::*;

    #[test]
    fn check___valid_schema___prints_counts() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir);

        let output = wiregen(dir.path(), &["check", "--schema", "orders.toml"]);

        assert!(output.status.success(), "{output:?}");
        let text = stdout(&output);
        assert!(text.contains("✓ orders.toml is valid"));
        assert!(text.contains("Messages: 1"));
        assert!(text.contains("Enums: 1"));
    }

    #[test]
    fn check___unresolved_type___fails_with_position() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("broken.toml"),
            "[[messages]]\nname = \"A\"\nline = 3\n\n[[messages.fields]]\nname = \"b\"\ntype = \"Nope\"\nline = 7\n",
        )
        .unwrap();

        let output = wiregen(dir.path(), &["check", "--schema", "broken.toml"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("broken.toml:7"), "{stderr}");
        assert!(stderr.contains("Nope"));
    }
}

// =============================================================================
// Describe
// =============================================================================

mod describe {
    use super::*;

    #[test]
    fn describe___message___prints_json_plan() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir);

        let output = wiregen(
            dir.path(),
            &["describe", "--schema", "orders.toml", "--message", "Order"],
        );

        assert!(output.status.success(), "{output:?}");
        let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(plan["name"], "Order");
        assert_eq!(plan["constructor"]["required"], serde_json::json!(["id", "status"]));
    }

    #[test]
    fn describe___log_level_flag___accepted_after_subcommand() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir);

        let output = wiregen(
            dir.path(),
            &["describe", "--schema", "orders.toml", "--log-level", "off"],
        );

        assert!(output.status.success(), "{output:?}");
        assert!(String::from_utf8_lossy(&output.stderr).is_empty());
    }
}
