#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case("java", "java" ; "java")]
#[test_case("json-schema", "json-schema" ; "json schema")]
#[test_case("json_schema", "json-schema" ; "json schema underscore")]
fn backend_for___known_names___resolve(name: &str, expected: &str) {
    let backend = backend_for(name).unwrap();

    assert_eq!(backend.name(), expected);
}

#[test]
fn backend_for___unknown_name___returns_error() {
    let result = backend_for("cobol");

    let err = result.err().unwrap();
    assert!(matches!(err, CodegenError::UnknownBackend(ref n) if n == "cobol"));
    assert_eq!(err.error_code(), 100);
}

#[test]
fn Capabilities___from_config___copies_run_settings() {
    let mut config = CompileConfig::default();
    config.file_header = Some("// generated".to_string());
    config.to_from_with_context = true;
    config.set("java.serializable", false).unwrap();

    let caps = Capabilities::from_config(&config);

    assert!(caps.to_from_with_context);
    assert_eq!(caps.option::<bool>("java.serializable"), Some(false));
    assert_eq!(caps.option::<bool>("missing"), None);
    assert_eq!(caps.temporal.date.method, "toLocalDate");
}

#[test]
fn Capabilities___wrap___adds_header_and_footer_lines() {
    let caps = Capabilities {
        file_header: Some("// header".to_string()),
        file_footer: Some("// footer\n".to_string()),
        ..Capabilities::default()
    };

    let text = caps.wrap("body\n".to_string());

    assert_eq!(text, "// header\nbody\n// footer\n");
}

#[test]
fn write_files___creates_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        GeneratedFile::new("org/example/A.java", "class A {}\n".to_string()),
        GeneratedFile::new("schema.json", "{}".to_string()),
    ];

    let written = write_files(&files, dir.path()).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("org/example/A.java")).unwrap(),
        "class A {}\n"
    );
    assert!(dir.path().join("schema.json").exists());
}
