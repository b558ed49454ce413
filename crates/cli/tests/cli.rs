use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_create-dom-document"))
}

#[test]
fn prints_count_and_document() {
    let output = binary().output().expect("failed to run binary");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("The tree just created contains: 4 elements.")
    );

    let xml = lines.next().unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\"?><company>"));
    assert!(xml.contains("<category idea=\"great\">XML Parsing Tools</category>"));
    assert!(xml.ends_with("</company>"));
}

#[test]
fn any_argument_is_a_usage_error() {
    for arg in ["extra", "--help", "-v"] {
        let output = binary().arg(arg).output().expect("failed to run binary");
        assert_eq!(output.status.code(), Some(1), "argument {:?}", arg);

        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains("Usage:"));
        assert!(!stdout.contains("<company>"));
    }
}
