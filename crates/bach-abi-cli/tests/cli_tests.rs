//! CLI integration tests for bach-abi
//!
//! Every run points `--config` at a temporary file so the user's own
//! configuration is never read or written.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
const HOLDER: &str = "742d35cc6634c0532925a3b844bc9e7595f0ab3d";

/// Helper to run the CLI with an isolated config file
fn run_abi(dir: &TempDir, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bach-abi"))
        .arg("--config")
        .arg(dir.path().join("abi.toml"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Invalid JSON")
}

fn word(n: u64) -> String {
    format!("{:064x}", n)
}

fn transfer_call() -> String {
    format!("0xa9059cbb{:0>64}{}", HOLDER, word(1000))
}

fn write_abi(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("vault.json");
    std::fs::write(
        &path,
        r#"[
            {"type": "function", "name": "deposit", "stateMutability": "payable",
             "inputs": [{"name": "memo", "type": "string"}], "outputs": []},
            {"type": "event", "name": "Deposited", "anonymous": false,
             "inputs": [{"name": "who", "type": "address", "indexed": true},
                        {"name": "amount", "type": "uint256", "indexed": false}]}
        ]"#,
    )
    .unwrap();
    path
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["encode", "decode", "encode-packed", "selector", "topic", "decode-call", "decode-log"] {
        assert!(stdout.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("bach-abi"));
}

// ==================== Encoding Tests ====================

#[test]
fn test_encode() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["encode", "uint32,bool", "69", "true"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("0x{}{}", word(69), word(1)));
}

#[test]
fn test_encode_negative_value() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["--json", "encode", "int8", "-1"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["encoded"], format!("0x{}", "ff".repeat(32)));
    assert_eq!(json["length"], 32);
}

#[test]
fn test_encode_out_of_range() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["encode", "uint8", "256"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[test]
fn test_encode_wrong_value_count() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["--json", "encode", "uint8,uint8", "1"]);
    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("expected 2 values"));
}

#[test]
fn test_encode_packed() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(
        &dir,
        &["encode-packed", "int16,bytes1,uint16,string", "-1", "0x42", "3", "Hello, world!"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "0xffff42000348656c6c6f2c20776f726c6421");
}

// ==================== Decoding Tests ====================

#[test]
fn test_decode_named() {
    let dir = TempDir::new().unwrap();
    let data = format!("0x{}{}{}{}", word(7), word(0x40), word(2), format!("{:0<64}", "6869"));
    let output = run_abi(&dir, &["decode", "uint256 amount,string memo", &data]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("amount: 7"));
    assert!(stdout.contains("memo: hi"));
}

#[test]
fn test_decode_json() {
    let dir = TempDir::new().unwrap();
    let data = format!("0x{}{}{}{}", word(0x20), word(2), word(1), word(2));
    let output = run_abi(&dir, &["--json", "decode", "uint8[]", &data]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["values"], serde_json::json!([["1", "2"]]));
}

#[test]
fn test_decode_rejects_bad_offset() {
    let dir = TempDir::new().unwrap();
    let data = format!("0x{}", word(0x1000));
    let output = run_abi(&dir, &["decode", "string", &data]);
    assert!(!output.status.success());
}

#[test]
fn test_decode_invalid_hex() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["decode", "uint256", "0xnothex"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid hex"));
}

// ==================== Signature Tests ====================

#[test]
fn test_selector() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["--json", "selector", "transfer(address to, uint256 amount)"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["selector"], "0xa9059cbb");
    assert_eq!(json["signature"], "transfer(address,uint256)");
}

#[test]
fn test_topic() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(
        &dir,
        &["topic", "Transfer(address indexed from, address indexed to, uint256 value)"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(TRANSFER_TOPIC));
}

#[test]
fn test_selector_invalid_signature() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["selector", "transfer(address"]);
    assert!(!output.status.success());
}

// ==================== Inspection Tests ====================

#[test]
fn test_decode_call_defaults_to_erc20() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["--json", "decode-call", &transfer_call()]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["known"], true);
    assert_eq!(json["function"], "transfer");
    assert_eq!(json["args"]["to"], format!("0x{}", HOLDER));
    assert_eq!(json["args"]["value"], "1000");
}

#[test]
fn test_decode_call_unknown_selector() {
    let dir = TempDir::new().unwrap();
    let abi = write_abi(dir.path());
    let output = run_abi(
        &dir,
        &["--json", "decode-call", "--abi", abi.to_str().unwrap(), &transfer_call()],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["known"], false);
    assert_eq!(json["selector"], "0xa9059cbb");
}

#[test]
fn test_decode_call_with_abi_file() {
    let dir = TempDir::new().unwrap();
    let abi = write_abi(dir.path());
    let selector = run_abi(&dir, &["--json", "selector", "deposit(string)"]);
    let selector = stdout_json(&selector)["selector"].as_str().unwrap().to_string();

    let data = format!("{}{}{}{}", selector, word(0x20), word(2), format!("{:0<64}", "6869"));
    let output = run_abi(&dir, &["decode-call", "--abi", abi.to_str().unwrap(), &data]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("deposit(string)"));
    assert!(stdout.contains("memo: hi"));
}

#[test]
fn test_decode_log() {
    let dir = TempDir::new().unwrap();
    let to = format!("0x{}", word(0x1234));
    let from = format!("0x{:0>64}", HOLDER);
    let data = format!("0x{}", word(1000));
    let output = run_abi(
        &dir,
        &[
            "--json", "decode-log", "--topic", TRANSFER_TOPIC, "--topic", &from, "--topic", &to,
            "--data", &data,
        ],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["event"], "Transfer");
    assert_eq!(json["params"][0]["name"], "from");
    assert_eq!(json["params"][0]["indexed"], true);
    assert_eq!(json["params"][2]["value"], "1000");
}

#[test]
fn test_decode_log_requires_topic() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["decode-log", "--data", "0x"]);
    assert!(!output.status.success());
}

// ==================== Config Tests ====================

#[test]
fn test_config_add_abi_is_used_by_decode_log() {
    let dir = TempDir::new().unwrap();
    let abi = write_abi(dir.path());
    let output = run_abi(&dir, &["config", "--add-abi", abi.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(dir.path().join("abi.toml").exists());

    let topic = run_abi(&dir, &["--json", "topic", "Deposited(address,uint256)"]);
    let topic = stdout_json(&topic)["topic"].as_str().unwrap().to_string();
    let who = format!("0x{}", word(0xbeef));
    let output = run_abi(
        &dir,
        &["decode-log", "--topic", &topic, "--topic", &who, "--data", &format!("0x{}", word(5))],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Deposited"));
    assert!(stdout.contains("amount: 5"));
}

#[test]
fn test_config_show_json() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["config", "--set-json", "true"]);
    assert!(output.status.success());

    // JSON output is now the default
    let output = run_abi(&dir, &["config", "--show"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["json"], true);
    assert_eq!(json["log_level"], "warn");
}

#[test]
fn test_config_add_missing_abi() {
    let dir = TempDir::new().unwrap();
    let output = run_abi(&dir, &["config", "--add-abi", "/nonexistent/abi.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_malformed_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("abi.toml"), "json = \"yes\"").unwrap();
    let output = run_abi(&dir, &["selector", "f()"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}
