use std::fs;

use mixkit_core::Error;
use mixkit_engine::{LogLevel, LoggingOptions, init_logging};

#[test]
fn subscriber_installs_once() {
    let path = std::env::temp_dir().join(format!("mixkit-log-{}.jsonl", std::process::id()));
    let options = LoggingOptions {
        level: LogLevel::Info,
        json: true,
        file: Some(path.clone()),
    };

    init_logging(&options).expect("first install");
    assert!(path.exists());

    let again = init_logging(&options);
    assert!(matches!(again, Err(Error::Io(_))));

    let _ = fs::remove_file(path);
}
