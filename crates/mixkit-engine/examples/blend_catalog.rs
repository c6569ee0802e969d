use std::env;
use std::process::ExitCode;

use mixkit_core::SchemeCatalog;
use mixkit_engine::{LogLevel, LoggingOptions, Mixer, Overrides, init_logging};

const DEMO_CATALOG: &str = r#"
[[schemes]]
name = "blog.User"
fields = [
  { name = "id", type = "int", primary_key = true, auto = true },
  { name = "name", type = "str", max_length = 40 },
  { name = "email", type = "email", unique = true },
]

[[schemes]]
name = "blog.Post"
fields = [
  { name = "id", type = "int", primary_key = true, auto = true },
  { name = "title", type = "str" },
  { name = "author", type = "record", relation = { target = "blog.User" } },
]
"#;

/// Usage: `blend_catalog [catalog.toml] [scheme] [count]`
fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let path = args.next();
    let scheme = args.next().unwrap_or_else(|| "Post".to_string());
    let count = args.next().and_then(|raw| raw.parse().ok()).unwrap_or(3);

    let options = LoggingOptions {
        level: LogLevel::Info,
        ..LoggingOptions::default()
    };
    if let Err(err) = init_logging(&options) {
        eprintln!("logging disabled: {err}");
    }

    let catalog = match path {
        Some(path) => SchemeCatalog::from_path(path),
        None => SchemeCatalog::from_toml_str(DEMO_CATALOG),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mixer = Mixer::from_catalog(catalog);
    match mixer.cycle(count).blend(&scheme, &Overrides::new()) {
        Ok(records) => {
            for record in records {
                println!("{}", record.to_json());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
