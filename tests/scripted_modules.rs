//! Integration tests for scripted modules and the console transport.

mod common;

use std::path::Path;

use common::{Harness, chat, room, user};
use steamnerd::error::LoadError;
use steamnerd::module::callbacks::command;
use steamnerd::module::{Module, Scope};
use steamnerd::network::Recipient;
use steamnerd::network::console;
use steamnerd::scripting::TomlScriptLoader;

const GREETER: &str = r#"
name = "greeter"
description = "Greets people"
on_chat_enter = "Welcome, {name}!"
on_chat_leave = "Bye, {name}."

[[command]]
match = ["greet"]
help = "Greets you"
reply = "Hello {sender}{args}"
"#;

fn write(dir: &Path, file: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_broken_script_does_not_block_others() {
    let harness = Harness::new();
    let good = write(harness.dir.path(), "greeter.toml", GREETER);
    let broken = write(harness.dir.path(), "broken.toml", "name = [unterminated\n");
    let missing = harness.dir.path().join("missing.toml");

    let mut builder = harness.builder();
    let failures = builder.load_scripts(
        &TomlScriptLoader,
        [
            (broken.as_path(), Scope::Global),
            (missing.as_path(), Scope::Global),
            (good.as_path(), Scope::Room(room(1))),
        ],
    );
    assert_eq!(failures.len(), 2);
    assert!(matches!(failures[0], LoadError::Parse { .. }));
    assert!(matches!(failures[1], LoadError::Read { .. }));

    let host = builder.build();
    assert_eq!(host.len(), 1);
    let info = host.module("greeter", Scope::Room(room(1))).unwrap();
    assert_eq!(info.description, "Greets people");
    assert_eq!(info.scope, Scope::Room(room(1)));
}

#[tokio::test]
async fn test_scripted_command_replies() {
    let harness = Harness::new();
    let path = write(harness.dir.path(), "greeter.toml", GREETER);
    let mut builder = harness.builder();
    builder
        .load_script(&TomlScriptLoader, &path, Scope::Room(room(1)))
        .unwrap();
    let host = builder.build();

    host.handle_event(&chat(1, user(5), "!greet")).await;
    // Other rooms do not reach a room-bound module.
    host.handle_event(&chat(2, user(5), "!greet")).await;

    assert_eq!(
        harness.outbound.sent(),
        vec![(Recipient::Room(room(1)), format!("Hello {}", user(5)))]
    );
}

#[tokio::test]
async fn test_console_drives_host() {
    let harness = Harness::new();
    let path = write(harness.dir.path(), "greeter.toml", GREETER);
    let mut builder = harness.builder();
    builder
        .load_script(&TomlScriptLoader, &path, Scope::Global)
        .unwrap();
    let host = builder.build();

    let input = format!(
        "# session\n\
         join 7 {u} Alyx Vance\n\
         not an event\n\
         chat 7 {u} !greet\n\
         leave 7 {u}\n",
        u = user(5)
    );
    let handled = console::run(&host, input.as_bytes()).await.unwrap();
    assert_eq!(handled, 3);

    assert_eq!(
        harness.outbound.texts(),
        vec![
            "Welcome, Alyx Vance!".to_string(),
            format!("Hello {}", user(5)),
            "Bye, Alyx Vance.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_module_reads_script_variables() {
    let harness = Harness::new();
    let path = write(
        harness.dir.path(),
        "rules.toml",
        "name = \"rules\"\n\n[vars]\nmotto = \"be nice\"\nstrikes = 3\n",
    );

    let reader = Module::builder("reader")
        .global()
        .command(
            ["motto"],
            "",
            command(|ctx, msg, _| async move {
                let text = match ctx.module("rules").and_then(|m| m.variables.get("motto")) {
                    Some(toml::Value::String(motto)) => motto.clone(),
                    other => format!("unexpected: {other:?}"),
                };
                ctx.reply(&msg, &text).await?;
                Ok(())
            }),
        )
        .build()
        .unwrap();

    let mut builder = harness.builder().module(reader);
    builder
        .load_script(&TomlScriptLoader, &path, Scope::Room(room(1)))
        .unwrap();
    let host = builder.build();

    let info = host.module("rules", Scope::Global).unwrap();
    assert_eq!(info.variables.get("strikes"), Some(&toml::Value::Integer(3)));

    host.handle_event(&chat(1, user(5), "!motto")).await;
    assert_eq!(harness.outbound.texts(), vec!["be nice".to_string()]);
}
