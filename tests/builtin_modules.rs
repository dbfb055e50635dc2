//! Integration tests for the native modules and admin promotion.

mod common;

use common::{Harness, chat, friend, room, user};
use steamnerd::builtin;
use steamnerd::module::{Dispatched, Scope};
use steamnerd::network::Recipient;
use steamnerd::state::UserDirectory;

fn with_builtins(harness: &Harness) -> steamnerd::host::SteamNerd {
    let mut builder = harness.builder();
    for name in builtin::NAMES {
        builder.add_module(builtin::create(name, Scope::Global).unwrap().unwrap());
    }
    builder.build()
}

#[tokio::test]
async fn test_admin_add_persists_and_survives_reload() {
    let boss = user(1);
    let harness = Harness::with_admins(&[boss]);
    let host = with_builtins(&harness);
    let newcomer = user(42);

    // Non-admins cannot use the admin module.
    let outcomes = host
        .handle_event(&friend(newcomer, &format!("!admin add {newcomer}")))
        .await;
    let admin_outcome = outcomes.iter().find(|(n, _)| n == "admin").unwrap();
    assert!(matches!(admin_outcome.1, Dispatched::Suppressed(_)));
    assert!(!host.users().is_admin(newcomer));

    host.handle_event(&friend(boss, &format!("!admin add {newcomer}")))
        .await;
    assert!(host.users().is_admin(newcomer));
    assert_eq!(
        harness.outbound.sent(),
        vec![(Recipient::User(boss), format!("{newcomer} is now an admin."))]
    );

    // Second promotion is a no-op and writes nothing.
    host.handle_event(&friend(boss, &format!("!admin add {newcomer}")))
        .await;
    assert_eq!(
        harness.outbound.texts()[1],
        format!("{newcomer} is already an admin.")
    );
    let content = std::fs::read_to_string(harness.admin_path()).unwrap();
    assert_eq!(content, format!("{boss}\n{newcomer}\n"));

    // The newcomer now passes the gate without restarting.
    harness.outbound.clear();
    host.handle_event(&friend(newcomer, "!admin list")).await;
    assert_eq!(
        harness.outbound.texts(),
        vec![format!("Admins: {boss}, {newcomer}")]
    );

    let reloaded = UserDirectory::load(harness.admin_path()).unwrap();
    assert_eq!(reloaded.admins(), vec![boss, newcomer]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_admin_add_write_failure_is_contained() {
    let boss = user(1);
    let harness = Harness::with_admins(&[boss]);
    let host = with_builtins(&harness);
    let newcomer = user(42);

    // A directory in place of the list makes the append fail.
    std::fs::remove_file(harness.admin_path()).unwrap();
    std::fs::create_dir(harness.admin_path()).unwrap();

    let outcomes = host
        .handle_event(&friend(boss, &format!("!admin add {newcomer}")))
        .await;
    let admin_outcome = outcomes.iter().find(|(n, _)| n == "admin").unwrap();
    assert!(admin_outcome.1.is_failed());
    assert!(!host.users().is_admin(newcomer));
    assert!(harness.outbound.sent().is_empty());

    // The runtime keeps serving other commands.
    host.handle_event(&friend(boss, "!admin list")).await;
    assert_eq!(harness.outbound.texts(), vec![format!("Admins: {boss}")]);
}

#[tokio::test]
async fn test_admin_add_rejects_bad_ids() {
    let boss = user(1);
    let harness = Harness::with_admins(&[boss]);
    let host = with_builtins(&harness);

    host.handle_event(&friend(boss, "!admin add bogus")).await;
    host.handle_event(&friend(boss, "!admin add")).await;
    let texts = harness.outbound.texts();
    assert!(texts[0].starts_with("Not a valid SteamID"));
    assert_eq!(texts[1], "Usage: !admin add <steamid>");
    assert_eq!(host.users().admins(), vec![boss]);
}

#[tokio::test]
async fn test_dice_replies_in_room() {
    let harness = Harness::new();
    let host = with_builtins(&harness);

    host.handle_event(&chat(8, user(3), "!roll 3d1")).await;
    host.handle_event(&chat(8, user(3), "!roll 500d6")).await;

    let sent = harness.outbound.sent();
    assert_eq!(
        sent[0],
        (
            Recipient::Room(room(8)),
            format!("{} rolled 3d1: 1 + 1 + 1 = 3", user(3))
        )
    );
    assert_eq!(sent[1].1, "Can't roll that: at most 100 dice.");
}

#[tokio::test]
async fn test_help_lists_visible_modules() {
    let harness = Harness::new();
    let host = with_builtins(&harness);

    host.handle_event(&friend(user(3), "!help")).await;
    host.handle_event(&friend(user(3), "!help dice")).await;
    host.handle_event(&friend(user(3), "!help admin")).await;

    let texts = harness.outbound.texts();
    assert_eq!(
        texts[0],
        "Modules: help, dice. Use !help <module> for its commands."
    );
    assert_eq!(
        texts[1],
        "dice: Rolls dice\n  !roll - Roll NdM dice (default 1d6)"
    );
    assert_eq!(texts[2], "No module named 'admin'.");
}
