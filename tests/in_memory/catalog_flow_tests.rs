//! Bots whose configuration and commands come from files.

use super::helpers::{ALICE, GENERAL, OWNER, RecordingAction, general, message, transport};
use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use mockable::DefaultClock;
use parley::command::{
    domain::{ActionBindings, CommandCatalog},
    services::{CommandRegistry, DispatchOutcome, Dispatcher},
};
use parley::config::{BotConfig, open_config_dir};
use parley::interaction::adapters::memory::InMemoryChatTransport;
use rstest::rstest;
use std::sync::Arc;
use uuid::Uuid;

const CONFIG: &str = r#"{"owner": "100", "prefix": "$"}"#;

const CATALOG: &str = r#"{
    "groups": [{"name": "fun", "description": "Games and toys"}],
    "commands": [
        {
            "name": "roll",
            "description": "Roll a die",
            "group": "fun",
            "aliases": ["dice"],
            "usage": [
                {
                    "name": "sides",
                    "validator": {"type": "integer_range", "min": 2, "max": 100},
                    "optional": true,
                    "default": "6"
                }
            ]
        }
    ]
}"#;

/// Writes the config and catalog into a fresh directory.
fn config_dir() -> (Utf8PathBuf, Dir) {
    let root = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .expect("temp dir should be UTF-8")
        .join(format!("parley-bot-{}", Uuid::new_v4()));
    Dir::create_ambient_dir_all(&root, ambient_authority()).expect("create config dir");
    let dir = open_config_dir(&root).expect("open config dir");
    dir.write("bot.json", CONFIG).expect("write config");
    dir.write("commands.json", CATALOG).expect("write catalog");
    (root, dir)
}

#[rstest]
#[tokio::test]
async fn bot_runs_commands_declared_on_disk(transport: InMemoryChatTransport) {
    let (_root, dir) = config_dir();
    let config = BotConfig::load(&dir, "bot.json".as_ref()).expect("config loads");
    let catalog = CommandCatalog::load(&dir, "commands.json".as_ref()).expect("catalog loads");
    dir.remove_open_dir_all().expect("remove config dir");

    let roll = RecordingAction::default();
    let mut registry = CommandRegistry::for_config(&config).expect("built-ins register");
    registry
        .register_catalog(&catalog, ActionBindings::new().bind("roll", roll.clone()))
        .expect("catalog registers");
    assert_eq!(config.owner().as_str(), OWNER);
    let dispatcher = Dispatcher::new(Arc::new(transport.clone()), registry, config, DefaultClock);

    let mut outcomes = Vec::new();
    for content in ["$dice 20", "$roll", "$roll 1", "!roll"] {
        outcomes.push(
            dispatcher
                .handle(&message(ALICE, GENERAL, content))
                .await
                .expect("dispatch succeeds"),
        );
    }

    assert_eq!(
        outcomes,
        vec![
            DispatchOutcome::Handled,
            DispatchOutcome::Handled,
            DispatchOutcome::Rejected,
            DispatchOutcome::Ignored,
        ]
    );
    assert_eq!(roll.calls(), vec![vec!["20".to_owned()], vec!["6".to_owned()]]);
    assert_eq!(
        transport.sent_contents(&general()),
        vec!["The correct usage is `$roll [sides]`\n\n(Use `$help roll` for more details)".to_owned()]
    );
}

#[rstest]
#[tokio::test]
async fn help_lists_catalog_groups(transport: InMemoryChatTransport) {
    let catalog = CommandCatalog::from_json_str(CATALOG).expect("catalog parses");
    let mut registry = CommandRegistry::for_config(&BotConfig::from_json_str(CONFIG).expect("config parses"))
        .expect("built-ins register");
    registry
        .register_catalog(&catalog, ActionBindings::new().bind("roll", RecordingAction::default()))
        .expect("catalog registers");
    let config = BotConfig::from_json_str(CONFIG).expect("config parses");
    let dispatcher = Dispatcher::new(Arc::new(transport.clone()), registry, config, DefaultClock);

    dispatcher
        .handle(&message(ALICE, GENERAL, "$help fun"))
        .await
        .expect("help runs");

    assert_eq!(
        transport.sent_contents(&general()),
        vec!["__Fun__ commands: Games and toys\n  `$roll` - Roll a die\n".to_owned()]
    );
}
