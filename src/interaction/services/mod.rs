//! Interaction services: invocation context, prompts and reaction menus.

mod context;
mod reaction_menu;

pub use context::{
    CommandContext, PromptFilter, PromptOptions, ReactionPromptOptions, ShutdownSignal,
};
pub use reaction_menu::{
    DEFAULT_MENU_TIMEOUT, MenuError, MenuFilter, MenuHandler, MenuReport, MenuTermination,
    ReactionMenu, ReactionMenuOptions, ReactionOutcome,
};
