//! Native modules shipped with the bot.

mod admin;
mod dice;
mod help;

pub use dice::{DiceError, Roll};

use crate::error::ModuleError;
use crate::module::{Module, Scope};

/// Names accepted in `[[modules.builtin]]`.
pub const NAMES: &[&str] = &["help", "dice", "admin"];

/// Build the native module called `name`, or `None` if there is no such
/// module.
pub fn create(name: &str, scope: Scope) -> Option<Result<Module, ModuleError>> {
    let module = match name {
        "help" => help::module(scope),
        "dice" => dice::module(scope),
        "admin" => admin::module(scope),
        _ => return None,
    };
    Some(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_builds() {
        for name in NAMES {
            let module = create(name, Scope::Global).unwrap().unwrap();
            assert_eq!(module.name(), *name);
            assert!(!module.commands().is_empty());
        }
        assert!(create("quotes", Scope::Global).is_none());
    }
}
