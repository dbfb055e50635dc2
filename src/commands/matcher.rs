//! Command resolution.
//!
//! Greedy longest-literal-prefix matching over a registry. Every command is
//! scored against the input; a candidate either matches all of its tokens
//! (score = token count) or is rejected outright. The highest score wins and
//! ties keep the earliest registration.

use super::registry::{Command, CommandRegistry};

/// A resolved command and how much of the input it consumed.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub command: &'a Command,
    /// Number of input tokens matched (including the prefixed name).
    pub matched: usize,
}

impl Resolution<'_> {
    /// Input tokens left over after the command pattern.
    pub fn remaining<'t>(&self, input: &'t [String]) -> &'t [String] {
        &input[self.matched.min(input.len())..]
    }
}

impl CommandRegistry {
    /// Resolve tokenized input against this registry.
    ///
    /// `input[0]` must equal `prefix` followed by the command name.
    pub fn resolve<'a>(&'a self, prefix: &str, input: &[String]) -> Option<Resolution<'a>> {
        let mut best: Option<Resolution<'a>> = None;

        for command in self.iter() {
            let Some(score) = score(command.tokens(), prefix, input) else {
                continue;
            };

            if score > best.map_or(0, |b| b.matched) {
                best = Some(Resolution {
                    command,
                    matched: score,
                });
            }
        }

        best
    }
}

/// Score one pattern, or `None` if it is rejected.
fn score(pattern: &[String], prefix: &str, input: &[String]) -> Option<usize> {
    let (name, rest) = pattern.split_first()?;
    if pattern.len() > input.len() {
        return None;
    }

    let head = input[0].strip_prefix(prefix)?;
    if head != name {
        return None;
    }

    for (expected, actual) in rest.iter().zip(&input[1..]) {
        if expected != actual {
            return None;
        }
    }

    Some(pattern.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::callbacks::command;

    fn registry(patterns: &[&[&str]]) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        for (idx, tokens) in patterns.iter().enumerate() {
            registry.register(Command::new(
                tokens.iter().copied(),
                format!("#{idx}"),
                command(|_, _, _| async { Ok(()) }),
            ));
        }
        registry
    }

    fn input(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let registry = registry(&[&["roll"], &["roll", "dice"]]);
        let tokens = input("!roll dice extra");

        let res = registry.resolve("!", &tokens).unwrap();
        assert_eq!(res.command.tokens(), ["roll", "dice"]);
        assert_eq!(res.matched, 2);
        assert_eq!(res.remaining(&tokens), ["extra"]);
    }

    #[test]
    fn test_longest_match_wins_regardless_of_order() {
        let registry = registry(&[&["roll", "dice"], &["roll"]]);
        let res = registry.resolve("!", &input("!roll dice")).unwrap();
        assert_eq!(res.command.help(), "#0");
    }

    #[test]
    fn test_shorter_command_when_subtoken_differs() {
        let registry = registry(&[&["roll"], &["roll", "dice"]]);
        let tokens = input("!roll 20");

        let res = registry.resolve("!", &tokens).unwrap();
        assert_eq!(res.command.tokens(), ["roll"]);
        assert_eq!(res.remaining(&tokens), ["20"]);
    }

    #[test]
    fn test_tie_keeps_first_registered() {
        let registry = registry(&[&["dice", "roll"], &["dice", "roll"]]);
        let res = registry.resolve("!", &input("!dice roll 6")).unwrap();
        assert_eq!(res.command.help(), "#0");
    }

    #[test]
    fn test_command_longer_than_input_is_rejected() {
        let registry = registry(&[&["dice", "roll"]]);
        assert!(registry.resolve("!", &input("!dice")).is_none());
    }

    #[test]
    fn test_no_partial_credit_after_mismatch() {
        // "!a b x" vs ["a","b","c"]: mismatch at the third token rejects the
        // candidate entirely, so only ["a"] matches.
        let registry = registry(&[&["a", "b", "c"], &["a"]]);
        let res = registry.resolve("!", &input("!a b x")).unwrap();
        assert_eq!(res.command.tokens(), ["a"]);
    }

    #[test]
    fn test_prefix_required() {
        let registry = registry(&[&["roll"]]);
        assert!(registry.resolve("!", &input("roll")).is_none());
        assert!(registry.resolve("!", &input("?roll")).is_none());
        assert!(registry.resolve("!", &input("!!roll")).is_none());
        assert!(registry.resolve("!", &input("!rolls")).is_none());
    }

    #[test]
    fn test_unknown_command_and_empty_input() {
        let registry = registry(&[&["roll"]]);
        assert!(registry.resolve("!", &input("!help")).is_none());
        assert!(registry.resolve("!", &[]).is_none());
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let registry = registry(&[&[]]);
        assert!(registry.resolve("!", &input("!")).is_none());
    }

    #[test]
    fn test_multi_char_prefix() {
        let registry = registry(&[&["roll"]]);
        assert!(registry.resolve("::", &input("::roll")).is_some());
        assert!(registry.resolve("::", &input(":roll")).is_none());
    }
}
