//! `!roll [NdM]`: dice rolls.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use thiserror::Error;

use crate::error::ModuleError;
use crate::module::callbacks::command;
use crate::module::{Module, Scope};

const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;
/// Individual results are listed up to this many dice.
const MAX_LISTED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("expected NdM, e.g. 2d6")]
    Syntax,
    #[error("at most 100 dice")]
    TooManyDice,
    #[error("at most 1000 sides")]
    TooManySides,
    #[error("need at least one die with at least one side")]
    Zero,
}

/// A parsed `NdM` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll {
    pub count: u32,
    pub sides: u32,
}

impl Default for Roll {
    fn default() -> Self {
        Self { count: 1, sides: 6 }
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

fn pattern() -> Result<&'static Regex, regex::Error> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = PATTERN.get() {
        return Ok(re);
    }
    let re = Regex::new(r"(?i)^(\d*)d(\d+)$")?;
    Ok(PATTERN.get_or_init(|| re))
}

impl FromStr for Roll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = pattern().map_err(|_| DiceError::Syntax)?;
        let caps = re.captures(s.trim()).ok_or(DiceError::Syntax)?;

        let count = match &caps[1] {
            "" => 1,
            n => n.parse::<u32>().map_err(|_| DiceError::TooManyDice)?,
        };
        let sides = caps[2]
            .parse::<u32>()
            .map_err(|_| DiceError::TooManySides)?;

        if count == 0 || sides == 0 {
            return Err(DiceError::Zero);
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice);
        }
        if sides > MAX_SIDES {
            return Err(DiceError::TooManySides);
        }
        Ok(Self { count, sides })
    }
}

impl Roll {
    pub fn roll<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect()
    }
}

fn describe(roll: Roll, results: &[u32]) -> String {
    let total: u32 = results.iter().sum();
    if results.len() == 1 || results.len() > MAX_LISTED {
        return format!("{roll}: {total}");
    }
    let listed: Vec<String> = results.iter().map(u32::to_string).collect();
    format!("{roll}: {} = {total}", listed.join(" + "))
}

pub fn module(scope: Scope) -> Result<Module, ModuleError> {
    Module::builder("dice")
        .description("Rolls dice")
        .scope(scope)
        .command(
            ["roll"],
            "Roll NdM dice (default 1d6)",
            command(|ctx, msg, args| async move {
                let parsed = match args.first() {
                    None => Ok(Roll::default()),
                    Some(expr) => expr.parse::<Roll>(),
                };
                let text = match parsed {
                    Ok(roll) => {
                        let results = roll.roll(&mut rand::thread_rng());
                        format!("{} rolled {}", msg.sender(), describe(roll, &results))
                    }
                    Err(e) => format!("Can't roll that: {e}."),
                };
                ctx.reply(&msg, &text).await?;
                Ok(())
            }),
        )
        .build()
}
