//! Dice-notation formulas ("2d8+3", "1d6", flat "4")
//!
//! Parsed once at data-load time; rolling takes any `Rng` so tests seed a
//! deterministic generator.

use nom::branch::alt;
use nom::character::complete::{char, u32 as dec_u32};
use nom::combinator::{all_consuming, opt};
use nom::sequence::{preceded, separated_pair};
use nom::{IResult, Parser};
use rand::Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A parsed dice expression. `count == 0` is a flat constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceFormula {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DiceFormula {
    pub fn flat(bonus: i32) -> Self {
        Self { count: 0, sides: 0, bonus }
    }

    pub fn roll(&self, rng: &mut impl Rng) -> i32 {
        let mut total = self.bonus;
        for _ in 0..self.count {
            total += rng.gen_range(1..=self.sides) as i32;
        }
        total
    }

    pub fn min(&self) -> i32 {
        self.bonus + self.count as i32
    }

    pub fn max(&self) -> i32 {
        self.bonus + (self.count * self.sides) as i32
    }
}

fn signed_bonus(i: &str) -> IResult<&str, i32> {
    alt((
        preceded(char('+'), dec_u32).map(|b| b as i32),
        preceded(char('-'), dec_u32).map(|b| -(b as i32)),
    ))
    .parse(i)
}

fn dice_expr(i: &str) -> IResult<&str, DiceFormula> {
    let (i, (count, sides)) = separated_pair(dec_u32, char('d'), dec_u32).parse(i)?;
    let (i, bonus) = opt(signed_bonus).parse(i)?;
    Ok((i, DiceFormula { count, sides, bonus: bonus.unwrap_or(0) }))
}

fn flat_expr(i: &str) -> IResult<&str, DiceFormula> {
    dec_u32.map(|b| DiceFormula::flat(b as i32)).parse(i)
}

impl FromStr for DiceFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, formula) = all_consuming(alt((dice_expr, flat_expr)))
            .parse(s.trim())
            .map_err(|_| format!("invalid dice formula: {s:?}"))?;
        if formula.count > 0 && formula.sides < 2 {
            return Err(format!("dice need 2+ sides: {s:?}"));
        }
        Ok(formula)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "{}", self.bonus);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

impl Serialize for DiceFormula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiceFormula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
