//! Parses the optimization command line flag, which might look as follows:
//!
//! `--optimization moderate`
//!
//! It might also be a custom sequence of passes:
//!
//! `-O custom:ConstantFolding,ConstantFolding`
use compiler_lib::optimization;
use failure::Fail;
use std::str::FromStr;

#[derive(Debug, Fail, PartialEq)]
pub enum ParseError {
    #[fail(display = "unknown optimization level '{}'", name)]
    UnknownLevel { name: String },
    #[fail(display = "unknown optimization pass '{}'", name)]
    UnknownOptimization { name: String },
    #[fail(display = "optimization flag can only contain a single separator")]
    TooManySeparators,
    #[fail(display = "a custom optimization sequence requires a non-empty list of optimizations")]
    CustomWithoutList,
    #[fail(display = "optimization level '{}' takes no list of optimizations", name)]
    UnexpectedList { name: String },
}

fn parse_level(arg: &str) -> Result<optimization::Level, ParseError> {
    let mut parts = arg.splitn(3, ':');
    let level = parts.next().unwrap_or("");

    match (
        level.to_ascii_lowercase().as_str(),
        parts.next(),
        parts.next(),
    ) {
        (_, _, Some(_)) => Err(ParseError::TooManySeparators),
        ("custom", Some(sequence), _) => {
            let list = parse_custom_sequence(sequence)?;
            if list.is_empty() {
                return Err(ParseError::CustomWithoutList);
            }
            Ok(optimization::Level::Custom(list))
        }
        ("custom", None, _) => Err(ParseError::CustomWithoutList),
        ("none", None, _) => Ok(optimization::Level::None),
        ("moderate", None, _) => Ok(optimization::Level::Moderate),
        ("none", Some(_), _) | ("moderate", Some(_), _) => Err(ParseError::UnexpectedList {
            name: level.to_string(),
        }),
        (_, _, _) => Err(ParseError::UnknownLevel {
            name: level.to_string(),
        }),
    }
}

fn parse_custom_sequence(s: &str) -> Result<Vec<optimization::Kind>, ParseError> {
    s.split(',')
        .filter(|s| !s.is_empty())
        .map(|name| {
            optimization::Kind::from_str(name).map_err(|_| ParseError::UnknownOptimization {
                name: name.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Arg(optimization::Level);

impl Into<optimization::Level> for Arg {
    fn into(self) -> optimization::Level {
        self.0
    }
}

impl FromStr for Arg {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(s).map(Arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compiler_lib::optimization::{Kind, Level};

    fn parse(s: &str) -> Result<Level, ParseError> {
        Arg::from_str(s).map(Into::into)
    }

    #[test]
    fn parses_predefined_levels_case_insensitively() {
        assert_eq!(Ok(Level::None), parse("none"));
        assert_eq!(Ok(Level::Moderate), parse("Moderate"));
    }

    #[test]
    fn parses_custom_sequences() {
        assert_eq!(
            Ok(Level::Custom(vec![Kind::ConstantFolding, Kind::ConstantFolding])),
            parse("custom:ConstantFolding,,ConstantFolding")
        );
    }

    #[test]
    fn rejects_malformed_levels() {
        assert_eq!(
            Err(ParseError::UnknownLevel {
                name: "aggressive".to_string()
            }),
            parse("aggressive")
        );
        assert_eq!(Err(ParseError::CustomWithoutList), parse("custom"));
        assert_eq!(Err(ParseError::CustomWithoutList), parse("custom:"));
        assert_eq!(Err(ParseError::TooManySeparators), parse("custom:a:b"));
        assert_eq!(
            Err(ParseError::UnexpectedList {
                name: "none".to_string()
            }),
            parse("none:ConstantFolding")
        );
    }

    #[test]
    fn rejects_unknown_passes() {
        assert_eq!(
            Err(ParseError::UnknownOptimization {
                name: "Inline".to_string()
            }),
            parse("custom:ConstantFolding,Inline")
        );
    }
}
