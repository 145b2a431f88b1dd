use std::{num::ParseFloatError, path::Path, str::FromStr};

use logos::{Lexer, Logos};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use time::{
    format_description::FormatItem,
    macros::format_description,
    Date, Time,
};

use crate::{
    error::StoreError,
    observation::{Observation, Quality},
    store::{ObservationStore, StoreBuilder},
};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Lines look like `2000-01-01;06:00:00;-0.6;G`
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")]
enum Token {
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}", priority = 4)]
    Date,
    #[regex(r"[0-9]{2}:[0-9]{2}:[0-9]{2}", priority = 4)]
    Time,
    #[regex(r"-?[0-9]+(\.[0-9]+)?", priority = 3)]
    Number,
    // Anything up to the next separator, the quality code can be any text
    #[regex(r"[^;\s]+", priority = 1)]
    Code,
    #[token(";")]
    Separator,
}

#[derive(Debug, Error)]
pub enum LineError {
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("Expected {expected}, found `{found}`")]
    Unexpected {
        expected: &'static str,
        found: String,
    },
    #[error("Invalid date or time: {0}")]
    InvalidDate(#[from] time::error::Parse),
    #[error("Invalid temperature: {0}")]
    InvalidTemperature(#[from] ParseFloatError),
    #[error("Unexpected `{0}` after the quality code")]
    Trailing(String),
}

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Could not read {path}: {source}")]
    #[diagnostic(code(weatherdata::load::io))]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed observation on line {line}: {reason}")]
    #[diagnostic(
        code(weatherdata::load::malformed),
        help("lines must look like `2000-01-01;06:00:00;-0.6;G`")
    )]
    Malformed {
        line: usize,
        reason: LineError,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Parse error of a single line, with the span of the offending token
/// relative to the start of the line.
struct LineFailure {
    reason: LineError,
    span: std::ops::Range<usize>,
}

impl LineFailure {
    fn at(lexer: &Lexer<'_, Token>, reason: impl Into<LineError>) -> Self {
        Self {
            reason: reason.into(),
            span: lexer.span(),
        }
    }
}

/// Pulls the next token and checks it's the expected kind.
fn expect<'a>(
    lexer: &mut Lexer<'a, Token>,
    token: Token,
    name: &'static str,
) -> Result<&'a str, LineFailure> {
    match lexer.next() {
        Some(Ok(t)) if t == token => Ok(lexer.slice()),
        Some(_) => Err(LineFailure::at(
            lexer,
            LineError::Unexpected {
                expected: name,
                found: lexer.slice().to_string(),
            },
        )),
        None => Err(LineFailure {
            reason: LineError::Missing(name),
            span: lexer.source().len()..lexer.source().len(),
        }),
    }
}

/// The quality code may lex as any token but a separator: `1` is a number,
/// `?` is a code, both mean unapproved.
fn expect_code(lexer: &mut Lexer<'_, Token>) -> Result<Quality, LineFailure> {
    match lexer.next() {
        Some(Ok(Token::Separator)) => Err(LineFailure::at(
            lexer,
            LineError::Unexpected {
                expected: "quality code",
                found: lexer.slice().to_string(),
            },
        )),
        Some(_) => Ok(Quality::from_code(lexer.slice())),
        None => Err(LineFailure {
            reason: LineError::Missing("quality code"),
            span: lexer.source().len()..lexer.source().len(),
        }),
    }
}

fn parse_line(line: &str) -> Result<Observation, LineFailure> {
    let mut lexer = Token::lexer(line);

    let date = expect(&mut lexer, Token::Date, "date")?;
    let date = Date::parse(date, DATE_FORMAT).map_err(|e| LineFailure::at(&lexer, e))?;
    expect(&mut lexer, Token::Separator, "`;` after the date")?;

    let time = expect(&mut lexer, Token::Time, "time")?;
    let time = Time::parse(time, TIME_FORMAT).map_err(|e| LineFailure::at(&lexer, e))?;
    expect(&mut lexer, Token::Separator, "`;` after the time")?;

    let temperature = expect(&mut lexer, Token::Number, "temperature")?;
    let temperature = temperature
        .parse::<f32>()
        .map_err(|e| LineFailure::at(&lexer, e))?;
    expect(&mut lexer, Token::Separator, "`;` after the temperature")?;

    let quality = expect_code(&mut lexer)?;

    if lexer.next().is_some() {
        return Err(LineFailure::at(
            &lexer,
            LineError::Trailing(lexer.slice().to_string()),
        ));
    }

    Ok(Observation::new(date, time, temperature, quality))
}

impl FromStr for ObservationStore {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = StoreBuilder::new();
        let mut offset = 0;

        for (number, line) in s.split_inclusive('\n').enumerate() {
            let start = offset;
            offset += line.len();

            let line = line.trim_end_matches(['\n', '\r']);
            // Blank lines carry no observation
            if line.trim().is_empty() {
                continue;
            }

            let observation = parse_line(line).map_err(|failure| LoadError::Malformed {
                line: number + 1,
                reason: failure.reason,
                src: s.to_string(),
                span: (start + failure.span.start..start + failure.span.end).into(),
            })?;
            builder.push(observation);
        }

        log::debug!("loaded {} observations", builder.len());

        Ok(builder.build()?)
    }
}

impl ObservationStore {
    /// Reads and parses a whole observation file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }
}
