//! Token-stream codec for programs and predictions.
//!
//! The predictor is a sequence model: it consumes and produces
//! whitespace-separated token streams. This codec is the bridge between
//! those streams and the typed [`Program`] / [`Prediction`] values.
//!
//! Result sets are never part of the token form. A parsed prediction always
//! carries `results: None`; results are attached by the orchestrator after
//! execution, not predicted by the model.

use super::{Arg, Num, Program, Value};
use crate::dialogue::{ConfirmStatus, DeltaEntry, DialogueItem, Prediction};
use crate::error::CodecError;

/// Program syntax codec consumed by the session and gateway layers.
pub trait ProgramCodec: Send + Sync {
    fn serialize(&self, program: &Program) -> Vec<String>;
    fn parse(&self, tokens: &[String]) -> Result<Program, CodecError>;

    fn serialize_prediction(&self, prediction: &Prediction) -> Vec<String>;
    fn parse_prediction(&self, tokens: &[String]) -> Result<Prediction, CodecError>;
}

/// The shipping codec: a flat token grammar.
///
/// ```text
/// program    := FUNC '(' [ arg (',' arg)* ] ')' ';'
/// arg        := NAME '=' value
/// value      := NUMBER | 'true' | 'false'
///             | '"' WORD* '"'
///             | 'date:' ISO-DATE
///             | ENTITY [ '^^' '"' WORD* '"' ]
/// prediction := entry*
/// entry      := 'upgrade' INDEX 'to' STATUS ';'
///             | 'append' STATUS program
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec;

impl TokenCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ProgramCodec for TokenCodec {
    fn serialize(&self, program: &Program) -> Vec<String> {
        let mut out = Vec::new();
        write_program(&mut out, program);
        out
    }

    fn parse(&self, tokens: &[String]) -> Result<Program, CodecError> {
        let mut cursor = Cursor::new(tokens);
        let program = cursor.program()?;
        if !cursor.at_end() {
            return Err(CodecError::TrailingTokens);
        }
        Ok(program)
    }

    fn serialize_prediction(&self, prediction: &Prediction) -> Vec<String> {
        let mut out = Vec::new();
        for entry in prediction.entries() {
            match entry {
                DeltaEntry::Update { index, confirm, .. } => {
                    // Result attachments have no token form; only the
                    // confirm upgrade is emitted.
                    if let Some(confirm) = confirm {
                        out.push("upgrade".into());
                        out.push(index.to_string());
                        out.push("to".into());
                        out.push(confirm_token(*confirm).into());
                        out.push(";".into());
                    }
                }
                DeltaEntry::Append { item } => {
                    out.push("append".into());
                    out.push(confirm_token(item.confirm).into());
                    write_program(&mut out, &item.program);
                }
            }
        }
        out
    }

    fn parse_prediction(&self, tokens: &[String]) -> Result<Prediction, CodecError> {
        let mut cursor = Cursor::new(tokens);
        let mut prediction = Prediction::empty();
        while let Some(token) = cursor.peek() {
            match token {
                "upgrade" => {
                    cursor.advance();
                    let index = cursor.index()?;
                    cursor.expect("to")?;
                    let confirm = cursor.confirm()?;
                    cursor.expect(";")?;
                    prediction.push(DeltaEntry::Update {
                        index,
                        confirm: Some(confirm),
                        results: None,
                    });
                }
                "append" => {
                    cursor.advance();
                    let confirm = cursor.confirm()?;
                    let program = cursor.program()?;
                    prediction.push(DeltaEntry::Append {
                        item: DialogueItem::new(program, confirm),
                    });
                }
                other => {
                    return Err(CodecError::UnexpectedToken {
                        token: other.to_string(),
                        position: cursor.position(),
                    });
                }
            }
        }
        Ok(prediction)
    }
}

fn confirm_token(confirm: ConfirmStatus) -> &'static str {
    match confirm {
        ConfirmStatus::Proposed => "proposed",
        ConfirmStatus::Accepted => "accepted",
        ConfirmStatus::Confirmed => "confirmed",
    }
}

fn write_program(out: &mut Vec<String>, program: &Program) {
    out.push(program.function.clone());
    out.push("(".into());
    for (i, arg) in program.args.iter().enumerate() {
        if i > 0 {
            out.push(",".into());
        }
        out.push(arg.name.clone());
        out.push("=".into());
        write_value(out, &arg.value);
    }
    out.push(")".into());
    out.push(";".into());
}

fn write_value(out: &mut Vec<String>, value: &Value) {
    match value {
        Value::Number { value } => out.push(value.to_string()),
        Value::Bool { value } => out.push(value.to_string()),
        Value::Str { value } => {
            out.push("\"".into());
            out.extend(value.split_whitespace().map(str::to_string));
            out.push("\"".into());
        }
        Value::Date { value } => out.push(format!("date:{value}")),
        Value::Entity { value, display } => {
            out.push(value.clone());
            if let Some(display) = display {
                out.push("^^".into());
                out.push("\"".into());
                out.extend(display.split_whitespace().map(str::to_string));
                out.push("\"".into());
            }
        }
    }
}

struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [String]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Result<&'a str, CodecError> {
        let token = self.peek().ok_or(CodecError::UnexpectedEnd)?;
        self.advance();
        Ok(token)
    }

    fn expect(&mut self, expected: &str) -> Result<(), CodecError> {
        let position = self.pos;
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(CodecError::UnexpectedToken {
                token: token.to_string(),
                position,
            })
        }
    }

    fn index(&mut self) -> Result<usize, CodecError> {
        let position = self.pos;
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| CodecError::UnexpectedToken {
                token: token.to_string(),
                position,
            })
    }

    fn confirm(&mut self) -> Result<ConfirmStatus, CodecError> {
        match self.next()? {
            "proposed" => Ok(ConfirmStatus::Proposed),
            "accepted" => Ok(ConfirmStatus::Accepted),
            "confirmed" => Ok(ConfirmStatus::Confirmed),
            other => Err(CodecError::UnknownConfirm(other.to_string())),
        }
    }

    /// Collects tokens until the matching closing quote.
    fn quoted(&mut self) -> Result<String, CodecError> {
        let mut words = Vec::new();
        loop {
            match self.next()? {
                "\"" => break,
                word => words.push(word),
            }
        }
        Ok(words.join(" "))
    }

    fn value(&mut self) -> Result<Value, CodecError> {
        let token = self.next()?;
        if token == "\"" {
            return Ok(Value::Str {
                value: self.quoted()?,
            });
        }
        if token == "true" || token == "false" {
            return Ok(Value::Bool {
                value: token == "true",
            });
        }
        if let Some(date) = token.strip_prefix("date:") {
            return Ok(Value::Date {
                value: date.to_string(),
            });
        }
        if let Ok(number) = token.parse::<f64>() {
            return Ok(Value::Number { value: Num(number) });
        }
        // Anything else is an entity id, optionally annotated with a display.
        let value = token.to_string();
        let display = if self.peek() == Some("^^") {
            self.advance();
            self.expect("\"")?;
            Some(self.quoted()?)
        } else {
            None
        };
        Ok(Value::Entity { value, display })
    }

    fn program(&mut self) -> Result<Program, CodecError> {
        let function = self.next()?.to_string();
        self.expect("(")?;
        let mut args = Vec::new();
        if self.peek() != Some(")") {
            loop {
                let name = self.next()?.to_string();
                self.expect("=")?;
                let value = self.value()?;
                args.push(Arg { name, value });
                match self.peek() {
                    Some(",") => self.advance(),
                    _ => break,
                }
            }
        }
        self.expect(")")?;
        self.expect(";")?;
        Ok(Program { function, args })
    }
}
