//! Speech table ingestion.
//!
//! The table is tab-separated with one row per speech:
//!
//! | column               | content                                          |
//! |----------------------|--------------------------------------------------|
//! | `speaker`            | speaker name as written in the text              |
//! | `tokenized_text`     | list of token strings                            |
//! | `tokenized_emotions` | list of `{"primary_emotion": ...}`, one per token|
//! | `avg_attitude` ...   | five speech-level averages, `<= -2` = no signal  |
//! | `scene`              | scene/act label                                  |
//!
//! List columns may be JSON or Python literal syntax (`['a', "b's"]`), since
//! tables are commonly exported from dataframes.

use crate::dimension::{Axis, PerDimension, SentimentDimension, NO_SIGNAL};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Columns every speech table must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "speaker",
    "tokenized_text",
    "tokenized_emotions",
    "avg_attitude",
    "avg_introspection",
    "avg_sensitivity",
    "avg_temper",
    "avg_polarity",
    "scene",
];

/// Errors from reading the speech table.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("Row {row}: cannot parse {column}: {reason}")]
    MalformedField {
        row: usize,
        column: &'static str,
        reason: String,
    },
}

/// One speech, fully parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRow {
    /// 0-based position of the row in the table.
    pub row: usize,
    pub speaker: String,
    /// Tokens in original order, before any filtering.
    pub tokens: Vec<String>,
    /// Primary emotion per token, parallel to `tokens`.
    pub emotions: Vec<String>,
    /// Speech-level averages; values `<= -2` mean no signal.
    pub dimensions: PerDimension<f64>,
    /// Scene/act label.
    pub scene: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    speaker: String,
    tokenized_text: String,
    tokenized_emotions: String,
    avg_attitude: Option<f64>,
    avg_introspection: Option<f64>,
    avg_sensitivity: Option<f64>,
    avg_temper: Option<f64>,
    avg_polarity: Option<f64>,
    scene: String,
}

#[derive(Debug, Deserialize)]
struct EmotionTag {
    primary_emotion: String,
}

/// Read a tab-separated speech table from disk.
pub async fn load_speech_table(path: impl AsRef<Path>) -> Result<Vec<SpeechRow>, InputError> {
    let content = tokio::fs::read(path).await?;
    parse_speech_table(content.as_slice())
}

/// Parse a tab-separated speech table from any reader.
pub fn parse_speech_table<R: Read>(reader: R) -> Result<Vec<SpeechRow>, InputError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: StringRecord = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(InputError::MissingColumn(column));
        }
    }

    let mut rows = Vec::new();
    for (row, result) in rdr.deserialize::<RawRow>().enumerate() {
        let raw = result?;
        rows.push(parse_row(row, raw)?);
    }
    Ok(rows)
}

fn parse_row(row: usize, raw: RawRow) -> Result<SpeechRow, InputError> {
    if raw.speaker.trim().is_empty() {
        return Err(InputError::MalformedField {
            row,
            column: "speaker",
            reason: "empty speaker name".to_string(),
        });
    }
    let tokens: Vec<String> = parse_literal(&raw.tokenized_text).map_err(|reason| {
        InputError::MalformedField {
            row,
            column: "tokenized_text",
            reason,
        }
    })?;
    let tags: Vec<EmotionTag> = parse_literal(&raw.tokenized_emotions).map_err(|reason| {
        InputError::MalformedField {
            row,
            column: "tokenized_emotions",
            reason,
        }
    })?;

    let averages = [
        raw.avg_attitude,
        raw.avg_introspection,
        raw.avg_sensitivity,
        raw.avg_temper,
        raw.avg_polarity,
    ];
    // Empty cells carry no signal
    let dimensions =
        PerDimension::from_fn(|d: SentimentDimension| averages[d.index()].unwrap_or(NO_SIGNAL));

    Ok(SpeechRow {
        row,
        speaker: raw.speaker,
        tokens,
        emotions: tags.into_iter().map(|t| t.primary_emotion).collect(),
        dimensions,
        scene: raw.scene,
    })
}

/// Parse a JSON or Python-literal value.
pub fn parse_literal<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, String> {
    let json = python_literal_to_json(text)?;
    serde_json::from_str(&json).map_err(|e| e.to_string())
}

/// Rewrite Python literal syntax into JSON.
///
/// Single- and double-quoted strings become JSON strings, `None`/`True`/
/// `False` become `null`/`true`/`false`. Valid JSON passes through unchanged.
fn python_literal_to_json(src: &str) -> Result<String, String> {
    let mut out = String::with_capacity(src.len() + 8);
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                out.push('"');
                loop {
                    match chars.next() {
                        None => return Err("unterminated string literal".to_string()),
                        Some(ch) if ch == quote => break,
                        Some('\\') => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some('x') => {
                                let hex: String = chars.by_ref().take(2).collect();
                                if hex.len() != 2 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                                    return Err(format!("invalid \\x escape: \\x{hex}"));
                                }
                                out.push_str("\\u00");
                                out.push_str(&hex);
                            }
                            Some(esc) => {
                                out.push('\\');
                                out.push(esc);
                            }
                            None => return Err("dangling escape at end of input".to_string()),
                        },
                        Some('"') => out.push_str("\\\""),
                        Some(ch) if (ch as u32) < 0x20 => {
                            out.push_str(&format!("\\u{:04x}", ch as u32));
                        }
                        Some(ch) => out.push(ch),
                    }
                }
                out.push('"');
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\tspeaker\ttokenized_text\ttokenized_emotions\tavg_attitude\tavg_introspection\tavg_sensitivity\tavg_temper\tavg_polarity\tscene";

    #[test]
    fn test_python_lists() {
        let tokens: Vec<String> = parse_literal(r#"['But', ',', "soft's", 'light']"#).unwrap();
        assert_eq!(tokens, vec!["But", ",", "soft's", "light"]);

        let escaped: Vec<String> = parse_literal(r"['it\'s', 'a\\b']").unwrap();
        assert_eq!(escaped, vec!["it's", "a\\b"]);
    }

    #[test]
    fn test_json_lists_pass_through() {
        let tokens: Vec<String> = parse_literal(r#"["say \"hi\"", "x"]"#).unwrap();
        assert_eq!(tokens, vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn test_emotion_dicts() {
        let tags: Vec<EmotionTag> = parse_literal(
            "[{'primary_emotion': 'joy', 'secondary_emotion': None}, {'primary_emotion': 'anger'}]",
        )
        .unwrap();
        let primaries: Vec<_> = tags.into_iter().map(|t| t.primary_emotion).collect();
        assert_eq!(primaries, vec!["joy", "anger"]);
    }

    #[test]
    fn test_unterminated_literal() {
        assert!(parse_literal::<Vec<String>>("['oops").is_err());
    }

    #[test]
    fn test_parse_table() {
        let data = format!(
            "{HEADER}\n0\tROMEO\t['love', 'love']\t[{{'primary_emotion': 'joy'}}, {{'primary_emotion': 'joy'}}]\t0.6\t-2\t-2\t\t0.2\tI.1\n"
        );
        let rows = parse_speech_table(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.row, 0);
        assert_eq!(row.speaker, "ROMEO");
        assert_eq!(row.tokens, vec!["love", "love"]);
        assert_eq!(row.emotions, vec!["joy", "joy"]);
        assert_eq!(row.dimensions[SentimentDimension::Attitude], 0.6);
        assert_eq!(row.dimensions[SentimentDimension::Introspection], -2.0);
        // Empty cell
        assert_eq!(row.dimensions[SentimentDimension::Temper], NO_SIGNAL);
        assert_eq!(row.scene, "I.1");
    }

    #[test]
    fn test_missing_column() {
        let data = "speaker\ttokenized_text\nROMEO\t[]\n";
        let err = parse_speech_table(data.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn("tokenized_emotions")));
    }

    #[test]
    fn test_empty_speaker_is_rejected() {
        let data = format!(
            "{HEADER}\n0\tROMEO\t[]\t[]\t0\t0\t0\t0\t0\tI.1\n1\t \t[]\t[]\t0\t0\t0\t0\t0\tI.1\n"
        );
        let err = parse_speech_table(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::MalformedField { row: 1, column: "speaker", .. }
        ));
    }

    #[test]
    fn test_malformed_sequence_names_row() {
        let data = format!("{HEADER}\n0\tNURSE\t['a'\t[]\t0\t0\t0\t0\t0\tI.3\n");
        let err = parse_speech_table(data.as_bytes()).unwrap_err();
        match err {
            InputError::MalformedField { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "tokenized_text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
