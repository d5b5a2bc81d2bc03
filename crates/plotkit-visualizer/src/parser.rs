//! Toolpath line parser
//!
//! Only what the previewer needs: linear moves and their `X`/`Y`/`Z`
//! operands. Everything else is passed over as [`ParsedLine::Other`].

/// A `Z` operand, kept both as written and as a number
#[derive(Debug, Clone, PartialEq)]
pub struct ZOperand {
    pub raw: String,
    pub value: f64,
}

/// One parsed line of a toolpath program
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Blank or comment-only line
    Empty,
    /// `G1` linear move
    Move {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<ZOperand>,
    },
    /// Any other command, by mnemonic
    Other(String),
}

/// Remove a trailing `;` comment
pub fn remove_comments(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parse a single line
///
/// Operands that fail to parse as numbers are ignored.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut words = remove_comments(line).split_whitespace();
    let Some(mnemonic) = words.next() else {
        return ParsedLine::Empty;
    };

    if !mnemonic.eq_ignore_ascii_case("G1") && !mnemonic.eq_ignore_ascii_case("G01") {
        return ParsedLine::Other(mnemonic.to_ascii_uppercase());
    }

    let (mut x, mut y, mut z) = (None, None, None);
    for word in words {
        let mut chars = word.chars();
        let Some(axis) = chars.next() else { continue };
        let raw = chars.as_str();
        let Ok(value) = raw.parse::<f64>() else {
            continue;
        };
        match axis.to_ascii_uppercase() {
            'X' => x = Some(value),
            'Y' => y = Some(value),
            'Z' => {
                z = Some(ZOperand {
                    raw: raw.to_string(),
                    value,
                })
            }
            _ => {}
        }
    }

    ParsedLine::Move { x, y, z }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(
            parse_line("G1 X10.500 Y-3.000"),
            ParsedLine::Move {
                x: Some(10.5),
                y: Some(-3.0),
                z: None
            }
        );
    }

    #[test]
    fn test_parse_z_keeps_raw_text() {
        match parse_line("G1 Z22.000 ; lift") {
            ParsedLine::Move { z: Some(z), x: None, y: None } => {
                assert_eq!(z.raw, "22.000");
                assert_eq!(z.value, 22.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_comments_and_other_commands() {
        assert_eq!(parse_line("; continue stroke"), ParsedLine::Empty);
        assert_eq!(parse_line("   "), ParsedLine::Empty);
        assert_eq!(
            parse_line("G28 X0 Y0 ; Home X and Y"),
            ParsedLine::Other("G28".to_string())
        );
        assert_eq!(parse_line("m84"), ParsedLine::Other("M84".to_string()));
    }

    #[test]
    fn test_bad_operands_ignored() {
        assert_eq!(
            parse_line("G1 Xabc Y2 Q7"),
            ParsedLine::Move {
                x: None,
                y: Some(2.0),
                z: None
            }
        );
    }
}
