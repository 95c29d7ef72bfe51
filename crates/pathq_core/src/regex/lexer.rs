use crate::errors::LexError;
use crate::regex::tokens::{Token, TokenKind};

fn is_meta(ch: char) -> bool {
    matches!(ch, '|' | '*' | '+' | '?' | '(' | ')' | '$' | '.')
}

/// Lexical analysis of a pattern into regex tokens.
///
/// Whitespace and `.` separate symbols and are not tokens themselves; `\`
/// escapes the following character into the current symbol.
///
/// # Errors
///
/// Returns a [`LexError`] for a dangling escape at the end of the input.
///
/// # Examples
///
/// ```
/// use pathq_core::regex::lexer::lex;
/// use pathq_core::regex::tokens::{Token, TokenKind};
///
/// let tokens = lex("ab c").unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::new(TokenKind::Sym("ab".into()), 1),
///         Token::new(TokenKind::Sym("c".into()), 4),
///         Token::new(TokenKind::Eos, 5),
///     ]
/// );
/// ```
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut iter = input.char_indices().peekable();

    while let Some(&(idx, ch)) = iter.peek() {
        let column = idx + 1;
        match ch {
            c if c.is_whitespace() || c == '.' => {
                iter.next();
            }
            '|' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Or, column));
            }
            '*' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Star, column));
            }
            '+' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Plus, column));
            }
            '?' => {
                iter.next();
                tokens.push(Token::new(TokenKind::QMark, column));
            }
            '(' => {
                iter.next();
                tokens.push(Token::new(TokenKind::LParen, column));
            }
            ')' => {
                iter.next();
                tokens.push(Token::new(TokenKind::RParen, column));
            }
            '$' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Epsilon, column));
            }
            _ => {
                let sym = lex_symbol(&mut iter)?;
                tokens.push(Token::new(TokenKind::Sym(sym), column));
            }
        }
    }

    tokens.push(Token::new(TokenKind::Eos, input.len() + 1));
    Ok(tokens)
}

/// Consumes a maximal symbol run, resolving `\` escapes.
fn lex_symbol<I>(iter: &mut std::iter::Peekable<I>) -> Result<String, LexError>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut sym = String::new();
    while let Some(&(idx, ch)) = iter.peek() {
        match ch {
            '\\' => {
                iter.next();
                let (_, escaped) = iter
                    .next()
                    .ok_or_else(|| LexError::new(idx + 1, "dangling escape"))?;
                sym.push(escaped);
            }
            c if c.is_whitespace() || is_meta(c) => break,
            c => {
                sym.push(c);
                iter.next();
            }
        }
    }
    Ok(sym)
}
