//! Translation of ECMA-262 regular expressions into the Rust regex dialect.
use std::borrow::Cow;

use regex_syntax::ast::{self, parse::Parser, Ast, ClassPerl, ClassPerlKind, ClassSetItem, Span};

const ECMA_SPACE: &str = " \t\n\r\u{000b}\u{000c}\u{00a0}\u{feff}\u{2003}\u{2029}";

/// Convert an ECMA-262 pattern to a pattern with the same meaning for `fancy-regex`.
///
/// `\d`, `\w` and `\s` are ASCII-only in ECMA-262 but Unicode-aware in Rust, so they are
/// rewritten into explicit classes. `\cX` control escapes are replaced by the control character.
/// Patterns with look-arounds or backreferences are passed through unchanged as `fancy-regex`
/// handles them natively.
pub(crate) fn to_rust_regex(pattern: &str) -> Result<Cow<'_, str>, String> {
    let mut pattern = Cow::Borrowed(pattern);
    let mut ast = loop {
        match Parser::new().parse(&pattern) {
            Ok(ast) => break ast,
            Err(error) if *error.kind() == ast::ErrorKind::EscapeUnrecognized => {
                match replace_control_escape(&pattern, error.span()) {
                    Some(replaced) => pattern = Cow::Owned(replaced),
                    None => return Err(error.to_string()),
                }
            }
            Err(error)
                if matches!(
                    error.kind(),
                    ast::ErrorKind::UnsupportedLookAround
                        | ast::ErrorKind::UnsupportedBackreference
                ) =>
            {
                return Ok(pattern);
            }
            Err(error) => return Err(error.to_string()),
        }
    };
    loop {
        let (rewritten, changed) =
            ast::visit(&ast, ClassRewriter::new(pattern)).map_err(|error| error.to_string())?;
        pattern = rewritten;
        if !changed {
            return Ok(pattern);
        }
        ast = Parser::new()
            .parse(&pattern)
            .map_err(|error| error.to_string())?;
    }
}

/// Replace the `\cX` escape at `span` with its control character.
fn replace_control_escape(pattern: &str, span: &Span) -> Option<String> {
    let (start, end) = (span.start.offset, span.end.offset);
    if &pattern[start..end] != r"\c" {
        return None;
    }
    let letter = pattern[end..].chars().next()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    let control = char::from((letter as u8) % 32);
    Some(format!("{}{}{}", &pattern[..start], control, &pattern[end + 1..]))
}

fn perl_class_replacement(class: &ClassPerl) -> String {
    let set = match class.kind {
        ClassPerlKind::Digit => "0-9",
        ClassPerlKind::Word => "A-Za-z0-9_",
        ClassPerlKind::Space => ECMA_SPACE,
    };
    if class.negated {
        format!("[^{set}]")
    } else {
        format!("[{set}]")
    }
}

/// Rewrites the first Perl class it meets; the caller re-parses and repeats until stable.
struct ClassRewriter<'a> {
    pattern: Cow<'a, str>,
    changed: bool,
}

impl<'a> ClassRewriter<'a> {
    fn new(pattern: Cow<'a, str>) -> Self {
        Self {
            pattern,
            changed: false,
        }
    }

    fn rewrite(&mut self, class: &ClassPerl) {
        if self.changed {
            return;
        }
        let replacement = perl_class_replacement(class);
        let (start, end) = (class.span.start.offset, class.span.end.offset);
        let mut buffer = String::with_capacity(self.pattern.len() + replacement.len());
        buffer.push_str(&self.pattern[..start]);
        buffer.push_str(&replacement);
        buffer.push_str(&self.pattern[end..]);
        self.pattern = Cow::Owned(buffer);
        self.changed = true;
    }
}

impl<'a> ast::Visitor for ClassRewriter<'a> {
    type Output = (Cow<'a, str>, bool);
    type Err = ast::Error;

    fn finish(self) -> Result<Self::Output, Self::Err> {
        Ok((self.pattern, self.changed))
    }

    fn visit_class_set_item_pre(&mut self, item: &ClassSetItem) -> Result<(), Self::Err> {
        if let ClassSetItem::Perl(class) = item {
            self.rewrite(class);
        }
        Ok(())
    }

    fn visit_post(&mut self, ast: &Ast) -> Result<(), Self::Err> {
        match ast {
            Ast::ClassPerl(class) => self.rewrite(class),
            Ast::Literal(literal)
                if matches!(
                    literal.kind,
                    ast::LiteralKind::Special(ast::SpecialLiteralKind::Bell)
                ) =>
            {
                // `\a` has no meaning in ECMA-262
                return Parser::new().parse("[").map(|_| ());
            }
            _ => {}
        }
        Ok(())
    }
}
