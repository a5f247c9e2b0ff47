//! Patterns every target evaluates the same way.
//!
//! A field pattern runs under Python `re`, JavaScript `RegExp` in `u` mode
//! and the `regex` crate. Only constructs the three engines agree on are
//! accepted: literals, bracketed classes of literals and ranges, capturing
//! and plain non-capturing groups, alternation and repetition.
//!
//! Shorthand classes (`\d`, `\w`, `\s`), `.`, anchors and word boundaries
//! are rejected: each engine gives them a different character set (ASCII,
//! Unicode, or UTF-16 units). Spell the class out instead, e.g. `[0-9]`
//! or `[^\n]`.

use regex_syntax::ast::{
    self, Ast, ClassSet, ClassSetItem, GroupKind, HexLiteralKind, LiteralKind, SpecialLiteralKind,
};

/// Characters `\` may escape outside a class in JavaScript `u` mode.
const SYNTAX_CHARS: &str = r"^$\.*+?()[]{}|/";

/// Check that `pattern` is in the portable subset.
///
/// The error names the first offending construct.
pub fn check_portable(pattern: &str) -> Result<(), String> {
    let ast = ast::parse::Parser::new()
        .parse(pattern)
        .map_err(|e| format!("invalid pattern: {e}"))?;
    walk(pattern, &ast)
}

fn text<'p>(pattern: &'p str, span: &ast::Span) -> &'p str {
    pattern.get(span.start.offset..span.end.offset).unwrap_or(pattern)
}

fn unsupported(pattern: &str, span: &ast::Span, what: &str) -> String {
    format!("{what} `{}` is not supported by every target", text(pattern, span))
}

fn walk(pattern: &str, node: &Ast) -> Result<(), String> {
    match node {
        Ast::Empty(_) => Ok(()),
        Ast::Literal(lit) => literal(pattern, lit, false),
        Ast::ClassBracketed(class) => bracketed(pattern, class),
        Ast::Repetition(rep) => {
            if text(pattern, &rep.op.span).starts_with("{,") {
                return Err(unsupported(pattern, &rep.op.span, "repetition"));
            }
            if matches!(*rep.ast, Ast::Repetition(_)) {
                return Err(unsupported(pattern, &rep.span, "nested repetition"));
            }
            walk(pattern, &rep.ast)
        }
        Ast::Group(group) => match &group.kind {
            GroupKind::CaptureIndex(_) => walk(pattern, &group.ast),
            GroupKind::NonCapturing(flags) if flags.items.is_empty() => walk(pattern, &group.ast),
            _ => Err(unsupported(pattern, &group.span, "named group or inline flag")),
        },
        Ast::Alternation(alt) => alt.asts.iter().try_for_each(|a| walk(pattern, a)),
        Ast::Concat(concat) => concat.asts.iter().try_for_each(|a| walk(pattern, a)),
        Ast::Dot(span) => Err(unsupported(pattern, span, "wildcard")),
        Ast::Assertion(assertion) => Err(unsupported(pattern, &assertion.span, "assertion")),
        Ast::ClassPerl(class) => Err(unsupported(pattern, &class.span, "shorthand class")),
        Ast::ClassUnicode(class) => Err(unsupported(pattern, &class.span, "Unicode class")),
        Ast::Flags(flags) => Err(unsupported(pattern, &flags.span, "inline flag")),
    }
}

fn literal(pattern: &str, lit: &ast::Literal, in_class: bool) -> Result<(), String> {
    let portable = match &lit.kind {
        LiteralKind::Verbatim => {
            !(lit.c.is_control()
                || matches!(lit.c, '\u{2028}' | '\u{2029}' | ']')
                || (!in_class && matches!(lit.c, '{' | '}')))
        }
        LiteralKind::Meta | LiteralKind::Superfluous => {
            SYNTAX_CHARS.contains(lit.c) || (in_class && lit.c == '-')
        }
        LiteralKind::HexFixed(HexLiteralKind::X | HexLiteralKind::UnicodeShort) => true,
        LiteralKind::Special(kind) => matches!(
            kind,
            SpecialLiteralKind::Tab
                | SpecialLiteralKind::LineFeed
                | SpecialLiteralKind::CarriageReturn
                | SpecialLiteralKind::FormFeed
                | SpecialLiteralKind::VerticalTab
        ),
        _ => false,
    };
    if portable {
        Ok(())
    } else {
        Err(unsupported(pattern, &lit.span, "literal"))
    }
}

fn bracketed(pattern: &str, class: &ast::ClassBracketed) -> Result<(), String> {
    match &class.kind {
        ClassSet::Item(ClassSetItem::Union(union)) => {
            let last = union.items.len().saturating_sub(1);
            for (i, item) in union.items.iter().enumerate() {
                // A bare `-` is only literal at either end of the class.
                if let ClassSetItem::Literal(lit) = item {
                    if lit.kind == LiteralKind::Verbatim && lit.c == '-' && i != 0 && i != last {
                        return Err(unsupported(pattern, &lit.span, "literal"));
                    }
                }
                class_item(pattern, item)?;
            }
            Ok(())
        }
        ClassSet::Item(item) => class_item(pattern, item),
        ClassSet::BinaryOp(op) => Err(unsupported(pattern, &op.span, "class set operation")),
    }
}

fn class_item(pattern: &str, item: &ClassSetItem) -> Result<(), String> {
    match item {
        ClassSetItem::Empty(_) => Ok(()),
        ClassSetItem::Literal(lit) => literal(pattern, lit, true),
        ClassSetItem::Range(range) => {
            literal(pattern, &range.start, true)?;
            literal(pattern, &range.end, true)
        }
        ClassSetItem::Union(union) => union.items.iter().try_for_each(|i| class_item(pattern, i)),
        ClassSetItem::Ascii(class) => Err(unsupported(pattern, &class.span, "POSIX class")),
        ClassSetItem::Unicode(class) => Err(unsupported(pattern, &class.span, "Unicode class")),
        ClassSetItem::Perl(class) => Err(unsupported(pattern, &class.span, "shorthand class")),
        ClassSetItem::Bracketed(class) => Err(unsupported(pattern, &class.span, "nested class")),
    }
}
