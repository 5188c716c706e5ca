use winnow::ascii::{dec_int, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::Rule;

use super::parser::ParsedRuleTable;

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn field_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        }),
    )
        .take()
        .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn value_list(input: &mut &str) -> ModalResult<Vec<String>> {
    delimited(
        (ws, '['),
        separated(0.., preceded(ws, string_literal), (ws, ',')),
        (ws, cut_err(']')),
    )
    .context(StrContext::Expected(StrContextValue::Description(
        "value list",
    )))
    .parse_next(input)
}

// -- Conditions -------------------------------------------------------------

enum ParsedCondition {
    Values(Vec<String>),
    MinValue(i64),
}

fn condition(input: &mut &str) -> ModalResult<ParsedCondition> {
    ws.parse_next(input)?;
    alt((
        preceded("in", cut_err(value_list)).map(ParsedCondition::Values),
        preceded(">=", cut_err(preceded(ws, dec_int::<_, i64, _>)))
            .map(ParsedCondition::MinValue),
    ))
    .parse_next(input)
}

fn indent_annotation(input: &mut &str) -> ModalResult<u8> {
    let n: i64 = delimited(
        (ws, '(', ws, "indent", ws),
        cut_err(dec_int::<_, i64, _>),
        (ws, cut_err(')')),
    )
    .parse_next(input)?;
    u8::try_from(n).map_err(|_| ErrMode::from_input(input).cut())
}

// -- Rule definitions -------------------------------------------------------

fn target_list(input: &mut &str) -> ModalResult<Vec<String>> {
    separated(
        1..,
        preceded(ws, field_name).map(str::to_owned),
        (ws, ','),
    )
    .parse_next(input)
}

fn rule_def(input: &mut &str) -> ModalResult<Rule> {
    ws.parse_next(input)?;
    ("rule", take_while(1.., |c: char| c.is_ascii_whitespace()))
        .void()
        .parse_next(input)?;

    let source = cut_err(field_name)
        .context(StrContext::Expected(StrContextValue::Description(
            "source field",
        )))
        .parse_next(input)?;

    let condition = opt(condition).parse_next(input)?;
    let indent = opt(indent_annotation).parse_next(input)?;

    ws.parse_next(input)?;
    cut_err(':')
        .context(StrContext::Expected(StrContextValue::CharLiteral(':')))
        .parse_next(input)?;

    let targets = cut_err(target_list)
        .context(StrContext::Expected(StrContextValue::Description(
            "target list",
        )))
        .parse_next(input)?;

    let (values, min_value) = match condition {
        Some(ParsedCondition::Values(values)) => (Some(values), None),
        Some(ParsedCondition::MinValue(min)) => (None, Some(min)),
        None => (None, None),
    };

    Ok(Rule {
        source: source.to_owned(),
        values,
        min_value,
        targets,
        indent: indent.unwrap_or(0),
    })
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_rule_table(input: &mut &str) -> ModalResult<ParsedRuleTable> {
    let rules: Vec<Rule> = repeat(0.., rule_def).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(ParsedRuleTable { rules })
}
