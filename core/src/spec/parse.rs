use super::sym::{Symbol, SymbolScope};
use super::AxisToken;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, digit1, one_of};
use nom::combinator::{all_consuming, map, map_res, recognize, verify};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair};
use nom::{IResult, Parser};
use nom_language::error::VerboseError;
use trellis_data::{bail, TrellisResult, TVec};

type R<'i, O> = IResult<&'i str, O, VerboseError<&'i str>>;

/// Parses a comma-separated axis list (`"b, t, h"`, `"b, 3"`). The empty
/// string is the scalar (rank 0) shape. Only symbols and positive integer
/// literals are supported; anything broader is rejected.
pub fn parse_axes(scope: &SymbolScope, input: &str) -> TrellisResult<TVec<AxisToken>> {
    if input.trim().is_empty() {
        return Ok(TVec::new());
    }
    match all_consuming(|i| axes(scope, i)).parse(input) {
        Ok((_, axes)) => Ok(axes),
        Err(e) => bail!("Failed to parse {:?}, {:?}", input, e),
    }
}

fn axes<'i>(scope: &SymbolScope, i: &'i str) -> R<'i, TVec<AxisToken>> {
    map(separated_list1(stag(","), |i| token(scope, i)), |tokens| tokens.into_iter().collect())
        .parse(i)
}

fn token<'i>(scope: &SymbolScope, i: &'i str) -> R<'i, AxisToken> {
    delimited(
        spaces,
        alt((map(numeric, AxisToken::Lit), map(|i| identifier(scope, i), AxisToken::Sym))),
        spaces,
    )
    .parse(i)
}

fn identifier<'i>(scope: &SymbolScope, i: &'i str) -> R<'i, Symbol> {
    map(
        recognize(pair(alt((alpha1, tag("_"))), many0(alt((alphanumeric1, tag("_")))))),
        |s| scope.sym(s),
    )
    .parse(i)
}

fn numeric(i: &str) -> R<'_, usize> {
    verify(map_res(digit1, std::str::FromStr::from_str), |d: &usize| *d > 0).parse(i)
}

fn spaces(i: &str) -> R<'_, ()> {
    map(many0(one_of(" \t\n\r")), |_| ()).parse(i)
}

fn stag<'s>(
    t: &'static str,
) -> impl Parser<&'s str, Output = &'s str, Error = VerboseError<&'s str>> {
    delimited(spaces, tag(t), spaces)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_symbols() {
        let scope = SymbolScope::default();
        assert_eq!(
            parse_axes(&scope, "b, t, h").unwrap().to_vec(),
            vec![
                AxisToken::Sym(scope.sym("b")),
                AxisToken::Sym(scope.sym("t")),
                AxisToken::Sym(scope.sym("h")),
            ]
        );
    }

    #[test]
    fn parse_literals() {
        let scope = SymbolScope::default();
        assert_eq!(
            parse_axes(&scope, "b, 3").unwrap().to_vec(),
            vec![AxisToken::Sym(scope.sym("b")), AxisToken::Lit(3)]
        );
    }

    #[test]
    fn parse_scalar() {
        let scope = SymbolScope::default();
        assert_eq!(parse_axes(&scope, "").unwrap().len(), 0);
        assert_eq!(parse_axes(&scope, "  ").unwrap().len(), 0);
    }

    #[test]
    fn parse_ignores_whitespace() {
        let scope = SymbolScope::default();
        assert_eq!(parse_axes(&scope, " b ,\tt ").unwrap().len(), 2);
    }

    #[test]
    fn parse_underscored_names() {
        let scope = SymbolScope::default();
        assert_eq!(
            parse_axes(&scope, "unroll_len").unwrap().to_vec(),
            vec![AxisToken::Sym(scope.sym("unroll_len"))]
        );
    }

    #[test]
    fn reject_zero_dim() {
        let scope = SymbolScope::default();
        assert!(parse_axes(&scope, "b, 0").is_err());
    }

    #[test]
    fn reject_broader_syntax() {
        let scope = SymbolScope::default();
        assert!(parse_axes(&scope, "b, t*2").is_err());
        assert!(parse_axes(&scope, "b, ...").is_err());
        assert!(parse_axes(&scope, "b,").is_err());
        assert!(parse_axes(&scope, ",b").is_err());
    }
}
