/*!
The `.db` evidence-file parser: function mappings (`RetVal = fn(args)`)
and evidence atoms (`P(a,b)`, `!P(a,b)`, `?P(a,b)`).
*/

use crate::domain::ConstantsDomain;
use crate::evidence::{EvidenceBuilder, TriState};
use crate::identity::AtomIdentity;
use crate::schema::Schemas;
use crate::structures::AtomSignature;
use crate::types::err::{DomainError, LomrfError, ParseError};

use super::lexer::{lex, Token};

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if source[i..].starts_with("//") {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if source[i..].starts_with("/*") {
            if let Some(end) = source[i + 2..].find("*/") {
                i += 2 + end + 2;
            } else {
                i = bytes.len();
            }
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Parses `source` and asserts every function mapping / evidence atom
/// found into `builder`.
pub fn parse_db<'a>(
    source: &str,
    schemas: &Schemas,
    domains: &ConstantsDomain,
    identity: &'a AtomIdentity,
    builder: &mut EvidenceBuilder<'a>,
) -> Result<(), LomrfError> {
    let cleaned = strip_comments(source);

    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let tokens = lex(line)?;
        if tokens.is_empty() {
            continue;
        }

        // Function mapping: `RetVal = fn(arg, ...)`.
        if tokens.len() >= 2 && tokens[1].token == Token::Equals {
            let Token::Ident(retval) = &tokens[0].token else {
                return Err(ParseError::Unexpected { offset: tokens[0].offset, found: format!("{:?}", tokens[0].token) }.into());
            };
            let Token::Ident(function) = &tokens[2].token else {
                return Err(ParseError::Unexpected { offset: tokens[2].offset, found: format!("{:?}", tokens[2].token) }.into());
            };
            let args = parse_arg_list(&tokens[3..])?;

            let (_, arg_domains) = schemas.function_domains(&AtomSignature::new(function.clone(), args.len()))?;
            for (arg, domain) in args.iter().zip(arg_domains) {
                if !domains.domain(domain).is_some_and(|d| d.contains(arg)) {
                    return Err(DomainError::UnknownConstant.into());
                }
            }

            let signature = AtomSignature::new(format!("Aux_{function}"), args.len() + 1);
            let mut all_args = vec![retval.clone()];
            all_args.extend(args);
            let arg_refs: Vec<&str> = all_args.iter().map(String::as_str).collect();
            let id = identity.encode(domains, &signature, &arg_refs);
            if id == crate::identity::NOT_EXIST {
                return Err(DomainError::UnknownConstant.into());
            }
            builder.assert_function_mapping(function, all_args.len(), id)?;
            continue;
        }

        // Evidence atom: optional `!`/`?` prefix, then `P(a, b, ...)`.
        let (truth, rest) = match &tokens[0].token {
            Token::Bang => (TriState::False, &tokens[1..]),
            Token::Question => (TriState::Unknown, &tokens[1..]),
            _ => (TriState::True, &tokens[..]),
        };

        let Token::Ident(symbol) = &rest[0].token else {
            return Err(ParseError::Unexpected { offset: rest[0].offset, found: format!("{:?}", rest[0].token) }.into());
        };
        let args = if rest.len() > 1 { parse_arg_list(&rest[1..])? } else { Vec::new() };

        let signature = AtomSignature::new(symbol.clone(), args.len());
        let arg_domains = schemas.predicate_domains(&signature)?;
        for (arg, domain) in args.iter().zip(arg_domains) {
            if !domains.domain(domain).is_some_and(|d| d.contains(arg)) {
                return Err(DomainError::UnknownConstant.into());
            }
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let id = identity.encode(domains, &signature, &arg_refs);
        if id == crate::identity::NOT_EXIST {
            return Err(DomainError::UnknownConstant.into());
        }
        builder.assert(&signature, id, truth)?;
    }

    Ok(())
}

fn parse_arg_list(tokens: &[super::lexer::Spanned]) -> Result<Vec<String>, ParseError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    if tokens[0].token != Token::LParen {
        return Err(ParseError::Unexpected { offset: tokens[0].offset, found: format!("{:?}", tokens[0].token) });
    }
    let mut args = Vec::new();
    let mut i = 1;
    loop {
        match tokens.get(i).map(|s| &s.token) {
            Some(Token::Ident(name)) => {
                args.push(name.clone());
                i += 1;
            }
            Some(Token::Number(n)) => {
                args.push(if n.fract() == 0.0 { format!("{}", *n as i64) } else { n.to_string() });
                i += 1;
            }
            Some(t) => return Err(ParseError::Unexpected { offset: tokens[i].offset, found: format!("{t:?}") }),
            None => return Err(ParseError::UnexpectedEof),
        }
        match tokens.get(i).map(|s| &s.token) {
            Some(Token::Comma) => i += 1,
            Some(Token::RParen) => break,
            Some(t) => return Err(ParseError::Unexpected { offset: tokens[i].offset, found: format!("{t:?}") }),
            None => return Err(ParseError::UnexpectedEof),
        }
    }
    Ok(args)
}
