/*!
The `.mln` knowledge-base parser: domains, predicate/function
schemas, weighted formulas, and definite clauses.

Two passes over the source: the first collects every domain and schema
declaration (order-permissive); the second parses formulas and definite
clauses, resolving each variable's domain from the schema of the
predicate/function slot it occupies and rejecting a variable used at two
slots with conflicting domains.
*/

use crate::domain::ConstantsDomainBuilder;
use crate::schema::Schemas;
use crate::structures::{AtomSignature, AtomicFormula, DefiniteClause, Formula, Term, WeightedDefiniteClause, WeightedFormula};
use crate::types::err::{LomrfError, ParseError, SchemaError};

use super::lexer::{lex, Spanned, Token};

pub struct ParsedKb {
    pub domains: ConstantsDomainBuilder,
    pub schemas: Schemas,
    pub formulas: Vec<WeightedFormula>,
    pub definite_clauses: Vec<WeightedDefiniteClause>,
}

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

fn is_constant_symbol(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

fn number_to_constant(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A cursor-based recursive-descent parser over one line's tokens.
struct LineParser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        LineParser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |s| s.offset)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos).map(|s| &s.token);
        self.pos += 1;
        t
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(t) if t == token => Ok(()),
            Some(t) => {
                let found = format!("{t:?}");
                Err(ParseError::Unexpected { offset: self.offset(), found })
            }
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn eat_ident(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            Some(t) => {
                let found = format!("{t:?}");
                Err(ParseError::Unexpected { offset: self.offset(), found })
            }
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // ---- terms ----

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let mut term = self.parse_additive()?;
        loop {
            match self.peek() {
                Some(Token::PlusPlus) => {
                    self.advance();
                    term = Term::function("succ", vec![term], crate::structures::term::UNRESOLVED_DOMAIN);
                }
                Some(Token::MinusMinus) => {
                    self.advance();
                    term = Term::function("prec", vec![term], crate::structures::term::UNRESOLVED_DOMAIN);
                }
                _ => break,
            }
        }
        Ok(term)
    }

    fn parse_additive(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let symbol = match self.peek() {
                Some(Token::Plus) => "plus",
                Some(Token::Minus) => "minus",
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Term::function(symbol, vec![left, right], crate::structures::term::UNRESOLVED_DOMAIN);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_primary_term()?;
        loop {
            let symbol = match self.peek() {
                Some(Token::Star) => "times",
                Some(Token::Slash) => "divide",
                Some(Token::Percent) => "modulo",
                _ => break,
            };
            self.advance();
            let right = self.parse_primary_term()?;
            left = Term::function(symbol, vec![left, right], crate::structures::term::UNRESOLVED_DOMAIN);
        }
        Ok(left)
    }

    fn parse_primary_term(&mut self) -> Result<Term, ParseError> {
        match self.advance().cloned() {
            Some(Token::Number(n)) => Ok(Term::constant(number_to_constant(n))),
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    let args = self.parse_term_list()?;
                    self.expect(&Token::RParen)?;
                    Ok(Term::function(name, args, crate::structures::term::UNRESOLVED_DOMAIN))
                } else if is_constant_symbol(&name) {
                    Ok(Term::constant(name))
                } else {
                    Ok(Term::variable(name))
                }
            }
            Some(t) => Err(ParseError::Unexpected { offset: self.offset(), found: format!("{t:?}") }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_term_list(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut out = vec![self.parse_term()?];
        while matches!(self.peek(), Some(Token::Comma)) {
            self.advance();
            out.push(self.parse_term()?);
        }
        Ok(out)
    }

    // ---- formulas ----

    fn parse_formula(&mut self) -> Result<Formula, ParseError> {
        self.parse_equivalence()
    }

    fn parse_equivalence(&mut self) -> Result<Formula, ParseError> {
        let mut left = self.parse_implies()?;
        while matches!(self.peek(), Some(Token::Equivalence)) {
            self.advance();
            let right = self.parse_implies()?;
            left = Formula::equivalence(left, right);
        }
        Ok(left)
    }

    fn parse_implies(&mut self) -> Result<Formula, ParseError> {
        let mut left = self.parse_or()?;
        while matches!(self.peek(), Some(Token::Implies)) {
            self.advance();
            let right = self.parse_or()?;
            left = Formula::implies(left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Formula, ParseError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right = self.parse_and()?;
            left = Formula::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Formula, ParseError> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), Some(Token::Caret)) {
            self.advance();
            let right = self.parse_not()?;
            left = Formula::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Formula, ParseError> {
        if matches!(self.peek(), Some(Token::Bang)) {
            self.advance();
            return Ok(Formula::not(self.parse_not()?));
        }
        self.parse_quantified_or_atomic()
    }

    fn parse_var_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut out = vec![self.eat_ident()?];
        while matches!(self.peek(), Some(Token::Comma)) {
            self.advance();
            out.push(self.eat_ident()?);
        }
        Ok(out)
    }

    fn parse_quantified_or_atomic(&mut self) -> Result<Formula, ParseError> {
        match self.peek() {
            Some(Token::Forall) => {
                self.advance();
                let vars = self.parse_var_list()?;
                let inner = self.parse_not()?;
                Ok(vars.into_iter().rev().fold(inner, |acc, v| {
                    Formula::forall(v, crate::structures::term::UNRESOLVED_DOMAIN, acc)
                }))
            }
            Some(Token::Exist) => {
                self.advance();
                let vars = self.parse_var_list()?;
                let inner = self.parse_not()?;
                Ok(vars.into_iter().rev().fold(inner, |acc, v| {
                    Formula::exists(v, crate::structures::term::UNRESOLVED_DOMAIN, acc)
                }))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_formula()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            _ => self.parse_atomic(),
        }
    }

    fn infix_dynamic_symbol(token: &Token) -> Option<&'static str> {
        match token {
            Token::Equals => Some("equals"),
            Token::NotEquals => Some("notEquals"),
            Token::LessThan => Some("lessThan"),
            Token::LessThanEq => Some("lessThanEq"),
            Token::GreaterThan => Some("greaterThan"),
            Token::GreaterThanEq => Some("greaterThanEq"),
            _ => None,
        }
    }

    fn parse_atomic(&mut self) -> Result<Formula, ParseError> {
        let checkpoint = self.pos;
        if let Some(Token::Ident(name)) = self.peek().cloned() {
            if self.tokens.get(self.pos + 1).map(|s| &s.token) == Some(&Token::LParen) {
                self.advance();
                self.advance();
                let args = self.parse_term_list()?;
                self.expect(&Token::RParen)?;
                return Ok(Formula::Atom(AtomicFormula::new(name, args)));
            }
        }

        self.pos = checkpoint;
        let left = self.parse_term()?;
        if let Some(symbol) = self.peek().and_then(Self::infix_dynamic_symbol) {
            self.advance();
            let right = self.parse_term()?;
            return Ok(Formula::Atom(AtomicFormula::dynamic(symbol, vec![left, right])));
        }

        match left {
            Term::Variable { symbol, .. } => Ok(Formula::Atom(AtomicFormula::new(symbol, vec![]))),
            other => Err(ParseError::Unexpected { offset: self.offset(), found: format!("{other:?}") }),
        }
    }
}

/// Resolves every variable's domain from the schemas, walking `term`
/// inside a slot whose declared domain is `domain`.
fn resolve_term(term: &Term, domain: &str, bindings: &mut std::collections::HashMap<String, String>) -> Result<Term, SchemaError> {
    match term {
        Term::Variable { symbol, .. } => {
            if let Some(existing) = bindings.get(symbol) {
                if existing != domain {
                    return Err(SchemaError::TypeMismatch);
                }
            } else {
                bindings.insert(symbol.clone(), domain.to_string());
            }
            Ok(Term::typed_variable(symbol.clone(), domain.to_string()))
        }
        Term::Constant(_) => Ok(term.clone()),
        // A bare function term only reaches `resolve_term` when it is
        // nested inside another function's argument, which is forbidden; a
        // function in a schema-governed slot is instead
        // routed through `resolve_term_with_function_schema`.
        Term::Function(_) => Err(SchemaError::NestedFunctionArgument),
    }
}

fn resolve_atom(atom: &AtomicFormula, schemas: &Schemas, bindings: &mut std::collections::HashMap<String, String>) -> Result<AtomicFormula, SchemaError> {
    if atom.is_dynamic {
        // Dynamic atoms are untyped in the grammar; their argument domains
        // are whatever the operands resolve to elsewhere in the formula,
        // so we only type-check already-bound variables, leaving unbound
        // ones to be resolved by another occurrence.
        let args = atom
            .args
            .iter()
            .map(|a| match a {
                Term::Variable { symbol, .. } => Ok(bindings.get(symbol).map_or_else(|| a.clone(), |d| Term::typed_variable(symbol.clone(), d.clone()))),
                other => Ok(other.clone()),
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        return Ok(AtomicFormula { symbol: atom.symbol.clone(), args, is_dynamic: true });
    }

    let signature = AtomSignature::new(atom.symbol.clone(), atom.args.len());
    let domains = schemas.predicate_domains(&signature)?;
    let args = atom
        .args
        .iter()
        .zip(domains)
        .map(|(a, d)| resolve_term_with_function_schema(a, d, schemas, bindings))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AtomicFormula { symbol: atom.symbol.clone(), args, is_dynamic: false })
}

fn resolve_term_with_function_schema(
    term: &Term,
    domain: &str,
    schemas: &Schemas,
    bindings: &mut std::collections::HashMap<String, String>,
) -> Result<Term, SchemaError> {
    match term {
        Term::Function(tf) => {
            let signature = AtomSignature::new(tf.symbol.clone(), tf.args.len());
            let (result_domain, arg_domains) = schemas.function_domains(&signature)?;
            if result_domain != domain {
                return Err(SchemaError::TypeMismatch);
            }
            let args = tf
                .args
                .iter()
                .zip(arg_domains)
                .map(|(a, d)| {
                    if matches!(a, Term::Function(_)) {
                        return Err(SchemaError::NestedFunctionArgument);
                    }
                    resolve_term(a, d, bindings)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::Function(crate::structures::TermFunction { symbol: tf.symbol.clone(), args, result_domain: result_domain.clone() }))
        }
        other => resolve_term(other, domain, bindings),
    }
}

fn resolve_formula(formula: &Formula, schemas: &Schemas, bindings: &mut std::collections::HashMap<String, String>) -> Result<Formula, SchemaError> {
    match formula {
        Formula::Atom(a) => Ok(Formula::Atom(resolve_atom(a, schemas, bindings)?)),
        Formula::Not(f) => Ok(Formula::not(resolve_formula(f, schemas, bindings)?)),
        Formula::And(a, b) => Ok(Formula::and(resolve_formula(a, schemas, bindings)?, resolve_formula(b, schemas, bindings)?)),
        Formula::Or(a, b) => Ok(Formula::or(resolve_formula(a, schemas, bindings)?, resolve_formula(b, schemas, bindings)?)),
        Formula::Implies(a, b) => Ok(Formula::implies(resolve_formula(a, schemas, bindings)?, resolve_formula(b, schemas, bindings)?)),
        Formula::Equivalence(a, b) => Ok(Formula::equivalence(resolve_formula(a, schemas, bindings)?, resolve_formula(b, schemas, bindings)?)),
        Formula::Forall(v, f) => {
            let resolved_inner = resolve_formula(f, schemas, bindings)?;
            let domain = bindings.get(&v.symbol).cloned().unwrap_or_else(|| v.domain.clone());
            Ok(Formula::Forall(crate::structures::QuantifiedVar { symbol: v.symbol.clone(), domain }, Box::new(resolved_inner)))
        }
        Formula::Exists(v, f) => {
            let resolved_inner = resolve_formula(f, schemas, bindings)?;
            let domain = bindings.get(&v.symbol).cloned().unwrap_or_else(|| v.domain.clone());
            Ok(Formula::Exists(crate::structures::QuantifiedVar { symbol: v.symbol.clone(), domain }, Box::new(resolved_inner)))
        }
    }
}

fn parse_domain_line(parser: &mut LineParser) -> Result<Option<(String, Vec<String>)>, ParseError> {
    let checkpoint = parser.pos;
    let Ok(name) = parser.eat_ident() else {
        parser.pos = checkpoint;
        return Ok(None);
    };
    if !matches!(parser.peek(), Some(Token::Equals)) {
        parser.pos = checkpoint;
        return Ok(None);
    }
    parser.advance();
    parser.expect(&Token::LBrace)?;

    let mut elements = Vec::new();
    let mut saw_ellipsis = false;
    loop {
        match parser.advance().cloned() {
            Some(Token::Ident(c)) => elements.push(c),
            Some(Token::Number(n)) => elements.push(number_to_constant(n)),
            Some(Token::Ellipsis) => saw_ellipsis = true,
            Some(Token::RBrace) => break,
            Some(t) => return Err(ParseError::Unexpected { offset: parser.offset(), found: format!("{t:?}") }),
            None => return Err(ParseError::UnexpectedEof),
        }
        match parser.peek() {
            Some(Token::Comma) => {
                parser.advance();
            }
            Some(Token::RBrace) => {
                parser.advance();
                break;
            }
            _ => {}
        }
    }

    // A range `{lo, ..., hi}` lexes as two numeric endpoints with an
    // Ellipsis token between them.
    if saw_ellipsis && elements.len() == 2 {
        if let (Ok(lo), Ok(hi)) = (elements[0].parse::<i64>(), elements[1].parse::<i64>()) {
            if lo <= hi {
                elements = (lo..=hi).map(|n| n.to_string()).collect();
            }
        } else {
            return Err(ParseError::MalformedRange);
        }
    }

    Ok(Some((name, elements)))
}

fn parse_function_schema_line(parser: &mut LineParser) -> Result<Option<(AtomSignature, String, Vec<String>)>, ParseError> {
    let checkpoint = parser.pos;
    let Ok(result_domain) = parser.eat_ident() else {
        parser.pos = checkpoint;
        return Ok(None);
    };
    let Ok(name) = parser.eat_ident() else {
        parser.pos = checkpoint;
        return Ok(None);
    };
    if !matches!(parser.peek(), Some(Token::LParen)) {
        parser.pos = checkpoint;
        return Ok(None);
    }
    parser.advance();
    let mut domains = Vec::new();
    if !matches!(parser.peek(), Some(Token::RParen)) {
        loop {
            domains.push(parser.eat_ident()?);
            if matches!(parser.peek(), Some(Token::Comma)) {
                parser.advance();
            } else {
                break;
            }
        }
    }
    parser.expect(&Token::RParen)?;
    if !parser.at_end() {
        parser.pos = checkpoint;
        return Ok(None);
    }
    Ok(Some((AtomSignature::new(name, domains.len()), result_domain, domains)))
}

fn parse_predicate_schema_line(parser: &mut LineParser) -> Result<Option<(AtomSignature, Vec<String>)>, ParseError> {
    let checkpoint = parser.pos;
    let Ok(name) = parser.eat_ident() else {
        parser.pos = checkpoint;
        return Ok(None);
    };
    if !matches!(parser.peek(), Some(Token::LParen)) {
        parser.pos = checkpoint;
        return Ok(None);
    }
    parser.advance();
    let mut domains = Vec::new();
    if !matches!(parser.peek(), Some(Token::RParen)) {
        loop {
            domains.push(parser.eat_ident()?);
            if matches!(parser.peek(), Some(Token::Comma)) {
                parser.advance();
            } else {
                break;
            }
        }
    }
    parser.expect(&Token::RParen)?;
    if !parser.at_end() {
        parser.pos = checkpoint;
        return Ok(None);
    }
    Ok(Some((AtomSignature::new(name, domains.len()), domains)))
}

/// Parses the entire source in two passes and returns the fully
/// schema-resolved theory.
pub fn parse_kb(source: &str) -> Result<ParsedKb, LomrfError> {
    let cleaned = strip_comments(source);
    let lines: Vec<&str> = cleaned.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut domains = ConstantsDomainBuilder::new();
    let mut schemas = Schemas::new();
    let mut declaration_lines = vec![false; lines.len()];

    for (i, line) in lines.iter().enumerate() {
        let tokens = lex(line)?;
        if tokens.is_empty() {
            continue;
        }

        let mut parser = LineParser::new(&tokens);
        if let Some((name, constants)) = parse_domain_line(&mut parser)? {
            domains.extend(&name, constants);
            declaration_lines[i] = true;
            continue;
        }

        let mut parser = LineParser::new(&tokens);
        if let Some((signature, result_domain, arg_domains)) = parse_function_schema_line(&mut parser)? {
            schemas.declare_function(signature, result_domain, arg_domains);
            declaration_lines[i] = true;
            continue;
        }

        let mut parser = LineParser::new(&tokens);
        if let Some((signature, arg_domains)) = parse_predicate_schema_line(&mut parser)? {
            schemas.declare_predicate(signature, arg_domains);
            declaration_lines[i] = true;
        }
    }

    let mut formulas = Vec::new();
    let mut definite_clauses = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if declaration_lines[i] {
            continue;
        }
        let tokens = lex(line)?;
        let mut parser = LineParser::new(&tokens);

        let mut weight = crate::structures::weight::LEARNABLE;
        if let Some(Token::Number(n)) = parser.peek() {
            weight = *n;
            parser.advance();
        }

        let is_definite = tokens.iter().any(|s| s.token == Token::ColonDash);

        if is_definite {
            let head_term = parser.parse_term()?;
            parser.expect(&Token::ColonDash)?;
            let body = parser.parse_formula()?;
            let hard = matches!(parser.peek(), Some(Token::Dot));

            let head = match head_term {
                Term::Function(tf) => AtomicFormula::new(tf.symbol, tf.args),
                _ => return Err(SchemaError::InvalidDefiniteClauseHead.into()),
            };

            let mut bindings = std::collections::HashMap::new();
            let signature = head.signature();
            let head_domains = schemas.predicate_domains(&signature)?.to_vec();
            let resolved_head_args = head
                .args
                .iter()
                .zip(&head_domains)
                .map(|(a, d)| resolve_term_with_function_schema(a, d, &schemas, &mut bindings))
                .collect::<Result<Vec<_>, _>>()?;
            let resolved_head = AtomicFormula { symbol: head.symbol, args: resolved_head_args, is_dynamic: false };
            let resolved_body = resolve_formula(&body, &schemas, &mut bindings)?;

            definite_clauses.push(WeightedDefiniteClause {
                weight: if hard { crate::structures::weight::HARD } else { weight },
                clause: DefiniteClause { head: resolved_head, body: resolved_body },
            });
        } else {
            let formula = parser.parse_formula()?;
            let hard = matches!(parser.peek(), Some(Token::Dot));
            let mut bindings = std::collections::HashMap::new();
            let resolved = resolve_formula(&formula, &schemas, &mut bindings)?;
            formulas.push(WeightedFormula {
                weight: if hard { crate::structures::weight::HARD } else { weight },
                formula: resolved,
            });
        }
    }

    Ok(ParsedKb { domains, schemas, formulas, definite_clauses })
}
