/*!
Hand-rolled argument parsing for the `lomrf` binary: no CLI parsing
library dependency, since the surface here exists only so the binary
compiles against something concrete.
*/

use std::collections::HashMap;

pub enum Verb {
    Infer,
    WLearn,
    SLearn,
    Compile,
    Supervision,
}

impl Verb {
    fn parse(raw: &str) -> Option<Verb> {
        match raw {
            "infer" => Some(Verb::Infer),
            "wlearn" => Some(Verb::WLearn),
            "slearn" => Some(Verb::SLearn),
            "compile" => Some(Verb::Compile),
            "supervision" => Some(Verb::Supervision),
            _ => None,
        }
    }
}

/// A parsed command line: the verb plus a flag -> value(s) map. Flags with
/// no value are not supported; every
/// flag here is `-name value`.
pub struct Args {
    pub verb: Verb,
    values: HashMap<String, String>,
}

#[derive(Debug)]
pub enum ArgsError {
    MissingVerb,
    UnknownVerb(String),
    MissingValue(String),
    MissingRequired(&'static str),
}

impl Args {
    pub fn parse(raw: &[String]) -> Result<Args, ArgsError> {
        let mut iter = raw.iter();
        let verb_token = iter.next().ok_or(ArgsError::MissingVerb)?;
        let verb = Verb::parse(verb_token).ok_or_else(|| ArgsError::UnknownVerb(verb_token.clone()))?;

        let mut values = HashMap::new();
        while let Some(flag) = iter.next() {
            let Some(name) = flag.strip_prefix('-') else {
                continue;
            };
            let value = iter.next().ok_or_else(|| ArgsError::MissingValue(name.to_string()))?;
            values.insert(name.to_string(), value.clone());
        }

        Ok(Args { verb, values })
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn require(&self, flag: &'static str) -> Result<&str, ArgsError> {
        self.get(flag).ok_or(ArgsError::MissingRequired(flag))
    }

    /// A `,`-separated list flag, e.g. `-q Smokes/1,Cancer/1`.
    pub fn list(&self, flag: &str) -> Vec<String> {
        self.get(flag).map(|v| v.split(',').map(str::to_string).collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_after_the_verb() {
        let parsed = Args::parse(&args(&["infer", "-i", "kb.mln", "-q", "Smokes/1,Cancer/1"])).unwrap();
        assert!(matches!(parsed.verb, Verb::Infer));
        assert_eq!(parsed.get("i"), Some("kb.mln"));
        assert_eq!(parsed.list("q"), vec!["Smokes/1", "Cancer/1"]);
    }

    #[test]
    fn unknown_verb_is_an_error() {
        assert!(matches!(Args::parse(&args(&["bogus"])), Err(ArgsError::UnknownVerb(_))));
    }

    #[test]
    fn missing_required_flag_is_an_error() {
        let parsed = Args::parse(&args(&["compile", "-i", "kb.mln"])).unwrap();
        assert!(matches!(parsed.require("o"), Err(ArgsError::MissingRequired("o"))));
    }
}
