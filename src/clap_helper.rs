//! A collection of clap helpers shared by the binaries.

use std::ffi::OsString;

use clap::{
    CommandFactory, FromArgMatches,
    builder::{PossibleValue, PossibleValuesParser, TypedValueParser},
    error::ErrorKind,
};

/// Pairs from strings to values for parsing without ValueEnum trait of clap.
#[derive(Clone, Debug)]
pub struct StaticMap<T>(pub &'static [(&'static str, T)])
where
    T: 'static;

impl<T> StaticMap<T> {
    /// Get all the keys of this map.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.0.iter().map(|(k, _)| *k)
    }

    /// Get the value for this key.
    pub fn get(&self, key: &str) -> Option<&'static T> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Get the value for this key ignoring ASCII case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&'static T> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Get the key for the given value.
    pub fn key_for(&self, value: &T) -> Option<&'static str>
    where
        T: PartialEq,
    {
        self.0.iter().find(|(_, v)| v == value).map(|(k, _)| *k)
    }
}

impl<T> TypedValueParser for StaticMap<T>
where
    T: Sync + Send + Clone + 'static,
{
    type Value = T;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let key = PossibleValuesParser::new(self.keys()).parse_ref(cmd, arg, value)?;
        let found = if arg.is_some_and(|i| i.is_ignore_case_set()) {
            self.get_ignore_case(&key)
        } else {
            self.get(&key)
        };
        // PossibleValuesParser already rejected unknown keys
        found
            .cloned()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidValue).with_cmd(cmd))
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(self.keys().map(PossibleValue::new)))
    }
}

/// Extension helper functions for [`CommandFactory`].
pub trait CommandFactoryExt: CommandFactory {
    /// Throw an stylish but probably expensive error.
    fn error(kind: ErrorKind, message: impl std::fmt::Display) -> clap::Error {
        Self::command().error(kind, message)
    }
}

impl<T> CommandFactoryExt for T where T: CommandFactory {}

/// Replace the clap parse function in no derive environment.
pub trait Parse: CommandFactory + FromArgMatches {
    /// Just like parse in derive feature.
    fn parse() -> Self {
        match Self::from_arg_matches(&Self::command().get_matches()) {
            Ok(v) => v,
            Err(e) => e.exit(),
        }
    }

    /// Parse the given arguments (the first one being the binary name).
    fn try_parse_from<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        Self::from_arg_matches(&Self::command().try_get_matches_from(args)?)
    }
}

impl<T> Parse for T where T: CommandFactory + FromArgMatches {}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: StaticMap<u8> = StaticMap(&[("one", 1), ("Two", 2)]);

    #[test]
    fn test_static_map_lookups() {
        assert_eq!(Some(&1), MAP.get("one"));
        assert_eq!(None, MAP.get("two"));
        assert_eq!(Some(&2), MAP.get_ignore_case("two"));
        assert_eq!(Some("Two"), MAP.key_for(&2));
        assert_eq!(vec!["one", "Two"], MAP.keys().collect::<Vec<_>>());
    }
}
