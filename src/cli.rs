//! Command-line synthesis: turn declared field metadata into `clap` flags,
//! parse, and write the results back into a fresh snapshot.
//!
//! Every field whose default is an [`Argument`] becomes a long flag named
//! after the field (`--port`), plus any extra spellings it declares. The
//! field's [`FieldType`](crate::FieldType) decides the flag's shape:
//!
//! - boolean leaf: a value-less toggle that flips the configured default;
//! - sequence directly around the leaf: one or more values;
//! - anything else: exactly one value, coerced to the leaf type.
//!
//! A closed set of allowed values, a custom parse action, help text and a
//! display name carry over to the flag. A field still defaulting to
//! [`Required`](crate::Required) makes its flag mandatory.
//!
//! Tokens that match none of the synthesized flags are dropped before `clap`
//! sees them, so a program can share its argv with other parsers.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use clap::builder::{PossibleValue, TypedValueParser, ValueRange};
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::SectionalError;
use crate::field::{Argument, Field, ParseAction};
use crate::types::Primitive;
use crate::value::Value;

/// How many values follow a flag on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Toggle,
    One,
    Many,
}

/// Spellings `clap` reserves for its own help flag.
pub(crate) const RESERVED_FLAGS: [&str; 2] = ["--help", "-h"];

/// Where a parsed flag's value goes, and what it falls back to.
#[derive(Debug)]
struct Route {
    field: String,
    arity: Arity,
    default: Value,
}

pub(crate) struct Synthesized {
    pub(crate) command: Command,
    routes: Vec<Route>,
    /// Field name → owning section. Keyed by bare field name.
    owners: HashMap<String, String>,
    /// Every accepted spelling (`--port`, `-p`, ...) → arity.
    spellings: HashMap<String, Arity>,
}

/// Build the flag specification for every CLI-exposed field in `config`.
pub(crate) fn synthesize(config: &Config, bin_name: Option<&str>) -> Result<Synthesized, SectionalError> {
    let (command_name, about) = config.command_info();
    let name = command_name.or(bin_name).unwrap_or("app").to_string();
    let mut command = Command::new(name).args_override_self(true);
    if let Some(about) = about {
        command = command.about(about.to_string());
    }

    let mut claimed: HashMap<String, String> = RESERVED_FLAGS
        .iter()
        .map(|flag| (flag.to_string(), "help".to_string()))
        .collect();
    let mut spellings: HashMap<String, Arity> = RESERVED_FLAGS
        .iter()
        .map(|flag| (flag.to_string(), Arity::Toggle))
        .collect();
    let mut owners = HashMap::new();
    let mut routes = Vec::new();

    for (section, entry) in config.iter() {
        let Some(schema) = entry.as_section() else {
            continue;
        };
        for field in schema.fields() {
            let Some(arg) = field.spec.as_argument() else {
                continue;
            };
            owners.insert(field.name.clone(), section.to_string());

            let (clap_arg, route) = build_arg(section, field, arg)?;
            for flag in flag_spellings(field, arg)? {
                let owner = format!("{section}.{}", field.name);
                if let Some(previous) = claimed.insert(flag.clone(), owner.clone()) {
                    return Err(SectionalError::DuplicateFlag {
                        flag,
                        field: owner,
                        owner: previous,
                    });
                }
                spellings.insert(flag, route.arity);
            }

            trace!(section, field = %field.name, arity = ?route.arity, "registered flag");
            command = command.arg(clap_arg);
            routes.push(route);
        }
    }

    debug!(flags = routes.len(), sections = config.len(), "synthesized command-line flags");
    Ok(Synthesized {
        command,
        routes,
        owners,
        spellings,
    })
}

fn build_arg(section: &str, field: &Field, arg: &Argument) -> Result<(Arg, Route), SectionalError> {
    let unwrapped = field.ty.unwrap_leaf();
    let mut clap_arg = Arg::new(field.name.clone()).long(field.name.clone());
    if !arg.help_text().is_empty() {
        clap_arg = clap_arg.help(arg.help_text().to_string());
    }

    let mut shorts = Vec::new();
    for alias in arg.extra_flags() {
        match parse_alias(field, alias)? {
            Alias::Long(long) => clap_arg = clap_arg.visible_alias(long),
            Alias::Short(c) => shorts.push(c),
        }
    }
    if let Some((first, rest)) = shorts.split_first() {
        clap_arg = clap_arg.short(*first).visible_short_aliases(rest.iter().copied());
    }

    if unwrapped.leaf == Primitive::Bool {
        if arg.is_mandatory() {
            return Err(SectionalError::InvalidBooleanDefault {
                section: section.to_string(),
                field: field.name.clone(),
            });
        }
        let option = if arg.allowed().is_some() {
            Some("choices")
        } else if arg.display().is_some() {
            Some("a display name")
        } else if arg.parse_action().is_some() {
            Some("a parse action")
        } else {
            None
        };
        if let Some(option) = option {
            return Err(SectionalError::InvalidToggleOption {
                section: section.to_string(),
                field: field.name.clone(),
                option: option.to_string(),
            });
        }
        let action = if arg.default_value().is_truthy() {
            ArgAction::SetFalse
        } else {
            ArgAction::SetTrue
        };
        let route = Route {
            field: field.name.clone(),
            arity: Arity::Toggle,
            default: arg.default_value().clone(),
        };
        return Ok((clap_arg.action(action), route));
    }

    let (arity, num_args) = if unwrapped.is_sequence() {
        (Arity::Many, ValueRange::new(1..))
    } else {
        (Arity::One, ValueRange::SINGLE)
    };
    clap_arg = clap_arg
        .action(ArgAction::Set)
        .num_args(num_args)
        .value_parser(FieldParser::new(unwrapped.leaf, arg))
        .allow_negative_numbers(true)
        .required(arg.is_mandatory());
    if let Some(name) = arg.display() {
        clap_arg = clap_arg.value_name(name.to_string());
    }

    let route = Route {
        field: field.name.clone(),
        arity,
        default: arg.default_value().clone(),
    };
    Ok((clap_arg, route))
}

/// Coerces raw tokens into [`Value`]s: the custom parse action if there is
/// one, otherwise the leaf type's own parser. A closed set is checked against
/// the coerced value, so `1.0` matches an allowed `1.0` however it is typed.
#[derive(Clone)]
struct FieldParser {
    leaf: Primitive,
    action: Option<ParseAction>,
    allowed: Option<Vec<Value>>,
}

impl FieldParser {
    fn new(leaf: Primitive, arg: &Argument) -> Self {
        Self {
            leaf,
            action: arg.parse_action().cloned(),
            allowed: arg.allowed().map(<[Value]>::to_vec),
        }
    }

    fn coerce(&self, raw: &str) -> Result<Value, String> {
        match &self.action {
            Some(action) => action.call(raw),
            None => self.leaf.parse(raw),
        }
    }
}

impl TypedValueParser for FieldParser {
    type Value = Value;

    fn parse_ref(&self, cmd: &Command, arg: Option<&Arg>, value: &OsStr) -> Result<Value, clap::Error> {
        let raw = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        let flag = arg.map_or_else(|| "...".to_string(), ToString::to_string);

        let parsed = self.coerce(raw).map_err(|reason| {
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("invalid value '{raw}' for '{flag}': {reason}\n"),
            )
            .with_cmd(cmd)
        })?;

        match &self.allowed {
            Some(allowed) if !is_allowed(allowed, &parsed) => {
                let names: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                Err(clap::Error::raw(
                    ErrorKind::InvalidValue,
                    format!(
                        "invalid value '{raw}' for '{flag}'\n  [possible values: {}]\n",
                        names.join(", ")
                    ),
                )
                .with_cmd(cmd))
            }
            _ => Ok(parsed),
        }
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        let allowed = self.allowed.as_ref()?;
        Some(Box::new(
            allowed.iter().map(|choice| PossibleValue::new(choice.to_string())),
        ))
    }
}

/// Integers and floats compare by numeric value.
fn is_allowed(allowed: &[Value], value: &Value) -> bool {
    allowed.iter().any(|choice| match (choice, value) {
        (Value::Integer(i), Value::Float(x)) | (Value::Float(x), Value::Integer(i)) => *i as f64 == *x,
        _ => choice == value,
    })
}

enum Alias {
    Long(String),
    Short(char),
}

fn parse_alias(field: &Field, alias: &str) -> Result<Alias, SectionalError> {
    let invalid = || SectionalError::InvalidAlias {
        field: field.name.clone(),
        alias: alias.to_string(),
    };
    if let Some(long) = alias.strip_prefix("--") {
        if long.is_empty() || long.starts_with('-') || long.contains('=') {
            return Err(invalid());
        }
        return Ok(Alias::Long(long.to_string()));
    }
    let mut chars = alias.strip_prefix('-').ok_or_else(invalid)?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '-' && c != '=' => Ok(Alias::Short(c)),
        _ => Err(invalid()),
    }
}

pub(crate) fn flag_spellings(field: &Field, arg: &Argument) -> Result<Vec<String>, SectionalError> {
    let mut flags = vec![format!("--{}", field.name)];
    for alias in arg.extra_flags() {
        let spelled = match parse_alias(field, alias)? {
            Alias::Long(long) => format!("--{long}"),
            Alias::Short(c) => format!("-{c}"),
        };
        flags.push(spelled);
    }
    Ok(flags)
}

/// Parse `args` against the flags synthesized from `config` and return a new
/// registry holding the resolved snapshot.
pub(crate) fn synthesize_and_parse(config: &Config, args: Vec<OsString>) -> Result<Config, SectionalError> {
    let bin_name = args
        .first()
        .and_then(|argv0| Path::new(argv0).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned());
    let synthesized = synthesize(config, bin_name.as_deref())?;

    let (known, ignored) = partition_known(args, &synthesized.spellings);
    if !ignored.is_empty() {
        debug!(?ignored, "ignoring unrecognized command-line tokens");
    }

    let matches = synthesized.command.try_get_matches_from(known)?;

    let mut snapshot = config.flatten();
    for route in &synthesized.routes {
        let value = resolve_route(&matches, route);
        let Some(section) = synthesized.owners.get(&route.field) else {
            continue;
        };
        if let Some(fields) = snapshot.get_mut(section).and_then(Value::as_mapping_mut) {
            fields.insert(route.field.clone(), value);
        }
    }

    config.with_snapshot(snapshot)
}

fn resolve_route(matches: &ArgMatches, route: &Route) -> Value {
    let id = route.field.as_str();
    match route.arity {
        Arity::Toggle => match matches.value_source(id) {
            Some(ValueSource::CommandLine) => Value::Bool(matches.get_flag(id)),
            _ => route.default.clone(),
        },
        Arity::One => matches
            .get_one::<Value>(id)
            .cloned()
            .unwrap_or_else(|| route.default.clone()),
        Arity::Many => match matches.get_many::<Value>(id) {
            Some(values) => Value::Sequence(values.cloned().collect()),
            None => route.default.clone(),
        },
    }
}

/// Split argv into tokens the synthesized flags understand and everything
/// else. The program name is always kept; everything after `--` is ignored.
fn partition_known(
    args: Vec<OsString>,
    spellings: &HashMap<String, Arity>,
) -> (Vec<OsString>, Vec<OsString>) {
    let mut iter = args.into_iter();
    let mut known: Vec<OsString> = iter.next().into_iter().collect();
    let mut ignored = Vec::new();
    let mut pending: Option<Arity> = None;

    while let Some(arg) = iter.next() {
        let text = arg.to_string_lossy().into_owned();
        if text == "--" {
            ignored.push(arg);
            ignored.extend(iter.by_ref());
            break;
        }
        if is_flag(&text) {
            match match_flag(&text, spellings) {
                Some((arity, attached)) => {
                    known.push(arg);
                    pending = match arity {
                        Arity::Toggle => None,
                        _ if attached => None,
                        other => Some(other),
                    };
                }
                None => {
                    ignored.push(arg);
                    pending = None;
                }
            }
            continue;
        }
        match pending {
            Some(Arity::One) => {
                known.push(arg);
                pending = None;
            }
            Some(Arity::Many) => known.push(arg),
            _ => ignored.push(arg),
        }
    }

    (known, ignored)
}

fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !is_negative_number(token)
}

/// `-3` or `-0.5`. Value-taking flags accept these as values.
fn is_negative_number(token: &str) -> bool {
    let Some(digits) = token.strip_prefix('-') else {
        return false;
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match digits.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(digits),
    }
}

/// Match a flag token, returning its arity and whether its value is attached
/// (`--port=80`, `-p80`).
fn match_flag(token: &str, spellings: &HashMap<String, Arity>) -> Option<(Arity, bool)> {
    if let Some(arity) = spellings.get(token) {
        return Some((*arity, false));
    }
    if token.starts_with("--") {
        let (key, _) = token.split_once('=')?;
        return spellings.get(key).map(|arity| (*arity, true));
    }
    let key = token.get(..2)?;
    match spellings.get(key) {
        Some(Arity::Toggle) | None => None,
        Some(arity) => Some((*arity, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Choice;
    use crate::fixtures::test::{net_section, registry};
    use crate::section::Section;
    use crate::types::FieldType;
    use clap::error::ErrorKind;
    use serde_json::json;

    fn parse(config: &Config, args: &[&str]) -> Result<Config, SectionalError> {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        config.try_parse_args_from(argv)
    }

    fn cli_error_kind(result: Result<Config, SectionalError>) -> ErrorKind {
        match result {
            Err(SectionalError::Cli(err)) => err.kind(),
            other => panic!("Expected a clap error, got {other:?}"),
        }
    }

    fn single(name: &str, section: Section) -> Config {
        let mut config = Config::new();
        config.register(name, section).unwrap();
        config
    }

    #[test]
    fn supplied_required_value_is_written_back() {
        let config = registry();
        let parsed = parse(&config, &["--host", "example.com"]).unwrap();
        assert_eq!(
            parsed.to_json().unwrap(),
            json!({
                "net": {"host": "example.com", "port": 8080},
                "app": {"verbose": false, "mode": "fast", "tags": [], "level": null},
            })
        );
        assert!(!parsed.check_required(true).unwrap().required);
    }

    #[test]
    fn net_section_scenario() {
        let config = single("net", net_section());
        let parsed = parse(&config, &["--host", "example.com"]).unwrap();
        assert_eq!(
            parsed.to_json().unwrap(),
            json!({"net": {"host": "example.com", "port": 8080}})
        );
        let detection = parsed.check_required(true).unwrap();
        assert!(!detection.required);
        assert!(detection.path.is_empty());
    }

    #[test]
    fn missing_required_flag_is_a_usage_error() {
        let config = registry();
        let kind = cli_error_kind(parse(&config, &[]));
        assert_eq!(kind, ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parse_returns_new_registry() {
        let config = registry();
        let parsed = parse(&config, &["--host", "h"]).unwrap();
        assert!(config.section("net").is_some());
        assert!(parsed.section("net").is_none());
        assert!(config.lookup("net.host").unwrap().is_required());
    }

    #[test]
    fn integer_flag_is_coerced() {
        let config = registry();
        let parsed = parse(&config, &["--host", "h", "--port", "9000"]).unwrap();
        assert_eq!(parsed.lookup("net.port"), Some(Value::Integer(9000)));
    }

    #[test]
    fn bad_integer_is_rejected() {
        let config = registry();
        let kind = cli_error_kind(parse(&config, &["--host", "h", "--port", "ninety"]));
        assert_eq!(kind, ErrorKind::ValueValidation);
    }

    #[test]
    fn negative_numbers_are_values() {
        let config = single(
            "calc",
            Section::new("Calc").field("offset", FieldType::integer(), crate::Argument::new(0)),
        );
        let parsed = parse(&config, &["--offset", "-3"]).unwrap();
        assert_eq!(parsed.lookup("calc.offset"), Some(Value::Integer(-3)));
    }

    #[test]
    fn string_flag_accepts_negative_number() {
        let config = registry();
        let parsed = parse(&config, &["--host", "-1"]).unwrap();
        assert_eq!(parsed.lookup("net.host"), Some(Value::from("-1")));
    }

    #[test]
    fn negative_number_detection() {
        assert!(is_negative_number("-1"));
        assert!(is_negative_number("-0.5"));
        assert!(!is_negative_number("-.5"));
        assert!(!is_negative_number("-inf"));
        assert!(!is_negative_number("-p"));
        assert!(!is_negative_number("1"));
        assert!(is_flag("-inf"));
        assert!(!is_flag("-2"));
    }

    #[test]
    fn choice_outside_set_is_rejected() {
        let config = registry();
        let kind = cli_error_kind(parse(&config, &["--host", "h", "--mode", "turbo"]));
        assert_eq!(kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn choice_inside_set_is_accepted() {
        let config = registry();
        let parsed = parse(&config, &["--host", "h", "--mode", "slow"]).unwrap();
        assert_eq!(parsed.lookup("app.mode"), Some(Value::from("slow")));
    }

    #[test]
    fn integer_choices_are_coerced() {
        let config = single(
            "pool",
            Section::new("Pool").field(
                "workers",
                FieldType::integer(),
                Choice::new([1, 2, 4]).with_default(2),
            ),
        );
        let parsed = parse(&config, &["--workers", "4"]).unwrap();
        assert_eq!(parsed.lookup("pool.workers"), Some(Value::Integer(4)));
        let kind = cli_error_kind(parse(&config, &["--workers", "3"]));
        assert_eq!(kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn float_choices_match_after_coercion() {
        let config = single(
            "scale",
            Section::new("Scale").field(
                "ratio",
                FieldType::float(),
                crate::Argument::new(0.5).choices([0.5, 1.0]),
            ),
        );
        let parsed = parse(&config, &["--ratio", "1.0"]).unwrap();
        assert_eq!(parsed.lookup("scale.ratio"), Some(Value::Float(1.0)));
        let parsed = parse(&config, &["--ratio", "1"]).unwrap();
        assert_eq!(parsed.lookup("scale.ratio"), Some(Value::Float(1.0)));
        let kind = cli_error_kind(parse(&config, &["--ratio", "2"]));
        assert_eq!(kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn integer_choices_accept_leading_zeros() {
        let config = single(
            "pool",
            Section::new("Pool").field(
                "workers",
                FieldType::integer(),
                Choice::new([1, 2, 4]).with_default(2),
            ),
        );
        let parsed = parse(&config, &["--workers", "04"]).unwrap();
        assert_eq!(parsed.lookup("pool.workers"), Some(Value::Integer(4)));
    }

    #[test]
    fn choices_check_the_parse_action_result() {
        let config = single(
            "app",
            Section::new("App").field(
                "mode",
                FieldType::string(),
                crate::Argument::new("fast")
                    .choices(["fast", "slow"])
                    .parse_with(|raw| Ok(Value::from(raw.to_lowercase()))),
            ),
        );
        let parsed = parse(&config, &["--mode", "SLOW"]).unwrap();
        assert_eq!(parsed.lookup("app.mode"), Some(Value::from("slow")));
        let kind = cli_error_kind(parse(&config, &["--mode", "TURBO"]));
        assert_eq!(kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn choices_are_listed_in_help() {
        let config = registry();
        let mut command = config.cli_command().unwrap();
        let help = command.render_long_help().to_string();
        assert!(help.contains("fast"));
        assert!(help.contains("slow"));
    }

    #[test]
    fn choice_without_default_is_mandatory() {
        let config = single(
            "out",
            Section::new("Out").field("format", FieldType::string(), Choice::new(["json", "toml"])),
        );
        let kind = cli_error_kind(parse(&config, &[]));
        assert_eq!(kind, ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn toggle_sets_true_when_default_false() {
        let config = registry();
        let parsed = parse(&config, &["--host", "h", "--verbose"]).unwrap();
        assert_eq!(parsed.lookup("app.verbose"), Some(Value::Bool(true)));
        let parsed = parse(&config, &["--host", "h"]).unwrap();
        assert_eq!(parsed.lookup("app.verbose"), Some(Value::Bool(false)));
    }

    #[test]
    fn toggle_sets_false_when_default_true() {
        let config = single(
            "out",
            Section::new("Out").field("color", FieldType::bool(), crate::Argument::new(true)),
        );
        let parsed = parse(&config, &["--color"]).unwrap();
        assert_eq!(parsed.lookup("out.color"), Some(Value::Bool(false)));
        let parsed = parse(&config, &[]).unwrap();
        assert_eq!(parsed.lookup("out.color"), Some(Value::Bool(true)));
    }

    #[test]
    fn absent_toggle_keeps_unset_default() {
        let config = single(
            "out",
            Section::new("Out").field(
                "color",
                FieldType::optional(FieldType::bool()),
                crate::Argument::new(Value::Null),
            ),
        );
        let parsed = parse(&config, &[]).unwrap();
        assert_eq!(parsed.lookup("out.color"), Some(Value::Null));
        let parsed = parse(&config, &["--color"]).unwrap();
        assert_eq!(parsed.lookup("out.color"), Some(Value::Bool(true)));
    }

    #[test]
    fn toggle_rejects_value_options() {
        let config = single(
            "out",
            Section::new("Out").field(
                "color",
                FieldType::bool(),
                crate::Argument::new(false).choices([true, false]),
            ),
        );
        match parse(&config, &[]) {
            Err(SectionalError::InvalidToggleOption { field, option, .. }) => {
                assert_eq!(field, "color");
                assert_eq!(option, "choices");
            }
            other => panic!("Expected InvalidToggleOption, got {other:?}"),
        }

        let config = single(
            "out",
            Section::new("Out").field(
                "color",
                FieldType::bool(),
                crate::Argument::new(false).display_name("WHEN"),
            ),
        );
        assert!(matches!(
            parse(&config, &[]),
            Err(SectionalError::InvalidToggleOption { .. })
        ));
    }

    #[test]
    fn required_boolean_is_a_schema_error() {
        let config = single(
            "app",
            Section::new("App").field("debug", FieldType::bool(), crate::Argument::required()),
        );
        match parse(&config, &["--debug"]) {
            Err(SectionalError::InvalidBooleanDefault { section, field }) => {
                assert_eq!(section, "app");
                assert_eq!(field, "debug");
            }
            other => panic!("Expected InvalidBooleanDefault, got {other:?}"),
        }
    }

    #[test]
    fn sequence_flag_takes_many_values() {
        let config = registry();
        let parsed = parse(&config, &["--host", "h", "--tags", "a", "b", "c"]).unwrap();
        assert_eq!(parsed.lookup("app.tags"), Some(Value::from(vec!["a", "b", "c"])));
    }

    #[test]
    fn sequence_flag_needs_at_least_one_value() {
        let config = registry();
        let result = parse(&config, &["--host", "h", "--tags"]);
        assert!(matches!(result, Err(SectionalError::Cli(_))));
    }

    #[test]
    fn optional_sequence_is_multi_valued() {
        let config = single(
            "net",
            Section::new("Net").field(
                "ports",
                FieldType::optional(FieldType::sequence(FieldType::integer())),
                crate::Argument::new(Value::Null),
            ),
        );
        let parsed = parse(&config, &["--ports", "80", "443"]).unwrap();
        assert_eq!(parsed.lookup("net.ports"), Some(Value::from(vec![80, 443])));
        let parsed = parse(&config, &[]).unwrap();
        assert_eq!(parsed.lookup("net.ports"), Some(Value::Null));
    }

    #[test]
    fn optional_scalar_accepts_one_value() {
        let config = registry();
        let parsed = parse(&config, &["--host", "h", "--level", "3"]).unwrap();
        assert_eq!(parsed.lookup("app.level"), Some(Value::Integer(3)));
    }

    #[test]
    fn repeated_flag_last_wins() {
        let config = registry();
        let parsed = parse(&config, &["--host", "a", "--host", "b"]).unwrap();
        assert_eq!(parsed.lookup("net.host"), Some(Value::from("b")));
    }

    #[test]
    fn extra_flags_are_accepted() {
        let config = single(
            "net",
            Section::new("Net").field(
                "port",
                FieldType::integer(),
                crate::Argument::new(8080).flag("-p").flag("--listen-port"),
            ),
        );
        let parsed = parse(&config, &["-p", "1"]).unwrap();
        assert_eq!(parsed.lookup("net.port"), Some(Value::Integer(1)));
        let parsed = parse(&config, &["--listen-port", "2"]).unwrap();
        assert_eq!(parsed.lookup("net.port"), Some(Value::Integer(2)));
        let parsed = parse(&config, &["--port=3"]).unwrap();
        assert_eq!(parsed.lookup("net.port"), Some(Value::Integer(3)));
    }

    #[test]
    fn malformed_extra_flag_is_rejected() {
        let section = Section::new("Net").field(
            "port",
            FieldType::integer(),
            crate::Argument::new(8080).flag("-pp"),
        );
        assert!(matches!(
            Config::new().register("net", section),
            Err(SectionalError::InvalidAlias { .. })
        ));
    }

    #[test]
    fn alias_colliding_with_help_is_rejected() {
        let section = Section::new("Net").field(
            "host",
            FieldType::string(),
            crate::Argument::new("x").flag("-h"),
        );
        match Config::new().register("net", section) {
            Err(SectionalError::DuplicateFlag { flag, owner, .. }) => {
                assert_eq!(flag, "-h");
                assert_eq!(owner, "help");
            }
            other => panic!("Expected DuplicateFlag, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let config = registry();
        let parsed = parse(
            &config,
            &["stray", "--unknown", "value", "--host", "h", "--", "--port", "1"],
        )
        .unwrap();
        assert_eq!(parsed.lookup("net.host"), Some(Value::from("h")));
        assert_eq!(parsed.lookup("net.port"), Some(Value::Integer(8080)));
    }

    #[test]
    fn custom_parse_action_replaces_coercion() {
        let config = single(
            "cache",
            Section::new("Cache").field(
                "size",
                FieldType::integer(),
                crate::Argument::new(1024).parse_with(|raw| {
                    raw.strip_suffix('k')
                        .and_then(|n| n.parse::<i64>().ok())
                        .map(|n| Value::Integer(n * 1024))
                        .ok_or_else(|| format!("expected a size like 4k, got '{raw}'"))
                }),
            ),
        );
        let parsed = parse(&config, &["--size", "4k"]).unwrap();
        assert_eq!(parsed.lookup("cache.size"), Some(Value::Integer(4096)));
        let kind = cli_error_kind(parse(&config, &["--size", "4"]));
        assert_eq!(kind, ErrorKind::ValueValidation);
    }

    #[test]
    fn plain_fields_are_not_flags() {
        let config = single(
            "net",
            Section::new("Net").field("retries", FieldType::integer(), Value::from(3)),
        );
        let parsed = parse(&config, &["--retries", "5"]).unwrap();
        assert_eq!(parsed.lookup("net.retries"), Some(Value::Integer(3)));
    }

    #[test]
    fn second_parse_is_a_no_op() {
        let config = registry();
        let first = parse(&config, &["--host", "h", "--verbose", "--tags", "x"]).unwrap();
        let second = parse(&first, &[]).unwrap();
        assert_eq!(first.flatten(), second.flatten());
    }

    #[test]
    fn help_text_and_display_name_reach_usage() {
        let config = registry();
        let mut command = config.cli_command().unwrap();
        let help = command.render_long_help().to_string();
        assert!(help.contains("--host <HOSTNAME>"));
        assert!(help.contains("Host to connect to"));
        assert!(help.contains("--verbose"));
    }

    #[test]
    fn help_flag_is_reported_by_clap() {
        let config = registry();
        let kind = cli_error_kind(parse(&config, &["--help"]));
        assert_eq!(kind, ErrorKind::DisplayHelp);
    }

    #[test]
    fn partition_keeps_values_by_arity() {
        let spellings = HashMap::from([
            ("--one".to_string(), Arity::One),
            ("--many".to_string(), Arity::Many),
            ("--flag".to_string(), Arity::Toggle),
        ]);
        let args: Vec<OsString> = ["bin", "--one", "a", "b", "--many", "c", "d", "--flag", "e"]
            .into_iter()
            .map(OsString::from)
            .collect();
        let (known, ignored) = partition_known(args, &spellings);
        assert_eq!(known, ["bin", "--one", "a", "--many", "c", "d", "--flag"]);
        assert_eq!(ignored, ["b", "e"]);
    }

    #[test]
    fn partition_handles_attached_values() {
        let spellings = HashMap::from([
            ("--port".to_string(), Arity::One),
            ("-p".to_string(), Arity::One),
        ]);
        let args: Vec<OsString> = ["bin", "--port=1", "x", "-p2", "--nope=3"]
            .into_iter()
            .map(OsString::from)
            .collect();
        let (known, ignored) = partition_known(args, &spellings);
        assert_eq!(known, ["bin", "--port=1", "-p2"]);
        assert_eq!(ignored, ["x", "--nope=3"]);
    }
}
