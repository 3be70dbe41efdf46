//! Classified intents and their argument literals.
//!
//! A `ClassifiedIntent` is the transient hand-off between the inference
//! layer and the dispatcher: one recognized intent name plus keyword
//! arguments. Arguments are a closed literal set — anything the model emits
//! that is not one of these is captured as its raw source text by the
//! parser, so dispatch never has to deal with arbitrary expressions.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Name of the sentinel intent used for anything unrecognized or unparseable.
pub const OUT_OF_SCOPE_INTENT: &str = "out_of_scope";

/// A keyword-argument value as emitted by the classifier.
///
/// `Unset` is the "parameter not mentioned" sentinel (the model's `None`):
/// distinct from every real value so a partial update can skip the field
/// instead of clearing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Literal>),
    Unset,
}

impl Literal {
    /// Short type label for rejection messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Int(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Str(_) => "string",
            Literal::Bool(_) => "boolean",
            Literal::List(_) => "list",
            Literal::Unset => "unset",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Literal::Unset)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric accessor — integers widen to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Float(f) => Some(*f),
            Literal::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// String-list accessor. A lone string counts as a one-element list so
    /// the model may say `AvailabilityZones='us-east-1a'` without a bracket.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Literal::Str(s) => Some(vec![s.clone()]),
            Literal::List(items) => items
                .iter()
                .map(|item| item.as_str().map(String::from))
                .collect(),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    /// Renders in the call-expression surface syntax the model itself uses,
    /// so intents can be echoed back into the transcript verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::Unset => write!(f, "None"),
        }
    }
}

/// Keyword arguments of a classified intent, ordered by name.
pub type IntentArgs = BTreeMap<String, Literal>;

/// One recognized user intent with its arguments.
///
/// Produced fresh per turn by the classifier and consumed immediately by the
/// dispatcher — never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedIntent {
    pub name: String,
    pub args: IntentArgs,
}

impl ClassifiedIntent {
    pub fn new(name: impl Into<String>, args: IntentArgs) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The sentinel for unrecognized or unparseable model output.
    pub fn out_of_scope() -> Self {
        Self {
            name: OUT_OF_SCOPE_INTENT.to_string(),
            args: IntentArgs::new(),
        }
    }

    pub fn is_out_of_scope(&self) -> bool {
        self.name == OUT_OF_SCOPE_INTENT
    }
}

impl fmt::Display for ClassifiedIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (key, value)) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_scope_sentinel() {
        let intent = ClassifiedIntent::out_of_scope();
        assert!(intent.is_out_of_scope());
        assert!(intent.args.is_empty());
        assert_eq!(intent.to_string(), "out_of_scope()");
    }

    #[test]
    fn int_widens_to_float() {
        assert_eq!(Literal::Int(4).as_f64(), Some(4.0));
        assert_eq!(Literal::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Literal::Int(4).as_i64(), Some(4));
        assert_eq!(Literal::Float(2.5).as_i64(), None);
    }

    #[test]
    fn string_list_accepts_lone_string() {
        let lone = Literal::Str("us-east-1a".into());
        assert_eq!(lone.as_string_list(), Some(vec!["us-east-1a".to_string()]));

        let list = Literal::List(vec![
            Literal::Str("us-east-1a".into()),
            Literal::Str("us-east-1b".into()),
        ]);
        assert_eq!(
            list.as_string_list(),
            Some(vec!["us-east-1a".to_string(), "us-east-1b".to_string()])
        );
    }

    #[test]
    fn string_list_rejects_mixed_list() {
        let mixed = Literal::List(vec![Literal::Str("a".into()), Literal::Int(1)]);
        assert_eq!(mixed.as_string_list(), None);
    }

    #[test]
    fn display_renders_call_expression() {
        let mut args = IntentArgs::new();
        args.insert("cpu".into(), Literal::Int(2));
        args.insert("ram".into(), Literal::Float(4.0));
        let intent = ClassifiedIntent::new("select_instance_type", args);
        assert_eq!(intent.to_string(), "select_instance_type(cpu=2, ram=4)");
    }

    #[test]
    fn display_quotes_and_escapes_strings() {
        let mut args = IntentArgs::new();
        args.insert("InstanceType".into(), Literal::Str("t3.large".into()));
        let intent = ClassifiedIntent::new("modify_instance_config", args);
        assert_eq!(
            intent.to_string(),
            "modify_instance_config(InstanceType='t3.large')"
        );

        assert_eq!(Literal::Str("it's".into()).to_string(), r"'it\'s'");
    }

    #[test]
    fn display_renders_unset_and_bools() {
        assert_eq!(Literal::Unset.to_string(), "None");
        assert_eq!(Literal::Bool(true).to_string(), "True");
        assert_eq!(
            Literal::List(vec![Literal::Str("a".into()), Literal::Str("b".into())]).to_string(),
            "['a', 'b']"
        );
    }

    #[test]
    fn serializes_for_process_log() {
        let mut args = IntentArgs::new();
        args.insert("MinCount".into(), Literal::Int(3));
        let intent = ClassifiedIntent::new("modify_instance_config", args);
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains(r#""name":"modify_instance_config""#));
        assert!(json.contains(r#""MinCount":3"#));
    }
}
