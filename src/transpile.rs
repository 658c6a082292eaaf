use crate::parse::{tokenize, Piece, ReferenceKind, Token};
use crate::symbols::Symbols;
use crate::{Accessor, Source, ValueType};

/// Rewrites sigil references into typed `ctx` / `result` access calls.
///
/// ```
/// use featws::{ModelBuilder, Parameter, Symbols, Transpiler, ValueType};
///
/// let model = ModelBuilder::new()
///     .parameter(Parameter::new("age", ValueType::Integer))
///     .build()
///     .unwrap();
/// let symbols = Symbols::new(&model);
/// let out = Transpiler::new(&symbols).transpile("$age >= 18", Some(ValueType::Boolean));
/// assert_eq!(out, r#"ctx.GetInt("age") >= 18"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Transpiler<'s, 'm> {
    symbols: &'s Symbols<'m>,
}

impl<'s, 'm> Transpiler<'s, 'm> {
    #[must_use]
    pub fn new(symbols: &'s Symbols<'m>) -> Self {
        Self { symbols }
    }

    /// Substitute every reference in `expression`, then coerce the result
    /// to `output`.
    #[must_use]
    pub fn transpile(&self, expression: &str, output: Option<ValueType>) -> String {
        let mut out = String::with_capacity(expression.len() * 2);
        for piece in tokenize(expression) {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Ref(token) => out.push_str(&self.access(&token)),
            }
        }
        coerce(output, out)
    }

    fn access(&self, token: &Token<'_>) -> String {
        let Some(resolved) = self.symbols.resolve(token.kind, token.name) else {
            debug_assert_eq!(token.kind, ReferenceKind::GroupMembership);
            return group_check(token.name);
        };

        // An unrecognized `::TYPE` is an explicit cast to the untyped getter.
        let cast = token.type_override.map(|cast| cast.value_type());

        let root_type = match cast {
            Some(cast) if token.path.is_empty() => cast,
            _ => resolved.value_type,
        };
        let root = accessor_call(resolved.source, Accessor::for_type(root_type), token.name);

        let Some((last, interior)) = token.path.split_last() else {
            return root;
        };
        let last_accessor = Accessor::for_type(cast.flatten());
        interior
            .iter()
            .map(|segment| format!(".{}(\"{segment}\")", Accessor::GetMap))
            .chain(std::iter::once(format!(".{last_accessor}(\"{last}\")")))
            .fold(root, |mut access, segment| {
                access.push_str(&segment);
                access
            })
    }
}

fn accessor_call(source: Source, accessor: Accessor, name: &str) -> String {
    format!("{source}.{accessor}(\"{name}\")")
}

fn group_check(name: &str) -> String {
    format!(
        "processor.Contains({}, {})",
        accessor_call(Source::Context, Accessor::GetSlice, &format!("{name}_entries")),
        accessor_call(Source::Context, Accessor::Get, &format!("{name}_value")),
    )
}

fn is_access_call(expression: &str) -> bool {
    [Source::Context, Source::Result]
        .iter()
        .any(|s| expression.strip_prefix(s.prefix()).is_some_and(|rest| rest.starts_with('.')))
}

/// Make an expression produce a value of the rule's output type.
pub(crate) fn coerce(output: Option<ValueType>, expression: String) -> String {
    match output {
        Some(ValueType::String) => {
            if is_access_call(&expression) {
                format!("{expression} + \"\"")
            } else if expression.starts_with('"') {
                expression
            } else {
                format!("\"{expression}\"")
            }
        }
        Some(ValueType::Object) => {
            format!("processor.ToMap({})", serde_json::Value::String(expression))
        }
        _ => expression,
    }
}
