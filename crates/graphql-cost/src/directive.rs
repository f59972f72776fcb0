//! Extraction of `@cost` annotations from an SDL document.

use std::ops::Range;

use cynic_parser::{type_system as ast, ConstValue};

use crate::{CostError, CostMap, CostSpec, Multiplier};

mod literals;

const DIRECTIVE_NAME: &str = "cost";

/// Declaration of the `@cost` directive, to be prepended to annotated schemas.
pub const COST_DIRECTIVE: &str = r#"directive @cost(
  complexity: Int
  network: Int
  db: Int
  multipliers: [String]
  useMultipliers: Boolean
  provides: [String]
  recursionMultiplier: Float
) on FIELD | FIELD_DEFINITION
"#;

/// Token cost of one unit of `network` or `db`.
pub const TOKEN_UNIT_COST: f64 = 100.0;

/// Result of [`extract_costs`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCosts {
    pub cost_map: CostMap,
    /// The input SDL without `@cost` usages and without its declaration.
    pub clean_schema: String,
}

/// Reads the `@cost` annotations of every object type field into a [`CostMap`],
/// and strips the annotations and the directive declaration from the schema.
///
/// Invalid annotation arguments are ignored. A field whose annotation has no
/// valid argument left gets no entry. When a field carries the annotation more
/// than once, the last one wins.
pub fn extract_costs(sdl: &str) -> Result<ExtractedCosts, CostError> {
    let document =
        cynic_parser::parse_type_system_document(sdl).map_err(|err| CostError::SchemaParse(err.to_string()))?;

    let mut cost_map = CostMap::new();
    let mut removals = Vec::new();

    for definition in document.definitions() {
        match definition {
            ast::Definition::Type(typedef) | ast::Definition::TypeExtension(typedef) => {
                let (fields, is_object): (Vec<_>, _) = match &typedef {
                    ast::TypeDefinition::Object(object) => (object.fields().collect(), true),
                    ast::TypeDefinition::Interface(interface) => (interface.fields().collect(), false),
                    _ => continue,
                };

                for field in fields {
                    for directive in field.directives().filter(|directive| directive.name() == DIRECTIVE_NAME) {
                        removals.push(directive_range(sdl, directive.name_span().start));

                        if !is_object {
                            continue;
                        }

                        if let Some(spec) = cost_spec(sdl, typedef.name(), field.name(), directive) {
                            cost_map.insert(typedef.name(), field.name(), spec);
                        }
                    }
                }
            }
            ast::Definition::Directive(directive_definition) if directive_definition.name() == DIRECTIVE_NAME => {
                let span = directive_definition.span();
                let start = directive_definition
                    .description()
                    .map(|description| description.span().start)
                    .unwrap_or(span.start);

                removals.push(start..span.end);
            }
            _ => (),
        }
    }

    Ok(ExtractedCosts {
        cost_map,
        clean_schema: tidy(&splice_out(sdl, removals)),
    })
}

fn cost_spec(sdl: &str, type_name: &str, field_name: &str, directive: ast::Directive<'_>) -> Option<CostSpec> {
    let mut spec = CostSpec::default();
    let mut is_empty = true;

    for argument in directive.arguments() {
        let name = argument.name();
        let value = argument.value();
        let span = value.span();
        let source = sdl.get(span.start..span.end).unwrap_or_default();

        let accepted = match name {
            "complexity" => number(&value).map(|complexity| spec.complexity = Some(complexity)),
            "network" | "db" => number(&value).map(|units| {
                *spec.tokens.get_or_insert(0.0) += units * TOKEN_UNIT_COST;
            }),
            "multipliers" => multipliers(&value, source).map(|multipliers| spec.multipliers = Some(multipliers)),
            "useMultipliers" => match value {
                ConstValue::Boolean(boolean) => {
                    spec.use_multipliers = Some(boolean.value());
                    Some(())
                }
                _ => None,
            },
            "provides" => strings(&value, source).map(|provides| spec.provides = Some(provides)),
            "recursionMultiplier" => number(&value)
                .filter(|base| *base > 0.0)
                .map(|base| spec.recursion_multiplier = Some(base)),
            _ => None,
        };

        match accepted {
            Some(()) => is_empty = false,
            None => tracing::debug!("Ignoring invalid @cost argument `{name}` on {type_name}.{field_name}"),
        }
    }

    (!is_empty).then_some(spec)
}

fn number(value: &ConstValue<'_>) -> Option<f64> {
    match value {
        ConstValue::Int(int) => Some(int.as_i64() as f64),
        ConstValue::Float(float) => Some(float.as_f64()),
        _ => None,
    }
}

// String items are read from the source text, block strings included.
fn multipliers(value: &ConstValue<'_>, source: &str) -> Option<Vec<Multiplier>> {
    let ConstValue::List(list) = value else {
        return None;
    };

    let mut literals = literals::strings(source)?.into_iter();

    let multipliers = list
        .items()
        .map(|item| match item {
            ConstValue::String(_) => literals.next().map(Multiplier::Argument),
            item => number(&item).map(Multiplier::Literal),
        })
        .collect::<Option<Vec<_>>>()?;

    (!multipliers.is_empty()).then_some(multipliers)
}

fn strings(value: &ConstValue<'_>, source: &str) -> Option<Vec<String>> {
    let ConstValue::List(list) = value else {
        return None;
    };

    let mut literals = literals::strings(source)?.into_iter();

    let strings = list
        .items()
        .map(|item| match item {
            ConstValue::String(_) => literals.next(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    (!strings.is_empty()).then_some(strings)
}

/// Byte range of the directive usage whose span starts at `span_start`, from
/// the whitespace before its `@` to the closing parenthesis of its arguments.
fn directive_range(sdl: &str, span_start: usize) -> Range<usize> {
    let at = directive_start(sdl, span_start);
    let start = sdl[..at].trim_end().len();

    let name = &sdl[at + 1..];
    let name_start = at + 1 + (name.len() - name.trim_start().len());
    let name_end = sdl[name_start..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(sdl.len(), |len| name_start + len);

    let rest = &sdl[name_end..];
    let arguments_start = name_end + (rest.len() - rest.trim_start().len());

    let end = if sdl[arguments_start..].starts_with('(') {
        closing_paren(sdl, arguments_start).unwrap_or(name_end)
    } else {
        name_end
    };

    start..end
}

/// Offset of the `@` of a directive usage. Spans start on it, or on the
/// directive name right after it.
fn directive_start(sdl: &str, span_start: usize) -> usize {
    if sdl.as_bytes().get(span_start) == Some(&b'@') {
        return span_start;
    }

    sdl[..span_start]
        .trim_end()
        .strip_suffix('@')
        .map_or(span_start, str::len)
}

/// Offset just past the parenthesis closing the one at `open`, skipping over
/// strings and comments.
fn closing_paren(sdl: &str, open: usize) -> Option<usize> {
    let bytes = sdl.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            b'#' => {
                i += sdl[i..].find('\n')?;
            }
            b'"' if sdl[i..].starts_with(r#"""""#) => {
                i += 3 + sdl[i + 3..].find(r#"""""#)? + 2;
            }
            b'"' => {
                i += 1;
                while bytes.get(i)? != &b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => (),
        }
        i += 1;
    }

    None
}

fn splice_out(sdl: &str, mut removals: Vec<Range<usize>>) -> String {
    removals.sort_by_key(|range| range.start);

    let mut output = String::with_capacity(sdl.len());
    let mut cursor = 0;

    for range in removals {
        if range.start < cursor {
            cursor = cursor.max(range.end);
            continue;
        }

        output.push_str(&sdl[cursor..range.start]);
        cursor = range.end;
    }

    output.push_str(&sdl[cursor..]);
    output
}

/// Trailing whitespace removed, runs of blank lines collapsed, one final newline.
fn tidy(sdl: &str) -> String {
    let mut output = String::with_capacity(sdl.len());
    let mut previous_blank = true;

    for line in sdl.lines().map(str::trim_end) {
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }

        output.push_str(line);
        output.push('\n');
        previous_blank = blank;
    }

    let trimmed = output.trim_end().len();
    output.truncate(trimmed);

    if !output.is_empty() {
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn directive_with_nested_parentheses_in_strings() {
        let sdl = r#"type A { b: Int @cost(provides: ["(", ")"], multipliers: ["x"]) @other }"#;
        let at = sdl.find("@cost").unwrap();

        let range = directive_range(sdl, at);

        assert_eq!(&sdl[range], r#" @cost(provides: ["(", ")"], multipliers: ["x"])"#);
    }

    #[test]
    fn earlier_directives_are_kept() {
        let sdl = r#"type User @key(fields: "id") { deals: [Int] @external @cost(complexity: 2) }"#;
        let at = sdl.find("@cost").unwrap();

        let range = directive_range(sdl, at);

        assert_eq!(range.start, sdl.find(" @cost").unwrap());
        assert_eq!(&sdl[range.end..], " }");
    }

    #[test]
    fn directive_without_arguments() {
        let sdl = "type A { b: Int @cost\n c: Int }";
        let at = sdl.find("@cost").unwrap();

        assert_eq!(&sdl[directive_range(sdl, at)], " @cost");
        assert_eq!(&sdl[directive_range(sdl, at + 1)], " @cost");
    }

    #[test]
    fn arguments_spanning_lines_with_comments() {
        let sdl = indoc! {r#"
            type A {
              b: Int @cost(
                complexity: 2 # not ) yet
                provides: ["""a)"""]
              ) @deprecated
            }
        "#};

        let extracted = extract_costs(sdl).unwrap();

        assert_eq!(
            extracted.clean_schema,
            indoc! {"
                type A {
                  b: Int @deprecated
                }
            "}
        );
        assert_eq!(
            extracted.cost_map.get("A", "b"),
            Some(&CostSpec {
                complexity: Some(2.0),
                provides: Some(vec!["a)".to_owned()]),
                ..Default::default()
            })
        );
    }

    #[test]
    fn tidy_collapses_blank_lines() {
        assert_eq!(tidy("\n\ntype A {  \n\n\n  a: Int\n}\n\n\n"), "type A {\n\n  a: Int\n}\n");
        assert_eq!(tidy("  \n "), "");
    }

    #[test]
    fn invalid_arguments_are_dropped() {
        let sdl = indoc! {r#"
            type Query {
              a: Int @cost(complexity: "high", useMultipliers: true)
              b: Int @cost(recursionMultiplier: 0)
              c: Int @cost(recursionMultiplier: 1.5, multipliers: ["first", 2])
              d: Int @cost(unknown: 1)
            }
        "#};

        let cost_map = extract_costs(sdl).unwrap().cost_map;

        assert_eq!(
            cost_map.get("Query", "a"),
            Some(&CostSpec {
                use_multipliers: Some(true),
                ..Default::default()
            })
        );
        assert_eq!(cost_map.get("Query", "b"), None);
        assert_eq!(
            cost_map.get("Query", "c"),
            Some(&CostSpec {
                recursion_multiplier: Some(1.5),
                multipliers: Some(vec![Multiplier::from("first"), Multiplier::Literal(2.0)]),
                ..Default::default()
            })
        );
        assert_eq!(cost_map.get("Query", "d"), None);
        assert_eq!(cost_map.len(), 2);
    }

    #[test]
    fn interface_annotations_are_stripped_but_not_recorded() {
        let sdl = indoc! {r#"
            interface Node {
              id: ID! @cost(complexity: 3)
            }
        "#};

        let extracted = extract_costs(sdl).unwrap();

        assert!(extracted.cost_map.is_empty());
        assert_eq!(extracted.clean_schema, "interface Node {\n  id: ID!\n}\n");
    }
}
