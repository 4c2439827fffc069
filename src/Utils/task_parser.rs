//! parse document with structure like
//! " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
//! pairs key-vector of values. Lines starting with //, #, % or ; are comments.
//!
//! ```text
//! problem
//! a: 0.0
//! b: 1.0
//! postprocessing
//! plot: true
//! ```
//! becomes
//! {"problem": {"a": [Float(0.0)], "b": [Float(1.0)]}, "postprocessing": {"plot": [Boolean(true)]}}
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Vec<Value>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers are accepted where a float is expected ("a: 0" means 0.0)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Float(_) => "float",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// identifier: letter or underscore, then letters, digits, underscores
fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

/// Parses a title; trailing whitespace and newlines are dropped
fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = parse_identifier(input)?;
    Ok((input.trim(), result))
}

fn parse_key(input: &str) -> IResult<&str, String> {
    parse_identifier(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value ends at a comma, whitespace or semicolon
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        let s = s.trim();
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_coma, parse_value);
    value_parser.parse(input)
}

/// key: value1, value2, ...
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and one or more key-value pairs
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    let section_map: SectionMap = pairs.into_iter().collect();
    Ok((input, (title, section_map)))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .map(|line| line.trim())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the whole (comment free) document. Repeated sections are merged, a repeated key
/// keeps its last value.
pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let mut parser = many1(delimited(space0, parse_section, multispace0));
    let (input, sections) = parser.parse(input)?;
    let mut result: DocumentMap = HashMap::new();
    for (title, section_map) in sections {
        result.entry(title).or_default().extend(section_map);
    }
    Ok((input, result))
}

/// Strips comments, parses and checks that nothing is left over. An empty document is an
/// empty map.
pub fn parse_document_as(input: &str) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(HashMap::new());
    }
    match parse_document(&filtered) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            Ok(parsed)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

/// Holds the raw text of a task, parses it and post-processes the resulting map:
/// lower-casing and replacing alternative names of sections and keys by their canonical names.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    input: String,
    result: Option<DocumentMap>,
    /// canonical section title -> accepted alternatives
    header_pseudonims: HashMap<String, Vec<String>>,
    /// canonical key -> accepted alternatives
    field_pseudonims: HashMap<String, Vec<String>>,
}

impl DocumentParser {
    pub fn new(input: String) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    pub fn setting_from_file(&mut self, path: Option<PathBuf>) -> Result<(), String> {
        let path = match path {
            Some(p) => p,
            None => {
                let mut default_path =
                    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                default_path.push("bvp_task.txt");
                default_path
            }
        };
        self.input = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Ok(())
    }

    pub fn with_pseudonims(
        &mut self,
        header_pseudonims: Option<HashMap<String, Vec<String>>>,
        field_pseudonims: Option<HashMap<String, Vec<String>>>,
    ) {
        if let Some(h) = header_pseudonims {
            self.header_pseudonims = h;
        }
        if let Some(f) = field_pseudonims {
            self.field_pseudonims = f;
        }
    }

    pub fn parse_document(&mut self) -> Result<(), String> {
        let parsed = parse_document_as(&self.input)?;
        self.result = Some(parsed);
        self.replace_pseudonims();
        Ok(())
    }

    /// lower-cases section titles and keys, except the keys of the sections listed in `except`
    pub fn keys_to_lower_case(&mut self, except: Option<Vec<String>>) {
        let except = except.unwrap_or_default();
        if let Some(result) = self.result.take() {
            let mut lowered: DocumentMap = HashMap::new();
            for (title, section) in result {
                let title = title.to_lowercase();
                let section: SectionMap = if except.contains(&title) {
                    section
                } else {
                    section
                        .into_iter()
                        .map(|(k, v)| (k.to_lowercase(), v))
                        .collect()
                };
                lowered.entry(title).or_default().extend(section);
            }
            self.result = Some(lowered);
        }
    }

    fn replace_pseudonims(&mut self) {
        let Some(result) = self.result.take() else {
            return;
        };
        let canonical = |name: &str, table: &HashMap<String, Vec<String>>| -> String {
            table
                .iter()
                .find(|(_, alts)| alts.iter().any(|a| a.eq_ignore_ascii_case(name)))
                .map(|(canon, _)| canon.clone())
                .unwrap_or_else(|| name.to_string())
        };
        let mut replaced: DocumentMap = HashMap::new();
        for (title, section) in result {
            let title = canonical(&title, &self.header_pseudonims);
            let section: SectionMap = section
                .into_iter()
                .map(|(k, v)| (canonical(&k, &self.field_pseudonims), v))
                .collect();
            replaced.entry(title).or_default().extend(section);
        }
        self.result = Some(replaced);
    }

    pub fn get_result(&self) -> Option<&DocumentMap> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_and_key() {
        let (remaining, title) = parse_title("title_1\n key1: value1").unwrap();
        assert_eq!(title, "title_1");
        assert_eq!(remaining, "key1: value1");
        let (remaining, key) = parse_key("plot_filename: out.png").unwrap();
        assert_eq!(key, "plot_filename");
        assert_eq!(remaining, ": out.png");
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("bvp.png, value2").unwrap();
        assert_eq!(value, Value::String("bvp.png".to_string()));
        assert_eq!(remaining, ", value2");
        assert_eq!(parse_value("100000").unwrap().1, Value::Integer(100000));
        assert_eq!(parse_value("1e-6").unwrap().1, Value::Float(1e-6));
        assert_eq!(parse_value("false").unwrap().1, Value::Boolean(false));
    }

    #[test]
    fn test_parse_key_value_pair() {
        let (remaining, (key, values)) = parse_key_value_pair("h : 0.1, 0.05\nnext: 1").unwrap();
        assert_eq!(key, "h");
        assert_eq!(values, vec![Value::Float(0.1), Value::Float(0.05)]);
        assert_eq!(remaining, "next: 1");
    }

    #[test]
    fn test_as_float_accepts_integer() {
        assert_eq!(Value::Integer(2).as_float(), Some(2.0));
        assert_eq!(Value::Boolean(true).as_float(), None);
        assert_eq!(Value::Float(0.5).type_name(), "float");
    }

    #[test]
    fn test_parse_document_with_comments() {
        let input = r#"
        # domain
        problem
            a: 0
            b: 1.0
        // discretization
        discretization
            h: 0.1
            n_terms: 10
        "#;
        let doc = parse_document_as(input).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["problem"]["a"], vec![Value::Integer(0)]);
        assert_eq!(doc["discretization"]["n_terms"], vec![Value::Integer(10)]);
    }

    #[test]
    fn test_parse_document_empty_and_malformed() {
        assert!(parse_document_as("  \n # only a comment\n").unwrap().is_empty());
        assert!(parse_document_as("problem\n a 0.0").is_err());
        assert!(parse_document_as("problem").is_err());
    }

    #[test]
    fn test_repeated_section_is_merged() {
        let doc = parse_document_as("problem\na: 1\nshooting\nrtol: 1e-8\nproblem\nb: 2").unwrap();
        assert_eq!(doc["problem"].len(), 2);
    }

    #[test]
    fn test_document_parser_lower_case_and_pseudonims() {
        let input = "Problem\nA: 0.5\nDISCRETIZATION\nN_Terms: 4\nsettings\nMyVar: 1".to_string();
        let mut parser = DocumentParser::new(input);
        parser.with_pseudonims(
            Some(HashMap::from([(
                "postprocessing".to_string(),
                vec!["settings".to_string()],
            )])),
            None,
        );
        parser.parse_document().unwrap();
        parser.keys_to_lower_case(Some(vec!["postprocessing".to_string()]));
        let result = parser.get_result().unwrap();
        assert_eq!(result["problem"]["a"], vec![Value::Float(0.5)]);
        assert_eq!(result["discretization"]["n_terms"], vec![Value::Integer(4)]);
        assert!(result["postprocessing"].contains_key("MyVar"));
    }

    #[test]
    fn test_setting_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.txt");
        std::fs::write(&path, "comparison\nparallel: true\n").unwrap();
        let mut parser = DocumentParser::new(String::new());
        parser.setting_from_file(Some(path)).unwrap();
        parser.parse_document().unwrap();
        assert_eq!(
            parser.get_result().unwrap()["comparison"]["parallel"],
            vec![Value::Boolean(true)]
        );
        let missing = dir.path().join("missing.txt");
        assert!(parser.setting_from_file(Some(missing)).is_err());
    }
}
