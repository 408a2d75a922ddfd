use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Longest identifier that is treated as a parameter reference.
///
/// Minified payloads name their parameters `a`, `b`, ..., `aZ`, `$a`, ... so anything
/// longer is considered to be a regular identifier and left alone.
pub const MAX_PARAM_LEN: usize = 3;

/// Either a double quoted string (group 0 only) or a run of unquoted text (group 1).
static QUOTED_OR_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:\\"|[^"])*"|([^"]+)"#).unwrap());

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_$]+").unwrap());

static BARE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([}{\]\[,])(\w+):").unwrap());

/// Quotes the bare keys of a js object literal and replaces every parameter reference
/// with the json form of its bound argument.
///
/// Only text outside of double quoted strings is touched. Identifiers that aren't in
/// `bindings` are left as they are.
pub fn substitute_args(literal: &str, bindings: &HashMap<&str, Value>) -> String {
    QUOTED_OR_BARE
        .replace_all(literal, |caps: &Captures| match caps.get(1) {
            Some(bare) => insert_args(&quote_keys(bare.as_str()), bindings),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

fn quote_keys(text: &str) -> String {
    BARE_KEY.replace_all(text, r#"${1}"${2}":"#).into_owned()
}

fn insert_args(text: &str, bindings: &HashMap<&str, Value>) -> String {
    if bindings.is_empty() {
        return text.to_owned();
    }
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for ident in IDENTIFIER.find_iter(text) {
        if !is_param_ref(text, ident.start(), ident.end()) {
            continue;
        }
        if let Some(value) = bindings.get(ident.as_str()) {
            result.push_str(&text[last..ident.start()]);
            render(value, &mut result);
            last = ident.end();
        }
    }
    result.push_str(&text[last..]);
    result
}

/// A parameter is referenced as a value: right after `[`, `:`, `{` or `,` and
/// terminated by whitespace, `,`, `}` or `]`.
fn is_param_ref(text: &str, start: usize, end: usize) -> bool {
    let preceded = text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| matches!(c, '[' | ':' | '{' | ','));
    let followed = text[end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_whitespace() || matches!(c, ',' | '}' | ']'));
    (1..=MAX_PARAM_LEN).contains(&(end - start)) && preceded && followed
}

fn render(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => render_str(s, out),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                render(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                render_str(key, out);
                out.push(':');
                render(item, out);
            }
            out.push('}');
        }
    }
}

// Escapes were preserved while parsing the arguments, so the text goes in as is.
fn render_str(s: &str, out: &mut String) {
    out.push('"');
    out.push_str(&s.replace('\n', "\\n"));
    out.push('"');
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use serde_json::{json, Value};

    use super::{substitute_args, MAX_PARAM_LEN};

    fn bindings(pairs: &[(&'static str, Value)]) -> HashMap<&'static str, Value> {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_quote_keys() {
        let result = substitute_args("{key1:1,key2:[2,3],n:{x_y:null}}", &HashMap::new());
        assert_eq!(result, r#"{"key1":1,"key2":[2,3],"n":{"x_y":null}}"#);
    }

    #[test]
    fn test_substitution() {
        let map = bindings(&[("a", json!("one")), ("b", json!(2)), ("c", Value::Null)]);
        let result = substitute_args("{x:a,y:[b,c],z:{w:b}}", &map);
        assert_eq!(result, r#"{"x":"one","y":[2,null],"z":{"w":2}}"#);
    }

    #[test]
    fn test_quoted_strings_are_untouched() {
        let map = bindings(&[("a", json!(1)), ("b", json!(2))]);
        let result = substitute_args(r#"{k:"a",s:"x:a, [b]",v:a}"#, &map);
        assert_eq!(result, r#"{"k":"a","s":"x:a, [b]","v":1}"#);
    }

    #[test]
    fn test_escaped_quotes_stay_in_string() {
        let map = bindings(&[("a", json!(1))]);
        let result = substitute_args(r#"{k:"say \"a,b:\"",v:a}"#, &map);
        assert_eq!(result, r#"{"k":"say \"a,b:\"","v":1}"#);
    }

    #[test]
    fn test_longer_identifiers_are_not_parameters() {
        let map = bindings(&[("a", json!(1)), ("ab", json!(2))]);
        let result = substitute_args("{x:abc,y:ab ,z:1a2b}", &map);
        assert_eq!(result, r#"{"x":abc,"y":2 ,"z":1a2b}"#);
    }

    #[test]
    fn test_substituted_text_is_not_quoted() {
        let map = bindings(&[("a", json!("Regie,Land:NL"))]);
        let result = substitute_args("{s:a}", &map);
        assert_eq!(result, r#"{"s":"Regie,Land:NL"}"#);
    }

    #[test]
    fn test_render_values() {
        let map = bindings(&[
            ("a", json!(true)),
            ("b", json!(false)),
            ("c", json!(1.5)),
            ("d", json!("line\nbreak")),
            ("e", json!([1, "x", null])),
            ("f", json!({"k": "v"})),
        ]);
        let result = substitute_args("[a,b,c,d,e,f]", &map);
        assert_eq!(
            result,
            r#"[true,false,1.5,"line\nbreak",[1,"x",null],{"k":"v"}]"#
        );
    }

    #[test]
    fn test_token_length_degrades_to_passthrough() {
        for len in 1..=MAX_PARAM_LEN + 3 {
            let param = "q".repeat(len);
            let mut map = HashMap::new();
            map.insert(param.as_str(), json!(7));
            let literal = format!("{{k:{param}}}");
            let result = substitute_args(&literal, &map);
            if len <= MAX_PARAM_LEN {
                assert_eq!(result, r#"{"k":7}"#);
            } else {
                assert_eq!(result, format!(r#"{{"k":{param}}}"#));
            }
        }
    }

    #[test]
    fn test_unterminated_quote() {
        let map = bindings(&[("a", json!(1))]);
        let result = substitute_args(r#"{k:a,s:"open}"#, &map);
        assert_eq!(result, r#"{"k":1,"s":"open}"#);
    }
}
