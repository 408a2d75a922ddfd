use serde_json::Value;

use crate::error::JsonpError;

const FUNCTION: &str = "function(";

const RETURN: &str = "return {";

/// Replaces the js-only literals `void 0` and `{}` with `null`.
///
/// Empty objects are only ever used as placeholder arguments, and leaving them in
/// place would break locating the end of the function body.
pub fn normalize(document: &str) -> String {
    document.replace("void 0", "null").replace("{}", "null")
}

/// The three textual parts of a `(function(params){...return {body}}(args))` document.
#[derive(Debug)]
pub(crate) struct Envelope<'a> {
    pub params: Vec<&'a str>,
    pub body: &'a str,
    pub args: &'a str,
}

impl<'a> Envelope<'a> {
    pub fn split(document: &'a str) -> Result<Self, JsonpError> {
        let (function, args) = document
            .rsplit_once('}')
            .ok_or(JsonpError::Structure("}"))?;
        let (_, function) = function
            .split_once(FUNCTION)
            .ok_or(JsonpError::Structure(FUNCTION))?;
        let (params, function) = function
            .split_once(')')
            .ok_or(JsonpError::Structure(")"))?;

        // Some functions assign a few variables before returning, so only the
        // returned object is of interest. The first char may be the block's own brace.
        let skip = function.chars().next().map_or(0, char::len_utf8);
        let start = function[skip..]
            .find(RETURN)
            .map(|idx| idx + skip)
            .ok_or(JsonpError::Structure(RETURN))?;
        let body = function[start + RETURN.len() - 1..]
            .trim_end()
            .trim_end_matches(';');

        let args = args
            .trim_start_matches(')')
            .strip_prefix('(')
            .ok_or(JsonpError::Structure("("))?
            .trim_end()
            .trim_end_matches(|c: char| matches!(c, '}' | ')' | ';'));

        let params = params
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        Ok(Envelope { params, body, args })
    }

    pub fn arguments(&self) -> Result<Vec<Value>, JsonpError> {
        parse_arguments(self.args)
    }
}

/// Parses a comma separated arguments list as a json array.
///
/// Backslashes are escaped first so they survive this parse and are still present when
/// the values are inserted into the body. That turns `\"` into `\\"`, which needs one
/// more backslash to remain an escaped quote.
fn parse_arguments(args: &str) -> Result<Vec<Value>, JsonpError> {
    let escaped = args.replace('\\', "\\\\").replace("\\\"", "\\\\\"");
    serde_json::from_str(&format!("[{escaped}]")).map_err(JsonpError::Arguments)
}
