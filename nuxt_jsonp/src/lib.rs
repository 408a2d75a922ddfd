use std::collections::HashMap;

use log::{debug, error, warn};
use serde_json::Value;

use crate::envelope::Envelope;

pub use crate::envelope::normalize;
pub use crate::error::{ErrorKind, JsonpError};
pub use crate::substitute::{substitute_args, MAX_PARAM_LEN};

mod envelope;
mod error;
mod substitute;

/// Decodes a nuxt payload document and returns the object returned by its function.
///
/// Payloads are functions with a bunch of parameters, called with a matching list of
/// arguments, e.g. `__NUXT_JSONP__("/x", (function(a,b){return {t:a,n:b}}("t",1)))`.
/// Each argument is inserted wherever its parameter is referenced in the returned
/// object literal and the keys of that literal are quoted, which leaves valid json.
pub fn parse(document: &str) -> Result<Value, JsonpError> {
    let document = normalize(document);
    let envelope = Envelope::split(&document).map_err(log_error)?;
    let args = envelope.arguments().map_err(log_error)?;
    debug!(
        "Binding {} arguments to {} parameters",
        args.len(),
        envelope.params.len()
    );

    let bindings = envelope
        .params
        .iter()
        .copied()
        .zip(args)
        .collect::<HashMap<_, _>>();
    let body = substitute_args(envelope.body, &bindings);
    serde_json::from_str(&body)
        .map_err(JsonpError::Body)
        .map_err(log_error)
}

/// Decodes a document that is a bare object literal, without function and arguments.
pub fn parse_simple(document: &str) -> Result<Value, JsonpError> {
    fn _parse_simple(document: &str) -> Result<Value, JsonpError> {
        let (_, literal) = document
            .split_once('{')
            .ok_or(JsonpError::Unterminated('{'))?;
        let (literal, _) = literal
            .rsplit_once('}')
            .ok_or(JsonpError::Unterminated('}'))?;
        let json = substitute_args(&format!("{{{literal}}}"), &HashMap::new());
        serde_json::from_str(&json).map_err(JsonpError::Body)
    }

    _parse_simple(document).map_err(|e| {
        warn!("Failed to parse simple jsonp ({}): {e}", e.kind().as_str());
        e
    })
}

fn log_error(e: JsonpError) -> JsonpError {
    error!("JSONP parse error ({}): {e}", e.kind().as_str());
    e
}
