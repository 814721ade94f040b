//! Process query response decoding.
//!
//! The server answers with a flat JSON array: a diagnostic record followed by
//! `(marker, value)` pairs, one pair per result-producing action. The marker numbers are not
//! guaranteed to echo the declared action ids, so pairs are matched to actions by position.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::request::ClientQueryRequest;
use crate::Error;

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

/// Server-side error details carried in the diagnostic record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorInfo {
    pub error_message: String,
    #[serde(default)]
    pub error_value: Option<Value>,
    #[serde(default)]
    pub trace_correlation_id: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_type_name: Option<String>,
}

/// The leading element of every response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiagnosticRecord {
    pub schema_version: String,
    pub library_version: String,
    #[serde(default)]
    pub error_info: Option<ErrorInfo>,
    #[serde(default)]
    pub trace_correlation_id: Option<String>,
}

/// One element of the response array.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseElement {
    Diagnostic(DiagnosticRecord),
    ActionId(i64),
    Result(Value),
}

/// Splits a response body into its tagged elements.
///
/// # Errors
///
/// - `Error::MalformedResponse` if the body is not a JSON array, the diagnostic record is
///   missing, or a marker position holds something other than a number.
/// - `Error::ProtocolError` carrying the server's message verbatim when `ErrorInfo` is set.
pub fn parse_response(body: &str) -> Result<Vec<ResponseElement>, Error> {
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("response is not valid JSON: {}", e)))?;

    let Value::Array(items) = raw else {
        return Err(Error::MalformedResponse(
            "response is not a JSON array".to_string(),
        ));
    };

    let mut items = items.into_iter();
    let first = items.next().ok_or_else(|| {
        Error::MalformedResponse("response is missing the diagnostic record".to_string())
    })?;

    let diagnostic: DiagnosticRecord = serde_json::from_value(first).map_err(|e| {
        Error::MalformedResponse(format!("unreadable diagnostic record: {}", e))
    })?;

    if let Some(error_info) = &diagnostic.error_info {
        warn!(
            error_code = error_info.error_code,
            error_type = error_info.error_type_name.as_deref(),
            trace_correlation_id = diagnostic.trace_correlation_id.as_deref(),
            "Server reported an error for the batch"
        );
        return Err(Error::ProtocolError(error_info.error_message.clone()));
    }

    let mut elements = vec![ResponseElement::Diagnostic(diagnostic)];
    while let Some(marker) = items.next() {
        let marker = marker.as_i64().ok_or_else(|| {
            Error::MalformedResponse(format!("expected a result marker, found {}", marker))
        })?;
        let value = items.next().ok_or_else(|| {
            Error::MalformedResponse(format!("result marker {} has no value", marker))
        })?;
        elements.push(ResponseElement::ActionId(marker));
        elements.push(ResponseElement::Result(value));
    }

    Ok(elements)
}

/// The value the server returned for one action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    /// Id of the action as declared in the request.
    pub action_id: u32,
    /// Marker the server put in front of the value.
    pub response_id: i64,
    /// Logical name the action was declared under.
    pub name: Option<String>,
    pub value: Value,
}

impl ActionResult {
    fn mismatch(&self, expected: &str) -> Error {
        Error::MalformedResponse(format!(
            "result of action {} is not {}: {}",
            self.action_id, expected, self.value
        ))
    }

    pub fn as_str(&self) -> Result<&str, Error> {
        self.value.as_str().ok_or_else(|| self.mismatch("a string"))
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        self.value.as_bool().ok_or_else(|| self.mismatch("a boolean"))
    }

    pub fn as_i64(&self) -> Result<i64, Error> {
        self.value.as_i64().ok_or_else(|| self.mismatch("an integer"))
    }

    pub fn as_f64(&self) -> Result<f64, Error> {
        self.value.as_f64().ok_or_else(|| self.mismatch("a number"))
    }

    /// The opaque identity string, reusable as an `Identity` object path in a later request.
    pub fn object_identity(&self) -> Result<&str, Error> {
        self.value
            .get("_ObjectIdentity_")
            .and_then(Value::as_str)
            .ok_or_else(|| self.mismatch("an object with an identity"))
    }

    pub fn object_type(&self) -> Option<&str> {
        self.value.get("_ObjectType_").and_then(Value::as_str)
    }

    pub fn object_version(&self) -> Option<&str> {
        self.value.get("_ObjectVersion_").and_then(Value::as_str)
    }

    /// `true` when the server flags the object path as resolving to nothing.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
            || self
                .value
                .get("IsNull")
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// Converts the value into a typed model.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(&self.value).map_err(|e| {
            Error::MalformedResponse(format!(
                "result of action {} could not be read: {}",
                self.action_id, e
            ))
        })
    }
}

/// Decoded results of one batch, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResults {
    diagnostic: DiagnosticRecord,
    results: Vec<ActionResult>,
}

impl BatchResults {
    pub fn diagnostic(&self) -> &DiagnosticRecord {
        &self.diagnostic
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionResult> {
        self.results.iter()
    }

    /// Looks up a result by the logical name its action was declared under.
    pub fn get(&self, name: &str) -> Option<&ActionResult> {
        self.results
            .iter()
            .find(|r| r.name.as_deref() == Some(name))
    }

    /// Like [`BatchResults::get`] but treats a missing result as a malformed response.
    pub fn require(&self, name: &str) -> Result<&ActionResult, Error> {
        self.get(name).ok_or_else(|| {
            Error::MalformedResponse(format!("no result was returned for '{}'", name))
        })
    }
}

/// Pairs the response elements with the request's result-producing actions by position.
///
/// # Errors
///
/// Returns `Error::MalformedResponse` if the elements do not start with a diagnostic record
/// or if fewer results came back than the request expects.
pub fn correlate(
    request: &ClientQueryRequest,
    elements: Vec<ResponseElement>,
) -> Result<BatchResults, Error> {
    let mut elements = elements.into_iter();
    let Some(ResponseElement::Diagnostic(diagnostic)) = elements.next() else {
        return Err(Error::MalformedResponse(
            "response does not start with a diagnostic record".to_string(),
        ));
    };

    let mut expected = request.result_actions();
    let mut results = Vec::new();
    let mut marker = None;

    for element in elements {
        match element {
            ResponseElement::ActionId(id) => marker = Some(id),
            ResponseElement::Result(value) => {
                let Some(response_id) = marker.take() else {
                    return Err(Error::MalformedResponse(
                        "result value without a preceding marker".to_string(),
                    ));
                };
                match expected.next() {
                    Some(declared) => results.push(ActionResult {
                        action_id: declared.action.id(),
                        response_id,
                        name: declared.name.clone(),
                        value,
                    }),
                    None => debug!(
                        response_id = response_id,
                        "Ignoring result with no matching action"
                    ),
                }
            }
            ResponseElement::Diagnostic(_) => {
                return Err(Error::MalformedResponse(
                    "unexpected diagnostic record inside the response".to_string(),
                ));
            }
        }
    }

    let missing = expected.count();
    if missing > 0 {
        return Err(Error::MalformedResponse(format!(
            "expected {} more result(s) than the server returned",
            missing
        )));
    }

    Ok(BatchResults {
        diagnostic,
        results,
    })
}

impl ClientQueryRequest {
    /// Decodes the server's reply to this request.
    ///
    /// # Errors
    ///
    /// See [`parse_response`] and [`correlate`].
    pub fn decode_response(&self, body: &str) -> Result<BatchResults, Error> {
        let elements = parse_response(body)?;
        correlate(self, elements)
    }
}
