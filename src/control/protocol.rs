// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Wire types for control requests and responses

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::CanonicalHost;
use crate::error::{Error, Result};
use crate::session::SessionSnapshot;

/// Every action name the protocol understands
pub const ACTIONS: &[&str] = &[
    "startCapture",
    "stopCapture",
    "addDomain",
    "removeDomain",
    "getState",
    "exportData",
    "clearData",
];

/// One control action with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlRequest {
    StartCapture,
    StopCapture,
    AddDomain { domain: String },
    RemoveDomain { domain: String },
    GetState,
    ExportData,
    ClearData,
}

impl ControlRequest {
    /// Parse a JSON request
    ///
    /// Unknown or missing actions fail with [`Error::UnknownAction`]; a known
    /// action with a bad payload fails with [`Error::MalformedRequest`].
    pub fn from_value(value: Value) -> Result<Self> {
        let action = match value.get("action") {
            Some(Value::String(action)) => action.clone(),
            Some(other) => return Err(Error::UnknownAction(other.to_string())),
            None => return Err(Error::UnknownAction("<missing>".to_string())),
        };

        if !ACTIONS.contains(&action.as_str()) {
            return Err(Error::UnknownAction(action));
        }

        serde_json::from_value(value).map_err(|e| Error::malformed(action, e.to_string()))
    }

    /// Protocol name of the action
    pub fn action(&self) -> &'static str {
        match self {
            ControlRequest::StartCapture => "startCapture",
            ControlRequest::StopCapture => "stopCapture",
            ControlRequest::AddDomain { .. } => "addDomain",
            ControlRequest::RemoveDomain { .. } => "removeDomain",
            ControlRequest::GetState => "getState",
            ControlRequest::ExportData => "exportData",
            ControlRequest::ClearData => "clearData",
        }
    }

    /// Whether the action changes persisted state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, ControlRequest::GetState | ControlRequest::ExportData)
    }
}

/// Capture status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub is_capturing: bool,
    pub domains: Vec<String>,
}

/// Action-specific success data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPayload {
    /// No data (`{}`)
    Ack,
    /// Normalized domain that was added
    Domain(CanonicalHost),
    /// Current status
    State(StatusReport),
    /// Copy of every session record
    Export(SessionSnapshot),
}

/// Response to a control request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub success: bool,
    pub payload: Option<ControlPayload>,
    pub error: Option<String>,
}

impl ControlResponse {
    /// Successful response
    pub fn ok(payload: ControlPayload) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    /// Failed response
    pub fn failure(error: &Error) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.to_string()),
        }
    }

    /// Build from an operation result
    pub fn from_result(result: Result<ControlPayload>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(e) => Self::failure(&e),
        }
    }

    /// Wire form: `{success, ...payload}` or `{success: false, error}`
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(self.success));

        match &self.payload {
            None | Some(ControlPayload::Ack) => {}
            Some(ControlPayload::Domain(domain)) => {
                body.insert("domain".to_string(), json!(domain));
            }
            Some(ControlPayload::State(status)) => {
                body.insert("isCapturing".to_string(), json!(status.is_capturing));
                body.insert("domains".to_string(), json!(status.domains));
            }
            Some(ControlPayload::Export(snapshot)) => {
                body.insert("data".to_string(), json!(snapshot));
            }
        }

        if let Some(error) = &self.error {
            body.insert("error".to_string(), Value::String(error.clone()));
        }

        Value::Object(body)
    }
}
