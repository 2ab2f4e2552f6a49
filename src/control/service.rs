// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Control state machine and service front-end

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ControlPayload, ControlRequest, ControlResponse, StatusReport};
use crate::domain::{normalize, CanonicalHost};
use crate::engine::{CaptureState, EngineHandle};
use crate::error::{Error, Result};
use crate::session::SessionSnapshot;

/// Effect of one applied control request
#[derive(Debug)]
pub(crate) struct Applied {
    pub payload: ControlPayload,
    /// Whether a snapshot save must be queued
    pub mutated: bool,
}

/// Apply a control request to engine state
///
/// Either the whole request takes effect or nothing does. Every mutating
/// action reports `mutated`, including no-op transitions.
pub(crate) fn apply(state: &mut CaptureState, request: ControlRequest) -> Result<Applied> {
    let mutated = request.is_mutating();

    let payload = match request {
        ControlRequest::StartCapture => {
            if !state.capturing {
                info!(domains = state.allow_list.len(), "Capture started");
            }
            state.capturing = true;
            ControlPayload::Ack
        }
        ControlRequest::StopCapture => {
            if state.capturing {
                info!("Capture stopped");
            }
            state.capturing = false;
            ControlPayload::Ack
        }
        ControlRequest::AddDomain { domain } => {
            let host = normalize(&domain)?;
            if state.allow_list.insert(host.clone()) {
                info!(host = %host, "Domain added");
            }
            ControlPayload::Domain(host)
        }
        ControlRequest::RemoveDomain { domain } => {
            let host = normalize(&domain)?;
            let listed = state.allow_list.remove(&host);
            let had_session = state.sessions.remove(&host);
            info!(host = %host, listed, had_session, "Domain removed");
            ControlPayload::Ack
        }
        ControlRequest::GetState => ControlPayload::State(state.status()),
        ControlRequest::ExportData => ControlPayload::Export(state.sessions.snapshot()),
        ControlRequest::ClearData => {
            let cleared = state.sessions.len();
            state.sessions.clear();
            info!(cleared, "Session data cleared");
            ControlPayload::Ack
        }
    };

    Ok(Applied { payload, mutated })
}

/// Control protocol over a running engine
#[derive(Debug, Clone)]
pub struct ControlService {
    engine: EngineHandle,
}

impl ControlService {
    /// Create a service for an engine
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Underlying engine handle
    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Begin capturing; idempotent
    pub async fn start_capture(&self) -> Result<()> {
        self.execute(ControlRequest::StartCapture).await.map(drop)
    }

    /// Stop capturing; idempotent
    pub async fn stop_capture(&self) -> Result<()> {
        self.execute(ControlRequest::StopCapture).await.map(drop)
    }

    /// Add a domain to the allow-list, returns its normalized form
    pub async fn add_domain(&self, domain: &str) -> Result<CanonicalHost> {
        match self
            .execute(ControlRequest::AddDomain {
                domain: domain.to_string(),
            })
            .await?
        {
            ControlPayload::Domain(host) => Ok(host),
            other => Err(unexpected("addDomain", &other)),
        }
    }

    /// Remove a domain and its captured session
    pub async fn remove_domain(&self, domain: &str) -> Result<()> {
        self.execute(ControlRequest::RemoveDomain {
            domain: domain.to_string(),
        })
        .await
        .map(drop)
    }

    /// Capturing flag and allow-list
    pub async fn get_state(&self) -> Result<StatusReport> {
        match self.execute(ControlRequest::GetState).await? {
            ControlPayload::State(status) => Ok(status),
            other => Err(unexpected("getState", &other)),
        }
    }

    /// Copy of every captured session
    pub async fn export(&self) -> Result<SessionSnapshot> {
        match self.execute(ControlRequest::ExportData).await? {
            ControlPayload::Export(snapshot) => Ok(snapshot),
            other => Err(unexpected("exportData", &other)),
        }
    }

    /// Drop every captured session, keeping flag and allow-list
    pub async fn clear(&self) -> Result<()> {
        self.execute(ControlRequest::ClearData).await.map(drop)
    }

    /// Run a typed request
    pub async fn execute(&self, request: ControlRequest) -> Result<ControlPayload> {
        self.engine.control(request).await
    }

    /// Run a typed request, folding errors into the response
    pub async fn handle(&self, request: ControlRequest) -> ControlResponse {
        let action = request.action();
        let result = self.execute(request).await;
        match &result {
            Err(e) if e.is_client_error() => debug!(action, error = %e, "Control request rejected"),
            Err(e) => warn!(action, error = %e, "Control request failed"),
            Ok(_) => {}
        }
        ControlResponse::from_result(result)
    }

    /// JSON entry point: request object in, response object out
    pub async fn dispatch_json(&self, request: Value) -> Value {
        match ControlRequest::from_value(request) {
            Ok(request) => self.handle(request).await.to_value(),
            Err(e) => {
                debug!(error = %e, "Rejected control request");
                ControlResponse::failure(&e).to_value()
            }
        }
    }
}

fn unexpected(action: &str, payload: &ControlPayload) -> Error {
    Error::other(format!("unexpected {} payload: {:?}", action, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{FixedClock, MemoryStore, SystemClock};
    use crate::engine::{CaptureEngine, EngineConfig};
    use crate::persistence::KEY_CAPTURING;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> CaptureState {
        CaptureState::new(Arc::new(SystemClock))
    }

    async fn service(store: Arc<MemoryStore>) -> ControlService {
        CaptureEngine::builder(EngineConfig::for_testing())
            .store(store)
            .clock(Arc::new(FixedClock::new(Utc::now())))
            .spawn()
            .await
            .unwrap()
            .control_service()
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut state = state();

        for _ in 0..2 {
            let applied = apply(&mut state, ControlRequest::StartCapture).unwrap();
            assert!(applied.mutated);
            assert!(state.is_capturing());
        }
        for _ in 0..2 {
            apply(&mut state, ControlRequest::StopCapture).unwrap();
            assert!(!state.is_capturing());
        }
    }

    #[test]
    fn test_add_domain_normalizes() {
        let mut state = state();
        let applied = apply(
            &mut state,
            ControlRequest::AddDomain {
                domain: "HTTPS://www.LinkedIn.com/feed".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            applied.payload,
            ControlPayload::Domain(normalize("linkedin.com").unwrap())
        );
        apply(
            &mut state,
            ControlRequest::AddDomain {
                domain: "linkedin.com".to_string(),
            },
        )
        .unwrap();
        assert_eq!(state.allow_list().len(), 1);
    }

    #[test]
    fn test_add_invalid_domain_changes_nothing() {
        let mut state = state();
        let err = apply(
            &mut state,
            ControlRequest::AddDomain {
                domain: "https://".to_string(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidDomain(_)));
        assert!(state.allow_list().is_empty());
    }

    #[test]
    fn test_remove_domain_deletes_record() {
        let mut state = state();
        let x = normalize("x.com").unwrap();
        state.allow_list.insert(x.clone());
        state.sessions.merge_cookie(&x, "ct0", "abc");

        apply(
            &mut state,
            ControlRequest::RemoveDomain {
                domain: "www.x.com".to_string(),
            },
        )
        .unwrap();

        assert!(!state.allow_list().contains(&x));
        assert!(!state.sessions().contains(&x));
    }

    #[test]
    fn test_clear_keeps_allow_list() {
        let mut state = state();
        let x = normalize("x.com").unwrap();
        state.capturing = true;
        state.allow_list.insert(x.clone());
        state.sessions.merge_header(&x, "authorization", "a");

        apply(&mut state, ControlRequest::ClearData).unwrap();

        assert!(state.sessions().is_empty());
        assert!(state.is_capturing());
        assert!(state.allow_list().contains(&x));
    }

    #[test]
    fn test_reads_do_not_mutate() {
        let mut state = state();
        assert!(!apply(&mut state, ControlRequest::GetState).unwrap().mutated);
        assert!(!apply(&mut state, ControlRequest::ExportData).unwrap().mutated);
    }

    #[tokio::test]
    async fn test_dispatch_json() {
        let service = service(Arc::new(MemoryStore::new())).await;

        let response = service
            .dispatch_json(json!({"action": "addDomain", "domain": "WWW.X.com"}))
            .await;
        assert_eq!(response, json!({"success": true, "domain": "x.com"}));

        let response = service.dispatch_json(json!({"action": "startCapture"})).await;
        assert_eq!(response, json!({"success": true}));

        let response = service.dispatch_json(json!({"action": "getState"})).await;
        assert_eq!(
            response,
            json!({"success": true, "isCapturing": true, "domains": ["x.com"]})
        );

        let response = service.dispatch_json(json!({"action": "exportData"})).await;
        assert_eq!(response, json!({"success": true, "data": {}}));
    }

    #[tokio::test]
    async fn test_dispatch_json_errors() {
        let service = service(Arc::new(MemoryStore::new())).await;

        let response = service.dispatch_json(json!({"action": "reboot"})).await;
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().contains("reboot"));

        let response = service.dispatch_json(json!({"action": "addDomain"})).await;
        assert_eq!(response["success"], false);

        let response = service
            .dispatch_json(json!({"action": "addDomain", "domain": "   "}))
            .await;
        assert_eq!(response["success"], false);
        assert!(service.get_state().await.unwrap().domains.is_empty());
    }

    #[tokio::test]
    async fn test_typed_operations_persist() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone()).await;

        assert_eq!(service.add_domain("x.com").await.unwrap().as_str(), "x.com");
        service.start_capture().await.unwrap();
        service.stop_capture().await.unwrap();
        service.engine().flush().await.unwrap();
        assert_eq!(store.get(KEY_CAPTURING), Some(json!(false)));

        service.start_capture().await.unwrap();
        service.engine().flush().await.unwrap();
        assert_eq!(store.get(KEY_CAPTURING), Some(json!(true)));

        service.remove_domain("x.com").await.unwrap();
        service.clear().await.unwrap();
        assert!(service.export().await.unwrap().is_empty());
        assert!(service.get_state().await.unwrap().domains.is_empty());
    }
}
