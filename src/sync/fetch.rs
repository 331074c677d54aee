use std::{fmt, sync::Arc};

use ahash::AHashMap;
use serde::Serialize;

use crate::registry::FileRef;

use super::Hazard;

/// Handle for one outstanding fetch. Never reused within a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FetchKind {
    Boundaries,
    Buildings { region: Arc<str> },
    Hazard { layer: Hazard },
}

/// A geometry file the host should fetch and hand back with the same ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    pub ticket: Ticket,
    #[serde(flatten)]
    pub kind: FetchKind,
    pub file: FileRef,
    /// `file` resolved against the data root.
    pub url: String,
}

/// Outstanding requests by ticket.
#[derive(Debug, Default)]
pub(super) struct Pending {
    next: u64,
    requests: AHashMap<Ticket, FetchRequest>,
}

impl Pending {
    pub(super) fn issue(&mut self, kind: FetchKind, file: FileRef, root: &str) -> FetchRequest {
        self.next += 1;
        let request = FetchRequest { ticket: Ticket(self.next), kind, url: file.resolve(root), file };
        self.requests.insert(request.ticket, request.clone());
        request
    }

    pub(super) fn take(&mut self, ticket: Ticket) -> Option<FetchRequest> { self.requests.remove(&ticket) }

    pub(super) fn is_pending(&self, kind: &FetchKind, file: &FileRef) -> bool {
        self.requests.values().any(|r| &r.kind == kind && &r.file == file)
    }

    pub(super) fn any_boundaries(&self) -> bool {
        self.requests.values().any(|r| r.kind == FetchKind::Boundaries)
    }

    pub(super) fn len(&self) -> usize { self.requests.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_unique_and_resolved() {
        let mut pending = Pending::default();
        let a = pending.issue(FetchKind::Boundaries, FileRef::new("b.geojson"), "/data");
        let b = pending.issue(FetchKind::Buildings { region: "Asni".into() }, FileRef::new("x/Asni.geojson"), "/data/");
        assert_ne!(a.ticket, b.ticket);
        assert_eq!(b.url, "/data/x/Asni.geojson");
        assert!(pending.is_pending(&FetchKind::Boundaries, &FileRef::new("b.geojson")));
        assert!(pending.take(a.ticket).is_some());
        assert!(pending.take(a.ticket).is_none());
        assert!(!pending.any_boundaries());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn request_serializes_flat() {
        let mut pending = Pending::default();
        let req = pending.issue(FetchKind::Buildings { region: "Asni".into() }, FileRef::new("a.geojson"), "");
        assert_eq!(serde_json::to_value(&req).unwrap(), serde_json::json!({
            "ticket": 1, "kind": "buildings", "region": "Asni", "file": "a.geojson", "url": "a.geojson",
        }));
        let req = pending.issue(FetchKind::Hazard { layer: Hazard::Acceleration }, Hazard::Acceleration.file(), "/data");
        assert_eq!(serde_json::to_value(&req).unwrap(), serde_json::json!({
            "ticket": 2, "kind": "hazard", "layer": "acceleration", "file": "pga.geojson", "url": "/data/pga.geojson",
        }));
    }
}
