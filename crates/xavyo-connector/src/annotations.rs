//! Typed annotations attached to resources, entitlements and grants.

use serde::{Deserialize, Serialize};
use std::mem;

/// A single annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// Identifier used by the previous generation of the host data model.
    V1Identifier { id: String },
    /// The grant's principal is a group whose own entitlements should be
    /// resolved transitively by the host.
    GrantExpandable {
        entitlement_ids: Vec<String>,
        #[serde(default)]
        shallow: bool,
    },
    /// Resources of the annotated type own no entitlements or grants.
    SkipEntitlementsAndGrants,
}

impl Annotation {
    /// Create a `V1Identifier` annotation.
    pub fn v1_identifier(id: impl Into<String>) -> Self {
        Annotation::V1Identifier { id: id.into() }
    }

    /// Create a `GrantExpandable` annotation over the given entitlement ids.
    pub fn grant_expandable<I, S>(entitlement_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Annotation::GrantExpandable {
            entitlement_ids: entitlement_ids.into_iter().map(Into::into).collect(),
            shallow: false,
        }
    }
}

/// Ordered annotation list holding at most one annotation per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    /// Create an empty annotation list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an annotation, replacing any existing annotation of the same kind.
    pub fn update(&mut self, annotation: Annotation) {
        let kind = mem::discriminant(&annotation);
        if let Some(existing) = self.0.iter_mut().find(|a| mem::discriminant(*a) == kind) {
            *existing = annotation;
        } else {
            self.0.push(annotation);
        }
    }

    /// Builder-style variant of [`Annotations::update`].
    #[must_use]
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.update(annotation);
        self
    }

    /// Get the `V1Identifier` id, if present.
    pub fn v1_identifier(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Annotation::V1Identifier { id } => Some(id.as_str()),
            _ => None,
        })
    }

    /// Get the entitlement ids of the `GrantExpandable` annotation, if present.
    pub fn expandable_entitlements(&self) -> Option<&[String]> {
        self.0.iter().find_map(|a| match a {
            Annotation::GrantExpandable {
                entitlement_ids, ..
            } => Some(entitlement_ids.as_slice()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
