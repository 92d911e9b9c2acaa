//! Resources: the nodes of the governance graph.
//!
//! A [`Resource`] is built once during a `list` call and never mutated
//! afterwards. Its profile is a small typed key-value bag whose keys are
//! checked against a per-mapper schema at construction time.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::annotations::{Annotation, Annotations};
use crate::error::{ConnectorError, ConnectorResult};
use crate::types::{ResourceTrait, ResourceType};

/// Identity of a resource: `(resource_type, resource)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub resource: String,
}

impl ResourceId {
    /// Create a resource id, rejecting empty object ids.
    pub fn new(resource_type: &ResourceType, resource: impl Into<String>) -> ConnectorResult<Self> {
        let resource = resource.into();
        if resource.is_empty() {
            return Err(ConnectorError::invalid_data(format!(
                "empty id for {} resource",
                resource_type.id
            )));
        }
        Ok(Self {
            resource_type: resource_type.id.to_string(),
            resource,
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

/// Allowed keys of a profile.
pub type ProfileSchema = &'static [&'static str];

/// A profile value. The set of kinds is closed on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProfileValue {
    String(String),
    Bool(bool),
    StringList(Vec<String>),
}

/// Free-form resource profile, keyed by schema-checked strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Profile {
    values: BTreeMap<String, ProfileValue>,
}

impl Profile {
    /// Start building a profile restricted to `schema`.
    pub fn builder(schema: ProfileSchema) -> ProfileBuilder {
        ProfileBuilder {
            schema,
            values: BTreeMap::new(),
            error: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ProfileValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ProfileValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Get a string-list value. Returns `None` when the key is absent or
    /// holds another kind.
    pub fn get_string_list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key) {
            Some(ProfileValue::StringList(list)) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builder for [`Profile`]. Empty strings and empty lists are omitted.
#[derive(Debug)]
pub struct ProfileBuilder {
    schema: ProfileSchema,
    values: BTreeMap<String, ProfileValue>,
    error: Option<ConnectorError>,
}

impl ProfileBuilder {
    fn insert(mut self, key: &str, value: ProfileValue) -> Self {
        if self.error.is_some() {
            return self;
        }
        if !self.schema.contains(&key) {
            self.error = Some(ConnectorError::invalid_data(format!(
                "profile key '{key}' is not part of the schema {:?}",
                self.schema
            )));
            return self;
        }
        self.values.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn string(self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return self;
        }
        self.insert(key, ProfileValue::String(value))
    }

    #[must_use]
    pub fn optional_string(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.string(key, v),
            None => self,
        }
    }

    #[must_use]
    pub fn bool(self, key: &str, value: bool) -> Self {
        self.insert(key, ProfileValue::Bool(value))
    }

    #[must_use]
    pub fn string_list(self, key: &str, values: Vec<String>) -> Self {
        if values.is_empty() {
            return self;
        }
        self.insert(key, ProfileValue::StringList(values))
    }

    /// Finish the profile, failing on the first key outside the schema.
    pub fn build(self) -> ConnectorResult<Profile> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Profile {
                values: self.values,
            }),
        }
    }
}

/// Account status of a user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
    Deleted,
}

/// Contact email of a user resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEmail {
    pub address: String,
    pub is_primary: bool,
}

/// User-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTrait {
    pub emails: Vec<UserEmail>,
    pub status: UserStatus,
}

impl UserTrait {
    /// Add a contact email. Empty addresses are ignored.
    #[must_use]
    pub fn with_email(mut self, address: impl Into<String>, is_primary: bool) -> Self {
        let address = address.into();
        if !address.is_empty() {
            self.emails.push(UserEmail {
                address,
                is_primary,
            });
        }
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.is_primary)
            .map(|e| e.address.as_str())
    }
}

/// Trait-specific data of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "trait", rename_all = "lowercase")]
pub enum TraitData {
    User(UserTrait),
    Group,
    Role,
}

/// A node of the governance graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    id: ResourceId,
    display_name: String,
    profile: Profile,
    traits: TraitData,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<ResourceId>,
    #[serde(skip_serializing_if = "Annotations::is_empty")]
    annotations: Annotations,
}

impl Resource {
    /// Start building a resource of the given type.
    pub fn builder(
        resource_type: &'static ResourceType,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> ResourceBuilder {
        ResourceBuilder {
            resource_type,
            id: id.into(),
            display_name: display_name.into(),
            profile: Profile::default(),
            user_trait: None,
            parent: None,
            annotations: Annotations::new(),
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn traits(&self) -> &TraitData {
        &self.traits
    }

    /// User fields, if this is a user resource.
    pub fn user_trait(&self) -> Option<&UserTrait> {
        match &self.traits {
            TraitData::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<&ResourceId> {
        self.parent.as_ref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

/// Builder for [`Resource`].
#[derive(Debug)]
pub struct ResourceBuilder {
    resource_type: &'static ResourceType,
    id: String,
    display_name: String,
    profile: Profile,
    user_trait: Option<UserTrait>,
    parent: Option<ResourceId>,
    annotations: Annotations,
}

impl ResourceBuilder {
    #[must_use]
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn user_trait(mut self, user: UserTrait) -> Self {
        self.user_trait = Some(user);
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: ResourceId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.update(annotation);
        self
    }

    /// Build the resource.
    ///
    /// Fails when the id is empty or when user fields are attached to a
    /// resource type without the user trait.
    pub fn build(self) -> ConnectorResult<Resource> {
        let id = ResourceId::new(self.resource_type, self.id)?;

        let traits = if self.resource_type.has_trait(ResourceTrait::User) {
            TraitData::User(self.user_trait.unwrap_or_default())
        } else if self.user_trait.is_some() {
            return Err(ConnectorError::invalid_data(format!(
                "user fields set on non-user resource type '{}'",
                self.resource_type.id
            )));
        } else if self.resource_type.has_trait(ResourceTrait::Role) {
            TraitData::Role
        } else {
            TraitData::Group
        };

        Ok(Resource {
            id,
            display_name: self.display_name,
            profile: self.profile,
            traits,
            parent: self.parent,
            annotations: self.annotations,
        })
    }
}
