//! Discovery event construction.
//!
//! Events are built with a single constructor taking every field at once.
//! Each call stamps the current UTC time, so two events built from the same
//! entity differ in `time`; only `data` is covered by the fingerprint.

use crate::entity::Entity;
use crate::error::DiscoveryError;
use crate::identity::Scope;
use chrono::{SecondsFormat, Utc};
use inventory_client::{
    ChangeType, DiscoveryEvent, EventAction, EventBody, EventProperties, StateBody,
    SOURCE_TYPE_KUBERNETES,
};

/// Every field of one event.
#[derive(Debug, Clone)]
pub struct EventSpec<'a> {
    pub change_type: ChangeType,
    /// Required for `change` events, ignored for `state` events
    pub action: Option<EventAction>,
    pub id: &'a str,
    pub class: &'a str,
    pub scope: &'a Scope,
    pub name: &'a str,
    /// `cluster/<name>`, reported on `change` events only
    pub source_instance: Option<String>,
    pub data: serde_json::Value,
}

/// Current UTC time in RFC 3339 with second precision, e.g. `2024-05-01T10:00:00Z`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Source instance string for a cluster
pub fn source_instance(cluster: &str) -> String {
    format!("cluster/{}", cluster)
}

/// Builds one event from its spec.
///
/// `change` events carry the action and full bookkeeping (source type,
/// source instance, time). `state` events are the legacy snapshot form:
/// header, state name and data only.
pub fn build_event(spec: EventSpec<'_>) -> DiscoveryEvent {
    let (action, source_type, source_instance, time) = match spec.change_type {
        ChangeType::Change => (
            spec.action,
            Some(SOURCE_TYPE_KUBERNETES.to_string()),
            spec.source_instance,
            Some(now_rfc3339()),
        ),
        ChangeType::State => (None, None, None, None),
    };

    DiscoveryEvent {
        properties: EventProperties {
            class: spec.class.to_string(),
            change_type: spec.change_type,
            scope: spec.scope.to_string(),
            id: spec.id.to_string(),
            action,
        },
        body: EventBody {
            state: StateBody {
                name: spec.name.to_string(),
                source_type,
                source_instance,
                time,
                data: spec.data,
            },
        },
    }
}

/// Created or updated event for a current entity.
pub fn change_event<E: Entity>(
    action: EventAction,
    id: &str,
    entity: &E,
    scope: &Scope,
) -> Result<DiscoveryEvent, DiscoveryError> {
    Ok(build_event(EventSpec {
        change_type: ChangeType::Change,
        action: Some(action),
        id,
        class: E::CLASS,
        scope,
        name: entity.display_name(),
        source_instance: Some(source_instance(entity.cluster())),
        data: serde_json::to_value(entity)?,
    }))
}

/// Legacy snapshot event for a current entity.
pub fn state_event<E: Entity>(id: &str, entity: &E, scope: &Scope) -> Result<DiscoveryEvent, DiscoveryError> {
    Ok(build_event(EventSpec {
        change_type: ChangeType::State,
        action: None,
        id,
        class: E::CLASS,
        scope,
        name: entity.display_name(),
        source_instance: None,
        data: serde_json::to_value(entity)?,
    }))
}

/// Deleted event synthesized from a previously reported event.
///
/// Keeps the previous identity, class, name, source instance and payload so
/// the receiver learns what is being removed.
pub fn deleted_event(previous: DiscoveryEvent, scope: &Scope) -> DiscoveryEvent {
    let DiscoveryEvent { properties, body } = previous;
    build_event(EventSpec {
        change_type: ChangeType::Change,
        action: Some(EventAction::Deleted),
        id: &properties.id,
        class: &properties.class,
        scope,
        name: &body.state.name,
        source_instance: body.state.source_instance,
        data: body.state.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use chrono::DateTime;

    #[test]
    fn test_change_event_populates_envelope() {
        let scope = test_scope();
        let entity = workload("api", "default", "nginx:1.25");
        let event = change_event(EventAction::Created, "abc", &entity, &scope).unwrap();

        assert_eq!(event.properties.class, "workload");
        assert_eq!(event.properties.change_type, ChangeType::Change);
        assert_eq!(event.properties.scope, "workspace/test-workspace/configuration/test-configuration");
        assert_eq!(event.properties.id, "abc");
        assert_eq!(event.properties.action, Some(EventAction::Created));
        assert_eq!(event.body.state.name, "api");
        assert_eq!(event.body.state.source_type.as_deref(), Some("kubernetes"));
        assert_eq!(event.body.state.source_instance.as_deref(), Some("cluster/test-cluster"));
        assert_eq!(event.body.state.data, serde_json::to_value(&entity).unwrap());
    }

    #[test]
    fn test_change_event_time_is_rfc3339_utc() {
        let event = change_event(
            EventAction::Updated,
            "abc",
            &workload("api", "default", "nginx:1.25"),
            &test_scope(),
        )
        .unwrap();
        let time = event.body.state.time.unwrap();
        assert!(time.ends_with('Z'), "expected UTC suffix in {}", time);
        assert!(DateTime::parse_from_rfc3339(&time).is_ok());
    }

    #[test]
    fn test_state_event_has_no_action_or_bookkeeping() {
        let event = state_event("abc", &namespace("default"), &test_scope()).unwrap();
        assert_eq!(event.properties.change_type, ChangeType::State);
        assert_eq!(event.properties.action, None);
        assert_eq!(event.properties.class, "namespace");
        assert_eq!(event.body.state.name, "default");
        assert_eq!(event.body.state.source_type, None);
        assert_eq!(event.body.state.source_instance, None);
        assert_eq!(event.body.state.time, None);
        assert_eq!(event.body.state.data["name"], "default");
    }

    #[test]
    fn test_state_event_ignores_action() {
        let event = build_event(EventSpec {
            change_type: ChangeType::State,
            action: Some(EventAction::Created),
            id: "abc",
            class: "namespace",
            scope: &test_scope(),
            name: "default",
            source_instance: Some(source_instance("c")),
            data: serde_json::json!({}),
        });
        assert_eq!(event.properties.action, None);
        assert_eq!(event.body.state.source_instance, None);
    }

    #[test]
    fn test_deleted_event_keeps_previous_payload() {
        let scope = test_scope();
        let entity = workload("api", "default", "nginx:1.25");
        let previous = previous_event("abc", &entity, &scope);
        let deleted = deleted_event(previous.clone(), &scope);

        assert_eq!(deleted.properties.id, "abc");
        assert_eq!(deleted.properties.action, Some(EventAction::Deleted));
        assert_eq!(deleted.properties.change_type, ChangeType::Change);
        assert_eq!(deleted.body.state.name, "api");
        assert_eq!(deleted.body.state.source_instance, previous.body.state.source_instance);
        assert_eq!(deleted.body.state.data, previous.body.state.data);
        assert!(!deleted.body.state.data.is_null());
    }
}
