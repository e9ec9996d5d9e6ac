//! Nested-map form of actor trees
//!
//! An actor is `{"class": <type identifier>, "options": {...}}` with options at their default left out; the children
//! of a composite go under `options.actors`. Bound options are written as their `@{name}` reference.

use std::{path::Path, rc::Rc};

use serde_json::{Map, Value as JsonValue};

use crate::{
    actor::node::{ActorNode, ActorRef},
    adapter::{codec::CodecRegistry, registry::ActorRegistry},
    domain::{
        constant::{ACTORS_KEY, OPTIONS_KEY, TYPE_KEY},
        engine::{Environment, add_flow_variables},
        error::FlowError
    }
};

/// Encodes an actor and its children
pub fn actor_to_map(actor: &ActorNode, codecs: &CodecRegistry) -> Result<JsonValue, FlowError> {
    let mut options = actor.options().to_map(codecs, true)?;
    if actor.is_handler() {
        let children = actor
            .children()
            .iter()
            .map(|child| actor_to_map(child, codecs))
            .collect::<Result<Vec<_>, _>>()?;
        options.insert(ACTORS_KEY.to_string(), JsonValue::Array(children));
    }

    let mut map = Map::new();
    map.insert(TYPE_KEY.to_string(), JsonValue::String(actor.type_identifier().to_string()));
    if !options.is_empty() {
        map.insert(OPTIONS_KEY.to_string(), JsonValue::Object(options));
    }
    Ok(JsonValue::Object(map))
}

/// Builds an actor tree from its nested-map form
///
/// Every node of the tree runs against `codecs`, so object types registered there stay available when bound
/// variables are converted at runtime. Unknown option keys are logged and skipped, unknown actor types are an error.
pub fn map_to_actor(
    json: &JsonValue,
    registry: &ActorRegistry,
    codecs: &Rc<CodecRegistry>
) -> Result<ActorRef, FlowError> {
    let environment = Environment::new(codecs.clone(), codecs.log_sink());
    decode_actor(json, registry, &environment)
}

fn decode_actor(json: &JsonValue, registry: &ActorRegistry, environment: &Environment) -> Result<ActorRef, FlowError> {
    let map = json
        .as_object()
        .ok_or_else(|| FlowError::Serialization(format!("Expected an actor object, received: {}", json)))?;
    let type_identifier = map
        .get(TYPE_KEY)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| FlowError::Serialization(format!("Missing '{}' in actor definition", TYPE_KEY)))?;

    let actor = registry.create_in(type_identifier, environment.clone())?;

    let Some(options) = map.get(OPTIONS_KEY) else {
        return Ok(actor);
    };
    let mut options = options
        .as_object()
        .cloned()
        .ok_or_else(|| FlowError::Serialization(format!("Options of {} must be an object", type_identifier)))?;

    let children = options.remove(ACTORS_KEY);
    actor.configure_from_map(&options, &environment.codecs)?;

    if let Some(children) = children {
        let JsonValue::Array(items) = children else {
            return Err(FlowError::Serialization(format!("'{}' of {} must be a list", ACTORS_KEY, type_identifier)));
        };
        let actors =
            items.iter().map(|item| decode_actor(item, registry, environment)).collect::<Result<Vec<_>, _>>()?;
        actor.set_actors(actors)?;
    }

    Ok(actor)
}

/// Records where the flow was loaded from in the root's variables
pub fn set_flow_location(root: &ActorNode, path: &Path) -> Result<(), FlowError> {
    add_flow_variables(&root.variables(), path)
}
