//! Lookups along the actor tree: enclosing composites and callable actors

use std::{ptr, rc::Rc};

use crate::actor::node::{ActorNode, ActorRef};

fn qualifies(actor: &ActorNode, must_allow_standalones: bool) -> bool {
    actor.handler_info().is_some_and(|info| !must_allow_standalones || info.can_contain_standalones)
}

/// Composites enclosing `actor`, innermost first
///
/// With `include_same_level`, composites that precede the branch at each level are listed before the enclosing
/// composite of that level, nearest first.
pub fn find_actor_handlers(actor: &ActorNode, must_allow_standalones: bool, include_same_level: bool) -> Vec<ActorRef> {
    let mut result = Vec::new();
    let mut branch: *const ActorNode = actor;
    let mut current = actor.parent();

    while let Some(handler) = current {
        if include_same_level {
            let children = handler.children();
            if let Some(position) = children.iter().position(|child| ptr::eq(Rc::as_ptr(child), branch)) {
                for sibling in children[..position].iter().rev() {
                    if qualifies(sibling, must_allow_standalones) {
                        result.push(Rc::clone(sibling));
                    }
                }
            }
        }

        if qualifies(&handler, must_allow_standalones) {
            result.push(Rc::clone(&handler));
        }

        branch = Rc::as_ptr(&handler);
        current = handler.parent();
    }

    result
}

/// Callable actor named `name`, in `handler` if it is a reference pool, otherwise in the pools directly below it
pub fn find_callable_actor(handler: &ActorNode, name: &str) -> Option<ActorRef> {
    if handler.is_reference_pool() {
        return handler.index(name).and_then(|index| handler.child(index));
    }

    handler
        .children()
        .iter()
        .filter(|child| child.is_reference_pool())
        .find_map(|pool| find_callable_actor(pool, name))
}

/// Callable actor named `name`, searching the enclosing composites from the innermost outwards
pub fn find_callable_actor_recursive(actor: &ActorNode, name: &str) -> Option<ActorRef> {
    find_actor_handlers(actor, true, false).iter().find_map(|handler| find_callable_actor(handler, name))
}

/// Nearest ancestor satisfying the predicate
pub fn find_closest(actor: &ActorNode, predicate: impl Fn(&ActorNode) -> bool) -> Option<ActorRef> {
    let mut current = actor.parent();
    while let Some(candidate) = current {
        if predicate(&candidate) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Names of the callable actors in every reference pool below `root`
pub fn callable_names(root: &ActorNode) -> Vec<String> {
    let mut names = Vec::new();
    collect_callable_names(root, &mut names);
    names
}

fn collect_callable_names(actor: &ActorNode, names: &mut Vec<String>) {
    for child in actor.children() {
        if actor.is_reference_pool() {
            names.push(child.name());
        }
        collect_callable_names(&child, names);
    }
}

/// Whether any reference pool below `root` already holds a callable actor named `name`
pub fn is_callable_name_used(root: &ActorNode, name: &str) -> bool {
    callable_names(root).iter().any(|used| used == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{
        control::{CallableActors, Flow, Trigger},
        testing::{Tick, create_actor, create_flow}
    };

    fn create_pool(actors: Vec<ActorRef>) -> ActorRef {
        let pool = create_actor(CallableActors);
        pool.set_actors(actors).unwrap();
        pool
    }

    fn named(actor: ActorRef, name: &str) -> ActorRef {
        actor.set_name(name).unwrap();
        actor
    }

    #[test]
    fn test_handlers_innermost_first() {
        let leaf = create_actor(Tick::default());
        let trigger = named(create_actor(Trigger), "trigger");
        trigger.set_actors(vec![leaf.clone()]).unwrap();
        let flow = create_flow(vec![trigger.clone()]);

        let handlers = find_actor_handlers(&leaf, true, false);
        assert_eq!(handlers.len(), 2);
        assert!(Rc::ptr_eq(&handlers[0], &trigger));
        assert!(Rc::ptr_eq(&handlers[1], &flow));
    }

    #[test]
    fn test_same_level_handlers_precede_parent() {
        let leaf = create_actor(Tick::default());
        let pool = create_pool(vec![]);
        let trigger = create_actor(Trigger);
        trigger.set_actors(vec![leaf.clone()]).unwrap();
        let flow = create_flow(vec![pool.clone(), trigger.clone()]);

        let handlers = find_actor_handlers(&leaf, false, true);
        let names: Vec<String> = handlers.iter().map(|h| h.full_name()).collect();
        assert_eq!(names, vec!["Flow.Trigger", "Flow.CallableActors", "Flow"]);
        assert!(Rc::ptr_eq(&handlers[2], &flow));
    }

    #[test]
    fn test_inner_pool_shadows_outer_pool() {
        let outer_target = named(create_actor(Tick::default()), "target");
        let inner_target = named(create_actor(Tick::default()), "target");
        let leaf = create_actor(Tick::default());

        let inner = named(create_actor(Trigger), "inner");
        inner.set_actors(vec![create_pool(vec![inner_target.clone()]), leaf.clone()]).unwrap();
        let _flow = create_flow(vec![create_pool(vec![outer_target.clone()]), inner]);

        let found = find_callable_actor_recursive(&leaf, "target").unwrap();
        assert!(Rc::ptr_eq(&found, &inner_target));
        assert!(find_callable_actor_recursive(&leaf, "missing").is_none());
    }

    #[test]
    fn test_outer_pool_visible_from_nested_actor() {
        let target = named(create_actor(Tick::default()), "target");
        let leaf = create_actor(Tick::default());
        let trigger = create_actor(Trigger);
        trigger.set_actors(vec![leaf.clone()]).unwrap();
        let _flow = create_flow(vec![create_pool(vec![target.clone()]), trigger]);

        let found = find_callable_actor_recursive(&leaf, "target").unwrap();
        assert!(Rc::ptr_eq(&found, &target));
    }

    #[test]
    fn test_find_closest() {
        let leaf = create_actor(Tick::default());
        let trigger = create_actor(Trigger);
        trigger.set_actors(vec![leaf.clone()]).unwrap();
        let flow = create_flow(vec![trigger]);

        let found = find_closest(&leaf, |actor| actor.type_identifier() == "Flow").unwrap();
        assert!(Rc::ptr_eq(&found, &flow));
        assert!(find_closest(&flow, |_| true).is_none());
    }

    #[test]
    fn test_callable_name_used() {
        let flow = create_flow(vec![create_pool(vec![named(create_actor(Flow), "sub")])]);
        assert!(is_callable_name_used(&flow, "sub"));
        assert!(!is_callable_name_used(&flow, "other"));
        assert_eq!(callable_names(&flow), vec!["sub".to_string()]);
    }
}
