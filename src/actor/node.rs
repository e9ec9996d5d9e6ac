//! Runtime node of the actor tree
//!
//! A node owns the behaviour of one actor plus everything the runtime manages around it: options, the parent and
//! child links, the director of a composite, the shared environment and the lifecycle state. Parents own their
//! children; the link back to the parent is weak.

use std::{
    any::Any,
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::{Rc, Weak}
};

use serde_json::{Map, Value as JsonValue};
use tracing::{Level, event};

use crate::{
    actor::context::ActorContext,
    adapter::{
        codec::CodecRegistry,
        store::{Storage, Variables}
    },
    domain::{
        constant::{ACTOR_FAMILY, actor, options},
        engine::Environment,
        error::FlowError,
        option::{OptionDef, OptionManager},
        value::{OptionValue, ValueType}
    },
    port::{
        actor::{Actor, ActorHandlerInfo, ActorRole, Data, DataType},
        director::Director,
        log::LogSink,
        store::{StoreEvent, StoreListener}
    }
};

/// Shared handle to a node
pub type ActorRef = Rc<ActorNode>;

/// Lifecycle of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not set up yet
    Fresh,
    /// Set up and ready to execute
    Ready,
    Executing,
    /// Executed at least once, ready for the next cycle
    Idle,
    Stopped,
    WrappedUp,
    CleanedUp
}

/// Listens to the variable store for the variables an actor depends on
pub(crate) struct VariableWatch {
    names:   RefCell<Vec<String>>,
    changed: Cell<bool>,
    debug:   Cell<bool>,
    owner:   RefCell<String>,
    log:     RefCell<Rc<dyn LogSink>>
}

impl VariableWatch {
    fn new(log: Rc<dyn LogSink>) -> Self {
        Self {
            names:   RefCell::new(Vec::new()),
            changed: Cell::new(false),
            debug:   Cell::new(false),
            owner:   RefCell::new(String::new()),
            log:     RefCell::new(log)
        }
    }

    fn configure(&self, names: Vec<String>, debug: bool, owner: String) {
        *self.names.borrow_mut() = names;
        self.debug.set(debug);
        *self.owner.borrow_mut() = owner;
    }

    fn extend(&self, names: &[String]) {
        let mut watched = self.names.borrow_mut();
        for name in names {
            if !watched.contains(name) {
                watched.push(name.clone());
            }
        }
    }

    fn reset(&self) {
        self.names.borrow_mut().clear();
        self.changed.set(false);
    }

    fn names(&self) -> Vec<String> {
        self.names.borrow().clone()
    }
}

impl StoreListener for VariableWatch {
    fn store_changed(&self, event: &StoreEvent) {
        let relevant = match &event.key {
            Some(key) => self.names.borrow().iter().any(|name| name == key),
            None => !self.names.borrow().is_empty()
        };
        if !relevant {
            return;
        }

        self.changed.set(true);
        let key = event.key.clone().unwrap_or_default();
        event!(Level::DEBUG, event = actor::VARIABLE_CHANGED, actor = %self.owner.borrow(), variable = %key);
        if self.debug.get() {
            let message = format!("Variable changed: {} ({})", key, event.event_type);
            self.log.borrow().log(&self.owner.borrow(), &message);
        }
    }
}

/// One actor in the tree
pub struct ActorNode {
    this:            Weak<ActorNode>,
    behavior:        RefCell<Box<dyn Actor>>,
    options:         RefCell<OptionManager>,
    parent:          RefCell<Weak<ActorNode>>,
    children:        RefCell<Vec<ActorRef>>,
    director:        RefCell<Option<Rc<dyn Director>>>,
    environment:     RefCell<Environment>,
    watch:           Rc<VariableWatch>,
    subscribed:      Cell<bool>,
    stopped:         Cell<bool>,
    state:           Cell<LifecycleState>,
    full_name:       RefCell<Option<String>>,
    type_identifier: &'static str,
    description:     &'static str,
    role:            ActorRole,
    handler_info:    Option<ActorHandlerInfo>,
    reference_pool:  bool
}

fn define_common_options(manager: &mut OptionManager) -> Result<(), FlowError> {
    manager
        .add(OptionDef::new(options::DEBUG, ValueType::Bool, false, "If enabled, outputs some debugging information")?)?
        .add(OptionDef::new(options::SKIP, ValueType::Bool, false, "Whether to skip the actor during execution")?)?
        .add(OptionDef::new(options::ANNOTATION, ValueType::Text, "", "For adding documentation to the actor")?)?
        .add(OptionDef::new(options::NAME, ValueType::Text, "", "The name of the actor, the type name when empty")?)?
        .add(OptionDef::new(
            options::STOP_FLOW_ON_ERROR,
            ValueType::Bool,
            true,
            "Whether to stop the flow when the actor fails"
        )?)?;
    Ok(())
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl ActorNode {
    /// Wraps a behaviour into a fresh node with a private default environment
    pub fn new(behavior: Box<dyn Actor>) -> Result<ActorRef, FlowError> {
        Self::with_environment(behavior, Environment::default())
    }

    pub fn with_environment(behavior: Box<dyn Actor>, environment: Environment) -> Result<ActorRef, FlowError> {
        let mut manager = OptionManager::new();
        define_common_options(&mut manager)?;
        behavior.define_options(&mut manager)?;
        manager.attach(environment.option_scope());

        let role = ActorRole::from_capabilities(behavior.as_producer().is_some(), behavior.as_consumer().is_some());
        let handler_info = behavior.as_handler().map(|handler| handler.handler_info());
        let reference_pool = behavior.as_handler().is_some_and(|handler| handler.is_reference_pool());
        let type_identifier = behavior.type_identifier();
        let description = behavior.description();
        let watch = Rc::new(VariableWatch::new(environment.log.clone()));

        Ok(Rc::new_cyclic(|this| ActorNode {
            this: this.clone(),
            behavior: RefCell::new(behavior),
            options: RefCell::new(manager),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            director: RefCell::new(None),
            environment: RefCell::new(environment),
            watch,
            subscribed: Cell::new(false),
            stopped: Cell::new(false),
            state: Cell::new(LifecycleState::Fresh),
            full_name: RefCell::new(None),
            type_identifier,
            description,
            role,
            handler_info,
            reference_pool
        }))
    }

    pub fn type_identifier(&self) -> &'static str {
        self.type_identifier
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    /// Whether the actor is a composite
    pub fn is_handler(&self) -> bool {
        self.handler_info.is_some()
    }

    pub fn handler_info(&self) -> Option<ActorHandlerInfo> {
        self.handler_info
    }

    /// Whether the actor holds callable actors looked up by name
    pub fn is_reference_pool(&self) -> bool {
        self.reference_pool
    }

    pub fn state(&self) -> LifecycleState {
        match self.state.get() {
            LifecycleState::Ready | LifecycleState::Executing | LifecycleState::Idle if self.stopped.get() => {
                LifecycleState::Stopped
            }
            state => state
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    // ---------------------------------------------------------------------------------------------------------------
    // options

    pub fn options(&self) -> Ref<'_, OptionManager> {
        self.options.borrow()
    }

    pub fn options_mut(&self) -> RefMut<'_, OptionManager> {
        self.options.borrow_mut()
    }

    pub fn get_option(&self, name: &str) -> Result<OptionValue, FlowError> {
        self.options.borrow().get(name)
    }

    /// Sets a literal value, or binds a variable when given `@{name}`
    pub fn set_option(&self, name: &str, value: impl Into<OptionValue>) -> Result<(), FlowError> {
        self.options.borrow_mut().set(name, value)?;
        if name == options::NAME {
            self.clear_name_cache();
        }
        Ok(())
    }

    /// Applies a plain option map, then resets the actor
    pub fn configure_from_map(&self, map: &Map<String, JsonValue>, codecs: &CodecRegistry) -> Result<(), FlowError> {
        self.options.borrow_mut().from_map(self.type_identifier, map, codecs)?;
        self.reset();
        Ok(())
    }

    /// Variables bound anywhere in the options, actor-valued options excluded
    pub fn detect_variables(&self) -> Vec<String> {
        self.options.borrow().detect_vars(&[ACTOR_FAMILY])
    }

    /// Variables currently watched for changes
    pub fn watched_variables(&self) -> Vec<String> {
        self.watch.names()
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        self.get_option(name).ok().and_then(|value| value.as_bool()).unwrap_or(default)
    }

    pub fn is_debug(&self) -> bool {
        self.flag(options::DEBUG, false)
    }

    pub fn is_skipped(&self) -> bool {
        self.flag(options::SKIP, false)
    }

    pub fn stops_flow_on_error(&self) -> bool {
        self.flag(options::STOP_FLOW_ON_ERROR, true)
    }

    pub fn annotation(&self) -> String {
        self.get_option(options::ANNOTATION).ok().and_then(|v| v.as_text().map(str::to_string)).unwrap_or_default()
    }

    // ---------------------------------------------------------------------------------------------------------------
    // naming and structure

    /// The `name` option, or the type identifier when that is empty
    pub fn name(&self) -> String {
        match self.get_option(options::NAME) {
            Ok(OptionValue::Text(name)) if !name.is_empty() => name,
            _ => self.type_identifier.to_string()
        }
    }

    pub fn set_name(&self, name: &str) -> Result<(), FlowError> {
        self.set_option(options::NAME, name)
    }

    /// Dot-joined names from the root down to this actor
    pub fn full_name(&self) -> String {
        if let Some(full_name) = self.full_name.borrow().as_ref() {
            return full_name.clone();
        }

        let full_name = match self.parent() {
            Some(parent) => format!("{}.{}", parent.full_name(), self.name()),
            None => self.name()
        };
        *self.full_name.borrow_mut() = Some(full_name.clone());
        full_name
    }

    fn clear_name_cache(&self) {
        *self.full_name.borrow_mut() = None;
        for child in self.children() {
            child.clear_name_cache();
        }
    }

    pub fn parent(&self) -> Option<ActorRef> {
        self.parent.borrow().upgrade()
    }

    /// Topmost ancestor, the actor itself when it has no parent
    pub fn root(self: &Rc<Self>) -> ActorRef {
        let mut current = Rc::clone(self);
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub(crate) fn handle(&self) -> Option<ActorRef> {
        self.this.upgrade()
    }

    pub fn children(&self) -> Vec<ActorRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn child(&self, index: usize) -> Option<ActorRef> {
        self.children.borrow().get(index).cloned()
    }

    /// Position of the child with the given name
    pub fn index(&self, name: &str) -> Option<usize> {
        self.children.borrow().iter().position(|child| child.name() == name)
    }

    pub fn first_active(&self) -> Option<ActorRef> {
        self.children.borrow().iter().find(|child| !child.is_skipped()).cloned()
    }

    pub fn last_active(&self) -> Option<ActorRef> {
        self.children.borrow().iter().rev().find(|child| !child.is_skipped()).cloned()
    }

    /// Assigns the children of a composite
    ///
    /// Children are re-parented and reset first, then duplicate names get a ` (n)` suffix, then the composite checks
    /// the new shape; only a list that passes the check is stored.
    pub fn set_actors(&self, actors: Vec<ActorRef>) -> Result<(), FlowError> {
        if self.handler_info.is_none() {
            return Err(FlowError::Structural(format!("{} cannot contain actors", self.full_name())));
        }

        for child in &actors {
            child.attach_to(self);
            child.reset();
        }

        let mut names: Vec<String> = Vec::with_capacity(actors.len());
        for child in &actors {
            let base = child.name();
            let mut name = base.clone();
            let mut suffix = 2;
            while names.contains(&name) {
                name = format!("{} ({})", base, suffix);
                suffix += 1;
            }
            if name != base {
                child.set_name(&name)?;
            }
            names.push(name);
        }

        self.check_children(&actors)?;
        *self.children.borrow_mut() = actors;
        Ok(())
    }

    /// Assigns the children and hands the composite back, for building trees inline
    pub fn manage(self: &Rc<Self>, actors: Vec<ActorRef>) -> Result<ActorRef, FlowError> {
        self.set_actors(actors)?;
        Ok(Rc::clone(self))
    }

    pub fn append(&self, actor: ActorRef) -> Result<(), FlowError> {
        let mut actors = self.children();
        actors.push(actor);
        self.set_actors(actors)
    }

    pub fn remove(&self, index: usize) -> Result<ActorRef, FlowError> {
        let mut actors = self.children();
        if index >= actors.len() {
            return Err(FlowError::Structural(format!(
                "{}: index {} out of range, {} actors",
                self.full_name(),
                index,
                actors.len()
            )));
        }
        let removed = actors.remove(index);
        self.set_actors(actors)?;
        *removed.parent.borrow_mut() = Weak::new();
        removed.clear_name_cache();
        Ok(removed)
    }

    pub fn clear_actors(&self) -> Result<(), FlowError> {
        let removed = self.children();
        self.set_actors(Vec::new())?;
        for child in removed {
            *child.parent.borrow_mut() = Weak::new();
            child.clear_name_cache();
        }
        Ok(())
    }

    fn check_children(&self, actors: &[ActorRef]) -> Result<(), FlowError> {
        let behavior = self.behavior.try_borrow().map_err(|_| self.busy())?;
        match behavior.as_handler() {
            Some(handler) => handler.check_actors(actors),
            None => Ok(())
        }
    }

    /// Links the actor below `parent` and adopts the parent's environment
    fn attach_to(&self, parent: &ActorNode) {
        *self.parent.borrow_mut() = parent.this.clone();
        self.clear_name_cache();
        self.inherit_environment(&parent.environment());
    }

    fn inherit_environment(&self, environment: &Environment) {
        let local_scope = self.handler_info.is_some_and(|info| info.local_scope);
        let environment = if local_scope {
            let own = self.environment();
            Environment { codecs: environment.codecs.clone(), log: environment.log.clone(), ..own }
        } else {
            environment.clone()
        };
        self.set_environment(environment);
    }

    /// Replaces the environment of this actor and, unless they keep a local scope, of all descendants
    pub fn set_environment(&self, environment: Environment) {
        let previous = self.environment.replace(environment.clone());
        if self.subscribed.get() && !previous.shares_variables(&environment) {
            let listener: Rc<dyn StoreListener> = self.watch.clone();
            previous.variables.remove_listener(&listener);
            environment.variables.add_listener(listener);
        }
        self.options.borrow_mut().attach(environment.option_scope());
        *self.watch.log.borrow_mut() = environment.log.clone();

        for child in self.children() {
            child.inherit_environment(&environment);
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment.borrow().clone()
    }

    pub fn variables(&self) -> Rc<Variables> {
        self.environment.borrow().variables.clone()
    }

    pub fn storage(&self) -> Rc<Storage> {
        self.environment.borrow().storage.clone()
    }

    /// Sends a message to the log sink, prefixed with the full name
    pub fn log(&self, message: &str) {
        let log = self.environment.borrow().log.clone();
        log.log(&self.full_name(), message);
    }

    /// Logs only when the `debug` option is on
    pub fn debug(&self, message: &str) {
        if self.is_debug() {
            self.log(message);
        }
    }

    pub fn director(&self) -> Option<Rc<dyn Director>> {
        self.director.borrow().clone()
    }

    /// Runs `f` against the behaviour if it is a `T` and not busy
    pub fn with_behavior<T: Actor, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let behavior = self.behavior.try_borrow().ok()?;
        behavior.downcast_ref::<T>().map(f)
    }

    pub fn with_behavior_mut<T: Actor, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut behavior = self.behavior.try_borrow_mut().ok()?;
        behavior.downcast_mut::<T>().map(f)
    }

    fn busy(&self) -> FlowError {
        FlowError::Execution(format!("{} is busy", self.full_name()))
    }

    // ---------------------------------------------------------------------------------------------------------------
    // variable watch

    fn subscribe(&self) {
        if self.subscribed.replace(true) {
            return;
        }
        self.variables().add_listener(self.watch.clone());
    }

    fn unsubscribe(&self) {
        if !self.subscribed.replace(false) {
            return;
        }
        let listener: Rc<dyn StoreListener> = self.watch.clone();
        self.variables().remove_listener(&listener);
    }

    /// Adds names to the watched variables
    pub(crate) fn watch_variables(&self, names: &[String]) {
        self.watch.extend(names);
    }

    /// Whether a watched variable changed since the last setup
    pub fn variables_changed(&self) -> bool {
        self.watch.changed.get()
    }

    // ---------------------------------------------------------------------------------------------------------------
    // lifecycle

    /// Drops derived state
    pub fn reset(&self) {
        if let Ok(mut behavior) = self.behavior.try_borrow_mut() {
            behavior.reset();
        }
        self.clear_name_cache();
        self.watch.reset();
    }

    /// Builds derived state, then sets up the children and creates the director of a composite
    pub fn setup(&self) -> Result<(), FlowError> {
        match self.setup_actor() {
            Ok(()) => {
                event!(Level::DEBUG, event = actor::SETUP_COMPLETED, actor = %self.full_name());
                self.state.set(LifecycleState::Ready);
                Ok(())
            }
            Err(e) => {
                event!(Level::ERROR, event = actor::SETUP_FAILED, actor = %self.full_name(), error = %e);
                Err(e.in_actor(&self.full_name()))
            }
        }
    }

    fn setup_actor(&self) -> Result<(), FlowError> {
        self.stopped.set(false);
        self.clear_name_cache();

        let debug = self.is_debug();
        let detected = self.detect_variables();
        if !detected.is_empty() {
            event!(Level::DEBUG, event = actor::VARIABLES_DETECTED, actor = %self.full_name(), variables = ?detected);
            if debug {
                self.log(&format!("Detected variables: {}", detected.join(", ")));
            }
        }
        self.watch.configure(detected, debug, self.full_name());
        self.subscribe();

        {
            let ctx = ActorContext::new(self);
            let mut behavior = self.behavior.try_borrow_mut().map_err(|_| self.busy())?;
            behavior.setup(&ctx)?;
        }

        if self.handler_info.is_some() {
            let children = self.children();
            self.check_children(&children)?;
            for child in &children {
                child.attach_to(self);
                child.setup()?;
            }

            let behavior = self.behavior.try_borrow().map_err(|_| self.busy())?;
            let director = behavior.as_handler().map(|handler| handler.new_director(self.this.clone()));
            if let Some(previous) = self.director.replace(director) {
                previous.clean_up();
            }
        }

        Ok(())
    }

    /// Runs one cycle: reconfigure when needed, then the pre, main and post hooks
    ///
    /// Composites delegate the main hook to their director. A panic inside any hook is reported as an execution
    /// error naming the actor.
    pub fn execute(&self) -> Result<(), FlowError> {
        match self.state.get() {
            LifecycleState::Ready | LifecycleState::Idle => {}
            LifecycleState::Executing => {
                return Err(FlowError::Execution(format!("{} is already executing", self.full_name())));
            }
            state => {
                return Err(FlowError::Execution(format!("{} cannot execute while {:?}", self.full_name(), state)));
            }
        }

        self.state.set(LifecycleState::Executing);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute_hooks()));
        self.state.set(LifecycleState::Idle);

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                event!(Level::WARN, event = actor::EXECUTE_FAILED, actor = %self.full_name(), error = %e);
                Err(e.in_actor(&self.full_name()))
            }
            Err(payload) => {
                let message = panic_message(&payload);
                event!(Level::ERROR, event = actor::EXECUTE_PANICKED, actor = %self.full_name(), panic = %message);
                Err(FlowError::Execution(format!("{}: unexpected failure: {}", self.full_name(), message)))
            }
        }
    }

    fn execute_hooks(&self) -> Result<(), FlowError> {
        self.pre_execute()?;
        self.do_execute()?;
        self.post_execute();
        Ok(())
    }

    fn pre_execute(&self) -> Result<(), FlowError> {
        if self.watch.changed.get() {
            self.reconfigure()?;
        }
        let ctx = ActorContext::new(self);
        self.behavior.try_borrow_mut().map_err(|_| self.busy())?.pre_execute(&ctx)
    }

    /// Backs up transient state, resets, sets up again and restores the state
    fn reconfigure(&self) -> Result<(), FlowError> {
        self.debug("Variables changed, resetting!");
        let backup = self.behavior.try_borrow_mut().map_err(|_| self.busy())?.backup_state();
        let stopped = self.stopped.get();

        self.reset();
        let result = self.setup_actor();

        if let Ok(mut behavior) = self.behavior.try_borrow_mut() {
            behavior.restore_state(backup);
        }
        self.stopped.set(stopped);
        self.watch.changed.set(false);
        event!(Level::DEBUG, event = actor::RECONFIGURED, actor = %self.full_name(), success = result.is_ok());
        result
    }

    fn do_execute(&self) -> Result<(), FlowError> {
        if self.handler_info.is_some() {
            let director = self.director().ok_or_else(|| {
                FlowError::Structural(format!("{} has no director, it must be set up first", self.full_name()))
            })?;
            let children = self.children();
            return director.execute(&children);
        }

        let ctx = ActorContext::new(self);
        self.behavior.try_borrow_mut().map_err(|_| self.busy())?.do_execute(&ctx)
    }

    fn post_execute(&self) {
        let ctx = ActorContext::new(self);
        if let Ok(mut behavior) = self.behavior.try_borrow_mut() {
            behavior.post_execute(&ctx);
        }
    }

    /// Requests a stop: the director first, then the children, then the actor itself
    pub fn stop_execution(&self) {
        if let Some(director) = self.director() {
            director.stop_execution();
        }
        for child in self.children() {
            child.stop_execution();
        }

        if self.stopped.replace(true) {
            return;
        }
        if let Ok(mut behavior) = self.behavior.try_borrow_mut() {
            behavior.stop_execution();
        }
        event!(Level::DEBUG, event = actor::STOPPED, actor = %self.full_name());
        self.debug("Stopped");
    }

    /// Finishes the run: children first, then the director, then the actor's own hook
    pub fn wrap_up(&self) {
        for child in self.children() {
            child.wrap_up();
        }
        if let Some(director) = self.director() {
            director.wrap_up();
        }

        let ctx = ActorContext::new(self);
        if let Ok(mut behavior) = self.behavior.try_borrow_mut() {
            behavior.wrap_up(&ctx);
        }
        self.unsubscribe();
        self.state.set(LifecycleState::WrappedUp);
        event!(Level::DEBUG, event = actor::WRAPPED_UP, actor = %self.full_name());
    }

    /// Releases everything: children first, then the director, which is dropped, then the actor itself
    pub fn clean_up(&self) {
        for child in self.children() {
            child.clean_up();
        }
        let director = self.director.borrow_mut().take();
        if let Some(director) = director {
            director.clean_up();
        }

        if let Ok(mut behavior) = self.behavior.try_borrow_mut() {
            behavior.clean_up();
        }
        self.unsubscribe();
        self.state.set(LifecycleState::CleanedUp);
        event!(Level::DEBUG, event = actor::CLEANED_UP, actor = %self.full_name());
    }

    // ---------------------------------------------------------------------------------------------------------------
    // data passing

    pub fn generates(&self) -> Vec<DataType> {
        self.behavior
            .try_borrow()
            .ok()
            .and_then(|behavior| behavior.as_producer().map(|producer| producer.generates()))
            .unwrap_or_default()
    }

    pub fn accepts(&self) -> Vec<DataType> {
        self.behavior
            .try_borrow()
            .ok()
            .and_then(|behavior| behavior.as_consumer().map(|consumer| consumer.accepts()))
            .unwrap_or_default()
    }

    pub fn has_output(&self) -> bool {
        self.behavior
            .try_borrow()
            .ok()
            .and_then(|behavior| behavior.as_producer().map(|producer| producer.has_output()))
            .unwrap_or(false)
    }

    /// Next pending token of a producer
    pub fn output(&self) -> Option<Data> {
        let mut behavior = self.behavior.try_borrow_mut().ok()?;
        behavior.as_producer_mut()?.output()
    }

    /// Hands a token to a consumer
    pub fn input(&self, data: Data) -> Result<(), FlowError> {
        let mut behavior = self.behavior.try_borrow_mut().map_err(|_| self.busy())?;
        match behavior.as_consumer_mut() {
            Some(consumer) => {
                consumer.input(data);
                Ok(())
            }
            None => Err(FlowError::Structural(format!("{} does not accept input", self.full_name())))
        }
    }
}

impl fmt::Debug for ActorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorNode")
            .field("type", &self.type_identifier)
            .field("name", &self.name())
            .field("state", &self.state())
            .field("children", &self.child_count())
            .finish()
    }
}
