//! The modeling session
//!
//! A session owns one open model: the in-memory context, the components that
//! edit it and the store it is mirrored to. Every command runs the same
//! pipeline: resolve names, apply through the engine, mirror the changes onto
//! derived objects, persist, then relink requirement text that mentions a
//! touched object and persist again.

use crate::diagram::PlantUmlRenderer;
use crate::recognizer::{Command, Recognizer};
use crate::{Result, SessionConfig, SessionError};
use std::collections::VecDeque;
use std::fmt::Display;
use sysmod_domain::traits::{DiagramRenderer, ModelStore, PosTagger};
use sysmod_domain::{FlowRole, ModelContext, ModelError, ObjectId, ObjectKind, Subgraph, TypeRef};
use sysmod_engine::{AllocationEngine, Applied, Change, Outcome, PendingConfirmation};
use sysmod_integrity::IntegrityChecker;
use sysmod_linker::{CreationPath, Linker, LinkerError};
use tracing::{debug, info, warn};

/// What one call to [`Session::execute`] or [`Session::resume`] did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// 1 when the model changed, 0 otherwise
    pub flag: u8,
    /// One line per applied change
    pub messages: Vec<String>,
    /// Non-blocking traceability gaps
    pub warnings: Vec<String>,
    /// Commands, or parts of commands, that were not applied
    pub errors: Vec<String>,
    /// Question to answer through [`Session::resume`]
    pub question: Option<String>,
    /// Diagrams produced by `show`
    pub diagrams: Vec<String>,
}

impl Report {
    /// Whether every command applied without error
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, error: impl Display) {
        let message = error.to_string();
        warn!("{}", message);
        self.errors.push(message);
    }

    fn record(&mut self, ctx: &ModelContext, outcome: Outcome) {
        self.flag = self.flag.max(outcome.update_flag());
        self.messages
            .extend(outcome.changes.iter().filter_map(|c| describe_change(ctx, c)));
        self.warnings.extend(outcome.warnings);
    }
}

/// One open model and everything that edits it
///
/// Commands run one at a time. While a question is pending, further commands
/// are refused until [`Session::resume`] answers it.
pub struct Session<S: ModelStore, T: PosTagger> {
    ctx: ModelContext,
    engine: AllocationEngine,
    linker: Linker<T>,
    checker: IntegrityChecker,
    recognizer: Recognizer,
    renderer: PlantUmlRenderer,
    store: S,
    pending: Option<PendingConfirmation>,
    queue: VecDeque<Queued>,
}

/// Work waiting behind a pending question
#[derive(Debug)]
enum Queued {
    /// A recognized command
    Command(Command),
    /// Items left over from an allocation that stopped to ask, holder already resolved
    Allocate { holder: ObjectId, items: Vec<String> },
}

impl<S, T> Session<S, T>
where
    S: ModelStore,
    S::Error: Display,
    T: PosTagger,
    T::Error: Display,
{
    /// Load the model held by `store`
    pub fn open(store: S, tagger: T, config: SessionConfig) -> Result<Self> {
        config.validate().map_err(SessionError::Config)?;
        let ctx = store.load().map_err(store_error)?;
        info!("Opened model with {} objects", ctx.len());

        Ok(Self {
            ctx,
            engine: AllocationEngine::new(config.engine),
            linker: Linker::new(tagger, config.linker),
            checker: IntegrityChecker::new(config.integrity),
            recognizer: Recognizer::new()?,
            renderer: PlantUmlRenderer::new(),
            store,
            pending: None,
            queue: VecDeque::new(),
        })
    }

    /// The model
    pub fn model(&self) -> &ModelContext {
        &self.ctx
    }

    /// The allocation engine
    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    /// The integrity checker, with its deletion counters
    pub fn checker(&self) -> &IntegrityChecker {
        &self.checker
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Question waiting for an answer, if any
    pub fn pending_question(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.question.as_str())
    }

    /// Recognize and apply every command in `block`
    ///
    /// Failures are local to one command and land in [`Report::errors`]. If an
    /// allocation needs confirmation, the rest of the block waits in a queue
    /// until [`Session::resume`] is called.
    pub fn execute(&mut self, block: &str) -> Result<Report> {
        if let Some(pending) = &self.pending {
            return Err(SessionError::AwaitingAnswer(pending.question.clone()));
        }

        let recognized = self.recognizer.recognize(block);
        let mut report = Report::default();
        for line in recognized.unrecognized {
            report.error(SessionError::Unrecognized(line));
        }
        self.queue.extend(recognized.commands.into_iter().map(Queued::Command));
        self.drain(&mut report);
        Ok(report)
    }

    /// Answer the pending question, then run whatever was queued behind it
    ///
    /// A negative answer leaves the allocation unapplied and is reported as an
    /// error; the queued commands still run.
    pub fn resume(&mut self, accepted: bool) -> Result<Report> {
        let pending = self.pending.take().ok_or(SessionError::NothingPending)?;
        let mut report = Report::default();

        match self.engine.resume(&mut self.ctx, &pending, accepted) {
            Ok(outcome) => self.settle(outcome, &mut report),
            Err(e) => report.error(e),
        }
        self.drain(&mut report);
        Ok(report)
    }

    /// PlantUML diagram of the object called `name`
    pub fn show(&self, name: &str) -> Result<String> {
        let id = self.find(name, &[])?;
        let graph = Subgraph::of(&self.ctx, id)?;
        Ok(self.renderer.render(&graph))
    }

    /// Merge objects from an external source and persist them
    ///
    /// `import` receives the model and returns the ids it added.
    pub fn import<F, E>(&mut self, import: F) -> Result<Vec<ObjectId>>
    where
        F: FnOnce(&mut ModelContext) -> std::result::Result<Vec<ObjectId>, E>,
        E: Display,
    {
        let imported = import(&mut self.ctx).map_err(store_error)?;
        if !imported.is_empty() {
            // Imported children also change their parents' child sets
            let objects: Vec<_> = self.ctx.objects().cloned().collect();
            self.store.save(&objects).map_err(store_error)?;
            self.store.save_relations(&self.ctx).map_err(store_error)?;
        }
        info!("Imported {} objects", imported.len());
        Ok(imported)
    }

    fn drain(&mut self, report: &mut Report) {
        while self.pending.is_none() {
            let Some(next) = self.queue.pop_front() else {
                break;
            };
            debug!("Applying {:?}", next);
            let applied = match next {
                Queued::Command(command) => self.apply(command, report),
                Queued::Allocate { holder, items } => {
                    let mut outcome = Outcome::new();
                    self.allocate_each(holder, items, &mut outcome, report);
                    Ok(outcome)
                }
            };
            match applied {
                Ok(outcome) => self.settle(outcome, report),
                Err(e) => report.error(e),
            }
        }
        report.question = self.pending.as_ref().map(|p| p.question.clone());
    }

    /// Mirror, persist, relink and persist again
    fn settle(&mut self, mut outcome: Outcome, report: &mut Report) {
        if outcome.is_changed() {
            let mirrored = self.engine.inheritance().mirror(&mut self.ctx, &outcome.changes);
            outcome.merge(mirrored);
        }
        if let Err(e) = self.persist(&outcome) {
            report.error(e);
        }

        if outcome.is_changed() {
            match self.linker.rescan(&mut self.ctx, &self.engine, &outcome.touched()) {
                Ok(linked) => {
                    if let Err(e) = self.persist(&linked) {
                        report.error(e);
                    }
                    outcome.merge(linked);
                }
                Err(e) => report.error(e),
            }
        }

        report.record(&self.ctx, outcome);
    }

    fn persist(&mut self, outcome: &Outcome) -> Result<()> {
        if !outcome.is_changed() {
            return Ok(());
        }

        let mut saved = Vec::new();
        let mut removed = Vec::new();
        for id in outcome.touched() {
            match self.ctx.get(id) {
                Some(obj) => saved.push(obj.clone()),
                None => removed.push(id),
            }
        }

        self.store.save(&saved).map_err(store_error)?;
        if !removed.is_empty() {
            self.store.delete(&removed).map_err(store_error)?;
        }
        self.store.save_relations(&self.ctx).map_err(store_error)?;
        debug!("Persisted {} objects, removed {}", saved.len(), removed.len());
        Ok(())
    }

    fn apply(&mut self, command: Command, report: &mut Report) -> Result<Outcome> {
        let mut outcome = Outcome::new();

        match command {
            Command::Statement { kind, text } => {
                let result = self.linker.create_statement(
                    &mut self.ctx,
                    &self.engine,
                    kind,
                    None,
                    &text,
                    CreationPath::Command,
                )?;
                outcome.merge(result.outcome);
            }
            Command::Describe { name, text } => outcome.merge(self.describe(&name, &text)?),
            Command::Alias { name, alias } => {
                let id = self.find(&name, &[])?;
                outcome.merge(self.engine.set_alias(&mut self.ctx, id, &alias)?);
            }
            Command::AttributeValue {
                attribute,
                object,
                value,
            } => {
                let attribute = self.find(&attribute, &[ObjectKind::Attribute])?;
                let object = self.find(&object, &[])?;
                outcome.merge(self.engine.set_attribute(&mut self.ctx, attribute, object, &value)?);
            }
            Command::TransitionEndpoints {
                transition,
                source,
                destination,
            } => {
                let transition = self.find(&transition, &[ObjectKind::Transition])?;
                let source = self.find(&source, &[ObjectKind::State])?;
                let destination = self.find(&destination, &[ObjectKind::State])?;
                let first = self.engine.set_transition_source(&mut self.ctx, transition, source);
                collect(&mut outcome, report, first.map_err(SessionError::from));
                let second = self
                    .engine
                    .set_transition_destination(&mut self.ctx, transition, destination);
                collect(&mut outcome, report, second.map_err(SessionError::from));
            }
            Command::Condition { transition, text } => {
                let transition = self.find(&transition, &[ObjectKind::Transition])?;
                outcome.merge(self.engine.add_condition(&mut self.ctx, transition, &text)?);
            }
            Command::DeclareType { name, base } => outcome.merge(self.declare_type(&name, &base)?),
            Command::Declare { names, kind } => {
                let type_ref = self.type_ref(&kind)?;
                for name in names {
                    let declared = self.declare(&name, type_ref);
                    collect(&mut outcome, report, declared);
                }
            }
            Command::Compose {
                parent,
                children,
                remove,
            } => {
                let parent = self.find(&parent, &[])?;
                let kinds: Vec<ObjectKind> = self.ctx.kind_of(parent).into_iter().collect();
                for child in children {
                    let applied = self.find(&child, &kinds).and_then(|child| {
                        let result = if remove {
                            self.engine.decompose(&mut self.ctx, parent, child)
                        } else {
                            self.engine.compose(&mut self.ctx, parent, child)
                        };
                        Ok(result?)
                    });
                    collect(&mut outcome, report, applied);
                }
            }
            Command::Flow {
                function,
                role,
                data,
                remove,
            } => {
                let function = self.find(&function, &[ObjectKind::Function])?;
                for item in data {
                    let applied = self.find(&item, &[ObjectKind::Data]).and_then(|data| {
                        let result = if remove {
                            self.engine.remove_flow(&mut self.ctx, role, data, function)
                        } else {
                            self.engine.add_flow(&mut self.ctx, role, data, function)
                        };
                        Ok(result?)
                    });
                    collect(&mut outcome, report, applied);
                }
            }
            Command::Allocate {
                holder,
                items,
                remove: true,
            } => {
                let holder = self.find(&holder, &[])?;
                for item in items {
                    let applied = self.find_allocatable(holder, &item).and_then(|object| {
                        Ok(self.engine.deallocate(&mut self.ctx, holder, object)?)
                    });
                    collect(&mut outcome, report, applied);
                }
            }
            Command::Allocate { holder, items, .. } => {
                let holder = self.find(&holder, &[])?;
                self.allocate_each(holder, items, &mut outcome, report);
            }
            Command::Satisfy { items, statement } => {
                let statement =
                    self.find(&statement, &[ObjectKind::Requirement, ObjectKind::Goal])?;
                self.allocate_each(statement, items, &mut outcome, report);
            }
            Command::Expose {
                element,
                interfaces,
                remove,
            } => {
                let element = self.find(
                    &element,
                    &[ObjectKind::FunctionalElement, ObjectKind::PhysicalElement],
                )?;
                let kinds = [ObjectKind::FunctionalInterface, ObjectKind::PhysicalInterface];
                for interface in interfaces {
                    let applied = self.find(&interface, &kinds).and_then(|interface| {
                        let result = if remove {
                            self.engine.unexpose(&mut self.ctx, element, interface)
                        } else {
                            self.engine.expose(&mut self.ctx, element, interface)
                        };
                        Ok(result?)
                    });
                    collect(&mut outcome, report, applied);
                }
            }
            Command::Derive { name, base } => {
                let object = self.find(&name, &[])?;
                let inheritance = self.engine.inheritance();
                match base {
                    Some(base) => {
                        let kinds: Vec<ObjectKind> = self.ctx.kind_of(object).into_iter().collect();
                        let base = self.find(&base, &kinds)?;
                        outcome.merge(inheritance.derive(&mut self.ctx, object, base)?);
                    }
                    None => outcome.merge(inheritance.remove_inherited_object(&mut self.ctx, object)?),
                }
            }
            Command::Precede { predecessor, data } => {
                let predecessor = self.find(&predecessor, &[ObjectKind::Data])?;
                let data = self.find(&data, &[ObjectKind::Data])?;
                outcome.merge(self.engine.precede(&mut self.ctx, predecessor, data)?);
            }
            Command::Consider { view } => {
                let view = self.find(&view, &[ObjectKind::View])?;
                outcome.merge(self.engine.activate_view(&mut self.ctx, view)?);
            }
            Command::Delete { names } => {
                let ids = names
                    .iter()
                    .map(|name| self.find(name, &[]))
                    .collect::<Result<Vec<_>>>()?;
                let labels: Vec<String> = ids.iter().map(|id| self.ctx.name_of(*id)).collect();
                let deleted = self.checker.delete(&mut self.ctx, &ids)?;
                if deleted.is_changed() {
                    report
                        .messages
                        .extend(labels.into_iter().map(|l| format!("Deleted {}", l)));
                }
                outcome.merge(deleted);
            }
            Command::Show { name } => report.diagrams.push(self.show(&name)?),
        }

        Ok(outcome)
    }

    /// Allocate each named item to `holder`, stopping at the first question
    fn allocate_each(
        &mut self,
        holder: ObjectId,
        items: Vec<String>,
        outcome: &mut Outcome,
        report: &mut Report,
    ) {
        let mut items = items.into_iter();
        while let Some(item) = items.next() {
            let applied = self
                .find_allocatable(holder, &item)
                .and_then(|object| Ok(self.engine.allocate(&mut self.ctx, holder, object)?));

            match applied {
                Ok(Applied::Done(done)) => outcome.merge(done),
                Ok(Applied::NeedsConfirmation(pending)) => {
                    info!("Waiting for an answer: {}", pending.question);
                    self.pending = Some(pending);
                    let rest: Vec<String> = items.by_ref().collect();
                    if !rest.is_empty() {
                        self.queue.push_front(Queued::Allocate { holder, items: rest });
                    }
                    break;
                }
                Err(e) => report.error(e),
            }
        }
    }

    fn describe(&mut self, name: &str, text: &str) -> Result<Outcome> {
        let statements = [ObjectKind::Requirement, ObjectKind::Goal];
        if let Some(id) = self.ctx.resolve(name, &statements)? {
            let result = self.linker.describe(&mut self.ctx, &self.engine, id, text)?;
            return Ok(result.outcome);
        }
        if self.ctx.resolve(name, &[])?.is_some() {
            return Err(LinkerError::NotAStatement(name.to_string()).into());
        }

        let result = self.linker.create_statement(
            &mut self.ctx,
            &self.engine,
            ObjectKind::Requirement,
            Some(name),
            text,
            CreationPath::Describe,
        )?;
        Ok(result.outcome)
    }

    fn declare_type(&mut self, name: &str, base: &str) -> Result<Outcome> {
        let type_ref = self.type_ref(base)?;
        if type_ref == TypeRef::Base(ObjectKind::Type) {
            return Err(ModelError::InvalidInput(format!(
                "{} must extend a kind or another type",
                name
            ))
            .into());
        }

        let id = self.ctx.create(ObjectKind::Type, name, type_ref)?;
        info!("Declared type {}", name);
        let mut outcome = Outcome::new();
        outcome.push(Change::Created { id });
        Ok(outcome)
    }

    /// Create `name` with the given type; declaring an existing object again
    /// is a no-op
    fn declare(&mut self, name: &str, type_ref: TypeRef) -> Result<Outcome> {
        let kind = self.ctx.base_kind_of(type_ref).ok_or_else(|| {
            ModelError::InvalidInput(format!("type of {} does not lead to a kind", name))
        })?;
        if kind == ObjectKind::Type {
            return Err(ModelError::InvalidInput(format!(
                "use '{} extends <kind>' to declare a type",
                name
            ))
            .into());
        }

        if let Some(existing) = self.ctx.resolve(name, &[kind])? {
            if self.ctx.get(existing).map(|o| o.header().type_ref) == Some(type_ref) {
                debug!("{} is already a {}", name, kind);
                return Ok(Outcome::new());
            }
        }

        let id = self.ctx.create(kind, name, type_ref)?;
        info!("Declared {} {}", kind, name);
        let mut outcome = Outcome::new();
        outcome.push(Change::Created { id });
        Ok(outcome)
    }

    /// A kind word ("functions") or the name of a user-defined type
    fn type_ref(&self, word: &str) -> Result<TypeRef> {
        let word = word.trim();
        if let Some(kind) = ObjectKind::parse(word) {
            return Ok(TypeRef::Base(kind));
        }
        for candidate in std::iter::once(word).chain(word.strip_suffix('s')) {
            if let Some(id) = self.ctx.resolve(candidate, &[ObjectKind::Type])? {
                return Ok(TypeRef::Custom(id));
            }
        }
        Err(ModelError::InvalidInput(format!("unknown kind or type '{}'", word)).into())
    }

    /// Resolve a name, retrying without a leading article
    fn find(&self, name: &str, kinds: &[ObjectKind]) -> Result<ObjectId> {
        let name = name.trim();
        if let Some(id) = self.ctx.resolve(name, kinds)? {
            return Ok(id);
        }
        if let Some(bare) = strip_article(name) {
            if let Some(id) = self.ctx.resolve(bare, kinds)? {
                return Ok(id);
            }
        }
        Ok(self.ctx.lookup(name, kinds)?)
    }

    /// Like [`Self::find`], but a name shared by several kinds resolves to the
    /// one object `holder` may allocate
    fn find_allocatable(&self, holder: ObjectId, name: &str) -> Result<ObjectId> {
        match self.find(name, &[]) {
            Err(SessionError::Model(ModelError::Ambiguous { .. })) => {
                let fits: Vec<ObjectId> = ObjectKind::ALL
                    .iter()
                    .filter_map(|kind| self.ctx.resolve(name.trim(), &[*kind]).ok().flatten())
                    .filter(|id| self.engine.check_allocation(&self.ctx, holder, *id).is_ok())
                    .collect();
                match fits.as_slice() {
                    [only] => Ok(*only),
                    _ => self.find(name, &[]),
                }
            }
            other => other,
        }
    }
}

fn collect(outcome: &mut Outcome, report: &mut Report, result: Result<Outcome>) {
    match result {
        Ok(done) => outcome.merge(done),
        Err(e) => report.error(e),
    }
}

fn store_error(e: impl Display) -> SessionError {
    SessionError::Store(e.to_string())
}

fn strip_article(name: &str) -> Option<&str> {
    let lower = name.to_lowercase();
    ["the ", "a ", "an "]
        .iter()
        .find(|article| lower.starts_with(**article))
        .and_then(|article| name.get(article.len()..))
        .map(str::trim_start)
}

fn verb(role: FlowRole) -> &'static str {
    match role {
        FlowRole::Producer => "produces",
        FlowRole::Consumer => "consumes",
    }
}

/// One line for the user; deletions are reported by the delete handler since
/// the objects are gone by now
fn describe_change(ctx: &ModelContext, change: &Change) -> Option<String> {
    let name = |id: &ObjectId| ctx.name_of(*id);
    let line = match change {
        Change::Created { id } => format!("Created {} {}", ctx.kind_of(*id)?, name(id)),
        Change::Deleted { .. } => return None,
        Change::Composed { parent, child } => {
            format!("{} is composed of {}", name(parent), name(child))
        }
        Change::Decomposed { parent, child } => {
            format!("{} is no longer composed of {}", name(parent), name(child))
        }
        Change::Allocated { holder, object } => {
            format!("{} allocates {}", name(holder), name(object))
        }
        Change::Deallocated { holder, object } => {
            format!("{} no longer allocates {}", name(holder), name(object))
        }
        Change::Exposed { element, interface } => {
            format!("{} exposes {}", name(element), name(interface))
        }
        Change::Unexposed { element, interface } => {
            format!("{} no longer exposes {}", name(element), name(interface))
        }
        Change::FlowAdded {
            role,
            data,
            function,
            ..
        } => format!("{} {} {}", name(function), verb(*role), name(data)),
        Change::FlowRemoved {
            role,
            data,
            function,
        } => format!("{} no longer {} {}", name(function), verb(*role), name(data)),
        Change::Described {
            attribute,
            object,
            value,
        } => format!("the {} of {} is {}", name(attribute), name(object), value),
        Change::Undescribed { attribute, object } => {
            format!("{} no longer describes {}", name(attribute), name(object))
        }
        Change::Preceded { predecessor, data } => {
            format!("{} precedes {}", name(predecessor), name(data))
        }
        Change::Updated { id } => format!("Updated {}", name(id)),
        Change::Claimed { holder, object } => {
            format!("{} and {} are now related directly", name(holder), name(object))
        }
        Change::Derived { object, base } => {
            format!("{} is derived from {}", name(object), name(base))
        }
        Change::Underived { object, base } => {
            format!("{} is no longer derived from {}", name(object), name(base))
        }
    };
    Some(line)
}
