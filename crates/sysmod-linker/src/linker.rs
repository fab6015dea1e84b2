//! Core Linker implementation

use crate::config::LinkerConfig;
use crate::error::LinkerError;
use crate::extract::candidates;
use crate::pattern::split_clauses;
use crate::similarity::ratio;
use crate::types::{Candidates, Clauses, CreationPath, LinkResult};
use std::collections::BTreeSet;
use sysmod_domain::traits::PosTagger;
use sysmod_domain::{ModelContext, ModelError, ObjectId, ObjectKind, TypeRef};
use sysmod_engine::{AllocationEngine, Change, Outcome};
use tracing::{debug, info, warn};

/// Turns requirement and goal text into satisfaction links
///
/// The linker owns no model state: every call takes the model and the engine
/// that applies edits to it.
pub struct Linker<T>
where
    T: PosTagger,
{
    tagger: T,
    config: LinkerConfig,
}

impl<T> Linker<T>
where
    T: PosTagger,
    T::Error: std::fmt::Display,
{
    /// Create a new Linker
    pub fn new(tagger: T, config: LinkerConfig) -> Self {
        Self { tagger, config }
    }

    /// Current configuration
    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Split text into subject, object, condition and temporal clauses
    pub fn split(&self, text: &str) -> Result<Clauses, LinkerError> {
        split_clauses(text)
    }

    /// Tag every clause and collect candidate references
    pub fn extract(&self, clauses: &Clauses) -> Result<Candidates, LinkerError> {
        Ok(Candidates {
            subject: self.clause_candidates(&clauses.subject)?,
            object: self.clause_candidates(&clauses.object)?,
            condition: match &clauses.condition {
                Some(text) => self.clause_candidates(text)?,
                None => Vec::new(),
            },
            temporal: match &clauses.temporal {
                Some(text) => self.clause_candidates(text)?,
                None => Vec::new(),
            },
        })
    }

    /// Duplicate threshold for a statement kind and creation path
    pub fn threshold(&self, kind: ObjectKind, path: CreationPath) -> f64 {
        match (kind, path) {
            (ObjectKind::Goal, _) => self.config.goal_threshold,
            (_, CreationPath::Command) => self.config.requirement_threshold,
            (_, CreationPath::Describe) => self.config.describe_threshold,
        }
    }

    /// Most similar existing description of `kind` at or above `threshold`
    pub fn find_duplicate(
        &self,
        ctx: &ModelContext,
        kind: ObjectKind,
        text: &str,
        threshold: f64,
        exclude: Option<ObjectId>,
    ) -> Option<(ObjectId, f64)> {
        ctx.objects_of(kind)
            .filter(|o| Some(o.id()) != exclude)
            .filter_map(|o| {
                let description = o.description()?;
                if description.is_empty() {
                    return None;
                }
                Some((o.id(), ratio(description, text)))
            })
            .filter(|(_, score)| *score >= threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Create a requirement or goal from text and link it
    ///
    /// When `name` is absent the statement is numbered (`R1`, `G1`, ...). A
    /// description too close to an existing one suppresses creation; the
    /// existing statement is reported in [`LinkResult::duplicate_of`].
    pub fn create_statement(
        &self,
        ctx: &mut ModelContext,
        engine: &AllocationEngine,
        kind: ObjectKind,
        name: Option<&str>,
        text: &str,
        path: CreationPath,
    ) -> Result<LinkResult, LinkerError> {
        statement_kind(kind, kind.as_str())?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ModelError::InvalidInput(format!("{} text is empty", kind)).into());
        }

        let threshold = self.threshold(kind, path);
        if let Some((existing, score)) = self.find_duplicate(ctx, kind, text, threshold, None) {
            info!(
                "Suppressed {}: duplicates {} ({:.2})",
                kind,
                ctx.name_of(existing),
                score
            );
            let mut outcome = Outcome::new();
            outcome.warn(format!(
                "{} duplicates {} ({:.2})",
                kind,
                ctx.name_of(existing),
                score
            ));
            return Ok(LinkResult {
                duplicate_of: Some((existing, score)),
                outcome,
                ..LinkResult::default()
            });
        }

        // Tag before creating so a tagger failure leaves the model untouched
        self.extract(&self.split(text)?)?;

        let name = match name {
            Some(name) => name.trim().to_string(),
            None => next_name(ctx, kind),
        };
        let id = ctx.create(kind, &name, TypeRef::Base(kind))?;
        info!("Created {} {}", kind, name);

        let mut outcome = Outcome::new();
        outcome.push(Change::Created { id });
        engine.set_description(ctx, id, text)?;

        let mut result = self.link(ctx, engine, id)?;
        outcome.merge(result.outcome);
        result.outcome = outcome;
        Ok(result)
    }

    /// Replace the text of an existing statement and relink it
    pub fn describe(
        &self,
        ctx: &mut ModelContext,
        engine: &AllocationEngine,
        statement: ObjectId,
        text: &str,
    ) -> Result<LinkResult, LinkerError> {
        let kind = ctx.expect_object(statement)?.kind();
        statement_kind(kind, &ctx.name_of(statement))?;

        let threshold = self.threshold(kind, CreationPath::Describe);
        if let Some((existing, score)) =
            self.find_duplicate(ctx, kind, text, threshold, Some(statement))
        {
            let mut outcome = Outcome::new();
            outcome.warn(format!(
                "{} duplicates {} ({:.2})",
                ctx.name_of(statement),
                ctx.name_of(existing),
                score
            ));
            return Ok(LinkResult {
                statement: Some(statement),
                duplicate_of: Some((existing, score)),
                outcome,
                ..LinkResult::default()
            });
        }

        let mut outcome = engine.set_description(ctx, statement, text)?;
        let mut result = self.link(ctx, engine, statement)?;
        outcome.merge(result.outcome);
        result.outcome = outcome;
        Ok(result)
    }

    /// Allocate a statement to the objects its text mentions
    ///
    /// The statement is allocated to its subject first; every other mentioned
    /// object already related to the subject is allocated too. Rejected
    /// allocations become warnings.
    pub fn link(
        &self,
        ctx: &mut ModelContext,
        engine: &AllocationEngine,
        statement: ObjectId,
    ) -> Result<LinkResult, LinkerError> {
        let obj = ctx.expect_object(statement)?;
        let kind = obj.kind();
        statement_kind(kind, obj.name())?;
        let text = obj.description().unwrap_or_default().to_string();

        let mut result = LinkResult {
            statement: Some(statement),
            ..LinkResult::default()
        };
        if text.is_empty() {
            return Ok(result);
        }

        let clauses = self.split(&text)?;
        let found = self.extract(&clauses)?;
        debug!("Candidates for {}: {:?}", ctx.name_of(statement), found);

        let Some(subject) = found
            .subject
            .iter()
            .find_map(|c| resolve_candidate(ctx, c, statement))
        else {
            warn!("{}: subject unknown", ctx.name_of(statement));
            result.outcome.warn("subject unknown");
            return Ok(result);
        };
        result.subject = Some(subject);
        self.satisfy(ctx, engine, statement, subject, &mut result.outcome);

        let mut seen = BTreeSet::from([statement, subject]);
        for candidate in found
            .object
            .iter()
            .chain(&found.condition)
            .chain(&found.temporal)
        {
            let Some(id) = resolve_candidate(ctx, candidate, statement) else {
                continue;
            };
            if seen.insert(id) && engine.relationship_exists(ctx, subject, id) {
                self.satisfy(ctx, engine, statement, id, &mut result.outcome);
            }
        }

        if self.config.link_parents {
            self.link_parent(ctx, engine, statement, subject, &clauses, &mut result.outcome)?;
        }

        Ok(result)
    }

    /// Relink every statement whose subject is one of `touched`
    pub fn rescan(
        &self,
        ctx: &mut ModelContext,
        engine: &AllocationEngine,
        touched: &BTreeSet<ObjectId>,
    ) -> Result<Outcome, LinkerError> {
        let mut outcome = Outcome::new();
        if touched.is_empty() {
            return Ok(outcome);
        }

        let statements: Vec<ObjectId> = ctx
            .objects()
            .filter(|o| matches!(o.kind(), ObjectKind::Requirement | ObjectKind::Goal))
            .filter(|o| o.description().is_some_and(|d| !d.is_empty()))
            .map(|o| o.id())
            .collect();

        for statement in statements {
            if let Some(subject) = self.subject_of(ctx, statement)? {
                if touched.contains(&subject) {
                    debug!("Rescanning {}", ctx.name_of(statement));
                    outcome.merge(self.link(ctx, engine, statement)?.outcome);
                }
            }
        }
        Ok(outcome)
    }

    /// Resolved subject of a statement's text, if any
    pub fn subject_of(
        &self,
        ctx: &ModelContext,
        statement: ObjectId,
    ) -> Result<Option<ObjectId>, LinkerError> {
        let text = ctx
            .expect_object(statement)?
            .description()
            .unwrap_or_default()
            .to_string();
        let clauses = self.split(&text)?;
        let subject = self.clause_candidates(&clauses.subject)?;
        Ok(subject
            .iter()
            .find_map(|c| resolve_candidate(ctx, c, statement)))
    }

    fn clause_candidates(&self, text: &str) -> Result<Vec<String>, LinkerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tokens = self
            .tagger
            .tag(text)
            .map_err(|e| LinkerError::Tagger(e.to_string()))?;
        Ok(candidates(&tokens, self.config.max_candidate_words))
    }

    fn satisfy(
        &self,
        ctx: &mut ModelContext,
        engine: &AllocationEngine,
        statement: ObjectId,
        object: ObjectId,
        outcome: &mut Outcome,
    ) {
        match engine.allocate_confirmed(ctx, statement, object) {
            Ok(done) => {
                if done.is_changed() {
                    info!("{} satisfied by {}", ctx.name_of(statement), ctx.name_of(object));
                }
                outcome.merge(done);
            }
            Err(e) => {
                debug!("Could not link {}: {}", ctx.name_of(statement), e);
                outcome.warn(e.to_string());
            }
        }
    }

    /// Attach `statement` under the closest statement held by the subject's parent
    fn link_parent(
        &self,
        ctx: &mut ModelContext,
        engine: &AllocationEngine,
        statement: ObjectId,
        subject: ObjectId,
        clauses: &Clauses,
        outcome: &mut Outcome,
    ) -> Result<(), LinkerError> {
        if ctx.parent(statement).is_some() {
            return Ok(());
        }
        let Some(parent) = ctx.parent(subject) else {
            return Ok(());
        };
        let kind = ctx.expect_object(statement)?.kind();

        let holders: Vec<(ObjectId, String)> = ctx
            .objects_of(kind)
            .filter(|o| o.id() != statement)
            .filter(|o| o.allocated().is_some_and(|set| set.contains(&parent)))
            .map(|o| (o.id(), o.description().unwrap_or_default().to_string()))
            .collect();

        let mut best: Option<(ObjectId, f64)> = None;
        for (candidate, text) in holders {
            if ctx.is_ancestor(statement, candidate) {
                continue;
            }
            let score = ratio(&self.split(&text)?.object, &clauses.object);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }

        if let Some((candidate, score)) = best {
            if score >= self.config.parent_link_threshold {
                match engine.compose(ctx, candidate, statement) {
                    Ok(done) => {
                        info!(
                            "{} refines {} ({:.2})",
                            ctx.name_of(statement),
                            ctx.name_of(candidate),
                            score
                        );
                        outcome.merge(done);
                    }
                    Err(e) => outcome.warn(e.to_string()),
                }
            }
        }
        Ok(())
    }
}

/// Kinds a statement may be satisfied by
fn linkable_kinds() -> Vec<ObjectKind> {
    ObjectKind::ALL
        .into_iter()
        .filter(|k| k.can_satisfy())
        .collect()
}

/// Resolve a candidate, retrying without a plural "s"
fn resolve_candidate(ctx: &ModelContext, candidate: &str, statement: ObjectId) -> Option<ObjectId> {
    let kinds = linkable_kinds();
    let found = ctx.resolve_loose(candidate, &kinds).or_else(|| {
        let singular = candidate.strip_suffix('s').filter(|s| s.len() > 2)?;
        ctx.resolve_loose(singular, &kinds)
    });
    found.filter(|id| *id != statement)
}

fn statement_kind(kind: ObjectKind, name: &str) -> Result<(), LinkerError> {
    match kind {
        ObjectKind::Requirement | ObjectKind::Goal => Ok(()),
        _ => Err(LinkerError::NotAStatement(name.to_string())),
    }
}

/// First free `R<n>` / `G<n>` name
fn next_name(ctx: &ModelContext, kind: ObjectKind) -> String {
    let prefix = if kind == ObjectKind::Goal { "G" } else { "R" };
    let mut n = ctx.objects_of(kind).count() + 1;
    loop {
        let name = format!("{}{}", prefix, n);
        if matches!(ctx.resolve(&name, &[kind]), Ok(None)) {
            return name;
        }
        n += 1;
    }
}
