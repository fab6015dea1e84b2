//! The session model: an arena of objects plus the flow table and overlays
//!
//! All relationship edits go through the engine crate; this module only owns
//! the collections and answers structural questions about them.

use crate::{
    FlowRole, FlowTable, Header, ModelError, ModelObject, ModelResult, ObjectId, ObjectKind,
    Overlay, TypeRef,
};
use std::collections::{BTreeMap, BTreeSet};

/// All entity collections of one open model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelContext {
    objects: BTreeMap<ObjectId, ModelObject>,
    flows: FlowTable,
    overlays: BTreeMap<ObjectId, Overlay>,
}

impl ModelContext {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a model from persisted parts
    pub fn from_parts(
        objects: impl IntoIterator<Item = ModelObject>,
        flows: FlowTable,
        overlays: BTreeMap<ObjectId, Overlay>,
    ) -> Self {
        Self {
            objects: objects.into_iter().map(|o| (o.id(), o)).collect(),
            flows,
            overlays,
        }
    }

    /// Create a new object of `kind` declared with `type_ref`
    ///
    /// Names must be non-empty and unique per kind (aliases included).
    pub fn create(&mut self, kind: ObjectKind, name: &str, type_ref: TypeRef) -> ModelResult<ObjectId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::InvalidInput("object name is empty".to_string()));
        }
        if let Some(existing) = self
            .objects_of(kind)
            .find(|o| o.header().answers_to(name))
        {
            return Err(ModelError::Duplicate(format!(
                "{} '{}' already exists",
                kind,
                existing.name()
            )));
        }

        let obj = ModelObject::new(kind, Header::new(name, type_ref));
        let id = obj.id();
        self.objects.insert(id, obj);
        Ok(id)
    }

    /// Insert a fully formed object (import path); the id must be unused
    pub fn insert(&mut self, obj: ModelObject) -> ModelResult<ObjectId> {
        let id = obj.id();
        if self.objects.contains_key(&id) {
            return Err(ModelError::Duplicate(format!("object id {} already exists", id)));
        }
        self.objects.insert(id, obj);
        Ok(id)
    }

    /// Remove an object without any checks
    ///
    /// Callers are expected to have run the integrity checker first.
    pub fn remove(&mut self, id: ObjectId) -> Option<ModelObject> {
        self.overlays.remove(&id);
        self.objects.remove(&id)
    }

    /// Get an object
    pub fn get(&self, id: ObjectId) -> Option<&ModelObject> {
        self.objects.get(&id)
    }

    /// Get an object mutably
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ModelObject> {
        self.objects.get_mut(&id)
    }

    /// Get an object or fail with a resolution error
    pub fn expect_object(&self, id: ObjectId) -> ModelResult<&ModelObject> {
        self.get(id)
            .ok_or_else(|| ModelError::Resolution(format!("object {}", id)))
    }

    /// Whether the id designates an object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Kind of an object
    pub fn kind_of(&self, id: ObjectId) -> Option<ObjectKind> {
        self.get(id).map(|o| o.kind())
    }

    /// Display name of an object, or its id when unknown
    pub fn name_of(&self, id: ObjectId) -> String {
        self.get(id)
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// All objects in id order
    pub fn objects(&self) -> impl Iterator<Item = &ModelObject> {
        self.objects.values()
    }

    /// Objects of one kind in id order
    pub fn objects_of(&self, kind: ObjectKind) -> impl Iterator<Item = &ModelObject> {
        self.objects.values().filter(move |o| o.kind() == kind)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the model holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Producer/consumer edges
    pub fn flows(&self) -> &FlowTable {
        &self.flows
    }

    /// Producer/consumer edges, mutably
    pub fn flows_mut(&mut self) -> &mut FlowTable {
        &mut self.flows
    }

    /// Inheritance overlay of a derived object
    pub fn overlay(&self, id: ObjectId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    /// Inheritance overlay of a derived object, created on demand
    pub fn overlay_mut(&mut self, id: ObjectId) -> &mut Overlay {
        self.overlays.entry(id).or_default()
    }

    /// Detach and return an overlay
    pub fn take_overlay(&mut self, id: ObjectId) -> Option<Overlay> {
        self.overlays.remove(&id)
    }

    /// All overlays keyed by derived object
    pub fn overlays(&self) -> &BTreeMap<ObjectId, Overlay> {
        &self.overlays
    }

    // ----- resolution -----

    /// Resolve a name or alias among `kinds` (all kinds when empty)
    ///
    /// Returns `Ok(None)` when nothing matches and `Ambiguous` when more than one
    /// object answers to the name.
    pub fn resolve(&self, name: &str, kinds: &[ObjectKind]) -> ModelResult<Option<ObjectId>> {
        let name = name.trim();
        let matches: Vec<ObjectId> = self
            .objects
            .values()
            .filter(|o| kinds.is_empty() || kinds.contains(&o.kind()))
            .filter(|o| o.header().answers_to(name))
            .map(|o| o.id())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            count => Err(ModelError::Ambiguous {
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Resolve a name that must exist
    pub fn lookup(&self, name: &str, kinds: &[ObjectKind]) -> ModelResult<ObjectId> {
        self.resolve(name, kinds)?.ok_or_else(|| {
            if kinds.len() == 1 {
                ModelError::Resolution(format!("{} '{}'", kinds[0], name.trim()))
            } else {
                ModelError::Resolution(format!("'{}'", name.trim()))
            }
        })
    }

    /// Exact resolution first, then case-insensitive; only unique matches count
    pub fn resolve_loose(&self, name: &str, kinds: &[ObjectKind]) -> Option<ObjectId> {
        if let Ok(Some(id)) = self.resolve(name, kinds) {
            return Some(id);
        }
        let name = name.trim();
        let mut matches = self
            .objects
            .values()
            .filter(|o| kinds.is_empty() || kinds.contains(&o.kind()))
            .filter(|o| o.header().answers_to_loosely(name));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.id()),
            _ => None,
        }
    }

    // ----- types -----

    /// Closed base kind reached by walking a type chain
    ///
    /// Returns `None` if the chain is broken or loops.
    pub fn base_kind_of(&self, type_ref: TypeRef) -> Option<ObjectKind> {
        let mut current = type_ref;
        let mut seen = BTreeSet::new();
        loop {
            match current {
                TypeRef::Base(kind) => return Some(kind),
                TypeRef::Custom(id) => {
                    if !seen.insert(id) {
                        return None;
                    }
                    current = self.get(id)?.header().type_ref;
                }
            }
        }
    }

    /// Closed base kind of an object, following its declared type
    pub fn base_kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.base_kind_of(self.get(id)?.header().type_ref)
    }

    /// Objects declared with the given user-defined type (or extending it)
    pub fn type_users(&self, type_id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.header().type_ref == TypeRef::Custom(type_id))
            .map(|o| o.id())
            .collect()
    }

    // ----- composition -----

    /// Composition parent
    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.get(id)?.composition()?.parent
    }

    /// Direct composition children
    pub fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.get(id)
            .and_then(|o| o.composition())
            .map(|c| c.children.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ancestors, closest first
    pub fn ancestors(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == id || out.contains(&p) {
                break;
            }
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// The object and its ancestors, root first
    pub fn lineage(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = self.ancestors(id);
        out.reverse();
        out.push(id);
        out
    }

    /// All descendants, breadth first
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut queue = std::collections::VecDeque::from(self.children(id));
        while let Some(next) = queue.pop_front() {
            if next == id || out.contains(&next) {
                continue;
            }
            out.push(next);
            queue.extend(self.children(next));
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Whether two objects share a lineage (equal, ancestor or descendant)
    pub fn same_family(&self, a: ObjectId, b: ObjectId) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    // ----- allocation lookups -----

    /// Objects whose allocated set contains `object`
    pub fn holders_of(&self, object: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.allocated().is_some_and(|a| a.contains(&object)))
            .map(|o| o.id())
            .collect()
    }

    /// Holders of one kind whose allocated set contains `object`
    pub fn holders_of_kind(&self, object: ObjectId, kind: ObjectKind) -> Vec<ObjectId> {
        self.holders_of(object)
            .into_iter()
            .filter(|h| self.kind_of(*h) == Some(kind))
            .collect()
    }

    /// Elements whose exposed set contains `interface`
    pub fn exposers_of(&self, interface: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.exposed().is_some_and(|e| e.contains(&interface)))
            .map(|o| o.id())
            .collect()
    }

    /// Objects whose derived pointer designates `base`
    pub fn derived_from(&self, base: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.header().derived == Some(base))
            .map(|o| o.id())
            .collect()
    }

    // ----- inherited reads -----

    /// Children including those of the derived base
    pub fn effective_children(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = self.children(id);
        if let Some(base) = self.get(id).and_then(|o| o.header().derived) {
            for child in self.children(base) {
                if !out.contains(&child) {
                    out.push(child);
                }
            }
        }
        out
    }

    /// Data on which a function holds `role`, including its derived base's
    pub fn effective_flows(&self, id: ObjectId, role: FlowRole) -> Vec<ObjectId> {
        let mut out = self.flows.data_for(role, id);
        if let Some(base) = self.get(id).and_then(|o| o.header().derived) {
            for data in self.flows.data_for(role, base) {
                if !out.contains(&data) {
                    out.push(data);
                }
            }
        }
        out
    }

    /// Exposed interfaces including those of the derived base
    pub fn effective_exposed(&self, id: ObjectId) -> Vec<ObjectId> {
        let own = |x: ObjectId| -> Vec<ObjectId> {
            self.get(x)
                .and_then(|o| o.exposed())
                .map(|e| e.iter().copied().collect())
                .unwrap_or_default()
        };
        let mut out = own(id);
        if let Some(base) = self.get(id).and_then(|o| o.header().derived) {
            for i in own(base) {
                if !out.contains(&i) {
                    out.push(i);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(kind: ObjectKind) -> TypeRef {
        TypeRef::Base(kind)
    }

    fn compose(ctx: &mut ModelContext, parent: ObjectId, child: ObjectId) {
        ctx.get_mut(parent).unwrap().composition_mut().unwrap().children.insert(child);
        ctx.get_mut(child).unwrap().composition_mut().unwrap().parent = Some(parent);
    }

    #[test]
    fn test_create_rejects_duplicate_name_per_kind() {
        let mut ctx = ModelContext::new();
        ctx.create(ObjectKind::Function, "F1", base(ObjectKind::Function)).unwrap();

        let err = ctx.create(ObjectKind::Function, "F1", base(ObjectKind::Function)).unwrap_err();
        assert!(matches!(err, ModelError::Duplicate(_)));

        // Same name in another kind is allowed, but then ambiguous
        ctx.create(ObjectKind::Data, "F1", base(ObjectKind::Data)).unwrap();
        assert!(matches!(
            ctx.resolve("F1", &[]),
            Err(ModelError::Ambiguous { count: 2, .. })
        ));
        assert!(ctx.resolve("F1", &[ObjectKind::Data]).unwrap().is_some());
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut ctx = ModelContext::new();
        assert!(matches!(
            ctx.create(ObjectKind::Function, "  ", base(ObjectKind::Function)),
            Err(ModelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_resolve_by_alias_and_loosely() {
        let mut ctx = ModelContext::new();
        let id = ctx.create(ObjectKind::Function, "F1", base(ObjectKind::Function)).unwrap();
        ctx.get_mut(id).unwrap().header_mut().alias = Some("Fly".into());

        assert_eq!(ctx.resolve("Fly", &[]).unwrap(), Some(id));
        assert_eq!(ctx.resolve("fly", &[]).unwrap(), None);
        assert_eq!(ctx.resolve_loose("fly", &[]), Some(id));
        assert!(matches!(ctx.lookup("nope", &[]), Err(ModelError::Resolution(_))));
    }

    #[test]
    fn test_base_kind_walks_type_chain() {
        let mut ctx = ModelContext::new();
        let pump = ctx.create(ObjectKind::Type, "Pump", base(ObjectKind::FunctionalElement)).unwrap();
        let fuel_pump = ctx.create(ObjectKind::Type, "Fuel pump", TypeRef::Custom(pump)).unwrap();

        assert_eq!(
            ctx.base_kind_of(TypeRef::Custom(fuel_pump)),
            Some(ObjectKind::FunctionalElement)
        );

        let e = ctx.create(ObjectKind::FunctionalElement, "P1", TypeRef::Custom(fuel_pump)).unwrap();
        assert_eq!(ctx.base_kind(e), Some(ObjectKind::FunctionalElement));
    }

    #[test]
    fn test_base_kind_detects_loop() {
        let mut ctx = ModelContext::new();
        let a = ctx.create(ObjectKind::Type, "A", base(ObjectKind::Function)).unwrap();
        let b = ctx.create(ObjectKind::Type, "B", TypeRef::Custom(a)).unwrap();
        ctx.get_mut(a).unwrap().header_mut().type_ref = TypeRef::Custom(b);

        assert_eq!(ctx.base_kind_of(TypeRef::Custom(a)), None);
    }

    #[test]
    fn test_lineage_queries() {
        let mut ctx = ModelContext::new();
        let k = ObjectKind::FunctionalElement;
        let root = ctx.create(k, "E", base(k)).unwrap();
        let mid = ctx.create(k, "E1", base(k)).unwrap();
        let leaf = ctx.create(k, "E11", base(k)).unwrap();
        let other = ctx.create(k, "E2", base(k)).unwrap();
        compose(&mut ctx, root, mid);
        compose(&mut ctx, mid, leaf);
        compose(&mut ctx, root, other);

        assert_eq!(ctx.ancestors(leaf), vec![mid, root]);
        assert_eq!(ctx.lineage(leaf), vec![root, mid, leaf]);
        assert!(ctx.is_ancestor(root, leaf));
        assert!(ctx.same_family(leaf, root));
        assert!(!ctx.same_family(leaf, other));
        assert_eq!(ctx.descendants(root).len(), 3);
    }

    #[test]
    fn test_effective_children_follow_derived_pointer() {
        let mut ctx = ModelContext::new();
        let k = ObjectKind::Function;
        let b = ctx.create(k, "B", base(k)).unwrap();
        let b1 = ctx.create(k, "B1", base(k)).unwrap();
        let a = ctx.create(k, "A", base(k)).unwrap();
        compose(&mut ctx, b, b1);
        ctx.get_mut(a).unwrap().header_mut().derived = Some(b);

        assert!(ctx.children(a).is_empty());
        assert_eq!(ctx.effective_children(a), vec![b1]);
        assert_eq!(ctx.derived_from(b), vec![a]);
    }
}
