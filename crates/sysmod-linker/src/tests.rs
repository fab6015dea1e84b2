//! Linker scenarios over a real model and engine

#[cfg(test)]
mod tests {
    use crate::{CreationPath, Linker, LinkerConfig, LinkerError};
    use std::collections::BTreeSet;
    use sysmod_domain::{ModelContext, ObjectId, ObjectKind, TypeRef};
    use sysmod_engine::{AllocationEngine, Change};
    use sysmod_tagger::{LexiconTagger, MockTagger};

    fn new(ctx: &mut ModelContext, kind: ObjectKind, name: &str) -> ObjectId {
        ctx.create(kind, name, TypeRef::Base(kind)).unwrap()
    }

    fn linker() -> Linker<LexiconTagger> {
        Linker::new(LexiconTagger::new(), LinkerConfig::default())
    }

    fn satisfied_by(ctx: &ModelContext, statement: ObjectId) -> BTreeSet<ObjectId> {
        ctx.get(statement).unwrap().allocated().unwrap().clone()
    }

    #[test]
    fn test_unknown_subject_still_creates_requirement() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();

        let result = linker()
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The system shall open the door",
                CreationPath::Command,
            )
            .unwrap();

        let id = result.statement.unwrap();
        assert_eq!(ctx.name_of(id), "R1");
        assert_eq!(result.subject, None);
        assert_eq!(result.outcome.warnings, vec!["subject unknown".to_string()]);
        assert!(result.outcome.changes.contains(&Change::Created { id }));
        assert_eq!(
            ctx.get(id).unwrap().description(),
            Some("The system shall open the door")
        );
    }

    #[test]
    fn test_links_subject_and_related_objects() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let pump = new(&mut ctx, ObjectKind::FunctionalElement, "pump");
        let deliver = new(&mut ctx, ObjectKind::Function, "deliver fuel");
        let fuel = new(&mut ctx, ObjectKind::Data, "fuel");
        engine.allocate_confirmed(&mut ctx, pump, deliver).unwrap();

        let result = linker()
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The pump shall deliver fuel",
                CreationPath::Command,
            )
            .unwrap();

        let id = result.statement.unwrap();
        assert_eq!(result.subject, Some(pump));
        assert!(result.outcome.warnings.is_empty());

        let linked = satisfied_by(&ctx, id);
        assert!(linked.contains(&pump));
        assert!(linked.contains(&deliver));
        // Mentioned but unrelated to the pump
        assert!(!linked.contains(&fuel));
    }

    #[test]
    fn test_function_name_bridged_by_to_is_linked() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let motor = new(&mut ctx, ObjectKind::FunctionalElement, "engine");
        let convert = new(&mut ctx, ObjectKind::Function, "convert fuel to power");
        engine.allocate_confirmed(&mut ctx, motor, convert).unwrap();

        let result = linker()
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The engine shall convert fuel to power",
                CreationPath::Command,
            )
            .unwrap();

        assert_eq!(result.subject, Some(motor));
        let linked = satisfied_by(&ctx, result.statement.unwrap());
        assert_eq!(linked, BTreeSet::from([motor, convert]));
    }

    #[test]
    fn test_temporal_clause_objects_are_linked() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let pump = new(&mut ctx, ObjectKind::FunctionalElement, "pump");
        let monitor = new(&mut ctx, ObjectKind::Function, "monitor");
        engine.allocate_confirmed(&mut ctx, pump, monitor).unwrap();

        let result = linker()
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "While the monitor is active, the pump shall stop",
                CreationPath::Command,
            )
            .unwrap();

        let linked = satisfied_by(&ctx, result.statement.unwrap());
        assert_eq!(linked, BTreeSet::from([pump, monitor]));
    }

    #[test]
    fn test_duplicate_requirement_is_suppressed() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let linker = linker();

        let first = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The system shall open the door",
                CreationPath::Command,
            )
            .unwrap();
        let second = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The system shall open the doors",
                CreationPath::Command,
            )
            .unwrap();

        assert_eq!(second.statement, None);
        let (existing, score) = second.duplicate_of.unwrap();
        assert_eq!(Some(existing), first.statement);
        assert!(score >= 0.78);
        assert_eq!(ctx.objects_of(ObjectKind::Requirement).count(), 1);
        assert!(second.outcome.warnings[0].contains("duplicates R1"));
    }

    #[test]
    fn test_goal_threshold_is_stricter() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let linker = linker();

        assert_eq!(linker.threshold(ObjectKind::Goal, CreationPath::Command), 0.95);
        assert_eq!(linker.threshold(ObjectKind::Requirement, CreationPath::Command), 0.78);
        assert_eq!(linker.threshold(ObjectKind::Requirement, CreationPath::Describe), 0.95);

        for text in ["Reduce fuel consumption", "Reduce fuel consumption by half"] {
            let result = linker
                .create_statement(&mut ctx, &engine, ObjectKind::Goal, None, text, CreationPath::Command)
                .unwrap();
            assert!(result.duplicate_of.is_none());
        }

        let names: Vec<String> = ctx
            .objects_of(ObjectKind::Goal)
            .map(|o| o.name().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"G1".to_string()));
        assert!(names.contains(&"G2".to_string()));
    }

    #[test]
    fn test_generated_names_skip_taken_ones() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        new(&mut ctx, ObjectKind::Requirement, "R1");

        let result = linker()
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The valve shall close",
                CreationPath::Command,
            )
            .unwrap();
        assert_eq!(ctx.name_of(result.statement.unwrap()), "R2");
    }

    #[test]
    fn test_new_requirement_refines_parent_requirement() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let config = LinkerConfig {
            requirement_threshold: 0.9,
            ..LinkerConfig::default()
        };
        let linker = Linker::new(LexiconTagger::new(), config);

        let engine_fe = new(&mut ctx, ObjectKind::FunctionalElement, "engine");
        let pump = new(&mut ctx, ObjectKind::FunctionalElement, "pump");
        engine.compose(&mut ctx, engine_fe, pump).unwrap();

        let parent = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The engine shall deliver fuel at high pressure",
                CreationPath::Command,
            )
            .unwrap()
            .statement
            .unwrap();
        let child = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The pump shall deliver fuel at low pressure",
                CreationPath::Command,
            )
            .unwrap()
            .statement
            .unwrap();

        assert_eq!(ctx.parent(child), Some(parent));
        assert!(satisfied_by(&ctx, child).contains(&pump));
    }

    #[test]
    fn test_parent_linking_can_be_disabled() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let config = LinkerConfig {
            requirement_threshold: 0.9,
            link_parents: false,
            ..LinkerConfig::default()
        };
        let linker = Linker::new(LexiconTagger::new(), config);

        let engine_fe = new(&mut ctx, ObjectKind::FunctionalElement, "engine");
        let pump = new(&mut ctx, ObjectKind::FunctionalElement, "pump");
        engine.compose(&mut ctx, engine_fe, pump).unwrap();

        for text in [
            "The engine shall deliver fuel at high pressure",
            "The pump shall deliver fuel at low pressure",
        ] {
            linker
                .create_statement(&mut ctx, &engine, ObjectKind::Requirement, None, text, CreationPath::Command)
                .unwrap();
        }

        assert!(ctx
            .objects_of(ObjectKind::Requirement)
            .all(|r| ctx.parent(r.id()).is_none()));
    }

    #[test]
    fn test_rescan_links_once_subject_exists() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let linker = linker();

        let requirement = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The pumps shall stop",
                CreationPath::Command,
            )
            .unwrap()
            .statement
            .unwrap();
        assert!(satisfied_by(&ctx, requirement).is_empty());

        let pump = new(&mut ctx, ObjectKind::FunctionalElement, "pump");
        let untouched = linker
            .rescan(&mut ctx, &engine, &BTreeSet::new())
            .unwrap();
        assert_eq!(untouched.update_flag(), 0);

        let outcome = linker
            .rescan(&mut ctx, &engine, &BTreeSet::from([pump]))
            .unwrap();
        assert_eq!(outcome.update_flag(), 1);
        assert!(satisfied_by(&ctx, requirement).contains(&pump));
    }

    #[test]
    fn test_describe_named_statement() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let linker = linker();
        let valve = new(&mut ctx, ObjectKind::FunctionalElement, "valve");

        let door = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                Some("Door"),
                "The door shall open",
                CreationPath::Describe,
            )
            .unwrap()
            .statement
            .unwrap();
        assert_eq!(ctx.name_of(door), "Door");

        let result = linker
            .describe(&mut ctx, &engine, door, "The valve shall close")
            .unwrap();
        assert_eq!(result.subject, Some(valve));
        assert_eq!(ctx.get(door).unwrap().description(), Some("The valve shall close"));
        assert!(satisfied_by(&ctx, door).contains(&valve));
    }

    #[test]
    fn test_describe_rejects_copy_of_other_statement() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let linker = linker();

        let first = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The valve shall close",
                CreationPath::Command,
            )
            .unwrap()
            .statement
            .unwrap();
        let second = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The heater shall warm the cabin",
                CreationPath::Command,
            )
            .unwrap()
            .statement
            .unwrap();

        let result = linker
            .describe(&mut ctx, &engine, second, "The valve shall close")
            .unwrap();
        assert_eq!(result.duplicate_of.map(|(id, _)| id), Some(first));
        assert_eq!(
            ctx.get(second).unwrap().description(),
            Some("The heater shall warm the cabin")
        );
    }

    #[test]
    fn test_tagger_failure_leaves_model_untouched() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let mut tagger = MockTagger::new();
        tagger.add_error("The pump");
        let linker = Linker::new(tagger, LinkerConfig::default());

        let err = linker
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Requirement,
                None,
                "The pump shall stop",
                CreationPath::Command,
            )
            .unwrap_err();
        assert!(matches!(err, LinkerError::Tagger(_)));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_only_statements_are_created() {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();

        let err = linker()
            .create_statement(
                &mut ctx,
                &engine,
                ObjectKind::Function,
                None,
                "The pump shall stop",
                CreationPath::Command,
            )
            .unwrap_err();
        assert!(matches!(err, LinkerError::NotAStatement(_)));
    }
}
