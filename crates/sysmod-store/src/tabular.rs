//! CSV import and export
//!
//! The tabular form is one row per object with the columns
//! `id, kind, name, alias, type, parent, description`. Relations other than
//! composition are not part of it.
//!
//! Import merges by id: rows whose id is already in the model are skipped and
//! logged, never overwritten.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use sysmod_domain::{Header, ModelContext, ModelObject, ObjectId, ObjectKind, TypeRef};
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    id: String,
    kind: String,
    name: String,
    #[serde(default)]
    alias: String,
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    parent: String,
    #[serde(default)]
    description: String,
}

/// What an import did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Objects added to the model, in file order
    pub imported: Vec<ObjectId>,
    /// Rows left out because their id (or name) was already taken
    pub skipped: Vec<ObjectId>,
}

/// Write every object of the model as CSV; returns the number of rows
pub fn export_csv<W: Write>(ctx: &ModelContext, writer: W) -> Result<usize, StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut count = 0;

    for obj in ctx.objects() {
        let header = obj.header();
        let type_name = match header.type_ref {
            TypeRef::Base(kind) => kind.as_str().to_string(),
            TypeRef::Custom(id) => ctx.name_of(id),
        };
        wtr.serialize(Row {
            id: obj.id().to_string(),
            kind: obj.kind().as_str().to_string(),
            name: obj.name().to_string(),
            alias: header.alias.clone().unwrap_or_default(),
            type_name,
            parent: ctx.parent(obj.id()).map(|p| p.to_string()).unwrap_or_default(),
            description: obj.description().unwrap_or_default().to_string(),
        })?;
        count += 1;
    }

    wtr.flush()?;
    info!("Exported {} objects", count);
    Ok(count)
}

/// [`export_csv`] into a file, replacing it
pub fn export_csv_file<P: AsRef<Path>>(ctx: &ModelContext, path: P) -> Result<usize, StoreError> {
    export_csv(ctx, File::create(path)?)
}

/// Merge CSV rows into the model
///
/// Rows are validated before anything is inserted, so a malformed file leaves
/// the model untouched. Types and parents are resolved once every row is in,
/// which lets a row refer to objects defined further down.
pub fn import_csv<R: Read>(ctx: &mut ModelContext, reader: R) -> Result<ImportReport, StoreError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut parsed = Vec::new();
    for row in rdr.deserialize() {
        let row: Row = row?;
        let id = ObjectId::from_string(&row.id).map_err(StoreError::InvalidData)?;
        let kind = ObjectKind::parse(&row.kind).ok_or_else(|| {
            StoreError::InvalidData(format!("Unknown kind '{}' for {}", row.kind, id))
        })?;
        if row.name.trim().is_empty() {
            return Err(StoreError::InvalidData(format!("Empty name for {}", id)));
        }
        parsed.push((id, kind, row));
    }

    let mut report = ImportReport::default();
    let mut pending = Vec::new();
    for (id, kind, row) in parsed {
        let name = row.name.trim();
        if ctx.contains(id) {
            warn!("Skipping {} '{}': id already present", id, name);
            report.skipped.push(id);
            continue;
        }
        if ctx.objects_of(kind).any(|o| o.header().answers_to(name)) {
            warn!("Skipping {} '{}': {} name already taken", id, name, kind);
            report.skipped.push(id);
            continue;
        }

        let mut header = Header::new(name, TypeRef::Base(kind));
        header.id = id;
        let alias = row.alias.trim();
        if !alias.is_empty() {
            header.alias = Some(alias.to_string());
        }
        let mut obj = ModelObject::new(kind, header);
        if let ModelObject::Requirement(s) | ModelObject::Goal(s) = &mut obj {
            s.description = row.description.trim().to_string();
        }

        ctx.insert(obj)?;
        report.imported.push(id);
        pending.push((id, kind, row.type_name, row.parent));
    }

    for (id, kind, type_name, parent) in pending {
        if let Some(type_ref) = resolve_type(ctx, id, kind, type_name.trim()) {
            if let Some(obj) = ctx.get_mut(id) {
                obj.header_mut().type_ref = type_ref;
            }
        }
        if !parent.trim().is_empty() {
            attach_parent(ctx, id, kind, parent.trim());
        }
    }

    info!(
        "Imported {} objects, skipped {}",
        report.imported.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// [`import_csv`] from a file
pub fn import_csv_file<P: AsRef<Path>>(
    ctx: &mut ModelContext,
    path: P,
) -> Result<ImportReport, StoreError> {
    import_csv(ctx, File::open(path)?)
}

/// Declared type of an imported row, or `None` to keep the base kind
fn resolve_type(ctx: &ModelContext, id: ObjectId, kind: ObjectKind, name: &str) -> Option<TypeRef> {
    if name.is_empty() {
        return None;
    }
    if let Some(base) = ObjectKind::parse(name) {
        if kind == ObjectKind::Type || base == kind {
            return Some(TypeRef::Base(base));
        }
        warn!("{} is a {}, not a {}; keeping its kind", id, kind, base);
        return None;
    }

    match ctx.resolve(name, &[ObjectKind::Type]) {
        Ok(Some(type_id)) if type_id != id => {
            let type_ref = TypeRef::Custom(type_id);
            if kind == ObjectKind::Type || ctx.base_kind_of(type_ref) == Some(kind) {
                Some(type_ref)
            } else {
                warn!("Type '{}' does not extend {}; ignored for {}", name, kind, id);
                None
            }
        }
        _ => {
            warn!("Unknown type '{}' for {}", name, id);
            None
        }
    }
}

fn attach_parent(ctx: &mut ModelContext, id: ObjectId, kind: ObjectKind, parent: &str) {
    let parent = match ObjectId::from_string(parent) {
        Ok(parent) => parent,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };
    if !kind.is_composable()
        || ctx.kind_of(parent) != Some(kind)
        || parent == id
        || ctx.parent(id).is_some()
        || ctx.is_ancestor(id, parent)
    {
        warn!("Cannot place {} under {}", id, parent);
        return;
    }

    if let Some(c) = ctx.get_mut(id).and_then(|o| o.composition_mut()) {
        c.parent = Some(parent);
    }
    if let Some(c) = ctx.get_mut(parent).and_then(|o| o.composition_mut()) {
        c.children.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,kind,name,alias,type,parent,description\n";

    #[test]
    fn test_export_columns() {
        let mut ctx = ModelContext::new();
        let r = ctx
            .create(ObjectKind::Requirement, "R1", TypeRef::Base(ObjectKind::Requirement))
            .unwrap();
        if let Some(ModelObject::Requirement(s)) = ctx.get_mut(r) {
            s.description = "The pump, when idle, shall stop".to_string();
        }

        let mut out = Vec::new();
        assert_eq!(export_csv(&ctx, &mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(HEADER));
        assert!(text.contains(&format!("{},requirement,R1,,requirement,,", r)));
        assert!(text.contains("\"The pump, when idle, shall stop\""));
    }

    #[test]
    fn test_import_resolves_types_and_parents_defined_later() {
        let parent = ObjectId::new();
        let child = ObjectId::new();
        let pump = ObjectId::new();
        let csv_text = format!(
            "{HEADER}{child},function,F1a,,function,{parent},\n\
             {pump},type,Pump,,functional element,,\n\
             {parent},function,F1,main,function,,\n"
        );
        let mut ctx = ModelContext::new();

        let report = import_csv(&mut ctx, csv_text.as_bytes()).unwrap();
        assert_eq!(report.imported, vec![child, pump, parent]);
        assert!(report.skipped.is_empty());
        assert_eq!(ctx.parent(child), Some(parent));
        assert_eq!(ctx.children(parent), vec![child]);
        assert_eq!(ctx.resolve("main", &[]).unwrap(), Some(parent));
        assert_eq!(
            ctx.get(pump).unwrap().header().type_ref,
            TypeRef::Base(ObjectKind::FunctionalElement)
        );
    }

    #[test]
    fn test_import_skips_present_ids_and_names() {
        let mut ctx = ModelContext::new();
        let existing = ctx
            .create(ObjectKind::Data, "a", TypeRef::Base(ObjectKind::Data))
            .unwrap();
        let same_name = ObjectId::new();
        let fresh = ObjectId::new();
        let csv_text = format!(
            "{HEADER}{existing},data,renamed,,,,\n{same_name},data,a,,,,\n{fresh},data,b,,,,\n"
        );

        let report = import_csv(&mut ctx, csv_text.as_bytes()).unwrap();
        assert_eq!(report.imported, vec![fresh]);
        assert_eq!(report.skipped, vec![existing, same_name]);
        assert_eq!(ctx.name_of(existing), "a");
    }

    #[test]
    fn test_malformed_file_changes_nothing() {
        let mut ctx = ModelContext::new();
        let csv_text = format!(
            "{HEADER}{},data,a,,,,\nnot-an-id,data,b,,,,\n",
            ObjectId::new()
        );

        let err = import_csv(&mut ctx, csv_text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut ctx = ModelContext::new();
        let csv_text = format!("{HEADER}{},gizmo,a,,,,\n", ObjectId::new());
        assert!(import_csv(&mut ctx, csv_text.as_bytes()).is_err());
    }
}
