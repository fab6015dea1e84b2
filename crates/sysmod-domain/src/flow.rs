//! Producer/consumer edges between functions and data

use crate::ObjectId;
use serde::{Deserialize, Serialize};

/// Which side of a data flow a function is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRole {
    /// The function produces the data
    Producer,
    /// The function consumes the data
    Consumer,
}

impl FlowRole {
    /// The other side of the flow
    pub fn opposite(&self) -> Self {
        match self {
            FlowRole::Producer => FlowRole::Consumer,
            FlowRole::Consumer => FlowRole::Producer,
        }
    }

    /// Noun used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowRole::Producer => "producer",
            FlowRole::Consumer => "consumer",
        }
    }
}

/// Why an edge exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowOrigin {
    /// Declared by the user on this function
    Direct,
    /// Derived from the function's children
    Propagated,
    /// Mirrored from the base object of a derived function
    Inherited,
}

/// One producer or consumer edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flow {
    /// The data exchanged
    pub data: ObjectId,
    /// The function on this side of the exchange
    pub function: ObjectId,
    /// Why the edge exists
    pub origin: FlowOrigin,
}

/// Ordered producer and consumer lists
///
/// At most one edge exists per (role, data, function); the origin of an existing
/// edge is never overwritten by a weaker one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowTable {
    #[serde(default)]
    producers: Vec<Flow>,
    #[serde(default)]
    consumers: Vec<Flow>,
}

impl FlowTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, role: FlowRole) -> &Vec<Flow> {
        match role {
            FlowRole::Producer => &self.producers,
            FlowRole::Consumer => &self.consumers,
        }
    }

    fn list_mut(&mut self, role: FlowRole) -> &mut Vec<Flow> {
        match role {
            FlowRole::Producer => &mut self.producers,
            FlowRole::Consumer => &mut self.consumers,
        }
    }

    /// All edges for a role, in insertion order
    pub fn edges(&self, role: FlowRole) -> &[Flow] {
        self.list(role)
    }

    /// Find the edge for (role, data, function)
    pub fn get(&self, role: FlowRole, data: ObjectId, function: ObjectId) -> Option<&Flow> {
        self.list(role)
            .iter()
            .find(|f| f.data == data && f.function == function)
    }

    /// Whether (role, data, function) is recorded with any origin
    pub fn contains(&self, role: FlowRole, data: ObjectId, function: ObjectId) -> bool {
        self.get(role, data, function).is_some()
    }

    /// Record an edge; returns false if one already existed
    pub fn insert(&mut self, role: FlowRole, data: ObjectId, function: ObjectId, origin: FlowOrigin) -> bool {
        if self.contains(role, data, function) {
            return false;
        }
        self.list_mut(role).push(Flow { data, function, origin });
        true
    }

    /// Replace the origin of an existing edge; returns false if absent
    pub fn set_origin(&mut self, role: FlowRole, data: ObjectId, function: ObjectId, origin: FlowOrigin) -> bool {
        match self
            .list_mut(role)
            .iter_mut()
            .find(|f| f.data == data && f.function == function)
        {
            Some(flow) => {
                flow.origin = origin;
                true
            }
            None => false,
        }
    }

    /// Remove an edge and return it
    pub fn remove(&mut self, role: FlowRole, data: ObjectId, function: ObjectId) -> Option<Flow> {
        let list = self.list_mut(role);
        let pos = list
            .iter()
            .position(|f| f.data == data && f.function == function)?;
        Some(list.remove(pos))
    }

    /// Functions holding `role` on `data`
    pub fn functions_for(&self, role: FlowRole, data: ObjectId) -> Vec<ObjectId> {
        self.list(role)
            .iter()
            .filter(|f| f.data == data)
            .map(|f| f.function)
            .collect()
    }

    /// Data on which `function` holds `role`
    pub fn data_for(&self, role: FlowRole, function: ObjectId) -> Vec<ObjectId> {
        self.list(role)
            .iter()
            .filter(|f| f.function == function)
            .map(|f| f.data)
            .collect()
    }

    /// Whether `id` appears on either side of any edge
    pub fn involves(&self, id: ObjectId) -> bool {
        self.producers
            .iter()
            .chain(self.consumers.iter())
            .any(|f| f.data == id || f.function == id)
    }

    /// Total number of edges
    pub fn len(&self) -> usize {
        self.producers.len() + self.consumers.len()
    }

    /// Whether the table holds no edges
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut table = FlowTable::new();
        let (d, f) = (ObjectId::new(), ObjectId::new());

        assert!(table.insert(FlowRole::Producer, d, f, FlowOrigin::Direct));
        assert!(!table.insert(FlowRole::Producer, d, f, FlowOrigin::Propagated));
        assert_eq!(table.get(FlowRole::Producer, d, f).unwrap().origin, FlowOrigin::Direct);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_roles_are_independent() {
        let mut table = FlowTable::new();
        let (d, f) = (ObjectId::new(), ObjectId::new());

        table.insert(FlowRole::Consumer, d, f, FlowOrigin::Direct);
        assert!(!table.contains(FlowRole::Producer, d, f));
        assert_eq!(table.functions_for(FlowRole::Consumer, d), vec![f]);
        assert_eq!(table.data_for(FlowRole::Consumer, f), vec![d]);
    }

    #[test]
    fn test_remove_and_involves() {
        let mut table = FlowTable::new();
        let (d, f) = (ObjectId::new(), ObjectId::new());

        table.insert(FlowRole::Producer, d, f, FlowOrigin::Direct);
        assert!(table.involves(d));
        assert!(table.remove(FlowRole::Producer, d, f).is_some());
        assert!(!table.involves(f));
        assert!(table.is_empty());
    }
}
