//! Classes and their enrolled students.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    /// Enrolled student identifiers, in roster order.
    pub students: Vec<String>,
}

impl ClassInfo {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, students: Vec<String>) -> Self {
        Self { id: id.into(), name: name.into(), students }
    }

    /// Class with `count` generated student ids (`<prefix>-001`, `<prefix>-002`, ...).
    #[must_use]
    pub fn with_generated_students(id: &str, name: &str, prefix: &str, count: usize) -> Self {
        let students = (1..=count).map(|n| format!("{prefix}-{n:03}")).collect();
        Self::new(id, name, students)
    }

    #[must_use]
    pub fn enrollment(&self) -> usize {
        self.students.len()
    }
}

/// Lookup of classes by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: HashMap<String, ClassInfo>,
}

impl Catalog {
    #[must_use]
    pub fn new(classes: impl IntoIterator<Item = ClassInfo>) -> Self {
        Self { classes: classes.into_iter().map(|c| (c.id.clone(), c)).collect() }
    }

    /// The three sample classes used by the demo binary.
    #[must_use]
    pub fn demo() -> Self {
        Self::new([
            ClassInfo::with_generated_students("1", "Computer Science 101", "cs101", 32),
            ClassInfo::with_generated_students("2", "Data Structures", "ds", 28),
            ClassInfo::with_generated_students("3", "Web Development", "web", 25),
        ])
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ClassInfo> {
        self.classes.get(id)
    }

    pub fn insert(&mut self, class: ClassInfo) {
        self.classes.insert(class.id.clone(), class);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
