use std::collections::HashMap;

use crate::{ast::Namespace, source::SourceRange};

/// One registered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
	/// Dense id within the symbol's namespace
	pub id:          usize,
	/// Range of the declaring identifier, for duplicate-declaration notes
	pub declaration: SourceRange,
	pub namespace:   Namespace,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
	pub entry:            SymbolEntry,
	/// False if the name was already taken; `entry` is then the prior one.
	pub newly_registered: bool,
}

/// Collects every symbol a function declares.
///
/// Names share a single key space across the three namespaces, which is
/// what enforces the cross-namespace uniqueness rule. Ids count up densely
/// per namespace and index the per-namespace name (and constant value)
/// tables. Symbols are only inserted during semantic analysis and never
/// change afterwards.
#[derive(Debug, Default)]
pub struct SymbolTable {
	entries:         HashMap<String, SymbolEntry>,
	parameter_names: Vec<String>,
	variable_names:  Vec<String>,
	constant_names:  Vec<String>,
	constant_values: Vec<i64>,
}

impl SymbolTable {
	pub fn new() -> Self { Self::default() }

	/// Registers a symbol unless the name is already taken, in which case
	/// the existing entry is returned and the caller reports the duplicate
	/// declaration. Constants also store their initializer value.
	pub fn register(
		&mut self,
		namespace: Namespace,
		name: &str,
		declaration: SourceRange,
		constant_value: Option<i64>,
	) -> Registration {
		if let Some(entry) = self.entries.get(name) {
			return Registration { entry: *entry, newly_registered: false };
		}

		let id = match namespace {
			Namespace::Parameter => {
				self.parameter_names.push(name.to_string());
				self.parameter_names.len() - 1
			}
			Namespace::Variable => {
				self.variable_names.push(name.to_string());
				self.variable_names.len() - 1
			}
			Namespace::Constant => {
				debug_assert!(constant_value.is_some());
				self.constant_names.push(name.to_string());
				self.constant_values.push(constant_value.unwrap_or_default());
				self.constant_names.len() - 1
			}
		};

		let entry = SymbolEntry { id, declaration, namespace };
		self.entries.insert(name.to_string(), entry);
		Registration { entry, newly_registered: true }
	}

	/// Looks up a symbol by its source name.
	pub fn lookup(&self, name: &str) -> Option<SymbolEntry> { self.entries.get(name).copied() }

	/// Reverse lookup from namespace and id to the declared name.
	pub fn lookup_name(&self, namespace: Namespace, id: usize) -> Option<&str> {
		let names = match namespace {
			Namespace::Parameter => &self.parameter_names,
			Namespace::Variable => &self.variable_names,
			Namespace::Constant => &self.constant_names,
		};
		names.get(id).map(String::as_str)
	}

	/// Value of a registered constant.
	pub fn constant_value(&self, constant_id: usize) -> i64 { self.constant_values[constant_id] }

	pub fn parameter_count(&self) -> usize { self.parameter_names.len() }

	pub fn variable_count(&self) -> usize { self.variable_names.len() }
}
