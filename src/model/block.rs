use std::collections::HashMap;

use super::Attribute;
use crate::errors::ConfigurationError;

/// A named grouping of attributes. Purely organizational: a block does not
/// constrain dependencies, and cross-block dependencies are allowed.
#[derive(Debug)]
pub struct Block {
    pub id: String,
    pub name: String,
    attributes: HashMap<String, Attribute>,
    /// Preserves insertion order for deterministic iteration (`HashMap` does
    /// not), matching the ordering guarantees of §5 of the evaluation model.
    order: Vec<String>,
}

impl Block {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add an attribute to this block. Fails if the id is already present
    /// in this block; global uniqueness across blocks is enforced by
    /// [`crate::simulation::Simulation::add_block`], not here.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<(), ConfigurationError> {
        if self.attributes.contains_key(&attribute.id) {
            return Err(ConfigurationError::DuplicateId {
                id: attribute.id.clone(),
            });
        }
        if attribute.is_calculated() && attribute.calculate.is_none() {
            return Err(ConfigurationError::MissingCalculate {
                id: attribute.id.clone(),
            });
        }
        self.order.push(attribute.id.clone());
        self.attributes.insert(attribute.id.clone(), attribute);
        Ok(())
    }

    pub fn get_attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.get(id)
    }

    pub fn get_attribute_mut(&mut self, id: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(id)
    }

    /// Attributes in the order they were added.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.order.iter().map(move |id| &self.attributes[id])
    }

    pub fn attributes_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.attributes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_attribute_id_within_block_fails() {
        let mut block = Block::new("b", "Block");
        block.add_attribute(Attribute::input("a", "A", Some(1.0))).unwrap();
        let err = block.add_attribute(Attribute::input("a", "A again", Some(2.0))).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateId { id } if id == "a"));
    }

    #[test]
    fn calculated_attribute_without_calculate_is_rejected() {
        let mut block = Block::new("b", "Block");
        let bad = Attribute {
            id: "c".into(),
            name: "C".into(),
            kind: super::super::AttributeKind::Calculated,
            value: None,
            dependencies: vec![],
            calculate: None,
            metadata: Default::default(),
        };
        let err = block.add_attribute(bad).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCalculate { id } if id == "c"));
    }

    #[test]
    fn attributes_preserve_insertion_order() {
        let mut block = Block::new("b", "Block");
        block.add_attribute(Attribute::input("z", "Z", Some(1.0))).unwrap();
        block.add_attribute(Attribute::input("a", "A", Some(2.0))).unwrap();
        let ids: Vec<_> = block.attributes().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }
}
