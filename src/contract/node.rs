use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::{
    attribute::Attribute,
    error::{ContractError, empty_name, illegal_attribute, illegal_structure},
    types::ContractType,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ContractWire", into = "ContractWire")]
pub struct Contract {
    contract_type: ContractType,
    name: String,
    attribute: Option<Attribute>,
    children: BTreeMap<(ContractType, String), Contract>,
}

impl Contract {
    pub fn new(contract_type: ContractType, name: impl Into<String>) -> Result<Self, ContractError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(empty_name(format!(
                "contract of type {contract_type:?} requires a non-empty name"
            )));
        }
        Ok(Self {
            contract_type,
            name,
            attribute: None,
            children: BTreeMap::new(),
        })
    }

    pub fn contract_type(&self) -> ContractType {
        self.contract_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_contract(&mut self, child: Contract) -> Result<Option<Contract>, ContractError> {
        if !self.contract_type.accepts_child(child.contract_type) {
            return Err(illegal_structure(format!(
                "{:?} '{}' cannot contain a {:?} child",
                self.contract_type, self.name, child.contract_type
            )));
        }
        let key = (child.contract_type, child.name.clone());
        Ok(self.children.insert(key, child))
    }

    pub fn remove_contract(
        &mut self,
        contract_type: ContractType,
        name: &str,
    ) -> Result<Option<Contract>, ContractError> {
        self.check_child_type(contract_type)?;
        Ok(self.children.remove(&(contract_type, name.to_string())))
    }

    pub fn contract(
        &self,
        contract_type: ContractType,
        name: &str,
    ) -> Result<Option<&Contract>, ContractError> {
        self.check_child_type(contract_type)?;
        Ok(self.children.get(&(contract_type, name.to_string())))
    }

    pub fn contracts(
        &self,
        contract_type: ContractType,
    ) -> Result<impl Iterator<Item = &Contract>, ContractError> {
        self.check_child_type(contract_type)?;
        Ok(self
            .children
            .values()
            .filter(move |child| child.contract_type == contract_type))
    }

    pub fn children(&self) -> impl Iterator<Item = &Contract> {
        self.children.values()
    }

    pub fn set_attribute(
        &mut self,
        attribute: Attribute,
    ) -> Result<Option<Attribute>, ContractError> {
        let legal = match &attribute {
            Attribute::Feature(_) => self.contract_type.accepts_feature_attribute(),
            Attribute::CostEstimate { .. } => self.contract_type.accepts_cost_estimate(),
        };
        if !legal {
            return Err(illegal_attribute(format!(
                "{:?} '{}' cannot carry a {} attribute",
                self.contract_type,
                self.name,
                attribute_label(&attribute)
            )));
        }
        Ok(self.attribute.replace(attribute))
    }

    pub fn attribute(&self) -> Result<Option<&Attribute>, ContractError> {
        self.check_attribute_access()?;
        Ok(self.attribute.as_ref())
    }

    pub fn remove_attribute(&mut self) -> Result<Option<Attribute>, ContractError> {
        self.check_attribute_access()?;
        Ok(self.attribute.take())
    }

    pub fn cost_estimate(&self) -> &[u64] {
        match &self.attribute {
            Some(Attribute::CostEstimate { units }) => units,
            _ => &[],
        }
    }

    pub fn copy(&self) -> Contract {
        self.clone()
    }

    fn check_attribute_access(&self) -> Result<(), ContractError> {
        if self.contract_type.accepts_feature_attribute()
            || self.contract_type.accepts_cost_estimate()
        {
            Ok(())
        } else {
            Err(illegal_attribute(format!(
                "{:?} '{}' never carries attributes",
                self.contract_type, self.name
            )))
        }
    }

    fn check_child_type(&self, contract_type: ContractType) -> Result<(), ContractError> {
        if self.contract_type.accepts_child(contract_type) {
            Ok(())
        } else {
            Err(illegal_structure(format!(
                "{:?} '{}' never contains {:?} children",
                self.contract_type, self.name, contract_type
            )))
        }
    }
}

fn attribute_label(attribute: &Attribute) -> &'static str {
    match attribute {
        Attribute::Feature(_) => "feature-constraint",
        Attribute::CostEstimate { .. } => "cost-estimate",
    }
}

#[derive(Serialize, Deserialize)]
struct ContractWire {
    #[serde(rename = "type")]
    contract_type: ContractType,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Contract>,
}

impl TryFrom<ContractWire> for Contract {
    type Error = ContractError;

    fn try_from(wire: ContractWire) -> Result<Self, Self::Error> {
        let mut contract = Contract::new(wire.contract_type, wire.name)?;
        if let Some(attribute) = wire.attribute {
            contract.set_attribute(attribute)?;
        }
        for child in wire.children {
            contract.add_contract(child)?;
        }
        Ok(contract)
    }
}

impl From<Contract> for ContractWire {
    fn from(contract: Contract) -> Self {
        ContractWire {
            contract_type: contract.contract_type,
            name: contract.name,
            attribute: contract.attribute,
            children: contract.children.into_values().collect(),
        }
    }
}
